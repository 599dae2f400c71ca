use {
    super::{
        Auth,
        RestError,
    },
    crate::{
        auction::{
            entities,
            service::handle_bid::HandleBidInput,
        },
        state::Store,
    },
    axum::{
        extract::State,
        Json,
    },
    saleroom_api_types::{
        bid::{
            Bid,
            BidCreate,
            FloorBidCreate,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// Place a bid on a live auction.
///
/// The bid is admitted only if the auction is live and the amount is strictly
/// greater than the current price at the moment of admission; concurrent bids
/// for the same auction are decided in arrival order.
#[utoipa::path(post, path = "/v1/bids", request_body = BidCreate,
    responses(
        (status = 200, description = "The bid was admitted and is the new current price", body = Bid),
        (status = 400, description = "The auction is not live or the bid is too low", body = ErrorBodyResponse),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn post_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Json(bid_create): Json<BidCreate>,
) -> Result<Json<Bid>, RestError> {
    let principal = auth.require_principal()?;
    let bid = store
        .auction_service
        .handle_bid(HandleBidInput {
            bid_create: entities::BidCreate {
                auction_id: bid_create.auction_id,
                amount:     bid_create.amount,
                bidder:     entities::Bidder::Online {
                    identity:     principal.id,
                    display_name: principal.name.clone(),
                },
            },
        })
        .await?;
    Ok(Json(bid.into()))
}

/// Enter a bid on behalf of an in-person bidder. Operator only.
///
/// Floor bids carry a bidder name and paddle number instead of a caller
/// identity; the admission rule is the same as for online bids.
#[utoipa::path(post, path = "/v1/bids/floor", request_body = FloorBidCreate,
    responses(
        (status = 200, description = "The bid was admitted and is the new current price", body = Bid),
        (status = 400, description = "The auction is not live or the bid is too low", body = ErrorBodyResponse),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn post_floor_bid(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Json(bid_create): Json<FloorBidCreate>,
) -> Result<Json<Bid>, RestError> {
    auth.require_admin()?;
    let bid = store
        .auction_service
        .handle_bid(HandleBidInput {
            bid_create: entities::BidCreate {
                auction_id: bid_create.auction_id,
                amount:     bid_create.amount,
                bidder:     entities::Bidder::Floor {
                    display_name:  bid_create.bidder_name,
                    bidder_number: bid_create.bidder_number,
                },
            },
        })
        .await?;
    Ok(Json(bid.into()))
}
