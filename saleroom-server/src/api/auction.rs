use {
    super::{
        Auth,
        RestError,
    },
    crate::{
        auction::service::{
            get_auction::GetAuctionInput,
            transition_status::TransitionStatusInput,
        },
        state::Store,
    },
    axum::{
        extract::{
            Path,
            State,
        },
        Json,
    },
    saleroom_api_types::{
        auction::{
            AuctionId,
            AuctionSnapshot,
            AuctionStatus,
        },
        ws::PresenceSnapshot,
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// Get the current status and price of an auction room.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}",
    params(("auction_id" = String, Path, description = "Id of the auction")),
    responses(
        (status = 200, description = "The auction's current state", body = AuctionSnapshot),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn get_auction(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<AuctionSnapshot>, RestError> {
    let snapshot = store
        .auction_service
        .get_auction(GetAuctionInput { auction_id })
        .await?;
    Ok(Json(snapshot))
}

/// Get the connected participants of an auction room.
#[utoipa::path(get, path = "/v1/auctions/{auction_id}/presence",
    params(("auction_id" = String, Path, description = "Id of the auction")),
    responses(
        (status = 200, description = "The room's current membership", body = PresenceSnapshot),
    ),
)]
pub async fn get_presence(
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Json<PresenceSnapshot> {
    Json(store.room_registry.presence(auction_id).await)
}

/// Open bidding on a scheduled auction. Operator only.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/start",
    params(("auction_id" = String, Path, description = "Id of the auction")),
    responses(
        (status = 200, description = "The auction is now live", body = AuctionSnapshot),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
        (status = 409, description = "The auction is not scheduled", body = ErrorBodyResponse),
    ),
)]
pub async fn start_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<AuctionSnapshot>, RestError> {
    auth.require_admin()?;
    let snapshot = store
        .auction_service
        .transition_status(TransitionStatusInput {
            auction_id,
            from: AuctionStatus::Scheduled,
            to: AuctionStatus::Live,
        })
        .await?;
    Ok(Json(snapshot))
}

/// Close bidding on a live auction. Operator only.
#[utoipa::path(post, path = "/v1/auctions/{auction_id}/end",
    params(("auction_id" = String, Path, description = "Id of the auction")),
    responses(
        (status = 200, description = "The auction is completed", body = AuctionSnapshot),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
        (status = 409, description = "The auction is not live", body = ErrorBodyResponse),
    ),
)]
pub async fn end_auction(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Path(auction_id): Path<AuctionId>,
) -> Result<Json<AuctionSnapshot>, RestError> {
    auth.require_admin()?;
    let snapshot = store
        .auction_service
        .transition_status(TransitionStatusInput {
            auction_id,
            from: AuctionStatus::Live,
            to: AuctionStatus::Completed,
        })
        .await?;
    Ok(Json(snapshot))
}
