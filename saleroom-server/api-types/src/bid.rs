use {
    crate::{
        auction::AuctionId,
        Amount,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    strum::Display,
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type BidId = Uuid;

#[derive(Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BidKind {
    /// Submitted by a connected participant.
    Online,
    /// Entered by an operator on behalf of an in-person bidder.
    Floor,
}

/// A bid accepted by the admission pipeline.
#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Bid {
    /// The unique id created to identify the bid.
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:            BidId,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:    AuctionId,
    /// The accepted amount, which is the auction's new current price.
    #[schema(example = 15000)]
    pub amount:        Amount,
    pub kind:          BidKind,
    /// The name shown to other participants.
    #[schema(example = "J. Appleseed")]
    pub bidder_name:   String,
    /// The paddle number of an in-person bidder. Only present on floor bids.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(example = "42")]
    pub bidder_number: Option<String>,
    /// The time the bid was admitted, formatted in rfc3339.
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp:     OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidCreate {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
    /// The offered amount. Must be strictly greater than the current price.
    #[schema(example = 15000)]
    pub amount:     Amount,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct FloorBidCreate {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:    AuctionId,
    /// The offered amount. Must be strictly greater than the current price.
    #[schema(example = 15000)]
    pub amount:        Amount,
    /// The name of the in-person bidder, as announced by the operator.
    #[schema(example = "Paddle 42")]
    pub bidder_name:   String,
    #[schema(example = "42")]
    pub bidder_number: Option<String>,
}
