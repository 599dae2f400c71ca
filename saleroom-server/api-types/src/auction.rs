use {
    crate::Amount,
    serde::{
        Deserialize,
        Serialize,
    },
    strum::{
        Display,
        EnumString,
    },
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type AuctionId = Uuid;

#[derive(
    Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq, Eq, Debug, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AuctionStatus {
    Scheduled,
    Live,
    Completed,
}

impl AuctionStatus {
    /// The lifecycle only moves forward: `scheduled -> live -> completed`.
    pub fn can_transition_to(self, to: AuctionStatus) -> bool {
        matches!(
            (self, to),
            (AuctionStatus::Scheduled, AuctionStatus::Live)
                | (AuctionStatus::Live, AuctionStatus::Completed)
        )
    }
}

/// The current state of an auction room as seen by a newly joined client.
#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AuctionSnapshot {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:    AuctionId,
    pub status:        AuctionStatus,
    /// The highest accepted bid so far, or the starting price if there is none.
    #[schema(example = 15000)]
    pub current_price: Amount,
}

/// Payload of the `auctionStatus` event.
#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
    pub status:     AuctionStatus,
}
