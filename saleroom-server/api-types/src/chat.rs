use {
    crate::auction::AuctionId,
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::{
        ToResponse,
        ToSchema,
    },
    uuid::Uuid,
};

pub type ChatMessageId = Uuid;

/// A chat message as delivered to the members of an auction room.
#[derive(Serialize, Deserialize, ToResponse, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[schema(example = "a1a2a3a4-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:          ChatMessageId,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:  AuctionId,
    /// The identity of the sender, absent for system messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub sender:      Option<Uuid>,
    #[schema(example = "J. Appleseed")]
    pub sender_name: String,
    pub message:     String,
    /// Whether the sender holds the operator role, so clients can render it distinctly.
    pub is_admin:    bool,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp:   OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessageCreate {
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id: AuctionId,
    pub message:    String,
}
