use {
    crate::{
        auction::{
            AuctionId,
            AuctionSnapshot,
            StatusUpdate,
        },
        bid::{
            Bid,
            BidCreate,
            BidId,
            BidKind,
        },
        chat::{
            ChatMessage,
            ChatMessageCreate,
        },
        Amount,
    },
    serde::{
        Deserialize,
        Serialize,
    },
    time::OffsetDateTime,
    utoipa::ToSchema,
    uuid::Uuid,
};

#[derive(Deserialize, Clone, ToSchema, Serialize)]
#[serde(tag = "method", content = "params")]
pub enum ClientMessage {
    /// Join an auction room. A connection belongs to one room at a time, so joining
    /// another room leaves the current one first.
    #[serde(rename = "join_room", rename_all = "camelCase")]
    JoinRoom {
        #[schema(value_type = String)]
        auction_id:   AuctionId,
        /// Shown to other participants. Ignored for authenticated callers, whose
        /// profile name takes precedence.
        display_name: Option<String>,
    },
    #[serde(rename = "leave_room")]
    LeaveRoom,
    #[serde(rename = "post_bid")]
    PostBid { bid: BidCreate },
    #[serde(rename = "post_chat")]
    PostChat { chat: ChatMessageCreate },
}

#[derive(Deserialize, Clone, ToSchema, Serialize)]
pub struct ClientRequest {
    pub id:  String,
    #[serde(flatten)]
    pub msg: ClientMessage,
}

/// Payload of the `bidUpdated` event.
#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct BidUpdate {
    #[schema(example = "obo3ee3e-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub id:          BidId,
    #[schema(example = "beedbeed-58cc-4372-a567-0e02b2c3d479", value_type = String)]
    pub auction_id:  AuctionId,
    #[schema(example = 15000)]
    pub new_price:   Amount,
    #[schema(example = "J. Appleseed")]
    pub bidder_name: String,
    pub kind:        BidKind,
    #[schema(example = "2024-05-23T21:26:57.329954Z", value_type = String)]
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp:   OffsetDateTime,
}

#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    /// Absent for anonymous viewers.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<String>)]
    pub identity:     Option<Uuid>,
    pub display_name: String,
}

/// Payload of the `participantUpdate` event: the full membership of the room,
/// not a delta.
#[derive(Serialize, Deserialize, ToSchema, Clone, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PresenceSnapshot {
    pub count:        usize,
    pub participants: Vec<Participant>,
}

/// This enum is used to send an update to the client for the room it has joined.
#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum ServerUpdateResponse {
    #[serde(rename = "bidUpdated")]
    BidUpdated(BidUpdate),
    #[serde(rename = "participantUpdate")]
    ParticipantUpdate(PresenceSnapshot),
    #[serde(rename = "chatMessage")]
    ChatMessage(ChatMessage),
    #[serde(rename = "auctionStatus")]
    AuctionStatus(StatusUpdate),
}

#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
#[serde(untagged)]
pub enum APIResponse {
    AuctionSnapshot(AuctionSnapshot),
    BidResult(Bid),
    ChatResult(ChatMessage),
}

#[derive(Serialize, Clone, ToSchema, Deserialize, Debug, PartialEq)]
#[serde(tag = "status", content = "result")]
pub enum ServerResultMessage {
    #[serde(rename = "success")]
    Success(Option<APIResponse>),
    #[serde(rename = "error")]
    Err(String),
}

/// This enum is used to send the result for a specific client request with the same id.
/// Id is only None when the client message is invalid.
#[derive(Serialize, ToSchema, Deserialize, Clone, Debug, PartialEq)]
pub struct ServerResultResponse {
    pub id:     Option<String>,
    #[serde(flatten)]
    pub result: ServerResultMessage,
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::AuctionStatus,
        serde_json::json,
    };

    #[test]
    fn bid_updated_envelope_shape() {
        let auction_id = Uuid::new_v4();
        let bid_id = Uuid::new_v4();
        let update = ServerUpdateResponse::BidUpdated(BidUpdate {
            id:          bid_id,
            auction_id,
            new_price:   15000,
            bidder_name: "J. Appleseed".to_string(),
            kind:        BidKind::Online,
            timestamp:   OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
        });
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "bidUpdated",
                "data": {
                    "id": bid_id,
                    "auctionId": auction_id,
                    "newPrice": 15000,
                    "bidderName": "J. Appleseed",
                    "kind": "online",
                    "timestamp": "2023-11-14T22:13:20Z",
                },
            })
        );
    }

    #[test]
    fn participant_update_envelope_shape() {
        let update = ServerUpdateResponse::ParticipantUpdate(PresenceSnapshot {
            count:        1,
            participants: vec![Participant {
                identity:     None,
                display_name: "Guest".to_string(),
            }],
        });
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "participantUpdate",
                "data": {
                    "count": 1,
                    "participants": [{"displayName": "Guest"}],
                },
            })
        );
    }

    #[test]
    fn auction_status_envelope_shape() {
        let auction_id = Uuid::new_v4();
        let update = ServerUpdateResponse::AuctionStatus(StatusUpdate {
            auction_id,
            status: AuctionStatus::Completed,
        });
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "auctionStatus",
                "data": {
                    "auctionId": auction_id,
                    "status": "completed",
                },
            })
        );
    }

    #[test]
    fn client_request_roundtrip() {
        let raw = json!({
            "id": "1",
            "method": "join_room",
            "params": {
                "auctionId": "beedbeed-58cc-4372-a567-0e02b2c3d479",
                "displayName": "Guest",
            },
        });
        let request: ClientRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(request.id, "1");
        match request.msg {
            ClientMessage::JoinRoom {
                auction_id,
                display_name,
            } => {
                assert_eq!(
                    auction_id,
                    "beedbeed-58cc-4372-a567-0e02b2c3d479".parse::<Uuid>().unwrap()
                );
                assert_eq!(display_name.as_deref(), Some("Guest"));
            }
            _ => panic!("expected join_room"),
        }
    }
}
