use {
    crate::api::Principal,
    saleroom_api_types::{
        auction::AuctionId,
        chat::{
            self,
            ChatMessageId,
        },
    },
    time::OffsetDateTime,
    uuid::Uuid,
};

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id:            ChatMessageId,
    pub auction_id:    AuctionId,
    pub sender:        Option<Uuid>,
    pub sender_name:   String,
    pub message:       String,
    pub is_admin:      bool,
    pub creation_time: OffsetDateTime,
}

impl ChatMessage {
    pub fn new(auction_id: AuctionId, sender: &Principal, message: String) -> Self {
        Self {
            id: ChatMessageId::new_v4(),
            auction_id,
            sender: Some(sender.id),
            sender_name: sender.name.clone(),
            message,
            is_admin: sender.is_admin,
            creation_time: OffsetDateTime::now_utc(),
        }
    }
}

impl From<ChatMessage> for chat::ChatMessage {
    fn from(message: ChatMessage) -> Self {
        Self {
            id:          message.id,
            auction_id:  message.auction_id,
            sender:      message.sender,
            sender_name: message.sender_name,
            message:     message.message,
            is_admin:    message.is_admin,
            timestamp:   message.creation_time,
        }
    }
}
