use {
    super::{
        ChatMessage,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    pub async fn add_chat_message(&self, message: &entities::ChatMessage) -> Result<(), RestError> {
        self.db.add_chat_message(&ChatMessage::new(message)).await
    }
}
