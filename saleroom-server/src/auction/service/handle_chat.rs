use {
    super::Service,
    crate::{
        api::{
            ws::UpdateEvent,
            Principal,
            RestError,
        },
        auction::entities,
    },
    saleroom_api_types::chat::ChatMessageCreate,
};

pub struct HandleChatInput {
    pub chat_create: ChatMessageCreate,
    pub sender:      Principal,
}

impl Service {
    /// Posts a chat message to an auction room. Delivery reuses the fan-out;
    /// storage of the message is append-only and fire-and-forget.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn handle_chat(
        &self,
        input: HandleChatInput,
    ) -> Result<entities::ChatMessage, RestError> {
        let auction_id = input.chat_create.auction_id;
        tracing::Span::current().record("auction_id", auction_id.to_string());

        // Chat is only valid against a known auction.
        self.repo.get_or_load_auction(auction_id).await?;

        let message =
            entities::ChatMessage::new(auction_id, &input.sender, input.chat_create.message);

        self.task_tracker.spawn({
            let (repo, message) = (self.repo.clone(), message.clone());
            async move {
                if let Err(e) = repo.add_chat_message(&message).await {
                    tracing::error!(error = ?e, message_id = %message.id, "Failed to persist chat message");
                }
            }
        });
        self.broadcast(UpdateEvent::ChatMessage(message.clone().into()));

        Ok(message)
    }
}
