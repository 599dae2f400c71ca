use {
    super::{
        Auth,
        RestError,
    },
    crate::{
        auction::service::handle_chat::HandleChatInput,
        state::Store,
    },
    axum::{
        extract::State,
        Json,
    },
    saleroom_api_types::{
        chat::{
            ChatMessage,
            ChatMessageCreate,
        },
        ErrorBodyResponse,
    },
    std::sync::Arc,
};

/// Post a chat message to an auction room.
///
/// The message is fanned out to every member of the room; storage happens in
/// the background and never blocks delivery.
#[utoipa::path(post, path = "/v1/chat", request_body = ChatMessageCreate,
    responses(
        (status = 200, description = "The message was posted", body = ChatMessage),
        (status = 404, description = "Auction was not found", body = ErrorBodyResponse),
    ),
)]
pub async fn post_chat(
    auth: Auth,
    State(store): State<Arc<Store>>,
    Json(chat_create): Json<ChatMessageCreate>,
) -> Result<Json<ChatMessage>, RestError> {
    let sender = auth.require_principal()?.clone();
    let message = store
        .auction_service
        .handle_chat(HandleChatInput {
            chat_create,
            sender,
        })
        .await?;
    Ok(Json(message.into()))
}
