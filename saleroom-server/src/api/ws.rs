use {
    super::{
        Auth,
        RestError,
    },
    crate::{
        auction::{
            entities,
            service::{
                get_auction::GetAuctionInput,
                handle_bid::HandleBidInput,
                handle_chat::HandleChatInput,
            },
        },
        room::{
            ConnectionId,
            Member,
        },
        server::{
            EXIT_CHECK_INTERVAL,
            SHOULD_EXIT,
        },
        state::Store,
    },
    anyhow::{
        anyhow,
        Result,
    },
    axum::{
        extract::{
            ws::{
                Message,
                WebSocket,
            },
            State,
            WebSocketUpgrade,
        },
        response::IntoResponse,
    },
    futures::{
        stream::{
            SplitSink,
            SplitStream,
        },
        SinkExt,
        StreamExt,
    },
    saleroom_api_types::{
        auction::{
            AuctionId,
            StatusUpdate,
        },
        bid::BidCreate,
        chat::{
            ChatMessage,
            ChatMessageCreate,
        },
        ws::{
            APIResponse,
            BidUpdate,
            ClientMessage,
            ClientRequest,
            PresenceSnapshot,
            ServerResultMessage,
            ServerResultResponse,
            ServerUpdateResponse,
        },
    },
    std::{
        future::Future,
        sync::{
            atomic::{
                AtomicUsize,
                Ordering,
            },
            Arc,
        },
        time::Duration,
    },
    tokio::sync::{
        broadcast,
        mpsc,
        Semaphore,
    },
    tracing::{
        instrument,
        Instrument,
    },
};

pub struct WsState {
    subscriber_counter:     AtomicUsize,
    pub broadcast_sender:   broadcast::Sender<UpdateEvent>,
    pub broadcast_receiver: broadcast::Receiver<UpdateEvent>,
}

impl WsState {
    pub fn new(broadcast_channel_size: usize) -> Self {
        let (broadcast_sender, broadcast_receiver) = broadcast::channel(broadcast_channel_size);
        Self {
            subscriber_counter: AtomicUsize::new(0),
            broadcast_sender,
            broadcast_receiver,
        }
    }

    pub fn next_subscriber_id(&self) -> ConnectionId {
        self.subscriber_counter.fetch_add(1, Ordering::SeqCst)
    }
}

/// Room-scoped events fanned out to every member of the affected auction's room.
#[derive(Clone, Debug, PartialEq)]
pub enum UpdateEvent {
    BidUpdated(BidUpdate),
    ParticipantUpdate {
        auction_id: AuctionId,
        snapshot:   PresenceSnapshot,
    },
    ChatMessage(ChatMessage),
    AuctionStatus(StatusUpdate),
}

impl UpdateEvent {
    pub fn auction_id(&self) -> AuctionId {
        match self {
            UpdateEvent::BidUpdated(update) => update.auction_id,
            UpdateEvent::ParticipantUpdate { auction_id, .. } => *auction_id,
            UpdateEvent::ChatMessage(message) => message.auction_id,
            UpdateEvent::AuctionStatus(update) => update.auction_id,
        }
    }
}

impl From<UpdateEvent> for ServerUpdateResponse {
    fn from(event: UpdateEvent) -> Self {
        match event {
            UpdateEvent::BidUpdated(update) => ServerUpdateResponse::BidUpdated(update),
            UpdateEvent::ParticipantUpdate { snapshot, .. } => {
                ServerUpdateResponse::ParticipantUpdate(snapshot)
            }
            UpdateEvent::ChatMessage(message) => ServerUpdateResponse::ChatMessage(message),
            UpdateEvent::AuctionStatus(update) => ServerUpdateResponse::AuctionStatus(update),
        }
    }
}

pub async fn ws_route_handler(
    auth: Auth,
    ws: WebSocketUpgrade,
    State(store): State<Arc<Store>>,
) -> impl IntoResponse {
    let subscriber_id = store.ws.next_subscriber_id();
    ws.on_upgrade(move |socket| websocket_handler(socket, store, subscriber_id, auth))
}

async fn websocket_handler(
    stream: WebSocket,
    store: Arc<Store>,
    subscriber_id: ConnectionId,
    auth: Auth,
) {
    let (sender, receiver) = stream.split();
    let new_receiver = store.ws.broadcast_receiver.resubscribe();
    let mut subscriber = Subscriber::new(subscriber_id, store.clone(), new_receiver, receiver, sender, auth);
    subscriber.run().await;
    // However the connection ended, its membership goes with it. This is also
    // the prune path for failed deliveries; the registry's leave recomputes
    // presence for the room and is a no-op if the connection never joined.
    store.room_registry.leave(subscriber_id).await;
}

const PING_INTERVAL_DURATION: Duration = Duration::from_secs(30);
/// A member that cannot take a frame within this bound is treated as
/// disconnected, so one stalled connection never holds up its room.
const SEND_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ACTIVE_REQUESTS: usize = 50;

fn ok_response(id: String) -> ServerResultResponse {
    ServerResultResponse {
        id:     Some(id),
        result: ServerResultMessage::Success(None),
    }
}

fn err_response(id: String, error: RestError) -> ServerResultResponse {
    ServerResultResponse {
        id:     Some(id),
        result: ServerResultMessage::Err(error.to_status_and_message().1),
    }
}

/// Subscriber is an actor that handles a single websocket connection.
/// It listens to the fan-out for updates of the room it has joined and sends
/// them to the client.
pub struct Subscriber {
    id:                  ConnectionId,
    closed:              bool,
    store:               Arc<Store>,
    notify_receiver:     broadcast::Receiver<UpdateEvent>,
    receiver:            SplitStream<WebSocket>,
    sender:              SplitSink<WebSocket, Message>,
    auth:                Auth,
    joined_auction_id:   Option<AuctionId>,
    ping_interval:       tokio::time::Interval,
    exit_check_interval: tokio::time::Interval,
    responded_to_ping:   bool,
    active_requests:     Arc<Semaphore>,
    response_sender:     mpsc::UnboundedSender<ServerResultResponse>,
    response_receiver:   mpsc::UnboundedReceiver<ServerResultResponse>,
}

impl Subscriber {
    pub fn new(
        id: ConnectionId,
        store: Arc<Store>,
        notify_receiver: broadcast::Receiver<UpdateEvent>,
        receiver: SplitStream<WebSocket>,
        sender: SplitSink<WebSocket, Message>,
        auth: Auth,
    ) -> Self {
        let (response_sender, response_receiver) = mpsc::unbounded_channel();
        Self {
            id,
            closed: false,
            store,
            notify_receiver,
            receiver,
            sender,
            auth,
            joined_auction_id: None,
            ping_interval: tokio::time::interval(PING_INTERVAL_DURATION),
            exit_check_interval: tokio::time::interval(EXIT_CHECK_INTERVAL),
            responded_to_ping: true, // We start with true so we don't close the connection immediately
            active_requests: Arc::new(Semaphore::new(MAX_ACTIVE_REQUESTS)),
            response_sender,
            response_receiver,
        }
    }

    pub async fn run(&mut self) {
        while !self.closed {
            if let Err(e) = self.handle_next().await {
                tracing::debug!(subscriber = self.id, error = ?e, "Error Handling Subscriber Message.");
                break;
            }
        }
    }

    async fn handle_next(&mut self) -> Result<()> {
        tokio::select! {
            maybe_update_event = self.notify_receiver.recv() => {
                match maybe_update_event {
                    Ok(event) => self.handle_update(event).await,
                    // A lagged receiver means the client cannot keep up with the
                    // room; it is pruned like any other failed delivery.
                    Err(e) => Err(anyhow!("Error receiving update event: {:?}", e)),
                }
            },
            maybe_message_or_err = self.receiver.next() => {
                self.handle_client_message(
                    maybe_message_or_err.ok_or(anyhow!("Client channel is closed"))??
                ).await
            },
            maybe_response = self.response_receiver.recv() => {
                match maybe_response {
                    Some(response) => {
                        let message = serde_json::to_string(&response)?;
                        self.send(message).await
                    }
                    None => Err(anyhow!("Response channel is closed")),
                }
            },
            _ = self.ping_interval.tick() => {
                if !self.responded_to_ping {
                    return Err(anyhow!("Subscriber did not respond to ping. Closing connection."));
                }
                self.responded_to_ping = false;
                self.sender.send(Message::Ping(vec![])).await?;
                Ok(())
            },
            _ = self.exit_check_interval.tick() => {
                if SHOULD_EXIT.load(Ordering::Acquire) {
                    self.sender.close().await?;
                    self.closed = true;
                    return Err(anyhow!("Application is shutting down. Closing connection."));
                }
                Ok(())
            }
        }
    }

    async fn send(&mut self, message: String) -> Result<()> {
        tokio::time::timeout(SEND_TIMEOUT, self.sender.send(message.into()))
            .await
            .map_err(|_| anyhow!("Timed out sending to subscriber"))??;
        Ok(())
    }

    #[instrument(skip_all, fields(subscriber = self.id))]
    async fn handle_update(&mut self, event: UpdateEvent) -> Result<()> {
        if self.joined_auction_id != Some(event.auction_id()) {
            // Irrelevant update
            return Ok(());
        }
        let message = serde_json::to_string(&ServerUpdateResponse::from(event))?;
        self.send(message).await
    }

    fn send_response(
        response_sender: &mpsc::UnboundedSender<ServerResultResponse>,
        response: ServerResultResponse,
    ) {
        if response_sender.send(response).is_err() {
            tracing::warn!("Error sending response to subscriber");
        }
    }

    async fn spawn_deferred(
        &mut self,
        fut: impl Future<Output = ServerResultResponse> + Send + 'static,
    ) {
        let permit = self
            .active_requests
            .clone()
            .acquire_owned()
            .await
            .expect("Semaphore should not be closed");
        let response_sender = self.response_sender.clone();
        self.store.task_tracker.spawn(
            async move {
                let resp = fut.await;
                Self::send_response(&response_sender, resp);
                drop(permit);
            }
            .in_current_span(),
        );
    }

    async fn handle_join_room(
        &mut self,
        message_id: String,
        auction_id: AuctionId,
        display_name: Option<String>,
    ) {
        let member = match &self.auth.principal {
            Some(principal) => Member {
                identity:     Some(principal.id),
                display_name: principal.name.clone(),
            },
            None => Member {
                identity:     None,
                display_name: display_name.unwrap_or_else(|| "Guest".to_string()),
            },
        };
        // The joiner gets the room's current state in the response; everyone,
        // including the joiner, gets the presence update through the fan-out.
        let resp = match self
            .store
            .auction_service
            .get_auction(GetAuctionInput { auction_id })
            .await
        {
            Ok(snapshot) => {
                self.joined_auction_id = Some(auction_id);
                self.store
                    .room_registry
                    .join(auction_id, self.id, member)
                    .await;
                ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Success(Some(APIResponse::AuctionSnapshot(
                        snapshot,
                    ))),
                }
            }
            Err(e) => err_response(message_id, e),
        };
        Self::send_response(&self.response_sender, resp);
    }

    async fn handle_leave_room(&mut self, message_id: String) {
        self.store.room_registry.leave(self.id).await;
        self.joined_auction_id = None;
        Self::send_response(&self.response_sender, ok_response(message_id));
    }

    async fn handle_post_bid(&mut self, message_id: String, bid: BidCreate) {
        let bidder = match &self.auth.principal {
            Some(principal) => entities::Bidder::Online {
                identity:     principal.id,
                display_name: principal.name.clone(),
            },
            None => {
                return Self::send_response(
                    &self.response_sender,
                    err_response(message_id, RestError::Unauthorized),
                );
            }
        };
        let store = self.store.clone();
        self.spawn_deferred(async move {
            match store
                .auction_service
                .handle_bid(HandleBidInput {
                    bid_create: entities::BidCreate {
                        auction_id: bid.auction_id,
                        amount: bid.amount,
                        bidder,
                    },
                })
                .await
            {
                Ok(bid) => ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Success(Some(APIResponse::BidResult(bid.into()))),
                },
                Err(e) => err_response(message_id, e),
            }
        })
        .await;
    }

    async fn handle_post_chat(&mut self, message_id: String, chat: ChatMessageCreate) {
        let sender = match &self.auth.principal {
            Some(principal) => principal.clone(),
            None => {
                return Self::send_response(
                    &self.response_sender,
                    err_response(message_id, RestError::Unauthorized),
                );
            }
        };
        let store = self.store.clone();
        self.spawn_deferred(async move {
            match store
                .auction_service
                .handle_chat(HandleChatInput {
                    chat_create: chat,
                    sender,
                })
                .await
            {
                Ok(message) => ServerResultResponse {
                    id:     Some(message_id),
                    result: ServerResultMessage::Success(Some(APIResponse::ChatResult(
                        message.into(),
                    ))),
                },
                Err(e) => err_response(message_id, e),
            }
        })
        .await;
    }

    async fn handle_client_message(&mut self, message: Message) -> Result<()> {
        let maybe_client_message = match message {
            Message::Close(_) => {
                // Closing the connection. Send the close message to gracefully
                // shut down the connection, otherwise the client might get an
                // abnormal Websocket closure error.
                if let Err(e) = self.sender.close().await {
                    return Err(e.into());
                }
                self.closed = true;
                return Ok(());
            }
            Message::Text(text) => serde_json::from_str::<ClientRequest>(&text),
            Message::Binary(data) => serde_json::from_slice::<ClientRequest>(&data),
            Message::Ping(_) => {
                // Axum will send Pong automatically
                return Ok(());
            }
            Message::Pong(_) => {
                self.responded_to_ping = true;
                return Ok(());
            }
        };

        match maybe_client_message {
            Err(e) => {
                Self::send_response(
                    &self.response_sender,
                    ServerResultResponse {
                        id:     None,
                        result: ServerResultMessage::Err(e.to_string()),
                    },
                );
            }
            Ok(ClientRequest { msg, id }) => match msg {
                ClientMessage::JoinRoom {
                    auction_id,
                    display_name,
                } => self.handle_join_room(id, auction_id, display_name).await,
                ClientMessage::LeaveRoom => self.handle_leave_room(id).await,
                ClientMessage::PostBid { bid } => self.handle_post_bid(id, bid).await,
                ClientMessage::PostChat { chat } => self.handle_post_chat(id, chat).await,
            },
        };

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        uuid::Uuid,
    };

    #[test]
    fn events_carry_the_room_they_belong_to() {
        let auction_id = Uuid::new_v4();
        let event = UpdateEvent::ParticipantUpdate {
            auction_id,
            snapshot: PresenceSnapshot {
                count:        0,
                participants: vec![],
            },
        };
        assert_eq!(event.auction_id(), auction_id);

        let response = ServerUpdateResponse::from(event);
        assert_eq!(
            serde_json::to_value(&response).unwrap()["type"],
            "participantUpdate"
        );
    }
}
