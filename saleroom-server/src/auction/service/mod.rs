use {
    super::repository::{
        self,
        Database,
        Repository,
    },
    crate::api::ws::UpdateEvent,
    std::sync::Arc,
    tokio::sync::broadcast,
    tokio_util::task::TaskTracker,
};

pub mod get_auction;
pub mod handle_bid;
pub mod handle_chat;
pub mod transition_status;

pub struct ServiceInner {
    repo:         Arc<Repository>,
    task_tracker: TaskTracker,
    event_sender: broadcast::Sender<UpdateEvent>,
}

#[derive(Clone)]
pub struct Service(Arc<ServiceInner>);
impl std::ops::Deref for Service {
    type Target = ServiceInner;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Service {
    pub fn new(
        db: impl Database,
        task_tracker: TaskTracker,
        event_sender: broadcast::Sender<UpdateEvent>,
    ) -> Self {
        Self(Arc::new(ServiceInner {
            repo: Arc::new(repository::Repository::new(db)),
            task_tracker,
            event_sender,
        }))
    }

    /// Hands an event to the fan-out. The send only enqueues, so it is safe to
    /// call inside a critical section; events leave in the order they are sent.
    pub(crate) fn broadcast(&self, event: UpdateEvent) {
        if let Err(e) = self.event_sender.send(event) {
            tracing::error!(error = e.to_string(), "Failed to send update event");
        }
    }
}
