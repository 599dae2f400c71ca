use {
    crate::{
        api::ws::WsState,
        auction::service::Service,
        room::Registry,
    },
    tokio_util::task::TaskTracker,
};

pub struct Store {
    pub auction_service: Service,
    pub room_registry:   Registry,
    pub ws:              WsState,
    pub task_tracker:    TaskTracker,
}
