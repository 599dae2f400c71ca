use {
    super::entities,
    saleroom_api_types::auction::AuctionId,
    std::collections::HashMap,
    tokio::sync::{
        Mutex,
        RwLock,
    },
};

mod add_bid;
mod add_chat_message;
mod get_in_memory_auction;
mod get_or_create_auction_lock;
mod get_or_load_auction;
mod models;
mod persist_auction_status;
mod remove_auction_lock;
mod update_in_memory_auction;

pub use models::*;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    pub auctions:     RwLock<HashMap<AuctionId, entities::Auction>>,
    pub auction_lock: Mutex<HashMap<AuctionId, entities::AuctionLock>>,
}

#[derive(Debug)]
pub struct Repository {
    pub in_memory_store: InMemoryStore,
    db:                  Box<dyn Database>,
}

impl Repository {
    pub fn new(db: impl Database) -> Self {
        Self {
            in_memory_store: InMemoryStore::default(),
            db:              Box::new(db),
        }
    }
}
