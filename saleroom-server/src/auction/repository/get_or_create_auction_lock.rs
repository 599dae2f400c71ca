use {
    super::Repository,
    crate::auction::entities,
    saleroom_api_types::auction::AuctionId,
};

impl Repository {
    pub async fn get_or_create_auction_lock(&self, auction_id: AuctionId) -> entities::AuctionLock {
        self.in_memory_store
            .auction_lock
            .lock()
            .await
            .entry(auction_id)
            .or_default()
            .clone()
    }
}
