use {
    super::Repository,
    saleroom_api_types::auction::AuctionId,
};

impl Repository {
    /// Drops the admission lock entry for an auction whose lifecycle has ended.
    /// Tasks still holding a clone of the lock finish against terminal state.
    pub async fn remove_auction_lock(&self, auction_id: AuctionId) {
        self.in_memory_store
            .auction_lock
            .lock()
            .await
            .remove(&auction_id);
    }
}
