use {
    super::Repository,
    crate::auction::entities,
};

impl Repository {
    /// Replaces the auction's in-memory state. Callers hold the auction's
    /// admission lock, so concurrent writers cannot interleave here.
    pub async fn update_in_memory_auction(&self, auction: entities::Auction) {
        self.in_memory_store
            .auctions
            .write()
            .await
            .insert(auction.id, auction);
    }
}
