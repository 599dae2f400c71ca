use {
    super::Repository,
    crate::auction::entities,
    saleroom_api_types::auction::AuctionId,
};

impl Repository {
    pub async fn get_in_memory_auction(&self, auction_id: AuctionId) -> Option<entities::Auction> {
        self.in_memory_store
            .auctions
            .read()
            .await
            .get(&auction_id)
            .cloned()
    }
}
