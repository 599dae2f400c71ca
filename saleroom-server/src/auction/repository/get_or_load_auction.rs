use {
    super::Repository,
    crate::{
        api::RestError,
        auction::entities,
    },
    saleroom_api_types::auction::AuctionId,
};

impl Repository {
    /// Returns the auction's in-memory state, seeding it from storage on first
    /// touch. Callers must not hold the auction's admission lock: this can
    /// block on the database.
    #[tracing::instrument(skip_all, fields(auction_id))]
    pub async fn get_or_load_auction(
        &self,
        auction_id: AuctionId,
    ) -> Result<entities::Auction, RestError> {
        tracing::Span::current().record("auction_id", auction_id.to_string());
        if let Some(auction) = self.get_in_memory_auction(auction_id).await {
            return Ok(auction);
        }

        let auction = self
            .db
            .get_auction(auction_id)
            .await?
            .get_auction_entity()
            .map_err(|e| {
                tracing::error!(error = e.to_string(), auction_id = %auction_id, "Failed to convert auction row to entity");
                RestError::TemporarilyUnavailable
            })?;

        // Concurrent first touches can race the load. The first insert wins so a
        // price committed in the meantime is never clobbered by a stale snapshot.
        let mut auctions = self.in_memory_store.auctions.write().await;
        Ok(auctions.entry(auction_id).or_insert(auction).clone())
    }
}
