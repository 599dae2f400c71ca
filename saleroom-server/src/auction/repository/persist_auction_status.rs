use {
    super::Repository,
    crate::api::RestError,
    saleroom_api_types::auction::{
        AuctionId,
        AuctionStatus,
    },
};

impl Repository {
    /// Writes a committed lifecycle transition through to storage.
    pub async fn persist_auction_status(
        &self,
        auction_id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RestError> {
        self.db.update_auction_status(auction_id, status).await
    }
}
