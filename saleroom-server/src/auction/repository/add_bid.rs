use {
    super::{
        Bid,
        Repository,
    },
    crate::{
        api::RestError,
        auction::entities,
    },
};

impl Repository {
    /// Appends an accepted bid to storage. Callers treat this as fire-and-forget;
    /// a failure here is logged and never revokes the admission.
    pub async fn add_bid(&self, bid: &entities::Bid) -> Result<(), RestError> {
        self.db.add_bid(&Bid::new(bid)).await
    }
}
