use {
    super::Service,
    crate::api::RestError,
    saleroom_api_types::auction::{
        AuctionId,
        AuctionSnapshot,
    },
};

pub struct GetAuctionInput {
    pub auction_id: AuctionId,
}

impl Service {
    /// The auction's current `{status, price}` pair, seeding the in-memory state
    /// from storage on first touch.
    pub async fn get_auction(&self, input: GetAuctionInput) -> Result<AuctionSnapshot, RestError> {
        Ok(self
            .repo
            .get_or_load_auction(input.auction_id)
            .await?
            .snapshot())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::repository::{
            self,
            MockDatabase,
        },
        saleroom_api_types::auction::AuctionStatus,
        uuid::Uuid,
    };

    #[tokio::test]
    async fn seeds_from_storage_only_once() {
        let auction_id = Uuid::new_v4();
        let mut db = MockDatabase::new();
        db.expect_get_auction().times(1).returning(|id| {
            Ok(repository::Auction {
                id,
                status: "scheduled".to_string(),
                starting_price: 10000,
                current_price: 0,
            })
        });
        let (service, _events) = Service::new_with_mocks(db);

        for _ in 0..3 {
            let snapshot = service
                .get_auction(GetAuctionInput { auction_id })
                .await
                .unwrap();
            assert_eq!(snapshot.auction_id, auction_id);
            assert_eq!(snapshot.status, AuctionStatus::Scheduled);
            // An auction without bids reports its starting price.
            assert_eq!(snapshot.current_price, 10000);
        }
    }

    #[tokio::test]
    async fn unknown_auction_is_a_typed_error() {
        let mut db = MockDatabase::new();
        db.expect_get_auction()
            .returning(|_| Err(RestError::AuctionNotFound));
        let (service, _events) = Service::new_with_mocks(db);

        let result = service
            .get_auction(GetAuctionInput {
                auction_id: Uuid::new_v4(),
            })
            .await;
        assert_eq!(result.unwrap_err(), RestError::AuctionNotFound);
    }
}
