use {
    super::Service,
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
        auction::entities,
    },
    saleroom_api_types::ws::BidUpdate,
};

pub struct HandleBidInput {
    pub bid_create: entities::BidCreate,
}

impl Service {
    /// Admits or rejects a bid against the auction's current price.
    ///
    /// The status check, the price comparison and the price commit run as one
    /// critical section under the auction's lock, so no two submissions for the
    /// same auction can interleave between the read and the write. Submissions
    /// for different auctions take different locks and proceed in parallel.
    /// Storage writes happen after the lock is released.
    #[tracing::instrument(skip_all, fields(auction_id, bid_id))]
    pub async fn handle_bid(&self, input: HandleBidInput) -> Result<entities::Bid, RestError> {
        let auction_id = input.bid_create.auction_id;
        tracing::Span::current().record("auction_id", auction_id.to_string());

        // Seeding goes to storage, so it happens before the lock is taken.
        self.repo.get_or_load_auction(auction_id).await?;

        let auction_lock = self.repo.get_or_create_auction_lock(auction_id).await;
        let bid = {
            let _lock = auction_lock.lock().await;
            let mut auction = self
                .repo
                .get_in_memory_auction(auction_id)
                .await
                .ok_or(RestError::AuctionNotFound)?;
            auction.validate_bid(input.bid_create.amount)?;

            let bid = entities::Bid::new(input.bid_create);
            auction.current_price = bid.amount;
            self.repo.update_in_memory_auction(auction).await;
            self.broadcast(UpdateEvent::BidUpdated(BidUpdate::from(&bid)));
            bid
        };
        tracing::Span::current().record("bid_id", bid.id.to_string());

        self.task_tracker.spawn({
            let (repo, bid) = (self.repo.clone(), bid.clone());
            async move {
                if let Err(e) = repo.add_bid(&bid).await {
                    tracing::error!(error = ?e, bid_id = %bid.id, "Failed to persist accepted bid");
                }
            }
        });

        Ok(bid)
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
        saleroom_api_types::{
            auction::AuctionId,
            bid::BidKind,
            Amount,
        },
        uuid::Uuid,
    };

    fn mock_db(status: &str, price: Amount) -> MockDatabase {
        let status = status.to_string();
        let mut db = MockDatabase::new();
        db.expect_get_auction().returning(move |id| {
            Ok(repository::Auction {
                id,
                status: status.clone(),
                starting_price: price,
                current_price: price,
            })
        });
        db.expect_add_bid().returning(|_| Ok(()));
        db
    }

    fn online_bid(auction_id: AuctionId, amount: Amount) -> HandleBidInput {
        HandleBidInput {
            bid_create: entities::BidCreate {
                auction_id,
                amount,
                bidder: entities::Bidder::Online {
                    identity:     Uuid::new_v4(),
                    display_name: "J. Appleseed".to_string(),
                },
            },
        }
    }

    fn floor_bid(auction_id: AuctionId, amount: Amount) -> HandleBidInput {
        HandleBidInput {
            bid_create: entities::BidCreate {
                auction_id,
                amount,
                bidder: entities::Bidder::Floor {
                    display_name:  "Paddle 42".to_string(),
                    bidder_number: Some("42".to_string()),
                },
            },
        }
    }

    #[tokio::test]
    async fn rejects_bids_on_auctions_that_are_not_live() {
        for status in ["scheduled", "completed"] {
            let auction_id = Uuid::new_v4();
            let (service, _events) = Service::new_with_mocks(mock_db(status, 10000));
            let result = service.handle_bid(online_bid(auction_id, 15000)).await;
            assert_eq!(result.unwrap_err(), RestError::AuctionNotLive);
        }
    }

    #[tokio::test]
    async fn admission_follows_the_strict_increase_rule() {
        let auction_id = Uuid::new_v4();
        let (service, mut events) = Service::new_with_mocks(mock_db("live", 10000));

        // Equal to the current price: rejected.
        let result = service.handle_bid(online_bid(auction_id, 10000)).await;
        assert_eq!(
            result.unwrap_err(),
            RestError::BidTooLow {
                current_price: 10000
            }
        );

        // Above it: accepted, and the new price is the bid amount.
        let accepted = service
            .handle_bid(online_bid(auction_id, 15000))
            .await
            .unwrap();
        assert_eq!(accepted.amount, 15000);
        assert_eq!(accepted.kind, BidKind::Online);

        // Below the committed price: rejected against the new price.
        let result = service.handle_bid(online_bid(auction_id, 14000)).await;
        assert_eq!(
            result.unwrap_err(),
            RestError::BidTooLow {
                current_price: 15000
            }
        );

        // A higher bid moves the price again.
        let accepted = service
            .handle_bid(online_bid(auction_id, 20000))
            .await
            .unwrap();
        assert_eq!(accepted.amount, 20000);

        // Exactly one event per accepted bid, in admission order.
        match events.recv().await.unwrap() {
            UpdateEvent::BidUpdated(update) => assert_eq!(update.new_price, 15000),
            event => panic!("unexpected event: {:?}", event),
        }
        match events.recv().await.unwrap() {
            UpdateEvent::BidUpdated(update) => assert_eq!(update.new_price, 20000),
            event => panic!("unexpected event: {:?}", event),
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn floor_bids_follow_the_same_admission_rule() {
        let auction_id = Uuid::new_v4();
        let (service, _events) = Service::new_with_mocks(mock_db("live", 10000));

        let accepted = service
            .handle_bid(floor_bid(auction_id, 12000))
            .await
            .unwrap();
        assert_eq!(accepted.kind, BidKind::Floor);
        assert_eq!(accepted.bidder_identity, None);
        assert_eq!(accepted.bidder_number.as_deref(), Some("42"));

        let result = service.handle_bid(floor_bid(auction_id, 12000)).await;
        assert_eq!(
            result.unwrap_err(),
            RestError::BidTooLow {
                current_price: 12000
            }
        );
    }

    #[tokio::test]
    async fn concurrent_equal_bids_admit_exactly_one() {
        let auction_id = Uuid::new_v4();
        let (service, _events) = Service::new_with_mocks(mock_db("live", 10000));

        let mut handles = Vec::new();
        for _ in 0..16 {
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.handle_bid(online_bid(auction_id, 15000)).await
            }));
        }

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(bid) => {
                    assert_eq!(bid.amount, 15000);
                    accepted += 1;
                }
                Err(RestError::BidTooLow { current_price }) => assert_eq!(current_price, 15000),
                Err(e) => panic!("unexpected rejection: {:?}", e),
            }
        }
        assert_eq!(accepted, 1);
    }

    #[tokio::test]
    async fn concurrent_bids_commit_strictly_increasing_prices() {
        let auction_id = Uuid::new_v4();
        let (service, mut events) = Service::new_with_mocks(mock_db("live", 100));

        let mut handles = Vec::new();
        for i in 0..48u64 {
            // A fixed permutation of 101..=148 so submission order is scrambled
            // but deterministic.
            let amount = 101 + ((i * 29) % 48) as Amount;
            let service = service.clone();
            handles.push(tokio::spawn(async move {
                service.handle_bid(online_bid(auction_id, amount)).await
            }));
        }
        let mut accepted = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                accepted += 1;
            }
        }
        assert!(accepted >= 1);

        let mut last = 100;
        for _ in 0..accepted {
            match events.recv().await.unwrap() {
                UpdateEvent::BidUpdated(update) => {
                    assert!(
                        update.new_price > last,
                        "price {} did not increase past {}",
                        update.new_price,
                        last
                    );
                    last = update.new_price;
                }
                event => panic!("unexpected event: {:?}", event),
            }
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn storage_failure_does_not_revoke_an_admission() {
        let auction_id = Uuid::new_v4();
        let mut db = MockDatabase::new();
        db.expect_get_auction().returning(|id| {
            Ok(repository::Auction {
                id,
                status: "live".to_string(),
                starting_price: 10000,
                current_price: 10000,
            })
        });
        db.expect_add_bid()
            .returning(|_| Err(RestError::TemporarilyUnavailable));
        let (service, _events) = Service::new_with_mocks(db);

        let accepted = service
            .handle_bid(online_bid(auction_id, 15000))
            .await
            .unwrap();
        assert_eq!(accepted.amount, 15000);

        // The committed price stands even though the append failed.
        let result = service.handle_bid(online_bid(auction_id, 15000)).await;
        assert_eq!(
            result.unwrap_err(),
            RestError::BidTooLow {
                current_price: 15000
            }
        );
    }
}
