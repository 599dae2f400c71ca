use {
    super::Service,
    crate::{
        api::{
            ws::UpdateEvent,
            RestError,
        },
    },
    saleroom_api_types::auction::{
        AuctionId,
        AuctionSnapshot,
        AuctionStatus,
        StatusUpdate,
    },
};

pub struct TransitionStatusInput {
    pub auction_id: AuctionId,
    pub from:       AuctionStatus,
    pub to:         AuctionStatus,
}

impl Service {
    /// Moves the auction lifecycle forward. The check of the current status and
    /// the commit of the new one run under the auction's admission lock, so a
    /// transition cannot interleave with a bid's price commit. Fails with
    /// `TransitionConflict` when the auction is not currently in `from`, or when
    /// the requested edge is not a forward one; conflicts are not retried here.
    #[tracing::instrument(skip_all, fields(auction_id, from = %input.from, to = %input.to))]
    pub async fn transition_status(
        &self,
        input: TransitionStatusInput,
    ) -> Result<AuctionSnapshot, RestError> {
        let auction_id = input.auction_id;
        tracing::Span::current().record("auction_id", auction_id.to_string());

        self.repo.get_or_load_auction(auction_id).await?;

        let auction_lock = self.repo.get_or_create_auction_lock(auction_id).await;
        let snapshot = {
            let _lock = auction_lock.lock().await;
            let mut auction = self
                .repo
                .get_in_memory_auction(auction_id)
                .await
                .ok_or(RestError::AuctionNotFound)?;
            if auction.status != input.from || !input.from.can_transition_to(input.to) {
                return Err(RestError::TransitionConflict {
                    current:   auction.status,
                    requested: input.to,
                });
            }
            auction.status = input.to;
            let snapshot = auction.snapshot();
            self.repo.update_in_memory_auction(auction).await;
            self.broadcast(UpdateEvent::AuctionStatus(StatusUpdate {
                auction_id,
                status: input.to,
            }));
            snapshot
        };

        if input.to == AuctionStatus::Completed {
            // Terminal state: no further price mutation is possible, so the
            // admission lock entry can go.
            self.repo.remove_auction_lock(auction_id).await;
        }

        self.task_tracker.spawn({
            let (repo, to) = (self.repo.clone(), input.to);
            async move {
                if let Err(e) = repo.persist_auction_status(auction_id, to).await {
                    tracing::error!(error = ?e, auction_id = %auction_id, "Failed to persist auction status");
                }
            }
        });

        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::auction::{
            entities,
            repository::{
                self,
                MockDatabase,
            },
            service::handle_bid::HandleBidInput,
        },
        uuid::Uuid,
    };

    fn mock_db(status: &str) -> MockDatabase {
        let status = status.to_string();
        let mut db = MockDatabase::new();
        db.expect_get_auction().returning(move |id| {
            Ok(repository::Auction {
                id,
                status: status.clone(),
                starting_price: 10000,
                current_price: 10000,
            })
        });
        db.expect_add_bid().returning(|_| Ok(()));
        db.expect_update_auction_status().returning(|_, _| Ok(()));
        db
    }

    fn transition(
        auction_id: AuctionId,
        from: AuctionStatus,
        to: AuctionStatus,
    ) -> TransitionStatusInput {
        TransitionStatusInput {
            auction_id,
            from,
            to,
        }
    }

    #[tokio::test]
    async fn lifecycle_moves_forward_exactly_once() {
        let auction_id = Uuid::new_v4();
        let (service, mut events) = Service::new_with_mocks(mock_db("scheduled"));

        let snapshot = service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Scheduled,
                AuctionStatus::Live,
            ))
            .await
            .unwrap();
        assert_eq!(snapshot.status, AuctionStatus::Live);

        // Starting a live auction again conflicts.
        let result = service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Scheduled,
                AuctionStatus::Live,
            ))
            .await;
        assert_eq!(
            result.unwrap_err(),
            RestError::TransitionConflict {
                current:   AuctionStatus::Live,
                requested: AuctionStatus::Live,
            }
        );

        let snapshot = service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Live,
                AuctionStatus::Completed,
            ))
            .await
            .unwrap();
        assert_eq!(snapshot.status, AuctionStatus::Completed);

        // Ending twice conflicts as well.
        let result = service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Live,
                AuctionStatus::Completed,
            ))
            .await;
        assert_eq!(
            result.unwrap_err(),
            RestError::TransitionConflict {
                current:   AuctionStatus::Completed,
                requested: AuctionStatus::Completed,
            }
        );

        for expected in [AuctionStatus::Live, AuctionStatus::Completed] {
            match events.recv().await.unwrap() {
                UpdateEvent::AuctionStatus(update) => {
                    assert_eq!(update.auction_id, auction_id);
                    assert_eq!(update.status, expected);
                }
                event => panic!("unexpected event: {:?}", event),
            }
        }
        assert!(events.try_recv().is_err());
    }

    #[tokio::test]
    async fn skipping_a_state_conflicts() {
        let auction_id = Uuid::new_v4();
        let (service, _events) = Service::new_with_mocks(mock_db("scheduled"));

        let result = service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Scheduled,
                AuctionStatus::Completed,
            ))
            .await;
        assert_eq!(
            result.unwrap_err(),
            RestError::TransitionConflict {
                current:   AuctionStatus::Scheduled,
                requested: AuctionStatus::Completed,
            }
        );
    }

    #[tokio::test]
    async fn no_bids_are_admitted_after_completion() {
        let auction_id = Uuid::new_v4();
        let (service, _events) = Service::new_with_mocks(mock_db("live"));

        service
            .transition_status(transition(
                auction_id,
                AuctionStatus::Live,
                AuctionStatus::Completed,
            ))
            .await
            .unwrap();

        let result = service
            .handle_bid(HandleBidInput {
                bid_create: entities::BidCreate {
                    auction_id,
                    amount: 20000,
                    bidder: entities::Bidder::Online {
                        identity:     Uuid::new_v4(),
                        display_name: "J. Appleseed".to_string(),
                    },
                },
            })
            .await;
        assert_eq!(result.unwrap_err(), RestError::AuctionNotLive);
    }
}
