use {
    crate::api::RestError,
    saleroom_api_types::{
        auction::{
            AuctionId,
            AuctionSnapshot,
            AuctionStatus,
        },
        Amount,
    },
    std::sync::Arc,
    tokio::sync::Mutex,
};

pub type AuctionLock = Arc<Mutex<()>>;

/// The mutable state of one auction: the pair every admission serializes on.
#[derive(Clone, Debug, PartialEq)]
pub struct Auction {
    pub id:            AuctionId,
    pub status:        AuctionStatus,
    pub current_price: Amount,
}

impl Auction {
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            auction_id:    self.id,
            status:        self.status,
            current_price: self.current_price,
        }
    }

    /// The admission rule, identical for online and floor bids. Callers must hold
    /// the auction's lock so the price cannot move between this check and the commit.
    pub fn validate_bid(&self, amount: Amount) -> Result<(), RestError> {
        if self.status != AuctionStatus::Live {
            return Err(RestError::AuctionNotLive);
        }
        if amount <= self.current_price {
            return Err(RestError::BidTooLow {
                current_price: self.current_price,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        uuid::Uuid,
    };

    fn auction(status: AuctionStatus, current_price: Amount) -> Auction {
        Auction {
            id: Uuid::new_v4(),
            status,
            current_price,
        }
    }

    #[test]
    fn rejects_bids_unless_live() {
        let scheduled = auction(AuctionStatus::Scheduled, 100);
        assert_eq!(scheduled.validate_bid(200), Err(RestError::AuctionNotLive));
        let completed = auction(AuctionStatus::Completed, 100);
        assert_eq!(completed.validate_bid(200), Err(RestError::AuctionNotLive));
    }

    #[test]
    fn rejects_bids_not_above_current_price() {
        let live = auction(AuctionStatus::Live, 100);
        assert_eq!(
            live.validate_bid(100),
            Err(RestError::BidTooLow { current_price: 100 })
        );
        assert_eq!(
            live.validate_bid(99),
            Err(RestError::BidTooLow { current_price: 100 })
        );
        assert_eq!(live.validate_bid(101), Ok(()));
    }
}
