#[cfg(test)]
use mockall::automock;
use {
    crate::{
        api::RestError,
        auction::entities,
        kernel::db::DB,
    },
    axum::async_trait,
    saleroom_api_types::{
        auction::{
            AuctionId,
            AuctionStatus,
        },
        Amount,
    },
    sqlx::FromRow,
    std::fmt::Debug,
    time::OffsetDateTime,
    uuid::Uuid,
};

/// Row model for the auctions table, owned by the external persistence service.
/// Only the columns the engine needs to seed its in-memory state are selected.
#[derive(Clone, FromRow, Debug)]
pub struct Auction {
    pub id:             AuctionId,
    pub status:         String,
    pub starting_price: Amount,
    pub current_price:  Amount,
}

impl Auction {
    pub fn get_auction_entity(&self) -> anyhow::Result<entities::Auction> {
        Ok(entities::Auction {
            id:            self.id,
            status:        self.status.parse()?,
            // Stored prices can lag behind the starting price for auctions that
            // never received a bid.
            current_price: self.current_price.max(self.starting_price),
        })
    }
}

#[derive(Clone, Debug)]
pub struct Bid {
    pub id:              Uuid,
    pub auction_id:      AuctionId,
    pub bidder_id:       Option<Uuid>,
    pub amount:          Amount,
    pub kind:            String,
    pub bidder_name:     String,
    pub bidder_number:   Option<String>,
    pub submission_time: OffsetDateTime,
}

impl Bid {
    pub fn new(bid: &entities::Bid) -> Self {
        Self {
            id:              bid.id,
            auction_id:      bid.auction_id,
            bidder_id:       bid.bidder_identity,
            amount:          bid.amount,
            kind:            bid.kind.to_string(),
            bidder_name:     bid.bidder_name.clone(),
            bidder_number:   bid.bidder_number.clone(),
            submission_time: bid.submission_time,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ChatMessage {
    pub id:            Uuid,
    pub auction_id:    AuctionId,
    pub sender_id:     Option<Uuid>,
    pub message:       String,
    pub is_admin:      bool,
    pub creation_time: OffsetDateTime,
}

impl ChatMessage {
    pub fn new(message: &entities::ChatMessage) -> Self {
        Self {
            id:            message.id,
            auction_id:    message.auction_id,
            sender_id:     message.sender,
            message:       message.message.clone(),
            is_admin:      message.is_admin,
            creation_time: message.creation_time,
        }
    }
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait Database: Debug + Send + Sync + 'static {
    async fn get_auction(&self, auction_id: AuctionId) -> Result<Auction, RestError>;
    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError>;
    async fn add_chat_message(&self, message: &ChatMessage) -> Result<(), RestError>;
    async fn update_auction_status(
        &self,
        auction_id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RestError>;
}

#[async_trait]
impl Database for DB {
    async fn get_auction(&self, auction_id: AuctionId) -> Result<Auction, RestError> {
        sqlx::query_as::<_, Auction>(
            "SELECT id, status, starting_price, current_price FROM auctions WHERE id = $1",
        )
        .bind(auction_id)
        .fetch_optional(self)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), auction_id = %auction_id, "DB: Failed to fetch auction");
            RestError::TemporarilyUnavailable
        })?
        .ok_or(RestError::AuctionNotFound)
    }

    async fn add_bid(&self, bid: &Bid) -> Result<(), RestError> {
        // The bid row and the denormalized auction price move together.
        let mut tx = self.begin().await.map_err(|e| {
            tracing::error!(error = e.to_string(), "DB: Failed to begin transaction");
            RestError::TemporarilyUnavailable
        })?;
        sqlx::query(
            "INSERT INTO bids (id, auction_id, bidder_id, amount, kind, bidder_name, bidder_number, submission_time) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(bid.id)
        .bind(bid.auction_id)
        .bind(bid.bidder_id)
        .bind(bid.amount)
        .bind(&bid.kind)
        .bind(&bid.bidder_name)
        .bind(&bid.bidder_number)
        .bind(bid.submission_time)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to insert bid");
            RestError::TemporarilyUnavailable
        })?;
        sqlx::query("UPDATE auctions SET current_price = $2 WHERE id = $1 AND current_price < $2")
            .bind(bid.auction_id)
            .bind(bid.amount)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to update auction price");
                RestError::TemporarilyUnavailable
            })?;
        tx.commit().await.map_err(|e| {
            tracing::error!(error = e.to_string(), bid = ?bid, "DB: Failed to commit bid");
            RestError::TemporarilyUnavailable
        })
    }

    async fn add_chat_message(&self, message: &ChatMessage) -> Result<(), RestError> {
        sqlx::query(
            "INSERT INTO chat_messages (id, auction_id, sender_id, message, is_admin, creation_time) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(message.id)
        .bind(message.auction_id)
        .bind(message.sender_id)
        .bind(&message.message)
        .bind(message.is_admin)
        .bind(message.creation_time)
        .execute(self)
        .await
        .map_err(|e| {
            tracing::error!(error = e.to_string(), message = ?message, "DB: Failed to insert chat message");
            RestError::TemporarilyUnavailable
        })?;
        Ok(())
    }

    async fn update_auction_status(
        &self,
        auction_id: AuctionId,
        status: AuctionStatus,
    ) -> Result<(), RestError> {
        sqlx::query("UPDATE auctions SET status = $2 WHERE id = $1")
            .bind(auction_id)
            .bind(status.to_string())
            .execute(self)
            .await
            .map_err(|e| {
                tracing::error!(error = e.to_string(), auction_id = %auction_id, "DB: Failed to update auction status");
                RestError::TemporarilyUnavailable
            })?;
        Ok(())
    }
}
