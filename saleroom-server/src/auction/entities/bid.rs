use {
    saleroom_api_types::{
        auction::AuctionId,
        bid::{
            self,
            BidId,
            BidKind,
        },
        ws::BidUpdate,
        Amount,
    },
    time::OffsetDateTime,
    uuid::Uuid,
};

/// Where a bid comes from. Floor bids are entered by an operator on behalf of an
/// in-person bidder and carry no caller identity.
#[derive(Clone, Debug)]
pub enum Bidder {
    Online {
        identity:     Uuid,
        display_name: String,
    },
    Floor {
        display_name:  String,
        bidder_number: Option<String>,
    },
}

impl Bidder {
    pub fn kind(&self) -> BidKind {
        match self {
            Bidder::Online { .. } => BidKind::Online,
            Bidder::Floor { .. } => BidKind::Floor,
        }
    }
}

#[derive(Clone, Debug)]
pub struct BidCreate {
    pub auction_id: AuctionId,
    pub amount:     Amount,
    pub bidder:     Bidder,
}

/// An accepted bid. Immutable once admitted; the amount equals the auction's
/// current price at the moment of admission.
#[derive(Clone, Debug)]
pub struct Bid {
    pub id:              BidId,
    pub auction_id:      AuctionId,
    pub amount:          Amount,
    pub kind:            BidKind,
    pub bidder_name:     String,
    pub bidder_identity: Option<Uuid>,
    pub bidder_number:   Option<String>,
    pub submission_time: OffsetDateTime,
}

impl Bid {
    pub fn new(bid_create: BidCreate) -> Self {
        let kind = bid_create.bidder.kind();
        let (bidder_name, bidder_identity, bidder_number) = match bid_create.bidder {
            Bidder::Online {
                identity,
                display_name,
            } => (display_name, Some(identity), None),
            Bidder::Floor {
                display_name,
                bidder_number,
            } => (display_name, None, bidder_number),
        };
        Self {
            id: BidId::new_v4(),
            auction_id: bid_create.auction_id,
            amount: bid_create.amount,
            kind,
            bidder_name,
            bidder_identity,
            bidder_number,
            submission_time: OffsetDateTime::now_utc(),
        }
    }
}

impl From<Bid> for bid::Bid {
    fn from(bid: Bid) -> Self {
        Self {
            id:            bid.id,
            auction_id:    bid.auction_id,
            amount:        bid.amount,
            kind:          bid.kind,
            bidder_name:   bid.bidder_name,
            bidder_number: bid.bidder_number,
            timestamp:     bid.submission_time,
        }
    }
}

impl From<&Bid> for BidUpdate {
    fn from(bid: &Bid) -> Self {
        Self {
            id:          bid.id,
            auction_id:  bid.auction_id,
            new_price:   bid.amount,
            bidder_name: bid.bidder_name.clone(),
            kind:        bid.kind,
            timestamp:   bid.submission_time,
        }
    }
}
