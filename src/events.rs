use super::*;

/// Tag for the Create event.
pub const CREATE_TAG: u8 = u8::MAX - 1;
/// Tag for the Bid event.
pub const BID_TAG: u8 = u8::MAX - 2;
/// Tag for the Finalize event.
pub const FINALIZE_TAG: u8 = u8::MAX - 3;
/// Tag for the Cancel event.
pub const CANCEL_TAG: u8 = u8::MAX - 4;
/// Tag for the Refund event.
pub const REFUND_TAG: u8 = u8::MAX - 5;

/// Auction creation event data.
#[derive(Debug, Serial)]
pub struct CreateEvent<'a> {
    /// Newly allocated auction identifier.
    pub auction_id: AuctionId,
    /// Account that created the auction.
    pub seller: &'a AccountAddress,
    /// Opening of the bidding window.
    pub start: Timestamp,
    /// Close of the bidding window.
    pub end: Timestamp,
}

/// Bid event data.
#[derive(Debug, Serial)]
pub struct BidEvent<'a> {
    /// Auction the bid was placed on.
    pub auction_id: AuctionId,
    /// Bidder account address.
    pub bidder: &'a AccountAddress,
    /// Escrowed bid amount.
    pub amount: Amount,
}

/// Auction finalization event data.
#[derive(Debug, Serial)]
pub struct FinalizeEvent<'a> {
    /// Settled auction identifier.
    pub auction_id: AuctionId,
    /// Account that created the auction.
    pub seller: &'a AccountAddress,
    /// Account that won the auction. The seller itself when no bid was
    /// placed.
    pub winner: &'a AccountAddress,
    /// Winning bid forwarded to the seller. Zero when no bid was placed.
    pub amount: Amount,
}

/// Auction cancellation event data.
#[derive(Debug, Serial)]
pub struct CancelEvent<'a> {
    /// Cancelled auction identifier.
    pub auction_id: AuctionId,
    /// Account that created the auction.
    pub seller: &'a AccountAddress,
}

/// Refund claim event data.
#[derive(Debug, Serial)]
pub struct RefundEvent<'a> {
    /// Auction the escrow was recorded under.
    pub auction_id: AuctionId,
    /// Account reclaiming its escrow.
    pub bidder: &'a AccountAddress,
    /// Reclaimed amount.
    pub amount: Amount,
}

/// Tagged event to be serialized for the event log.
#[derive(Debug)]
pub enum AuctionEvents<'a> {
    Create(CreateEvent<'a>),
    Bid(BidEvent<'a>),
    Finalize(FinalizeEvent<'a>),
    Cancel(CancelEvent<'a>),
    Refund(RefundEvent<'a>),
}

impl<'a> AuctionEvents<'a> {
    pub fn create(
        auction_id: AuctionId,
        seller: &'a AccountAddress,
        start: Timestamp,
        end: Timestamp,
    ) -> Self {
        Self::Create(CreateEvent {
            auction_id,
            seller,
            start,
            end,
        })
    }

    pub fn bid(auction_id: AuctionId, bidder: &'a AccountAddress, amount: Amount) -> Self {
        Self::Bid(BidEvent {
            auction_id,
            bidder,
            amount,
        })
    }

    pub fn finalize(
        auction_id: AuctionId,
        seller: &'a AccountAddress,
        winner: &'a AccountAddress,
        amount: Amount,
    ) -> Self {
        Self::Finalize(FinalizeEvent {
            auction_id,
            seller,
            winner,
            amount,
        })
    }

    pub fn cancel(auction_id: AuctionId, seller: &'a AccountAddress) -> Self {
        Self::Cancel(CancelEvent { auction_id, seller })
    }

    pub fn refund(auction_id: AuctionId, bidder: &'a AccountAddress, amount: Amount) -> Self {
        Self::Refund(RefundEvent {
            auction_id,
            bidder,
            amount,
        })
    }
}

impl<'a> Serial for AuctionEvents<'a> {
    fn serial<W: Write>(&self, out: &mut W) -> Result<(), W::Err> {
        match self {
            AuctionEvents::Create(event) => {
                out.write_u8(CREATE_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Bid(event) => {
                out.write_u8(BID_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Finalize(event) => {
                out.write_u8(FINALIZE_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Cancel(event) => {
                out.write_u8(CANCEL_TAG)?;
                event.serial(out)
            }
            AuctionEvents::Refund(event) => {
                out.write_u8(REFUND_TAG)?;
                event.serial(out)
            }
        }
    }
}
