use super::*;

/// Parameter for the `create` entrypoint.
#[derive(Debug, Serialize, SchemaType)]
pub struct CreateParams {
    /// Opaque item description.
    #[concordium(size_length = 2)]
    pub item: String,
    /// Opening of the bidding window (inclusive).
    pub start: Timestamp,
    /// Close of the bidding window (exclusive).
    pub end: Timestamp,
}

/// Parameter for the `viewBid` entrypoint.
#[derive(Debug, Serialize, SchemaType)]
pub struct BidQuery {
    /// Auction to look up.
    pub auction_id: AuctionId,
    /// Bidder whose escrow record is requested.
    pub bidder: AccountAddress,
}
