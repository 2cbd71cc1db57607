use super::*;

/// Sequential auction identifier.
///
/// Identifier 0 is occupied by the seeded sentinel auction and never refers
/// to a live auction.
pub type AuctionId = u64;

/// The sentinel identifier reserved at initialization.
pub const SENTINEL_AUCTION_ID: AuctionId = 0;

/// A single auction record.
///
/// Records are never removed from the registry: once settled they stay
/// behind with `active == false` as an audit trail.
#[derive(Debug, Clone, Serialize, SchemaType, PartialEq, Eq)]
pub struct Auction {
    /// Account that created the auction.
    pub seller: AccountAddress,
    /// Opaque item description.
    #[concordium(size_length = 2)]
    pub item: String,
    /// Opening of the bidding window (inclusive).
    pub start: Timestamp,
    /// Close of the bidding window (exclusive).
    pub end: Timestamp,
    /// Account currently leading the auction. The seller until the first bid.
    pub highest_bidder: AccountAddress,
    /// The escrowed leading bid. Zero until the first bid.
    pub highest_bid: Amount,
    /// Cleared exactly once, on finalization or cancellation.
    pub active: bool,
}

impl Auction {
    /// Placeholder record occupying identifier 0. Never active.
    fn sentinel(origin: AccountAddress) -> Self {
        Auction {
            seller: origin,
            item: String::new(),
            start: Timestamp::from_timestamp_millis(0),
            end: Timestamp::from_timestamp_millis(0),
            highest_bidder: origin,
            highest_bid: Amount::zero(),
            active: false,
        }
    }
}

/// Escrow that must leave the contract within the same operation, either as
/// a refund or as the seller's settlement.
#[must_use]
#[derive(Debug, PartialEq, Eq)]
pub struct Payout {
    pub account: AccountAddress,
    pub amount: Amount,
}

/// Settlement outcome of a finalized auction.
#[must_use]
pub enum FinalizeResult {
    /// The winning escrow moves to the seller.
    Sold {
        seller: AccountAddress,
        winner: AccountAddress,
        price: Amount,
    },
    /// No bids were placed during the auction, nothing to transfer.
    Unsold { seller: AccountAddress },
}

/// The contract state.
#[derive(Serial, DeserialWithState, StateClone)]
#[concordium(state_parameter = "S")]
pub struct State<S: HasStateApi> {
    /// Auction registry, keyed by sequential identifier.
    pub auctions: StateMap<AuctionId, Auction, S>,
    /// Escrow ledger with one record per auction and bidder. Settled records
    /// are tombstoned at zero instead of being removed, which keeps "already
    /// claimed" distinguishable from "never bid".
    pub bids: StateMap<(AuctionId, AccountAddress), Amount, S>,
    /// Identifier of the most recently created auction.
    pub last_auction_id: AuctionId,
}

impl<S: HasStateApi> State<S> {
    /// Create a new state holding only the sentinel auction.
    pub fn new(state_builder: &mut StateBuilder<S>, origin: AccountAddress) -> Self {
        let mut auctions = state_builder.new_map();
        auctions.insert(SENTINEL_AUCTION_ID, Auction::sentinel(origin));
        State {
            auctions,
            bids: state_builder.new_map(),
            last_auction_id: SENTINEL_AUCTION_ID,
        }
    }

    /// Allocate the next identifier and store a fresh auction for `seller`.
    ///
    /// The window must be well formed and must not start before `now`.
    pub fn create_auction(
        &mut self,
        seller: AccountAddress,
        item: String,
        start: Timestamp,
        end: Timestamp,
        now: Timestamp,
    ) -> ContractResult<AuctionId> {
        ensure!(end > start, ContractError::InvalidRange);
        ensure!(start >= now, ContractError::InvalidRange);

        let auction_id = self.last_auction_id + 1;
        self.last_auction_id = auction_id;
        self.auctions.insert(
            auction_id,
            Auction {
                seller,
                item,
                start,
                end,
                highest_bidder: seller,
                highest_bid: Amount::zero(),
                active: true,
            },
        );

        Ok(auction_id)
    }

    /// Record `amount` escrowed from `bidder` as the new leading bid.
    ///
    /// Returns the displaced leading escrow, which must be refunded within
    /// the same operation. The displaced record is tombstoned at zero, so
    /// the ledger only ever holds one live record per auction. A displaced
    /// leader that is the seller itself keeps its record instead: the seller
    /// reclaims that escrow through `claim_refund` after settlement.
    pub fn place_bid(
        &mut self,
        auction_id: AuctionId,
        bidder: AccountAddress,
        amount: Amount,
        now: Timestamp,
    ) -> ContractResult<Option<Payout>> {
        let mut entry = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(ContractError::NotFound)?;
        let auction = entry.get_mut();

        ensure!(auction.active, ContractError::Inactive);
        ensure!(now >= auction.start, ContractError::Inactive);
        ensure!(now < auction.end, ContractError::Ended);
        ensure!(amount > auction.highest_bid, ContractError::BidTooLow);

        let displaced = if auction.highest_bidder != auction.seller
            && auction.highest_bid > Amount::zero()
        {
            Some(Payout {
                account: auction.highest_bidder,
                amount: auction.highest_bid,
            })
        } else {
            None
        };

        auction.highest_bidder = bidder;
        auction.highest_bid = amount;

        if let Some(displaced) = &displaced {
            self.bids
                .insert((auction_id, displaced.account), Amount::zero());
        }
        self.bids.insert((auction_id, bidder), amount);

        Ok(displaced)
    }

    /// Settle auction `auction_id` after its window has closed.
    ///
    /// Only the seller or the contract owner may finalize. The winning
    /// ledger record keeps its amount: refund claims by the winner are
    /// rejected by the leader check in `claim_refund`.
    pub fn finalize(
        &mut self,
        auction_id: AuctionId,
        sender: AccountAddress,
        owner: AccountAddress,
        now: Timestamp,
    ) -> ContractResult<FinalizeResult> {
        let mut entry = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(ContractError::NotFound)?;
        let auction = entry.get_mut();

        ensure!(auction.active, ContractError::Inactive);
        ensure!(now >= auction.end, ContractError::NotEnded);
        ensure!(
            sender == auction.seller || sender == owner,
            ContractError::Unauthorized
        );

        auction.active = false;

        if auction.highest_bid > Amount::zero() {
            Ok(FinalizeResult::Sold {
                seller: auction.seller,
                winner: auction.highest_bidder,
                price: auction.highest_bid,
            })
        } else {
            Ok(FinalizeResult::Unsold {
                seller: auction.seller,
            })
        }
    }

    /// Settle auction `auction_id` without a sale.
    ///
    /// Only the seller may cancel, and only while no bid is escrowed: the
    /// cancellation window closes permanently on the first bid.
    pub fn cancel(
        &mut self,
        auction_id: AuctionId,
        sender: AccountAddress,
    ) -> ContractResult<AccountAddress> {
        let mut entry = self
            .auctions
            .get_mut(&auction_id)
            .ok_or(ContractError::NotFound)?;
        let auction = entry.get_mut();

        ensure!(auction.active, ContractError::Inactive);
        ensure!(sender == auction.seller, ContractError::Unauthorized);
        ensure!(
            auction.highest_bid == Amount::zero(),
            ContractError::Unauthorized
        );

        auction.active = false;

        Ok(auction.seller)
    }

    /// Release `bidder`'s settled escrow on an inactive auction.
    ///
    /// The record is tombstoned at zero, which makes a second claim fail
    /// with `BidTooLow`.
    pub fn claim_refund(
        &mut self,
        auction_id: AuctionId,
        bidder: AccountAddress,
    ) -> ContractResult<Payout> {
        let (active, highest_bidder) = {
            let auction = self
                .auctions
                .get(&auction_id)
                .ok_or(ContractError::NotFound)?;
            (auction.active, auction.highest_bidder)
        };
        let recorded = *self
            .bids
            .get(&(auction_id, bidder))
            .ok_or(ContractError::NotFound)?;

        ensure!(!active, ContractError::NotEnded);
        ensure!(recorded > Amount::zero(), ContractError::BidTooLow);
        ensure!(bidder != highest_bidder, ContractError::Unauthorized);

        self.bids.insert((auction_id, bidder), Amount::zero());

        Ok(Payout {
            account: bidder,
            amount: recorded,
        })
    }

    /// Look up an auction record.
    pub fn auction(&self, auction_id: AuctionId) -> Option<Auction> {
        self.auctions
            .get(&auction_id)
            .map(|auction| (*auction).clone())
    }

    /// Look up the escrow record for an auction and bidder. `None` means the
    /// bidder never escrowed anything; `Some(0)` means the record was settled.
    pub fn bid(&self, auction_id: AuctionId, bidder: &AccountAddress) -> Option<Amount> {
        self.bids.get(&(auction_id, *bidder)).map(|amount| *amount)
    }

    /// Identifier of the most recently created auction.
    pub fn last_auction_id(&self) -> AuctionId {
        self.last_auction_id
    }
}
