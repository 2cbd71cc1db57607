use super::*;

/// Init function that creates a new auction registry.
///
/// The registry starts empty apart from the inactive sentinel auction at
/// identifier 0, so the first created auction receives identifier 1.
#[init(contract = "BictoryEscrowAuction")]
fn contract_init<S: HasStateApi>(
    ctx: &impl HasInitContext,
    state_builder: &mut StateBuilder<S>,
) -> InitResult<State<S>> {
    Ok(State::new(state_builder, ctx.init_origin()))
}

/// Create a new auction. The sender becomes the seller.
///
/// It rejects if:
/// - Sender is a contract address.
/// - Fails to parse `CreateParams` parameters.
/// - Auction window is malformed: end not after start, or start before the
///   current slot time.
/// - Fails to log `Create` event.
#[receive(
    mutable,
    contract = "BictoryEscrowAuction",
    name = "create",
    parameter = "CreateParams",
    return_value = "AuctionId",
    enable_logger
)]
fn contract_create<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<AuctionId> {
    let params: CreateParams = ctx.parameter_cursor().get()?;

    let seller = if let Address::Account(seller) = ctx.sender() {
        seller
    } else {
        bail!(ContractError::OnlyAccountAddress);
    };

    let auction_id = host.state_mut().create_auction(
        seller,
        params.item,
        params.start,
        params.end,
        ctx.metadata().slot_time(),
    )?;

    logger.log(&AuctionEvents::create(
        auction_id,
        &seller,
        params.start,
        params.end,
    ))?;

    Ok(auction_id)
}

/// Place a bid on an active auction. The attached amount is escrowed as the
/// new highest bid; the displaced highest bid is refunded within the same
/// call, so no stale escrow ever accumulates under an auction.
///
/// It rejects if:
/// - Sender is a contract address.
/// - Fails to parse the auction identifier.
/// - No auction is stored under the identifier.
/// - Auction is settled or its bidding window has not opened yet.
/// - Auction end has passed.
/// - The attached amount does not exceed the current highest bid.
/// - Refunding the displaced highest bid fails.
/// - Fails to log `Bid` event.
#[receive(
    mutable,
    payable,
    contract = "BictoryEscrowAuction",
    name = "bid",
    parameter = "AuctionId",
    enable_logger
)]
fn contract_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    amount: Amount,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;

    let bidder = if let Address::Account(bidder) = ctx.sender() {
        bidder
    } else {
        bail!(ContractError::OnlyAccountAddress);
    };

    let displaced =
        host.state_mut()
            .place_bid(auction_id, bidder, amount, ctx.metadata().slot_time())?;

    logger.log(&AuctionEvents::bid(auction_id, &bidder, amount))?;

    // Refund the displaced highest bid.
    if let Some(displaced) = displaced {
        host.invoke_transfer(&displaced.account, displaced.amount)?;
    }

    Ok(())
}

/// Finalize an auction after its end, forwarding the highest bid to the
/// seller. This is the only point where a winning bid leaves escrow.
///
/// It rejects if:
/// - Sender is a contract address.
/// - Fails to parse the auction identifier.
/// - No auction is stored under the identifier.
/// - Auction is already settled.
/// - Auction end has not passed yet.
/// - Sender is neither the seller nor the contract owner.
/// - Forwarding the highest bid fails.
/// - Fails to log `Finalize` event.
#[receive(
    mutable,
    contract = "BictoryEscrowAuction",
    name = "finalize",
    parameter = "AuctionId",
    enable_logger
)]
fn contract_finalize<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;

    let sender = if let Address::Account(sender) = ctx.sender() {
        sender
    } else {
        bail!(ContractError::OnlyAccountAddress);
    };

    let outcome = host.state_mut().finalize(
        auction_id,
        sender,
        ctx.owner(),
        ctx.metadata().slot_time(),
    )?;

    match outcome {
        FinalizeResult::Sold {
            seller,
            winner,
            price,
        } => {
            logger.log(&AuctionEvents::finalize(auction_id, &seller, &winner, price))?;

            // Forward the winning escrow to the seller.
            host.invoke_transfer(&seller, price)?;
        }
        FinalizeResult::Unsold { seller } => {
            logger.log(&AuctionEvents::finalize(
                auction_id,
                &seller,
                &seller,
                Amount::zero(),
            ))?;
        }
    }

    Ok(())
}

/// Cancel an auction before any bid has been escrowed. The cancellation
/// window closes permanently on the first bid.
///
/// It rejects if:
/// - Sender is a contract address.
/// - Fails to parse the auction identifier.
/// - No auction is stored under the identifier.
/// - Auction is already settled.
/// - Sender is not the seller.
/// - A bid has already been placed.
/// - Fails to log `Cancel` event.
#[receive(
    mutable,
    contract = "BictoryEscrowAuction",
    name = "cancel",
    parameter = "AuctionId",
    enable_logger
)]
fn contract_cancel<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;

    let sender = if let Address::Account(sender) = ctx.sender() {
        sender
    } else {
        bail!(ContractError::OnlyAccountAddress);
    };

    let seller = host.state_mut().cancel(auction_id, sender)?;

    logger.log(&AuctionEvents::cancel(auction_id, &seller))?;

    Ok(())
}

/// Reclaim the sender's settled escrow on an inactive auction. The escrow
/// record is tombstoned at zero, so a second claim is rejected.
///
/// It rejects if:
/// - Sender is a contract address.
/// - Fails to parse the auction identifier.
/// - No auction is stored under the identifier, or the sender has no escrow
///   record for it.
/// - Auction is still active.
/// - The record is zero: nothing was left in escrow, or it was already
///   claimed.
/// - Sender is the recorded highest bidder. The winning escrow was forwarded
///   to the seller on finalization; winners never self-refund.
/// - The refund transfer fails.
/// - Fails to log `Refund` event.
#[receive(
    mutable,
    contract = "BictoryEscrowAuction",
    name = "claimRefund",
    parameter = "AuctionId",
    enable_logger
)]
fn contract_claim_refund<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &mut impl HasHost<State<S>, StateApiType = S>,
    logger: &mut impl HasLogger,
) -> ContractResult<()> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;

    let claimer = if let Address::Account(claimer) = ctx.sender() {
        claimer
    } else {
        bail!(ContractError::OnlyAccountAddress);
    };

    let payout = host.state_mut().claim_refund(auction_id, claimer)?;

    logger.log(&AuctionEvents::refund(
        auction_id,
        &payout.account,
        payout.amount,
    ))?;

    host.invoke_transfer(&payout.account, payout.amount)?;

    Ok(())
}

/// View function that returns the auction stored under the given identifier,
/// or nothing for an unknown identifier.
#[receive(
    contract = "BictoryEscrowAuction",
    name = "viewAuction",
    parameter = "AuctionId",
    return_value = "Option<Auction>"
)]
fn view_auction<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Option<Auction>> {
    let auction_id: AuctionId = ctx.parameter_cursor().get()?;

    Ok(host.state().auction(auction_id))
}

/// View function that returns the most recently allocated auction
/// identifier.
#[receive(
    contract = "BictoryEscrowAuction",
    name = "viewLastAuctionId",
    return_value = "AuctionId"
)]
fn view_last_auction_id<S: HasStateApi>(
    _ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<AuctionId> {
    Ok(host.state().last_auction_id())
}

/// View function that returns the escrow record for an auction and bidder.
/// Nothing means the bidder never escrowed anything; a zero amount means the
/// record was settled.
#[receive(
    contract = "BictoryEscrowAuction",
    name = "viewBid",
    parameter = "BidQuery",
    return_value = "Option<Amount>"
)]
fn view_bid<S: HasStateApi>(
    ctx: &impl HasReceiveContext,
    host: &impl HasHost<State<S>, StateApiType = S>,
) -> ReceiveResult<Option<Amount>> {
    let query: BidQuery = ctx.parameter_cursor().get()?;

    Ok(host.state().bid(query.auction_id, &query.bidder))
}

#[concordium_cfg_test]
mod tests {
    use super::*;
    use core::fmt::Debug;
    use test_infrastructure::*;

    const OWNER: AccountAddress = AccountAddress([0u8; 32]);
    const SELLER: AccountAddress = AccountAddress([1u8; 32]);
    const ALICE: AccountAddress = AccountAddress([2u8; 32]);
    const BOB: AccountAddress = AccountAddress([3u8; 32]);
    const CAROL: AccountAddress = AccountAddress([4u8; 32]);

    const AUCTION_START: u64 = 10;
    const AUCTION_END: u64 = 20;

    fn time(millis: u64) -> Timestamp {
        Timestamp::from_timestamp_millis(millis)
    }

    fn ccd(micro: u64) -> Amount {
        Amount::from_micro_ccd(micro)
    }

    fn expect_error<E, T>(expr: Result<T, E>, err: E, msg: &str)
    where
        E: Eq + Debug,
        T: Debug,
    {
        let actual = expr.expect_err(msg);
        assert_eq!(actual, err);
    }

    fn new_host() -> TestHost<State<TestStateApi>> {
        let mut state_builder = TestStateBuilder::new();
        let state = State::new(&mut state_builder, OWNER);
        TestHost::new(state, state_builder)
    }

    fn new_ctx<'a>(sender: AccountAddress, slot_time: u64) -> TestReceiveContext<'a> {
        let mut ctx = TestReceiveContext::empty();
        ctx.set_owner(OWNER);
        ctx.set_sender(Address::Account(sender));
        ctx.set_metadata_slot_time(time(slot_time));
        ctx
    }

    fn create(
        host: &mut TestHost<State<TestStateApi>>,
        seller: AccountAddress,
        slot_time: u64,
        start: u64,
        end: u64,
    ) -> ContractResult<AuctionId> {
        let params = CreateParams {
            item: String::from("Art"),
            start: time(start),
            end: time(end),
        };
        let parameter_bytes = to_bytes(&params);
        let mut ctx = new_ctx(seller, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        contract_create(&ctx, host, &mut logger)
    }

    fn bid(
        host: &mut TestHost<State<TestStateApi>>,
        bidder: AccountAddress,
        auction_id: AuctionId,
        amount: Amount,
        slot_time: u64,
    ) -> ContractResult<()> {
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(bidder, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        // The attached amount is part of the contract balance by the time
        // the receive function runs.
        host.set_self_balance(host.self_balance() + amount);

        contract_bid(&ctx, host, amount, &mut logger)
    }

    fn finalize(
        host: &mut TestHost<State<TestStateApi>>,
        sender: AccountAddress,
        auction_id: AuctionId,
        slot_time: u64,
    ) -> ContractResult<()> {
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(sender, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        contract_finalize(&ctx, host, &mut logger)
    }

    fn cancel(
        host: &mut TestHost<State<TestStateApi>>,
        sender: AccountAddress,
        auction_id: AuctionId,
        slot_time: u64,
    ) -> ContractResult<()> {
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(sender, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        contract_cancel(&ctx, host, &mut logger)
    }

    fn claim_refund(
        host: &mut TestHost<State<TestStateApi>>,
        claimer: AccountAddress,
        auction_id: AuctionId,
        slot_time: u64,
    ) -> ContractResult<()> {
        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(claimer, slot_time);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        contract_claim_refund(&ctx, host, &mut logger)
    }

    /// Test that initialization seeds the registry with the inactive
    /// sentinel auction at identifier 0 and nothing else.
    #[concordium_test]
    fn test_init() {
        let mut ctx = TestInitContext::empty();
        ctx.set_init_origin(OWNER);
        let mut state_builder = TestStateBuilder::new();

        let state = contract_init(&ctx, &mut state_builder)
            .expect("Contract initialization results in error");

        claim_eq!(state.last_auction_id(), SENTINEL_AUCTION_ID);
        let sentinel = state
            .auction(SENTINEL_AUCTION_ID)
            .expect("Sentinel auction should be seeded");
        claim!(!sentinel.active, "Sentinel auction should never be active");
        claim_eq!(sentinel.highest_bid, Amount::zero());
        claim_eq!(state.auction(1), None, "Registry should hold nothing else");
    }

    /// Create an auction before its window opens and check the stored
    /// record: identifier 1, seller leading at a zero bid, active.
    #[concordium_test]
    fn test_create_fresh_auction() {
        let mut host = new_host();

        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        claim_eq!(auction_id, 1, "First auction should receive identifier 1");

        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim_eq!(auction.seller, SELLER);
        claim_eq!(auction.item, String::from("Art"));
        claim_eq!(auction.start, time(AUCTION_START));
        claim_eq!(auction.end, time(AUCTION_END));
        claim_eq!(auction.highest_bidder, SELLER);
        claim_eq!(auction.highest_bid, Amount::zero());
        claim!(auction.active, "A fresh auction should be active");
        claim_eq!(host.state().last_auction_id(), 1);

        // Identifiers are allocated sequentially.
        let second = create(&mut host, ALICE, 5, AUCTION_START, AUCTION_END)
            .expect("Creating a second auction should succeed");
        claim_eq!(second, 2);
        claim_eq!(host.state().last_auction_id(), 2);
    }

    /// Auction windows that are empty, inverted or start in the past are
    /// rejected.
    #[concordium_test]
    fn test_create_rejects_malformed_window() {
        let mut host = new_host();

        expect_error(
            create(&mut host, SELLER, 5, AUCTION_START, AUCTION_START),
            ContractError::InvalidRange,
            "An empty window should be rejected",
        );
        expect_error(
            create(&mut host, SELLER, 5, AUCTION_END, AUCTION_START),
            ContractError::InvalidRange,
            "An inverted window should be rejected",
        );
        expect_error(
            create(&mut host, SELLER, 15, AUCTION_START, AUCTION_END),
            ContractError::InvalidRange,
            "A window starting in the past should be rejected",
        );
        claim_eq!(
            host.state().last_auction_id(),
            SENTINEL_AUCTION_ID,
            "No identifier should be allocated for a rejected creation"
        );
    }

    /// Contract addresses cannot act as sellers.
    #[concordium_test]
    fn test_create_rejects_contract_sender() {
        let mut host = new_host();

        let params = CreateParams {
            item: String::from("Art"),
            start: time(AUCTION_START),
            end: time(AUCTION_END),
        };
        let parameter_bytes = to_bytes(&params);
        let mut ctx = new_ctx(SELLER, 5);
        ctx.set_sender(Address::Contract(ContractAddress {
            index: 1,
            subindex: 0,
        }));
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        expect_error(
            contract_create(&ctx, &mut host, &mut logger),
            ContractError::OnlyAccountAddress,
            "Contract senders should be rejected",
        );
    }

    /// A sequence of bids: the first bid leads, a lower bid is rejected and
    /// a higher bid displaces the leader, refunding and tombstoning the
    /// displaced escrow within the same call.
    #[concordium_test]
    fn test_bid_and_outbid() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");

        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim_eq!(auction.highest_bidder, ALICE);
        claim_eq!(auction.highest_bid, ccd(100));
        claim_eq!(host.state().bid(auction_id, &ALICE), Some(ccd(100)));
        claim!(
            host.get_transfers().is_empty(),
            "The first bid should not trigger a refund"
        );

        expect_error(
            bid(&mut host, BOB, auction_id, ccd(50), 13),
            ContractError::BidTooLow,
            "A bid below the highest bid should be rejected",
        );

        bid(&mut host, BOB, auction_id, ccd(150), 14).expect("Outbidding should succeed");

        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim_eq!(auction.highest_bidder, BOB);
        claim_eq!(auction.highest_bid, ccd(150));
        claim_eq!(
            host.get_transfers(),
            [(ALICE, ccd(100))],
            "The displaced bid should be refunded"
        );
        claim_eq!(
            host.state().bid(auction_id, &ALICE),
            Some(Amount::zero()),
            "The displaced record should be tombstoned"
        );
        claim_eq!(host.state().bid(auction_id, &BOB), Some(ccd(150)));
    }

    /// Bids outside the window and on missing or settled auctions are
    /// rejected with the matching error.
    #[concordium_test]
    fn test_bid_window_checks() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        expect_error(
            bid(&mut host, ALICE, auction_id, ccd(100), 9),
            ContractError::Inactive,
            "Bidding before the window opens should be rejected",
        );
        expect_error(
            bid(&mut host, ALICE, auction_id, ccd(100), AUCTION_END),
            ContractError::Ended,
            "Bidding at the end bound should be rejected",
        );
        expect_error(
            bid(&mut host, ALICE, auction_id, ccd(100), 25),
            ContractError::Ended,
            "Bidding after the end bound should be rejected",
        );
        expect_error(
            bid(&mut host, ALICE, 7, ccd(100), 12),
            ContractError::NotFound,
            "Bidding on an unknown auction should be rejected",
        );
        expect_error(
            bid(&mut host, ALICE, SENTINEL_AUCTION_ID, ccd(100), 12),
            ContractError::Inactive,
            "Bidding on the sentinel auction should be rejected",
        );
        // The bidding window is half-open: a bid exactly at the start bound
        // is accepted.
        bid(&mut host, ALICE, auction_id, ccd(100), AUCTION_START)
            .expect("Bidding at the start bound should succeed");
    }

    /// A leader raising their own bid is refunded their previous escrow and
    /// their record holds the new amount only.
    #[concordium_test]
    fn test_bid_leader_raises_own_bid() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");
        bid(&mut host, ALICE, auction_id, ccd(150), 13).expect("Raising the bid should succeed");

        claim_eq!(
            host.get_transfers(),
            [(ALICE, ccd(100))],
            "The previous escrow should be refunded to the leader"
        );
        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim_eq!(auction.highest_bidder, ALICE);
        claim_eq!(auction.highest_bid, ccd(150));
        claim_eq!(host.state().bid(auction_id, &ALICE), Some(ccd(150)));
    }

    /// Finalization after the end forwards the highest bid to the seller,
    /// settles the auction and cannot be repeated.
    #[concordium_test]
    fn test_finalize() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");
        bid(&mut host, BOB, auction_id, ccd(150), 14).expect("Outbidding should succeed");

        expect_error(
            finalize(&mut host, SELLER, auction_id, 19),
            ContractError::NotEnded,
            "Finalizing before the end bound should fail",
        );
        expect_error(
            finalize(&mut host, BOB, auction_id, 21),
            ContractError::Unauthorized,
            "Only the seller or the owner may finalize",
        );

        finalize(&mut host, SELLER, auction_id, 21).expect("Finalizing should succeed");

        claim_eq!(
            host.get_transfers(),
            [(ALICE, ccd(100)), (SELLER, ccd(150))],
            "The winning bid should be forwarded to the seller"
        );
        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim!(!auction.active, "A finalized auction should be settled");

        expect_error(
            finalize(&mut host, SELLER, auction_id, 22),
            ContractError::Inactive,
            "Finalizing a second time should fail",
        );
        expect_error(
            finalize(&mut host, SELLER, 7, 22),
            ContractError::NotFound,
            "Finalizing an unknown auction should fail",
        );
    }

    /// The contract owner may finalize on the seller's behalf.
    #[concordium_test]
    fn test_finalize_by_owner() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");

        finalize(&mut host, OWNER, auction_id, 21).expect("The owner should be able to finalize");
        claim_eq!(host.get_transfers(), [(SELLER, ccd(100))]);
    }

    /// Finalizing an auction that received no bids settles it without any
    /// transfer.
    #[concordium_test]
    fn test_finalize_without_bids() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        finalize(&mut host, SELLER, auction_id, 21).expect("Finalizing should succeed");

        claim!(
            host.get_transfers().is_empty(),
            "No transfer should happen without bids"
        );
        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim!(!auction.active);
    }

    /// After finalization, a displaced bidder whose escrow was refunded at
    /// displacement has nothing left to claim, the winner is rejected by the
    /// leader check and accounts that never bid have no record at all.
    #[concordium_test]
    fn test_claim_refund_after_finalize() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");
        bid(&mut host, BOB, auction_id, ccd(150), 14).expect("Outbidding should succeed");
        finalize(&mut host, SELLER, auction_id, 21).expect("Finalizing should succeed");

        expect_error(
            claim_refund(&mut host, ALICE, auction_id, 22),
            ContractError::BidTooLow,
            "A refunded bidder's record is already tombstoned",
        );
        expect_error(
            claim_refund(&mut host, BOB, auction_id, 22),
            ContractError::Unauthorized,
            "The winner never self-refunds",
        );
        expect_error(
            claim_refund(&mut host, CAROL, auction_id, 22),
            ContractError::NotFound,
            "An account that never bid has no record",
        );
        expect_error(
            claim_refund(&mut host, ALICE, 7, 22),
            ContractError::NotFound,
            "Claiming on an unknown auction should fail",
        );
    }

    /// Refunds cannot be claimed while the auction is still live.
    #[concordium_test]
    fn test_claim_refund_requires_settlement() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");

        expect_error(
            claim_refund(&mut host, ALICE, auction_id, 15),
            ContractError::NotEnded,
            "Claiming on an active auction should fail",
        );
    }

    /// A seller bidding on their own auction is not auto-refunded when
    /// displaced; their escrow stays in the ledger and is reclaimed through
    /// `claimRefund` after settlement, exactly once.
    #[concordium_test]
    fn test_seller_escrow_reclaim() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        bid(&mut host, SELLER, auction_id, ccd(100), 12).expect("A seller may bid");
        bid(&mut host, ALICE, auction_id, ccd(150), 13).expect("Outbidding should succeed");

        claim!(
            host.get_transfers().is_empty(),
            "A displaced seller-leader is not auto-refunded"
        );
        claim_eq!(
            host.state().bid(auction_id, &SELLER),
            Some(ccd(100)),
            "The seller's escrow record should survive displacement"
        );

        finalize(&mut host, SELLER, auction_id, 21).expect("Finalizing should succeed");
        claim_eq!(host.get_transfers(), [(SELLER, ccd(150))]);

        claim_refund(&mut host, SELLER, auction_id, 22).expect("The seller reclaims their escrow");
        claim_eq!(
            host.get_transfers(),
            [(SELLER, ccd(150)), (SELLER, ccd(100))]
        );
        claim_eq!(host.state().bid(auction_id, &SELLER), Some(Amount::zero()));

        expect_error(
            claim_refund(&mut host, SELLER, auction_id, 23),
            ContractError::BidTooLow,
            "A second claim on a tombstoned record should fail",
        );
    }

    /// Cancellation is only possible for the seller and only before the
    /// first bid; a settled auction accepts no further bids.
    #[concordium_test]
    fn test_cancel() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        expect_error(
            cancel(&mut host, ALICE, auction_id, 6),
            ContractError::Unauthorized,
            "Only the seller may cancel",
        );

        cancel(&mut host, SELLER, auction_id, 6).expect("Cancelling before any bid should succeed");

        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim!(!auction.active, "A cancelled auction should be settled");
        claim!(
            host.get_transfers().is_empty(),
            "Cancellation moves no funds"
        );

        expect_error(
            bid(&mut host, ALICE, auction_id, ccd(100), 12),
            ContractError::Inactive,
            "Bidding on a cancelled auction should fail",
        );
        expect_error(
            cancel(&mut host, SELLER, auction_id, 7),
            ContractError::Inactive,
            "Cancelling a second time should fail",
        );
        expect_error(
            cancel(&mut host, SELLER, 7, 7),
            ContractError::NotFound,
            "Cancelling an unknown auction should fail",
        );
    }

    /// The cancellation window closes permanently on the first bid.
    #[concordium_test]
    fn test_cancel_gated_by_bids() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");

        expect_error(
            cancel(&mut host, SELLER, auction_id, 13),
            ContractError::Unauthorized,
            "Cancelling after a bid should fail",
        );
        let auction = host.state().auction(auction_id).expect("Auction is stored");
        claim!(auction.active, "A failed cancellation must not settle");
    }

    /// A failing refund transfer voids the displacing bid as a whole.
    #[concordium_test]
    fn test_bid_refund_transfer_failure() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");

        // Withhold the balance backing the displaced escrow, so the refund
        // transfer must fail.
        host.set_self_balance(ccd(50));

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(BOB, 14);
        ctx.set_parameter(&parameter_bytes);
        let mut logger = TestLogger::init();

        expect_error(
            contract_bid(&ctx, &mut host, ccd(150), &mut logger),
            ContractError::TransferFailed,
            "A failing refund should fail the whole bid",
        );
    }

    /// Everything ever pulled from bidders leaves the contract again: as
    /// displacement refunds and as the seller's settlement.
    #[concordium_test]
    fn test_escrow_conservation() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");

        bid(&mut host, ALICE, auction_id, ccd(100), 11).expect("Bid should succeed");
        bid(&mut host, BOB, auction_id, ccd(150), 13).expect("Bid should succeed");
        bid(&mut host, ALICE, auction_id, ccd(200), 15).expect("Bid should succeed");
        finalize(&mut host, SELLER, auction_id, 21).expect("Finalizing should succeed");

        let pulled = ccd(100) + ccd(150) + ccd(200);
        let returned = host
            .get_transfers()
            .iter()
            .fold(Amount::zero(), |acc, (_, amount)| acc + *amount);
        claim_eq!(returned, pulled, "No escrow may be created or destroyed");
        claim_eq!(
            host.get_transfers(),
            [(ALICE, ccd(100)), (BOB, ccd(150)), (SELLER, ccd(200))]
        );
    }

    /// View functions report missing records as empty results, never as
    /// errors.
    #[concordium_test]
    fn test_view_functions() {
        let mut host = new_host();
        let auction_id = create(&mut host, SELLER, 5, AUCTION_START, AUCTION_END)
            .expect("Creating an auction should succeed");
        bid(&mut host, ALICE, auction_id, ccd(100), 12).expect("First bid should succeed");
        bid(&mut host, BOB, auction_id, ccd(150), 14).expect("Outbidding should succeed");

        let parameter_bytes = to_bytes(&7u64);
        let mut ctx = new_ctx(CAROL, 15);
        ctx.set_parameter(&parameter_bytes);
        let missing = view_auction(&ctx, &host).expect("View should not fail");
        claim_eq!(missing, None, "Unknown auctions are an empty result");

        let parameter_bytes = to_bytes(&auction_id);
        let mut ctx = new_ctx(CAROL, 15);
        ctx.set_parameter(&parameter_bytes);
        let stored = view_auction(&ctx, &host).expect("View should not fail");
        claim_eq!(stored.map(|auction| auction.highest_bid), Some(ccd(150)));

        let ctx = new_ctx(CAROL, 15);
        let last = view_last_auction_id(&ctx, &host).expect("View should not fail");
        claim_eq!(last, auction_id);

        let parameter_bytes = to_bytes(&BidQuery {
            auction_id,
            bidder: CAROL,
        });
        let mut ctx = new_ctx(CAROL, 15);
        ctx.set_parameter(&parameter_bytes);
        let never_bid = view_bid(&ctx, &host).expect("View should not fail");
        claim_eq!(never_bid, None, "Never-bid is an empty result");

        let parameter_bytes = to_bytes(&BidQuery {
            auction_id,
            bidder: ALICE,
        });
        let mut ctx = new_ctx(CAROL, 15);
        ctx.set_parameter(&parameter_bytes);
        let tombstoned = view_bid(&ctx, &host).expect("View should not fail");
        claim_eq!(
            tombstoned,
            Some(Amount::zero()),
            "A settled record stays visible at zero"
        );
    }
}
