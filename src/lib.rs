//! # Implementation of a sealed escrow auction smart contract
//!
//! Sellers list an item for a bounded slot-time window and bidders escrow
//! CCD with the contract by calling the payable `bid` function. Only bids
//! that exceed the current highest bid are accepted, and the displaced
//! highest bid is refunded within the same call, so the contract never
//! holds more than one live bid per auction.
//!
//! After the auction end the seller (or the contract owner) finalizes the
//! auction, which moves the highest bid to the seller. Before the first
//! bid the seller may cancel instead. Either way the auction is settled
//! exactly once and remains in the registry as an inactive audit record.
//!
//! A single contract instance hosts any number of auctions, keyed by a
//! sequential identifier. Identifier 0 is a pre-seeded inactive sentinel,
//! so 0 never refers to a live auction.
#![cfg_attr(not(feature = "std"), no_std)]
use crate::{errors::*, events::*, external::*, state::*};
use concordium_std::*;

mod contract;
mod errors;
mod events;
mod external;
mod state;
