use super::*;

/// The errors the contract can produce.
#[derive(Serialize, Debug, PartialEq, Eq, Reject, SchemaType)]
pub enum ContractError {
    /// Failed parsing the parameter (Error code: -1).
    #[from(ParseError)]
    ParseParams,
    /// Failed logging: Log is full (Error code: -2).
    LogFull,
    /// Failed logging: Log is malformed (Error code: -3).
    LogMalformed,
    /// Referenced auction or bid record does not exist (Error code: -4).
    NotFound,
    /// Auction is already settled, or its bidding window has not opened yet
    /// (Error code: -5).
    Inactive,
    /// Auction end has passed, bids are no longer accepted (Error code: -6).
    Ended,
    /// Auction end has not passed yet, or the auction is still active
    /// (Error code: -7).
    NotEnded,
    /// Bid does not exceed the current highest bid, or the escrow record is
    /// zero and there is nothing left to claim (Error code: -8).
    BidTooLow,
    /// Sender lacks the required role for this transition (Error code: -9).
    Unauthorized,
    /// Auction window is malformed: end not after start, or start before the
    /// current slot time (Error code: -10).
    InvalidRange,
    /// Failed to invoke a transfer (Error code: -11).
    TransferFailed,
    /// Only account addresses can use the auction (Error code: -12).
    OnlyAccountAddress,
}

pub type ContractResult<A> = Result<A, ContractError>;

/// Mapping the logging errors to ContractError.
impl From<LogError> for ContractError {
    fn from(le: LogError) -> Self {
        match le {
            LogError::Full => Self::LogFull,
            LogError::Malformed => Self::LogMalformed,
        }
    }
}

/// Mapping errors related to transfer invocations to ContractError.
impl From<TransferError> for ContractError {
    fn from(_te: TransferError) -> Self {
        Self::TransferFailed
    }
}
