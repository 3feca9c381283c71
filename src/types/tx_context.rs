use crate::types::{u256, Address};

/// The transaction and block environment of the current call stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    /// The transaction gas price.
    pub tx_gas_price: u256,
    /// The transaction origin account.
    pub tx_origin: Address,
    /// The miner of the block.
    pub block_coinbase: Address,
    /// The block number.
    pub block_number: i64,
    /// The block timestamp.
    pub block_timestamp: i64,
    /// The block gas limit.
    pub block_gas_limit: i64,
    /// The block difficulty before Paris, the previous RANDAO after.
    pub block_prev_randao: u256,
    /// The chain id.
    pub chain_id: u256,
    /// The block base fee per gas (EIP-1559, EIP-3198).
    pub block_base_fee: u256,
}

impl Default for TxContext {
    fn default() -> Self {
        Self {
            tx_gas_price: u256::ZERO,
            tx_origin: Address::default(),
            block_coinbase: Address::default(),
            block_number: 0,
            block_timestamp: 0,
            block_gas_limit: i64::MAX,
            block_prev_randao: u256::ZERO,
            chain_id: u256::ZERO,
            block_base_fee: u256::ZERO,
        }
    }
}
