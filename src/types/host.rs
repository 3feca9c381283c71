use crate::types::{u256, Address, ExecutionMessage, ExecutionResult, TxContext};

/// Whether an account or storage slot has been touched before in the
/// current transaction (EIP-2929).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessStatus {
    Cold,
    Warm,
}

/// The effect a storage write had, relative to the value at the start of
/// the transaction (the original value) and the current value.
///
/// The host owns both values, so it is the one reporting the transition;
/// the interpreter derives gas cost and refund from the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageStatus {
    /// The current value equals the new value, or a dirty slot changed to
    /// yet another value.
    Assigned,
    /// 0 -> X
    Added,
    /// X -> 0
    Deleted,
    /// X -> Y
    Modified,
    /// X -> 0 -> Z
    DeletedAdded,
    /// X -> Y -> 0
    ModifiedDeleted,
    /// X -> 0 -> X
    DeletedRestored,
    /// 0 -> Y -> 0
    AddedDeleted,
    /// X -> Y -> X
    ModifiedRestored,
}

/// The capabilities the interpreter requires from its environment: world
/// state, block context, log delivery, and sub-call execution.
///
/// A `CALL`-like or `CREATE`-like instruction re-enters the interpreter
/// through [`Host::call`]; the host owns that recursion (code lookup,
/// balance transfer, state snapshots).
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
pub trait Host {
    /// Retrieve the transaction and block context.
    fn get_tx_context(&self) -> TxContext;

    /// Check if an account exists.
    fn account_exists(&self, address: &Address) -> bool;

    /// Read from a storage slot.
    fn get_storage(&self, address: &Address, key: &u256) -> u256;

    /// Write a storage slot and report the transition.
    fn set_storage(&mut self, address: &Address, key: &u256, value: &u256) -> StorageStatus;

    /// Get the balance of an account.
    fn get_balance(&self, address: &Address) -> u256;

    /// Get the code size of an account.
    fn get_code_size(&self, address: &Address) -> usize;

    /// Get the code hash of an account.
    fn get_code_hash(&self, address: &Address) -> u256;

    /// Copy the code of an account into `buffer`, starting at `code_offset`.
    /// Returns the number of bytes written.
    fn copy_code(&self, address: &Address, code_offset: usize, buffer: &mut [u8]) -> usize;

    /// Schedule the destruction of `address`, transferring its balance to
    /// `beneficiary`. Returns whether the account was newly scheduled.
    /// Refund bookkeeping for the destruction itself is owned by the host.
    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> bool;

    /// Execute a sub-call message.
    fn call<'a>(&mut self, message: &ExecutionMessage<'a>) -> ExecutionResult;

    /// Get the hash of one of the 256 most recent blocks, or zero.
    fn get_block_hash(&self, number: i64) -> u256;

    /// Deliver a log record.
    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[u256]);

    /// Mark an account as accessed and report its previous status.
    fn access_account(&mut self, address: &Address) -> AccessStatus;

    /// Mark a storage slot as accessed and report its previous status.
    fn access_storage(&mut self, address: &Address, key: &u256) -> AccessStatus;
}
