//! A baseline interpreter for the Ethereum Virtual Machine.
//!
//! Baseline means the code is executed as-is, one opcode at a time: the only
//! pre-processing is a single linear scan computing the valid jump
//! destinations. World state, block context, and sub-call execution are
//! provided by an implementation of the [`Host`] trait; the interpreter owns
//! nothing but the per-call state (stack, memory, gas, return buffer).
//!
//! ```
//! use evmbase::{execute, ExecutionMessage, Revision, StatusCode};
//! # use evmbase::{u256, AccessStatus, Address, ExecutionResult, Host, StorageStatus, TxContext};
//! # struct NullHost;
//! # impl Host for NullHost {
//! #     fn get_tx_context(&self) -> TxContext { TxContext::default() }
//! #     fn account_exists(&self, _: &Address) -> bool { false }
//! #     fn get_storage(&self, _: &Address, _: &u256) -> u256 { u256::ZERO }
//! #     fn set_storage(&mut self, _: &Address, _: &u256, _: &u256) -> StorageStatus {
//! #         StorageStatus::Assigned
//! #     }
//! #     fn get_balance(&self, _: &Address) -> u256 { u256::ZERO }
//! #     fn get_code_size(&self, _: &Address) -> usize { 0 }
//! #     fn get_code_hash(&self, _: &Address) -> u256 { u256::ZERO }
//! #     fn copy_code(&self, _: &Address, _: usize, _: &mut [u8]) -> usize { 0 }
//! #     fn selfdestruct(&mut self, _: &Address, _: &Address) -> bool { false }
//! #     fn call(&mut self, _: &ExecutionMessage) -> ExecutionResult {
//! #         ExecutionResult::new(StatusCode::Success, 0, 0, None)
//! #     }
//! #     fn get_block_hash(&self, _: i64) -> u256 { u256::ZERO }
//! #     fn emit_log(&mut self, _: &Address, _: &[u8], _: &[u256]) {}
//! #     fn access_account(&mut self, _: &Address) -> AccessStatus { AccessStatus::Warm }
//! #     fn access_storage(&mut self, _: &Address, _: &u256) -> AccessStatus { AccessStatus::Warm }
//! # }
//!
//! // PUSH1 5, PUSH1 3, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
//! let code = [
//!     0x60, 0x05, 0x60, 0x03, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
//! ];
//! let message = ExecutionMessage {
//!     gas: 100_000,
//!     ..Default::default()
//! };
//! let mut host = NullHost;
//! let result = execute(&mut host, Revision::London, &message, &code);
//! assert_eq!(result.status_code(), StatusCode::Success);
//! assert_eq!(result.output().unwrap()[31], 8);
//! ```
#![allow(clippy::needless_range_loop)]

mod interpreter;
pub mod types;
mod utils;

pub use interpreter::Interpreter;
#[cfg(any(test, feature = "mock"))]
pub use types::MockHost;
pub use types::{
    u256, AccessStatus, Address, ExecutionMessage, ExecutionResult, FailStatus, Host,
    LoggingObserver, MessageFlags, MessageKind, NoOpObserver, Observer, Opcode, Revision,
    StatusCode, StorageStatus, TxContext,
};
pub use utils::Gas;

/// Execute `code` under `message` against `host` at the given revision and
/// report status, remaining gas, and output.
pub fn execute<H: Host>(
    host: &mut H,
    revision: Revision,
    message: &ExecutionMessage,
    code: &[u8],
) -> ExecutionResult {
    execute_with_observer(host, revision, message, code, &mut NoOpObserver())
}

/// [`execute`], with an [`Observer`] called around every instruction.
pub fn execute_with_observer<H: Host>(
    host: &mut H,
    revision: Revision,
    message: &ExecutionMessage,
    code: &[u8],
    observer: &mut impl Observer<H>,
) -> ExecutionResult {
    tracing::trace!(
        ?revision,
        depth = message.depth,
        gas = message.gas,
        code_len = code.len(),
        "executing message"
    );
    match Interpreter::new(revision, message, host, code).run(observer) {
        Ok(interpreter) => interpreter.into(),
        Err(fail_status) => {
            tracing::debug!(%fail_status, "execution failed");
            fail_status.into()
        }
    }
}
