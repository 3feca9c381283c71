mod address;
mod amount;
#[cfg(feature = "analysis-cache")]
mod cache;
mod code_analysis;
mod code_reader;
mod execution_result;
mod host;
mod memory;
mod message;
mod observer;
mod opcode;
mod properties;
mod revision;
mod stack;
mod status_code;
mod tx_context;

pub use address::Address;
pub use amount::{u256, U64Overflow};
#[cfg(feature = "analysis-cache")]
pub use cache::Cache;
pub use code_analysis::{AnalysisContainer, CodeAnalysis};
pub use code_reader::CodeReader;
pub use execution_result::ExecutionResult;
#[cfg(any(test, feature = "mock"))]
pub use host::MockHost;
pub use host::{AccessStatus, Host, StorageStatus};
pub use memory::Memory;
pub use message::{ExecutionMessage, MessageFlags, MessageKind};
pub use observer::{LoggingObserver, NoOpObserver, Observer};
pub use opcode::{code_byte_type, CodeByteType, Opcode};
pub use properties::{instruction_table, InstructionTable, OpProperties};
pub use revision::Revision;
pub use stack::Stack;
pub use status_code::{ExecStatus, FailStatus, StatusCode};
pub use tx_context::TxContext;
