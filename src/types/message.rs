use crate::types::{u256, Address};

/// The kind of a call-like message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Call,
    DelegateCall,
    CallCode,
    Create,
    Create2,
}

/// Bit flags of an [`ExecutionMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum MessageFlags {
    /// The message must not modify state. The flag propagates to all
    /// descendant frames.
    Static = 1,
}

/// One message to be executed by a call frame.
///
/// Input data and code are borrowed from the caller for the duration of the
/// call; sub-call messages borrow their input from the parent's memory.
#[derive(Debug, Clone, Copy)]
pub struct ExecutionMessage<'a> {
    pub kind: MessageKind,
    pub flags: u32,
    pub depth: i32,
    pub gas: i64,
    pub recipient: Address,
    pub sender: Address,
    pub input: Option<&'a [u8]>,
    pub value: u256,
    pub create2_salt: u256,
    pub code_address: Address,
    /// Hash of the code to execute, when the caller knows it. Used as the
    /// key of the code analysis cache.
    pub code_hash: Option<u256>,
}

impl<'a> ExecutionMessage<'a> {
    pub fn is_static(&self) -> bool {
        self.flags & MessageFlags::Static as u32 != 0
    }

    pub fn input(&self) -> &[u8] {
        self.input.unwrap_or_default()
    }
}

impl<'a> Default for ExecutionMessage<'a> {
    fn default() -> Self {
        Self {
            kind: MessageKind::Call,
            flags: 0,
            depth: 0,
            gas: i64::MAX,
            recipient: Address::default(),
            sender: Address::default(),
            input: None,
            value: u256::ZERO,
            create2_salt: u256::ZERO,
            code_address: Address::default(),
            code_hash: None,
        }
    }
}
