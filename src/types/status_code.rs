use thiserror::Error;

/// The externally visible outcome of a call frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Success,
    Revert,
    OutOfGas,
    InvalidInstruction,
    UndefinedInstruction,
    StackOverflow,
    StackUnderflow,
    BadJumpDestination,
    InvalidMemoryAccess,
    StaticModeViolation,
    InternalError,
}

impl StatusCode {
    /// Whether the frame keeps its remaining gas and output window.
    pub fn preserves_gas(&self) -> bool {
        matches!(self, StatusCode::Success | StatusCode::Revert)
    }
}

/// The non-failure state of a running frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecStatus {
    Running,
    Stopped,
    Returned,
    Revert,
}

/// A halting failure. The frame ends and all remaining gas is consumed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FailStatus {
    #[error("out of gas")]
    OutOfGas,
    #[error("invalid instruction")]
    InvalidInstruction,
    #[error("undefined instruction")]
    UndefinedInstruction,
    #[error("stack overflow")]
    StackOverflow,
    #[error("stack underflow")]
    StackUnderflow,
    #[error("bad jump destination")]
    BadJumpDestination,
    #[error("invalid memory access")]
    InvalidMemoryAccess,
    #[error("static mode violation")]
    StaticModeViolation,
    #[error("internal error")]
    InternalError,
}

impl From<FailStatus> for StatusCode {
    fn from(value: FailStatus) -> Self {
        match value {
            FailStatus::OutOfGas => Self::OutOfGas,
            FailStatus::InvalidInstruction => Self::InvalidInstruction,
            FailStatus::UndefinedInstruction => Self::UndefinedInstruction,
            FailStatus::StackOverflow => Self::StackOverflow,
            FailStatus::StackUnderflow => Self::StackUnderflow,
            FailStatus::BadJumpDestination => Self::BadJumpDestination,
            FailStatus::InvalidMemoryAccess => Self::InvalidMemoryAccess,
            FailStatus::StaticModeViolation => Self::StaticModeViolation,
            FailStatus::InternalError => Self::InternalError,
        }
    }
}

impl From<ExecStatus> for StatusCode {
    fn from(value: ExecStatus) -> Self {
        match value {
            ExecStatus::Running | ExecStatus::Stopped | ExecStatus::Returned => Self::Success,
            ExecStatus::Revert => Self::Revert,
        }
    }
}
