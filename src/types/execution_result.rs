use crate::types::{Address, FailStatus, StatusCode};

/// The outcome of executing a message.
///
/// The output buffer is owned by the result; it is released together with
/// it. Failure results carry no output and report zero gas, reflecting that
/// halting errors consume all remaining gas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    status_code: StatusCode,
    gas_left: i64,
    gas_refund: i64,
    output: Option<Vec<u8>>,
    create_address: Option<Address>,
}

impl ExecutionResult {
    pub fn new(
        status_code: StatusCode,
        gas_left: i64,
        gas_refund: i64,
        output: Option<Vec<u8>>,
    ) -> Self {
        Self {
            status_code,
            gas_left,
            gas_refund,
            output,
            create_address: None,
        }
    }

    /// Attach the address of a newly created account. Set by hosts when
    /// answering `CREATE`/`CREATE2` messages.
    pub fn with_create_address(mut self, create_address: Address) -> Self {
        self.create_address = Some(create_address);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status_code
    }

    pub fn gas_left(&self) -> i64 {
        self.gas_left
    }

    pub fn gas_refund(&self) -> i64 {
        self.gas_refund
    }

    pub fn output(&self) -> Option<&[u8]> {
        self.output.as_deref()
    }

    pub fn create_address(&self) -> Option<&Address> {
        self.create_address.as_ref()
    }
}

impl From<FailStatus> for ExecutionResult {
    fn from(fail_status: FailStatus) -> Self {
        Self::new(fail_status.into(), 0, 0, None)
    }
}
