use std::collections::{HashMap, HashSet};

use evmbase::{
    execute, execute_with_observer, u256, AccessStatus, Address, ExecutionMessage,
    ExecutionResult, Host, LoggingObserver, MessageFlags, MessageKind, Revision, StatusCode,
    StorageStatus, TxContext,
};

#[derive(Debug, Default)]
struct Account {
    balance: u256,
    code: Vec<u8>,
    storage: HashMap<[u8; 32], [u8; 32]>,
}

/// A minimal in-memory world. Sub-calls re-enter [`execute`] recursively,
/// created contracts get sequentially numbered addresses.
struct InMemoryHost {
    revision: Revision,
    accounts: HashMap<Address, Account>,
    tx_context: TxContext,
    logs: Vec<(Address, Vec<u8>, Vec<u256>)>,
    selfdestructs: Vec<(Address, Address)>,
    warm_accounts: HashSet<Address>,
    warm_slots: HashSet<(Address, [u8; 32])>,
    next_create: u8,
}

impl InMemoryHost {
    fn new(revision: Revision) -> Self {
        Self {
            revision,
            accounts: HashMap::new(),
            tx_context: TxContext::default(),
            logs: Vec::new(),
            selfdestructs: Vec::new(),
            warm_accounts: HashSet::new(),
            warm_slots: HashSet::new(),
            next_create: 1,
        }
    }

    fn insert_code(&mut self, address: Address, code: &[u8]) {
        self.accounts.entry(address).or_default().code = code.to_owned();
    }
}

impl Host for InMemoryHost {
    fn get_tx_context(&self) -> TxContext {
        self.tx_context
    }

    fn account_exists(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    fn get_storage(&self, address: &Address, key: &u256) -> u256 {
        self.accounts
            .get(address)
            .and_then(|account| account.storage.get(&**key))
            .copied()
            .map(Into::into)
            .unwrap_or(u256::ZERO)
    }

    fn set_storage(&mut self, address: &Address, key: &u256, value: &u256) -> StorageStatus {
        let account = self.accounts.entry(*address).or_default();
        let old = account
            .storage
            .insert(**key, **value)
            .map(u256::from)
            .unwrap_or(u256::ZERO);
        let (old_zero, new_zero) = (old == u256::ZERO, *value == u256::ZERO);
        if old == *value {
            StorageStatus::Assigned
        } else if old_zero {
            StorageStatus::Added
        } else if new_zero {
            StorageStatus::Deleted
        } else {
            StorageStatus::Modified
        }
    }

    fn get_balance(&self, address: &Address) -> u256 {
        self.accounts
            .get(address)
            .map(|account| account.balance)
            .unwrap_or(u256::ZERO)
    }

    fn get_code_size(&self, address: &Address) -> usize {
        self.accounts
            .get(address)
            .map(|account| account.code.len())
            .unwrap_or_default()
    }

    fn get_code_hash(&self, address: &Address) -> u256 {
        // a place-holder hash is enough for these tests
        self.accounts
            .get(address)
            .map(|account| u256::from(account.code.len() as u64))
            .unwrap_or(u256::ZERO)
    }

    fn copy_code(&self, address: &Address, code_offset: usize, buffer: &mut [u8]) -> usize {
        let code = self
            .accounts
            .get(address)
            .map(|account| account.code.as_slice())
            .unwrap_or_default();
        if code_offset >= code.len() {
            return 0;
        }
        let n = buffer.len().min(code.len() - code_offset);
        buffer[..n].copy_from_slice(&code[code_offset..code_offset + n]);
        n
    }

    fn selfdestruct(&mut self, address: &Address, beneficiary: &Address) -> bool {
        self.selfdestructs.push((*address, *beneficiary));
        true
    }

    fn call(&mut self, message: &ExecutionMessage) -> ExecutionResult {
        match message.kind {
            MessageKind::Create | MessageKind::Create2 => {
                let address = Address::from({
                    let mut bytes = [0; 20];
                    bytes[19] = self.next_create;
                    bytes[18] = 0xc0;
                    bytes
                });
                self.next_create += 1;
                let init_code = message.input.map(<[u8]>::to_owned).unwrap_or_default();
                let revision = self.revision;
                let result = execute(self, revision, message, &init_code);
                if result.status_code() != StatusCode::Success {
                    return result;
                }
                let deployed = result.output().unwrap_or_default().to_owned();
                self.insert_code(address, &deployed);
                ExecutionResult::new(
                    StatusCode::Success,
                    result.gas_left(),
                    result.gas_refund(),
                    None,
                )
                .with_create_address(address)
            }
            _ => {
                let code = self
                    .accounts
                    .get(&message.code_address)
                    .map(|account| account.code.clone())
                    .unwrap_or_default();
                let revision = self.revision;
                execute(self, revision, message, &code)
            }
        }
    }

    fn get_block_hash(&self, _number: i64) -> u256 {
        u256::ZERO
    }

    fn emit_log(&mut self, address: &Address, data: &[u8], topics: &[u256]) {
        self.logs.push((*address, data.to_owned(), topics.to_owned()));
    }

    fn access_account(&mut self, address: &Address) -> AccessStatus {
        if self.warm_accounts.insert(*address) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }

    fn access_storage(&mut self, address: &Address, key: &u256) -> AccessStatus {
        if self.warm_slots.insert((*address, **key)) {
            AccessStatus::Cold
        } else {
            AccessStatus::Warm
        }
    }
}

const GAS: i64 = 1_000_000;

fn message() -> ExecutionMessage<'static> {
    ExecutionMessage {
        gas: GAS,
        recipient: Address::from([0xaa; 20]),
        ..Default::default()
    }
}

fn word(value: u8) -> Vec<u8> {
    let mut bytes = vec![0; 32];
    bytes[31] = value;
    bytes
}

#[test]
fn add_and_return() {
    // PUSH1 5, PUSH1 3, ADD, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, RETURN
    let code = [
        0x60, 0x05, 0x60, 0x03, 0x01, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
    ];
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.output(), Some(word(8).as_slice()));
    assert!(result.gas_left() > 0 && result.gas_left() < GAS);
}

#[test]
fn division_by_zero_is_zero_then_stop() {
    let code = [0x60, 0x00, 0x60, 0x05, 0x04, 0x00];
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.output(), None);
}

#[test]
fn good_and_bad_jumps() {
    let mut host = InMemoryHost::new(Revision::London);
    let good = [0x60, 0x03, 0x56, 0x5b, 0x00];
    let result = execute(&mut host, Revision::London, &message(), &good);
    assert_eq!(result.status_code(), StatusCode::Success);

    let bad = [0x60, 0x02, 0x56, 0x5b, 0x00];
    let result = execute(&mut host, Revision::London, &message(), &bad);
    assert_eq!(result.status_code(), StatusCode::BadJumpDestination);
    assert_eq!(result.gas_left(), 0);
}

#[test]
fn revert_with_data_preserves_gas() {
    // PUSH1 0xAA, PUSH1 0, MSTORE, PUSH1 32, PUSH1 0, REVERT
    let code = [
        0x60, 0xaa, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xfd,
    ];
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Revert);
    assert_eq!(result.output(), Some(word(0xaa).as_slice()));
    // 4 pushes, MSTORE with one word of expansion
    assert_eq!(result.gas_left(), GAS - (4 * 3 + 3 + 3));
}

#[test]
fn stack_overflow_consumes_all_gas() {
    let mut code = Vec::new();
    for _ in 0..1025 {
        code.extend([0x60, 0x00]);
    }
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::StackOverflow);
    assert_eq!(result.gas_left(), 0);
}

#[test]
fn sstore_in_static_call_is_a_violation() {
    let code = [0x60, 0x01, 0x60, 0x00, 0x55];
    let static_message = ExecutionMessage {
        flags: MessageFlags::Static as u32,
        ..message()
    };
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &static_message, &code);
    assert_eq!(result.status_code(), StatusCode::StaticModeViolation);
    assert_eq!(result.gas_left(), 0);
}

#[test]
fn empty_code_returns_all_gas() {
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &[]);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.gas_left(), GAS);
    assert_eq!(result.output(), None);
}

#[test]
fn memory_offset_overflow_is_out_of_gas() {
    // PUSH1 1, PUSH32 0xff..ff, MSTORE
    let mut code = vec![0x60, 0x01, 0x7f];
    code.extend([0xff; 32]);
    code.push(0x52);
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::OutOfGas);
    assert_eq!(result.gas_left(), 0);
}

#[test]
fn undefined_instruction_at_old_revision() {
    let mut host = InMemoryHost::new(Revision::Frontier);
    // CHAINID appeared in Istanbul
    let result = execute(&mut host, Revision::Frontier, &message(), &[0x46]);
    assert_eq!(result.status_code(), StatusCode::UndefinedInstruction);
    assert_eq!(result.gas_left(), 0);
}

#[test]
fn nested_call_propagates_output() {
    let callee = Address::from({
        let mut bytes = [0; 20];
        bytes[19] = 0xbb;
        bytes
    });
    // callee: return 32-byte 0x2A
    let callee_code = [
        0x60, 0x2a, 0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
    ];
    // caller: CALL callee with a 32-byte return window, then return it
    let caller_code = [
        0x60, 0x20, // ret_len
        0x60, 0x00, // ret_offset
        0x60, 0x00, // args_len
        0x60, 0x00, // args_offset
        0x60, 0x00, // value
        0x60, 0xbb, // address
        0x61, 0xff, 0xff, // gas
        0xf1, // CALL
        0x60, 0x20, 0x60, 0x00, 0xf3, // RETURN memory[0..32]
    ];
    let mut host = InMemoryHost::new(Revision::London);
    host.insert_code(callee, &callee_code);
    let result = execute(&mut host, Revision::London, &message(), &caller_code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.output(), Some(word(0x2a).as_slice()));
}

#[test]
fn nested_call_reverts_do_not_fail_the_caller() {
    let callee = Address::from({
        let mut bytes = [0; 20];
        bytes[19] = 0xbb;
        bytes
    });
    let callee_code = [0x60, 0x00, 0x60, 0x00, 0xfd]; // REVERT empty
    // caller pushes the call status and returns it
    let caller_code = [
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xbb, 0x61, 0xff,
        0xff, 0xf1, // CALL
        0x60, 0x00, 0x52, // MSTORE status at 0
        0x60, 0x20, 0x60, 0x00, 0xf3,
    ];
    let mut host = InMemoryHost::new(Revision::London);
    host.insert_code(callee, &callee_code);
    let result = execute(&mut host, Revision::London, &message(), &caller_code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.output(), Some(word(0).as_slice()));
}

#[test]
fn staticcall_forbids_writes_in_the_callee() {
    let callee = Address::from({
        let mut bytes = [0; 20];
        bytes[19] = 0xbb;
        bytes
    });
    let callee_code = [0x60, 0x01, 0x60, 0x00, 0x55]; // SSTORE
    let caller_code = [
        0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0x00, 0x60, 0xbb, 0x61, 0xff, 0xff,
        0xfa, // STATICCALL
        0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
    ];
    let mut host = InMemoryHost::new(Revision::London);
    host.insert_code(callee, &callee_code);
    let result = execute(&mut host, Revision::London, &message(), &caller_code);
    assert_eq!(result.status_code(), StatusCode::Success);
    // the callee failed with a static mode violation, so the status is 0
    assert_eq!(result.output(), Some(word(0).as_slice()));
    assert!(host.accounts.values().all(|account| account.storage.is_empty()));
}

#[test]
fn create_deploys_returned_code() {
    // init code: return one byte 0xFE (the deployed code)
    let init_code = [
        0x60, 0xfe, 0x60, 0x00, 0x53, // MSTORE8 at 0
        0x60, 0x01, 0x60, 0x00, 0xf3, // RETURN memory[0..1]
    ];
    // caller: CODECOPY its own trailing init code into memory, CREATE, return address
    // simpler: store init code via pushes
    let mut caller_code = Vec::new();
    // write init code bytes into memory one by one
    for (i, byte) in init_code.iter().enumerate() {
        caller_code.extend([0x60, *byte, 0x60, i as u8, 0x53]); // MSTORE8
    }
    caller_code.extend([0x60, init_code.len() as u8]); // len
    caller_code.extend([0x60, 0x00]); // offset
    caller_code.extend([0x60, 0x00]); // value
    caller_code.push(0xf0); // CREATE
    caller_code.extend([0x60, 0x00, 0x52]); // MSTORE created address
    caller_code.extend([0x60, 0x20, 0x60, 0x00, 0xf3]);

    let mut host = InMemoryHost::new(Revision::London);
    host.accounts.entry(message().recipient).or_default().balance = u256::MAX;
    let result = execute(&mut host, Revision::London, &message(), &caller_code);
    assert_eq!(result.status_code(), StatusCode::Success);

    let created = Address::from(u256::from({
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(result.output().unwrap());
        bytes
    }));
    assert_eq!(host.accounts[&created].code, [0xfe]);
}

#[test]
fn logs_reach_the_host() {
    // MSTORE8 0x11 at 0, LOG1 topic 7 over memory[0..1]
    let code = [
        0x60, 0x11, 0x60, 0x00, 0x53, 0x60, 0x07, 0x60, 0x01, 0x60, 0x00, 0xa1,
    ];
    let mut host = InMemoryHost::new(Revision::London);
    let result = execute(&mut host, Revision::London, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(
        host.logs,
        [(
            message().recipient,
            vec![0x11],
            vec![u256::from(7u8)]
        )]
    );
}

#[test]
fn sstore_then_sload_roundtrip_with_access_tracking() {
    // SSTORE slot 1 = 0x2A, then SLOAD slot 1, return it
    let code = [
        0x60, 0x2a, 0x60, 0x01, 0x55, // SSTORE
        0x60, 0x01, 0x54, // SLOAD
        0x60, 0x00, 0x52, 0x60, 0x20, 0x60, 0x00, 0xf3,
    ];
    let mut host = InMemoryHost::new(Revision::Berlin);
    let result = execute(&mut host, Revision::Berlin, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Success);
    assert_eq!(result.output(), Some(word(0x2a).as_slice()));
    // the second access found the slot warm
    assert_eq!(host.warm_slots.len(), 1);
}

#[test]
fn logging_observer_traces_every_instruction() {
    let code = [0x60, 0x01, 0x50, 0x00]; // PUSH1 1, POP, STOP
    let mut host = InMemoryHost::new(Revision::London);
    let mut buffer = Vec::new();
    let mut observer = LoggingObserver::new(&mut buffer);
    let result =
        execute_with_observer(&mut host, Revision::London, &message(), &code, &mut observer);
    assert_eq!(result.status_code(), StatusCode::Success);
    let trace = String::from_utf8(buffer).unwrap();
    let lines: Vec<&str> = trace.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with("Push1"));
    assert!(lines[1].starts_with("Pop"));
    assert!(lines[2].starts_with("Stop"));
}

#[test]
fn selfdestruct_reaches_the_host() {
    let code = [0x60, 0xbb, 0xff];
    let mut host = InMemoryHost::new(Revision::Homestead);
    let result = execute(&mut host, Revision::Homestead, &message(), &code);
    assert_eq!(result.status_code(), StatusCode::Success);
    let beneficiary = Address::from({
        let mut bytes = [0; 20];
        bytes[19] = 0xbb;
        bytes
    });
    assert_eq!(host.selfdestructs, [(message().recipient, beneficiary)]);
}
