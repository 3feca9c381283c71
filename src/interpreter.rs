use std::cmp::min;

use sha3::{Digest, Keccak256};

use crate::{
    types::{
        instruction_table, u256, AccessStatus, Address, CodeReader, ExecStatus, ExecutionMessage,
        ExecutionResult, FailStatus, Host, InstructionTable, Memory, MessageFlags, MessageKind,
        Observer, Opcode, Revision, Stack, StatusCode, StorageStatus,
    },
    utils::{
        check_not_read_only, consume_address_access_cost, consume_positive_value_cost,
        consume_storage_access_cost, consume_value_to_empty_account_cost, word_size, Gas, SliceExt,
    },
};

/// The maximum nesting depth of call frames.
const CALL_DEPTH_LIMIT: i32 = 1024;

/// EIP-2929 cold access cost of the `SELFDESTRUCT` beneficiary. Unlike the
/// account query instructions its base cost never contains a warm share.
const COLD_BENEFICIARY_ACCESS_COST: u64 = 2600;

/// EIP-2929 cold storage access cost charged by `SSTORE` on top of the
/// status-dependent cost.
const COLD_SSTORE_ACCESS_COST: u64 = 2100;

/// EIP-3860 limit on the length of initialization code.
const MAX_INIT_CODE_LEN: u64 = 2 * 24576;

/// The per-call execution state and the dispatch loop.
///
/// One `Interpreter` is created per message, runs to completion on the
/// calling thread and is then consumed into an [`ExecutionResult`].
/// Sub-calls recurse through [`Host::call`] and build their own state; no
/// state is shared between frames except through the host.
#[derive(Debug)]
pub struct Interpreter<'a, H: Host> {
    pub exec_status: ExecStatus,
    pub message: &'a ExecutionMessage<'a>,
    pub host: &'a mut H,
    pub revision: Revision,
    pub code_reader: CodeReader<'a>,
    pub gas_left: Gas,
    pub gas_refund: i64,
    pub output: Option<Vec<u8>>,
    pub stack: Stack,
    pub memory: Memory,
    /// The output of the most recent completed sub-call.
    pub return_data: Option<Vec<u8>>,
}

impl<'a, H: Host> Interpreter<'a, H> {
    pub fn new(
        revision: Revision,
        message: &'a ExecutionMessage<'a>,
        host: &'a mut H,
        code: &'a [u8],
    ) -> Self {
        Self {
            exec_status: ExecStatus::Running,
            message,
            host,
            revision,
            code_reader: CodeReader::new(code, message.code_hash),
            gas_left: Gas::new(message.gas),
            gas_refund: 0,
            output: None,
            stack: Stack::new(Vec::new()),
            memory: Memory::new(&[]),
            return_data: None,
        }
    }

    /// Run the code to completion.
    ///
    /// On a failure the frame is torn down and all remaining gas is
    /// consumed; converting the error into an [`ExecutionResult`] reports
    /// zero gas.
    pub fn run(mut self, observer: &mut impl Observer<H>) -> Result<Self, FailStatus> {
        let op_table = instruction_table(self.revision);
        loop {
            let Some(byte) = self.code_reader.get() else {
                // running off the end of the code is a normal stop
                self.exec_status = ExecStatus::Stopped;
                break;
            };
            let Some(op) = Opcode::from_byte(byte) else {
                return Err(FailStatus::UndefinedInstruction);
            };
            self.check_requirements(op_table, byte)?;
            observer.pre_op(&self);
            match op {
                Opcode::Stop => {
                    self.exec_status = ExecStatus::Stopped;
                    break;
                }
                Opcode::Add => {
                    let [value1, value2] = self.stack.pop()?;
                    self.stack.push(value1 + value2)?;
                }
                Opcode::Mul => {
                    let [fac1, fac2] = self.stack.pop()?;
                    self.stack.push(fac1 * fac2)?;
                }
                Opcode::Sub => {
                    let [value1, value2] = self.stack.pop()?;
                    self.stack.push(value1 - value2)?;
                }
                Opcode::Div => {
                    let [value, denominator] = self.stack.pop()?;
                    self.stack.push(value / denominator)?;
                }
                Opcode::SDiv => {
                    let [value, denominator] = self.stack.pop()?;
                    self.stack.push(value.sdiv(denominator))?;
                }
                Opcode::Mod => {
                    let [value, denominator] = self.stack.pop()?;
                    self.stack.push(value % denominator)?;
                }
                Opcode::SMod => {
                    let [value, denominator] = self.stack.pop()?;
                    self.stack.push(value.srem(denominator))?;
                }
                Opcode::AddMod => {
                    let [value1, value2, denominator] = self.stack.pop()?;
                    self.stack.push(u256::addmod(value1, value2, denominator))?;
                }
                Opcode::MulMod => {
                    let [fac1, fac2, denominator] = self.stack.pop()?;
                    self.stack.push(u256::mulmod(fac1, fac2, denominator))?;
                }
                Opcode::Exp => {
                    let [value, exp] = self.stack.pop()?;
                    let byte_size =
                        32 - exp.into_iter().take_while(|byte| *byte == 0).count() as u64;
                    let coefficient: u64 = if self.revision >= Revision::SpuriousDragon {
                        50
                    } else {
                        10
                    };
                    self.gas_left.consume(coefficient * byte_size)?; // * does not overflow
                    self.stack.push(value.pow(exp))?;
                }
                Opcode::SignExtend => {
                    let [size, value] = self.stack.pop()?;
                    self.stack.push(size.signextend(value))?;
                }
                Opcode::Lt => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs < rhs)?;
                }
                Opcode::Gt => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs > rhs)?;
                }
                Opcode::SLt => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs.slt(&rhs))?;
                }
                Opcode::SGt => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs.sgt(&rhs))?;
                }
                Opcode::Eq => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs == rhs)?;
                }
                Opcode::IsZero => {
                    let [value] = self.stack.pop()?;
                    self.stack.push(value == u256::ZERO)?;
                }
                Opcode::And => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs & rhs)?;
                }
                Opcode::Or => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs | rhs)?;
                }
                Opcode::Xor => {
                    let [lhs, rhs] = self.stack.pop()?;
                    self.stack.push(lhs ^ rhs)?;
                }
                Opcode::Not => {
                    let [value] = self.stack.pop()?;
                    self.stack.push(!value)?;
                }
                Opcode::Byte => {
                    let [index, value] = self.stack.pop()?;
                    self.stack.push(value.byte(index))?;
                }
                Opcode::Shl => {
                    let [shift, value] = self.stack.pop()?;
                    self.stack.push(value << shift)?;
                }
                Opcode::Shr => {
                    let [shift, value] = self.stack.pop()?;
                    self.stack.push(value >> shift)?;
                }
                Opcode::Sar => {
                    let [shift, value] = self.stack.pop()?;
                    self.stack.push(value.sar(shift))?;
                }
                Opcode::Sha3 => {
                    let [offset, len] = self.stack.pop()?;

                    let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;
                    self.gas_left.consume(6 * word_size(len)?)?; // * does not overflow

                    let data = self.memory.get_mut_slice(offset, len, &mut self.gas_left)?;
                    let mut hasher = Keccak256::new();
                    hasher.update(data);
                    let mut bytes = [0; 32];
                    hasher.finalize_into((&mut bytes).into());
                    self.stack.push(bytes)?;
                }
                Opcode::Address => {
                    self.stack.push(self.message.recipient)?;
                }
                Opcode::Balance => {
                    let [addr] = self.stack.pop()?;
                    let addr = addr.into();
                    consume_address_access_cost(
                        &mut self.gas_left,
                        &addr,
                        self.host,
                        self.revision,
                    )?;
                    self.stack.push(self.host.get_balance(&addr))?;
                }
                Opcode::Origin => {
                    self.stack.push(self.host.get_tx_context().tx_origin)?;
                }
                Opcode::Caller => {
                    self.stack.push(self.message.sender)?;
                }
                Opcode::CallValue => {
                    self.stack.push(self.message.value)?;
                }
                Opcode::CallDataLoad => {
                    let [offset] = self.stack.pop()?;
                    let (offset, overflow) = offset.into_u64_with_overflow();
                    let offset = offset as usize;
                    let call_data = self.message.input();
                    if overflow || offset >= call_data.len() {
                        self.stack.push(u256::ZERO)?;
                    } else {
                        let end = min(call_data.len(), offset + 32);
                        let mut bytes = [0; 32];
                        bytes[..end - offset].copy_from_slice(&call_data[offset..end]);
                        self.stack.push(bytes)?;
                    }
                }
                Opcode::CallDataSize => {
                    self.stack.push(self.message.input().len())?;
                }
                Opcode::CallDataCopy => {
                    let [dest_offset, offset, len] = self.stack.pop()?;

                    if len != u256::ZERO {
                        let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;

                        let src = self.message.input().get_within_bounds(offset, len);
                        let dest =
                            self.memory
                                .get_mut_slice(dest_offset, len, &mut self.gas_left)?;
                        dest.copy_padded(src, &mut self.gas_left)?;
                    }
                }
                Opcode::CodeSize => {
                    self.stack.push(self.code_reader.len())?;
                }
                Opcode::CodeCopy => {
                    let [dest_offset, offset, len] = self.stack.pop()?;

                    if len != u256::ZERO {
                        let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;

                        let src = self.code_reader.get_within_bounds(offset, len);
                        let dest =
                            self.memory
                                .get_mut_slice(dest_offset, len, &mut self.gas_left)?;
                        dest.copy_padded(src, &mut self.gas_left)?;
                    }
                }
                Opcode::GasPrice => {
                    self.stack.push(self.host.get_tx_context().tx_gas_price)?;
                }
                Opcode::ExtCodeSize => {
                    let [addr] = self.stack.pop()?;
                    let addr = addr.into();
                    consume_address_access_cost(
                        &mut self.gas_left,
                        &addr,
                        self.host,
                        self.revision,
                    )?;
                    self.stack.push(self.host.get_code_size(&addr))?;
                }
                Opcode::ExtCodeCopy => {
                    let [addr, dest_offset, offset, len] = self.stack.pop()?;
                    let addr = addr.into();

                    consume_address_access_cost(
                        &mut self.gas_left,
                        &addr,
                        self.host,
                        self.revision,
                    )?;
                    if len != u256::ZERO {
                        let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;

                        let (offset, offset_overflow) = offset.into_u64_with_overflow();
                        self.gas_left.consume_copy_cost(len)?;
                        let dest =
                            self.memory
                                .get_mut_slice(dest_offset, len, &mut self.gas_left)?;
                        let bytes_written = self.host.copy_code(&addr, offset as usize, dest);
                        if offset_overflow {
                            dest.fill(0);
                        } else if (bytes_written as u64) < len {
                            dest[bytes_written..].fill(0);
                        }
                    }
                }
                Opcode::ReturnDataSize => {
                    self.stack
                        .push(self.return_data.as_ref().map(Vec::len).unwrap_or_default())?;
                }
                Opcode::ReturnDataCopy => {
                    let [dest_offset, offset, len] = self.stack.pop()?;

                    let src = self.return_data.as_deref().unwrap_or_default();
                    let (offset, offset_overflow) = offset.into_u64_with_overflow();
                    let (len, len_overflow) = len.into_u64_with_overflow();
                    let (end, end_overflow) = offset.overflowing_add(len);
                    if offset_overflow || len_overflow || end_overflow || end > src.len() as u64 {
                        // reading past the end of the return buffer does not
                        // zero-fill, it fails the frame
                        return Err(FailStatus::InvalidMemoryAccess);
                    }

                    if len != 0 {
                        let src = &src[offset as usize..end as usize];
                        let dest =
                            self.memory
                                .get_mut_slice(dest_offset, len, &mut self.gas_left)?;
                        dest.copy_padded(src, &mut self.gas_left)?;
                    }
                }
                Opcode::ExtCodeHash => {
                    let [addr] = self.stack.pop()?;
                    let addr = addr.into();
                    consume_address_access_cost(
                        &mut self.gas_left,
                        &addr,
                        self.host,
                        self.revision,
                    )?;
                    self.stack.push(self.host.get_code_hash(&addr))?;
                }
                Opcode::BlockHash => {
                    let [block_number] = self.stack.pop()?;
                    self.stack.push(
                        block_number
                            .try_into()
                            .map(|number: u64| self.host.get_block_hash(number as i64))
                            .unwrap_or(u256::ZERO),
                    )?;
                }
                Opcode::Coinbase => {
                    self.stack.push(self.host.get_tx_context().block_coinbase)?;
                }
                Opcode::Timestamp => {
                    self.stack
                        .push(self.host.get_tx_context().block_timestamp as u64)?;
                }
                Opcode::Number => {
                    self.stack
                        .push(self.host.get_tx_context().block_number as u64)?;
                }
                Opcode::PrevRandao => {
                    self.stack
                        .push(self.host.get_tx_context().block_prev_randao)?;
                }
                Opcode::GasLimit => {
                    self.stack
                        .push(self.host.get_tx_context().block_gas_limit as u64)?;
                }
                Opcode::ChainId => {
                    self.stack.push(self.host.get_tx_context().chain_id)?;
                }
                Opcode::SelfBalance => {
                    self.stack
                        .push(self.host.get_balance(&self.message.recipient))?;
                }
                Opcode::BaseFee => {
                    self.stack.push(self.host.get_tx_context().block_base_fee)?;
                }
                Opcode::Pop => {
                    let [_] = self.stack.pop()?;
                }
                Opcode::MLoad => {
                    let [offset] = self.stack.pop()?;

                    self.stack
                        .push(self.memory.get_word(offset, &mut self.gas_left)?)?;
                }
                Opcode::MStore => {
                    let [offset, value] = self.stack.pop()?;

                    let dest = self.memory.get_mut_slice(offset, 32, &mut self.gas_left)?;
                    dest.copy_from_slice(value.as_slice());
                }
                Opcode::MStore8 => {
                    let [offset, value] = self.stack.pop()?;

                    let dest = self.memory.get_mut_byte(offset, &mut self.gas_left)?;
                    *dest = value[31];
                }
                Opcode::SLoad => {
                    let [key] = self.stack.pop()?;
                    let addr = self.message.recipient;
                    consume_storage_access_cost(
                        &mut self.gas_left,
                        &addr,
                        &key,
                        self.host,
                        self.revision,
                    )?;
                    self.stack.push(self.host.get_storage(&addr, &key))?;
                }
                Opcode::SStore => self.sstore()?,
                Opcode::Jump => {
                    let [dest] = self.stack.pop()?;
                    self.code_reader.try_jump(dest)?;
                }
                Opcode::JumpI => {
                    let [dest, cond] = self.stack.pop()?;
                    if cond == u256::ZERO {
                        self.code_reader.next();
                    } else {
                        // the destination is validated only when the branch
                        // is taken
                        self.code_reader.try_jump(dest)?;
                    }
                }
                Opcode::Pc => {
                    self.stack.push(self.code_reader.pc())?;
                }
                Opcode::MSize => {
                    self.stack.push(self.memory.len())?;
                }
                Opcode::Gas => {
                    self.stack.push(self.gas_left.as_u64())?;
                }
                Opcode::JumpDest => {}
                Opcode::Push0 => {
                    self.stack.push(u256::ZERO)?;
                }
                Opcode::Push1 => self.push(1)?,
                Opcode::Push2 => self.push(2)?,
                Opcode::Push3 => self.push(3)?,
                Opcode::Push4 => self.push(4)?,
                Opcode::Push5 => self.push(5)?,
                Opcode::Push6 => self.push(6)?,
                Opcode::Push7 => self.push(7)?,
                Opcode::Push8 => self.push(8)?,
                Opcode::Push9 => self.push(9)?,
                Opcode::Push10 => self.push(10)?,
                Opcode::Push11 => self.push(11)?,
                Opcode::Push12 => self.push(12)?,
                Opcode::Push13 => self.push(13)?,
                Opcode::Push14 => self.push(14)?,
                Opcode::Push15 => self.push(15)?,
                Opcode::Push16 => self.push(16)?,
                Opcode::Push17 => self.push(17)?,
                Opcode::Push18 => self.push(18)?,
                Opcode::Push19 => self.push(19)?,
                Opcode::Push20 => self.push(20)?,
                Opcode::Push21 => self.push(21)?,
                Opcode::Push22 => self.push(22)?,
                Opcode::Push23 => self.push(23)?,
                Opcode::Push24 => self.push(24)?,
                Opcode::Push25 => self.push(25)?,
                Opcode::Push26 => self.push(26)?,
                Opcode::Push27 => self.push(27)?,
                Opcode::Push28 => self.push(28)?,
                Opcode::Push29 => self.push(29)?,
                Opcode::Push30 => self.push(30)?,
                Opcode::Push31 => self.push(31)?,
                Opcode::Push32 => self.push(32)?,
                Opcode::Dup1 => self.dup(1)?,
                Opcode::Dup2 => self.dup(2)?,
                Opcode::Dup3 => self.dup(3)?,
                Opcode::Dup4 => self.dup(4)?,
                Opcode::Dup5 => self.dup(5)?,
                Opcode::Dup6 => self.dup(6)?,
                Opcode::Dup7 => self.dup(7)?,
                Opcode::Dup8 => self.dup(8)?,
                Opcode::Dup9 => self.dup(9)?,
                Opcode::Dup10 => self.dup(10)?,
                Opcode::Dup11 => self.dup(11)?,
                Opcode::Dup12 => self.dup(12)?,
                Opcode::Dup13 => self.dup(13)?,
                Opcode::Dup14 => self.dup(14)?,
                Opcode::Dup15 => self.dup(15)?,
                Opcode::Dup16 => self.dup(16)?,
                Opcode::Swap1 => self.swap(1)?,
                Opcode::Swap2 => self.swap(2)?,
                Opcode::Swap3 => self.swap(3)?,
                Opcode::Swap4 => self.swap(4)?,
                Opcode::Swap5 => self.swap(5)?,
                Opcode::Swap6 => self.swap(6)?,
                Opcode::Swap7 => self.swap(7)?,
                Opcode::Swap8 => self.swap(8)?,
                Opcode::Swap9 => self.swap(9)?,
                Opcode::Swap10 => self.swap(10)?,
                Opcode::Swap11 => self.swap(11)?,
                Opcode::Swap12 => self.swap(12)?,
                Opcode::Swap13 => self.swap(13)?,
                Opcode::Swap14 => self.swap(14)?,
                Opcode::Swap15 => self.swap(15)?,
                Opcode::Swap16 => self.swap(16)?,
                Opcode::Log0 => self.log::<0>()?,
                Opcode::Log1 => self.log::<1>()?,
                Opcode::Log2 => self.log::<2>()?,
                Opcode::Log3 => self.log::<3>()?,
                Opcode::Log4 => self.log::<4>()?,
                Opcode::Create => self.create()?,
                Opcode::Call => self.call()?,
                Opcode::CallCode => self.call_code()?,
                Opcode::Return => {
                    let [offset, len] = self.stack.pop()?;
                    let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;
                    let data = self.memory.get_mut_slice(offset, len, &mut self.gas_left)?;
                    self.output = Some(data.to_owned());
                    self.exec_status = ExecStatus::Returned;
                    break;
                }
                Opcode::DelegateCall => self.delegate_call()?,
                Opcode::Create2 => self.create2()?,
                Opcode::StaticCall => self.static_call()?,
                Opcode::Revert => {
                    let [offset, len] = self.stack.pop()?;
                    let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;
                    let data = self.memory.get_mut_slice(offset, len, &mut self.gas_left)?;
                    self.output = Some(data.to_owned());
                    self.exec_status = ExecStatus::Revert;
                    break;
                }
                Opcode::Invalid => {
                    return Err(FailStatus::InvalidInstruction);
                }
                Opcode::SelfDestruct => {
                    check_not_read_only(self.message)?;
                    let [addr] = self.stack.pop()?;
                    let beneficiary = addr.into();

                    if self.revision >= Revision::Berlin
                        && self.host.access_account(&beneficiary) == AccessStatus::Cold
                    {
                        self.gas_left.consume(COLD_BENEFICIARY_ACCESS_COST)?;
                    }

                    // Tangerine Whistle charges for any absent beneficiary,
                    // Spurious Dragon only when there is a balance to move
                    if self.revision >= Revision::TangerineWhistle
                        && (self.revision == Revision::TangerineWhistle
                            || self.host.get_balance(&self.message.recipient) != u256::ZERO)
                        && !self.host.account_exists(&beneficiary)
                    {
                        self.gas_left.consume(25000)?;
                    }

                    let destructed = self
                        .host
                        .selfdestruct(&self.message.recipient, &beneficiary);
                    // EIP-3529 removed the refund
                    if self.revision < Revision::London && destructed {
                        self.gas_refund += 24000;
                    }

                    self.exec_status = ExecStatus::Stopped;
                    break;
                }
            }

            if !(Opcode::Push1 as u8..=Opcode::Push32 as u8).contains(&byte)
                && op != Opcode::Jump
                && op != Opcode::JumpI
            {
                self.code_reader.next();
            }
            observer.post_op(&self);
        }

        Ok(self)
    }

    /// Validate availability, base gas, and stack bounds against the
    /// instruction table before an instruction runs.
    fn check_requirements(
        &mut self,
        op_table: &InstructionTable,
        op: u8,
    ) -> Result<(), FailStatus> {
        let Some(properties) = op_table[op as usize] else {
            return Err(FailStatus::UndefinedInstruction);
        };
        self.gas_left.consume(properties.gas_cost as u64)?;
        let stack_len = self.stack.len() as i32;
        if stack_len < properties.stack_required as i32 {
            return Err(FailStatus::StackUnderflow);
        }
        if stack_len + properties.stack_change as i32 > Stack::LIMIT as i32 {
            return Err(FailStatus::StackOverflow);
        }
        Ok(())
    }

    fn sstore(&mut self) -> Result<(), FailStatus> {
        check_not_read_only(self.message)?;

        // EIP-2200 gas sentry
        if self.revision >= Revision::Istanbul && self.gas_left.value() <= 2300 {
            return Err(FailStatus::OutOfGas);
        }
        let [key, value] = self.stack.pop()?;
        let addr = self.message.recipient;

        let (base_cost, reset_cost, set_cost, restored_refund, cleared_refund, added_cleared_refund) =
            if self.revision >= Revision::London {
                (100, 2900, 20000, 5000 - 2100 - 100, 4800, 20000 - 100)
            } else if self.revision >= Revision::Berlin {
                (100, 2900, 20000, 5000 - 2100 - 100, 15000, 20000 - 100)
            } else if self.revision >= Revision::Istanbul {
                (800, 5000, 20000, 4200, 15000, 19200)
            } else {
                (5000, 5000, 20000, 0, 15000, 0)
            };

        let mut cold_cost = 0;
        if self.revision >= Revision::Berlin
            && self.host.access_storage(&addr, &key) == AccessStatus::Cold
        {
            cold_cost = COLD_SSTORE_ACCESS_COST;
        }

        let status = self.host.set_storage(&addr, &key, &value);
        let (dyn_gas, gas_refund_change): (u64, i64) = match status {
            StorageStatus::Assigned => (base_cost, 0),
            StorageStatus::Added => (set_cost, 0),
            StorageStatus::Deleted => (reset_cost, cleared_refund),
            StorageStatus::Modified => (reset_cost, 0),
            StorageStatus::DeletedAdded => (base_cost, -cleared_refund),
            StorageStatus::ModifiedDeleted => (base_cost, cleared_refund),
            StorageStatus::DeletedRestored => (base_cost, -cleared_refund + restored_refund),
            StorageStatus::AddedDeleted => (base_cost, added_cleared_refund),
            StorageStatus::ModifiedRestored => (base_cost, restored_refund),
        };
        self.gas_left.consume(dyn_gas + cold_cost)?;
        self.gas_refund += gas_refund_change;
        Ok(())
    }

    fn push(&mut self, len: usize) -> Result<(), FailStatus> {
        self.code_reader.next();
        let data = self.code_reader.get_push_data(len);
        self.stack.push(data)
    }

    fn dup(&mut self, nth: usize) -> Result<(), FailStatus> {
        self.stack.push(self.stack.nth(nth - 1)?)
    }

    fn swap(&mut self, nth: usize) -> Result<(), FailStatus> {
        self.stack.swap_with_top(nth)
    }

    fn log<const N: usize>(&mut self) -> Result<(), FailStatus> {
        check_not_read_only(self.message)?;
        let [offset, len] = self.stack.pop()?;
        let topics: [u256; N] = self.stack.pop()?;
        let (len, len_overflow) = len.into_u64_with_overflow();
        let (len8, len8_overflow) = len.overflowing_mul(8);
        let (cost, cost_overflow) = (375 * N as u64).overflowing_add(len8);
        if len_overflow || len8_overflow || cost_overflow {
            return Err(FailStatus::OutOfGas);
        }
        self.gas_left.consume(cost)?;

        let data = self.memory.get_mut_slice(offset, len, &mut self.gas_left)?;
        self.host
            .emit_log(&self.message.recipient, data, topics.as_slice());
        Ok(())
    }

    fn create(&mut self) -> Result<(), FailStatus> {
        self.create_or_create2::<false>()
    }

    fn create2(&mut self) -> Result<(), FailStatus> {
        self.create_or_create2::<true>()
    }

    fn create_or_create2<const CREATE2: bool>(&mut self) -> Result<(), FailStatus> {
        check_not_read_only(self.message)?;
        let [value, offset, len] = self.stack.pop()?;
        let salt = if CREATE2 {
            self.stack.pop::<1>()?[0]
        } else {
            u256::ZERO // ignored
        };
        let len = len.try_into().map_err(|_| FailStatus::OutOfGas)?;

        let init_code_word_size = word_size(len)?;
        if self.revision >= Revision::Shanghai {
            if len > MAX_INIT_CODE_LEN {
                return Err(FailStatus::OutOfGas);
            }
            let init_code_cost = 2 * init_code_word_size; // does not overflow
            self.gas_left.consume(init_code_cost)?;
        }
        if CREATE2 {
            let hash_cost = 6 * init_code_word_size; // does not overflow
            self.gas_left.consume(hash_cost)?;
        }

        let init_code = self.memory.get_mut_slice(offset, len, &mut self.gas_left)?;

        if self.message.depth >= CALL_DEPTH_LIMIT {
            self.return_data = None;
            self.stack.push(u256::ZERO)?;
            return Ok(());
        }
        if value != u256::ZERO && value > self.host.get_balance(&self.message.recipient) {
            self.return_data = None;
            self.stack.push(u256::ZERO)?;
            return Ok(());
        }

        let gas_limit = if self.revision >= Revision::TangerineWhistle {
            self.gas_left.as_u64() - self.gas_left.as_u64() / 64
        } else {
            self.gas_left.as_u64()
        };
        self.gas_left.consume(gas_limit)?;

        let message = ExecutionMessage {
            kind: if CREATE2 {
                MessageKind::Create2
            } else {
                MessageKind::Create
            },
            flags: self.message.flags,
            depth: self.message.depth + 1,
            gas: gas_limit as i64,
            recipient: Address::default(), // chosen by the host
            sender: self.message.recipient,
            input: Some(init_code),
            value,
            create2_salt: salt,
            code_address: Address::default(),
            code_hash: None,
        };
        let result = self.host.call(&message);

        self.gas_left.refund(result.gas_left().max(0) as u64);
        self.gas_refund += result.gas_refund();

        if result.status_code() == StatusCode::Success {
            let Some(addr) = result.create_address() else {
                return Err(FailStatus::InternalError);
            };

            self.return_data = None;
            self.stack.push(addr)?;
        } else {
            // only revert data is exposed through the return buffer
            self.return_data = result.output().map(ToOwned::to_owned);
            self.stack.push(u256::ZERO)?;
        }
        Ok(())
    }

    fn call(&mut self) -> Result<(), FailStatus> {
        self.call_or_call_code::<false>()
    }

    fn call_code(&mut self) -> Result<(), FailStatus> {
        self.call_or_call_code::<true>()
    }

    fn call_or_call_code<const CODE: bool>(&mut self) -> Result<(), FailStatus> {
        let [gas, addr, value, args_offset, args_len, ret_offset, ret_len] = self.stack.pop()?;

        if !CODE && value != u256::ZERO {
            check_not_read_only(self.message)?;
        }

        let addr: Address = addr.into();
        let args_len = args_len.try_into().map_err(|_| FailStatus::OutOfGas)?;
        let ret_len = ret_len.try_into().map_err(|_| FailStatus::OutOfGas)?;

        consume_address_access_cost(&mut self.gas_left, &addr, self.host, self.revision)?;
        consume_positive_value_cost(&value, &mut self.gas_left)?;
        if !CODE {
            consume_value_to_empty_account_cost(
                &value,
                &addr,
                self.host,
                self.revision,
                &mut self.gas_left,
            )?;
        }
        // charge the expansion of the return window now; the slice itself is
        // taken again after the call
        let _dest = self
            .memory
            .get_mut_slice(ret_offset, ret_len, &mut self.gas_left)?;
        let input = self
            .memory
            .get_mut_slice(args_offset, args_len, &mut self.gas_left)?;

        let limit = self.gas_left.as_u64() - self.gas_left.as_u64() / 64;
        let mut endowment = gas.into_u64_saturating();
        if self.revision >= Revision::TangerineWhistle {
            endowment = min(endowment, limit); // cap at all but one 64th of the gas left
        }
        let stipend: u64 = if value == u256::ZERO { 0 } else { 2300 };
        self.gas_left.refund(stipend);

        if self.message.depth >= CALL_DEPTH_LIMIT {
            self.return_data = None;
            self.stack.push(u256::ZERO)?;
            return Ok(());
        }
        if value != u256::ZERO && value > self.host.get_balance(&self.message.recipient) {
            self.return_data = None;
            self.stack.push(u256::ZERO)?;
            return Ok(());
        }

        let call_message = if CODE {
            ExecutionMessage {
                kind: MessageKind::CallCode,
                flags: self.message.flags,
                depth: self.message.depth + 1,
                gas: (endowment + stipend) as i64,
                recipient: self.message.recipient,
                sender: self.message.recipient,
                input: Some(input),
                value,
                create2_salt: u256::ZERO,
                code_address: addr,
                code_hash: None,
            }
        } else {
            ExecutionMessage {
                kind: MessageKind::Call,
                flags: self.message.flags,
                depth: self.message.depth + 1,
                gas: (endowment + stipend) as i64,
                recipient: addr,
                sender: self.message.recipient,
                input: Some(input),
                value,
                create2_salt: u256::ZERO,
                code_address: addr,
                code_hash: None,
            }
        };

        let result = self.host.call(&call_message);
        self.return_data = result.output().map(ToOwned::to_owned);
        let dest = self
            .memory
            .get_mut_slice(ret_offset, ret_len, &mut self.gas_left)?;
        if let Some(output) = &self.return_data {
            let min_len = min(output.len(), ret_len as usize); // ret_len == dest.len()
            dest[..min_len].copy_from_slice(&output[..min_len]);
        }

        self.gas_left.refund(result.gas_left().max(0) as u64);
        self.gas_left.consume(endowment)?;
        self.gas_left.consume(stipend)?;
        self.gas_refund += result.gas_refund();

        self.stack
            .push(result.status_code() == StatusCode::Success)?;
        Ok(())
    }

    fn static_call(&mut self) -> Result<(), FailStatus> {
        self.static_or_delegate_call::<false>()
    }

    fn delegate_call(&mut self) -> Result<(), FailStatus> {
        self.static_or_delegate_call::<true>()
    }

    fn static_or_delegate_call<const DELEGATE: bool>(&mut self) -> Result<(), FailStatus> {
        let [gas, addr, args_offset, args_len, ret_offset, ret_len] = self.stack.pop()?;

        let addr: Address = addr.into();
        let args_len = args_len.try_into().map_err(|_| FailStatus::OutOfGas)?;
        let ret_len = ret_len.try_into().map_err(|_| FailStatus::OutOfGas)?;

        consume_address_access_cost(&mut self.gas_left, &addr, self.host, self.revision)?;
        // charge the expansion of the return window now; the slice itself is
        // taken again after the call
        let _dest = self
            .memory
            .get_mut_slice(ret_offset, ret_len, &mut self.gas_left)?;
        let input = self
            .memory
            .get_mut_slice(args_offset, args_len, &mut self.gas_left)?;

        let limit = self.gas_left.as_u64() - self.gas_left.as_u64() / 64;
        let mut endowment = gas.into_u64_saturating();
        if self.revision >= Revision::TangerineWhistle {
            endowment = min(endowment, limit); // cap at all but one 64th of the gas left
        }

        if self.message.depth >= CALL_DEPTH_LIMIT {
            self.return_data = None;
            self.stack.push(u256::ZERO)?;
            return Ok(());
        }

        let call_message = if DELEGATE {
            ExecutionMessage {
                kind: MessageKind::DelegateCall,
                flags: self.message.flags,
                depth: self.message.depth + 1,
                gas: endowment as i64,
                recipient: self.message.recipient,
                sender: self.message.sender,
                input: Some(input),
                value: self.message.value,
                create2_salt: u256::ZERO,
                code_address: addr,
                code_hash: None,
            }
        } else {
            ExecutionMessage {
                kind: MessageKind::Call,
                flags: self.message.flags | MessageFlags::Static as u32,
                depth: self.message.depth + 1,
                gas: endowment as i64,
                recipient: addr,
                sender: self.message.recipient,
                input: Some(input),
                value: u256::ZERO,
                create2_salt: u256::ZERO,
                code_address: addr,
                code_hash: None,
            }
        };

        let result = self.host.call(&call_message);
        self.return_data = result.output().map(ToOwned::to_owned);
        let dest = self
            .memory
            .get_mut_slice(ret_offset, ret_len, &mut self.gas_left)?;
        if let Some(output) = &self.return_data {
            let min_len = min(output.len(), ret_len as usize); // ret_len == dest.len()
            dest[..min_len].copy_from_slice(&output[..min_len]);
        }

        self.gas_left.refund(result.gas_left().max(0) as u64);
        self.gas_left.consume(endowment)?;
        self.gas_refund += result.gas_refund();

        self.stack
            .push(result.status_code() == StatusCode::Success)?;
        Ok(())
    }
}

impl<'a, H: Host> From<Interpreter<'a, H>> for ExecutionResult {
    fn from(value: Interpreter<'a, H>) -> Self {
        // the refund counter of a reverted frame is discarded
        let gas_refund = if value.exec_status == ExecStatus::Revert {
            0
        } else {
            value.gas_refund
        };
        Self::new(
            value.exec_status.into(),
            value.gas_left.value(),
            gas_refund,
            value.output,
        )
    }
}
