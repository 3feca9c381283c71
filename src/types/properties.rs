use crate::types::{Opcode, Revision};

/// Static properties of an opcode at a particular revision: the base gas
/// cost charged before the instruction runs, the stack height it requires,
/// and the stack height change it causes.
///
/// Dynamic costs (memory expansion, copy length, exponent size, storage and
/// account access) are charged by the instruction bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpProperties {
    pub gas_cost: u16,
    pub stack_required: u8,
    pub stack_change: i8,
}

/// Per-revision lookup table indexed by the raw opcode byte. `None` means
/// the byte is not a defined instruction at that revision.
pub type InstructionTable = [Option<OpProperties>; 256];

const fn op(gas_cost: u16, stack_required: u8, stack_change: i8) -> Option<OpProperties> {
    Some(OpProperties {
        gas_cost,
        stack_required,
        stack_change,
    })
}

const fn frontier() -> InstructionTable {
    let mut table: InstructionTable = [None; 256];

    table[Opcode::Stop as usize] = op(0, 0, 0);
    table[Opcode::Add as usize] = op(3, 2, -1);
    table[Opcode::Mul as usize] = op(5, 2, -1);
    table[Opcode::Sub as usize] = op(3, 2, -1);
    table[Opcode::Div as usize] = op(5, 2, -1);
    table[Opcode::SDiv as usize] = op(5, 2, -1);
    table[Opcode::Mod as usize] = op(5, 2, -1);
    table[Opcode::SMod as usize] = op(5, 2, -1);
    table[Opcode::AddMod as usize] = op(8, 3, -2);
    table[Opcode::MulMod as usize] = op(8, 3, -2);
    table[Opcode::Exp as usize] = op(10, 2, -1);
    table[Opcode::SignExtend as usize] = op(5, 2, -1);

    table[Opcode::Lt as usize] = op(3, 2, -1);
    table[Opcode::Gt as usize] = op(3, 2, -1);
    table[Opcode::SLt as usize] = op(3, 2, -1);
    table[Opcode::SGt as usize] = op(3, 2, -1);
    table[Opcode::Eq as usize] = op(3, 2, -1);
    table[Opcode::IsZero as usize] = op(3, 1, 0);
    table[Opcode::And as usize] = op(3, 2, -1);
    table[Opcode::Or as usize] = op(3, 2, -1);
    table[Opcode::Xor as usize] = op(3, 2, -1);
    table[Opcode::Not as usize] = op(3, 1, 0);
    table[Opcode::Byte as usize] = op(3, 2, -1);

    table[Opcode::Sha3 as usize] = op(30, 2, -1);

    table[Opcode::Address as usize] = op(2, 0, 1);
    table[Opcode::Balance as usize] = op(20, 1, 0);
    table[Opcode::Origin as usize] = op(2, 0, 1);
    table[Opcode::Caller as usize] = op(2, 0, 1);
    table[Opcode::CallValue as usize] = op(2, 0, 1);
    table[Opcode::CallDataLoad as usize] = op(3, 1, 0);
    table[Opcode::CallDataSize as usize] = op(2, 0, 1);
    table[Opcode::CallDataCopy as usize] = op(3, 3, -3);
    table[Opcode::CodeSize as usize] = op(2, 0, 1);
    table[Opcode::CodeCopy as usize] = op(3, 3, -3);
    table[Opcode::GasPrice as usize] = op(2, 0, 1);
    table[Opcode::ExtCodeSize as usize] = op(20, 1, 0);
    table[Opcode::ExtCodeCopy as usize] = op(20, 4, -4);

    table[Opcode::BlockHash as usize] = op(20, 1, 0);
    table[Opcode::Coinbase as usize] = op(2, 0, 1);
    table[Opcode::Timestamp as usize] = op(2, 0, 1);
    table[Opcode::Number as usize] = op(2, 0, 1);
    table[Opcode::PrevRandao as usize] = op(2, 0, 1);
    table[Opcode::GasLimit as usize] = op(2, 0, 1);

    table[Opcode::Pop as usize] = op(2, 1, -1);
    table[Opcode::MLoad as usize] = op(3, 1, 0);
    table[Opcode::MStore as usize] = op(3, 2, -2);
    table[Opcode::MStore8 as usize] = op(3, 2, -2);
    table[Opcode::SLoad as usize] = op(50, 1, 0);
    table[Opcode::SStore as usize] = op(0, 2, -2);
    table[Opcode::Jump as usize] = op(8, 1, -1);
    table[Opcode::JumpI as usize] = op(10, 2, -2);
    table[Opcode::Pc as usize] = op(2, 0, 1);
    table[Opcode::MSize as usize] = op(2, 0, 1);
    table[Opcode::Gas as usize] = op(2, 0, 1);
    table[Opcode::JumpDest as usize] = op(1, 0, 0);

    let mut i = 0;
    while i < 32 {
        table[Opcode::Push1 as usize + i] = op(3, 0, 1);
        i += 1;
    }
    let mut i = 0;
    while i < 16 {
        table[Opcode::Dup1 as usize + i] = op(3, i as u8 + 1, 1);
        table[Opcode::Swap1 as usize + i] = op(3, i as u8 + 2, 0);
        i += 1;
    }
    let mut i = 0;
    while i < 5 {
        table[Opcode::Log0 as usize + i] = op(375, i as u8 + 2, -(i as i8) - 2);
        i += 1;
    }

    table[Opcode::Create as usize] = op(32000, 3, -2);
    table[Opcode::Call as usize] = op(40, 7, -6);
    table[Opcode::CallCode as usize] = op(40, 7, -6);
    table[Opcode::Return as usize] = op(0, 2, -2);
    table[Opcode::Invalid as usize] = op(0, 0, 0);
    table[Opcode::SelfDestruct as usize] = op(0, 1, -1);

    table
}

const fn homestead() -> InstructionTable {
    let mut table = frontier();
    table[Opcode::DelegateCall as usize] = op(40, 6, -5);
    table
}

/// EIP-150 repricing of IO-heavy instructions.
const fn tangerine_whistle() -> InstructionTable {
    let mut table = homestead();
    table[Opcode::Balance as usize] = op(400, 1, 0);
    table[Opcode::ExtCodeSize as usize] = op(700, 1, 0);
    table[Opcode::ExtCodeCopy as usize] = op(700, 4, -4);
    table[Opcode::SLoad as usize] = op(200, 1, 0);
    table[Opcode::Call as usize] = op(700, 7, -6);
    table[Opcode::CallCode as usize] = op(700, 7, -6);
    table[Opcode::DelegateCall as usize] = op(700, 6, -5);
    table[Opcode::SelfDestruct as usize] = op(5000, 1, -1);
    table
}

const fn byzantium() -> InstructionTable {
    let mut table = tangerine_whistle();
    table[Opcode::ReturnDataSize as usize] = op(2, 0, 1);
    table[Opcode::ReturnDataCopy as usize] = op(3, 3, -3);
    table[Opcode::StaticCall as usize] = op(700, 6, -5);
    table[Opcode::Revert as usize] = op(0, 2, -2);
    table
}

const fn constantinople() -> InstructionTable {
    let mut table = byzantium();
    table[Opcode::Shl as usize] = op(3, 2, -1);
    table[Opcode::Shr as usize] = op(3, 2, -1);
    table[Opcode::Sar as usize] = op(3, 2, -1);
    table[Opcode::ExtCodeHash as usize] = op(400, 1, 0);
    table[Opcode::Create2 as usize] = op(32000, 4, -3);
    table
}

/// EIP-1884 repricing plus CHAINID and SELFBALANCE.
const fn istanbul() -> InstructionTable {
    let mut table = constantinople();
    table[Opcode::Balance as usize] = op(700, 1, 0);
    table[Opcode::ExtCodeHash as usize] = op(700, 1, 0);
    table[Opcode::SLoad as usize] = op(800, 1, 0);
    table[Opcode::ChainId as usize] = op(2, 0, 1);
    table[Opcode::SelfBalance as usize] = op(5, 0, 1);
    table
}

/// EIP-2929: account and storage instructions charge the warm access cost
/// up front; the cold surcharge is applied dynamically from the host's
/// access report.
const fn berlin() -> InstructionTable {
    let mut table = istanbul();
    table[Opcode::Balance as usize] = op(100, 1, 0);
    table[Opcode::ExtCodeSize as usize] = op(100, 1, 0);
    table[Opcode::ExtCodeCopy as usize] = op(100, 4, -4);
    table[Opcode::ExtCodeHash as usize] = op(100, 1, 0);
    table[Opcode::SLoad as usize] = op(100, 1, 0);
    table[Opcode::Call as usize] = op(100, 7, -6);
    table[Opcode::CallCode as usize] = op(100, 7, -6);
    table[Opcode::DelegateCall as usize] = op(100, 6, -5);
    table[Opcode::StaticCall as usize] = op(100, 6, -5);
    table
}

const fn london() -> InstructionTable {
    let mut table = berlin();
    table[Opcode::BaseFee as usize] = op(2, 0, 1);
    table
}

const fn shanghai() -> InstructionTable {
    let mut table = london();
    table[Opcode::Push0 as usize] = op(2, 0, 1);
    table
}

static TABLES: [InstructionTable; 12] = [
    frontier(),
    homestead(),
    tangerine_whistle(),
    tangerine_whistle(), // Spurious Dragon reprices nothing; EXP cost changes dynamically
    byzantium(),
    constantinople(),
    constantinople(), // Petersburg
    istanbul(),
    berlin(),
    london(),
    london(), // Paris only changes the PREVRANDAO source
    shanghai(),
];

pub fn instruction_table(revision: Revision) -> &'static InstructionTable {
    &TABLES[revision as usize]
}
