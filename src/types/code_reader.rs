use std::{cmp::min, ops::Deref};

use crate::types::{u256, AnalysisContainer, CodeAnalysis, CodeByteType, FailStatus};

/// The code of a call frame together with the program counter and the jump
/// destination analysis.
#[derive(Debug)]
pub struct CodeReader<'a> {
    code: &'a [u8],
    code_analysis: AnalysisContainer<CodeAnalysis>,
    pc: usize,
}

impl<'a> Deref for CodeReader<'a> {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        self.code
    }
}

impl<'a> CodeReader<'a> {
    pub fn new(code: &'a [u8], code_hash: Option<u256>) -> Self {
        Self {
            code,
            code_analysis: CodeAnalysis::new(code, code_hash),
            pc: 0,
        }
    }

    /// The raw byte at the program counter, or `None` when the counter
    /// moved past the end of the code.
    pub fn get(&self) -> Option<u8> {
        self.code.get(self.pc).copied()
    }

    pub fn next(&mut self) {
        self.pc += 1;
    }

    pub fn try_jump(&mut self, dest: u256) -> Result<(), FailStatus> {
        let dest = u64::try_from(dest).map_err(|_| FailStatus::BadJumpDestination)? as usize;
        if dest >= self.code_analysis.analysis.len()
            || self.code_analysis.analysis[dest] != CodeByteType::JumpDest
        {
            return Err(FailStatus::BadJumpDestination);
        }
        self.pc = dest;

        Ok(())
    }

    /// Read `len` immediate bytes at the program counter and advance past
    /// them. Missing bytes past the code end read as zero.
    pub fn get_push_data(&mut self, len: usize) -> u256 {
        debug_assert!(len <= 32);

        let data_len = min(len, self.code.len().saturating_sub(self.pc));
        let mut data = u256::ZERO;
        data[32 - len..32 - len + data_len]
            .copy_from_slice(&self.code[self.pc..self.pc + data_len]);
        self.pc += len;

        data
    }

    pub fn pc(&self) -> usize {
        self.pc
    }
}
