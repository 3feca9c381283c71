use std::iter;

use crate::{
    types::{u256, FailStatus},
    utils::{word_size, Gas},
};

/// The byte memory of a call frame.
///
/// Starts empty and grows in 32-byte words. Growth is monotonic within a
/// frame and is paid for with the quadratic expansion cost before the
/// buffer is zero-extended.
#[derive(Debug)]
pub struct Memory(Vec<u8>);

impl Memory {
    pub fn new(memory: &[u8]) -> Self {
        Self(memory.to_owned())
    }

    pub fn as_slice(&self) -> &[u8] {
        self.0.as_slice()
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> u64 {
        self.0.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn expand(&mut self, new_len_bytes: u64, gas_left: &mut Gas) -> Result<(), FailStatus> {
        #[cold]
        fn expand_raw(
            memory: &mut Memory,
            new_len: u64,
            gas_left: &mut Gas,
        ) -> Result<(), FailStatus> {
            let current_len = memory.0.len() as u64;
            memory.consume_expansion_cost(new_len, gas_left)?;
            memory
                .0
                .extend(iter::repeat(0).take((new_len - current_len) as usize));
            Ok(())
        }

        let current_len = self.0.len() as u64;
        let new_len = word_size(new_len_bytes)? * 32; // word_size divided by 32 so * does not overflow
        if new_len > current_len {
            expand_raw(self, new_len, gas_left)?;
        }
        Ok(())
    }

    fn consume_expansion_cost(&self, new_len: u64, gas_left: &mut Gas) -> Result<(), FailStatus> {
        fn memory_cost(size: u64) -> Result<u64, FailStatus> {
            let word_size = word_size(size)?;
            let (pow2, pow2_overflow) = word_size.overflowing_pow(2);
            let (word_size_3, word_size_3_overflow) = word_size.overflowing_mul(3);
            let (cost, cost_overflow) = (pow2 / 512).overflowing_add(word_size_3);
            if pow2_overflow || word_size_3_overflow || cost_overflow {
                return Err(FailStatus::OutOfGas);
            };
            Ok(cost)
        }

        let current_len = self.0.len() as u64;

        if new_len > current_len {
            let memory_expansion_cost = memory_cost(new_len)? - memory_cost(current_len)?;
            gas_left.consume(memory_expansion_cost)?;
        }
        Ok(())
    }

    /// Grow to cover `[offset, offset + len)` (charging the expansion cost)
    /// and return that region. A zero `len` never grows and never fails.
    pub fn get_mut_slice(
        &mut self,
        offset: u256,
        len: u64,
        gas_left: &mut Gas,
    ) -> Result<&mut [u8], FailStatus> {
        if len == 0 {
            return Ok(&mut []);
        }
        let (offset, offset_overflow) = offset.into_u64_with_overflow();
        let (end, end_overflow) = offset.overflowing_add(len);
        if offset_overflow || end_overflow {
            // The gas needed to grow that far is unpayable.
            return Err(FailStatus::OutOfGas);
        }
        self.expand(end, gas_left)?;

        Ok(&mut self.0[offset as usize..end as usize])
    }

    pub fn get_word(&mut self, offset: u256, gas_left: &mut Gas) -> Result<u256, FailStatus> {
        let slice = self.get_mut_slice(offset, 32, gas_left)?;
        let mut bytes = [0; 32];
        bytes.copy_from_slice(slice);
        Ok(bytes.into())
    }

    pub fn get_mut_byte(
        &mut self,
        offset: u256,
        gas_left: &mut Gas,
    ) -> Result<&mut u8, FailStatus> {
        let slice = self.get_mut_slice(offset, 1, gas_left)?;
        Ok(&mut slice[0])
    }
}
