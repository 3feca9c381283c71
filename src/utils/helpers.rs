use std::cmp::min;

use crate::{
    types::{u256, ExecutionMessage, FailStatus},
    utils::Gas,
};

pub trait SliceExt {
    /// The sub-slice `[offset, offset + len)` clamped to the slice bounds.
    /// Out-of-range accesses yield an empty or shortened slice.
    fn get_within_bounds(&self, offset: u256, len: u64) -> &[u8];

    /// Copy `src` to the beginning of `self` and zero-fill the rest,
    /// charging the copy cost for the full destination length.
    fn copy_padded(&mut self, src: &[u8], gas_left: &mut Gas) -> Result<(), FailStatus>;
}

impl SliceExt for [u8] {
    #[inline(always)]
    fn get_within_bounds(&self, offset: u256, len: u64) -> &[u8] {
        if len == 0 {
            return &[];
        }
        let (offset, offset_overflow) = offset.into_u64_with_overflow();
        if offset_overflow {
            return &[];
        }
        let offset = offset as usize;
        let len = len as usize;
        let (end, end_overflow) = offset.overflowing_add(len);
        if end_overflow || offset >= self.len() {
            &[]
        } else {
            &self[offset..min(end, self.len())]
        }
    }

    #[inline(always)]
    fn copy_padded(&mut self, src: &[u8], gas_left: &mut Gas) -> Result<(), FailStatus> {
        gas_left.consume_copy_cost(self.len() as u64)?;
        self[..src.len()].copy_from_slice(src);
        self[src.len()..].fill(0);
        Ok(())
    }
}

/// The number of 32-byte words needed to hold `byte_len` bytes.
#[inline(always)]
pub fn word_size(byte_len: u64) -> Result<u64, FailStatus> {
    let (end, overflow) = byte_len.overflowing_add(31);
    if overflow {
        return Err(FailStatus::OutOfGas);
    }
    Ok(end / 32)
}

#[inline(always)]
pub fn check_not_read_only(message: &ExecutionMessage) -> Result<(), FailStatus> {
    if message.is_static() {
        return Err(FailStatus::StaticModeViolation);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        types::{u256, ExecutionMessage, FailStatus, MessageFlags},
        utils::{self, Gas, SliceExt},
    };

    #[test]
    fn get_within_bounds() {
        assert_eq!([].get_within_bounds(u256::ZERO, 1), &[]);
        assert_eq!([1].get_within_bounds(u256::ZERO, 0), &[]);
        assert_eq!([1].get_within_bounds(u256::ZERO, 1), &[1]);
        assert_eq!([1].get_within_bounds(u256::ZERO, 2), &[1]);
        assert_eq!([1].get_within_bounds(u256::ONE, 1), &[]);
        assert_eq!([1].get_within_bounds(u256::MAX, 1), &[]);
    }

    #[test]
    fn copy_padded() {
        let mut gas_left = Gas::new(1_000_000);

        let mut dest = [];
        assert_eq!(dest.copy_padded(&[], &mut gas_left), Ok(()));

        let mut dest = [1];
        assert_eq!(dest.copy_padded(&[], &mut gas_left), Ok(()));
        assert_eq!(dest, [0]);

        let mut dest = [1];
        assert_eq!(dest.copy_padded(&[2], &mut gas_left), Ok(()));
        assert_eq!(dest, [2]);

        let mut dest = [1, 2];
        assert_eq!(dest.copy_padded(&[3], &mut gas_left), Ok(()));
        assert_eq!(dest, [3, 0]);

        let mut dest = [1];
        assert_eq!(
            dest.copy_padded(&[2], &mut Gas::new(0)),
            Err(FailStatus::OutOfGas)
        );
    }

    #[test]
    fn word_size() {
        assert_eq!(utils::word_size(0), Ok(0));
        assert_eq!(utils::word_size(1), Ok(1));
        assert_eq!(utils::word_size(32), Ok(1));
        assert_eq!(utils::word_size(33), Ok(2));
        assert_eq!(utils::word_size(u64::MAX), Err(FailStatus::OutOfGas));
    }

    #[test]
    fn check_not_read_only() {
        let message = ExecutionMessage::default();
        assert_eq!(utils::check_not_read_only(&message), Ok(()));

        let message = ExecutionMessage {
            flags: MessageFlags::Static as u32,
            ..Default::default()
        };
        assert_eq!(
            utils::check_not_read_only(&message),
            Err(FailStatus::StaticModeViolation)
        );
    }
}
