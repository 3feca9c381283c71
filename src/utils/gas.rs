use crate::{
    types::{u256, AccessStatus, Address, FailStatus, Host, Revision},
    utils::word_size,
};

/// EIP-2929 cold surcharges on top of the warm access cost charged by the
/// instruction table.
const COLD_ACCOUNT_ACCESS_SURCHARGE: u64 = 2600 - 100;
const COLD_SLOAD_SURCHARGE: u64 = 2100 - 100;

/// The gas counter of a call frame.
///
/// Charging subtracts first and checks afterwards, so the counter can be
/// observed negative for the duration of a failed charge; that state is
/// reported as [`FailStatus::OutOfGas`] and ends the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gas(i64);

impl Gas {
    pub fn new(gas: i64) -> Self {
        Self(gas)
    }

    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn as_u64(&self) -> u64 {
        self.0.max(0) as u64
    }

    pub fn consume(&mut self, gas: u64) -> Result<(), FailStatus> {
        let Ok(gas) = i64::try_from(gas) else {
            return Err(FailStatus::OutOfGas);
        };
        self.0 -= gas;
        if self.0 < 0 {
            return Err(FailStatus::OutOfGas);
        }
        Ok(())
    }

    pub fn refund(&mut self, gas: u64) {
        self.0 += gas as i64;
    }

    /// 3 gas per 32-byte word copied.
    pub fn consume_copy_cost(&mut self, len: u64) -> Result<(), FailStatus> {
        let (cost, cost_overflow) = word_size(len)?.overflowing_mul(3);
        if cost_overflow {
            return Err(FailStatus::OutOfGas);
        }
        self.consume(cost)
    }
}

impl PartialEq<i64> for Gas {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

#[inline(always)]
pub fn consume_positive_value_cost(
    value: &u256,
    gas_left: &mut Gas,
) -> Result<(), FailStatus> {
    if *value != u256::ZERO {
        gas_left.consume(9000)?;
    }
    Ok(())
}

#[inline(always)]
pub fn consume_value_to_empty_account_cost<H: Host>(
    value: &u256,
    addr: &Address,
    host: &mut H,
    revision: Revision,
    gas_left: &mut Gas,
) -> Result<(), FailStatus> {
    // Before Spurious Dragon the account creation cost applies even for
    // zero-value calls to absent accounts.
    if (*value != u256::ZERO || revision < Revision::SpuriousDragon)
        && !host.account_exists(addr)
    {
        gas_left.consume(25000)?;
    }
    Ok(())
}

#[inline(always)]
pub fn consume_address_access_cost<H: Host>(
    gas_left: &mut Gas,
    addr: &Address,
    host: &mut H,
    revision: Revision,
) -> Result<(), FailStatus> {
    if revision >= Revision::Berlin && host.access_account(addr) == AccessStatus::Cold {
        gas_left.consume(COLD_ACCOUNT_ACCESS_SURCHARGE)?;
    }
    Ok(())
}

#[inline(always)]
pub fn consume_storage_access_cost<H: Host>(
    gas_left: &mut Gas,
    addr: &Address,
    key: &u256,
    host: &mut H,
    revision: Revision,
) -> Result<(), FailStatus> {
    if revision >= Revision::Berlin && host.access_storage(addr, key) == AccessStatus::Cold {
        gas_left.consume(COLD_SLOAD_SURCHARGE)?;
    }
    Ok(())
}
