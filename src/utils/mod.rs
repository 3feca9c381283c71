mod gas;
mod helpers;

pub use gas::{
    consume_address_access_cost, consume_positive_value_cost, consume_storage_access_cost,
    consume_value_to_empty_account_cost, Gas,
};
pub use helpers::{check_not_read_only, word_size, SliceExt};
