#[macro_use]
pub mod logger;
pub mod commitment;

use crate::bn::BigNumber;
use crate::errors::prelude::*;

/// SHA-256 over the concatenation of `nums`, interpreted as a big-endian
/// integer. The canonical challenge derivation hashes the tau list, the
/// commitment list and the verifier nonce through this function.
pub fn get_hash_as_int(nums: &[Vec<u8>]) -> AnoncredsResult<BigNumber> {
    trace!("Helpers::get_hash_as_int: >>> nums: {:?}", nums);

    let hash = BigNumber::from_bytes(&BigNumber::hash_array(nums)?);

    trace!("Helpers::get_hash_as_int: <<< hash: {:?}", hash);

    hash
}

macro_rules! btreeset {
    ( $( $x:expr ),* ) => {
        {
            let mut set = ::std::collections::BTreeSet::new();
            $(
                set.insert($x);
            )*
            set
        }
    }
}

macro_rules! btreemap {
    ($( $key: expr => $val: expr ),*) => {
        {
            let mut map = ::std::collections::BTreeMap::new();
            $(
                map.insert($key, $val);
            )*
            map
        }
    }
}
