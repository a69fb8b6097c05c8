use crate::bn::BigNumber;
use crate::errors::prelude::*;

/// Pedersen commitment `gen_1^m * gen_2^r mod modulus`.
///
/// The same shape covers the blinded master-secret commitment (`s^v' *
/// rms^ms`) and the predicate-proof commitments (`z^u * s^r`).
pub fn get_pedersen_commitment(
    gen_1: &BigNumber,
    m: &BigNumber,
    gen_2: &BigNumber,
    r: &BigNumber,
    modulus: &BigNumber,
) -> AnoncredsResult<BigNumber> {
    let commitment = gen_1
        .mod_exp(m, modulus)?
        .mod_mul(&gen_2.mod_exp(r, modulus)?, modulus)?;
    Ok(commitment)
}
