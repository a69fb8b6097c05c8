//! Arbitrary-precision integer arithmetic for the proof protocol.
//!
//! Wraps a signed big integer with the modular operations the protocol
//! needs. Group elements stay non-negative; negative values occur only in
//! proof-of-knowledge exponents (`v - e*ra` and friends), which is why the
//! plain `add`/`sub`/`mul` operations are signed and unreduced while the
//! `mod_*` family always reduces into `[0, n)`.

use std::fmt;
use std::str::FromStr;

use glass_pumpkin::prime;
use num_bigint::{BigInt, RandBigInt, Sign};
use num_integer::Integer;
use num_traits::{Num, One, Pow, Signed, ToPrimitive, Zero};
use rand::rngs::OsRng;
use serde::de::Visitor;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use crate::errors::prelude::*;

#[derive(Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BigNumber {
    bn: BigInt,
}

impl BigNumber {
    pub fn new() -> AnoncredsResult<BigNumber> {
        Ok(BigNumber { bn: BigInt::zero() })
    }

    pub fn from_u32(n: usize) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber { bn: BigInt::from(n) })
    }

    pub fn from_dec(dec: &str) -> AnoncredsResult<BigNumber> {
        let bn = BigInt::from_str(dec).map_err(|err| {
            AnoncredsError::InvalidStructure(format!("Invalid decimal number: {}", err))
        })?;
        Ok(BigNumber { bn })
    }

    pub fn from_hex(hex: &str) -> AnoncredsResult<BigNumber> {
        let bn = BigInt::from_str_radix(hex, 16).map_err(|err| {
            AnoncredsError::InvalidStructure(format!("Invalid hex number: {}", err))
        })?;
        Ok(BigNumber { bn })
    }

    /// Interprets `bytes` as an unsigned big-endian integer.
    pub fn from_bytes(bytes: &[u8]) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber {
            bn: BigInt::from_bytes_be(Sign::Plus, bytes),
        })
    }

    pub fn to_dec(&self) -> AnoncredsResult<String> {
        Ok(self.bn.to_str_radix(10))
    }

    pub fn to_hex(&self) -> AnoncredsResult<String> {
        Ok(self.bn.to_str_radix(16))
    }

    /// Big-endian bytes of the magnitude.
    pub fn to_bytes(&self) -> AnoncredsResult<Vec<u8>> {
        let (_, bytes) = self.bn.to_bytes_be();
        Ok(bytes)
    }

    /// Uniformly random non-negative integer of at most `size` bits.
    pub fn rand(size: usize) -> AnoncredsResult<BigNumber> {
        let mut rng = OsRng;
        let res = rng.gen_biguint(size as u64);
        Ok(BigNumber {
            bn: BigInt::from(res),
        })
    }

    pub fn num_bits(&self) -> AnoncredsResult<usize> {
        Ok(self.bn.bits() as usize)
    }

    pub fn is_negative(&self) -> bool {
        self.bn.is_negative()
    }

    pub fn is_prime(&self) -> AnoncredsResult<bool> {
        match self.bn.to_biguint() {
            Some(v) => Ok(prime::check(&v)),
            None => Ok(false),
        }
    }

    pub fn add(&self, a: &BigNumber) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber {
            bn: &self.bn + &a.bn,
        })
    }

    pub fn sub(&self, a: &BigNumber) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber {
            bn: &self.bn - &a.bn,
        })
    }

    pub fn mul(&self, a: &BigNumber) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber {
            bn: &self.bn * &a.bn,
        })
    }

    pub fn increment(&self) -> AnoncredsResult<BigNumber> {
        Ok(BigNumber { bn: &self.bn + 1 })
    }

    /// `self^a` for a small non-negative exponent.
    pub fn exp(&self, a: &BigNumber) -> AnoncredsResult<BigNumber> {
        let exp = a.bn.to_u32().ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!("Invalid plain exponent: {:?}", a))
        })?;
        Ok(BigNumber {
            bn: (&self.bn).pow(exp),
        })
    }

    /// `self mod n`, reduced into `[0, n)`.
    pub fn modulus(&self, n: &BigNumber) -> AnoncredsResult<BigNumber> {
        if n.bn.is_zero() {
            return Err(AnoncredsError::InvalidStructure(
                "Modulus is zero".to_string(),
            ));
        }
        Ok(BigNumber {
            bn: self.bn.mod_floor(&n.bn),
        })
    }

    pub fn mod_mul(&self, a: &BigNumber, n: &BigNumber) -> AnoncredsResult<BigNumber> {
        if n.bn.is_zero() {
            return Err(AnoncredsError::InvalidStructure(
                "Modulus is zero".to_string(),
            ));
        }
        Ok(BigNumber {
            bn: (&self.bn * &a.bn).mod_floor(&n.bn),
        })
    }

    /// `self^a mod n`. A negative exponent is handled by inverting the base,
    /// so the base must be invertible modulo `n` in that case.
    pub fn mod_exp(&self, a: &BigNumber, n: &BigNumber) -> AnoncredsResult<BigNumber> {
        if n.bn.is_zero() {
            return Err(AnoncredsError::InvalidStructure(
                "Modulus is zero".to_string(),
            ));
        }
        if a.bn.is_negative() {
            let base = self.inverse(n)?;
            Ok(BigNumber {
                bn: base.bn.modpow(&a.bn.abs(), &n.bn),
            })
        } else {
            let base = self.bn.mod_floor(&n.bn);
            Ok(BigNumber {
                bn: base.modpow(&a.bn, &n.bn),
            })
        }
    }

    /// `self * a^-1 mod n`.
    pub fn mod_div(&self, a: &BigNumber, n: &BigNumber) -> AnoncredsResult<BigNumber> {
        self.mod_mul(&a.inverse(n)?, n)
    }

    pub fn inverse(&self, n: &BigNumber) -> AnoncredsResult<BigNumber> {
        if n.bn.is_zero() || n.bn.is_one() {
            return Err(AnoncredsError::InvalidStructure(
                "Invalid modulus for inverse".to_string(),
            ));
        }
        let egcd = self.bn.extended_gcd(&n.bn);
        if !egcd.gcd.is_one() {
            return Err(AnoncredsError::InvalidStructure(
                "No inverse for the given modulus".to_string(),
            ));
        }
        Ok(BigNumber {
            bn: egcd.x.mod_floor(&n.bn),
        })
    }

    /// SHA-256 digest of `data`.
    pub fn hash(data: &[u8]) -> AnoncredsResult<Vec<u8>> {
        Ok(Sha256::digest(data).to_vec())
    }

    /// SHA-256 digest over the concatenation of `nums`.
    pub fn hash_array(nums: &[Vec<u8>]) -> AnoncredsResult<Vec<u8>> {
        let mut hasher = Sha256::new();
        for num in nums {
            hasher.update(num);
        }
        Ok(hasher.finalize().to_vec())
    }
}

impl fmt::Debug for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "BigNumber {{ bn: \"{}\" }}", self.bn)
    }
}

impl fmt::Display for BigNumber {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.bn)
    }
}

impl Serialize for BigNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_newtype_struct(
            "BigNumber",
            &self.to_dec().map_err(serde::ser::Error::custom)?,
        )
    }
}

impl<'a> Deserialize<'a> for BigNumber {
    fn deserialize<D>(deserializer: D) -> Result<BigNumber, D::Error>
    where
        D: Deserializer<'a>,
    {
        struct BigNumberVisitor;

        impl<'a> Visitor<'a> for BigNumberVisitor {
            type Value = BigNumber;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("expected BigNumber")
            }

            fn visit_str<E>(self, value: &str) -> Result<BigNumber, E>
            where
                E: serde::de::Error,
            {
                BigNumber::from_dec(value).map_err(E::custom)
            }
        }

        deserializer.deserialize_str(BigNumberVisitor)
    }
}
