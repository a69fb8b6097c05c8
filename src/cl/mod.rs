//! Data model of the primary proof protocol.
//!
//! Records are immutable value types: "updating" a claim or turning an
//! init-proof into a finished proof always builds a new record. Init-proof
//! records hold secret blinding randomness; they are deliberately not
//! serializable and are consumed by value at finalize, so a proof session
//! cannot be replayed with the same randomness.

pub mod constants;
pub mod helpers;
pub mod prover;
pub mod wallet;


use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::bn::BigNumber;
use crate::cl::constants::*;
use crate::errors::prelude::*;

/// Opaque identifier of the schema a claim was issued against. Wallet
/// entries (issuer key, master secret, blinding data) are keyed by it.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SchemaKey(String);

impl SchemaKey {
    pub fn new<S: Into<String>>(id: S) -> SchemaKey {
        SchemaKey(id.into())
    }
}

impl fmt::Display for SchemaKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Issuer public key for primary claims.
///
/// `n` is a strong-RSA modulus; `s` generates the quadratic residues;
/// `z`, `rms`, `rctxt` and the per-attribute `r` values are powers of `s`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerPublicKey {
    n: BigNumber,
    s: BigNumber,
    z: BigNumber,
    rms: BigNumber,
    rctxt: BigNumber,
    r: BTreeMap<String, BigNumber>,
}

impl IssuerPublicKey {
    pub fn new(
        n: BigNumber,
        s: BigNumber,
        z: BigNumber,
        rms: BigNumber,
        rctxt: BigNumber,
        r: BTreeMap<String, BigNumber>,
    ) -> IssuerPublicKey {
        IssuerPublicKey {
            n,
            s,
            z,
            rms,
            rctxt,
            r,
        }
    }
}

/// Prover's master secret. Never leaves the wallet in clear; it enters the
/// issuance flow blinded (inside `ClaimInitData::u`) and the proof flow
/// only through the `m1` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MasterSecret {
    ms: BigNumber,
}

impl MasterSecret {
    pub fn new() -> AnoncredsResult<MasterSecret> {
        let ms = helpers::bn_rand(LARGE_MASTER_SECRET)?;
        trace!("MasterSecret::new: <<< ms: {:?}", secret!(&ms));
        Ok(MasterSecret { ms })
    }
}

/// Blinding state produced before issuance: `u = s^v_prime * rms^ms mod n`
/// goes to the issuer, `v_prime` stays in the wallet and is folded into the
/// returned signature by `prepare_primary_claim`. Single protocol use.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimInitData {
    u: BigNumber,
    v_prime: BigNumber,
}

impl ClaimInitData {
    /// The blinded master-secret commitment to send to the issuer.
    pub fn blinded_ms(&self) -> &BigNumber {
        &self.u
    }
}

/// Issuer-signed primary claim over encoded attribute values.
///
/// Invariant (for a prepared claim):
/// `a^e * s^v * rms^ms * rctxt^m2 * prod(r_i^attr_i) = z  (mod n)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryClaim {
    encoded_attrs: BTreeMap<String, BigNumber>,
    a: BigNumber,
    e: BigNumber,
    v: BigNumber,
    m2: BigNumber,
}

impl PrimaryClaim {
    pub fn new(
        encoded_attrs: BTreeMap<String, BigNumber>,
        a: BigNumber,
        e: BigNumber,
        v: BigNumber,
        m2: BigNumber,
    ) -> PrimaryClaim {
        PrimaryClaim {
            encoded_attrs,
            a,
            e,
            v,
            m2,
        }
    }
}

/// Inequality `attr_name >= value` to be proven over a hidden attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Predicate {
    attr_name: String,
    value: i32,
}

impl Predicate {
    pub fn new<S: Into<String>>(attr_name: S, value: i32) -> Predicate {
        Predicate {
            attr_name: attr_name.into(),
            value,
        }
    }
}

/// Commit-phase state of the equality sub-proof. Holds the blinding
/// randomness, so it must never be serialized or logged unredacted.
#[derive(Debug, PartialEq, Eq)]
pub struct PrimaryEqualInitProof {
    a_prime: BigNumber,
    t: BigNumber,
    e_tilde: BigNumber,
    e_prime: BigNumber,
    v_tilde: BigNumber,
    v_prime: BigNumber,
    m_tilde: BTreeMap<String, BigNumber>,
    m1_tilde: BigNumber,
    m2_tilde: BigNumber,
    m2: BigNumber,
    unrevealed_attrs: BTreeSet<String>,
    revealed_attrs: BTreeSet<String>,
    encoded_attrs: BTreeMap<String, BigNumber>,
}

impl PrimaryEqualInitProof {
    pub fn as_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        Ok(vec![self.a_prime.to_bytes()?])
    }

    pub fn as_tau_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        Ok(vec![self.t.to_bytes()?])
    }
}

/// Finished equality sub-proof: response values plus the revealed
/// attribute values the verifier checks them against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryEqualProof {
    revealed_attrs: BTreeMap<String, BigNumber>,
    a_prime: BigNumber,
    e: BigNumber,
    v: BigNumber,
    m: BTreeMap<String, BigNumber>,
    m1: BigNumber,
    m2: BigNumber,
}

/// Commit-phase state of one GE predicate sub-proof.
///
/// The four square decomposition slots are fixed-size arrays; the delta
/// commitment has its own named fields. `c_list` keeps the canonical
/// challenge ordering `[t[0], t[1], t[2], t[3], t_delta]`.
#[derive(Debug, PartialEq, Eq)]
pub struct PrimaryPredicateGEInitProof {
    c_list: Vec<BigNumber>,
    tau_list: Vec<BigNumber>,
    u: [BigNumber; ITERATION],
    u_tilde: [BigNumber; ITERATION],
    r: [BigNumber; ITERATION],
    r_tilde: [BigNumber; ITERATION],
    r_delta: BigNumber,
    r_delta_tilde: BigNumber,
    alpha_tilde: BigNumber,
    t: [BigNumber; ITERATION],
    t_delta: BigNumber,
    predicate: Predicate,
}

impl PrimaryPredicateGEInitProof {
    pub fn as_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        self.c_list.iter().map(|v| v.to_bytes()).collect()
    }

    pub fn as_tau_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        self.tau_list.iter().map(|v| v.to_bytes()).collect()
    }
}

/// Finished GE predicate sub-proof.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryPredicateGEProof {
    u: [BigNumber; ITERATION],
    r: [BigNumber; ITERATION],
    r_delta: BigNumber,
    mj: BigNumber,
    alpha: BigNumber,
    t: [BigNumber; ITERATION],
    t_delta: BigNumber,
    predicate: Predicate,
}

/// Commit-phase state of a whole primary proof: one equality sub-proof and
/// one GE sub-proof per requested predicate, in input order.
#[derive(Debug, PartialEq, Eq)]
pub struct PrimaryInitProof {
    eq_proof: PrimaryEqualInitProof,
    ge_proofs: Vec<PrimaryPredicateGEInitProof>,
}

impl PrimaryInitProof {
    /// Commitment values in canonical challenge order: the equality proof
    /// contributes `[a_prime]`, then each GE proof its `c_list`.
    pub fn as_c_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        let mut c_list: Vec<Vec<u8>> = self.eq_proof.as_list()?;
        for ge_proof in self.ge_proofs.iter() {
            c_list.extend(ge_proof.as_list()?);
        }
        Ok(c_list)
    }

    /// Tau values in canonical challenge order: the equality proof
    /// contributes `[t]`, then each GE proof its `tau_list`.
    pub fn as_tau_list(&self) -> AnoncredsResult<Vec<Vec<u8>>> {
        let mut tau_list: Vec<Vec<u8>> = self.eq_proof.as_tau_list()?;
        for ge_proof in self.ge_proofs.iter() {
            tau_list.extend(ge_proof.as_tau_list()?);
        }
        Ok(tau_list)
    }
}

/// Finished primary proof, ready for transport to a verifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryProof {
    eq_proof: PrimaryEqualProof,
    ge_proofs: Vec<PrimaryPredicateGEProof>,
}

/// Verifier-supplied freshness value mixed into the challenge hash.
pub type Nonce = BigNumber;

pub fn new_nonce() -> AnoncredsResult<Nonce> {
    Ok(helpers::bn_rand(LARGE_NONCE)?)
}
