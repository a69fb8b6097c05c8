//! Proof construction entry points.
//!
//! `ClaimInitializer` covers the issuance round trip: blinding the master
//! secret before the issuer signs, folding the blinding back into the
//! returned signature. `ProofBuilder` builds primary proofs in two phases:
//! `init_proof` samples blinding randomness and produces the commitment
//! lists, the caller derives the challenge from them, and `finalize_proof`
//! turns challenge and init state into response values. Init state is
//! consumed by value, so a session cannot be finalized twice.

use std::collections::{BTreeMap, BTreeSet};
use std::convert::TryInto;

use crate::bn::BigNumber;
use crate::cl::constants::*;
use crate::cl::helpers::{bn_rand, bn_rand_array, calc_teq, calc_tge, four_squares, get_mtilde};
use crate::cl::wallet::ProverWallet;
use crate::cl::{
    ClaimInitData, IssuerPublicKey, Predicate, PrimaryClaim, PrimaryEqualInitProof,
    PrimaryEqualProof, PrimaryInitProof, PrimaryPredicateGEInitProof, PrimaryPredicateGEProof,
    PrimaryProof, SchemaKey,
};
use crate::errors::prelude::*;
use crate::utils::commitment::get_pedersen_commitment;

/// Issuance-side helper: produces the blinded master-secret commitment for
/// the issuer and completes the returned signature.
#[derive(Debug)]
pub struct ClaimInitializer<'a, W: ProverWallet> {
    wallet: &'a W,
}

impl<'a, W: ProverWallet> ClaimInitializer<'a, W> {
    pub fn new(wallet: &'a W) -> ClaimInitializer<'a, W> {
        ClaimInitializer { wallet }
    }

    /// Samples `v_prime` and commits to the master secret:
    /// `u = s^v_prime * rms^ms mod n`. `u` goes to the issuer; the returned
    /// record must be stored in the wallet for `prepare_primary_claim`.
    pub fn gen_claim_init_data(&self, schema_key: &SchemaKey) -> AnoncredsResult<ClaimInitData> {
        trace!(
            "ClaimInitializer::gen_claim_init_data: >>> schema_key: {:?}",
            schema_key
        );

        let pk = self.wallet.get_public_key(schema_key)?;
        let ms = self.wallet.get_master_secret(schema_key)?;

        let v_prime = bn_rand(LARGE_VPRIME)?;
        let u = get_pedersen_commitment(&pk.s, &v_prime, &pk.rms, &ms.ms, &pk.n)?;

        let claim_init_data = ClaimInitData { u, v_prime };

        trace!(
            "ClaimInitializer::gen_claim_init_data: <<< claim_init_data: {:?}",
            secret!(&claim_init_data)
        );

        Ok(claim_init_data)
    }

    /// Folds the stored blinding `v_prime` into the issuer's signature:
    /// the prepared claim carries `v = v'' + v_prime` and satisfies the
    /// signature invariant. Consumes the issued claim and returns a new
    /// record.
    pub fn prepare_primary_claim(
        &self,
        schema_key: &SchemaKey,
        claim: PrimaryClaim,
    ) -> AnoncredsResult<PrimaryClaim> {
        trace!(
            "ClaimInitializer::prepare_primary_claim: >>> schema_key: {:?}, claim: {:?}",
            schema_key,
            secret!(&claim)
        );

        let init_data = self.wallet.get_claim_init_data(schema_key)?;

        let v = claim.v.add(&init_data.v_prime)?;
        let claim = PrimaryClaim { v, ..claim };

        trace!(
            "ClaimInitializer::prepare_primary_claim: <<< claim: {:?}",
            secret!(&claim)
        );

        Ok(claim)
    }
}

/// Two-phase builder of primary proofs against one claim.
#[derive(Debug)]
pub struct ProofBuilder<'a, W: ProverWallet> {
    wallet: &'a W,
}

impl<'a, W: ProverWallet> ProofBuilder<'a, W> {
    pub fn new(wallet: &'a W) -> ProofBuilder<'a, W> {
        ProofBuilder { wallet }
    }

    /// Commit phase. Builds the equality init proof, then one GE init
    /// proof per predicate in input order. An absent claim propagates as
    /// `Ok(None)`: there is nothing to prove, which is not an error.
    ///
    /// `m1_tilde` is the caller-supplied blinding for the master secret
    /// (shared across claims when proofs are linked over several of them);
    /// `m2_tilde` defaults to a fresh sample.
    pub fn init_proof(
        &self,
        schema_key: &SchemaKey,
        claim: Option<&PrimaryClaim>,
        revealed_attrs: &[String],
        predicates: &[Predicate],
        m1_tilde: &BigNumber,
        m2_tilde: Option<BigNumber>,
    ) -> AnoncredsResult<Option<PrimaryInitProof>> {
        trace!(
            "ProofBuilder::init_proof: >>> schema_key: {:?}, claim: {:?}, revealed_attrs: {:?}, predicates: {:?}, m1_tilde: {:?}, m2_tilde: {:?}",
            schema_key,
            secret!(&claim),
            revealed_attrs,
            predicates,
            secret!(m1_tilde),
            secret!(&m2_tilde)
        );

        let claim = match claim {
            Some(claim) => claim,
            None => return Ok(None),
        };

        let pk = self.wallet.get_public_key(schema_key)?;

        let eq_proof = init_eq_proof(pk, claim, revealed_attrs, m1_tilde, m2_tilde)?;

        let mut ge_proofs: Vec<PrimaryPredicateGEInitProof> = Vec::new();
        for predicate in predicates {
            ge_proofs.push(init_ge_proof(pk, &eq_proof, claim, predicate)?);
        }

        let init_proof = PrimaryInitProof {
            eq_proof,
            ge_proofs,
        };

        trace!(
            "ProofBuilder::init_proof: <<< init_proof: {:?}",
            secret!(&init_proof)
        );

        Ok(Some(init_proof))
    }

    /// Response phase. Fetches the master secret, finalizes the equality
    /// sub-proof first, then each GE sub-proof against it. Mirrors
    /// `init_proof`'s `Ok(None)` propagation; consumes the init proof.
    pub fn finalize_proof(
        &self,
        schema_key: &SchemaKey,
        c_h: &BigNumber,
        init_proof: Option<PrimaryInitProof>,
    ) -> AnoncredsResult<Option<PrimaryProof>> {
        trace!(
            "ProofBuilder::finalize_proof: >>> schema_key: {:?}, c_h: {:?}, init_proof: {:?}",
            schema_key,
            c_h,
            secret!(&init_proof)
        );

        let init_proof = match init_proof {
            Some(init_proof) => init_proof,
            None => return Ok(None),
        };

        let ms = self.wallet.get_master_secret(schema_key)?;

        let PrimaryInitProof {
            eq_proof: eq_init_proof,
            ge_proofs: ge_init_proofs,
        } = init_proof;

        let eq_proof = finalize_eq_proof(&ms.ms, c_h, eq_init_proof)?;

        let mut ge_proofs: Vec<PrimaryPredicateGEProof> = Vec::new();
        for ge_init_proof in ge_init_proofs {
            ge_proofs.push(finalize_ge_proof(c_h, ge_init_proof, &eq_proof)?);
        }

        let proof = PrimaryProof { eq_proof, ge_proofs };

        trace!("ProofBuilder::finalize_proof: <<< proof: {:?}", proof);

        Ok(Some(proof))
    }
}

fn init_eq_proof(
    pk: &IssuerPublicKey,
    claim: &PrimaryClaim,
    revealed_attrs: &[String],
    m1_tilde: &BigNumber,
    m2_tilde: Option<BigNumber>,
) -> AnoncredsResult<PrimaryEqualInitProof> {
    trace!(
        "Prover::init_eq_proof: >>> pk: {:?}, claim: {:?}, revealed_attrs: {:?}, m1_tilde: {:?}, m2_tilde: {:?}",
        pk,
        secret!(claim),
        revealed_attrs,
        secret!(m1_tilde),
        secret!(&m2_tilde)
    );

    let m2_tilde = match m2_tilde {
        Some(m2_tilde) => m2_tilde,
        None => bn_rand(LARGE_MVECT)?,
    };

    let revealed_attrs: BTreeSet<String> = revealed_attrs.iter().cloned().collect();
    for attr in revealed_attrs.iter() {
        if !claim.encoded_attrs.contains_key(attr) {
            return Err(AnoncredsError::InvalidStructure(format!(
                "Revealed attribute '{}' not found in the claim",
                attr
            )));
        }
    }
    let unrevealed_attrs: BTreeSet<String> = claim
        .encoded_attrs
        .keys()
        .filter(|attr| !revealed_attrs.contains(attr.as_str()))
        .cloned()
        .collect();

    let m_tilde = get_mtilde(&unrevealed_attrs)?;

    let ra = bn_rand(LARGE_VPRIME)?;
    let e_tilde = bn_rand(LARGE_ETILDE)?;
    let v_tilde = bn_rand(LARGE_VTILDE)?;

    let a_prime = pk.s.mod_exp(&ra, &pk.n)?.mod_mul(&claim.a, &pk.n)?;

    let e_prime = claim.e.sub(&LARGE_E_START_VALUE)?;

    // plain signed arithmetic; v - e*ra stays unreduced
    let v_prime = claim.v.sub(&claim.e.mul(&ra)?)?;

    let t = calc_teq(
        pk,
        &a_prime,
        &e_tilde,
        &v_tilde,
        &m_tilde,
        m1_tilde,
        &m2_tilde,
        &unrevealed_attrs,
    )?;

    let primary_equal_init_proof = PrimaryEqualInitProof {
        a_prime,
        t,
        e_tilde,
        e_prime,
        v_tilde,
        v_prime,
        m_tilde,
        m1_tilde: m1_tilde.clone(),
        m2_tilde,
        m2: claim.m2.clone(),
        unrevealed_attrs,
        revealed_attrs,
        encoded_attrs: claim.encoded_attrs.clone(),
    };

    trace!(
        "Prover::init_eq_proof: <<< primary_equal_init_proof: {:?}",
        secret!(&primary_equal_init_proof)
    );

    Ok(primary_equal_init_proof)
}

fn finalize_eq_proof(
    ms: &BigNumber,
    c_h: &BigNumber,
    init_proof: PrimaryEqualInitProof,
) -> AnoncredsResult<PrimaryEqualProof> {
    trace!(
        "Prover::finalize_eq_proof: >>> ms: {:?}, c_h: {:?}, init_proof: {:?}",
        secret!(ms),
        c_h,
        secret!(&init_proof)
    );

    let e = c_h.mul(&init_proof.e_prime)?.add(&init_proof.e_tilde)?;
    let v = c_h.mul(&init_proof.v_prime)?.add(&init_proof.v_tilde)?;

    let mut m = BTreeMap::new();
    for k in init_proof.unrevealed_attrs.iter() {
        let cur_mtilde = init_proof.m_tilde.get(k).ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!(
                "Value by key '{}' not found in init_proof.m_tilde",
                k
            ))
        })?;
        let cur_val = init_proof.encoded_attrs.get(k).ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!(
                "Value by key '{}' not found in init_proof.encoded_attrs",
                k
            ))
        })?;

        m.insert(k.clone(), c_h.mul(cur_val)?.add(cur_mtilde)?);
    }

    let m1 = c_h.mul(ms)?.add(&init_proof.m1_tilde)?;
    let m2 = c_h.mul(&init_proof.m2)?.add(&init_proof.m2_tilde)?;

    let mut revealed_attrs_with_values = BTreeMap::new();
    for attr in init_proof.revealed_attrs.iter() {
        let value = init_proof.encoded_attrs.get(attr).ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!(
                "Value by key '{}' not found in init_proof.encoded_attrs",
                attr
            ))
        })?;
        revealed_attrs_with_values.insert(attr.clone(), value.clone());
    }

    let primary_equal_proof = PrimaryEqualProof {
        revealed_attrs: revealed_attrs_with_values,
        a_prime: init_proof.a_prime,
        e,
        v,
        m,
        m1,
        m2,
    };

    trace!(
        "Prover::finalize_eq_proof: <<< primary_equal_proof: {:?}",
        primary_equal_proof
    );

    Ok(primary_equal_proof)
}

fn init_ge_proof(
    pk: &IssuerPublicKey,
    eq_proof: &PrimaryEqualInitProof,
    claim: &PrimaryClaim,
    predicate: &Predicate,
) -> AnoncredsResult<PrimaryPredicateGEInitProof> {
    trace!(
        "Prover::init_ge_proof: >>> pk: {:?}, eq_proof: {:?}, claim: {:?}, predicate: {:?}",
        pk,
        secret!(eq_proof),
        secret!(claim),
        predicate
    );

    let (k, value) = (&predicate.attr_name, predicate.value);

    let attr_value = claim
        .encoded_attrs
        .get(k.as_str())
        .ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!(
                "Value by key '{}' not found in claim.encoded_attrs",
                k
            ))
        })?
        .to_dec()?
        .parse::<i32>()
        .map_err(|_| {
            AnoncredsError::InvalidStructure(format!("Value by key '{}' has invalid format", k))
        })?;

    let delta = attr_value - value;

    if delta < 0 {
        return Err(AnoncredsError::PredicateNotSatisfied(format!(
            "{}: {} < {}",
            k, attr_value, value
        )));
    }

    let u = four_squares(delta)?;

    let r = bn_rand_array(LARGE_VPRIME)?;
    let t = [
        get_pedersen_commitment(&pk.z, &u[0], &pk.s, &r[0], &pk.n)?,
        get_pedersen_commitment(&pk.z, &u[1], &pk.s, &r[1], &pk.n)?,
        get_pedersen_commitment(&pk.z, &u[2], &pk.s, &r[2], &pk.n)?,
        get_pedersen_commitment(&pk.z, &u[3], &pk.s, &r[3], &pk.n)?,
    ];

    let r_delta = bn_rand(LARGE_VPRIME)?;
    let t_delta = get_pedersen_commitment(
        &pk.z,
        &BigNumber::from_u32(delta as usize)?,
        &pk.s,
        &r_delta,
        &pk.n,
    )?;

    let mut c_list: Vec<BigNumber> = t.to_vec();
    c_list.push(t_delta.clone());

    let u_tilde = bn_rand_array(LARGE_UTILDE)?;
    let r_tilde = bn_rand_array(LARGE_RTILDE)?;
    let r_delta_tilde = bn_rand(LARGE_RTILDE)?;
    let alpha_tilde = bn_rand(LARGE_ALPHATILDE)?;

    let mj = eq_proof.m_tilde.get(k.as_str()).ok_or_else(|| {
        AnoncredsError::InvalidStructure(format!(
            "Value by key '{}' not found in eq_proof.m_tilde; predicate attributes must stay unrevealed",
            k
        ))
    })?;

    let tau_list = calc_tge(pk, &u_tilde, &r_tilde, &r_delta_tilde, mj, &alpha_tilde, &t)?;

    let primary_predicate_ge_init_proof = PrimaryPredicateGEInitProof {
        c_list,
        tau_list,
        u,
        u_tilde,
        r,
        r_tilde,
        r_delta,
        r_delta_tilde,
        alpha_tilde,
        t,
        t_delta,
        predicate: predicate.clone(),
    };

    trace!(
        "Prover::init_ge_proof: <<< primary_predicate_ge_init_proof: {:?}",
        secret!(&primary_predicate_ge_init_proof)
    );

    Ok(primary_predicate_ge_init_proof)
}

fn finalize_ge_proof(
    c_h: &BigNumber,
    init_proof: PrimaryPredicateGEInitProof,
    eq_proof: &PrimaryEqualProof,
) -> AnoncredsResult<PrimaryPredicateGEProof> {
    trace!(
        "Prover::finalize_ge_proof: >>> c_h: {:?}, init_proof: {:?}, eq_proof: {:?}",
        c_h,
        secret!(&init_proof),
        eq_proof
    );

    let PrimaryPredicateGEInitProof {
        u: u_orig,
        u_tilde,
        r: r_orig,
        r_tilde,
        r_delta: r_delta_orig,
        r_delta_tilde,
        alpha_tilde,
        t,
        t_delta,
        predicate,
        ..
    } = init_proof;

    let mut u: Vec<BigNumber> = Vec::with_capacity(ITERATION);
    let mut r: Vec<BigNumber> = Vec::with_capacity(ITERATION);
    let mut urproduct = BigNumber::new()?;

    for i in 0..ITERATION {
        u.push(c_h.mul(&u_orig[i])?.add(&u_tilde[i])?);
        r.push(c_h.mul(&r_orig[i])?.add(&r_tilde[i])?);

        urproduct = u_orig[i].mul(&r_orig[i])?.add(&urproduct)?;
    }

    // one delta response, from the same original that urproduct used
    let r_delta = c_h.mul(&r_delta_orig)?.add(&r_delta_tilde)?;

    let alpha = r_delta_orig
        .sub(&urproduct)?
        .mul(c_h)?
        .add(&alpha_tilde)?;

    let mj = eq_proof.m.get(&predicate.attr_name).ok_or_else(|| {
        AnoncredsError::InvalidStructure(format!(
            "Value by key '{}' not found in eq_proof.m",
            predicate.attr_name
        ))
    })?;

    let primary_predicate_ge_proof = PrimaryPredicateGEProof {
        u: into_responses(u)?,
        r: into_responses(r)?,
        r_delta,
        mj: mj.clone(),
        alpha,
        t,
        t_delta,
        predicate,
    };

    trace!(
        "Prover::finalize_ge_proof: <<< primary_predicate_ge_proof: {:?}",
        primary_predicate_ge_proof
    );

    Ok(primary_predicate_ge_proof)
}

fn into_responses(vec: Vec<BigNumber>) -> AnoncredsResult<[BigNumber; ITERATION]> {
    vec.try_into().map_err(|_| {
        AnoncredsError::InvalidState("Expected one response per square slot".to_string())
    })
}
