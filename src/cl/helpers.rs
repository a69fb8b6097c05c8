//! Shared arithmetic of the proof protocol: randomness sampling (with a
//! deterministic test mock), attribute encoding and the commitment
//! formulas used by both the prover's init phase and a verifier's dual
//! reconstruction.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(test)]
use std::cell::RefCell;

use crate::bn::BigNumber;
use crate::cl::constants::*;
use crate::cl::IssuerPublicKey;
use crate::errors::prelude::*;

#[cfg(test)]
thread_local! {
    pub static USE_MOCKS: RefCell<bool> = RefCell::new(false);
}

#[cfg(test)]
pub struct MockHelper {}

#[cfg(test)]
impl MockHelper {
    pub fn inject() {
        USE_MOCKS.with(|use_mocks| {
            *use_mocks.borrow_mut() = true;
        });
    }

    pub fn is_injected() -> bool {
        USE_MOCKS.with(|use_mocks| *use_mocks.borrow())
    }
}

/// Samples `size` bits of blinding randomness. Under test, after
/// `MockHelper::inject()`, returns a fixed constant per bit length so
/// every protocol intermediate is reproducible.
#[cfg(test)]
pub fn bn_rand(size: usize) -> AnoncredsResult<BigNumber> {
    if MockHelper::is_injected() {
        return match size {
            LARGE_NONCE => BigNumber::from_dec("944657847135642424029998"),
            LARGE_MASTER_SECRET => BigNumber::from_dec("79243521798345742290520025639397240976084396727321438811819405827788078479592"),
            LARGE_ETILDE => BigNumber::from_dec("179302698200574013711857803574333221633826318157383815626978408289834413495175709697128270161295326963238431156128271564940203829380408618"),
            LARGE_UTILDE => BigNumber::from_dec("11103066670184120524120265430057118711154606069961761860746389893841510033708980908852533841376666676375487098504086158028414423918211363554324463511291159404062731634433494885105"),
            LARGE_RTILDE => BigNumber::from_dec("12461741929473940067106381952580593255088879694365576692274812833796954322172041983263310310752613213448927752762711142420972706305336545948543213639572255910874434199893271049479094888893491668926037169"),
            LARGE_VPRIME => BigNumber::from_dec("33619929810043234849412756459004547804371490171561220434526138375531979000147485674880071833097917876651754667952997623776273305010366296409919043434135046596175056397725713412028222488310341255595613394893206070884122173369252839601178242242018746852277362272513709424376440080158275894237847591464821178379746342367251440866227417468056975818104302043939026368772539591187850523947753714418557501511442488316253557566480627447307391671107361508093466402146253298838079418709834499199409162712618439775304323084695242318792986811300829207165775111605591075880230178471840140211329444556016729965758250180758484380612826053673905841183122643"),
            LARGE_ALPHATILDE => BigNumber::from_dec("72269137152131502137129371621904874085727123862406265184270423488553057004684068614362366784946730812528513957745056601704678524225580162377173649844321760371578359692021601589177625185426070882257637007993171437620338679344095181062162625597789029832231342860686934698977309863810157012463364915737507129726462494037843148808375771876929312484225748071882377472797137117781294202598225419879973605144881572323204774551461713089049396466858385549878143312117379086521791661499876477877814757202001034991154781934600787104003980668217817573256988302832193097996497741405743624778630315628567170649816029808813418904554114104604051000909740313876041894593901154184434137670066213329152578473109791993847036875127456524709054198618916184915273995103768008717423154086405269738544582609500451093816991206954803085412511263576817946573780581370"),
            LARGE_VTILDE => BigNumber::from_dec("1091404876909276726310782112328792337921367717618697189252108817427177897684542199670623241903870061544301324220600035130087556922820729734318293163023448853621668934564194672531393809950744292330923355900003768103185370409551952573815721560798012113004301795116246798550600409285579352518950230903095571838165559396864268588741729025552519140529960314650187201943052459983384764201558056407668513261587161648908526614554969981013406604553680149364816005666117825511616867509958424206399224261127353816632648796291161804251712127356227141888696431443272343026729701179580158505883109321313637989173560262923705450603506412747433825924148578666854658738109809490593435382623162089583989337953238542665207344347331145783634452961617441894189510860520266872342118361381539227555844704237258241763902985129619645476184482975857511559424036641532407013830834709000528117012890143431811112519969145321134439893264739178126947929"),
            _ => {
                panic!("Uncovered case: {}", size);
            }
        };
    }
    _bn_rand(size)
}

#[cfg(not(test))]
pub fn bn_rand(size: usize) -> AnoncredsResult<BigNumber> {
    _bn_rand(size)
}

fn _bn_rand(size: usize) -> AnoncredsResult<BigNumber> {
    trace!("Helpers::bn_rand: >>> size: {:?}", size);

    let res = BigNumber::rand(size)?;

    trace!("Helpers::bn_rand: <<< res: {:?}", secret!(&res));

    Ok(res)
}

/// Four samples of the same bit length, for the per-square slots of a GE
/// sub-proof.
pub fn bn_rand_array(size: usize) -> AnoncredsResult<[BigNumber; ITERATION]> {
    Ok([
        bn_rand(size)?,
        bn_rand(size)?,
        bn_rand(size)?,
        bn_rand(size)?,
    ])
}

/// Maps an attribute string to the integer the claim is signed over:
/// SHA-256 of the UTF-8 bytes, read as a big-endian integer.
pub fn encode_attribute(attribute: &str) -> AnoncredsResult<BigNumber> {
    trace!("Helpers::encode_attribute: >>> attribute: {:?}", attribute);

    let encoded_attribute = BigNumber::from_bytes(&BigNumber::hash(attribute.as_bytes())?)?;

    trace!(
        "Helpers::encode_attribute: <<< encoded_attribute: {:?}",
        encoded_attribute
    );

    Ok(encoded_attribute)
}

/// Fresh `m_tilde` blinding value per unrevealed attribute.
pub fn get_mtilde(
    unrevealed_attrs: &BTreeSet<String>,
) -> AnoncredsResult<BTreeMap<String, BigNumber>> {
    trace!(
        "Helpers::get_mtilde: >>> unrevealed_attrs: {:?}",
        unrevealed_attrs
    );

    let mut mtilde: BTreeMap<String, BigNumber> = BTreeMap::new();

    for attr in unrevealed_attrs.iter() {
        mtilde.insert(attr.clone(), bn_rand(LARGE_MVECT)?);
    }

    trace!("Helpers::get_mtilde: <<< mtilde: {:?}", secret!(&mtilde));

    Ok(mtilde)
}

/// Equality-proof commitment formula
/// `a_prime^e * prod(r_k^m_tilde_k) * s^v * rms^m1 * rctxt^m2 mod n`
/// over the unrevealed attributes.
///
/// The prover calls it with tilde values to build `t`; a verifier calls it
/// with response values when reconstructing `t_hat`.
pub fn calc_teq(
    pk: &IssuerPublicKey,
    a_prime: &BigNumber,
    e: &BigNumber,
    v: &BigNumber,
    m_tilde: &BTreeMap<String, BigNumber>,
    m1: &BigNumber,
    m2: &BigNumber,
    unrevealed_attrs: &BTreeSet<String>,
) -> AnoncredsResult<BigNumber> {
    trace!(
        "Helpers::calc_teq: >>> pk: {:?}, a_prime: {:?}, e: {:?}, v: {:?}, m_tilde: {:?}, m1: {:?}, m2: {:?}, unrevealed_attrs: {:?}",
        pk,
        a_prime,
        secret!(e),
        secret!(v),
        secret!(m_tilde),
        secret!(m1),
        secret!(m2),
        unrevealed_attrs
    );

    let mut result: BigNumber = a_prime.mod_exp(e, &pk.n)?;

    for k in unrevealed_attrs.iter() {
        let cur_r = pk.r.get(k).ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!("Value by key '{}' not found in pk.r", k))
        })?;
        let cur_m = m_tilde.get(k).ok_or_else(|| {
            AnoncredsError::InvalidStructure(format!("Value by key '{}' not found in m_tilde", k))
        })?;

        result = cur_r.mod_exp(cur_m, &pk.n)?.mod_mul(&result, &pk.n)?;
    }

    result = pk.s.mod_exp(v, &pk.n)?.mod_mul(&result, &pk.n)?;
    result = pk.rms.mod_exp(m1, &pk.n)?.mod_mul(&result, &pk.n)?;
    result = pk.rctxt.mod_exp(m2, &pk.n)?.mod_mul(&result, &pk.n)?;

    trace!("Helpers::calc_teq: <<< t: {:?}", result);

    Ok(result)
}

/// GE-proof commitment formulas, in tau-list order: one
/// `z^u[i] * s^r[i] mod n` per square, then the delta slot
/// `z^mj * s^r_delta mod n`, then `s^alpha * prod(t[i]^u[i]) mod n`.
///
/// As with `calc_teq`, the prover passes tilde values and a verifier
/// passes response values.
pub fn calc_tge(
    pk: &IssuerPublicKey,
    u: &[BigNumber; ITERATION],
    r: &[BigNumber; ITERATION],
    r_delta: &BigNumber,
    mj: &BigNumber,
    alpha: &BigNumber,
    t: &[BigNumber; ITERATION],
) -> AnoncredsResult<Vec<BigNumber>> {
    trace!(
        "Helpers::calc_tge: >>> pk: {:?}, u: {:?}, r: {:?}, r_delta: {:?}, mj: {:?}, alpha: {:?}, t: {:?}",
        pk,
        secret!(u),
        secret!(r),
        secret!(r_delta),
        secret!(mj),
        secret!(alpha),
        t
    );

    let mut tau_list: Vec<BigNumber> = Vec::new();

    for i in 0..ITERATION {
        let t_tau = pk
            .z
            .mod_exp(&u[i], &pk.n)?
            .mod_mul(&pk.s.mod_exp(&r[i], &pk.n)?, &pk.n)?;

        tau_list.push(t_tau);
    }

    let t_tau = pk
        .z
        .mod_exp(mj, &pk.n)?
        .mod_mul(&pk.s.mod_exp(r_delta, &pk.n)?, &pk.n)?;

    tau_list.push(t_tau);

    let mut q: BigNumber = BigNumber::from_u32(1)?;

    for i in 0..ITERATION {
        q = t[i].mod_exp(&u[i], &pk.n)?.mul(&q)?;
    }

    q = pk.s.mod_exp(alpha, &pk.n)?.mod_mul(&q, &pk.n)?;

    tau_list.push(q);

    trace!("Helpers::calc_tge: <<< tau_list: {:?}", tau_list);

    Ok(tau_list)
}

fn largest_square_less_than(delta: usize) -> usize {
    (delta as f64).sqrt().floor() as usize
}

/// Expresses the natural number `delta` as a sum of four integer squares,
/// `delta = u[0]^2 + u[1]^2 + u[2]^2 + u[3]^2`, per Lagrange's
/// four-square theorem. Descending exhaustive search, largest square
/// first.
pub fn four_squares(delta: i32) -> AnoncredsResult<[BigNumber; ITERATION]> {
    trace!("Helpers::four_squares: >>> delta: {:?}", delta);

    if delta < 0 {
        return Err(AnoncredsError::InvalidStructure(format!(
            "Cannot express a negative number as sum of four squares: {}",
            delta
        )));
    }

    let d = delta as usize;
    let mut roots: [usize; 4] = [largest_square_less_than(d), 0, 0, 0];

    'outer: for i in (1..=roots[0]).rev() {
        roots[0] = i;
        if d == roots[0].pow(2) {
            roots[1] = 0;
            roots[2] = 0;
            roots[3] = 0;
            break 'outer;
        }
        roots[1] = largest_square_less_than(d - roots[0].pow(2));
        for j in (1..=roots[1]).rev() {
            roots[1] = j;
            if d == roots[0].pow(2) + roots[1].pow(2) {
                roots[2] = 0;
                roots[3] = 0;
                break 'outer;
            }
            roots[2] = largest_square_less_than(d - roots[0].pow(2) - roots[1].pow(2));
            for k in (1..=roots[2]).rev() {
                roots[2] = k;
                if d == roots[0].pow(2) + roots[1].pow(2) + roots[2].pow(2) {
                    roots[3] = 0;
                    break 'outer;
                }
                roots[3] = largest_square_less_than(
                    d - roots[0].pow(2) - roots[1].pow(2) - roots[2].pow(2),
                );
                if d == roots[0].pow(2) + roots[1].pow(2) + roots[2].pow(2) + roots[3].pow(2) {
                    break 'outer;
                }
            }
        }
    }

    let res = [
        BigNumber::from_u32(roots[0])?,
        BigNumber::from_u32(roots[1])?,
        BigNumber::from_u32(roots[2])?,
        BigNumber::from_u32(roots[3])?,
    ];

    trace!("Helpers::four_squares: <<< res: {:?}", res);

    Ok(res)
}
