//! Hashing, hash-to-curve and epoch utilities.

use crate::FIELD_BYTES;

use ark_bn254::{Config, Fq, Fq2, Fq6Config, Fq12Config, Fr, G1Affine, G2Affine};
use ark_ec::bn::BnConfig;
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::{BigInteger, Field, Fp12Config, Fp6Config, One, PrimeField};
use digest::Digest;
use sha2::Sha256;

/// Protocol hash output, as wide as a field element.
pub type HashOutput = [u8; FIELD_BYTES];

// Generic hash wrapper.
pub(crate) fn hash<H: Digest>(data: &[u8]) -> digest::Output<H> {
    H::new().chain_update(data).finalize()
}

/// Domain-separated protocol hash: absorb `tag` as four big-endian octets
/// (skipped when zero), then `data`.
pub fn hash_tagged(tag: u32, data: &[u8]) -> HashOutput {
    let mut h = Sha256::new();
    if tag != 0 {
        h.update(tag.to_be_bytes());
    }
    h.update(data);
    h.finalize().into()
}

/// Hash an identity to the derived form used throughout the protocol.
pub fn hash_id(id: &[u8]) -> HashOutput {
    hash_tagged(0, id)
}

/// Map a field element to a G1 point with the requested y parity, walking
/// the x coordinate upward until the curve equation has a root.
pub(crate) fn map_to_point(u: &Fq, odd: bool) -> G1Affine {
    let mut x = *u;
    loop {
        if let Some((y0, y1)) = G1Affine::get_ys_from_x_unchecked(x) {
            let y = if y0.into_bigint().is_odd() == odd { y0 } else { y1 };
            return G1Affine::new_unchecked(x, y);
        }
        x += Fq::one();
    }
}

/// Deterministic map from a hash to a point of G1 (try-and-increment).
pub fn hash_to_curve(h: &[u8]) -> G1Affine {
    let x = Fq::from_be_bytes_mod_order(h);
    map_to_point(&x, false)
}

// Untwist-Frobenius endomorphism of the twist:
// (x, y) -> (xi^((p-1)/3) * x^p, xi^((p-1)/2) * y^p).
fn psi(p: &G2Affine) -> G2Affine {
    let cx = <Fq6Config as Fp6Config>::FROBENIUS_COEFF_FP6_C1[1];
    let c6 = <Fq12Config as Fp12Config>::FROBENIUS_COEFF_FP12_C1[1];
    let cy = c6.square() * c6;
    G2Affine::new_unchecked(cx * p.x.frobenius_map(1), cy * p.y.frobenius_map(1))
}

/// Deterministic map from a hash to a point of G2.
///
/// The try-and-increment seed point lands anywhere on the twist; the
/// cofactor is then cleared with the Fuentes-Castaneda, Knapp and
/// Rodriguez-Henriquez combination `psi^3(Q) + [u]Q + psi([3u]Q) +
/// psi^2([u]Q)`, u being the BN parameter.
pub fn hash_to_curve_g2(h: &[u8]) -> G2Affine {
    let mut x = Fq::from_be_bytes_mod_order(h);
    let q = loop {
        let xx = Fq2::new(Fq::one(), x);
        if let Some((y, _)) = G2Affine::get_ys_from_x_unchecked(xx) {
            break G2Affine::new_unchecked(xx, y);
        }
        x += Fq::one();
    };

    let t = q.mul_bigint(Config::X).into_affine();
    let k = (t.into_group().double() + t).into_affine();
    let q3 = psi(&psi(&psi(&q)));
    (q3.into_group() + t + psi(&k) + psi(&psi(&t))).into_affine()
}

/// Fiat-Shamir challenge: `H(time_value | m)` reduced modulo the group
/// order. `m` is the commitment octets, possibly followed by an
/// application message.
pub fn challenge(time_value: u32, m: &[u8]) -> Fr {
    let h = hash_tagged(time_value, m);
    Fr::from_be_bytes_mod_order(&h)
}

#[cfg(feature = "std")]
fn unix_time() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Current epoch in day slots; a date of 0 disables time permits.
#[cfg(feature = "std")]
pub fn today() -> u32 {
    (unix_time() / 86_400) as u32
}

/// Current epoch in seconds, used to bind the challenge to the exchange.
#[cfg(feature = "std")]
pub fn now() -> u32 {
    unix_time() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_to_curve_works() {
        let p = hash_to_curve(&hash_id(b"testuser@miracl.com"));
        assert!(p.is_on_curve());
        assert!(!p.is_zero());
    }

    #[test]
    fn hash_to_curve_increments_on_bad_x() {
        // Distinct inputs keep landing on valid points.
        for i in 0..16u32 {
            let p = hash_to_curve(&hash_tagged(i + 1, b"probe"));
            assert!(p.is_on_curve());
        }
    }

    #[test]
    fn untwist_frobenius_is_multiplication_by_p() {
        let q = G2Affine::generator();
        let p_mod_r = Fr::from_be_bytes_mod_order(&Fq::MODULUS.to_bytes_be());
        assert_eq!(psi(&q), (q * p_mod_r).into_affine());
    }

    #[test]
    fn hash_to_curve_g2_lands_in_subgroup() {
        let q = hash_to_curve_g2(&hash_tagged(1234, &hash_id(b"testuser@miracl.com")));
        assert!(q.is_on_curve());
        assert!(q.is_in_correct_subgroup_assuming_on_curve());
    }

    #[test]
    fn challenge_is_deterministic() {
        let y = challenge(99, b"commitment octets");
        assert_eq!(y, challenge(99, b"commitment octets"));
        assert_ne!(y, challenge(98, b"commitment octets"));
    }
}
