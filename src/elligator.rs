//! Elligator-Squared point encoding.
//!
//! Encodes a G1 point as a sign byte followed by two field elements which
//! are statistically indistinguishable from uniform octets (Tibouchi,
//! <https://eprint.iacr.org/2014/043>). Useful whenever a protocol point
//! must not be recognizable as such on the wire.

use crate::utils::map_to_point;
use crate::{codec, Error, Result, FIELD_BYTES, G1_BYTES};

use ark_bn254::{Fq, G1Affine};
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{BigInteger, One, PrimeField};
use ark_std::rand::RngCore;
use ark_std::UniformRand;

fn parity(y: &Fq) -> u8 {
    y.into_bigint().is_odd() as u8
}

fn rand_byte<R: RngCore>(rng: &mut R) -> u8 {
    let mut b = [0u8; 1];
    rng.fill_bytes(&mut b);
    b[0]
}

// Walk down from `x` to the next x coordinate on the curve, returning it
// together with the distance walked. Any x strictly in between has no
// curve point, so the preimage of the upward walk is the whole interval.
fn unmap(x: &Fq) -> (Fq, u32) {
    let mut u = *x;
    let mut r = 0u32;
    loop {
        u -= Fq::one();
        r += 1;
        if G1Affine::get_ys_from_x_unchecked(u).is_some() {
            return (u, r);
        }
    }
}

/// Encode `p` as `sign | u | v`, with `(u, v)` uniform-looking field
/// elements. Bits 0 and 1 of the sign byte carry the two y parities; the
/// remaining bits are always zero.
pub fn encode<R: RngCore>(p: &G1Affine, rng: &mut R) -> Result<[u8; G1_BYTES]> {
    if p.is_zero() {
        return Err(Error::InvalidPoint);
    }
    loop {
        let u = Fq::rand(rng);
        let su = rand_byte(rng) % 2;
        let w = map_to_point(&u, su == 1);
        let d = (p.into_group() - w).into_affine();
        if d.is_zero() {
            // The random point cancelled the input; draw again.
            continue;
        }
        let sv = parity(&d.y);
        let (base, r) = unmap(&d.x);
        let m = u32::from(rand_byte(rng)) % r;
        let v = base + Fq::from(m + 1);

        let mut out = [0u8; G1_BYTES];
        out[0] = su | (sv << 1);
        out[1..1 + FIELD_BYTES].copy_from_slice(&codec::fq_bytes(&u));
        out[1 + FIELD_BYTES..].copy_from_slice(&codec::fq_bytes(&v));
        return Ok(out);
    }
}

/// Decode an Elligator-Squared pair back to the curve point.
pub fn decode(d: &[u8]) -> Result<G1Affine> {
    if d.len() != G1_BYTES || d[0] & 0x04 != 0 {
        return Err(Error::InvalidPoint);
    }
    let su = d[0] & 1 == 1;
    let sv = (d[0] >> 1) & 1 == 1;
    let u = Fq::from_be_bytes_mod_order(&d[1..1 + FIELD_BYTES]);
    let v = Fq::from_be_bytes_mod_order(&d[1 + FIELD_BYTES..]);
    let p = (map_to_point(&u, su).into_group() + map_to_point(&v, sv)).into_affine();
    if p.is_zero() {
        return Err(Error::InvalidPoint);
    }
    Ok(p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::G1Projective;

    #[test]
    fn round_trip() {
        let mut rng = ark_std::test_rng();
        for _ in 0..20 {
            let p = G1Projective::rand(&mut rng).into_affine();
            let e = encode(&p, &mut rng).unwrap();
            assert_eq!(e[0] & !0x03, 0);
            assert_eq!(decode(&e).unwrap(), p);
        }
    }

    #[test]
    fn decode_rejects_flagged_sign_byte() {
        let mut rng = ark_std::test_rng();
        let p = G1Projective::rand(&mut rng).into_affine();
        let mut e = encode(&p, &mut rng).unwrap();
        e[0] |= 0x04;
        assert_eq!(decode(&e), Err(Error::InvalidPoint));
    }

    #[test]
    fn encode_rejects_infinity() {
        let mut rng = ark_std::test_rng();
        assert_eq!(
            encode(&G1Affine::zero(), &mut rng),
            Err(Error::InvalidPoint)
        );
    }
}
