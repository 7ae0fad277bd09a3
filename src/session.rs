//! M-Pin Full: authenticated session-key derivation.
//!
//! After a successful exchange both sides exchange one fresh G1 multiple
//! each and derive the same 16-byte key. The client works from two
//! pairing values that depend only on its token and identity, so they are
//! computed once and cached; the server pairs the client's fresh multiple
//! against its G2 secret. Both sides hash the XTR trace of the shared
//! target group element together with the shared point.

use crate::token::{ServerSecret, Token};
use crate::utils::{hash, hash_to_curve};
use crate::{codec, Error, Result, KEY_BYTES, MAX_PIN};

use ark_bn254::{Bn254, Fq2, Fq12, Fr, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::{CyclotomicMultSubgroup, Field, PrimeField};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;
use sha2::Sha256;

/// Pairing values that depend only on the token and identity; computed
/// once and stored alongside the token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precomputed {
    g1: Fq12,
    g2: Fq12,
}

/// g1 = e(T, Q) and g2 = e(A, Q) for the stored token and the hashed
/// identity point.
pub fn precompute(token: &Token, id_hash: &[u8]) -> Result<Precomputed> {
    if token.0.is_zero() {
        return Err(Error::InvalidPoint);
    }
    let q = G2Affine::generator();
    let g1 = Bn254::pairing(token.0, q).0;
    let g2 = Bn254::pairing(hash_to_curve(id_hash), q).0;
    Ok(Precomputed { g1, g2 })
}

// XTR trace g + g^(p^4) + g^(p^8); only the (c0.c0, c1.c1) tower slots
// survive, and they feed the key hash in that order.
fn trace(g: &Fq12) -> (Fq2, Fq2) {
    let t = *g + g.frobenius_map(4) + g.frobenius_map(8);
    (t.c0.c0, t.c1.c1)
}

fn derive(c: (Fq2, Fq2), shared: &G1Affine) -> [u8; KEY_BYTES] {
    let mut buf = Vec::with_capacity(6 * crate::FIELD_BYTES);
    for x in [c.0.c0, c.0.c1, c.1.c0, c.1.c1, shared.x, shared.y] {
        buf.extend_from_slice(&codec::fq_bytes(&x));
    }
    let h = hash::<Sha256>(&buf);
    let mut key = [0u8; KEY_BYTES];
    key.copy_from_slice(&h[..KEY_BYTES]);
    key
}

/// Client-side session key.
///
/// `r` is the client's fresh scalar (sent to the server as Z = r*A), `x`
/// its exchange nonce and `t` the server's fresh multiple of the identity
/// point. Matches [`server_key`] on an honest exchange.
pub fn client_key(
    pre: &Precomputed,
    pin: u32,
    r: Fr,
    x: Fr,
    t: &G1Affine,
) -> Result<[u8; KEY_BYTES]> {
    let shared = (*t * x).into_affine();
    if shared.is_zero() {
        return Err(Error::InvalidPoint);
    }
    // g = g1 * g2^pin = e(s*A, Q) when the PIN is right.
    let g = pre.g1 * pre.g2.cyclotomic_exp([u64::from(pin % MAX_PIN)]);
    let gz = g.cyclotomic_exp(r.into_bigint());
    Ok(derive(trace(&gz), &shared))
}

/// Server-side session key.
///
/// `z` is the client's fresh multiple Z = r*A, `w` the server's fresh
/// scalar and `commitment` the commitment the exchange was verified
/// against (UT when dated, U otherwise).
pub fn server_key(
    z: &G1Affine,
    sst: &ServerSecret,
    w: Fr,
    commitment: &G1Affine,
) -> Result<[u8; KEY_BYTES]> {
    let shared = (*commitment * w).into_affine();
    if shared.is_zero() {
        return Err(Error::InvalidPoint);
    }
    let g = Bn254::pairing(*z, sst.0).0;
    Ok(derive(trace(&g), &shared))
}

/// Draw a fresh scalar and return it with its multiple of `p`; each side
/// sends the point and keeps the scalar for key derivation.
pub fn random_multiple<R: RngCore>(rng: &mut R, p: &G1Affine) -> (Fr, G1Affine) {
    let w = Fr::rand(rng);
    (w, (*p * w).into_affine())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MasterSecret;
    use crate::utils::hash_id;
    use crate::{client, server};

    const ID: &[u8] = b"testuser@miracl.com";
    const PIN: u32 = 1234;
    const TIME: u32 = 1_728_000_000;

    struct Exchange {
        sst: ServerSecret,
        pre: Precomputed,
        auth: client::Authentication,
    }

    fn run_exchange(rng: &mut impl ark_std::rand::RngCore) -> Exchange {
        let ms = MasterSecret::random(rng);
        let sst = ms.server_secret();
        let idh = hash_id(ID);
        let token = ms.client_secret(&idh).extract_pin(&idh, PIN);
        let pre = precompute(&token, &idh).unwrap();
        let auth = client::authenticate(0, ID, rng, PIN, &token, None, None, TIME).unwrap();
        server::authenticate(
            0,
            TIME,
            ID,
            &sst,
            None,
            Some(&auth.commitment),
            None,
            &auth.authenticator,
            false,
        )
        .unwrap();
        Exchange { sst, pre, auth }
    }

    #[test]
    fn client_and_server_agree_on_the_key() {
        let mut rng = ark_std::test_rng();
        let ex = run_exchange(&mut rng);

        let a = hash_to_curve(&hash_id(ID));
        // Client sends Z = r*A, server answers with T = w*HID.
        let (r, z) = random_multiple(&mut rng, &a);
        let points = server::identity_points(0, ID);
        let (w, t) = random_multiple(&mut rng, &points.hid);

        let ck = client_key(&ex.pre, PIN, r, ex.auth.x, &t).unwrap();
        let sk = server_key(&z, &ex.sst, w, &ex.auth.commitment).unwrap();
        assert_eq!(ck, sk);
    }

    #[test]
    fn wrong_pin_diverges_the_key() {
        let mut rng = ark_std::test_rng();
        let ex = run_exchange(&mut rng);

        let a = hash_to_curve(&hash_id(ID));
        let (r, z) = random_multiple(&mut rng, &a);
        let points = server::identity_points(0, ID);
        let (w, t) = random_multiple(&mut rng, &points.hid);

        let ck = client_key(&ex.pre, PIN + 1, r, ex.auth.x, &t).unwrap();
        let sk = server_key(&z, &ex.sst, w, &ex.auth.commitment).unwrap();
        assert_ne!(ck, sk);
    }

}
