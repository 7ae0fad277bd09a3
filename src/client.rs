//! Client side of the authentication exchange.
//!
//! Pass one reconstructs the full client secret from token + PIN (+ time
//! permit) and commits to a fresh nonce; pass two folds the server (or
//! Fiat-Shamir) challenge into the authenticator.

use crate::token::{pin_mul, TimePermit, Token};
use crate::utils::{challenge, hash_id, hash_tagged, hash_to_curve};
use crate::{codec, Error, Result};

use ark_bn254::{Fr, G1Affine, G1Projective};
use ark_ec::{AffineRepr, CurveGroup};
use ark_std::rand::RngCore;
use ark_std::vec::Vec;
use ark_std::UniformRand;

/// Client state after the first pass.
#[derive(Debug)]
pub struct ClientSession {
    x: Fr,
    /// Commitment U = x*A over the hashed identity point A.
    pub commitment: G1Affine,
    /// Time-bound commitment UT = x*(A + A_date); present when a date was
    /// supplied.
    pub timed_commitment: Option<G1Affine>,
    secret: G1Projective,
}

/// First pass with a caller-supplied nonce; a pure function of its inputs.
pub fn pass_one_with_nonce(
    date: u32,
    id: &[u8],
    x: Fr,
    pin: u32,
    token: &Token,
    permit: Option<&TimePermit>,
) -> Result<ClientSession> {
    let idh = hash_id(id);
    let a = hash_to_curve(&idh);

    if token.0.is_zero() {
        return Err(Error::InvalidPoint);
    }
    // T = token + pin*A, the full client secret when the PIN is right.
    let mut secret = token.0.into_group() + pin_mul(&a, pin);

    let commitment = (a * x).into_affine();
    let timed_commitment = if date != 0 {
        let permit = permit.ok_or(Error::BadParams)?;
        secret += permit.0;
        let ad = hash_to_curve(&hash_tagged(date, &idh));
        Some((commitment.into_group() + ad * x).into_affine())
    } else {
        None
    };

    Ok(ClientSession {
        x,
        commitment,
        timed_commitment,
        secret,
    })
}

/// First pass, drawing the nonce from `rng`.
pub fn pass_one<R: RngCore>(
    date: u32,
    id: &[u8],
    rng: &mut R,
    pin: u32,
    token: &Token,
    permit: Option<&TimePermit>,
) -> Result<ClientSession> {
    pass_one_with_nonce(date, id, Fr::rand(rng), pin, token, permit)
}

impl ClientSession {
    /// The ephemeral nonce; needed again for full-mode key derivation.
    pub fn nonce(&self) -> Fr {
        self.x
    }

    /// The commitment the server verifies against: UT when dated, U
    /// otherwise.
    pub fn message_point(&self) -> &G1Affine {
        self.timed_commitment.as_ref().unwrap_or(&self.commitment)
    }

    /// Second pass: the authenticator SEC = -(x+y)*T.
    pub fn finish(self, y: Fr) -> G1Affine {
        (self.secret * -(self.x + y)).into_affine()
    }
}

/// Outcome of a one-pass client run.
pub struct Authentication {
    /// The ephemeral nonce.
    pub x: Fr,
    /// The challenge derived from the commitment and the exchange time.
    pub y: Fr,
    /// Commitment U.
    pub commitment: G1Affine,
    /// Time-bound commitment UT, when a date was supplied.
    pub timed_commitment: Option<G1Affine>,
    /// The authenticator sent to the server.
    pub authenticator: G1Affine,
}

/// One-pass client: first pass, challenge derivation, second pass.
///
/// The challenge covers the commitment the server will verify against,
/// the optional application message and the caller-supplied time value.
pub fn authenticate<R: RngCore>(
    date: u32,
    id: &[u8],
    rng: &mut R,
    pin: u32,
    token: &Token,
    permit: Option<&TimePermit>,
    message: Option<&[u8]>,
    time_value: u32,
) -> Result<Authentication> {
    let session = pass_one(date, id, rng, pin, token, permit)?;

    let mut m = Vec::with_capacity(crate::G1_BYTES + message.map_or(0, |m| m.len()));
    m.extend_from_slice(&codec::encode_g1(session.message_point()));
    if let Some(msg) = message {
        m.extend_from_slice(msg);
    }
    let y = challenge(time_value, &m);

    let x = session.x;
    let commitment = session.commitment;
    let timed_commitment = session.timed_commitment;
    let authenticator = session.finish(y);
    Ok(Authentication {
        x,
        y,
        commitment,
        timed_commitment,
        authenticator,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::MasterSecret;

    const ID: &[u8] = b"testuser@miracl.com";
    const PIN: u32 = 1234;

    fn issue() -> Token {
        let mut rng = ark_std::test_rng();
        let ms = MasterSecret::random(&mut rng);
        let idh = hash_id(ID);
        ms.client_secret(&idh).extract_pin(&idh, PIN)
    }

    #[test]
    fn pass_one_is_pure_with_fixed_nonce() {
        let token = issue();
        let x = Fr::from(123_456_789u64);
        let s1 = pass_one_with_nonce(0, ID, x, PIN, &token, None).unwrap();
        let s2 = pass_one_with_nonce(0, ID, x, PIN, &token, None).unwrap();
        assert_eq!(s1.commitment, s2.commitment);
        let y = Fr::from(42u64);
        assert_eq!(s1.finish(y), s2.finish(y));
    }

    #[test]
    fn dated_pass_requires_permit() {
        let token = issue();
        let x = Fr::from(7u64);
        assert_eq!(
            pass_one_with_nonce(20_000, ID, x, PIN, &token, None).unwrap_err(),
            Error::BadParams
        );
    }

    #[test]
    fn timed_commitment_extends_plain_commitment() {
        let mut rng = ark_std::test_rng();
        let ms = MasterSecret::random(&mut rng);
        let idh = hash_id(ID);
        let token = ms.client_secret(&idh).extract_pin(&idh, PIN);
        let permit = ms.time_permit(20_000, &idh);

        let x = Fr::from(31_337u64);
        let s = pass_one_with_nonce(20_000, ID, x, PIN, &token, Some(&permit)).unwrap();
        let ad = hash_to_curve(&hash_tagged(20_000, &idh));
        let expected = (s.commitment.into_group() + ad * x).into_affine();
        assert_eq!(s.timed_commitment, Some(expected));
    }
}
