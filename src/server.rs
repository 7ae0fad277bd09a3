//! Server side: identity points, challenge and pairing verification.
//!
//! The server never sees the client secret; it checks the pairing product
//! e(Q, SEC) * e(sQ, y*P + U) = 1, which holds exactly when the client
//! reconstructed s*P, i.e. entered the right PIN.

use crate::token::ServerSecret;
use crate::utils::{challenge, hash_id, hash_tagged, hash_to_curve};
use crate::{codec, Error, Result};

use ark_bn254::{Bn254, Fq12, Fr, G1Affine, G2Affine};
use ark_ec::pairing::Pairing;
use ark_ec::{AffineRepr, CurveGroup};
use ark_ff::One;
use ark_std::vec::Vec;
use subtle::ConstantTimeEq;

/// Hashed identity points the server verifies against.
pub struct IdPoints {
    /// H(ID) mapped to the curve.
    pub hid: G1Affine,
    /// hid + H(date | H(ID)) mapped to the curve; present when date != 0.
    pub htid: Option<G1Affine>,
}

/// First pass: rebuild the identity points for the authenticating client.
pub fn identity_points(date: u32, id: &[u8]) -> IdPoints {
    let idh = hash_id(id);
    let hid = hash_to_curve(&idh);
    let htid = (date != 0).then(|| {
        let pd = hash_to_curve(&hash_tagged(date, &idh));
        (hid.into_group() + pd).into_affine()
    });
    IdPoints { hid, htid }
}

/// Pairing values handed to the PIN-error solver after a failed check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Evidence {
    /// The failed verification ratio.
    pub e: Fq12,
    /// The reference value; e = f^(PIN offset).
    pub f: Fq12,
}

/// Second pass: verify the authenticator against the commitment.
///
/// On failure returns [`Error::BadPin`], carrying [`Evidence`] when
/// `want_evidence` is set and the plain commitment U was supplied. The
/// evidence pairing deliberately omits the time-permit term so the
/// PIN-error service works from the permit-free relation.
#[allow(clippy::too_many_arguments)]
pub fn verify(
    date: u32,
    points: &IdPoints,
    y: Fr,
    sst: &ServerSecret,
    commitment: Option<&G1Affine>,
    timed_commitment: Option<&G1Affine>,
    authenticator: &G1Affine,
    want_evidence: bool,
) -> Result<()> {
    let q = G2Affine::generator();

    let (p, r) = if date != 0 {
        let p = points.htid.as_ref().ok_or(Error::BadParams)?;
        (p, timed_commitment.ok_or(Error::BadParams)?)
    } else {
        (&points.hid, commitment.ok_or(Error::BadParams)?)
    };
    // P = y*P + U, the point the authenticator must cancel.
    let p = (*p * y + *r).into_affine();

    let g = Bn254::multi_miller_loop([*authenticator, p], [q, sst.0]);
    let g = Bn254::final_exponentiation(g).ok_or(Error::InvalidPoint)?.0;

    let unity = codec::encode_gt(&g)[..].ct_eq(&codec::encode_gt(&Fq12::one())[..]);
    if bool::from(unity) {
        return Ok(());
    }

    let evidence = match (want_evidence, commitment) {
        (true, Some(u)) => {
            let pf = (points.hid * y + *u).into_affine();
            let f = Bn254::pairing(pf, q).0;
            Some(Evidence { e: g, f })
        }
        _ => None,
    };
    Err(Error::BadPin(evidence))
}

/// One-pass server: identity points, challenge derivation, verification.
#[allow(clippy::too_many_arguments)]
pub fn authenticate(
    date: u32,
    time_value: u32,
    id: &[u8],
    sst: &ServerSecret,
    message: Option<&[u8]>,
    commitment: Option<&G1Affine>,
    timed_commitment: Option<&G1Affine>,
    authenticator: &G1Affine,
    want_evidence: bool,
) -> Result<()> {
    let points = identity_points(date, id);

    let m_point = if date != 0 { timed_commitment } else { commitment };
    let m_point = m_point.ok_or(Error::BadParams)?;
    let mut m = Vec::with_capacity(crate::G1_BYTES + message.map_or(0, |m| m.len()));
    m.extend_from_slice(&codec::encode_g1(m_point));
    if let Some(msg) = message {
        m.extend_from_slice(msg);
    }
    let y = challenge(time_value, &m);

    verify(
        date,
        &points,
        y,
        sst,
        commitment,
        timed_commitment,
        authenticator,
        want_evidence,
    )
}
