//! Trusted-authority primitives: master secrets, issued shares and tokens.
//!
//! The authority holds a master secret `s` and issues `s*Q` to the server
//! and `s*H1(ID)` to each client. The client immediately subtracts its
//! PIN component and stores only the remainder, so neither the token nor
//! the PIN is useful alone. Shares from independent authorities combine
//! additively.

use crate::utils::{hash_tagged, hash_to_curve};
use crate::{codec, Result, G1_BYTES, G2_BYTES, MAX_PIN, PIN_BITS, SCALAR_BYTES};

use ark_bn254::{Fr, G1Affine, G1Projective, G2Affine};
use ark_ec::{AffineRepr, CurveGroup, Group};
use ark_ff::Zero;
use ark_std::rand::RngCore;
use ark_std::UniformRand;
use zeroize::Zeroize;

/// Trusted-authority master secret.
#[derive(Debug, PartialEq, Eq)]
pub struct MasterSecret(pub(crate) Fr);

impl MasterSecret {
    /// Draw a fresh master secret from `rng`.
    pub fn random<R: RngCore>(rng: &mut R) -> Self {
        Self(Fr::rand(rng))
    }

    /// Draw a fresh master secret from system randomness.
    #[cfg(feature = "getrandom")]
    pub fn ephemeral() -> Self {
        Self::random(&mut rand_core::OsRng)
    }

    /// Server share: the master secret applied to the fixed G2 generator.
    pub fn server_secret(&self) -> ServerSecret {
        ServerSecret((G2Affine::generator() * self.0).into_affine())
    }

    /// Client share over the hashed identity.
    pub fn client_secret(&self, id_hash: &[u8]) -> ClientSecret {
        ClientSecret((hash_to_curve(id_hash) * self.0).into_affine())
    }

    /// Per-epoch permit binding the hashed identity to `date` (day slots).
    pub fn time_permit(&self, date: u32, id_hash: &[u8]) -> TimePermit {
        let h = hash_tagged(date, id_hash);
        TimePermit((hash_to_curve(&h) * self.0).into_affine())
    }

    pub fn to_bytes(&self) -> [u8; SCALAR_BYTES] {
        codec::encode_scalar(&self.0)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode_scalar(buf).map(Self)
    }
}

impl Zeroize for MasterSecret {
    fn zeroize(&mut self) {
        self.0 = Fr::zero();
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl zeroize::ZeroizeOnDrop for MasterSecret {}

/// Server share of the master secret, in G2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerSecret(pub G2Affine);

impl ServerSecret {
    /// Additively combine shares issued by independent authorities.
    pub fn combine(&self, other: &Self) -> Self {
        Self((self.0.into_group() + other.0).into_affine())
    }

    pub fn to_bytes(&self) -> [u8; G2_BYTES] {
        codec::encode_g2(&self.0)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode_g2(buf).map(Self)
    }
}

/// Client share of the master secret over its identity point, in G1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientSecret(pub G1Affine);

impl ClientSecret {
    /// Additively combine shares issued by independent authorities.
    pub fn combine(&self, other: &Self) -> Self {
        Self((self.0.into_group() + other.0).into_affine())
    }

    /// Remove the PIN component, leaving the token the device stores.
    pub fn extract_pin(&self, id_hash: &[u8], pin: u32) -> Token {
        let w = pin_mul(&hash_to_curve(id_hash), pin);
        Token((self.0.into_group() - w).into_affine())
    }

    pub fn to_bytes(&self) -> [u8; G1_BYTES] {
        codec::encode_g1(&self.0)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode_g1(buf).map(Self)
    }
}

/// Per-epoch time permit, in G1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimePermit(pub G1Affine);

impl TimePermit {
    /// Additively combine permits issued by independent authorities.
    pub fn combine(&self, other: &Self) -> Self {
        Self((self.0.into_group() + other.0).into_affine())
    }

    pub fn to_bytes(&self) -> [u8; G1_BYTES] {
        codec::encode_g1(&self.0)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode_g1(buf).map(Self)
    }
}

/// The PIN-less remainder of a client secret.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token(pub G1Affine);

impl Token {
    pub fn to_bytes(&self) -> [u8; G1_BYTES] {
        codec::encode_g1(&self.0)
    }

    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        codec::decode_g1(buf).map(Self)
    }
}

/// Multiply by a PIN with a ladder of fixed length, independent of the
/// PIN value.
pub(crate) fn pin_mul(p: &G1Affine, pin: u32) -> G1Projective {
    let pin = pin % MAX_PIN;
    let mut r0 = G1Projective::zero();
    let mut r1 = p.into_group();
    for i in (0..PIN_BITS).rev() {
        if (pin >> i) & 1 == 0 {
            r1 += &r0;
            r0.double_in_place();
        } else {
            r0 += &r1;
            r1.double_in_place();
        }
    }
    r0
}
