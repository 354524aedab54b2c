//! Support for SM2 encryption.
//!
//! ## Algorithm
//!
//! ```text
//! A1: generate a random number k in [1, n-1] with the random number generator
//! A2: compute point C1 = [k]G = (x1, y1)
//! A3: compute point S = [h]PB, error if S is the point at infinity
//! A4: compute point [k]PB = (x2, y2)
//! A5: compute t = KDF(x2 || y2, klen), go to A1 if t is all-zero
//! A6: compute C2 = M xor t
//! A7: compute C3 = Hash(x2 || M || y2)
//! ```

use super::{Cipher, Mode};
use crate::{
    codec, kdf, Hash, NonZeroScalar, PrecomputedPublicKey, ProjectivePoint, PublicKey, Result,
    SecretKey,
};
use alloc::{string::String, vec::Vec};
use elliptic_curve::{ops::MulByGenerator, Group};
use rand_core::CryptoRngCore;
use sm3::{Digest, Sm3};

/// SM2 public key used for encrypting messages.
#[derive(Clone, Debug)]
pub struct EncryptingKey {
    public_key: PublicKey,

    /// Optional window table accelerating the `[k]PB` term.
    precomputed: Option<PrecomputedPublicKey>,
}

impl EncryptingKey {
    /// Initialize [`EncryptingKey`] from the recipient's public key.
    pub fn new(public_key: PublicKey) -> Self {
        Self {
            public_key,
            precomputed: None,
        }
    }

    /// Initialize [`EncryptingKey`] from a public key in hex form (with or
    /// without the SEC1 `04` tag).
    pub fn from_hex(hex: &str) -> Result<Self> {
        codec::public_key_from_hex(hex).map(Self::new)
    }

    /// Initialize [`EncryptingKey`] from a precomputed public key, which then
    /// accelerates the `[k]PB` term of every encryption.
    pub fn from_precomputed(precomputed: PrecomputedPublicKey) -> Self {
        Self {
            public_key: *precomputed.public_key(),
            precomputed: Some(precomputed),
        }
    }

    /// Initialize [`EncryptingKey`] for the holder of a secret key.
    pub fn from_secret_key(secret_key: &SecretKey) -> Self {
        Self::new(secret_key.public_key())
    }

    /// Borrow the recipient's [`PublicKey`].
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Encrypt a message into a [`Cipher`].
    pub fn encrypt(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Cipher> {
        let mut digest = Sm3::new();

        loop {
            // A1: generate a random number k in [1, n-1]
            let k = NonZeroScalar::random(rng);

            // A2: compute point C1 = [k]G = (x1, y1)
            let c1 = ProjectivePoint::mul_by_generator(&*k).to_affine();

            // A4: compute point [k]PB = (x2, y2)
            let shared = match &self.precomputed {
                Some(precomputed) => precomputed.mul(&k),
                None => ProjectivePoint::from(*self.public_key.as_affine()) * *k,
            };
            if bool::from(shared.is_identity()) {
                continue;
            }
            let (x2, y2) = codec::point_coordinates(&shared.to_affine())?;

            // A5/A6: compute C2 = M xor KDF(x2 || y2, klen)
            let mut c2 = msg.to_vec();
            kdf::xor_stream(&mut digest, &x2, &y2, &mut c2)?;

            // an all-zero t leaves the message in the clear; back to A1
            if !msg.is_empty() && c2 == msg {
                continue;
            }

            // A7: compute C3 = Hash(x2 || M || y2)
            let mut c3 = Hash::default();
            Digest::update(&mut digest, &x2);
            Digest::update(&mut digest, msg);
            Digest::update(&mut digest, &y2);
            Digest::finalize_into_reset(&mut digest, &mut c3);

            return Ok(Cipher::new(c1, c2, c3));
        }
    }

    /// Encrypt a message directly to the hex framing.
    pub fn encrypt_hex(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
        mode: Mode,
    ) -> Result<String> {
        Ok(self.encrypt(rng, msg)?.to_hex(mode))
    }

    /// Encrypt a message directly to the ASN.1 DER framing.
    pub fn encrypt_der(
        &self,
        rng: &mut impl CryptoRngCore,
        msg: &[u8],
        mode: Mode,
    ) -> Result<Vec<u8>> {
        self.encrypt(rng, msg)?.to_der(mode)
    }
}

impl From<PublicKey> for EncryptingKey {
    fn from(public_key: PublicKey) -> Self {
        Self::new(public_key)
    }
}
