//! Support for SM2DSA signing.
//!
//! ## Algorithm
//!
//! ```text
//! A1: set M~=ZA || M
//! A2: calculate e=Hv(M~)
//! A3: pick a random number k in [1, n-1] via a random number generator
//! A4: calculate the elliptic curve point (x1, y1)=[k]G
//! A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
//! A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
//! A7: the digital signature of M is (r, s)
//! ```

use super::{scalar_from_prehash, Signature, VerifyingKey};
use crate::{codec, FieldBytes, NonZeroScalar, ProjectivePoint, PublicKey, Scalar, SecretKey, Sm2};
use alloc::vec::Vec;
use core::fmt::{self, Debug};
use elliptic_curve::{
    bigint::ArrayEncoding,
    ops::{MulByGenerator, Reduce},
    point::AffineCoordinates,
    subtle::{Choice, ConstantTimeEq},
    Curve, PrimeField,
};
use rand_core::CryptoRngCore;
use signature::{
    hazmat::{PrehashSigner, RandomizedPrehashSigner},
    Error, KeypairRef, RandomizedSigner, Result, Signer,
};
use sm3::Sm3;

/// A caller-precomputed ephemeral `(k, x1)` pair.
///
/// Producing these off the critical path amortizes the `[k]G` multiplication
/// of A4; [`SigningKey::sign_with_pool`] consumes one entry per attempt.
/// Entries are strictly single-use: reusing `k` across signatures reveals the
/// secret key.
#[derive(Clone)]
pub struct EphemeralPoint {
    k: NonZeroScalar,
    x1: FieldBytes,
}

impl EphemeralPoint {
    /// Generate an ephemeral point with a fresh uniform `k` in `[1, n-1]`.
    pub fn random(rng: &mut impl CryptoRngCore) -> Self {
        Self::from_scalar(NonZeroScalar::random(rng))
    }

    /// Compute the ephemeral point for a given `k`.
    pub fn from_scalar(k: NonZeroScalar) -> Self {
        let x1 = ProjectivePoint::mul_by_generator(&*k).to_affine().x();
        Self { k, x1 }
    }

    /// The x-coordinate of `[k]G` as 32 big-endian bytes.
    pub fn x1(&self) -> &FieldBytes {
        &self.x1
    }
}

impl Debug for EphemeralPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EphemeralPoint")
            .field("x1", &self.x1)
            .finish_non_exhaustive()
    }
}

/// SM2DSA secret key used for signing messages and producing signatures.
///
/// ## Usage
///
/// The [`signature`] crate defines the traits which are the primary signing
/// API:
///
/// - [`RandomizedSigner`]: sign a message with a fresh uniform `k`
/// - [`Signer`]: sign a message with a deterministic (RFC 6979) `k`
/// - [`PrehashSigner`] / [`RandomizedPrehashSigner`]: sign a caller-supplied
///   digest instead of applying the `Z` pre-hash
///
/// [`SigningKey::sign_with_pool`] additionally signs from caller-precomputed
/// [`EphemeralPoint`]s.
#[derive(Clone)]
pub struct SigningKey {
    /// Secret key.
    secret_scalar: NonZeroScalar,

    /// Cached `(1 + d)^-1`; its existence proves `d != n - 1`.
    d_plus_one_inv: Scalar,

    /// Verifying key for this signing key.
    verifying_key: VerifyingKey,
}

impl SigningKey {
    /// Create signing key from a signer's distinguishing identifier and
    /// secret key.
    pub fn new(distid: &str, secret_key: &SecretKey) -> Result<Self> {
        Self::from_nonzero_scalar(distid, secret_key.to_nonzero_scalar())
    }

    /// Parse signing key from its 64-character hex form.
    pub fn from_hex(distid: &str, hex: &str) -> Result<Self> {
        let secret_key = codec::secret_key_from_hex(hex).map_err(|_| Error::new())?;
        Self::new(distid, &secret_key)
    }

    /// Parse signing key from a big endian-encoded byte slice containing a
    /// secret scalar value.
    pub fn from_slice(distid: &str, slice: &[u8]) -> Result<Self> {
        let secret_scalar = NonZeroScalar::try_from(slice).map_err(|_| Error::new())?;
        Self::from_nonzero_scalar(distid, secret_scalar)
    }

    /// Create a signing key from a non-zero scalar.
    ///
    /// Rejects `d = n - 1`, for which the A6 divisor `1 + d` vanishes.
    pub fn from_nonzero_scalar(distid: &str, secret_scalar: NonZeroScalar) -> Result<Self> {
        let d_plus_one_inv = Option::<Scalar>::from((*secret_scalar + Scalar::ONE).invert())
            .ok_or_else(Error::new)?;
        let public_key = PublicKey::from_secret_scalar(&secret_scalar);
        let verifying_key = VerifyingKey::new(distid, public_key)?;
        Ok(Self {
            secret_scalar,
            d_plus_one_inv,
            verifying_key,
        })
    }

    /// Serialize as bytes.
    pub fn to_bytes(&self) -> FieldBytes {
        self.secret_scalar.to_repr()
    }

    /// Serialize as 64 lowercase hex characters.
    pub fn to_hex(&self) -> alloc::string::String {
        codec::bytes_to_hex(&self.to_bytes())
    }

    /// Borrow the secret [`NonZeroScalar`] value for this key.
    ///
    /// # ⚠️ Warning
    ///
    /// This value is key material.
    ///
    /// Please treat it with the care it deserves!
    pub fn as_nonzero_scalar(&self) -> &NonZeroScalar {
        &self.secret_scalar
    }

    /// Get the [`VerifyingKey`] which corresponds to this [`SigningKey`].
    pub fn verifying_key(&self) -> &VerifyingKey {
        &self.verifying_key
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &str {
        self.verifying_key.distid()
    }

    /// Sign a message from a pool of precomputed ephemeral points, applying
    /// the `Z` pre-hash.
    ///
    /// Pops one entry per attempt; rejected attempts consume their entry.
    /// Fails when the pool runs dry.
    pub fn sign_with_pool(
        &self,
        pool: &mut Vec<EphemeralPoint>,
        msg: &[u8],
    ) -> Result<Signature> {
        let prehash = self.verifying_key.hash_msg(msg);
        self.sign_prehash_with_pool(pool, &prehash)
    }

    /// Sign a caller-supplied digest from a pool of precomputed ephemeral
    /// points.
    pub fn sign_prehash_with_pool(
        &self,
        pool: &mut Vec<EphemeralPoint>,
        prehash: &[u8],
    ) -> Result<Signature> {
        let e = scalar_from_prehash(prehash)?;
        loop {
            let point = pool.pop().ok_or_else(Error::new)?;
            if let Some(signature) = self.sign_attempt(&e, &point) {
                return Ok(signature);
            }
        }
    }

    /// One pass over A5–A7; `None` requests a fresh ephemeral point.
    fn sign_attempt(&self, e: &Scalar, point: &EphemeralPoint) -> Option<Signature> {
        let k = *point.k;

        // A5: calculate r=(e+x1) modn, return to A3 if r=0 or r+k=n
        let r = *e + Scalar::reduce_bytes(&point.x1);
        if bool::from(r.is_zero() | (r + k).ct_eq(&Scalar::ZERO)) {
            return None;
        }

        // A6: calculate s=((1+dA)^(-1)*(k-r*dA)) modn, return to A3 if s=0
        let s = self.d_plus_one_inv * (k - r * *self.secret_scalar);
        if bool::from(s.is_zero()) {
            return None;
        }

        // A7: the digital signature of M is (r, s)
        Signature::from_scalars(r, s).ok()
    }
}

//
// `*Signer` trait impls
//

impl PrehashSigner<Signature> for SigningKey {
    /// Sign a digest with a deterministic `k` derived per RFC 6979 with SM3.
    ///
    /// Rejected attempts re-derive `k` with an attempt counter in the
    /// extra-entropy input, keeping the retry loop deterministic.
    fn sign_prehash(&self, prehash: &[u8]) -> Result<Signature> {
        let e = scalar_from_prehash(prehash)?;

        for attempt in 0u8..=u8::MAX {
            let extra = [attempt];
            let data: &[u8] = if attempt == 0 { &[] } else { &extra };

            // A3 (deterministic)
            let k_bytes = rfc6979::generate_k::<Sm3, _>(
                &self.secret_scalar.to_repr(),
                &<Sm2 as Curve>::ORDER.to_be_byte_array(),
                &e.to_bytes(),
                data,
            );
            let k = Option::from(Scalar::from_repr(k_bytes))
                .and_then(|scalar| Option::from(NonZeroScalar::new(scalar)))
                .ok_or_else(Error::new)?;

            // A4
            let point = EphemeralPoint::from_scalar(k);
            if let Some(signature) = self.sign_attempt(&e, &point) {
                return Ok(signature);
            }
        }

        Err(Error::new())
    }
}

impl RandomizedPrehashSigner<Signature> for SigningKey {
    fn sign_prehash_with_rng(
        &self,
        rng: &mut impl CryptoRngCore,
        prehash: &[u8],
    ) -> Result<Signature> {
        let e = scalar_from_prehash(prehash)?;

        // A3: pick a random number k in [1, n-1] via a random number generator
        loop {
            let point = EphemeralPoint::random(rng);
            if let Some(signature) = self.sign_attempt(&e, &point) {
                return Ok(signature);
            }
        }
    }
}

impl RandomizedSigner<Signature> for SigningKey {
    fn try_sign_with_rng(&self, rng: &mut impl CryptoRngCore, msg: &[u8]) -> Result<Signature> {
        // A1: set M~=ZA || M
        let prehash = self.verifying_key.hash_msg(msg);
        self.sign_prehash_with_rng(rng, &prehash)
    }
}

impl Signer<Signature> for SigningKey {
    fn try_sign(&self, msg: &[u8]) -> Result<Signature> {
        // A1: set M~=ZA || M
        let prehash = self.verifying_key.hash_msg(msg);
        self.sign_prehash(&prehash)
    }
}

//
// Other trait impls
//

impl AsRef<VerifyingKey> for SigningKey {
    fn as_ref(&self) -> &VerifyingKey {
        &self.verifying_key
    }
}

impl ConstantTimeEq for SigningKey {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.secret_scalar.ct_eq(&other.secret_scalar)
    }
}

impl Debug for SigningKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SigningKey")
            .field("verifying_key", &self.verifying_key)
            .finish_non_exhaustive()
    }
}

/// Constant-time comparison
impl Eq for SigningKey {}
impl PartialEq for SigningKey {
    fn eq(&self, other: &SigningKey) -> bool {
        self.ct_eq(other).into()
    }
}

impl KeypairRef for SigningKey {
    type VerifyingKey = VerifyingKey;
}
