//! Support for verifying SM2DSA signatures.
//!
//! ## Algorithm
//!
//! ```text
//! B1: verify whether r' in [1,n-1], verification failed if not
//! B2: verify whether s' in [1,n-1], verification failed if not
//! B3: set M'~=ZA || M'
//! B4: calculate e'=Hv(M'~)
//! B5: calculate t = (r' + s') modn, verification failed if t=0
//! B6: calculate the point (x1', y1')=[s']G + [t]PA
//! B7: calculate R=(e'+x1') modn, verification pass if R=r', otherwise failed
//! ```

use super::{scalar_from_prehash, Signature};
use crate::{
    codec, distid, AffinePoint, EncodedPoint, Hash, PrecomputedPublicKey, ProjectivePoint,
    PublicKey, Scalar, Sm2,
};
use alloc::{boxed::Box, string::String};
use elliptic_curve::{
    ops::{LinearCombination, MulByGenerator, Reduce},
    point::AffineCoordinates,
    sec1::ToEncodedPoint,
    Group,
};
use signature::{hazmat::PrehashVerifier, Error, Result, Verifier};

/// SM2DSA public key used for verifying signatures are valid for a given
/// message.
///
/// ## Usage
///
/// The [`signature`] crate defines the traits which are the primary
/// verification API:
///
/// - [`Verifier`]: verify a message against a provided key and signature
/// - [`PrehashVerifier`]: verify a caller-supplied digest instead of applying
///   the `Z` pre-hash
///
/// The rejection cause is never distinguished: every failure is the opaque
/// [`Error`].
#[derive(Clone, Debug)]
pub struct VerifyingKey {
    /// Signer's public key.
    public_key: PublicKey,

    /// Signer's user information hash `Z`.
    identity_hash: Hash,

    /// Distinguishing identifier used to compute `Z`.
    distid: String,

    /// Optional window table accelerating the `[t]PA` term.
    precomputed: Option<PrecomputedPublicKey>,
}

impl VerifyingKey {
    /// Initialize [`VerifyingKey`] from a signer's distinguishing identifier
    /// and public key.
    pub fn new(distid: &str, public_key: PublicKey) -> Result<Self> {
        let identity_hash = distid::hash_z(distid, &public_key).map_err(|_| Error::new())?;

        Ok(Self {
            public_key,
            identity_hash,
            distid: distid.into(),
            precomputed: None,
        })
    }

    /// Initialize [`VerifyingKey`] from a SEC1-encoded public key.
    pub fn from_sec1_bytes(distid: &str, bytes: &[u8]) -> Result<Self> {
        let public_key = PublicKey::from_sec1_bytes(bytes).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from a public key in hex form (with or
    /// without the SEC1 `04` tag).
    pub fn from_hex(distid: &str, hex: &str) -> Result<Self> {
        let public_key = codec::public_key_from_hex(hex).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from an affine point.
    ///
    /// Returns an [`Error`] if the given affine point is the additive identity
    /// (a.k.a. point at infinity).
    pub fn from_affine(distid: &str, affine: AffinePoint) -> Result<Self> {
        let public_key = PublicKey::from_affine(affine).map_err(|_| Error::new())?;
        Self::new(distid, public_key)
    }

    /// Initialize [`VerifyingKey`] from a precomputed public key, which then
    /// accelerates the `[t]PA` term of every verification.
    pub fn from_precomputed(distid: &str, precomputed: PrecomputedPublicKey) -> Result<Self> {
        let mut verifying_key = Self::new(distid, *precomputed.public_key())?;
        verifying_key.precomputed = Some(precomputed);
        Ok(verifying_key)
    }

    /// Borrow the inner [`AffinePoint`] for this public key.
    pub fn as_affine(&self) -> &AffinePoint {
        self.public_key.as_affine()
    }

    /// Get the distinguishing identifier for this key.
    pub fn distid(&self) -> &str {
        self.distid.as_str()
    }

    /// Get the cached user information hash `Z` for this key.
    pub fn identity_hash(&self) -> &Hash {
        &self.identity_hash
    }

    /// Serialize this key as 128 lowercase hex characters.
    pub fn to_hex(&self) -> String {
        codec::public_key_to_hex(&self.public_key)
    }

    /// Convert this [`VerifyingKey`] into the
    /// `Elliptic-Curve-Point-to-Octet-String` encoding described in
    /// SEC 1: Elliptic Curve Cryptography (Version 2.0) section 2.3.3
    /// (page 10).
    ///
    /// <http://www.secg.org/sec1-v2.pdf>
    pub fn to_sec1_bytes(&self) -> Box<[u8]> {
        self.public_key.to_sec1_bytes()
    }

    /// Compute the message pre-hash `e = H256(Z || M)`.
    pub(crate) fn hash_msg(&self, msg: &[u8]) -> Hash {
        distid::hash_msg(&self.identity_hash, msg)
    }
}

//
// `*Verifier` trait impls
//

impl PrehashVerifier<Signature> for VerifyingKey {
    fn verify_prehash(&self, prehash: &[u8], signature: &Signature) -> Result<()> {
        // B1/B2: r' and s' in [1,n-1] were checked when the signature was
        // parsed into `NonZeroScalar`s
        let (r, s) = signature.split_scalars();

        // B4: calculate e'=Hv(M'~)
        let e = scalar_from_prehash(prehash)?;

        // B5: calculate t = (r' + s') modn, verification failed if t=0
        let t = *r + *s;
        if bool::from(t.is_zero()) {
            return Err(Error::new());
        }

        // B6: calculate the point (x1', y1')=[s']G + [t]PA
        let point = match &self.precomputed {
            Some(precomputed) => ProjectivePoint::mul_by_generator(&*s) + precomputed.mul(&t),
            None => ProjectivePoint::lincomb(
                &ProjectivePoint::generator(),
                &*s,
                &ProjectivePoint::from(*self.public_key.as_affine()),
                &t,
            ),
        };
        if bool::from(point.is_identity()) {
            return Err(Error::new());
        }

        // B7: calculate R=(e'+x1') modn, verification pass if R=r'
        if *r == e + Scalar::reduce_bytes(&point.to_affine().x()) {
            Ok(())
        } else {
            Err(Error::new())
        }
    }
}

impl Verifier<Signature> for VerifyingKey {
    fn verify(&self, msg: &[u8], signature: &Signature) -> Result<()> {
        // B3: set M'~=ZA || M'
        let prehash = self.hash_msg(msg);
        self.verify_prehash(&prehash, signature)
    }
}

//
// Other trait impls
//

impl AsRef<AffinePoint> for VerifyingKey {
    fn as_ref(&self) -> &AffinePoint {
        self.as_affine()
    }
}

impl From<VerifyingKey> for PublicKey {
    fn from(verifying_key: VerifyingKey) -> PublicKey {
        verifying_key.public_key
    }
}

impl From<&VerifyingKey> for PublicKey {
    fn from(verifying_key: &VerifyingKey) -> PublicKey {
        verifying_key.public_key
    }
}

impl ToEncodedPoint<Sm2> for VerifyingKey {
    fn to_encoded_point(&self, compress: bool) -> EncodedPoint {
        self.as_affine().to_encoded_point(compress)
    }
}
