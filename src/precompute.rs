//! Precomputed public keys for repeated scalar multiplication.

use crate::{codec, Error, ProjectivePoint, PublicKey, Result, Scalar};
use alloc::vec::Vec;
use core::cmp::min;
use elliptic_curve::{
    subtle::{ConditionallySelectable, ConstantTimeEq},
    Group,
};

/// Default window width in bits.
const DEFAULT_WINDOW: usize = 4;

/// A public key expanded into a table of small multiples, amortizing the cost
/// of scalar multiplication across repeated encryptions or verifications.
///
/// Accepted wherever a public key is expected:
/// [`EncryptingKey::from_precomputed`][crate::pke::EncryptingKey::from_precomputed]
/// and
/// [`VerifyingKey::from_precomputed`][crate::dsa::VerifyingKey::from_precomputed].
///
/// The multiplication reads the whole table with a conditional select per
/// window, so it is safe for secret scalars such as the encryption ephemeral.
#[derive(Clone, Debug)]
pub struct PrecomputedPublicKey {
    public_key: PublicKey,
    window: usize,
    table: Vec<ProjectivePoint>,
}

impl PrecomputedPublicKey {
    /// Precompute a public key with the default window width.
    pub fn new(public_key: PublicKey) -> Self {
        Self::build(public_key, DEFAULT_WINDOW)
    }

    /// Precompute a public key with a window of `window` bits (1 to 8).
    ///
    /// The table holds `2^window - 1` points: wider windows trade memory and
    /// setup time for fewer additions per multiplication.
    pub fn with_window(public_key: PublicKey, window: usize) -> Result<Self> {
        if !(1..=8).contains(&window) {
            return Err(Error);
        }
        Ok(Self::build(public_key, window))
    }

    /// Precompute a public key given in hex form.
    pub fn from_hex(hex: &str) -> Result<Self> {
        codec::public_key_from_hex(hex).map(Self::new)
    }

    fn build(public_key: PublicKey, window: usize) -> Self {
        let base = ProjectivePoint::from(*public_key.as_affine());
        let mut table = Vec::with_capacity((1 << window) - 1);
        let mut entry = base;
        for _ in 0..(1usize << window) - 1 {
            table.push(entry);
            entry += base;
        }
        Self {
            public_key,
            window,
            table,
        }
    }

    /// Borrow the wrapped [`PublicKey`].
    pub fn public_key(&self) -> &PublicKey {
        &self.public_key
    }

    /// Fixed-window scalar multiplication using the precomputed table.
    ///
    /// Constant time with respect to `scalar`: every window performs the same
    /// doublings and a full-table conditional select.
    pub(crate) fn mul(&self, scalar: &Scalar) -> ProjectivePoint {
        let bytes = scalar.to_bytes();
        let mut acc = ProjectivePoint::IDENTITY;
        let mut processed = 0;

        while processed < 256 {
            // a shorter leading window keeps the remaining ones aligned
            let take = if processed == 0 {
                let lead = 256 % self.window;
                if lead == 0 {
                    self.window
                } else {
                    lead
                }
            } else {
                min(self.window, 256 - processed)
            };

            let mut val: u8 = 0;
            for _ in 0..take {
                acc = acc.double();
                let bit = (bytes[processed / 8] >> (7 - (processed % 8))) & 1;
                val = (val << 1) | bit;
                processed += 1;
            }

            let mut add = ProjectivePoint::IDENTITY;
            for (i, entry) in self.table.iter().enumerate() {
                #[allow(clippy::cast_possible_truncation)]
                let multiple = (i + 1) as u8;
                add.conditional_assign(entry, multiple.ct_eq(&val));
            }
            acc += add;
        }

        acc
    }
}
