//! Distinguishing identifier support.
//!
//! The user information hash `Z` binds a signer's identity and public key to
//! the curve parameters:
//!
//! ```text
//! ZA = H256(ENTLA || IDA || a || b || xG || yG || xA || yA)
//! ```
//!
//! where `ENTLA` is the bit length of the identifier as a 16-bit big-endian
//! integer and the remaining inputs are 32-byte big-endian values. The
//! pre-hash delivered to signing and verification is `e = H256(Z || M)`.

use crate::{codec, Error, Hash, PublicKey, Result};
use elliptic_curve::bigint::{ArrayEncoding, U256};
use sm3::{Digest, Sm3};

/// Default distinguishing identifier, a convention of the standard's
/// examples. Peers must agree on the identifier: a mismatch yields a
/// deterministic but non-matching `Z`.
pub const DEFAULT_DIST_ID: &str = "1234567812345678";

/// Curve coefficient `a` of `y² = x³ + ax + b`.
const EQUATION_A_HEX: &str = "fffffffeffffffffffffffffffffffffffffffff00000000fffffffffffffffc";

/// Curve coefficient `b`.
const EQUATION_B_HEX: &str = "28e9fa9e9d9f5e344d5a9e4bcf6509a7f39789f515ab8f92ddbcbd414d940e93";

/// Base point x-coordinate.
const GENERATOR_X_HEX: &str = "32c4ae2c1f1981195f9904466a39c9948fe30bbff2660be1715a4589334c74c7";

/// Base point y-coordinate.
const GENERATOR_Y_HEX: &str = "bc3736a2f4f6779c59bdcee36b692153d0a9877cc62a474002df32e52139f0a0";

/// Compute the user information hash `Z` for an identifier and public key.
///
/// Fails if the identifier's bit length overflows the 16-bit `ENTL` field.
pub fn hash_z(distid: &str, public_key: &PublicKey) -> Result<Hash> {
    let entl: u16 = distid
        .len()
        .checked_mul(8)
        .and_then(|l| l.try_into().ok())
        .ok_or(Error)?;

    let mut sm3 = Sm3::new();
    sm3.update(entl.to_be_bytes());
    sm3.update(distid);
    sm3.update(U256::from_be_hex(EQUATION_A_HEX).to_be_byte_array());
    sm3.update(U256::from_be_hex(EQUATION_B_HEX).to_be_byte_array());
    sm3.update(U256::from_be_hex(GENERATOR_X_HEX).to_be_byte_array());
    sm3.update(U256::from_be_hex(GENERATOR_Y_HEX).to_be_byte_array());

    let (x, y) = codec::point_coordinates(public_key.as_affine())?;
    sm3.update(x);
    sm3.update(y);
    Ok(sm3.finalize())
}

/// Compute the message pre-hash `e = H256(Z || M)`.
pub fn hash_msg(z: &Hash, msg: &[u8]) -> Hash {
    Sm3::new_with_prefix(z).chain_update(msg).finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn example_key() -> PublicKey {
        codec::public_key_from_hex(
            "09f9df311e5421a150dd7d161e4bc5c672179fad1833fc076bb08ff356f35020\
             ccea490ce26775a52dc6ea718cc1aa600aed05fbf35e084a6632f6072da9ad13",
        )
        .unwrap()
    }

    #[test]
    fn deterministic() {
        let public_key = example_key();
        let z1 = hash_z(DEFAULT_DIST_ID, &public_key).unwrap();
        let z2 = hash_z(DEFAULT_DIST_ID, &public_key).unwrap();
        assert_eq!(z1, z2);
    }

    #[test]
    fn identifier_is_bound() {
        let public_key = example_key();
        let z1 = hash_z(DEFAULT_DIST_ID, &public_key).unwrap();
        let z2 = hash_z("ALICE123@YAHOO.COM", &public_key).unwrap();
        assert_ne!(z1, z2);
    }

    #[test]
    fn overlong_identifier_rejected() {
        let public_key = example_key();
        let id = alloc::string::String::from_utf8(alloc::vec![b'a'; 8192]).unwrap();
        assert!(hash_z(&id, &public_key).is_err());
    }
}
