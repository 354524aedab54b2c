//! SM2 public-key encryption tests.

use hex_literal::hex;
use proptest::prelude::*;
use rand_core::{CryptoRng, OsRng, RngCore};
use sm_crypto::{
    elliptic_curve::ops::Reduce,
    generate_keypair,
    pke::{Cipher, DecryptingKey, EncryptingKey, Mode},
    FieldBytes, NonZeroScalar, PrecomputedPublicKey, Scalar,
};

// GB/T 32918.4 Annex A example key and ephemeral scalar (shared with the
// signature example); the x-coordinate of [k]G is pinned by those vectors.
const D_HEX: &str = "3945208f7b2144b13f36e38ac6d39f95889393692860b51a42fb81ef4df7c5b8";
const K: [u8; 32] = hex!("59276E27D506861A16680F3AD9C02DCCEF3CC1FA3CDBE4CE6D54B80DEAC1BC21");
const X1_HEX: &str = "04ebfc718e8d1798620432268e77feb6415e2ede0e073c0f4f640ecd2e149a73";
const MSG: &[u8] = b"encryption standard";

/// Test-only RNG that plays back a fixed 32-byte pattern, pinning the
/// ephemeral scalar drawn inside `encrypt`.
struct FixedRng([u8; 32]);

impl RngCore for FixedRng {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(self.0.len()) {
            chunk.copy_from_slice(&self.0[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for FixedRng {}

fn annex_a_keys() -> (DecryptingKey, EncryptingKey) {
    let dk = DecryptingKey::from_hex(D_HEX).unwrap();
    let ek = dk.encrypting_key();
    (dk, ek)
}

#[test]
fn fixed_ephemeral_pins_c1() {
    let (dk, ek) = annex_a_keys();
    let cipher = ek.encrypt(&mut FixedRng(K), MSG).unwrap();

    let hex = cipher.to_hex(Mode::C1C3C2);
    assert_eq!(&hex[..64], X1_HEX);
    assert_eq!(hex.len(), 128 + 64 + 2 * MSG.len());
    assert_eq!(dk.decrypt(&cipher).unwrap(), MSG);
}

#[test]
fn hex_framing_length() {
    let (dk, ek) = annex_a_keys();
    let hex = ek.encrypt_hex(&mut OsRng, b"hello", Mode::C1C3C2).unwrap();
    assert_eq!(hex.len(), 202);
    assert_eq!(dk.decrypt_hex(&hex, Mode::C1C3C2).unwrap(), b"hello");

    let hex = ek.encrypt_hex(&mut OsRng, b"hello", Mode::C1C2C3).unwrap();
    assert_eq!(hex.len(), 202);
    assert_eq!(dk.decrypt_hex(&hex, Mode::C1C2C3).unwrap(), b"hello");
}

#[test]
fn hex_input_is_case_insensitive() {
    let (dk, ek) = annex_a_keys();
    let hex = ek.encrypt_hex(&mut OsRng, MSG, Mode::default()).unwrap();
    assert_eq!(hex, hex.to_lowercase());
    assert_eq!(
        dk.decrypt_hex(&hex.to_uppercase(), Mode::default()).unwrap(),
        MSG
    );
}

#[test]
fn framing_modes_reorder_the_same_fields() {
    let (dk, ek) = annex_a_keys();
    // same ephemeral scalar in both encryptions
    let c1c3c2 = ek.encrypt(&mut FixedRng(K), MSG).unwrap().to_hex(Mode::C1C3C2);
    let c1c2c3 = ek.encrypt(&mut FixedRng(K), MSG).unwrap().to_hex(Mode::C1C2C3);

    assert_ne!(c1c3c2, c1c2c3);
    assert_eq!(c1c3c2[..128], c1c2c3[..128]);
    // C3 leads in one mode and trails in the other
    assert_eq!(c1c3c2[128..192], c1c2c3[c1c2c3.len() - 64..]);
    assert_eq!(c1c3c2[192..], c1c2c3[128..c1c2c3.len() - 64]);

    assert_eq!(dk.decrypt_hex(&c1c3c2, Mode::C1C3C2).unwrap(), MSG);
    assert_eq!(dk.decrypt_hex(&c1c2c3, Mode::C1C2C3).unwrap(), MSG);
}

#[test]
fn mismatched_mode_soft_fails() {
    let (dk, ek) = annex_a_keys();
    let hex = ek.encrypt_hex(&mut OsRng, MSG, Mode::C1C3C2).unwrap();
    assert!(dk.decrypt_hex(&hex, Mode::C1C2C3).is_err());
    assert!(dk.decrypt_hex_compat(&hex, Mode::C1C2C3).is_empty());
}

#[test]
fn empty_message() {
    let (dk, ek) = annex_a_keys();
    let cipher = ek.encrypt(&mut OsRng, b"").unwrap();
    assert!(cipher.c2().is_empty());

    let hex = cipher.to_hex(Mode::C1C3C2);
    assert_eq!(hex.len(), 192);
    assert_eq!(dk.decrypt_hex(&hex, Mode::C1C3C2).unwrap(), b"");

    // corruption of the empty-message ciphertext is indistinguishable from
    // the empty plaintext only through the compat surface
    let mut corrupted = hex.into_bytes();
    corrupted[150] ^= 1;
    let corrupted = String::from_utf8(corrupted).unwrap();
    assert!(dk.decrypt_hex(&corrupted, Mode::C1C3C2).is_err());
    assert!(dk.decrypt_hex_compat(&corrupted, Mode::C1C3C2).is_empty());
}

#[test]
fn any_flipped_byte_is_rejected() {
    let (dk, ek) = annex_a_keys();
    let bytes = ek.encrypt(&mut OsRng, MSG).unwrap().to_vec(Mode::C1C3C2);

    for i in 0..bytes.len() {
        let mut tampered = bytes.clone();
        tampered[i] ^= 1;
        assert!(dk.decrypt_slice(&tampered, Mode::C1C3C2).is_err());
    }
}

#[test]
fn der_framing_roundtrip() {
    let (dk, ek) = annex_a_keys();
    for mode in [Mode::C1C3C2, Mode::C1C2C3] {
        let der = ek.encrypt_der(&mut OsRng, MSG, mode).unwrap();
        assert_eq!(dk.decrypt_der(&der, mode).unwrap(), MSG);

        // re-encoding is byte-identical
        let cipher = Cipher::from_der(&der, mode).unwrap();
        assert_eq!(cipher.to_der(mode).unwrap(), der);
    }
}

#[test]
fn der_mismatched_mode_fails() {
    let (dk, ek) = annex_a_keys();
    // |M| != 32 makes the octet strings distinguishable by length
    let der = ek.encrypt_der(&mut OsRng, b"plaintext", Mode::C1C3C2).unwrap();
    assert!(dk.decrypt_der(&der, Mode::C1C2C3).is_err());
}

#[test]
fn byte_framing_roundtrip() {
    let (dk, ek) = annex_a_keys();
    let cipher = ek.encrypt(&mut OsRng, MSG).unwrap();
    for mode in [Mode::C1C3C2, Mode::C1C2C3] {
        let bytes = cipher.to_vec(mode);
        assert_eq!(bytes[0], 0x04);
        assert_eq!(dk.decrypt_slice(&bytes, mode).unwrap(), MSG);
    }
}

#[test]
fn wrong_key_soft_fails() {
    let (_, ek) = annex_a_keys();
    let (other_secret, _) = generate_keypair(&mut OsRng);
    let other = DecryptingKey::new(&other_secret);

    let hex = ek.encrypt_hex(&mut OsRng, MSG, Mode::default()).unwrap();
    assert!(other.decrypt_hex(&hex, Mode::default()).is_err());
    assert!(other.decrypt_hex_compat(&hex, Mode::default()).is_empty());
}

#[test]
fn string_interface() {
    let (dk, ek) = annex_a_keys();
    let hex = ek
        .encrypt_hex(&mut OsRng, "你好 world".as_bytes(), Mode::default())
        .unwrap();
    assert_eq!(dk.decrypt_string(&hex, Mode::default()).unwrap(), "你好 world");
    assert_eq!(dk.decrypt_string_compat(&hex, Mode::default()), "你好 world");

    let mut corrupted = hex.into_bytes();
    corrupted[140] ^= 1;
    let corrupted = String::from_utf8(corrupted).unwrap();
    assert_eq!(dk.decrypt_string_compat(&corrupted, Mode::default()), "");
}

#[test]
fn compat_surface_swallows_parse_errors() {
    let (dk, _) = annex_a_keys();
    assert!(dk.decrypt_hex_compat("not hex at all", Mode::default()).is_empty());
    assert!(dk.decrypt_hex_compat("ab", Mode::default()).is_empty());
}

#[test]
fn precomputed_encryption() {
    let (dk, ek) = annex_a_keys();
    let precomputed = PrecomputedPublicKey::new(*ek.public_key());
    let ek = EncryptingKey::from_precomputed(precomputed);

    let cipher = ek.encrypt(&mut FixedRng(K), MSG).unwrap();
    assert_eq!(&cipher.to_hex(Mode::C1C3C2)[..64], X1_HEX);
    assert_eq!(dk.decrypt(&cipher).unwrap(), MSG);
}

prop_compose! {
    fn decrypting_key()(bytes in any::<[u8; 32]>()) -> DecryptingKey {
        loop {
            let scalar = <Scalar as Reduce<sm_crypto::U256>>::reduce_bytes(&FieldBytes::from(bytes));
            if let Some(scalar) = Option::from(NonZeroScalar::new(scalar)) {
                return DecryptingKey::from_nonzero_scalar(scalar);
            }
        }
    }
}

proptest! {
    #[test]
    fn encrypt_and_decrypt(dk in decrypting_key(), msg in any::<Vec<u8>>()) {
        let ek = dk.encrypting_key();
        let cipher = ek.encrypt(&mut OsRng, &msg).unwrap();
        prop_assert_eq!(dk.decrypt(&cipher).unwrap(), msg);
    }

    #[test]
    fn encrypt_and_decrypt_hex_modes(dk in decrypting_key(), msg in any::<Vec<u8>>()) {
        let ek = dk.encrypting_key();
        for mode in [Mode::C1C3C2, Mode::C1C2C3] {
            let hex = ek.encrypt_hex(&mut OsRng, &msg, mode).unwrap();
            prop_assert_eq!(dk.decrypt_hex(&hex, mode).unwrap(), msg.clone());
        }
    }

    #[test]
    fn randomized_ciphertexts(dk in decrypting_key()) {
        let ek = dk.encrypting_key();
        let cipher1 = ek.encrypt_hex(&mut OsRng, MSG, Mode::default()).unwrap();
        let cipher2 = ek.encrypt_hex(&mut OsRng, MSG, Mode::default()).unwrap();
        prop_assert_ne!(cipher1, cipher2);
    }
}
