//! Counter-mode key derivation over SM3.
//!
//! `KDF(x2 || y2, klen)` appends a 32-bit big-endian counter, starting at 1,
//! to the shared-point coordinates and hashes; each hash yields one 32-byte
//! block of keystream. Encryption and decryption consume the stream
//! identically: the XOR is its own inverse.

use crate::{Error, Result};
use alloc::{vec, vec::Vec};
use core::cmp::min;
use sm3::{
    digest::{FixedOutputReset, Output},
    Digest, Sm3,
};

/// Derive `len` bytes of keystream from the shared-point coordinates.
pub fn derive(x2: &[u8], y2: &[u8], len: usize) -> Result<Vec<u8>> {
    let mut out = vec![0u8; len];
    let mut digest = Sm3::new();
    xor_stream(&mut digest, x2, y2, &mut out)?;
    Ok(out)
}

/// XOR the keystream keyed by `(x2, y2)` into `buf` in place.
///
/// A zero-length buffer consumes no counter block. Buffers needing more than
/// `2^32 - 1` blocks exceed the counter width and are rejected.
pub(crate) fn xor_stream(digest: &mut Sm3, x2: &[u8], y2: &[u8], buf: &mut [u8]) -> Result<()> {
    let klen = buf.len();
    if (klen as u64) > u64::from(u32::MAX) * 32 {
        return Err(Error);
    }

    Digest::reset(digest);
    let mut block = Output::<Sm3>::default();
    let mut ct: u32 = 1;
    let mut offset = 0;

    while offset < klen {
        Digest::update(digest, x2);
        Digest::update(digest, y2);
        Digest::update(digest, ct.to_be_bytes());
        FixedOutputReset::finalize_into_reset(digest, &mut block);

        let take = min(block.len(), klen - offset);
        for (b, k) in buf[offset..offset + take].iter_mut().zip(&block) {
            *b ^= k;
        }
        offset += take;
        ct += 1;
    }

    Ok(())
}
