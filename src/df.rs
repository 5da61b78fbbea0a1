//! Derivation functions.
//!
//! `hash_df` and `block_cipher_df` compress an arbitrary-length input
//! chain into a seed-length output (SP 800-90A §10.3.1 and §10.3.2). The
//! block-cipher variant chains through `bcc`, a CBC-MAC without output
//! truncation, and finishes with an ECB output stage under the derived
//! key.

use zeroize::{Zeroize, Zeroizing};

use crate::errors::DrbgError;
use crate::mechanism::Prim;
use crate::primitives::{self, BLOCK_BYTES};
use crate::{chain, util};

/// Largest output `block_cipher_df` will produce. This reproduces the
/// 512-bit cap of the reference behavior; mechanism callers never request
/// more than one seed length.
pub(crate) const MAX_DF_OUT: usize = 512 / 8;

/// Compress `input` into `out.len()` bytes with iterated hashing.
///
/// Each round hashes a five-byte prefix of a one-byte round counter and
/// the big-endian output bit length, followed by the whole input chain.
/// The one-byte counter limits the construction to 255 rounds; callers
/// request at most one seed length, far below that.
pub(crate) fn hash_df(
    prim: Prim,
    input: &[&[u8]],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    let outlen = prim.output_size();
    let bits = ((out.len() * 8) as u32).to_be_bytes();
    let mut block = Zeroizing::new(vec![0u8; outlen]);
    let mut counter: u8 = 1;
    let mut produced = 0;
    while produced < out.len() {
        let prefix = [counter, bits[0], bits[1], bits[2], bits[3]];
        let mut segments: Vec<&[u8]> = Vec::with_capacity(input.len() + 1);
        segments.push(&prefix);
        segments.extend_from_slice(input);
        primitives::hash(prim, &segments, &mut block)?;
        let take = (out.len() - produced).min(outlen);
        out[produced..produced + take].copy_from_slice(&block[..take]);
        produced += take;
        counter = counter.wrapping_add(1);
    }
    Ok(())
}

/// Compress `input` into `out.len()` bytes with the block-cipher
/// derivation function.
pub(crate) fn block_cipher_df(
    prim: Prim,
    input: &[&[u8]],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    let keylen = prim.key_size();
    if keylen == 0 {
        return Err(DrbgError::PrimitiveFailure(
            "derivation function requires a block-cipher primitive",
        ));
    }
    if out.len() > MAX_DF_OUT {
        return Err(DrbgError::InvalidArgument(
            "derivation function output exceeds 64 bytes",
        ));
    }

    // S = BE32(input length) || BE32(output length) || input || 0x80,
    // zero-padded to a whole number of blocks. The padding applies even
    // when the input chain is empty.
    let total = chain::total_len(input);
    let s_len = (4 + 4 + total + 1).next_multiple_of(BLOCK_BYTES);
    let mut s = Zeroizing::new(vec![0u8; s_len]);
    s[..4].copy_from_slice(&(total as u32).to_be_bytes());
    s[4..8].copy_from_slice(&(out.len() as u32).to_be_bytes());
    chain::copy_into(input, &mut s[8..8 + total]);
    s[8 + total] = 0x80;

    // Fixed chaining key 00 01 02 ...
    let mut key = [0u8; 32];
    for (i, byte) in key.iter_mut().enumerate().take(keylen) {
        *byte = i as u8;
    }

    // Chain S once per output block of the intermediate value. The
    // scratch area is a whole number of blocks even when
    // keylen + blocklen is not (AES-192 needs 40 bytes, scratch is 48).
    let temp_len = (keylen + BLOCK_BYTES).next_multiple_of(BLOCK_BYTES);
    let mut temp = Zeroizing::new(vec![0u8; temp_len]);
    let mut iv = [0u8; BLOCK_BYTES];
    for (i, slot) in temp.chunks_exact_mut(BLOCK_BYTES).enumerate() {
        iv[..4].copy_from_slice(&(i as u32).to_be_bytes());
        bcc(prim, &key[..keylen], &iv, &s, slot)?;
    }

    // Split into a fresh key and starting block, then run the output
    // stage: X = Enc(K', X) per block.
    let mut x = [0u8; BLOCK_BYTES];
    x.copy_from_slice(&temp[keylen..keylen + BLOCK_BYTES]);
    let mut produced = 0;
    while produced < out.len() {
        primitives::block_encrypt(prim, &temp[..keylen], &mut x)?;
        let take = (out.len() - produced).min(BLOCK_BYTES);
        out[produced..produced + take].copy_from_slice(&x[..take]);
        produced += take;
    }
    x.zeroize();
    Ok(())
}

/// CBC-MAC without output truncation over `iv || data`. `data` must be
/// block-aligned; the derivation function guarantees this by
/// construction.
fn bcc(
    prim: Prim,
    key: &[u8],
    iv: &[u8; BLOCK_BYTES],
    data: &[u8],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    let mut chaining = [0u8; BLOCK_BYTES];
    util::xor_into(&mut chaining, iv);
    primitives::block_encrypt(prim, key, &mut chaining)?;
    for block in data.chunks_exact(BLOCK_BYTES) {
        util::xor_into(&mut chaining, block);
        primitives::block_encrypt(prim, key, &mut chaining)?;
    }
    out.copy_from_slice(&chaining);
    chaining.zeroize();
    Ok(())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn hash_df_known_answer() {
        let mut out = [0u8; 55];
        hash_df(Prim::Sha256, &[b"drbg derivation function test"], &mut out)
            .unwrap();
        assert_eq!(
            out[..],
            hex!(
                "53fbb37caab757184f8ea03ea452ea6fcfcdb9abb1d1fc0dd65b82cf"
                "a92ca614499d7ff635c2523d290f419fcf03dcfbffb7a26253ec67"
            )[..]
        );
    }

    #[test]
    fn hash_df_is_segment_transparent() {
        let mut split = [0u8; 40];
        hash_df(Prim::Sha1, &[b"ab", b"", b"cd"], &mut split).unwrap();
        let mut whole = [0u8; 40];
        hash_df(Prim::Sha1, &[b"abcd"], &mut whole).unwrap();
        assert_eq!(split, whole);
    }

    #[test]
    fn block_cipher_df_known_answer() {
        let input: Vec<u8> = (0..16).collect();
        let mut out = [0u8; 32];
        block_cipher_df(Prim::Aes128, &[&input], &mut out).unwrap();
        assert_eq!(
            out,
            hex!(
                "021eaed858358a021d47f0bf877b7e61"
                "c854204ed4c85e1b44bc7a4ebb3ef814"
            )
        );
    }

    #[test]
    fn block_cipher_df_pads_empty_input() {
        // AES-192 also exercises the non-block-multiple scratch sizing.
        let mut out = [0u8; 40];
        block_cipher_df(Prim::Aes192, &[], &mut out).unwrap();
        assert_eq!(
            out[..],
            hex!(
                "8e7cea3a4d24dcba588d80d049042870"
                "496148f0e1124a910d2a863673d9dd6b"
                "14dc2d0c77ec2ace"
            )[..]
        );
    }

    #[test]
    fn block_cipher_df_enforces_output_cap() {
        let mut out = [0u8; MAX_DF_OUT + 1];
        assert!(matches!(
            block_cipher_df(Prim::Aes128, &[b"x"], &mut out),
            Err(DrbgError::InvalidArgument(_))
        ));
    }

    #[test]
    fn bcc_known_answer() {
        let key: Vec<u8> = (0..16).collect();
        let iv = [0u8; 16];
        let mut out = [0u8; 16];
        bcc(Prim::Aes128, &key, &iv, &[0xff; 16], &mut out).unwrap();
        assert_eq!(out, hex!("5d727088dbe6fcb74ef241284462136c"));
    }
}
