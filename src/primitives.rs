//! Primitive adapters.
//!
//! Thin dispatch from a [`Prim`] identifier to the hash, HMAC, and AES
//! implementations, consuming input as a byte-string chain. The match on
//! the key length for the counter-mode keystream follows the usual
//! RustCrypto pattern of selecting the cipher variant at the call site.

use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockEncrypt, KeyInit};
use aes::{Aes128, Aes192, Aes256};
use ctr::Ctr128BE;
use ctr::cipher::{KeyIvInit, StreamCipher};
use digest::Digest;
use digest::core_api::BlockSizeUser;
use hmac::{Mac, SimpleHmac};
use sha1::Sha1;
use sha2::{Sha256, Sha384, Sha512};

use crate::errors::DrbgError;
use crate::mechanism::Prim;

/// AES block size; the only block length the CTR mechanisms support.
pub(crate) const BLOCK_BYTES: usize = 16;

/// Hash the chain into `out`. `out` must be exactly one digest long.
pub(crate) fn hash(
    prim: Prim,
    segments: &[&[u8]],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    match prim {
        Prim::Sha1 => digest_into::<Sha1>(segments, out),
        Prim::Sha256 => digest_into::<Sha256>(segments, out),
        Prim::Sha384 => digest_into::<Sha384>(segments, out),
        Prim::Sha512 => digest_into::<Sha512>(segments, out),
        _ => {
            return Err(DrbgError::PrimitiveFailure(
                "hash invoked with a block-cipher primitive",
            ));
        }
    }
    Ok(())
}

/// MAC the chain under `key` into `out`. `out` must be exactly one digest
/// long; the key may be any length up to the mechanism seed length.
pub(crate) fn hmac(
    prim: Prim,
    key: &[u8],
    segments: &[&[u8]],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    match prim {
        Prim::Sha1 => hmac_into::<Sha1>(key, segments, out),
        Prim::Sha256 => hmac_into::<Sha256>(key, segments, out),
        Prim::Sha384 => hmac_into::<Sha384>(key, segments, out),
        Prim::Sha512 => hmac_into::<Sha512>(key, segments, out),
        _ => {
            return Err(DrbgError::PrimitiveFailure(
                "HMAC invoked with a block-cipher primitive",
            ));
        }
    }
    Ok(())
}

/// Encrypt a single block in place with AES in ECB mode.
pub(crate) fn block_encrypt(
    prim: Prim,
    key: &[u8],
    block: &mut [u8],
) -> Result<(), DrbgError> {
    if block.len() != BLOCK_BYTES {
        return Err(DrbgError::BlockLengthMismatch {
            expected: BLOCK_BYTES,
            actual: block.len(),
        });
    }
    let block = GenericArray::from_mut_slice(block);
    match prim {
        Prim::Aes128 => Aes128::new_from_slice(key)
            .map_err(|_| DrbgError::PrimitiveFailure("AES-128 key length"))?
            .encrypt_block(block),
        Prim::Aes192 => Aes192::new_from_slice(key)
            .map_err(|_| DrbgError::PrimitiveFailure("AES-192 key length"))?
            .encrypt_block(block),
        Prim::Aes256 => Aes256::new_from_slice(key)
            .map_err(|_| DrbgError::PrimitiveFailure("AES-256 key length"))?
            .encrypt_block(block),
        _ => {
            return Err(DrbgError::PrimitiveFailure(
                "block encryption invoked with a hash primitive",
            ));
        }
    }
    Ok(())
}

/// Fill `out` with the AES-CTR keystream starting at counter block `iv`.
///
/// Equivalent to encrypting successive counter values `iv`, `iv + 1`, …
/// in ECB and concatenating the blocks, which is exactly the generate and
/// update block production of the counter mechanism.
pub(crate) fn ctr_keystream(
    prim: Prim,
    key: &[u8],
    iv: &[u8; BLOCK_BYTES],
    out: &mut [u8],
) -> Result<(), DrbgError> {
    out.fill(0);
    match prim {
        Prim::Aes128 => {
            let mut cipher = Ctr128BE::<Aes128>::new_from_slices(key, iv)
                .map_err(|_| {
                    DrbgError::PrimitiveFailure("AES-128 key length")
                })?;
            cipher.apply_keystream(out);
        }
        Prim::Aes192 => {
            let mut cipher = Ctr128BE::<Aes192>::new_from_slices(key, iv)
                .map_err(|_| {
                    DrbgError::PrimitiveFailure("AES-192 key length")
                })?;
            cipher.apply_keystream(out);
        }
        Prim::Aes256 => {
            let mut cipher = Ctr128BE::<Aes256>::new_from_slices(key, iv)
                .map_err(|_| {
                    DrbgError::PrimitiveFailure("AES-256 key length")
                })?;
            cipher.apply_keystream(out);
        }
        _ => {
            return Err(DrbgError::PrimitiveFailure(
                "keystream invoked with a hash primitive",
            ));
        }
    }
    Ok(())
}

fn digest_into<D: Digest>(segments: &[&[u8]], out: &mut [u8]) {
    let mut hasher = D::new();
    for seg in segments {
        hasher.update(seg);
    }
    out.copy_from_slice(&hasher.finalize());
}

fn hmac_into<D>(key: &[u8], segments: &[&[u8]], out: &mut [u8])
where
    D: Digest + BlockSizeUser,
{
    let mut mac = <SimpleHmac<D> as KeyInit>::new_from_slice(key)
        .expect("HMAC accepts keys of any length");
    for seg in segments {
        Mac::update(&mut mac, seg);
    }
    out.copy_from_slice(&mac.finalize().into_bytes());
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;

    #[test]
    fn hash_spans_segment_boundaries() {
        // SHA-256("abc"), split across segments.
        let mut joined = [0u8; 32];
        hash(Prim::Sha256, &[b"a", b"", b"bc"], &mut joined).unwrap();
        let mut whole = [0u8; 32];
        hash(Prim::Sha256, &[b"abc"], &mut whole).unwrap();
        assert_eq!(joined, whole);
        assert_eq!(
            joined,
            hex!(
                "ba7816bf8f01cfea414140de5dae2223"
                "b00361a396177a9cb410ff61f20015ad"
            )
        );
    }

    #[test]
    fn hmac_matches_rfc_4231_case_1() {
        let key = [0x0b; 20];
        let mut out = [0u8; 32];
        hmac(Prim::Sha256, &key, &[b"Hi", b" ", b"There"], &mut out).unwrap();
        assert_eq!(
            out,
            hex!(
                "b0344c61d8db38535ca8afceaf0bf12b"
                "881dc200c9833da726e9376c2e32cff7"
            )
        );
    }

    #[test]
    fn aes128_matches_fips_197() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let mut block = hex!("00112233445566778899aabbccddeeff");
        block_encrypt(Prim::Aes128, &key, &mut block).unwrap();
        assert_eq!(block, hex!("69c4e0d86a7b0430d8cdb78070b4c55a"));
    }

    #[test]
    fn keystream_is_ecb_over_successive_counters() {
        let key = hex!("000102030405060708090a0b0c0d0e0f");
        let iv = [0u8; 16];
        let mut stream = [0u8; 32];
        ctr_keystream(Prim::Aes128, &key, &iv, &mut stream).unwrap();

        let mut first = [0u8; 16];
        block_encrypt(Prim::Aes128, &key, &mut first).unwrap();
        assert_eq!(&stream[..16], &first);

        let mut second = [0u8; 16];
        second[15] = 1;
        block_encrypt(Prim::Aes128, &key, &mut second).unwrap();
        assert_eq!(&stream[16..], &second);
    }

    #[test]
    fn wrong_block_length_is_reported() {
        let key = [0u8; 16];
        let mut short = [0u8; 8];
        assert_eq!(
            block_encrypt(Prim::Aes128, &key, &mut short),
            Err(DrbgError::BlockLengthMismatch { expected: 16, actual: 8 })
        );
    }

    #[test]
    fn family_mismatch_is_reported() {
        let mut out = [0u8; 32];
        assert!(matches!(
            hash(Prim::Aes128, &[b"x"], &mut out),
            Err(DrbgError::PrimitiveFailure(_))
        ));
        assert!(matches!(
            block_encrypt(Prim::Sha256, &[0u8; 16], &mut [0u8; 16]),
            Err(DrbgError::PrimitiveFailure(_))
        ));
    }
}
