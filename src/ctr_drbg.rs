//! CTR-DRBG mechanism with derivation function (SP 800-90A §10.2.1).
//!
//! State is an AES key (the first `keylen` bytes of the instance's `c`
//! buffer) and a block-sized counter (the first block of `v`); both
//! buffers are seed-length so the state layout and zeroization rules
//! match the other mechanisms. Seed material always passes through the
//! block-cipher derivation function before touching the state; the
//! post-generate refresh reuses the derivation output computed before
//! the keystream was produced, or all zeros when there was no additional
//! input.

use zeroize::Zeroizing;

use crate::errors::DrbgError;
use crate::primitives::BLOCK_BYTES;
use crate::{Drbg, df, primitives, util};

/// Compress the seed chain through the derivation function and fold it
/// into the state.
pub(crate) fn update_with_seed(
    drbg: &mut Drbg,
    seed: &[&[u8]],
) -> Result<(), DrbgError> {
    let mut df_out = Zeroizing::new(vec![0u8; drbg.mech.seedlen]);
    df::block_cipher_df(drbg.mech.prim, seed, &mut df_out)?;
    update_with_df_output(drbg, &df_out)
}

/// Fold already-derived seed material into the state: XOR `provided`
/// into a seed length of keystream, then split the result into the new
/// key and counter.
pub(crate) fn update_with_df_output(
    drbg: &mut Drbg,
    provided: &[u8],
) -> Result<(), DrbgError> {
    let seedlen = drbg.mech.seedlen;
    let keylen = drbg.mech.keylen();

    let mut iv = [0u8; BLOCK_BYTES];
    iv.copy_from_slice(&drbg.v[..BLOCK_BYTES]);
    util::be_incr(&mut iv);

    let blocks = seedlen.div_ceil(BLOCK_BYTES);
    let mut temp = Zeroizing::new(vec![0u8; blocks * BLOCK_BYTES]);
    primitives::ctr_keystream(
        drbg.mech.prim,
        &drbg.c[..keylen],
        &iv,
        &mut temp,
    )?;
    util::xor_into(&mut temp[..seedlen], provided);

    drbg.c[..keylen].copy_from_slice(&temp[..keylen]);
    drbg.v[..BLOCK_BYTES].copy_from_slice(&temp[keylen..keylen + BLOCK_BYTES]);
    Ok(())
}

pub(crate) fn generate(
    drbg: &mut Drbg,
    out: &mut [u8],
    addtl: &[u8],
) -> Result<(), DrbgError> {
    let seedlen = drbg.mech.seedlen;
    let keylen = drbg.mech.keylen();

    // The derivation output is kept for the post-generate refresh so the
    // expensive chaining runs once per call, not twice.
    let mut df_data = Zeroizing::new(vec![0u8; seedlen]);
    if !addtl.is_empty() {
        df::block_cipher_df(drbg.mech.prim, &[addtl], &mut df_data)?;
        update_with_df_output(drbg, &df_data)?;
    }

    // Output is the keystream over successive counter values, starting
    // one past the current V.
    let mut iv = [0u8; BLOCK_BYTES];
    iv.copy_from_slice(&drbg.v[..BLOCK_BYTES]);
    util::be_incr(&mut iv);
    primitives::ctr_keystream(drbg.mech.prim, &drbg.c[..keylen], &iv, out)?;
    let blocks = out.len().div_ceil(BLOCK_BYTES) as u64;
    util::be_add(&mut drbg.v[..BLOCK_BYTES], &blocks.to_be_bytes());

    update_with_df_output(drbg, &df_data)?;
    drbg.reseed_counter += 1;
    Ok(())
}
