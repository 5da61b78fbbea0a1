//! Hash-DRBG mechanism (SP 800-90A §10.1.1).
//!
//! State is a seed-length value `V` and constant `C`, both rewritten as
//! whole buffers by every update. Output is produced by hashing
//! successive increments of a working copy of `V`.

use zeroize::Zeroizing;

use crate::errors::DrbgError;
use crate::{Drbg, df, primitives, util};

/// Derive fresh `V` and `C` from the seed chain.
///
/// On reseed the old value is chained in behind a 0x01 prefix so that
/// the previous state contributes to the new one.
pub(crate) fn update(
    drbg: &mut Drbg,
    seed: &[&[u8]],
    reseed: bool,
) -> Result<(), DrbgError> {
    let seedlen = drbg.mech.seedlen;
    let prim = drbg.mech.prim;

    let mut v_new = Zeroizing::new(vec![0u8; seedlen]);
    if reseed {
        let prefix = [0x01u8];
        let mut chain1: Vec<&[u8]> = Vec::with_capacity(seed.len() + 2);
        chain1.push(&prefix);
        chain1.push(&drbg.v);
        chain1.extend_from_slice(seed);
        df::hash_df(prim, &chain1, &mut v_new)?;
    } else {
        df::hash_df(prim, seed, &mut v_new)?;
    }

    let prefix = [0x00u8];
    let mut c_new = Zeroizing::new(vec![0u8; seedlen]);
    df::hash_df(prim, &[&prefix, &v_new[..]], &mut c_new)?;

    drbg.v.copy_from_slice(&v_new);
    drbg.c.copy_from_slice(&c_new);
    Ok(())
}

pub(crate) fn generate(
    drbg: &mut Drbg,
    out: &mut [u8],
    addtl: &[u8],
) -> Result<(), DrbgError> {
    let outlen = drbg.mech.blocklen;
    let prim = drbg.mech.prim;
    let mut block = Zeroizing::new(vec![0u8; outlen]);

    // §10.1.1.4 step 2: fold additional input into V.
    if !addtl.is_empty() {
        let prefix = [0x02u8];
        primitives::hash(prim, &[&prefix, &drbg.v, addtl], &mut block)?;
        util::be_add(&mut drbg.v, &block);
    }

    // Hashgen: hash successive increments of a working copy of V.
    let mut data = Zeroizing::new(drbg.v.clone());
    let mut produced = 0;
    while produced < out.len() {
        primitives::hash(prim, &[&data[..]], &mut block)?;
        let take = (out.len() - produced).min(outlen);
        out[produced..produced + take].copy_from_slice(&block[..take]);
        produced += take;
        util::be_incr(&mut data);
    }

    // §10.1.1.4 steps 4-7:
    // V = (V + H(0x03 || V) + C + reseed_counter) mod 2^(8*seedlen).
    let prefix = [0x03u8];
    primitives::hash(prim, &[&prefix, &drbg.v], &mut block)?;
    util::be_add(&mut drbg.v, &block);
    util::be_add(&mut drbg.v, &drbg.c);
    util::be_add(&mut drbg.v, &drbg.reseed_counter.to_be_bytes());
    drbg.reseed_counter += 1;
    Ok(())
}
