//! HMAC-DRBG mechanism (SP 800-90A §10.1.2).
//!
//! State is a digest-length value `V` and key `K` (stored in the
//! instance's `c` buffer). The primitive streams the chained input, so no
//! mechanism scratch beyond one digest block is needed.

use zeroize::Zeroizing;

use crate::errors::DrbgError;
use crate::{Drbg, chain, primitives};

/// Rekey `K` and advance `V` from the seed chain.
///
/// The second round with separator byte 0x01 only runs when the chain
/// carries seed material; the empty-chain update after a generate call
/// performs a single round.
pub(crate) fn update(
    drbg: &mut Drbg,
    seed: &[&[u8]],
    reseed: bool,
) -> Result<(), DrbgError> {
    let outlen = drbg.mech.blocklen;
    let prim = drbg.mech.prim;

    // §10.1.2.3 step 2: fresh instances start from K = 0x00.., V = 0x01..
    if !reseed {
        drbg.c.fill(0x00);
        drbg.v.fill(0x01);
    }

    let empty = chain::is_empty(seed);
    let mut buf = Zeroizing::new(vec![0u8; outlen]);
    for separator in [0x00u8, 0x01] {
        // K = HMAC(K, V || separator || seed)
        let sep = [separator];
        let mut segments: Vec<&[u8]> = Vec::with_capacity(seed.len() + 2);
        segments.push(&drbg.v);
        segments.push(&sep);
        segments.extend_from_slice(seed);
        primitives::hmac(prim, &drbg.c, &segments, &mut buf)?;
        drbg.c.copy_from_slice(&buf);
        // V = HMAC(K, V)
        primitives::hmac(prim, &drbg.c, &[&drbg.v], &mut buf)?;
        drbg.v.copy_from_slice(&buf);
        if empty {
            break;
        }
    }
    Ok(())
}

pub(crate) fn generate(
    drbg: &mut Drbg,
    out: &mut [u8],
    addtl: &[u8],
) -> Result<(), DrbgError> {
    let outlen = drbg.mech.blocklen;
    let prim = drbg.mech.prim;

    if !addtl.is_empty() {
        update(drbg, &[addtl], true)?;
    }

    let mut buf = Zeroizing::new(vec![0u8; outlen]);
    let mut produced = 0;
    while produced < out.len() {
        primitives::hmac(prim, &drbg.c, &[&drbg.v], &mut buf)?;
        drbg.v.copy_from_slice(&buf);
        let take = (out.len() - produced).min(outlen);
        out[produced..produced + take].copy_from_slice(&drbg.v[..take]);
        produced += take;
    }

    // §10.1.2.5 step 6: unconditional post-generate update; with empty
    // additional input this is the single-round variant.
    update(drbg, &[addtl], true)?;
    drbg.reseed_counter += 1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use hex_literal::hex;

    use super::*;
    use crate::entropy::TestEntropy;
    use crate::mechanism::{self, flags};

    fn bare_instance() -> Drbg {
        let mech = mechanism::lookup(flags::HMAC | flags::SHA256).unwrap();
        Drbg {
            mech,
            v: vec![0u8; mech.seedlen],
            c: vec![0u8; mech.seedlen],
            reseed_counter: 0,
            seeded: false,
            pred_resist: false,
            seed_owner_pid: std::process::id(),
            source: Box::new(TestEntropy::new([])),
        }
    }

    #[test]
    fn matches_rfc_6979_appendix_a_2_5() {
        // Deterministic ECDSA nonce generation for P-256/SHA-256 over the
        // message "sample" is HMAC-DRBG seeded with the private key and
        // message digest; the first 32 output bytes are the expected k.
        let x = hex!(
            "c9afa9d845ba75166b5c215767b1d693"
            "4e50c3db36e89b127b8a622b120f6721"
        );
        let h1 = hex!(
            "af2bdbe1aa9b6ec1e2ade1d694f41fc7"
            "1a831d0268e9891562113d8a62add1bf"
        );
        let mut drbg = bare_instance();
        update(&mut drbg, &[&x, &h1], false).unwrap();
        drbg.reseed_counter = 1;

        let mut k = [0u8; 32];
        generate(&mut drbg, &mut k, &[]).unwrap();
        assert_eq!(
            k,
            hex!(
                "a6e3c57dd01abe90086538398355dd4c"
                "3b17aa873382b0f24d6129493d8aad60"
            )
        );
        assert_eq!(drbg.reseed_counter, 2);
    }
}
