//! A Rust implementation of the NIST SP 800-90A Deterministic Random Bit
//! Generators.
//!
//! Provides the three mechanisms of the standard behind one instance
//! type: Hash-DRBG, HMAC-DRBG, and CTR-DRBG with derivation function,
//! over SHA-1/256/384/512 and AES-128/192/256. The generator seeds
//! itself from an entropy source, reseeds on demand or on every call
//! when prediction resistance is selected, mixes in personalization
//! strings and per-request additional input, and detects process forks.
//!
//! # Features
//! - All eleven mechanism and primitive combinations of SP 800-90A
//!   Table 3, selected by flag bits.
//! - Reseeding, prediction resistance, personalization strings, and
//!   additional input.
//! - Request and additional-input bounds enforcement, reseed-interval
//!   expiry, and fork detection.
//! - Known-answer and sanity health checks, run before the
//!   process-global instance produces any output.
//! - Implements `RngCore` for compatibility with the Rust random
//!   ecosystem.
//! - Secure memory zeroization on drop and on error paths.
//!
//! # Example
//! ```
//! use sp800_drbg::{Drbg, TestEntropy, flags};
//!
//! // Entropy is injected here so the example is deterministic; use
//! // `Drbg::new` to seed from the operating system instead.
//! let source = TestEntropy::new([vec![0x2a; 48]]);
//! let mut drbg = Drbg::with_entropy_source(
//!     flags::HMAC | flags::SHA256,
//!     b"app fingerprint",
//!     Box::new(source),
//! )
//! .expect("Should instantiate the generator");
//!
//! let mut buf = [0u8; 16];
//! drbg.generate(&mut buf, b"").expect("Should produce output");
//! assert_eq!(
//!     buf,
//!     [
//!         0x27, 0x7b, 0x74, 0x0c, 0x72, 0xf4, 0xa6, 0x68,
//!         0xb8, 0x6b, 0x60, 0x26, 0x49, 0x9f, 0xa6, 0x16,
//!     ]
//! );
//! ```

mod chain;
mod ctr_drbg;
mod df;
mod entropy;
mod errors;
pub mod global;
mod hash_drbg;
mod hmac_drbg;
mod mechanism;
mod primitives;
mod selftest;
mod util;

pub use entropy::{EntropySource, OsEntropy, TestEntropy};
pub use errors::DrbgError;
pub use mechanism::flags;
use mechanism::{Kind, Mechanism};
use rand_core::RngCore;
use zeroize::{Zeroize, Zeroizing};

/// Largest number of bytes a single `generate` call may request.
pub const MAX_REQUEST_BYTES: usize = 1 << 16;

/// Largest accepted length for additional input and personalization
/// strings.
pub const MAX_ADDTL_BYTES: usize = if usize::BITS >= 64 {
    1 << 35
} else {
    usize::MAX - 1
};

/// Number of generate requests after which the instance must reseed.
pub const MAX_RESEED_INTERVAL: u64 = 1 << 48;

/// An SP 800-90A deterministic random bit generator instance.
///
/// Created by [`Drbg::new`] (seeded from the operating system) or
/// [`Drbg::with_entropy_source`]. The mechanism and primitive are
/// selected with [`flags`] bits, for example
/// `flags::CTR | flags::SYM256` or
/// `flags::HASH | flags::SHA512 | flags::PREDICTION_RESIST`.
///
/// All methods take `&mut self`; the instance contains no interior
/// locking. A process-global instance behind a mutex is available in
/// the [`global`] module.
///
/// # Security Considerations
/// A generate call never returns partial output: either the whole
/// request is written or an error is returned and the buffer is
/// untouched. When the reseed interval expires, or the process id no
/// longer matches the one captured at seeding time (a fork), the
/// instance reseeds before producing output; a failed fork reseed is
/// [`DrbgError::Fatal`]. State buffers are zeroized on drop.
pub struct Drbg {
    pub(crate) mech: &'static Mechanism,
    /// Internal value/counter buffer, `seedlen` bytes.
    pub(crate) v: Vec<u8>,
    /// Constant (Hash), HMAC key, or cipher key plus padding (CTR),
    /// `seedlen` bytes.
    pub(crate) c: Vec<u8>,
    pub(crate) reseed_counter: u64,
    pub(crate) seeded: bool,
    pub(crate) pred_resist: bool,
    pub(crate) seed_owner_pid: u32,
    pub(crate) source: Box<dyn EntropySource + Send>,
}

impl Drbg {
    /// Instantiate a generator seeded from the operating system.
    ///
    /// # Arguments
    /// - `flags` - Mechanism selection bits, see [`flags`].
    /// - `personalization` - Caller-specific bytes mixed into the first
    ///   seed; may be empty.
    pub fn new(
        flags: u32,
        personalization: &[u8],
    ) -> Result<Self, DrbgError> {
        Self::with_entropy_source(
            flags,
            personalization,
            Box::new(OsEntropy),
        )
    }

    /// Instantiate a generator pulling seed material from `source`.
    ///
    /// The first seed pulls one and a half times the mechanism's
    /// security strength, covering both the entropy input and the nonce
    /// of the standard in a single request.
    pub fn with_entropy_source(
        flags: u32,
        personalization: &[u8],
        source: Box<dyn EntropySource + Send>,
    ) -> Result<Self, DrbgError> {
        let mech = mechanism::lookup(flags)?;
        if personalization.len() > MAX_ADDTL_BYTES {
            return Err(DrbgError::InvalidArgument(
                "personalization string exceeds the additional-input bound",
            ));
        }
        let mut drbg = Drbg {
            mech,
            v: vec![0u8; mech.seedlen],
            c: vec![0u8; mech.seedlen],
            reseed_counter: 0,
            seeded: false,
            pred_resist: flags & self::flags::PREDICTION_RESIST != 0,
            seed_owner_pid: 0,
            source,
        };
        // A failed first seed drops the zero-filled instance; nothing to
        // clean up beyond the zeroization performed on drop.
        drbg.seed(personalization, false)?;
        Ok(drbg)
    }

    /// Reseed from the entropy source, mixing in `addtl`.
    pub fn reseed(&mut self, addtl: &[u8]) -> Result<(), DrbgError> {
        if addtl.len() > MAX_ADDTL_BYTES {
            return Err(DrbgError::InvalidArgument(
                "additional input exceeds the documented bound",
            ));
        }
        self.seed(addtl, true)
    }

    /// Produce `out.len()` bytes, mixing `addtl` into the state first.
    ///
    /// A request longer than [`MAX_REQUEST_BYTES`] is rejected; use
    /// [`Drbg::generate_long`] for larger buffers. An empty request
    /// returns immediately without touching the state.
    pub fn generate(
        &mut self,
        out: &mut [u8],
        addtl: &[u8],
    ) -> Result<(), DrbgError> {
        if out.is_empty() {
            return Ok(());
        }
        check_request(out.len(), addtl.len())?;

        // §9.3.1: a spent reseed counter invalidates the seed.
        if self.reseed_counter > MAX_RESEED_INTERVAL {
            self.seeded = false;
        }
        // A forked child must not continue the parent's output stream.
        let forked = self.seed_owner_pid != std::process::id();
        if forked {
            self.seeded = false;
        }

        let mut addtl = addtl;
        if self.pred_resist || !self.seeded {
            let reseed_addtl: &[u8] = if forked { &[] } else { addtl };
            self.seed(reseed_addtl, true).map_err(|err| {
                if forked {
                    DrbgError::Fatal("reseed after process fork failed")
                } else {
                    err
                }
            })?;
            // Already mixed in by the reseed.
            addtl = &[];
        }

        match self.mech.kind {
            Kind::Hash => hash_drbg::generate(self, out, addtl),
            Kind::Hmac => hmac_drbg::generate(self, out, addtl),
            Kind::Ctr => ctr_drbg::generate(self, out, addtl),
        }
    }

    /// Produce an output of arbitrary length by chaining `generate`
    /// calls in chunks of [`MAX_REQUEST_BYTES`]. `addtl` is mixed into
    /// every chunk.
    pub fn generate_long(
        &mut self,
        out: &mut [u8],
        addtl: &[u8],
    ) -> Result<(), DrbgError> {
        for chunk in out.chunks_mut(MAX_REQUEST_BYTES) {
            self.generate(chunk, addtl)?;
        }
        Ok(())
    }

    /// Destroy the instance, zeroizing all internal state.
    ///
    /// Dropping the instance has the same effect; this method only makes
    /// the teardown explicit at call sites.
    pub fn uninstantiate(mut self) {
        self.wipe();
    }

    /// Selection flags of this instance, including the prediction
    /// resistance bit.
    pub fn flags(&self) -> u32 {
        let pr = if self.pred_resist {
            self::flags::PREDICTION_RESIST
        } else {
            0
        };
        self.mech.flags | pr
    }

    /// Human-readable mechanism name, e.g. `"HMAC SHA-256"`.
    pub fn mechanism_name(&self) -> &'static str {
        self.mech.name
    }

    /// Number of generate requests since the last (re)seed, starting
    /// at 1.
    pub fn reseed_count(&self) -> u64 {
        self.reseed_counter
    }

    /// True once the instance holds a valid seed.
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Pull entropy and run the mechanism update. The initial seed
    /// requests entropy plus nonce in one pull; reseeds request the bare
    /// security strength.
    fn seed(&mut self, addtl: &[u8], reseed: bool) -> Result<(), DrbgError> {
        let strength = self.mech.strength();
        let len = if reseed {
            strength
        } else {
            (strength * 3).div_ceil(2)
        };
        let mut entropy = Zeroizing::new(vec![0u8; len]);
        self.source.gather(&mut entropy)?;

        let seed_material: [&[u8]; 2] = [&entropy[..], addtl];
        match self.mech.kind {
            Kind::Hash => hash_drbg::update(self, &seed_material, reseed)?,
            Kind::Hmac => hmac_drbg::update(self, &seed_material, reseed)?,
            Kind::Ctr => ctr_drbg::update_with_seed(self, &seed_material)?,
        }
        self.seeded = true;
        self.reseed_counter = 1;
        self.seed_owner_pid = std::process::id();
        Ok(())
    }

    fn wipe(&mut self) {
        self.v.zeroize();
        self.c.zeroize();
        self.seeded = false;
        self.reseed_counter = 0;
    }
}

/// Bounds check shared by `generate` and the sanity harness.
pub(crate) fn check_request(
    len: usize,
    addtl_len: usize,
) -> Result<(), DrbgError> {
    if len > MAX_REQUEST_BYTES {
        return Err(DrbgError::InvalidArgument(
            "requested length exceeds the per-call maximum",
        ));
    }
    if addtl_len > MAX_ADDTL_BYTES {
        return Err(DrbgError::InvalidArgument(
            "additional input exceeds the documented bound",
        ));
    }
    Ok(())
}

impl RngCore for Drbg {
    /// Return the next random `u32`, decoded big-endian from the output
    /// stream.
    ///
    /// # Panics
    /// Panics when generation fails; see [`RngCore::fill_bytes`].
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    /// Return the next random `u64`, decoded big-endian from the output
    /// stream.
    ///
    /// # Panics
    /// Panics when generation fails; see [`RngCore::fill_bytes`].
    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }

    /// Fills a destination buffer with random bytes.
    ///
    /// # Panics
    /// The `RngCore` contract is infallible, so an entropy-source
    /// failure during a required reseed, or any other generator error,
    /// panics. Use [`Drbg::generate`] to handle failures instead.
    fn fill_bytes(&mut self, dst: &mut [u8]) {
        if let Err(err) = self.generate_long(dst, &[]) {
            panic!("DRBG generation failed: {err}");
        }
    }
}

impl Drop for Drbg {
    fn drop(&mut self) {
        self.wipe();
    }
}
