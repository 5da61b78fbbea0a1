//! Process-global generator.
//!
//! One instance lives behind a single exclusive mutex; every entry point
//! holds the lock for the entire call, including the entropy pull of a
//! reseed, so callers observe each other's completed updates and the
//! entropy source never runs concurrently. The health check runs once
//! before the instance produces any output; its failure is sticky and
//! turns every subsequent call into [`DrbgError::Fatal`].

use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::errors::DrbgError;
use crate::mechanism::flags;
use crate::{Drbg, selftest};

static INSTANCE: Mutex<Option<Drbg>> = Mutex::new(None);
static HEALTH: OnceLock<Result<(), DrbgError>> = OnceLock::new();

fn lock() -> MutexGuard<'static, Option<Drbg>> {
    // A panic while holding the lock leaves no torn state behind: every
    // mutation either completes or is rolled back before unwinding.
    INSTANCE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run the health check once and refuse all service after a failure.
fn checked() -> Result<(), DrbgError> {
    match HEALTH.get_or_init(selftest::run) {
        Ok(()) => Ok(()),
        Err(_) => Err(DrbgError::Fatal(
            "health check failed; generator disabled",
        )),
    }
}

/// One-shot initialization.
///
/// Always runs the health check (once per process). With `full`, also
/// instantiates the default mechanism (HMAC SHA-256 without prediction
/// resistance) if no instance exists yet.
pub fn init(full: bool) -> Result<(), DrbgError> {
    checked()?;
    if full {
        let mut guard = lock();
        if guard.is_none() {
            *guard = Some(Drbg::new(flags::DEFAULT, &[])?);
        }
    }
    Ok(())
}

/// Replace the global instance with one using the mechanism selected by
/// `flags_value`, seeded with `personalization`.
///
/// Passing `flags_value == 0` retains the previous selection (or the
/// default when nothing was instantiated yet). The old instance is
/// destroyed, and zeroized, before the replacement seeds.
pub fn reinit(
    flags_value: u32,
    personalization: &[u8],
) -> Result<(), DrbgError> {
    checked()?;
    let mut guard = lock();
    let selected = if flags_value == 0 {
        guard.as_ref().map_or(flags::DEFAULT, Drbg::flags)
    } else {
        flags_value
    };
    *guard = None;
    *guard = Some(Drbg::new(selected, personalization)?);
    Ok(())
}

/// Fill `out` with random bytes from the global instance, instantiating
/// the default mechanism on first use. Requests of any length are
/// served; chunking is handled internally.
pub fn randomize(out: &mut [u8]) -> Result<(), DrbgError> {
    randomize_with(out, &[])
}

/// Like [`randomize`], mixing `addtl` into every generated chunk.
pub fn randomize_with(
    out: &mut [u8],
    addtl: &[u8],
) -> Result<(), DrbgError> {
    checked()?;
    let mut guard = lock();
    if guard.is_none() {
        *guard = Some(Drbg::new(flags::DEFAULT, &[])?);
    }
    let drbg = guard.as_mut().expect("instance was just installed");
    drbg.generate_long(out, addtl)
}

/// Reseed the global instance, mixing in caller-provided bytes as
/// additional input. Fresh entropy is still pulled from the source; the
/// caller's bytes only ever add to it.
pub fn add_bytes(data: &[u8]) -> Result<(), DrbgError> {
    checked()?;
    let mut guard = lock();
    if guard.is_none() {
        *guard = Some(Drbg::new(flags::DEFAULT, &[])?);
    }
    let drbg = guard.as_mut().expect("instance was just installed");
    drbg.reseed(data)
}

/// Re-run the full health check, reporting the first failing vector or
/// sanity check. Independent of the sticky result consulted by the
/// other entry points.
pub fn selftest() -> Result<(), DrbgError> {
    crate::selftest::run()
}

/// Destroy the global instance, zeroizing its state. The next use
/// re-instantiates lazily.
pub fn shutdown() {
    *lock() = None;
}
