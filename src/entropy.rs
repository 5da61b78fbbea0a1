//! Entropy gateway.
//!
//! The generator pulls seed material through the [`EntropySource`] trait:
//! the operating system's randomness for production use, or a
//! deterministic queue of injected chunks for the known-answer health
//! checks and tests. Callers hold the instance (or the process-global
//! mutex) for the whole pull, so a source never sees concurrent calls.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zeroize::Zeroize;

use crate::errors::DrbgError;

/// A source of seed entropy.
pub trait EntropySource {
    /// Fill `dest` completely with entropy, or report
    /// [`DrbgError::EntropySourceFailure`]. Partial fills are not
    /// permitted.
    fn gather(&mut self, dest: &mut [u8]) -> Result<(), DrbgError>;
}

/// Entropy from the operating system.
#[derive(Clone, Copy, Debug, Default)]
pub struct OsEntropy;

impl EntropySource for OsEntropy {
    fn gather(&mut self, dest: &mut [u8]) -> Result<(), DrbgError> {
        getrandom::getrandom(dest)
            .map_err(|_| DrbgError::EntropySourceFailure)
    }
}

/// Deterministic entropy for known-answer tests.
///
/// Each pull consumes one queued chunk. A chunk shorter than the request
/// is an error; bytes beyond the requested length are ignored. An
/// exhausted queue, or a source constructed with [`TestEntropy::failing`],
/// reports [`DrbgError::EntropySourceFailure`]. Every pull is counted,
/// including failed ones, so tests can observe how often the generator
/// reaches for fresh entropy.
pub struct TestEntropy {
    chunks: VecDeque<Vec<u8>>,
    fail: bool,
    pulls: Arc<AtomicUsize>,
}

impl TestEntropy {
    /// Source answering successive pulls from `chunks`, in order.
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().collect(),
            fail: false,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Source that fails every pull.
    pub fn failing() -> Self {
        Self {
            chunks: VecDeque::new(),
            fail: true,
            pulls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Share a pull counter with the caller; it is incremented on every
    /// `gather`, successful or not.
    pub fn with_pull_counter<I>(chunks: I, pulls: Arc<AtomicUsize>) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        Self {
            chunks: chunks.into_iter().collect(),
            fail: false,
            pulls,
        }
    }
}

impl EntropySource for TestEntropy {
    fn gather(&mut self, dest: &mut [u8]) -> Result<(), DrbgError> {
        self.pulls.fetch_add(1, Ordering::Relaxed);
        if self.fail {
            return Err(DrbgError::EntropySourceFailure);
        }
        let mut chunk = self
            .chunks
            .pop_front()
            .ok_or(DrbgError::EntropySourceFailure)?;
        if chunk.len() < dest.len() {
            chunk.zeroize();
            return Err(DrbgError::EntropySourceFailure);
        }
        dest.copy_from_slice(&chunk[..dest.len()]);
        chunk.zeroize();
        Ok(())
    }
}

impl Drop for TestEntropy {
    fn drop(&mut self) {
        for chunk in &mut self.chunks {
            chunk.zeroize();
        }
    }
}
