use core::fmt;

/// Errors reported by DRBG operations.
///
/// On any error return the generator state is left unchanged and every
/// scratch buffer touched by the failing call has been zeroized. A failed
/// `generate` writes no output bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DrbgError {
    /// An argument violated a documented bound, such as a request longer
    /// than [`MAX_REQUEST_BYTES`](crate::MAX_REQUEST_BYTES) or additional
    /// input longer than [`MAX_ADDTL_BYTES`](crate::MAX_ADDTL_BYTES).
    InvalidArgument(&'static str),
    /// No mechanism descriptor matches the given selection flags.
    UnknownMechanism(u32),
    /// The entropy source failed or returned fewer bytes than requested.
    EntropySourceFailure,
    /// A primitive adapter was invoked outside its contract.
    PrimitiveFailure(&'static str),
    /// The block cipher's block length does not match the mechanism's
    /// configured block length.
    BlockLengthMismatch { expected: usize, actual: usize },
    /// A known-answer or sanity check produced a wrong result.
    SelftestFailed(&'static str),
    /// An unrecoverable condition, such as a failed reseed after a process
    /// fork. Callers are expected to abort rather than continue without
    /// fresh randomness.
    Fatal(&'static str),
}

impl fmt::Display for DrbgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DrbgError::InvalidArgument(what) => {
                write!(f, "Invalid argument: {}", what)
            }
            DrbgError::UnknownMechanism(flags) => {
                write!(f, "No DRBG mechanism matches flags {:#010x}", flags)
            }
            DrbgError::EntropySourceFailure => {
                write!(f, "Entropy source failed to deliver requested bytes")
            }
            DrbgError::PrimitiveFailure(what) => {
                write!(f, "Primitive failure: {}", what)
            }
            DrbgError::BlockLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Cipher block length {} does not match mechanism \
                     block length {}",
                    actual, expected
                )
            }
            DrbgError::SelftestFailed(which) => {
                write!(f, "Health check failed: {}", which)
            }
            DrbgError::Fatal(what) => {
                write!(f, "Fatal DRBG failure: {}", what)
            }
        }
    }
}

impl std::error::Error for DrbgError {}
