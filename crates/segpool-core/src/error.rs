//! Allocation failure type.

use thiserror::Error;

/// The system adapter could not satisfy a growth or large request, and no
/// size class held a scavengeable block.
///
/// This is the only user-visible failure: partial arena carves and the
/// scavenge fallback resolve silently. `requested` is the caller's original
/// request in bytes (not the internal growth amount that failed).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of memory serving a request of {requested} bytes")]
pub struct OutOfMemory {
    /// Size of the failed request, in bytes.
    pub requested: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        let err = OutOfMemory { requested: 4096 };
        assert_eq!(
            err.to_string(),
            "out of memory serving a request of 4096 bytes"
        );
    }
}
