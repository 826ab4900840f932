//! Explicit access policy for cache operations.
//!
//! Each handler consults this table directly instead of relying on
//! declarative route attributes; whether reads require the token is a
//! deployment decision, everything that mutates or enumerates the
//! cache always does.

/// The externally visible cache operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// `GET /{key}` — retrieve artifact bytes.
    Retrieve,
    /// `HEAD /{key}` — existence check.
    Exists,
    /// `GET /` — enumerate keys.
    List,
    /// `PUT /{key}` — store or overwrite.
    Store,
    /// `DELETE /{key}` — remove.
    Delete,
}

/// Maps each operation to privileged or public.
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
    /// Whether retrieval and existence checks skip authentication.
    pub public_reads: bool,
}

impl AccessPolicy {
    /// Whether the given operation requires a valid credential.
    #[must_use]
    pub const fn is_privileged(&self, operation: Operation) -> bool {
        match operation {
            Operation::Retrieve | Operation::Exists => !self.public_reads,
            Operation::List | Operation::Store | Operation::Delete => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutations_and_listing_are_always_privileged() {
        for policy in [AccessPolicy { public_reads: true }, AccessPolicy { public_reads: false }] {
            assert!(policy.is_privileged(Operation::Store));
            assert!(policy.is_privileged(Operation::Delete));
            assert!(policy.is_privileged(Operation::List));
        }
    }

    #[test]
    fn read_privilege_follows_the_toggle() {
        let open = AccessPolicy { public_reads: true };
        assert!(!open.is_privileged(Operation::Retrieve));
        assert!(!open.is_privileged(Operation::Exists));

        let closed = AccessPolicy { public_reads: false };
        assert!(closed.is_privileged(Operation::Retrieve));
        assert!(closed.is_privileged(Operation::Exists));
    }
}
