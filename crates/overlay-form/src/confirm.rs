//! Blocking yes/no gate in front of destructive calls.

/// Asks the user to approve a destructive action before it is issued.
pub trait ConfirmGate: Send + Sync {
    /// Return `true` to proceed.
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F> ConfirmGate for F
where
    F: Fn(&str) -> bool + Send + Sync,
{
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}
