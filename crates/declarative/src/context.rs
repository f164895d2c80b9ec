//! Progress and confirmation callbacks
//!
//! These traits allow the declarative crate to be used without
//! depending on a specific terminal UI.

use crate::diff::Action;
use crate::types::{Address, ApplyResult};
use anyhow::Result;

/// Progress callback for execution operations
///
/// Implement this trait to receive progress updates during execution.
pub trait ProgressCallback {
    /// Called when a phase ("destroy" or "apply") starts
    fn on_phase_start(&mut self, phase: &str, count: usize);

    /// Called when starting work on a single instance
    fn on_instance_start(&mut self, address: &Address, action: Action);

    /// Called when work on an instance completes
    fn on_instance_complete(&mut self, address: &Address, result: &ApplyResult);

    /// Called when a phase completes
    fn on_phase_complete(&mut self);
}

/// Confirmation callback for user interaction
pub trait ConfirmCallback {
    /// Ask the user to confirm an action
    ///
    /// # Returns
    /// `true` if the user confirmed, `false` otherwise
    fn confirm(&mut self, prompt: &str) -> Result<bool>;
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_phase_start(&mut self, _phase: &str, _count: usize) {}
    fn on_instance_start(&mut self, _address: &Address, _action: Action) {}
    fn on_instance_complete(&mut self, _address: &Address, _result: &ApplyResult) {}
    fn on_phase_complete(&mut self) {}
}

/// Auto-confirm callback (always returns true)
pub struct AutoConfirm;

impl ConfirmCallback for AutoConfirm {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(true)
    }
}

/// Auto-decline callback (always returns false)
pub struct AutoDecline;

impl ConfirmCallback for AutoDecline {
    fn confirm(&mut self, _prompt: &str) -> Result<bool> {
        Ok(false)
    }
}
