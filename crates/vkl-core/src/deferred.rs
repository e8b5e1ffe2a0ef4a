//! Side effects held back until a deferred host operation completes.
//!
//! A call that returns `VK_OPERATION_DEFERRED_KHR` has not finished: claims it
//! took must stay held and the objects it creates do not exist yet. The shim
//! and the validators park that work here, keyed by the deferred operation
//! handle the application sees, and it runs when the application joins the
//! operation or reads its result.

use std::collections::HashMap;

use parking_lot::Mutex;

/// Runs unconditionally once the operation completes.
pub type CompletionFn = Box<dyn FnOnce() + Send>;
/// Produces the handles the operation created, ready for the application.
pub type OutputsFn = Box<dyn FnOnce() -> Vec<u64> + Send>;
/// Runs only when the operation's terminal result is a success code.
pub type SuccessFn = Box<dyn FnOnce(&[u64]) + Send>;

/// Everything parked against one deferred operation, in call order.
#[derive(Default)]
pub struct DeferredEntry {
    on_completion: Vec<CompletionFn>,
    outputs: Vec<OutputsFn>,
    on_success: Vec<SuccessFn>,
}

impl DeferredEntry {
    /// Run the parked work. Completion closures always run; outputs are only
    /// produced, and success closures only run, when `succeeded`.
    pub fn complete(self, succeeded: bool) {
        for f in self.on_completion {
            f();
        }
        if !succeeded {
            return;
        }
        let created: Vec<u64> = self.outputs.into_iter().flat_map(|f| f()).collect();
        for f in self.on_success {
            f(&created);
        }
    }

    pub fn completion_count(&self) -> usize {
        self.on_completion.len()
    }

    pub fn success_count(&self) -> usize {
        self.on_success.len()
    }
}

/// Deferred operation handle -> parked work.
#[derive(Default)]
pub struct DeferredLedger {
    entries: Mutex<HashMap<u64, DeferredEntry>>,
}

impl DeferredLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_completion(&self, operation: u64, f: CompletionFn) {
        self.entries
            .lock()
            .entry(operation)
            .or_default()
            .on_completion
            .push(f);
    }

    pub fn on_outputs(&self, operation: u64, f: OutputsFn) {
        self.entries
            .lock()
            .entry(operation)
            .or_default()
            .outputs
            .push(f);
    }

    pub fn on_success(&self, operation: u64, f: SuccessFn) {
        self.entries
            .lock()
            .entry(operation)
            .or_default()
            .on_success
            .push(f);
    }

    /// Take the parked work for `operation`, leaving nothing behind.
    pub fn pop(&self, operation: u64) -> Option<DeferredEntry> {
        self.entries.lock().remove(&operation)
    }

    /// Pop and complete `operation` in one step. Returns false if nothing was
    /// parked against it.
    pub fn complete(&self, operation: u64, succeeded: bool) -> bool {
        // The closures may re-enter the ledger, so run them unlocked.
        let entry = self.pop(operation);
        match entry {
            Some(entry) => {
                entry.complete(succeeded);
                true
            }
            None => false,
        }
    }

    /// Drop the parked work for an operation destroyed without being joined.
    pub fn discard(&self, operation: u64) {
        if let Some(entry) = self.pop(operation) {
            tracing::debug!(
                operation = format_args!("{:#x}", operation),
                completions = entry.completion_count(),
                successes = entry.success_count(),
                "dropping work of a deferred operation that was never joined"
            );
        }
    }

    pub fn is_pending(&self, operation: u64) -> bool {
        self.entries.lock().contains_key(&operation)
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
