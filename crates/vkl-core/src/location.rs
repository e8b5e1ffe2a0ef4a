use std::thread::ThreadId;

use ash::vk;

/// Identifies one API call site: the entry point and the thread it ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub function: &'static str,
    pub thread: ThreadId,
}

impl Location {
    /// A location for `function` on the calling thread.
    pub fn here(function: &'static str) -> Self {
        Self {
            function,
            thread: std::thread::current().id(),
        }
    }
}

/// Per-call record handed to every validator hook. `result` is only
/// meaningful in post-call hooks.
#[derive(Debug, Clone, Copy)]
pub struct RecordObject {
    pub location: Location,
    pub result: vk::Result,
}

impl RecordObject {
    pub fn new(function: &'static str) -> Self {
        Self {
            location: Location::here(function),
            result: vk::Result::SUCCESS,
        }
    }

    pub fn with_result(function: &'static str, result: vk::Result) -> Self {
        Self {
            location: Location::here(function),
            result,
        }
    }

    /// True for `VK_SUCCESS` and every positive status code.
    pub fn succeeded(&self) -> bool {
        self.result.as_raw() >= 0
    }

    pub fn deferred(&self) -> bool {
        self.result == vk::Result::OPERATION_DEFERRED_KHR
    }
}
