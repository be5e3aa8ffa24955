// Adapters layer: in-process implementations of the capability ports.
// They simulate outages by failing a configured number of calls; none of them talks to a network or database.

pub mod memory;
pub mod scripted;

pub use memory::InMemoryAccountStore;
pub use scripted::ScriptedClient;

use std::sync::atomic::{AtomicU32, Ordering};

/// 還需要失敗幾次；每次呼叫消耗一次，降到 0 之後一律成功
#[derive(Debug, Default)]
pub(crate) struct FailureBudget {
    remaining: AtomicU32,
}

impl FailureBudget {
    pub(crate) fn new(failures: u32) -> Self {
        Self {
            remaining: AtomicU32::new(failures),
        }
    }

    /// 若這次呼叫應該失敗則回傳 `Some(剩餘次數)`
    pub(crate) fn take(&self) -> Option<u32> {
        self.remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .ok()
            .map(|before| before - 1)
    }
}
