use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use pvault_types::ProcessId;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// One async mutex per process, created on first use.
///
/// Serializes the read-max-then-insert sequence of version creation so two
/// saves of the same process cannot be assigned the same number.
#[derive(Debug, Default)]
pub struct ProcessLocks {
    locks: Mutex<HashMap<ProcessId, Arc<AsyncMutex<()>>>>,
}

impl ProcessLocks {
    /// An empty lock table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `process`.
    pub async fn acquire(&self, process: &ProcessId) -> OwnedMutexGuard<()> {
        self.lock_for(process).lock_owned().await
    }

    fn lock_for(&self, process: &ProcessId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(*process).or_default().clone()
    }

    /// Number of processes that have been locked at least once.
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns `true` if no process has been locked yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_process_shares_a_lock() {
        let locks = ProcessLocks::new();
        let p = ProcessId::new();

        let guard = locks.acquire(&p).await;
        assert!(locks.lock_for(&p).try_lock().is_err());
        drop(guard);
        assert!(locks.lock_for(&p).try_lock().is_ok());
        assert_eq!(locks.len(), 1);
    }

    #[tokio::test]
    async fn different_processes_do_not_block() {
        let locks = ProcessLocks::new();
        let _a = locks.acquire(&ProcessId::new()).await;
        let _b = locks.acquire(&ProcessId::new()).await;
        assert_eq!(locks.len(), 2);
    }
}
