//! Per-page save locks.
//!
//! [`PageLocks`] hands out one async mutex per page name. A save holds the
//! locks of both the page it was opened on and its rename target for its
//! whole duration, so two saves touching the same page never interleave.
//! Guards release on drop, on every exit path.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

use nifki_core::PageName;

/// Held locks for a set of pages.
pub struct PageGuard {
    _guards: Vec<OwnedMutexGuard<()>>,
}

#[derive(Debug, Default)]
pub struct PageLocks {
    locks: DashMap<PageName, Arc<Mutex<()>>>,
}

impl PageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks every page in `pages`, waiting for current holders.
    ///
    /// Pages are locked in sorted order with duplicates removed, so two
    /// callers locking overlapping sets cannot deadlock.
    pub async fn acquire(&self, pages: &[&PageName]) -> PageGuard {
        self.prune();

        let mut ordered: Vec<&PageName> = pages.to_vec();
        ordered.sort();
        ordered.dedup();

        let mut guards = Vec::with_capacity(ordered.len());
        for page in ordered {
            let lock = self
                .locks
                .entry(page.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone();
            guards.push(lock.lock_owned().await);
        }
        PageGuard { _guards: guards }
    }

    /// Number of pages with a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Drops entries nobody holds or waits for.
    fn prune(&self) {
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn page(s: &str) -> PageName {
        PageName::parse(s).unwrap()
    }

    #[tokio::test]
    async fn same_page_is_exclusive() {
        let locks = Arc::new(PageLocks::new());
        let first = locks.acquire(&[&page("mygame")]).await;

        let waiter = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire(&[&page("mygame")]).await;
            })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(5), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn different_pages_do_not_block() {
        let locks = PageLocks::new();
        let _a = locks.acquire(&[&page("alpha")]).await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&[&page("beta")])).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn duplicate_pages_lock_once() {
        let locks = PageLocks::new();
        let p = page("mygame");
        let guard = tokio::time::timeout(Duration::from_secs(1), locks.acquire(&[&p, &p])).await;
        assert!(guard.is_ok());
    }

    #[tokio::test]
    async fn released_entries_are_pruned() {
        let locks = PageLocks::new();
        drop(locks.acquire(&[&page("alpha"), &page("beta")]).await);
        assert_eq!(locks.len(), 2);
        drop(locks.acquire(&[&page("gamma")]).await);
        assert_eq!(locks.len(), 1);
    }
}
