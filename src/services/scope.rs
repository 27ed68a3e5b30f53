use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use futures::future::{AbortHandle, Abortable};
use parking_lot::Mutex;

use crate::error::AppError;

/// Owns every async operation started by one page instance. Cancelling the
/// scope (or dropping it on teardown) aborts them all, and any result that
/// was still pending is discarded.
#[derive(Debug, Default)]
pub struct PageScope {
    cancelled: AtomicBool,
    next_id: AtomicU64,
    handles: Mutex<HashMap<u64, AbortHandle>>,
}

/// Unregisters a task's abort handle once the task resolves or is dropped.
struct Registered<'a> {
    scope: &'a PageScope,
    id: u64,
}

impl Drop for Registered<'_> {
    fn drop(&mut self) {
        self.scope.handles.lock().remove(&self.id);
    }
}

impl PageScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Tasks started through this scope that have not resolved yet.
    pub fn pending(&self) -> usize {
        self.handles.lock().len()
    }

    pub fn cancel(&self) {
        if self.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }

        let handles = std::mem::take(&mut *self.handles.lock());
        tracing::debug!("Cancelling page scope with {} task(s)", handles.len());
        for handle in handles.into_values() {
            handle.abort();
        }
    }

    pub async fn run<F>(&self, fut: F) -> Result<F::Output, AppError>
    where
        F: Future,
    {
        let (handle, registration) = AbortHandle::new_pair();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        {
            let mut handles = self.handles.lock();
            if self.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            handles.insert(id, handle);
        }
        let _registered = Registered { scope: self, id };

        Abortable::new(fut, registration)
            .await
            .map_err(|_| AppError::Cancelled)
    }

    /// Yields to the runtime once before starting `fut`, so a teardown that
    /// races with mount wins without the request ever being sent.
    pub async fn defer<F>(&self, fut: F) -> Result<F::Output, AppError>
    where
        F: Future,
    {
        tokio::task::yield_now().await;
        self.run(fut).await
    }
}

impl Drop for PageScope {
    fn drop(&mut self) {
        self.cancel();
    }
}
