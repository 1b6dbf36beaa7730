use std::{
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    task::Poll,
};

use futures::{future::poll_fn, task::AtomicWaker};

/// Credit handle linking a subscriber to its delivery loop.
///
/// The subscriber calls [`Subscription::request`] to grant credits; the
/// delivery loop spends one credit per item it hands over.
#[derive(Clone, Default)]
pub struct Subscription {
    inner: Arc<Demand>,
}

#[derive(Default)]
struct Demand {
    credits: AtomicU64,
    waker: AtomicWaker,
}

impl Subscription {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Grants `n` more items. Credits saturate at `u64::MAX`.
    pub fn request(&self, n: u64) {
        if n == 0 {
            return;
        }

        self.inner
            .credits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |credits| {
                Some(credits.saturating_add(n))
            })
            .unwrap_or_else(|credits| credits);

        self.inner.waker.wake();
    }

    /// Credits granted and not yet spent.
    pub fn pending(&self) -> u64 {
        self.inner.credits.load(Ordering::SeqCst)
    }

    fn try_acquire(&self) -> bool {
        self.inner
            .credits
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |credits| credits.checked_sub(1))
            .is_ok()
    }

    /// Waits for one credit and spends it.
    pub(crate) async fn acquire(&self) {
        poll_fn(|cx| {
            if self.try_acquire() {
                return Poll::Ready(());
            }

            self.inner.waker.register(cx.waker());

            if self.try_acquire() {
                Poll::Ready(())
            } else {
                Poll::Pending
            }
        })
        .await
    }
}
