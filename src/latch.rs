use std::{
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Condvar, Mutex, MutexGuard, PoisonError,
    },
    task::{Context, Poll, Waker},
};

/// Countdown gate released once it has been counted down `count` times.
///
/// Threads park in [`CountDownLatch::wait`]; async code awaits
/// [`CountDownLatch::completion`]. Extra count-downs past zero are ignored.
#[derive(Clone)]
pub struct CountDownLatch {
    inner: Arc<LatchImpl>,
}

struct LatchImpl {
    count: AtomicUsize,
    wakers: Mutex<Vec<Waker>>,
    released: Condvar,
}

impl CountDownLatch {
    pub fn new(count: usize) -> Self {
        CountDownLatch {
            inner: Arc::new(LatchImpl {
                count: AtomicUsize::new(count),
                wakers: Mutex::new(vec![]),
                released: Condvar::new(),
            }),
        }
    }

    pub fn count(&self) -> usize {
        self.inner.count.load(Ordering::SeqCst)
    }

    pub fn count_down(&self) {
        let previous = self
            .inner
            .count
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |count| count.checked_sub(1));

        if previous == Ok(1) {
            // Waiters check the count under this lock, so none can miss the release.
            let wakers = std::mem::take(&mut *self.inner.lock());
            self.inner.released.notify_all();

            for waker in wakers {
                waker.wake();
            }
        }
    }

    /// Blocks the calling thread until the count reaches zero.
    pub fn wait(&self) {
        let mut guard = self.inner.lock();
        while self.count() > 0 {
            guard = self
                .inner
                .released
                .wait(guard)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Future resolving once the count reaches zero.
    pub fn completion(&self) -> Completion {
        Completion {
            inner: self.inner.clone(),
        }
    }
}

impl LatchImpl {
    fn lock(&self) -> MutexGuard<'_, Vec<Waker>> {
        self.wakers.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

pub struct Completion {
    inner: Arc<LatchImpl>,
}

impl Future for Completion {
    type Output = ();

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.inner.count.load(Ordering::SeqCst) == 0 {
            return Poll::Ready(());
        }

        let mut wakers = self.inner.lock();
        if self.inner.count.load(Ordering::SeqCst) == 0 {
            return Poll::Ready(());
        }

        if !wakers.iter().any(|w| w.will_wake(cx.waker())) {
            wakers.push(cx.waker().clone());
        }

        Poll::Pending
    }
}
