use std::{
    panic::{self, AssertUnwindSafe},
    sync::{Mutex, MutexGuard, PoisonError},
    thread,
};

use futures::{
    channel::mpsc::{self, UnboundedReceiver, UnboundedSender},
    executor::{self, ThreadPool},
    StreamExt,
};

use crate::{
    error::{Abort, PublishError},
    subscriber::{Subscriber, Subscription},
};

use super::Publisher;

/// Broadcast channel: every submitted item reaches every attached subscriber.
///
/// Each subscriber owns an unbounded queue and a delivery loop. The loop calls
/// `on_subscribe` first, then hands over one queued item per credit granted
/// through the [`Subscription`], then `on_complete` once the channel is closed
/// and the queue drained. A callback returning `Err` or panicking ends the
/// loop through `on_error`.
///
/// By default every delivery loop gets a thread of its own, so a subscriber
/// blocking in a callback never holds up another one. With
/// [`Broadcast::with_executor`] the loops share a pool instead; a pool with
/// fewer threads than blocking subscribers runs them one after another.
///
/// `submit` and `close` never wait for subscribers.
pub struct Broadcast<T> {
    inner: Mutex<BroadcastImpl<T>>,
    executor: Option<ThreadPool>,
}

struct BroadcastImpl<T> {
    senders: Vec<UnboundedSender<T>>,
    next_id: usize,
    closed: bool,
}

impl<T> Broadcast<T>
where
    T: Clone + Send + 'static,
{
    /// Broadcast running each delivery loop on a dedicated thread.
    pub fn new() -> Self {
        Self::create(None)
    }

    /// Broadcast running the delivery loops on `executor`.
    pub fn with_executor(executor: ThreadPool) -> Self {
        Self::create(Some(executor))
    }

    fn create(executor: Option<ThreadPool>) -> Self {
        Broadcast {
            inner: Mutex::new(BroadcastImpl {
                senders: vec![],
                next_id: 0,
                closed: false,
            }),
            executor,
        }
    }

    /// Queues `item` for every live subscriber and returns how many it reached.
    ///
    /// Subscribers whose delivery loop has ended are dropped here.
    pub fn submit(&self, item: T) -> Result<usize, PublishError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(PublishError::Closed);
        }

        inner
            .senders
            .retain(|sender| sender.unbounded_send(item.clone()).is_ok());

        Ok(inner.senders.len())
    }
}

impl<T> Default for Broadcast<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Broadcast<T> {
    /// Stops accepting items. Queued items are still delivered.
    pub fn close(&self) {
        let mut inner = self.lock();
        if inner.closed {
            return;
        }

        inner.closed = true;
        for sender in inner.senders.drain(..) {
            sender.close_channel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Subscribers still attached, as of the last submit.
    pub fn subscriber_count(&self) -> usize {
        self.lock().senders.len()
    }

    fn lock(&self) -> MutexGuard<'_, BroadcastImpl<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Publisher for Broadcast<T>
where
    T: Clone + Send + 'static,
{
    type Item = T;

    /// Subscribing to a closed channel still runs `on_subscribe`, followed
    /// directly by `on_complete`.
    ///
    /// Fails with [`PublishError::Executor`] when no thread can be started for
    /// the delivery loop.
    fn subscribe<S>(&self, subscriber: S) -> Result<(), PublishError>
    where
        S: Subscriber<T>,
    {
        let (sender, receiver) = mpsc::unbounded();

        let id = {
            let mut inner = self.lock();
            let id = inner.next_id;
            inner.next_id += 1;
            id
        };

        let delivery = deliver(id, subscriber, Subscription::new(), receiver);
        match &self.executor {
            Some(executor) => executor.spawn_ok(delivery),
            None => {
                thread::Builder::new()
                    .name(format!("futures-flow-{}", id))
                    .spawn(move || executor::block_on(delivery))?;
            }
        }

        let mut inner = self.lock();
        if inner.closed {
            sender.close_channel();
        } else {
            inner.senders.push(sender);
        }

        Ok(())
    }
}

impl<T> Drop for Broadcast<T> {
    fn drop(&mut self) {
        self.close();
    }
}

async fn deliver<T, S>(
    id: usize,
    mut subscriber: S,
    subscription: Subscription,
    mut items: UnboundedReceiver<T>,
) where
    S: Subscriber<T>,
{
    log::debug!("subscriber #{}: subscribe", id);

    if let Err(error) = guard(|| subscriber.on_subscribe(subscription.clone())) {
        return terminate(id, || subscriber.on_error(error));
    }

    while let Some(item) = items.next().await {
        subscription.acquire().await;

        log::trace!("subscriber #{}: deliver", id);
        if let Err(error) = guard(|| subscriber.on_next(item)) {
            items.close();
            return terminate(id, || subscriber.on_error(error));
        }
    }

    terminate(id, || subscriber.on_complete());
}

/// Runs a callback, turning a panic into an [`Abort`].
fn guard<F>(callback: F) -> Result<(), Abort>
where
    F: FnOnce() -> Result<(), Abort>,
{
    panic::catch_unwind(AssertUnwindSafe(callback))
        .unwrap_or_else(|payload| Err(Abort::from_panic(payload)))
}

fn terminate<F>(id: usize, callback: F)
where
    F: FnOnce(),
{
    if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(callback)) {
        log::warn!(
            "subscriber #{}: terminal callback panicked: {}",
            id,
            Abort::from_panic(payload)
        );
    }
}
