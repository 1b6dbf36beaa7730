use std::sync::Arc;

use futures::executor::ThreadPool;

use crate::{
    error::{Abort, PublishError},
    latch::{Completion, CountDownLatch},
    subscriber::{
        boxed, log_error_handler, BoxModel, ErrorHandler, SubscriberBase, SubscriberContext,
        SubscriberModel,
    },
};

use super::{Broadcast, Publisher};

/// Fans items out to a fixed set of [`SubscriberModel`]s and tracks when all
/// of them have finished.
///
/// ```no_run
/// # use futures_flow::{SimplePublisher, SubscriberModel};
/// # struct Printer;
/// # impl SubscriberModel<String> for Printer {
/// #     type Error = std::io::Error;
/// #     fn begin(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// #     fn accept(&mut self, item: String) -> Result<(), Self::Error> { println!("{item}"); Ok(()) }
/// #     fn end(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// let publisher = SimplePublisher::<String>::builder().demand(4).add(Printer).build()?;
///
/// publisher.publish("hello".to_owned())?;
/// publisher.close();
/// publisher.wait();
/// # Ok::<(), futures_flow::PublishError>(())
/// ```
pub struct SimplePublisher<T> {
    broadcast: Broadcast<T>,
    latch: CountDownLatch,
}

pub struct Builder<T> {
    models: Vec<BoxModel<T>>,
    demand: u64,
    error_handler: ErrorHandler,
    executor: Option<ThreadPool>,
}

impl<T> Builder<T>
where
    T: Clone + Send + 'static,
{
    fn new() -> Self {
        Builder {
            models: vec![],
            demand: 1,
            error_handler: log_error_handler(),
            executor: None,
        }
    }

    /// Items each subscriber requests up front and again after every item.
    /// Must be at least 1. Default: 1.
    pub fn demand(mut self, demand: u64) -> Self {
        self.demand = demand;
        self
    }

    /// Called with the failure that ended a subscriber. Default: log it.
    pub fn error_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&Abort) + Send + Sync + 'static,
    {
        self.error_handler = Arc::new(handler);
        self
    }

    /// Pool running the delivery loops. Default: one dedicated thread per
    /// subscriber.
    ///
    /// Models that block in `accept` need a pool with at least one thread per
    /// model, or they run one after another.
    pub fn executor(mut self, executor: ThreadPool) -> Self {
        self.executor = Some(executor);
        self
    }

    pub fn add<M>(mut self, model: M) -> Self
    where
        M: SubscriberModel<T>,
    {
        self.models.push(boxed(model));
        self
    }

    pub fn build(self) -> Result<SimplePublisher<T>, PublishError> {
        let latch = CountDownLatch::new(self.models.len());

        let signal = latch.clone();
        let context = Arc::new(SubscriberContext::new(
            self.demand,
            self.error_handler,
            Arc::new(move || signal.count_down()),
        )?);

        let broadcast = match self.executor {
            Some(executor) => Broadcast::with_executor(executor),
            None => Broadcast::new(),
        };
        for model in self.models {
            log::debug!("attach {}", model.name());
            broadcast.subscribe(SubscriberBase::new(context.clone(), model))?;
        }

        Ok(SimplePublisher { broadcast, latch })
    }
}

impl<T> SimplePublisher<T>
where
    T: Clone + Send + 'static,
{
    pub fn builder() -> Builder<T> {
        Builder::new()
    }

    /// Queues `item` for every subscriber still running and returns how many
    /// that was. Never waits for subscribers to process it.
    pub fn publish(&self, item: T) -> Result<usize, PublishError> {
        self.broadcast.submit(item)
    }

    /// Signals that no more items follow. Dropping the publisher does the same.
    pub fn close(&self) {
        self.broadcast.close();
    }

    pub fn is_closed(&self) -> bool {
        self.broadcast.is_closed()
    }

    /// Subscribers that have not finished yet.
    pub fn pending(&self) -> usize {
        self.latch.count()
    }

    /// Blocks until every subscriber has completed or failed.
    ///
    /// Waits forever unless the publisher was closed first.
    pub fn wait(&self) {
        self.latch.wait();
    }

    /// Async counterpart of [`SimplePublisher::wait`].
    pub fn completion(&self) -> Completion {
        self.latch.completion()
    }
}
