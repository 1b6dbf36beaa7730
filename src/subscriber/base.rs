use std::{marker::PhantomData, sync::Arc};

use crate::{attempt, error::Abort};

use super::{Subscriber, SubscriberContext, SubscriberModel, Subscription};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Created,
    Subscribed,
    Done,
}

/// Adapts a [`SubscriberModel`] to the [`Subscriber`] protocol.
///
/// - `on_subscribe` runs `begin`, then requests `demand` items.
/// - `on_next` runs `accept`, then requests `demand` more.
/// - `on_error` and `on_complete` run `end` on a best-effort basis and fire the
///   context's done signal. The signal fires exactly once whichever way the
///   subscriber terminates.
///
/// A failing `begin` or `accept` is returned as [`Abort::Failed`], which sends
/// this subscriber (and only this one) down the error path.
pub struct SubscriberBase<T, M> {
    context: Arc<SubscriberContext>,
    model: M,
    subscription: Option<Subscription>,
    state: State,
    _marker: PhantomData<fn(T)>,
}

impl<T, M> SubscriberBase<T, M>
where
    M: SubscriberModel<T>,
{
    pub fn new(context: Arc<SubscriberContext>, model: M) -> Self {
        SubscriberBase {
            context,
            model,
            subscription: None,
            state: State::Created,
            _marker: PhantomData,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn is_done(&self) -> bool {
        self.state == State::Done
    }

    fn request(&self) {
        if let Some(subscription) = &self.subscription {
            log::trace!("{}: request {}", self.model.name(), self.context.demand());
            subscription.request(self.context.demand());
        }
    }

    fn finish(&mut self) {
        let model = &mut self.model;
        attempt::invoke_ignore(|| model.end());

        let signal = self.context.done_signal().clone();
        attempt::invoke_ignore(move || {
            signal();
            Ok::<_, Abort>(())
        });
    }
}

impl<T, M> Subscriber<T> for SubscriberBase<T, M>
where
    T: 'static,
    M: SubscriberModel<T>,
{
    fn on_subscribe(&mut self, subscription: Subscription) -> Result<(), Abort> {
        if self.state != State::Created {
            log::warn!("{}: duplicate subscription ignored", self.model.name());
            return Ok(());
        }

        log::debug!("{}: begin", self.model.name());
        self.model.begin().map_err(Abort::failed)?;

        self.subscription = Some(subscription);
        self.state = State::Subscribed;
        self.request();

        Ok(())
    }

    fn on_next(&mut self, item: T) -> Result<(), Abort> {
        if self.state != State::Subscribed {
            return Ok(());
        }

        self.model.accept(item).map_err(Abort::failed)?;
        self.request();

        Ok(())
    }

    fn on_error(&mut self, error: Abort) {
        if self.state == State::Done {
            return;
        }
        self.state = State::Done;

        log::debug!("{}: error: {}", self.model.name(), error);

        let handler = self.context.error_handler().clone();
        attempt::invoke_ignore(move || {
            handler(&error);
            Ok::<_, Abort>(())
        });

        self.finish();
    }

    fn on_complete(&mut self) {
        if self.state == State::Done {
            return;
        }
        self.state = State::Done;

        log::debug!("{}: complete", self.model.name());
        self.finish();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use super::*;
    use crate::error::BoxError;

    #[derive(Default)]
    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        fail_begin: bool,
        fail_on: Option<i32>,
        fail_end: bool,
    }

    impl SubscriberModel<i32> for Recorder {
        type Error = BoxError;

        fn begin(&mut self) -> Result<(), BoxError> {
            self.events.lock().unwrap().push("begin".to_owned());
            if self.fail_begin {
                return Err("begin failed".into());
            }
            Ok(())
        }

        fn accept(&mut self, item: i32) -> Result<(), BoxError> {
            self.events.lock().unwrap().push(format!("accept {item}"));
            if self.fail_on == Some(item) {
                return Err(format!("rejected {item}").into());
            }
            Ok(())
        }

        fn end(&mut self) -> Result<(), BoxError> {
            self.events.lock().unwrap().push("end".to_owned());
            if self.fail_end {
                return Err("end failed".into());
            }
            Ok(())
        }
    }

    struct Fixture {
        context: Arc<SubscriberContext>,
        done: Arc<AtomicUsize>,
        errors: Arc<Mutex<Vec<String>>>,
    }

    fn fixture(demand: u64) -> Fixture {
        let done = Arc::new(AtomicUsize::new(0));
        let errors = Arc::new(Mutex::new(vec![]));

        let signal = done.clone();
        let sink = errors.clone();
        let context = SubscriberContext::new(
            demand,
            Arc::new(move |error: &Abort| sink.lock().unwrap().push(error.to_string())),
            Arc::new(move || {
                signal.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        Fixture {
            context: Arc::new(context),
            done,
            errors,
        }
    }

    #[test]
    fn test_demand_requested_after_begin_and_each_item() {
        for demand in [1, 2, 7] {
            let fx = fixture(demand);
            let mut base = SubscriberBase::new(fx.context.clone(), Recorder::default());
            let subscription = Subscription::new();

            base.on_subscribe(subscription.clone()).unwrap();
            assert_eq!(subscription.pending(), demand);

            base.on_next(1).unwrap();
            assert_eq!(subscription.pending(), 2 * demand);

            base.on_next(2).unwrap();
            assert_eq!(subscription.pending(), 3 * demand);
        }
    }

    #[test]
    fn test_lifecycle_order_on_completion() {
        let fx = fixture(1);
        let events = Arc::new(Mutex::new(vec![]));
        let model = Recorder {
            events: events.clone(),
            ..Default::default()
        };
        let mut base = SubscriberBase::new(fx.context.clone(), model);

        base.on_subscribe(Subscription::new()).unwrap();
        base.on_next(1).unwrap();
        base.on_next(2).unwrap();
        base.on_complete();
        base.on_complete();

        assert_eq!(*events.lock().unwrap(), vec!["begin", "accept 1", "accept 2", "end"]);
        assert_eq!(fx.done.load(Ordering::SeqCst), 1);
        assert!(base.is_done());
        assert!(Arc::ptr_eq(&base.model().events, &events));
    }

    #[test]
    fn test_begin_failure_requests_nothing() {
        let fx = fixture(3);
        let model = Recorder {
            fail_begin: true,
            ..Default::default()
        };
        let mut base = SubscriberBase::new(fx.context.clone(), model);
        let subscription = Subscription::new();

        let error = base.on_subscribe(subscription.clone()).unwrap_err();
        assert!(matches!(error, Abort::Failed(_)));
        assert_eq!(subscription.pending(), 0);

        base.on_error(error);
        assert_eq!(*fx.errors.lock().unwrap(), vec!["begin failed"]);
        assert_eq!(fx.done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_accept_failure_then_error_path_runs_end_once() {
        let fx = fixture(1);
        let events = Arc::new(Mutex::new(vec![]));
        let model = Recorder {
            events: events.clone(),
            fail_on: Some(2),
            ..Default::default()
        };
        let mut base = SubscriberBase::new(fx.context.clone(), model);
        let subscription = Subscription::new();

        base.on_subscribe(subscription.clone()).unwrap();
        base.on_next(1).unwrap();
        let error = base.on_next(2).unwrap_err();
        assert_eq!(subscription.pending(), 2);

        base.on_error(error);
        base.on_complete();
        base.on_next(3).unwrap();

        assert_eq!(*events.lock().unwrap(), vec!["begin", "accept 1", "accept 2", "end"]);
        assert_eq!(*fx.errors.lock().unwrap(), vec!["rejected 2"]);
        assert_eq!(fx.done.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_teardown_failures_are_suppressed() {
        let done = Arc::new(AtomicUsize::new(0));
        let signal = done.clone();
        let context = SubscriberContext::new(
            1,
            Arc::new(|_: &Abort| panic!("handler exploded")),
            Arc::new(move || {
                signal.fetch_add(1, Ordering::SeqCst);
            }),
        )
        .unwrap();

        let model = Recorder {
            fail_end: true,
            ..Default::default()
        };
        let mut base = SubscriberBase::new(Arc::new(context), model);

        base.on_subscribe(Subscription::new()).unwrap();
        base.on_error(Abort::Panicked("upstream".to_owned()));

        assert_eq!(done.load(Ordering::SeqCst), 1);
    }
}
