use crate::error::BoxError;

/// Sink driven by a [`SubscriberBase`](super::SubscriberBase).
///
/// The lifecycle is `begin → accept* → end`:
/// - `begin` runs exactly once, before any item.
/// - `accept` runs once per delivered item, never concurrently with itself.
/// - `end` runs exactly once, after the last item or after a failure.
///
/// Any step may fail. The pipeline only looks at whether it failed; the error
/// itself is forwarded to the configured error handler.
pub trait SubscriberModel<T>: Send + 'static {
    type Error: Into<BoxError>;

    fn begin(&mut self) -> Result<(), Self::Error>;

    fn accept(&mut self, item: T) -> Result<(), Self::Error>;

    fn end(&mut self) -> Result<(), Self::Error>;

    /// Name used in log lines. Defaults to the type name.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// A model with its error erased to [`BoxError`], so models of different
/// types can share one publisher.
pub type BoxModel<T> = Box<dyn SubscriberModel<T, Error = BoxError>>;

struct Erased<M>(M);

impl<T, M> SubscriberModel<T> for Erased<M>
where
    M: SubscriberModel<T>,
{
    type Error = BoxError;

    fn begin(&mut self) -> Result<(), BoxError> {
        self.0.begin().map_err(Into::into)
    }

    fn accept(&mut self, item: T) -> Result<(), BoxError> {
        self.0.accept(item).map_err(Into::into)
    }

    fn end(&mut self) -> Result<(), BoxError> {
        self.0.end().map_err(Into::into)
    }

    fn name(&self) -> &str {
        self.0.name()
    }
}

pub fn boxed<T, M>(model: M) -> BoxModel<T>
where
    T: 'static,
    M: SubscriberModel<T>,
{
    Box::new(Erased(model))
}

impl<T, M> SubscriberModel<T> for Box<M>
where
    T: 'static,
    M: SubscriberModel<T> + ?Sized,
{
    type Error = M::Error;

    fn begin(&mut self) -> Result<(), Self::Error> {
        (**self).begin()
    }

    fn accept(&mut self, item: T) -> Result<(), Self::Error> {
        (**self).accept(item)
    }

    fn end(&mut self) -> Result<(), Self::Error> {
        (**self).end()
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
