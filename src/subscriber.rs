use crate::error::Abort;

mod base;
mod context;
mod model;
mod subscription;

pub use base::*;
pub use context::*;
pub use model::*;
pub use subscription::*;

/// Receiving side of the flow protocol.
///
/// A publisher drives each subscriber through
/// `on_subscribe → on_next* → (on_complete | on_error)`. Calls for one
/// subscriber are strictly sequential and never overlap.
///
/// Returning `Err` from `on_subscribe` or `on_next` routes the subscriber to
/// `on_error`; no further items are delivered to it.
pub trait Subscriber<T>: Send + 'static {
    fn on_subscribe(&mut self, subscription: Subscription) -> Result<(), Abort>;

    fn on_next(&mut self, item: T) -> Result<(), Abort>;

    fn on_error(&mut self, error: Abort);

    fn on_complete(&mut self);
}
