use crate::{error::PublishError, subscriber::Subscriber};

mod broadcast;
mod simple;
pub use broadcast::*;
pub use simple::*;

/// A publisher delivers elements to one or more Subscriber instances.
///
/// call subscribe to attach a subscriber; it is driven through its whole
/// lifecycle by the publisher.
pub trait Publisher {
    type Item;

    /// Attach a subscriber to this publisher
    fn subscribe<S>(&self, subscriber: S) -> Result<(), PublishError>
    where
        S: Subscriber<Self::Item>;
}
