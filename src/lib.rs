//! Backpressure-aware publish/subscribe over `futures`.
//!
//! A [`SimplePublisher`] broadcasts items to a fixed set of
//! [`SubscriberModel`]s. Each subscriber requests items in batches of
//! `demand` credits and runs at its own pace on its own thread; the publisher
//! can block (or await) until every subscriber has finished, whether it
//! completed or failed.
//!
//! ```text
//!  source ──► Generator::while_present ──► SimplePublisher::publish
//!                                                │
//!                                     Broadcast (one queue per subscriber)
//!                        ┌───────────────────────┼───────────────────────┐
//!                        ▼                       ▼                       ▼
//!                 SubscriberBase          SubscriberBase          SubscriberBase
//!                 begin/accept/end        begin/accept/end        begin/accept/end
//!                        └───────────────────────┼───────────────────────┘
//!                                                ▼
//!                                  CountDownLatch ──► wait / completion
//! ```
//!
//! Fallible steps are expressed with the contracts in [`function`] and the
//! [`Outcome`] container; [`attempt`] holds the `uncheck` and `ignore`
//! policies used to cross into and out of the subscriber protocol.

pub mod attempt;
pub mod error;
pub mod function;
pub mod latch;
pub mod outcome;
pub mod publisher;
pub mod source;
pub mod subscriber;

pub use error::{Abort, BoxError, PublishError};
pub use function::{Acceptor, Generator, Invoker, Processor};
pub use latch::{Completion, CountDownLatch};
pub use outcome::Outcome;
pub use publisher::{Broadcast, Builder, Publisher, SimplePublisher};
pub use subscriber::{
    Subscriber, SubscriberBase, SubscriberContext, SubscriberModel, Subscription,
};
