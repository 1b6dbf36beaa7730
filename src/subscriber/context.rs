use std::{fmt, sync::Arc};

use crate::error::{Abort, PublishError};

pub type ErrorHandler = Arc<dyn Fn(&Abort) + Send + Sync>;
pub type DoneSignal = Arc<dyn Fn() + Send + Sync>;

/// Configuration shared by every subscriber of one publisher.
///
/// Built once before the publisher starts and read-only afterwards.
#[derive(Clone)]
pub struct SubscriberContext {
    demand: u64,
    error_handler: ErrorHandler,
    done_signal: DoneSignal,
}

impl SubscriberContext {
    /// Fails with [`PublishError::InvalidInput`] when `demand` is zero, since a
    /// subscriber would then never request an item.
    pub fn new(
        demand: u64,
        error_handler: ErrorHandler,
        done_signal: DoneSignal,
    ) -> Result<Self, PublishError> {
        if demand == 0 {
            return Err(PublishError::InvalidInput(
                "demand must be at least 1".to_owned(),
            ));
        }

        Ok(SubscriberContext {
            demand,
            error_handler,
            done_signal,
        })
    }

    pub fn demand(&self) -> u64 {
        self.demand
    }

    pub fn error_handler(&self) -> &ErrorHandler {
        &self.error_handler
    }

    pub fn done_signal(&self) -> &DoneSignal {
        &self.done_signal
    }
}

impl fmt::Debug for SubscriberContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriberContext")
            .field("demand", &self.demand)
            .finish_non_exhaustive()
    }
}

/// Handler used when none is configured: log the failure and carry on.
pub fn log_error_handler() -> ErrorHandler {
    Arc::new(|error: &Abort| log::error!("subscriber failed: {}", error))
}
