//! Conversion policies for fallible functions.
//!
//! - `get`: capture the failure in an [`Outcome`].
//! - `uncheck`: raise the failure as a panic carrying an [`Abort`]. Panics
//!   raised by the function itself pass through untouched.
//! - `ignore`: swallow every failure, panics included.
//!
//! `ignore` is meant for best-effort cleanup (flush, close) where a failure must
//! never mask the primary control flow.
//!
//! Catching a panic does not silence the process panic hook: a panic swallowed
//! by `ignore` is still reported on stderr by the default hook.

use std::panic::{self, AssertUnwindSafe};

use crate::error::{Abort, BoxError};
use crate::function::{Generator, Invoker};
use crate::outcome::Outcome;

pub fn get<R, E, G>(mut action: G) -> Outcome<R, E>
where
    G: Generator<R, E>,
{
    Generator::outcome(&mut action)
}

/// Runs an invoker; success yields an empty outcome.
pub fn invoke<E, I>(mut action: I) -> Outcome<(), E>
where
    I: Invoker<E>,
{
    Invoker::outcome(&mut action)
}

pub fn uncheck<R, E, G>(mut action: G) -> Option<R>
where
    G: Generator<R, E>,
    E: Into<BoxError>,
{
    action.generate().unwrap_or_else(|cause| raise(cause))
}

/// Like [`uncheck`], with the failure passed through `wrapper` first.
pub fn uncheck_with<R, E, W, G, F>(mut action: G, wrapper: F) -> Option<R>
where
    G: Generator<R, E>,
    F: FnOnce(E) -> W,
    W: Into<BoxError>,
{
    action.generate().unwrap_or_else(|cause| raise(wrapper(cause)))
}

pub fn invoke_uncheck<E, I>(mut action: I)
where
    I: Invoker<E>,
    E: Into<BoxError>,
{
    if let Err(cause) = action.invoke() {
        raise(cause)
    }
}

/// Runs `action`, returning its value or nothing if it failed or panicked.
///
/// The failure is logged at debug level. A panic still goes through the
/// installed panic hook before it is caught here, so the default hook prints
/// it to stderr; install a quieter hook with [`std::panic::set_hook`] if that
/// output is unwanted.
pub fn ignore<R, E, G>(mut action: G) -> Option<R>
where
    G: Generator<R, E>,
    E: Into<BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(|| action.generate())) {
        Ok(Ok(value)) => value,
        Ok(Err(cause)) => {
            let cause: BoxError = cause.into();
            log::debug!("ignored failure: {}", cause);
            None
        }
        Err(payload) => {
            log::debug!("ignored failure: {}", Abort::from_panic(payload));
            None
        }
    }
}

pub fn invoke_ignore<E, I>(mut action: I)
where
    I: Invoker<E>,
    E: Into<BoxError>,
{
    ignore(move || action.invoke().map(|()| None::<()>));
}

/// Raises `cause` as an unchecked abort.
pub(crate) fn raise<E>(cause: E) -> !
where
    E: Into<BoxError>,
{
    panic::panic_any(Abort::failed(cause))
}
