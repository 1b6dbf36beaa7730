//! Fallible function contracts.
//!
//! Each contract is a plain trait with a blanket implementation for closures, so
//! any `FnMut` with the right shape can be passed where a contract is expected:
//!
//! | contract      | closure shape                     |
//! |---------------|-----------------------------------|
//! | [`Generator`] | `FnMut() -> Result<Option<R>, E>` |
//! | [`Processor`] | `FnMut(V) -> Result<R, E>`        |
//! | [`Acceptor`]  | `FnMut(V) -> Result<(), E>`       |
//! | [`Invoker`]   | `FnMut() -> Result<(), E>`        |
//!
//! A generator returning `Ok(None)` has no value to offer; drained by
//! [`Generator::while_present`] this marks the end of the sequence.
//!
//! A closure of shape `FnMut(V) -> Result<(), E>` is both a processor and an
//! acceptor, so calls to the shared `outcome` name may need the trait spelled
//! out: `Acceptor::outcome(&mut f, v)`.

use std::marker::PhantomData;

use crate::attempt;
use crate::error::BoxError;
use crate::outcome::Outcome;

/// Produces a value, nothing, or a failure.
pub trait Generator<R, E> {
    fn generate(&mut self) -> Result<Option<R>, E>;

    /// Invokes the generator once and captures what happened.
    fn outcome(&mut self) -> Outcome<R, E> {
        self.generate().into()
    }

    /// Present values until the first empty one. A failure is raised as an
    /// unchecked abort when it is reached.
    fn values_uncheck(self) -> Unchecked<Self, R, E>
    where
        Self: Sized,
        E: Into<BoxError>,
    {
        Unchecked {
            generator: self,
            exhausted: false,
            _marker: PhantomData,
        }
    }

    /// Lazy, unbounded sequence of outcomes, one per invocation.
    fn outcomes(self) -> Outcomes<Self, R, E>
    where
        Self: Sized,
    {
        Outcomes {
            generator: self,
            _marker: PhantomData,
        }
    }

    /// Feeds every present value to `then` until the generator yields nothing
    /// or fails.
    ///
    /// A failure ends the loop and is returned to the caller.
    fn while_present<F>(mut self, mut then: F) -> Result<(), E>
    where
        Self: Sized,
        F: FnMut(R),
    {
        loop {
            match Generator::outcome(&mut self) {
                Outcome::Success(value) => then(value),
                Outcome::Empty => return Ok(()),
                Outcome::Failure(cause) => return Err(cause),
            }
        }
    }

    /// Like [`Generator::while_present`], but a failure is raised as an
    /// unchecked abort.
    fn while_present_uncheck<F>(self, then: F)
    where
        Self: Sized,
        F: FnMut(R),
        E: Into<BoxError>,
    {
        self.values_uncheck().for_each(then);
    }
}

impl<F, R, E> Generator<R, E> for F
where
    F: FnMut() -> Result<Option<R>, E>,
{
    fn generate(&mut self) -> Result<Option<R>, E> {
        self()
    }
}

/// Iterator returned by [`Generator::outcomes`]. Never ends on its own.
pub struct Outcomes<G, R, E> {
    generator: G,
    _marker: PhantomData<fn() -> (R, E)>,
}

impl<G, R, E> Iterator for Outcomes<G, R, E>
where
    G: Generator<R, E>,
{
    type Item = Outcome<R, E>;

    fn next(&mut self) -> Option<Self::Item> {
        Some(Generator::outcome(&mut self.generator))
    }
}

/// Iterator returned by [`Generator::values_uncheck`].
pub struct Unchecked<G, R, E> {
    generator: G,
    exhausted: bool,
    _marker: PhantomData<fn() -> (R, E)>,
}

impl<G, R, E> Iterator for Unchecked<G, R, E>
where
    G: Generator<R, E>,
    E: Into<BoxError>,
{
    type Item = R;

    fn next(&mut self) -> Option<R> {
        if self.exhausted {
            return None;
        }

        let value = self
            .generator
            .generate()
            .unwrap_or_else(|cause| attempt::raise(cause));
        self.exhausted = value.is_none();
        value
    }
}

/// A generator yielding `value` on every call. Never runs dry.
pub fn fix<R, E>(value: R) -> impl Generator<R, E>
where
    R: Clone,
{
    move || Ok::<_, E>(Some(value.clone()))
}

/// Maps a value to a result, or fails.
pub trait Processor<V, R, E> {
    fn process(&mut self, value: V) -> Result<R, E>;

    fn outcome(&mut self, value: V) -> Outcome<R, E> {
        match self.process(value) {
            Ok(result) => Outcome::Success(result),
            Err(cause) => Outcome::Failure(cause),
        }
    }

    /// Feeds the output of this processor into `after`.
    fn and_then<RR, P>(self, after: P) -> Chain<Self, P, R>
    where
        Self: Sized,
        P: Processor<R, RR, E>,
    {
        Chain {
            first: self,
            second: after,
            _marker: PhantomData,
        }
    }
}

impl<F, V, R, E> Processor<V, R, E> for F
where
    F: FnMut(V) -> Result<R, E>,
{
    fn process(&mut self, value: V) -> Result<R, E> {
        self(value)
    }
}

/// Processor handing its input back unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Pipe;

impl<V, E> Processor<V, V, E> for Pipe {
    fn process(&mut self, value: V) -> Result<V, E> {
        Ok(value)
    }
}

pub struct Chain<A, B, R> {
    first: A,
    second: B,
    _marker: PhantomData<fn() -> R>,
}

impl<A, B, V, R, RR, E> Processor<V, RR, E> for Chain<A, B, R>
where
    A: Processor<V, R, E>,
    B: Processor<R, RR, E>,
{
    fn process(&mut self, value: V) -> Result<RR, E> {
        let intermediate = self.first.process(value)?;
        self.second.process(intermediate)
    }
}

/// Consumes a value, or fails.
pub trait Acceptor<V, E> {
    fn accept(&mut self, value: V) -> Result<(), E>;

    /// Success yields an empty outcome.
    fn outcome(&mut self, value: V) -> Outcome<(), E> {
        match self.accept(value) {
            Ok(()) => Outcome::Empty,
            Err(cause) => Outcome::Failure(cause),
        }
    }
}

impl<F, V, E> Acceptor<V, E> for F
where
    F: FnMut(V) -> Result<(), E>,
{
    fn accept(&mut self, value: V) -> Result<(), E> {
        self(value)
    }
}

/// Runs a side effect, or fails.
pub trait Invoker<E> {
    fn invoke(&mut self) -> Result<(), E>;

    /// Success yields an empty outcome.
    fn outcome(&mut self) -> Outcome<(), E> {
        match self.invoke() {
            Ok(()) => Outcome::Empty,
            Err(cause) => Outcome::Failure(cause),
        }
    }

    /// Generator running this invoker and yielding nothing on success.
    fn normalize<R>(self) -> Normalized<Self, R>
    where
        Self: Sized,
    {
        Normalized {
            invoker: self,
            _marker: PhantomData,
        }
    }

    /// Runs `after` once this invoker succeeded.
    fn then<I>(self, after: I) -> Then<Self, I>
    where
        Self: Sized,
        I: Invoker<E>,
    {
        Then {
            first: self,
            second: after,
        }
    }
}

impl<F, E> Invoker<E> for F
where
    F: FnMut() -> Result<(), E>,
{
    fn invoke(&mut self) -> Result<(), E> {
        self()
    }
}

pub struct Then<A, B> {
    first: A,
    second: B,
}

impl<A, B, E> Invoker<E> for Then<A, B>
where
    A: Invoker<E>,
    B: Invoker<E>,
{
    fn invoke(&mut self) -> Result<(), E> {
        self.first.invoke()?;
        self.second.invoke()
    }
}

/// Generator returned by [`Invoker::normalize`].
pub struct Normalized<I, R> {
    invoker: I,
    _marker: PhantomData<fn() -> R>,
}

impl<I, R, E> Generator<R, E> for Normalized<I, R>
where
    I: Invoker<E>,
{
    fn generate(&mut self) -> Result<Option<R>, E> {
        self.invoker.invoke()?;
        Ok(None)
    }
}

/// An invoker that does nothing.
pub fn nop<E>() -> impl Invoker<E> {
    || Ok::<(), E>(())
}
