use crate::function::{Acceptor, Processor};

/// What a fallible operation produced: a value, a failure, or nothing at all.
///
/// An `Empty` outcome is how a drained source says "no more values"; see
/// [`Generator::while_present`](crate::function::Generator::while_present).
///
/// Inspection hooks (`if_*`) run their side effect and hand the outcome back,
/// so they can be chained:
///
/// ```
/// use futures_flow::Outcome;
///
/// let mut seen = None;
/// Outcome::<i32, std::io::Error>::success(3)
///     .filter(|v| *v > 1)
///     .if_present(|v| seen = Some(*v))
///     .if_absent(|| unreachable!());
///
/// assert_eq!(seen, Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<R, E> {
    Success(R),
    Failure(E),
    Empty,
}

impl<R, E> Outcome<R, E> {
    pub fn success(value: R) -> Self {
        Outcome::Success(value)
    }

    pub fn failure(cause: E) -> Self {
        Outcome::Failure(cause)
    }

    pub fn empty() -> Self {
        Outcome::Empty
    }

    pub fn value(&self) -> Option<&R> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn cause(&self) -> Option<&E> {
        match self {
            Outcome::Failure(cause) => Some(cause),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<R> {
        match self {
            Outcome::Success(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_cause(self) -> Option<E> {
        match self {
            Outcome::Failure(cause) => Some(cause),
            _ => None,
        }
    }

    /// Converts back into the generator shape: `Empty` becomes `Ok(None)`.
    pub fn into_result(self) -> Result<Option<R>, E> {
        match self {
            Outcome::Success(value) => Ok(Some(value)),
            Outcome::Failure(cause) => Err(cause),
            Outcome::Empty => Ok(None),
        }
    }

    /// Neither a value nor a failure.
    pub fn is_empty(&self) -> bool {
        matches!(self, Outcome::Empty)
    }

    pub fn is_not_empty(&self) -> bool {
        !self.is_empty()
    }

    pub fn is_present(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// No value, either because of a failure or because there was nothing.
    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Outcome::Failure(_))
    }

    pub fn is_result<P>(&self, predicate: P) -> bool
    where
        P: FnOnce(&R) -> bool,
    {
        self.value().map_or(false, predicate)
    }

    pub fn is_result_not<P>(&self, predicate: P) -> bool
    where
        P: FnOnce(&R) -> bool,
    {
        self.value().map_or(false, |value| !predicate(value))
    }

    /// Applies `processor` to a present value.
    ///
    /// `Empty` and `Failure` pass through without invoking the processor; the
    /// carried failure is converted into the processor's error type. A failing
    /// processor yields `Failure`.
    pub fn map<RR, EE, P>(self, mut processor: P) -> Outcome<RR, EE>
    where
        P: Processor<R, RR, EE>,
        EE: From<E>,
    {
        match self {
            Outcome::Success(value) => match processor.process(value) {
                Ok(mapped) => Outcome::Success(mapped),
                Err(cause) => Outcome::Failure(cause),
            },
            Outcome::Failure(cause) => Outcome::Failure(cause.into()),
            Outcome::Empty => Outcome::Empty,
        }
    }

    pub fn map_err<EE, F>(self, f: F) -> Outcome<R, EE>
    where
        F: FnOnce(E) -> EE,
    {
        match self {
            Outcome::Success(value) => Outcome::Success(value),
            Outcome::Failure(cause) => Outcome::Failure(f(cause)),
            Outcome::Empty => Outcome::Empty,
        }
    }

    /// Downgrades a value rejected by `predicate` to `Empty`.
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&R) -> bool,
    {
        match self {
            Outcome::Success(value) if !predicate(&value) => Outcome::Empty,
            other => other,
        }
    }

    /// Returns the carried failure as `Err`, otherwise hands the outcome back.
    pub fn rethrow(self) -> Result<Self, E> {
        match self {
            Outcome::Failure(cause) => Err(cause),
            other => Ok(other),
        }
    }

    pub fn rethrow_with<EE, W>(self, wrapper: W) -> Result<Self, EE>
    where
        W: FnOnce(E) -> EE,
    {
        self.rethrow().map_err(wrapper)
    }

    pub fn if_empty<F>(self, action: F) -> Self
    where
        F: FnOnce(),
    {
        if self.is_empty() {
            action();
        }
        self
    }

    pub fn if_not_empty<F>(self, action: F) -> Self
    where
        F: FnOnce(&Self),
    {
        if self.is_not_empty() {
            action(&self);
        }
        self
    }

    pub fn if_present<F>(self, action: F) -> Self
    where
        F: FnOnce(&R),
    {
        if let Outcome::Success(value) = &self {
            action(value);
        }
        self
    }

    /// Like [`Outcome::if_present`], with an action that may fail.
    pub fn try_if_present<EE, A>(self, mut action: A) -> Result<Self, EE>
    where
        A: for<'a> Acceptor<&'a R, EE>,
    {
        if let Outcome::Success(value) = &self {
            action.accept(value)?;
        }
        Ok(self)
    }

    pub fn if_absent<F>(self, action: F) -> Self
    where
        F: FnOnce(),
    {
        if self.is_absent() {
            action();
        }
        self
    }

    pub fn if_failure<F>(self, action: F) -> Self
    where
        F: FnOnce(&E),
    {
        if let Outcome::Failure(cause) = &self {
            action(cause);
        }
        self
    }

    pub fn if_result<P, F>(self, predicate: P, action: F) -> Self
    where
        P: FnOnce(&R) -> bool,
        F: FnOnce(&R),
    {
        if let Outcome::Success(value) = &self {
            if predicate(value) {
                action(value);
            }
        }
        self
    }

    pub fn if_result_not<P, F>(self, predicate: P, action: F) -> Self
    where
        P: FnOnce(&R) -> bool,
        F: FnOnce(&R),
    {
        self.if_result(|value| !predicate(value), action)
    }
}

impl<R, E> From<Result<Option<R>, E>> for Outcome<R, E> {
    fn from(result: Result<Option<R>, E>) -> Self {
        match result {
            Ok(Some(value)) => Outcome::Success(value),
            Ok(None) => Outcome::Empty,
            Err(cause) => Outcome::Failure(cause),
        }
    }
}

impl<R, E> Default for Outcome<R, E> {
    fn default() -> Self {
        Outcome::Empty
    }
}
