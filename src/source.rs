//! Upstream item sources.

use std::io::{self, BufRead};
use std::marker::PhantomData;

use crate::function::{Acceptor, Chain, Generator, Pipe, Processor};

/// Generator reading one line per call from `reader`, without the line
/// terminator. Yields nothing once the reader is exhausted.
///
/// ```
/// use futures_flow::{source, Generator};
///
/// let mut lines = vec![];
/// source::lines("a\nb\n".as_bytes())
///     .while_present(|line| lines.push(line))
///     .unwrap();
///
/// assert_eq!(lines, ["a", "b"]);
/// ```
pub fn lines<B>(mut reader: B) -> impl FnMut() -> io::Result<Option<String>>
where
    B: BufRead,
{
    move || read_line(&mut reader)
}

/// Reads one line from `reader` without its terminator, or nothing at end of
/// input.
pub fn read_line<B>(reader: &mut B) -> io::Result<Option<String>>
where
    B: BufRead + ?Sized,
{
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Ok(None);
    }

    if line.ends_with('\n') {
        line.pop();
        if line.ends_with('\r') {
            line.pop();
        }
    }

    Ok(Some(line))
}

/// A resource opened on demand and closed, by drop, once an access is over.
///
/// `open` acquires the raw resource `A`; [`Resource::map`] stacks preparation
/// steps on top of it (wrap a file in a buffered reader, skip a header). Every
/// access opens the resource afresh, prepares it and drops it before
/// returning, on success and on failure alike. An `open` yielding nothing
/// skips the access.
///
/// ```
/// use std::io::Cursor;
/// use futures_flow::source::{self, Resource};
///
/// let mut lines = vec![];
/// Resource::new(|| Ok::<_, std::io::Error>(Some(Cursor::new("a\nb\n"))))
///     .while_present(
///         |reader: &mut Cursor<&str>| source::read_line(reader),
///         |line: String| {
///             lines.push(line);
///             Ok(())
///         },
///     )
///     .unwrap();
///
/// assert_eq!(lines, ["a", "b"]);
/// ```
pub struct Resource<G, P, A, E> {
    open: G,
    prepare: P,
    _marker: PhantomData<fn() -> (A, E)>,
}

impl<G, A, E> Resource<G, Pipe, A, E>
where
    G: Generator<A, E>,
{
    pub fn new(open: G) -> Self {
        Resource {
            open,
            prepare: Pipe,
            _marker: PhantomData,
        }
    }
}

impl<G, P, A, E> Resource<G, P, A, E>
where
    G: Generator<A, E>,
{
    /// Adds a preparation step run after every open.
    pub fn map<T, U, Q>(self, mapper: Q) -> Resource<G, Chain<P, Q, T>, A, E>
    where
        P: Processor<A, T, E>,
        Q: Processor<T, U, E>,
    {
        Resource {
            open: self.open,
            prepare: self.prepare.and_then(mapper),
            _marker: PhantomData,
        }
    }

    /// Hands the prepared resource to `consumer`.
    pub fn accept<T, C>(&mut self, mut consumer: C) -> Result<(), E>
    where
        P: Processor<A, T, E>,
        C: Acceptor<T, E>,
    {
        match self.acquire()? {
            Some(handle) => consumer.accept(handle),
            None => Ok(()),
        }
    }

    /// Computes a value from the prepared resource.
    pub fn process<T, R, Q>(&mut self, mut processor: Q) -> Result<Option<R>, E>
    where
        P: Processor<A, T, E>,
        Q: Processor<T, R, E>,
    {
        self.acquire()?
            .map(|handle| processor.process(handle))
            .transpose()
    }

    /// Calls `reader` on the prepared resource for as long as it yields a
    /// value, feeding each value to `consumer`. The first failure of either
    /// ends the loop.
    pub fn while_present<T, R, Q, C>(&mut self, mut reader: Q, mut consumer: C) -> Result<(), E>
    where
        P: Processor<A, T, E>,
        Q: for<'a> Processor<&'a mut T, Option<R>, E>,
        C: Acceptor<R, E>,
    {
        let mut handle = match self.acquire()? {
            Some(handle) => handle,
            None => return Ok(()),
        };

        while let Some(value) = reader.process(&mut handle)? {
            consumer.accept(value)?;
        }

        Ok(())
    }

    /// Like [`Resource::while_present`], discarding the values.
    pub fn drain<T, R, Q>(&mut self, reader: Q) -> Result<(), E>
    where
        P: Processor<A, T, E>,
        Q: for<'a> Processor<&'a mut T, Option<R>, E>,
    {
        self.while_present(reader, |_: R| Ok(()))
    }

    fn acquire<T>(&mut self) -> Result<Option<T>, E>
    where
        P: Processor<A, T, E>,
    {
        match self.open.generate()? {
            Some(raw) => self.prepare.process(raw).map(Some),
            None => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Read};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_lines_strip_terminators() {
        let mut seen = vec![];
        lines(Cursor::new("one\r\ntwo\nthree"))
            .while_present(|line| seen.push(line))
            .unwrap();

        assert_eq!(seen, ["one", "two", "three"]);
    }

    #[test]
    fn test_lines_surface_read_failure() {
        let error = lines(io::BufReader::new(FailingReader))
            .while_present(|_| {})
            .unwrap_err();

        assert_eq!(error.kind(), io::ErrorKind::ConnectionReset);
    }

    /// Line reader counting how often it was closed.
    struct Tracked {
        reader: Cursor<&'static str>,
        closed: Arc<AtomicUsize>,
    }

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.closed.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn tracked(text: &'static str, closed: &Arc<AtomicUsize>) -> impl FnMut() -> io::Result<Option<Tracked>> {
        let closed = closed.clone();
        move || {
            Ok(Some(Tracked {
                reader: Cursor::new(text),
                closed: closed.clone(),
            }))
        }
    }

    #[test]
    fn test_resource_drains_then_closes() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut resource = Resource::new(tracked("header\nx\ny\n", &closed)).map(|mut t: Tracked| {
            read_line(&mut t.reader)?;
            Ok::<_, io::Error>(t)
        });

        let mut seen = vec![];
        resource
            .while_present(
                |t: &mut Tracked| read_line(&mut t.reader),
                |line: String| {
                    assert_eq!(closed.load(Ordering::SeqCst), 0);
                    seen.push(line);
                    Ok(())
                },
            )
            .unwrap();

        assert_eq!(seen, ["x", "y"]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        resource.drain(|t: &mut Tracked| read_line(&mut t.reader)).unwrap();
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resource_closed_when_consumer_fails() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut resource = Resource::new(tracked("a\nb\nc\n", &closed));

        let mut seen = vec![];
        let error = resource
            .while_present(
                |t: &mut Tracked| read_line(&mut t.reader),
                |line: String| {
                    if line == "b" {
                        return Err(io::Error::new(io::ErrorKind::InvalidData, "bad line"));
                    }
                    seen.push(line);
                    Ok(())
                },
            )
            .unwrap_err();

        assert_eq!(error.to_string(), "bad line");
        assert_eq!(seen, ["a"]);
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_resource_accept_and_process() {
        let closed = Arc::new(AtomicUsize::new(0));
        let mut resource = Resource::new(tracked("first\nsecond\n", &closed));

        let first = resource.process(|mut t: Tracked| read_line(&mut t.reader)).unwrap();
        assert_eq!(first, Some(Some("first".to_owned())));

        let mut length = 0;
        resource
            .accept(|t: Tracked| {
                length = t.reader.get_ref().len();
                Ok(())
            })
            .unwrap();

        assert_eq!(length, 13);
        assert_eq!(closed.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_resource_not_opened_does_nothing() {
        let mut unopened = Resource::new(|| Ok::<Option<Cursor<&str>>, io::Error>(None));

        unopened
            .while_present(
                |_: &mut Cursor<&str>| -> io::Result<Option<String>> { panic!("read without a resource") },
                |_: String| -> io::Result<()> { panic!("nothing to accept") },
            )
            .unwrap();
        assert_eq!(unopened.process(|c: Cursor<&str>| Ok(c.position())).unwrap(), None);
    }
}
