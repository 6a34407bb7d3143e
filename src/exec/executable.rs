// src/exec/executable.rs

//! The unit of work a task carries.

use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// Result of running one executable: a description of the value on success,
/// a description of the error on failure.
pub type Outcome = Result<String, String>;

type BlockingFn = Box<dyn FnOnce() -> Outcome + Send + 'static>;
type BoxedFuture = Pin<Box<dyn Future<Output = Outcome> + Send + 'static>>;

/// A zero-argument invocable bound to a task at registration time.
///
/// - `Blocking` closures run on Tokio's blocking thread pool, so they may
///   sleep or do synchronous I/O without stalling other workers.
/// - `Async` futures are polled on the runtime itself and must not block.
///
/// Both kinds run exactly once. A panic in either is reported as a failure
/// of that task alone.
pub enum Executable {
    Blocking(BlockingFn),
    Async(BoxedFuture),
}

impl Executable {
    /// Wrap a blocking closure returning any displayable success/error pair.
    pub fn blocking<F, T, E>(f: F) -> Self
    where
        F: FnOnce() -> Result<T, E> + Send + 'static,
        T: fmt::Display,
        E: fmt::Display,
    {
        Executable::Blocking(Box::new(move || describe(f())))
    }

    /// Wrap a future returning any displayable success/error pair.
    ///
    /// The future is not polled until a worker picks the task up.
    pub fn from_future<Fut, T, E>(fut: Fut) -> Self
    where
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        T: fmt::Display,
        E: fmt::Display,
    {
        Executable::Async(Box::pin(async move { describe(fut.await) }))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Executable::Blocking(_) => "blocking",
            Executable::Async(_) => "async",
        }
    }
}

impl fmt::Debug for Executable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Executable").field(&self.kind()).finish()
    }
}

fn describe<T: fmt::Display, E: fmt::Display>(result: Result<T, E>) -> Outcome {
    result.map(|v| v.to_string()).map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_closure_is_described_with_display() {
        let exec = Executable::blocking(|| Ok::<_, String>(42));
        let Executable::Blocking(f) = exec else {
            panic!("expected a blocking executable");
        };
        assert_eq!(f(), Ok("42".to_string()));
    }

    #[test]
    fn anyhow_errors_keep_their_message() {
        let exec = Executable::blocking(|| -> anyhow::Result<&'static str> {
            Err(anyhow::anyhow!("boom"))
        });
        let Executable::Blocking(f) = exec else {
            panic!("expected a blocking executable");
        };
        assert_eq!(f(), Err("boom".to_string()));
    }

    #[tokio::test]
    async fn futures_are_lazy_until_awaited() {
        let exec = Executable::from_future(async { Ok::<_, String>("done") });
        assert_eq!(exec.kind(), "async");
        let Executable::Async(fut) = exec else {
            panic!("expected an async executable");
        };
        assert_eq!(fut.await, Ok("done".to_string()));
    }
}
