//! Promise serializer for a single-threaded backend.
//!
//! Wraps an async operation so that at most one physical invocation is in flight.
//! While a call runs, later calls wait in a single slot: each new call replaces the
//! queued one, and the replaced caller receives [`Preempted`]. When the in-flight
//! call settles, the queued call (if any) runs next.
//!
//! Callers must treat [`Preempted`] as "a newer request owns the result", not as a
//! backend failure. A backend call that panics resolves to [`Panicked`] and still
//! frees the slot for the queued call.

use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::oneshot;

/// Rejection handed to a call that was superseded before it got to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("Preempted")]
pub struct Preempted;

/// The wrapped operation panicked while building or running its future.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, thiserror::Error)]
#[error("serialized operation panicked")]
pub struct Panicked;

type OpFuture<T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'static>>;
type Operation<A, T, E> = dyn Fn(A) -> OpFuture<T, E> + Send + Sync;

pub struct Serializer<A, T, E> {
    inner: Arc<Inner<A, T, E>>,
}

struct Inner<A, T, E> {
    handle: Handle,
    op: Box<Operation<A, T, E>>,
    state: Mutex<State<A, T, E>>,
}

struct State<A, T, E> {
    in_flight: bool,
    generation: u64,
    queued: Option<Waiter<A, T, E>>,
}

struct Waiter<A, T, E> {
    args: A,
    reply: oneshot::Sender<Result<T, E>>,
}

impl<A, T, E> Clone for Serializer<A, T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, T, E> Serializer<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: From<Preempted> + From<Panicked> + Send + 'static,
{
    /// Wraps `op`. Invocations are driven on `handle`, so the returned futures
    /// make progress even if a superseded caller stops polling.
    pub fn new<F, Fut>(handle: Handle, op: F) -> Self
    where
        F: Fn(A) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        let op: Box<Operation<A, T, E>> = Box::new(move |args| Box::pin(op(args)));
        Self {
            inner: Arc::new(Inner {
                handle,
                op,
                state: Mutex::new(State {
                    in_flight: false,
                    generation: 0,
                    queued: None,
                }),
            }),
        }
    }

    /// Submits a call. The future resolves with the operation's own result, or with
    /// [`Preempted`] if a newer call replaced this one while it was queued.
    pub fn call(&self, args: A) -> impl Future<Output = Result<T, E>> + Send + 'static {
        let (reply, rx) = oneshot::channel();
        self.inner.enqueue(Waiter { args, reply });
        async move { rx.await.unwrap_or_else(|_| Err(E::from(Preempted))) }
    }

    /// Rejects the queued call and marks the in-flight one stale, so its eventual
    /// result is reported as [`Preempted`] instead of being delivered.
    pub fn invalidate(&self) {
        let stale = {
            let mut state = self.inner.lock_state();
            state.generation += 1;
            state.queued.take()
        };
        if let Some(waiter) = stale {
            let _ = waiter.reply.send(Err(E::from(Preempted)));
        }
    }

    pub fn is_busy(&self) -> bool {
        self.inner.lock_state().in_flight
    }
}

impl<A, T, E> Inner<A, T, E>
where
    A: Send + 'static,
    T: Send + 'static,
    E: From<Preempted> + From<Panicked> + Send + 'static,
{
    fn lock_state(&self) -> MutexGuard<'_, State<A, T, E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(self: &Arc<Self>, waiter: Waiter<A, T, E>) {
        let (superseded, start) = {
            let mut state = self.lock_state();
            let superseded = state.queued.replace(waiter);
            let start = if state.in_flight {
                None
            } else {
                state.in_flight = true;
                let generation = state.generation;
                state.queued.take().map(|w| (w, generation))
            };
            (superseded, start)
        };

        if let Some(old) = superseded {
            tracing::trace!("serialized call preempted");
            let _ = old.reply.send(Err(E::from(Preempted)));
        }
        if let Some((waiter, generation)) = start {
            self.run(waiter, generation);
        }
    }

    fn run(self: &Arc<Self>, waiter: Waiter<A, T, E>, generation: u64) {
        let Waiter { args, reply } = waiter;
        let built = panic::catch_unwind(AssertUnwindSafe(|| (self.op)(args)));
        let fut: OpFuture<T, E> = match built {
            Ok(fut) => fut,
            Err(_) => Box::pin(std::future::ready(Err(E::from(Panicked)))),
        };
        // A separate task, so a panic surfaces as a JoinError here instead of
        // unwinding past the slot bookkeeping below.
        let call = self.handle.spawn(fut);
        let inner = Arc::clone(self);
        self.handle.spawn(async move {
            let result = match call.await {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(error = %e, "serialized operation did not complete");
                    Err(E::from(Panicked))
                }
            };
            let (current, next) = {
                let mut state = inner.lock_state();
                let current = state.generation == generation;
                let next_generation = state.generation;
                let next = state.queued.take().map(|w| (w, next_generation));
                state.in_flight = next.is_some();
                (current, next)
            };

            let result = if current {
                result
            } else {
                Err(E::from(Preempted))
            };
            let _ = reply.send(result);

            if let Some((waiter, generation)) = next {
                inner.run(waiter, generation);
            }
        });
    }
}

#[cfg(test)]
#[path = "../tests/unit/serializer.rs"]
mod tests;
