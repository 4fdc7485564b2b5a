//! Ordered, asynchronous fan-out to registered observers.
//!
//! `publish` only enqueues; a pump task spawned on the runtime delivers each value
//! to the observers registered at delivery time, one value at a time, in publish
//! order. An observer therefore never runs inside the publisher's call.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::runtime::Handle;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

pub struct Subject<T> {
    tx: UnboundedSender<T>,
    observers: Arc<Mutex<Observers<T>>>,
}

struct Observers<T> {
    next_id: u64,
    list: Vec<(SubscriptionId, Observer<T>)>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
            observers: Arc::clone(&self.observers),
        }
    }
}

impl<T: Send + 'static> Subject<T> {
    pub fn new(handle: &Handle) -> Self {
        let (tx, rx) = unbounded_channel();
        let observers = Arc::new(Mutex::new(Observers {
            next_id: 0,
            list: Vec::new(),
        }));
        handle.spawn(pump(rx, Arc::clone(&observers)));
        Self { tx, observers }
    }

    /// Enqueues `value` for delivery. Returns `false` if the pump has stopped.
    pub fn publish(&self, value: T) -> bool {
        self.tx.send(value).is_ok()
    }

    /// A raw sender feeding this subject, for transports that publish from their own tasks.
    pub fn sender(&self) -> UnboundedSender<T> {
        self.tx.clone()
    }

    pub fn subscribe(&self, observer: impl Fn(&T) + Send + Sync + 'static) -> SubscriptionId {
        let mut observers = lock(&self.observers);
        let id = SubscriptionId(observers.next_id);
        observers.next_id += 1;
        observers.list.push((id, Arc::new(observer)));
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = lock(&self.observers);
        let before = observers.list.len();
        observers.list.retain(|(existing, _)| *existing != id);
        observers.list.len() != before
    }

    pub fn observer_count(&self) -> usize {
        lock(&self.observers).list.len()
    }
}

fn lock<T>(observers: &Mutex<Observers<T>>) -> MutexGuard<'_, Observers<T>> {
    observers.lock().unwrap_or_else(PoisonError::into_inner)
}

async fn pump<T>(mut rx: UnboundedReceiver<T>, observers: Arc<Mutex<Observers<T>>>) {
    while let Some(value) = rx.recv().await {
        // Snapshot so observers may (un)subscribe while being called.
        let snapshot: Vec<Observer<T>> = lock(&observers)
            .list
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        if snapshot.is_empty() {
            tracing::trace!("no observers registered, value dropped");
            continue;
        }
        for observer in snapshot {
            observer(&value);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/channel/subject.rs"]
mod tests;
