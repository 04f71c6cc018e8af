//! Observable state containers.
//!
//! A container owns one value and a list of listeners. Every committed
//! change is published to the listeners after the value lock is released,
//! so a listener may read or update the container again without
//! deadlocking. Writers also hold a reentrant delivery lock from commit
//! until their listeners return, so listeners see changes in commit order
//! even when several threads write at once.

use std::sync::Arc;

use parking_lot::{Mutex, ReentrantMutex};

type Listener<S> = Arc<dyn Fn(&S) + Send + Sync>;

struct ObservableInner<S> {
    value: S,
    listeners: Vec<(u64, Listener<S>)>,
    next_listener_id: u64,
}

/// Shared, observable value. Cloning yields another handle to the same value.
pub struct Observable<S> {
    inner: Arc<Mutex<ObservableInner<S>>>,
    delivery: Arc<ReentrantMutex<()>>,
}

impl<S> Clone for Observable<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            delivery: Arc::clone(&self.delivery),
        }
    }
}

impl<S: Clone + Send + 'static> Observable<S> {
    pub fn new(value: S) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ObservableInner {
                value,
                listeners: Vec::new(),
                next_listener_id: 0,
            })),
            delivery: Arc::new(ReentrantMutex::new(())),
        }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> S {
        self.inner.lock().value.clone()
    }

    /// Replaces the value and notifies listeners.
    pub fn set(&self, value: S) {
        self.update(|current| *current = value);
    }

    /// Applies `f` under the lock and notifies listeners with the result.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut S),
    {
        let _delivery = self.delivery.lock();
        let (snapshot, listeners) = {
            let mut inner = self.inner.lock();
            f(&mut inner.value);
            (inner.value.clone(), listeners_of(&inner))
        };
        notify(&snapshot, &listeners);
    }

    /// Like [`Observable::update`], but `f` decides whether anything changed.
    /// Listeners are only notified when it returns `true`.
    pub fn update_if<F>(&self, f: F) -> bool
    where
        F: FnOnce(&mut S) -> bool,
    {
        let _delivery = self.delivery.lock();
        let published = {
            let mut inner = self.inner.lock();
            if f(&mut inner.value) {
                Some((inner.value.clone(), listeners_of(&inner)))
            } else {
                None
            }
        };

        match published {
            Some((snapshot, listeners)) => {
                notify(&snapshot, &listeners);
                true
            }
            None => false,
        }
    }

    /// Registers a listener called after every committed change.
    ///
    /// The listener stays registered until the returned [`Subscription`] is
    /// dropped or [`Subscription::unsubscribe`] is called.
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&S) + Send + Sync + 'static,
    {
        let id = {
            let mut inner = self.inner.lock();
            let id = inner.next_listener_id;
            inner.next_listener_id += 1;
            inner.listeners.push((id, Arc::new(listener)));
            id
        };

        let weak = Arc::downgrade(&self.inner);
        Subscription {
            detach: Some(Box::new(move || {
                if let Some(inner) = weak.upgrade() {
                    inner.lock().listeners.retain(|(listener_id, _)| *listener_id != id);
                }
            })),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.inner.lock().listeners.len()
    }
}

fn listeners_of<S>(inner: &ObservableInner<S>) -> Vec<Listener<S>> {
    inner
        .listeners
        .iter()
        .map(|(_, listener)| Arc::clone(listener))
        .collect()
}

fn notify<S>(snapshot: &S, listeners: &[Listener<S>]) {
    for listener in listeners {
        listener(snapshot);
    }
}

/// Handle returned by `subscribe`. Dropping it unsubscribes.
#[must_use = "dropping the subscription immediately unsubscribes the listener"]
pub struct Subscription {
    detach: Option<Box<dyn FnOnce() + Send + Sync>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        self.detach_now();
    }

    fn detach_now(&mut self) {
        if let Some(detach) = self.detach.take() {
            detach();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach_now();
    }
}
