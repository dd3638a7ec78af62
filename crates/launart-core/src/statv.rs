//! `Statv`: a small reactive record.
//!
//! Folds an instance's whole stat set into one `Clone`-able snapshot type
//! and rides `tokio::sync::watch` for the waiter bookkeeping: a `watch`
//! sender always wakes every outstanding receiver on `send_modify`, which
//! gives "notify every queued waiter exactly once" without a hand-rolled
//! waiter-future list.

use tokio::sync::watch;

/// A snapshot type usable as the backing record of a [`Statv`].
///
/// `available` defaults to `true`; specializations override it to
/// report real liveness.
pub trait StatSnapshot: Clone + Send + Sync + 'static {
    fn available(&self) -> bool {
        true
    }
}

/// The observable-record primitive. `T` carries every stat declared for a
/// given specialization (`ConnectionStatus`, `LaunchableStatus`, ...).
#[derive(Debug)]
pub struct Statv<T: StatSnapshot> {
    tx: watch::Sender<T>,
}

impl<T: StatSnapshot> Statv<T> {
    /// Constructs a `Statv` with every stat already populated by `initial`.
    ///
    /// A `missing-required-stat` error (a stat with neither a default
    /// nor a factory, and no value supplied at construction) has no
    /// counterpart here: `T`'s fields are populated eagerly, so a `Statv`
    /// can never be half-constructed.
    pub fn new(initial: T) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// Returns the current snapshot.
    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Applies `mutate` to the record and wakes every currently-queued
    /// waiter with the post-update snapshot, once.
    ///
    /// This single primitive backs both a single-field `set` and a
    /// multi-field `update_multi`: a plain-struct snapshot makes the
    /// distinction disappear (there's no "foreign stat" a closure over
    /// `&mut T` could possibly touch), so `invalid-stat-ownership`
    /// cannot occur in safe code.
    pub fn commit(&self, mutate: impl FnOnce(&mut T)) {
        self.tx.send_modify(mutate);
    }

    /// Suspends until the next `commit`, returning the snapshot before and
    /// after the change. The receiver used to await is local to this call
    /// and dropped on return, so waiters never leak past resolution.
    pub async fn wait_for_update(&self) -> (T, T) {
        let mut rx = self.tx.subscribe();
        let old = rx.borrow().clone();
        rx.changed()
            .await
            .expect("Statv sender outlives every receiver it hands out");
        let new = rx.borrow().clone();
        (old, new)
    }

    /// Loops `wait_for_update` until `available()` holds.
    pub async fn wait_for_available(&self) {
        while !self.get().available() {
            self.wait_for_update().await;
        }
    }

    /// Loops `wait_for_update` until `available()` no longer holds.
    pub async fn wait_for_unavailable(&self) {
        while self.get().available() {
            self.wait_for_update().await;
        }
    }
}
