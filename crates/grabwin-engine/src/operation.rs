//! Per-gesture state shared between the event tap and the actuator.
//!
//! The tap is the only producer: it adds raw deltas and finally marks the
//! record completed. The actuator is the only consumer: it drains the deltas
//! and applies them. Both sides touch the accumulators and the completion flag
//! with atomics only.

use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering},
};

use mac_winops::WindowRef;
use parking_lot::{Mutex, MutexGuard};

use crate::gesture::{Anchor, DragHooks, GestureKind};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// One in-flight gesture.
pub struct Operation {
    id: u64,
    kind: GestureKind,
    window: WindowRef,
    pending_dx: AtomicI64,
    pending_dy: AtomicI64,
    completed: AtomicBool,
    /// Set once the actuator has seen the record.
    adopted: AtomicBool,
    raise: bool,
    /// Strategy of the tap that started the gesture. Hooks are stateless, so
    /// the record can outlive the tap and still get its final apply.
    hooks: Arc<dyn DragHooks>,
    /// Geometry the next apply starts from. Locked only by the actuator
    /// after `start`, so the lock is never contended.
    anchor: Mutex<Option<Anchor>>,
}

impl Operation {
    pub fn new(window: WindowRef, anchor: Anchor, hooks: Arc<dyn DragHooks>, raise: bool) -> Self {
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            kind: hooks.kind(),
            window,
            pending_dx: AtomicI64::new(0),
            pending_dy: AtomicI64::new(0),
            completed: AtomicBool::new(false),
            adopted: AtomicBool::new(false),
            raise,
            hooks,
            anchor: Mutex::new(Some(anchor)),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn kind(&self) -> GestureKind {
        self.kind
    }

    pub fn window(&self) -> &WindowRef {
        &self.window
    }

    /// Whether the window should be raised when the actuator adopts the record.
    pub fn raise(&self) -> bool {
        self.raise
    }

    /// Add a raw delta. Lock-free; called from the event source thread.
    pub fn accumulate(&self, dx: i64, dy: i64) {
        self.pending_dx.fetch_add(dx, Ordering::SeqCst);
        self.pending_dy.fetch_add(dy, Ordering::SeqCst);
    }

    /// Read and reset the pending delta.
    pub fn drain(&self) -> (i64, i64) {
        (
            self.pending_dx.swap(0, Ordering::SeqCst),
            self.pending_dy.swap(0, Ordering::SeqCst),
        )
    }

    /// Pending delta without resetting it.
    pub fn pending(&self) -> (i64, i64) {
        (
            self.pending_dx.load(Ordering::SeqCst),
            self.pending_dy.load(Ordering::SeqCst),
        )
    }

    /// Mark the gesture finished. Returns true only for the call that
    /// performed the transition; the flag never goes back to false.
    pub fn complete(&self) -> bool {
        !self.completed.swap(true, Ordering::SeqCst)
    }

    pub fn is_completed(&self) -> bool {
        self.completed.load(Ordering::SeqCst)
    }

    /// Returns true the first time the actuator sees this record.
    pub(crate) fn adopt(&self) -> bool {
        !self.adopted.swap(true, Ordering::SeqCst)
    }

    /// The drag strategy this gesture was started with.
    pub fn hooks(&self) -> &dyn DragHooks {
        self.hooks.as_ref()
    }

    pub(crate) fn anchor(&self) -> MutexGuard<'_, Option<Anchor>> {
        self.anchor.lock()
    }
}

impl std::fmt::Debug for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Operation")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("window", &self.window)
            .field("pending", &self.pending())
            .field("completed", &self.is_completed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use mac_winops::WindowRef;

    use super::*;
    use crate::gesture::Move;

    fn op() -> Operation {
        Operation::new(WindowRef::synthetic(1), Anchor::default(), Arc::new(Move), false)
    }

    #[test]
    fn drain_sums_and_resets() {
        let op = op();
        op.accumulate(5, 0);
        op.accumulate(3, 2);
        op.accumulate(-1, -1);
        assert_eq!(op.pending(), (7, 1));
        assert_eq!(op.drain(), (7, 1));
        assert_eq!(op.drain(), (0, 0));
    }

    #[test]
    fn completion_is_write_once() {
        let op = op();
        assert!(!op.is_completed());
        assert!(op.complete());
        assert!(!op.complete());
        assert!(op.is_completed());
    }

    #[test]
    fn kind_follows_hooks() {
        let op = op();
        assert_eq!(op.kind(), GestureKind::Move);
        assert_eq!(op.hooks().kind(), GestureKind::Move);
    }

    #[test]
    fn adopt_reports_first_sight_only() {
        let op = op();
        assert!(op.adopt());
        assert!(!op.adopt());
    }

    #[test]
    fn concurrent_accumulate_and_drain_conserve_motion() {
        let op = Arc::new(op());
        let producer = {
            let op = op.clone();
            thread::spawn(move || {
                for i in 0..10_000i64 {
                    op.accumulate(1, i % 3 - 1);
                }
            })
        };
        let mut total = (0i64, 0i64);
        while !producer.is_finished() {
            let (dx, dy) = op.drain();
            total.0 += dx;
            total.1 += dy;
        }
        producer.join().unwrap();
        let (dx, dy) = op.drain();
        total.0 += dx;
        total.1 += dy;
        let expect_dy: i64 = (0..10_000i64).map(|i| i % 3 - 1).sum();
        assert_eq!(total, (10_000, expect_dy));
    }
}
