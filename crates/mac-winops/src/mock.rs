use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::{
    WindowBackend, WindowRef,
    error::{Error, Result},
    geom::{Point, Rect, Size},
};

/// A geometry write observed by the mock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Write {
    Position { id: u64, to: Point },
    Size { id: u64, to: Size },
}

/// Scriptable in-memory backend for tests (enabled with `test-utils` feature).
///
/// Windows are kept topmost-first; `window_at` returns the first window whose
/// frame contains the point.
#[derive(Clone, Default)]
pub struct MockBackend {
    windows: Arc<Mutex<Vec<(u64, Rect)>>>,
    writes: Arc<Mutex<Vec<Write>>>,
    raised: Arc<Mutex<Vec<u64>>>,
    live: Arc<AtomicUsize>,
    fail_resolve: Arc<AtomicBool>,
    fail_read: Arc<AtomicBool>,
    fail_write: Arc<AtomicBool>,
    fail_raise: Arc<AtomicBool>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a window below all existing ones.
    pub fn add_window(&self, id: u64, frame: Rect) {
        self.windows.lock().push((id, frame));
    }

    /// Remove a window; later reads and writes on its handles fail with `WindowGone`.
    pub fn close_window(&self, id: u64) {
        self.windows.lock().retain(|(w, _)| *w != id);
    }

    pub fn frame(&self, id: u64) -> Option<Rect> {
        self.windows
            .lock()
            .iter()
            .find(|(w, _)| *w == id)
            .map(|(_, r)| *r)
    }

    /// All geometry writes in the order they were applied.
    pub fn writes(&self) -> Vec<Write> {
        self.writes.lock().clone()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().len()
    }

    pub fn raised(&self) -> Vec<u64> {
        self.raised.lock().clone()
    }

    /// Number of handles handed out by `window_at` that are still alive.
    pub fn live_handles(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    pub fn set_fail_resolve(&self, v: bool) {
        self.fail_resolve.store(v, Ordering::SeqCst);
    }
    pub fn set_fail_read(&self, v: bool) {
        self.fail_read.store(v, Ordering::SeqCst);
    }
    pub fn set_fail_write(&self, v: bool) {
        self.fail_write.store(v, Ordering::SeqCst);
    }
    pub fn set_fail_raise(&self, v: bool) {
        self.fail_raise.store(v, Ordering::SeqCst);
    }

    fn with_frame<T>(&self, window: &WindowRef, f: impl FnOnce(&mut Rect) -> T) -> Result<T> {
        let mut g = self.windows.lock();
        let (_, r) = g
            .iter_mut()
            .find(|(w, _)| *w == window.id())
            .ok_or(Error::WindowGone)?;
        Ok(f(r))
    }

    fn check_write(&self) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(Error::Injected("write"));
        }
        Ok(())
    }

    fn check_read(&self) -> Result<()> {
        if self.fail_read.load(Ordering::SeqCst) {
            return Err(Error::Injected("read"));
        }
        Ok(())
    }
}

impl WindowBackend for MockBackend {
    fn window_at(&self, at: Point) -> Result<WindowRef> {
        if self.fail_resolve.load(Ordering::SeqCst) {
            return Err(Error::no_window_at(at.x, at.y));
        }
        let id = self
            .windows
            .lock()
            .iter()
            .find(|(_, r)| r.contains(at))
            .map(|(id, _)| *id)
            .ok_or_else(|| Error::no_window_at(at.x, at.y))?;
        Ok(WindowRef::tracked(id, &self.live))
    }

    fn position(&self, window: &WindowRef) -> Result<Point> {
        self.check_read()?;
        self.with_frame(window, |r| r.origin())
    }

    fn set_position(&self, window: &WindowRef, to: Point) -> Result<()> {
        self.check_write()?;
        self.with_frame(window, |r| {
            r.x = to.x;
            r.y = to.y;
        })?;
        self.writes.lock().push(Write::Position {
            id: window.id(),
            to,
        });
        Ok(())
    }

    fn size(&self, window: &WindowRef) -> Result<Size> {
        self.check_read()?;
        self.with_frame(window, |r| r.size())
    }

    fn set_size(&self, window: &WindowRef, to: Size) -> Result<()> {
        self.check_write()?;
        self.with_frame(window, |r| {
            r.w = to.width;
            r.h = to.height;
        })?;
        self.writes.lock().push(Write::Size {
            id: window.id(),
            to,
        });
        Ok(())
    }

    fn raise(&self, window: &WindowRef) -> Result<()> {
        if self.fail_raise.load(Ordering::SeqCst) {
            return Err(Error::Injected("raise"));
        }
        self.with_frame(window, |_| ())?;
        self.raised.lock().push(window.id());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(x: f64, y: f64, w: f64, h: f64) -> Rect {
        Rect::new(Point::new(x, y), Size::new(w, h))
    }

    #[test]
    fn resolves_topmost_window_containing_point() {
        let m = MockBackend::new();
        m.add_window(1, frame(0.0, 0.0, 100.0, 100.0));
        m.add_window(2, frame(50.0, 50.0, 200.0, 200.0));
        assert_eq!(m.window_at(Point::new(60.0, 60.0)).unwrap().id(), 1);
        assert_eq!(m.window_at(Point::new(150.0, 150.0)).unwrap().id(), 2);
        assert_eq!(
            m.window_at(Point::new(500.0, 500.0)).unwrap_err(),
            Error::NoWindowAt { x: 500, y: 500 }
        );
    }

    #[test]
    fn writes_update_frame_and_log() {
        let m = MockBackend::new();
        m.add_window(1, frame(100.0, 100.0, 300.0, 200.0));
        let w = m.window_at(Point::new(150.0, 150.0)).unwrap();
        m.set_position(&w, Point::new(107.0, 101.0)).unwrap();
        m.set_size(&w, Size::new(310.0, 190.0)).unwrap();
        assert_eq!(m.frame(1), Some(frame(107.0, 101.0, 310.0, 190.0)));
        assert_eq!(m.write_count(), 2);
        assert_eq!(
            m.writes()[0],
            Write::Position {
                id: 1,
                to: Point::new(107.0, 101.0)
            }
        );
    }

    #[test]
    fn closed_window_reports_gone() {
        let m = MockBackend::new();
        m.add_window(1, frame(0.0, 0.0, 10.0, 10.0));
        let w = m.window_at(Point::new(1.0, 1.0)).unwrap();
        m.close_window(1);
        assert_eq!(m.position(&w), Err(Error::WindowGone));
        assert_eq!(m.set_size(&w, Size::new(1.0, 1.0)), Err(Error::WindowGone));
        assert_eq!(m.raise(&w), Err(Error::WindowGone));
    }

    #[test]
    fn injected_failures_and_live_handles() {
        let m = MockBackend::new();
        m.add_window(1, frame(0.0, 0.0, 10.0, 10.0));
        let w = m.window_at(Point::new(1.0, 1.0)).unwrap();
        assert_eq!(m.live_handles(), 1);
        m.set_fail_read(true);
        assert_eq!(m.size(&w), Err(Error::Injected("read")));
        m.set_fail_write(true);
        assert_eq!(
            m.set_position(&w, Point::default()),
            Err(Error::Injected("write"))
        );
        m.set_fail_resolve(true);
        assert!(m.window_at(Point::new(1.0, 1.0)).is_err());
        drop(w);
        assert_eq!(m.live_handles(), 0);
    }
}
