//! Move and resize specializations of the drag hook protocol.

use std::fmt;

use mac_winops::{Point, Size, WindowBackend, WindowRef};
use tracing::{debug, trace};

use crate::error::Result;

/// Which window attribute a gesture drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    Move,
    Resize,
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move => write!(f, "move"),
            Self::Resize => write!(f, "resize"),
        }
    }
}

/// The numeric pair a gesture keeps between applies: the origin for a move,
/// the extent for a resize. Both advance by the same raw delta.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

impl Anchor {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Advance by a raw input delta.
    pub fn offset(self, dx: i64, dy: i64) -> Self {
        Self::new(self.x + dx as f64, self.y + dy as f64)
    }
}

impl From<Point> for Anchor {
    fn from(p: Point) -> Self {
        Self::new(p.x, p.y)
    }
}

impl From<Size> for Anchor {
    fn from(s: Size) -> Self {
        Self::new(s.width, s.height)
    }
}

impl From<Anchor> for Point {
    fn from(a: Anchor) -> Self {
        Self::new(a.x, a.y)
    }
}

impl From<Anchor> for Size {
    fn from(a: Anchor) -> Self {
        Self::new(a.x, a.y)
    }
}

/// Capability interface a tap is specialized with.
///
/// `start` runs on the event source thread when a qualifying button press
/// resolves to a window. `drag` and `end` run on the actuator thread only.
pub trait DragHooks: Send + Sync {
    fn kind(&self) -> GestureKind;

    /// Read the geometry this gesture drives. An error aborts the gesture
    /// before any record exists.
    fn start(&self, backend: &dyn WindowBackend, window: &WindowRef) -> Result<Anchor>;

    /// Add a drained delta to `anchor`, write it through the backend and
    /// return the new anchor.
    fn drag(
        &self,
        backend: &dyn WindowBackend,
        window: &WindowRef,
        anchor: Anchor,
        dx: i64,
        dy: i64,
    ) -> Result<Anchor>;

    /// The final drain has been applied; nothing else is written.
    fn end(&self, window: &WindowRef) {
        debug!(kind = %self.kind(), ?window, "drag_end");
    }
}

/// Translates the window origin.
#[derive(Debug, Default, Clone, Copy)]
pub struct Move;

/// Translates the window extent; the origin stays put.
#[derive(Debug, Default, Clone, Copy)]
pub struct Resize;

impl DragHooks for Move {
    fn kind(&self) -> GestureKind {
        GestureKind::Move
    }

    fn start(&self, backend: &dyn WindowBackend, window: &WindowRef) -> Result<Anchor> {
        Ok(backend.position(window)?.into())
    }

    fn drag(
        &self,
        backend: &dyn WindowBackend,
        window: &WindowRef,
        anchor: Anchor,
        dx: i64,
        dy: i64,
    ) -> Result<Anchor> {
        let to = anchor.offset(dx, dy);
        trace!(?window, dx, dy, x = to.x, y = to.y, "move_apply");
        backend.set_position(window, to.into())?;
        Ok(to)
    }
}

impl DragHooks for Resize {
    fn kind(&self) -> GestureKind {
        GestureKind::Resize
    }

    fn start(&self, backend: &dyn WindowBackend, window: &WindowRef) -> Result<Anchor> {
        Ok(backend.size(window)?.into())
    }

    fn drag(
        &self,
        backend: &dyn WindowBackend,
        window: &WindowRef,
        anchor: Anchor,
        dx: i64,
        dy: i64,
    ) -> Result<Anchor> {
        let to = anchor.offset(dx, dy);
        trace!(?window, dx, dy, w = to.x, h = to.y, "resize_apply");
        backend.set_size(window, to.into())?;
        Ok(to)
    }
}

#[cfg(test)]
mod tests {
    use mac_winops::{MockBackend, Rect, Write};

    use super::*;

    fn setup() -> (MockBackend, WindowRef) {
        let m = MockBackend::new();
        m.add_window(
            1,
            Rect::new(Point::new(100.0, 100.0), Size::new(400.0, 300.0)),
        );
        let w = m.window_at(Point::new(150.0, 150.0)).unwrap();
        (m, w)
    }

    #[test]
    fn move_reads_origin_and_writes_offset() {
        let (m, w) = setup();
        let a = Move.start(&m, &w).unwrap();
        assert_eq!(a, Anchor::new(100.0, 100.0));
        let a = Move.drag(&m, &w, a, 7, 1).unwrap();
        assert_eq!(a, Anchor::new(107.0, 101.0));
        assert_eq!(
            m.writes(),
            vec![Write::Position {
                id: 1,
                to: Point::new(107.0, 101.0)
            }]
        );
        // Extent is untouched.
        assert_eq!(m.frame(1).unwrap().size(), Size::new(400.0, 300.0));
    }

    #[test]
    fn resize_reads_extent_and_writes_growth() {
        let (m, w) = setup();
        let a = Resize.start(&m, &w).unwrap();
        assert_eq!(a, Anchor::new(400.0, 300.0));
        let a = Resize.drag(&m, &w, a, -50, 20).unwrap();
        assert_eq!(a, Anchor::new(350.0, 320.0));
        assert_eq!(m.frame(1).unwrap().origin(), Point::new(100.0, 100.0));
    }

    #[test]
    fn anchor_converts_to_both_geometries() {
        let a = Anchor::from(Point::new(10.0, 20.0)).offset(-3, 5);
        assert_eq!(Point::from(a), Point::new(7.0, 25.0));
        let a = Anchor::from(Size::new(400.0, 300.0)).offset(1, -1);
        assert_eq!(Size::from(a), Size::new(401.0, 299.0));
    }

    #[test]
    fn start_fails_when_backend_read_fails() {
        let (m, w) = setup();
        m.set_fail_read(true);
        assert!(Move.start(&m, &w).is_err());
        assert!(Resize.start(&m, &w).is_err());
    }

    #[test]
    fn drag_propagates_write_failure_without_advancing() {
        let (m, w) = setup();
        let a = Move.start(&m, &w).unwrap();
        m.close_window(1);
        assert!(Move.drag(&m, &w, a, 1, 1).is_err());
    }
}
