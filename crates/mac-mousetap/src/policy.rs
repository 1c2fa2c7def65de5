//! Pure classification of raw CoreGraphics mouse event types.

use crate::{EventKind, MouseButton};

// Raw CGEventType numbers for the categories we subscribe to.
const LEFT_MOUSE_DOWN: u32 = 1;
const LEFT_MOUSE_UP: u32 = 2;
const RIGHT_MOUSE_DOWN: u32 = 3;
const RIGHT_MOUSE_UP: u32 = 4;
const LEFT_MOUSE_DRAGGED: u32 = 6;
const RIGHT_MOUSE_DRAGGED: u32 = 7;
const TAP_DISABLED_BY_TIMEOUT: u32 = 0xFFFF_FFFE;
const TAP_DISABLED_BY_USER_INPUT: u32 = 0xFFFF_FFFF;

/// Raw event types a tap bound to `button` subscribes to: down, dragged, up.
pub fn event_types(button: MouseButton) -> [u32; 3] {
    match button {
        MouseButton::Left => [LEFT_MOUSE_DOWN, LEFT_MOUSE_DRAGGED, LEFT_MOUSE_UP],
        MouseButton::Right => [RIGHT_MOUSE_DOWN, RIGHT_MOUSE_DRAGGED, RIGHT_MOUSE_UP],
    }
}

/// Classify a raw event type relative to the button a tap is bound to.
///
/// - Down/dragged/up of the bound button map to their lifecycle phase.
/// - Either disabled notification maps to `TapDisabled`.
/// - Everything else, including the other button's events, is `Other`.
pub fn classify(raw: u32, button: MouseButton) -> EventKind {
    let [down, dragged, up] = event_types(button);
    match raw {
        TAP_DISABLED_BY_TIMEOUT | TAP_DISABLED_BY_USER_INPUT => EventKind::TapDisabled,
        t if t == down => EventKind::Down,
        t if t == dragged => EventKind::Dragged,
        t if t == up => EventKind::Up,
        t => EventKind::Other(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn left_button_lifecycle() {
        assert_eq!(classify(1, MouseButton::Left), EventKind::Down);
        assert_eq!(classify(6, MouseButton::Left), EventKind::Dragged);
        assert_eq!(classify(2, MouseButton::Left), EventKind::Up);
    }

    #[test]
    fn right_button_lifecycle_and_cross_button_is_other() {
        assert_eq!(classify(3, MouseButton::Right), EventKind::Down);
        assert_eq!(classify(7, MouseButton::Right), EventKind::Dragged);
        assert_eq!(classify(4, MouseButton::Right), EventKind::Up);
        assert_eq!(classify(1, MouseButton::Right), EventKind::Other(1));
        assert_eq!(classify(7, MouseButton::Left), EventKind::Other(7));
    }

    #[test]
    fn disabled_notifications_and_unknown_types() {
        assert_eq!(
            classify(0xFFFF_FFFE, MouseButton::Left),
            EventKind::TapDisabled
        );
        assert_eq!(
            classify(0xFFFF_FFFF, MouseButton::Right),
            EventKind::TapDisabled
        );
        // MouseMoved is never subscribed, but must not be misread.
        assert_eq!(classify(5, MouseButton::Left), EventKind::Other(5));
    }

    #[test]
    fn subscribed_types_classify_as_down_dragged_up() {
        for button in [MouseButton::Left, MouseButton::Right] {
            let kinds = event_types(button).map(|t| classify(t, button));
            assert_eq!(
                kinds,
                [EventKind::Down, EventKind::Dragged, EventKind::Up]
            );
        }
    }
}
