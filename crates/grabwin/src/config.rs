//! User configuration: which button and modifiers drive each gesture.
//!
//! Read once at startup from an optional RON file, then patched by command
//! line overrides. Nothing is ever written back.

use std::{fmt, fs, path::Path};

use clap::ValueEnum;
use grabwin_engine::{ActuatorConfig, TapConfig};
use mac_mousetap::{Modifiers, MouseButton};
use serde::{Deserialize, Serialize};

use crate::{
    cli::Overrides,
    error::{Error, Result},
};

/// Highest accepted `tick_hz`.
const MAX_TICK_HZ: u32 = 1000;

/// Mouse button a gesture is bound to, or none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Button {
    /// Primary button.
    #[default]
    Left,
    /// Secondary button.
    Right,
    /// The gesture is switched off.
    Disabled,
}

impl Button {
    /// The event tap button, or `None` when disabled.
    fn mouse(self) -> Option<MouseButton> {
        match self {
            Self::Left => Some(MouseButton::Left),
            Self::Right => Some(MouseButton::Right),
            Self::Disabled => None,
        }
    }
}

/// Settings for one gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gesture {
    /// Button that starts the drag.
    pub button: Button,
    /// Modifier spec that must be held, e.g. `"cmd+shift"`.
    pub modifiers: String,
    /// Bring the window to the front when grabbed.
    pub raise: bool,
}

impl Gesture {
    /// A gesture on the left button with the given modifiers.
    fn left(modifiers: &str) -> Self {
        Self {
            button: Button::Left,
            modifiers: modifiers.to_string(),
            raise: false,
        }
    }
}

impl Default for Gesture {
    fn default() -> Self {
        Self::left("")
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Drag-to-move binding.
    #[serde(rename = "move")]
    pub move_gesture: Gesture,
    /// Drag-to-resize binding.
    #[serde(rename = "resize")]
    pub resize_gesture: Gesture,
    /// Geometry updates per second while dragging.
    pub tick_hz: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            move_gesture: Gesture::left("cmd+shift"),
            resize_gesture: Gesture::left("opt+shift"),
            tick_hz: 120,
        }
    }
}

/// A validated configuration, ready to build taps from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolved {
    /// Move tap, unless disabled.
    pub move_tap: Option<TapConfig>,
    /// Resize tap, unless disabled.
    pub resize_tap: Option<TapConfig>,
    /// Actuator timing.
    pub actuator: ActuatorConfig,
    /// Rate the actuator tick was derived from.
    pub tick_hz: u32,
}

impl Config {
    /// Parse a RON document. Missing fields take their defaults.
    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        ron::from_str(text).map_err(|e| Error::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&text, path)
    }

    /// Patch fields the command line set explicitly.
    pub fn apply(&mut self, o: &Overrides) {
        if let Some(m) = &o.move_modifiers {
            self.move_gesture.modifiers.clone_from(m);
        }
        if let Some(m) = &o.resize_modifiers {
            self.resize_gesture.modifiers.clone_from(m);
        }
        if let Some(b) = o.move_button {
            self.move_gesture.button = b;
        }
        if let Some(b) = o.resize_button {
            self.resize_gesture.button = b;
        }
        if o.raise {
            self.move_gesture.raise = true;
            self.resize_gesture.raise = true;
        }
        if let Some(hz) = o.tick_hz {
            self.tick_hz = hz;
        }
    }

    /// Validate and convert into engine configuration.
    pub fn resolve(&self) -> Result<Resolved> {
        if !(1..=MAX_TICK_HZ).contains(&self.tick_hz) {
            return Err(Error::Invalid(format!(
                "tick_hz must be between 1 and {MAX_TICK_HZ}, got {}",
                self.tick_hz
            )));
        }
        let move_tap = tap_config("move", &self.move_gesture)?;
        let resize_tap = tap_config("resize", &self.resize_gesture)?;
        match (move_tap, resize_tap) {
            (None, None) => {
                return Err(Error::Invalid(
                    "both gestures are disabled; nothing to do".into(),
                ));
            }
            (Some(m), Some(r)) if m.button == r.button && m.modifiers == r.modifiers => {
                return Err(Error::Invalid(format!(
                    "move and resize are both bound to {:?} with {}",
                    m.button, m.modifiers
                )));
            }
            _ => {}
        }
        Ok(Resolved {
            move_tap,
            resize_tap,
            actuator: ActuatorConfig::from_hz(self.tick_hz),
            tick_hz: self.tick_hz,
        })
    }
}

/// Build the tap settings for one gesture. A bare button with no modifiers
/// would swallow every click, so an empty spec is rejected.
fn tap_config(name: &str, g: &Gesture) -> Result<Option<TapConfig>> {
    let Some(button) = g.button.mouse() else {
        return Ok(None);
    };
    let modifiers = Modifiers::from_spec(&g.modifiers)
        .map_err(|e| Error::Invalid(format!("{name}.modifiers: {e}")))?;
    if modifiers.is_empty() {
        return Err(Error::Invalid(format!(
            "{name}.modifiers must name at least one modifier"
        )));
    }
    Ok(Some(TapConfig {
        button,
        modifiers,
        raise: g.raise,
    }))
}

impl fmt::Display for Resolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, tap) in [("move", self.move_tap), ("resize", self.resize_tap)] {
            match tap {
                Some(t) => writeln!(
                    f,
                    "{name:<8}{:<7}{} raise={}",
                    format!("{:?}", t.button).to_lowercase(),
                    t.modifiers,
                    t.raise
                )?,
                None => writeln!(f, "{name:<8}disabled")?,
            }
        }
        write!(f, "tick    {} Hz", self.tick_hz)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn parse(text: &str) -> Result<Config> {
        Config::parse(text, &PathBuf::from("test.ron"))
    }

    #[test]
    fn defaults_resolve() {
        let r = Config::default().resolve().unwrap();
        let m = r.move_tap.unwrap();
        assert_eq!(m.button, MouseButton::Left);
        assert_eq!(m.modifiers, Modifiers::COMMAND | Modifiers::SHIFT);
        let z = r.resize_tap.unwrap();
        assert_eq!(z.modifiers, Modifiers::OPTION | Modifiers::SHIFT);
        assert_eq!(r.actuator, ActuatorConfig::from_hz(120));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let c = parse("(resize: (button: Right, modifiers: \"ctrl\"), tick_hz: 60)").unwrap();
        assert_eq!(c.move_gesture, Config::default().move_gesture);
        assert_eq!(c.resize_gesture.button, Button::Right);
        assert_eq!(c.resize_gesture.modifiers, "ctrl");
        assert!(!c.resize_gesture.raise);
        assert_eq!(c.tick_hz, 60);
    }

    #[test]
    fn full_file_parses() {
        let c = parse(
            r#"(
                move: (button: Left, modifiers: "cmd+shift", raise: true),
                resize: (button: Disabled, modifiers: "", raise: false),
                tick_hz: 240,
            )"#,
        )
        .unwrap();
        let r = c.resolve().unwrap();
        assert!(r.move_tap.unwrap().raise);
        assert!(r.resize_tap.is_none());
        assert_eq!(r.tick_hz, 240);
    }

    #[test]
    fn unknown_field_is_a_parse_error() {
        assert!(matches!(parse("(speed: 3)"), Err(Error::Parse { .. })));
    }

    #[test]
    fn rejects_bad_values() {
        let mut c = Config::default();
        c.tick_hz = 0;
        assert!(matches!(c.resolve(), Err(Error::Invalid(_))));
        c.tick_hz = 1001;
        assert!(matches!(c.resolve(), Err(Error::Invalid(_))));

        let mut c = Config::default();
        c.move_gesture.modifiers = "cmd+hyper".into();
        let err = c.resolve().unwrap_err().to_string();
        assert!(err.contains("move.modifiers"), "{err}");

        let mut c = Config::default();
        c.resize_gesture.modifiers = String::new();
        assert!(matches!(c.resolve(), Err(Error::Invalid(_))));
    }

    #[test]
    fn rejects_identical_bindings() {
        let mut c = Config::default();
        c.resize_gesture.modifiers = "shift+cmd".into();
        assert!(matches!(c.resolve(), Err(Error::Invalid(_))));
        c.resize_gesture.button = Button::Right;
        assert!(c.resolve().is_ok());
    }

    #[test]
    fn rejects_all_disabled() {
        let mut c = Config::default();
        c.move_gesture.button = Button::Disabled;
        c.resize_gesture.button = Button::Disabled;
        assert!(matches!(c.resolve(), Err(Error::Invalid(_))));
    }

    #[test]
    fn overrides_patch_only_what_was_given() {
        let mut c = Config::default();
        c.apply(&Overrides {
            move_button: Some(Button::Right),
            resize_modifiers: Some("ctrl+opt".into()),
            raise: true,
            ..Overrides::default()
        });
        assert_eq!(c.move_gesture.button, Button::Right);
        assert_eq!(c.move_gesture.modifiers, "cmd+shift");
        assert_eq!(c.resize_gesture.modifiers, "ctrl+opt");
        assert!(c.move_gesture.raise && c.resize_gesture.raise);
        assert_eq!(c.tick_hz, 120);
    }

    #[test]
    fn display_lists_bindings() {
        let mut c = Config::default();
        c.resize_gesture.button = Button::Disabled;
        let text = c.resolve().unwrap().to_string();
        assert!(text.contains("move    left   shift+cmd raise=false"), "{text}");
        assert!(text.contains("resize  disabled"), "{text}");
        assert!(text.ends_with("tick    120 Hz"), "{text}");
    }
}
