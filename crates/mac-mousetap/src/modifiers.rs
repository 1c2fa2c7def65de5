use std::fmt;

use bitflags::bitflags;

use crate::Error;

bitflags! {
    /// Modifier-key mask, laid out on the CoreGraphics `CGEventFlags` bits so a
    /// raw event flag word converts with a plain truncation.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u64 {
        /// Caps Lock engaged.
        const CAPS_LOCK = 1 << 16;
        /// Either Shift key.
        const SHIFT = 1 << 17;
        /// Either Control key.
        const CONTROL = 1 << 18;
        /// Either Option (Alt) key.
        const OPTION = 1 << 19;
        /// Either Command key.
        const COMMAND = 1 << 20;
        /// The Fn key.
        const FUNCTION = 1 << 23;
    }
}

/// Canonical spec word for each flag, in render order.
const NAMES: &[(Modifiers, &str)] = &[
    (Modifiers::CONTROL, "ctrl"),
    (Modifiers::OPTION, "opt"),
    (Modifiers::SHIFT, "shift"),
    (Modifiers::COMMAND, "cmd"),
    (Modifiers::FUNCTION, "fn"),
    (Modifiers::CAPS_LOCK, "caps"),
];

impl Modifiers {
    /// Keep only the modifier bits of a raw CoreGraphics flag word.
    pub fn from_cg_flags(flags: u64) -> Self {
        Self::from_bits_truncate(flags)
    }

    /// True when every modifier in `required` is held. Extra modifiers do not
    /// prevent a match.
    pub fn satisfies(self, required: Self) -> bool {
        self.contains(required)
    }

    /// Parse a `+`-separated modifier spec such as `"cmd+shift"`.
    ///
    /// Words are case-insensitive and accept common aliases
    /// (command/cmd, control/ctrl, option/opt/alt, function/fn, capslock/caps).
    /// An empty spec parses to the empty mask.
    pub fn from_spec(spec: &str) -> Result<Self, Error> {
        let mut out = Self::empty();
        for word in spec.split('+').map(str::trim).filter(|w| !w.is_empty()) {
            let m = match word.to_ascii_lowercase().as_str() {
                "cmd" | "command" => Self::COMMAND,
                "shift" => Self::SHIFT,
                "ctrl" | "control" => Self::CONTROL,
                "opt" | "option" | "alt" => Self::OPTION,
                "fn" | "function" => Self::FUNCTION,
                "caps" | "capslock" => Self::CAPS_LOCK,
                "none" => Self::empty(),
                _ => return Err(Error::InvalidModifier(word.to_string())),
            };
            out |= m;
        }
        Ok(out)
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = NAMES
            .iter()
            .filter(|(m, _)| self.contains(*m))
            .map(|(_, n)| *n)
            .collect();
        if parts.is_empty() {
            write!(f, "none")
        } else {
            write!(f, "{}", parts.join("+"))
        }
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn parses_aliases_case_insensitively() {
        assert_eq!(
            Modifiers::from_spec("Cmd+shift").unwrap(),
            Modifiers::COMMAND | Modifiers::SHIFT
        );
        assert_eq!(
            Modifiers::from_spec("alt + Control").unwrap(),
            Modifiers::OPTION | Modifiers::CONTROL
        );
        assert_eq!(Modifiers::from_spec("").unwrap(), Modifiers::empty());
        assert_eq!(
            Modifiers::from_spec("cmd+hyper"),
            Err(Error::InvalidModifier("hyper".into()))
        );
    }

    #[test]
    fn display_is_canonical_and_parses_back() {
        let m = Modifiers::SHIFT | Modifiers::COMMAND | Modifiers::CONTROL;
        assert_eq!(m.to_string(), "ctrl+shift+cmd");
        assert_eq!(Modifiers::from_spec(&m.to_string()).unwrap(), m);
        assert_eq!(Modifiers::empty().to_string(), "none");
        assert_eq!(Modifiers::from_spec("none").unwrap(), Modifiers::empty());
    }

    #[test]
    fn cg_flags_drop_unrelated_bits() {
        // 0x100 is a device-dependent bit, 1 << 21 is NumericPad.
        let raw = 0x100 | (1 << 21) | (1 << 17) | (1 << 20);
        assert_eq!(
            Modifiers::from_cg_flags(raw),
            Modifiers::SHIFT | Modifiers::COMMAND
        );
    }

    proptest! {
        #[test]
        fn containment_not_equality(required in 0u64..64, extra in 0u64..64) {
            let spread = |b: u64| {
                let mut m = Modifiers::empty();
                for (i, (flag, _)) in NAMES.iter().enumerate() {
                    if b & (1 << i) != 0 {
                        m |= *flag;
                    }
                }
                m
            };
            let required = spread(required);
            let held = required | spread(extra);
            prop_assert!(held.satisfies(required));
            let missing = required - spread(extra);
            if !missing.is_empty() {
                prop_assert!(!spread(extra).satisfies(required));
            }
        }
    }
}
