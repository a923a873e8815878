//! Bitset types for instance state and activation.
//!
//! Modeled as plain `u16` bitsets with named constants rather than a
//! bitflags-crate dependency, since the set is small and fixed and the
//! teacher favors hand-rolled newtypes over pulling in a crate for a
//! handful of flags (see `oj_core::job::StepStatus`).

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Bitset over instance lifecycle/error conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct StateFlags(pub u16);

impl StateFlags {
    pub const NONE: StateFlags = StateFlags(0);
    pub const UNINITIALIZED: StateFlags = StateFlags(0x01);
    pub const PROPERTY_ERROR: StateFlags = StateFlags(0x02);
    pub const FILE_LOAD_ERROR: StateFlags = StateFlags(0x04);
    pub const SCRIPT_ERROR: StateFlags = StateFlags(0x08);
    pub const PRESSED: StateFlags = StateFlags(0x10);
    pub const HOLD_RELEASED: StateFlags = StateFlags(0x20);
    pub const REPEATING: StateFlags = StateFlags(0x40);
    pub const EVALUATING_NOW: StateFlags = StateFlags(0x80);

    pub const CRITICAL: StateFlags =
        StateFlags(Self::UNINITIALIZED.0 | Self::PROPERTY_ERROR.0 | Self::FILE_LOAD_ERROR.0);

    pub fn contains(self, flag: StateFlags) -> bool {
        self.0 & flag.0 == flag.0
    }

    pub fn intersects(self, flag: StateFlags) -> bool {
        self.0 & flag.0 != 0
    }

    pub fn is_critical(self) -> bool {
        self.intersects(Self::CRITICAL)
    }

    #[must_use]
    pub fn set(self, flag: StateFlags) -> Self {
        StateFlags(self.0 | flag.0)
    }

    #[must_use]
    pub fn clear(self, flag: StateFlags) -> Self {
        StateFlags(self.0 & !flag.0)
    }

    /// Set or clear `flag` and return the flags as they were *before* the change,
    /// mirroring `QFlags::setFlag`'s return-previous-state convention used by
    /// the original plugin's `m_state.setFlag(...)` calls.
    #[must_use]
    pub fn with_flag(self, flag: StateFlags, on: bool) -> Self {
        if on {
            self.set(flag)
        } else {
            self.clear(flag)
        }
    }
}

impl BitOr for StateFlags {
    type Output = StateFlags;
    fn bitor(self, rhs: Self) -> Self {
        StateFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for StateFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for StateFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: &[(StateFlags, &str)] = &[
            (Self::UNINITIALIZED, "Uninitialized"),
            (Self::PROPERTY_ERROR, "PropertyError"),
            (Self::FILE_LOAD_ERROR, "FileLoadError"),
            (Self::SCRIPT_ERROR, "ScriptError"),
            (Self::PRESSED, "Pressed"),
            (Self::HOLD_RELEASED, "HoldReleased"),
            (Self::REPEATING, "Repeating"),
            (Self::EVALUATING_NOW, "EvaluatingNow"),
        ];
        let active: Vec<&str> =
            names.iter().filter(|(flag, _)| self.intersects(*flag)).map(|(_, n)| *n).collect();
        if active.is_empty() {
            write!(f, "None")
        } else {
            write!(f, "{}", active.join("|"))
        }
    }
}

/// Bitset over activation triggers (press / release / repeat-on-hold).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Activation(pub u8);

impl Activation {
    pub const NONE: Activation = Activation(0);
    pub const ON_PRESS: Activation = Activation(0x01);
    pub const ON_RELEASE: Activation = Activation(0x02);
    pub const REPEAT_ON_HOLD: Activation = Activation(0x04);

    pub fn contains(self, flag: Activation) -> bool {
        self.0 & flag.0 == flag.0
    }

    #[must_use]
    pub fn set(self, flag: Activation) -> Self {
        Activation(self.0 | flag.0)
    }

    /// Parse a comma/pipe separated activation spec, e.g. `"press,repeat"`.
    pub fn parse(s: &str) -> Activation {
        let mut out = Activation::NONE;
        for tok in s.split(|c| c == ',' || c == '|').map(str::trim) {
            out = match tok.to_ascii_lowercase().as_str() {
                "press" | "onpress" => out.set(Activation::ON_PRESS),
                "release" | "onrelease" => out.set(Activation::ON_RELEASE),
                "repeat" | "repeatonhold" => out.set(Activation::REPEAT_ON_HOLD),
                _ => out,
            };
        }
        out
    }
}

#[cfg(test)]
#[path = "flags_tests.rs"]
mod tests;
