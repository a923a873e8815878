//! Host-chosen names: instance names and engine names.
//!
//! Unlike [`crate::id::IdBuf`]-backed ids, these are not generated — they
//! come from the host (or from the instance name itself, for the common
//! "private engine named after its instance" case) and must be normalized
//! the same way every time so that registry lookups are stable.

use smol_str::SmolStr;
use std::borrow::Borrow;
use std::fmt;

/// Name of the Shared engine, created eagerly at startup.
pub const SHARED_ENGINE_NAME: &str = "Shared";

/// Default module-import alias when none is configured.
pub const DEFAULT_MODULE_ALIAS: &str = "M";

/// Collapse runs of ASCII whitespace into single spaces and trim the ends.
///
/// Mirrors the "whitespace-collapsed" normalization required of instance
/// names so that `"  My   Instance "` and `"My Instance"` name the same
/// instance.
pub fn collapse_whitespace(s: &str) -> SmolStr {
    let mut out = String::with_capacity(s.len());
    let mut last_was_space = false;
    for c in s.trim().chars() {
        if c.is_whitespace() {
            if !last_was_space {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(c);
            last_was_space = false;
        }
    }
    SmolStr::new(out)
}

/// Error returned when a name fails validation.
#[derive(Debug, Clone, thiserror::Error)]
#[error("name must not be empty")]
pub struct EmptyNameError;

macro_rules! host_name_type {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(SmolStr);

        impl $name {
            /// Construct from raw host input, collapsing whitespace.
            ///
            /// Returns an error for a name that is empty after trimming.
            pub fn new(raw: impl AsRef<str>) -> Result<Self, EmptyNameError> {
                let collapsed = collapse_whitespace(raw.as_ref());
                if collapsed.is_empty() {
                    Err(EmptyNameError)
                } else {
                    Ok(Self(collapsed))
                }
            }

            pub fn as_str(&self) -> &str {
                self.0.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                self.0.as_str()
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0.as_str() == other
            }
        }

        impl From<&str> for $name {
            /// Infallible conversion for call sites that already know the
            /// input is non-empty (e.g. constants); panics are avoided by
            /// falling back to a single space rather than an empty name.
            fn from(s: &str) -> Self {
                let collapsed = collapse_whitespace(s);
                Self(if collapsed.is_empty() { SmolStr::new(" ") } else { collapsed })
            }
        }
    };
}

host_name_type!(InstanceName);
host_name_type!(EngineName);

impl EngineName {
    pub fn shared() -> Self {
        EngineName::from(SHARED_ENGINE_NAME)
    }

    pub fn is_shared(&self) -> bool {
        self.0.as_str() == SHARED_ENGINE_NAME
    }
}

#[cfg(test)]
#[path = "names_tests.rs"]
mod tests;
