//! Opaque string identifiers and their generator
//!
//! Identifiers are strings so saved state from any era stays loadable;
//! the generator hands out `<prefix>-<n>` keys from an atomic counter.

use core::sync::atomic::{AtomicU64, Ordering};
use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap an existing key
            pub fn new(key: impl Into<String>) -> Self {
                Self(key.into())
            }

            /// The raw key
            #[inline]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Empty keys are never valid identifiers
            #[inline]
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({:?})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

string_id!(
    /// Unique, immutable key of a light
    LightId
);
string_id!(
    /// Key of a camera
    CameraId
);
string_id!(
    /// Key of an animation signal
    SignalId
);

/// Thread-safe key generator
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    /// Create a new generator starting at 1
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Next raw key with the given prefix
    pub fn next_key(&self, prefix: &str) -> String {
        let n = self.next.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", prefix, n)
    }

    /// Next key that `taken` does not already contain
    pub fn next_unused(&self, prefix: &str, taken: impl Fn(&str) -> bool) -> String {
        loop {
            let key = self.next_key(prefix);
            if !taken(&key) {
                return key;
            }
        }
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}
