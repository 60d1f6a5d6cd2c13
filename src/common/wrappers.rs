//! Zero-cost wrappers for safe indexing.

use crate::common::*;

/// Declares a `usize` wrapper with conversions, display and successor.
macro_rules! wrap_usize {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(usize);
        impl $name {
            /// Wraps a `usize`.
            pub const fn new(idx: usize) -> Self {
                $name(idx)
            }
            /// Inner `usize`.
            pub const fn get(self) -> usize {
                self.0
            }
            /// Increments the index.
            pub fn inc(&mut self) {
                self.0 += 1
            }
            /// Default string representation: prefix and index.
            pub fn default_str(&self) -> String {
                format!("{}_{}", $prefix, self.0)
            }
        }
        impl From<usize> for $name {
            fn from(idx: usize) -> Self {
                $name(idx)
            }
        }
        impl From<$name> for usize {
            fn from(idx: $name) -> usize {
                idx.0
            }
        }
        impl fmt::Display for $name {
            fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
                fmt::Display::fmt(&self.0, fmt)
            }
        }
    };
}

wrap_usize! {
    /// Rule indices.
    RulIdx, "r"
}

wrap_usize! {
    /// Indices of the value constraints a session hands to its reasoner.
    ///
    /// Label constraints are numbered from `0`, so the index of a label is its
    /// position in the training map.
    CstrIdx, "c"
}
