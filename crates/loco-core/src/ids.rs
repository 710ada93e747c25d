//! Strongly typed identifier wrappers.
//!
//! Locomotive numbers, contact numbers and junction numbers are all small
//! integers on the layout.  Wrapping them keeps a `ContactId` from ever being
//! passed where a `JunctionId` is expected.

use std::fmt;

/// Generate a typed ID wrapper around a primitive integer.
macro_rules! typed_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident($inner:ty) = $label:literal;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
        #[cfg_attr(feature = "serde", serde(transparent))]
        $vis struct $name(pub $inner);

        impl $name {
            /// The raw number as printed on the layout.
            #[inline(always)]
            pub fn get(self) -> $inner {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " {}"), self.0)
            }
        }

        impl From<$inner> for $name {
            #[inline(always)]
            fn from(n: $inner) -> $name {
                $name(n)
            }
        }
    };
}

typed_id! {
    /// Number of a locomotive (as shown on its cab).
    pub struct LocoId(u32) = "loco";
}

typed_id! {
    /// Number of a position-sensing contact on the track.
    pub struct ContactId(u32) = "contact";
}

typed_id! {
    /// Number of a junction (track switch).
    pub struct JunctionId(u32) = "junction";
}

typed_id! {
    /// Identity of a physical shared block.  Two per-locomotive block
    /// descriptors with the same `BlockId` are arbitrated by one coordinator.
    pub struct BlockId(u32) = "block";
}
