//! Type-safe identifier wrappers around [`Uuid`].
//!
//! The farm API hands out UUIDs for every entity. Wrapping each one in its
//! own newtype keeps an animal id from being passed where a zone id is
//! expected. On the wire they stay plain UUID strings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new random identifier.
            ///
            /// The server assigns real ids; this exists for tests and
            /// locally built fixtures.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Return the inner [`Uuid`] value.
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a farm (the tenant a view is scoped to).
    FarmId
}

define_id! {
    /// Unique identifier for a tracked animal.
    AnimalId
}

define_id! {
    /// Unique identifier for a grazing zone.
    ZoneId
}

define_id! {
    /// Unique identifier for a key point (water, barn, gate...).
    KeyPointId
}

define_id! {
    /// Unique identifier for a herd.
    HerdId
}

define_id! {
    /// Unique identifier for a dashboard user.
    UserId
}
