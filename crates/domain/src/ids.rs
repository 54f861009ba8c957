use std::borrow::Borrow;
use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifiers are opaque strings minted by the drawing surface (or by us,
/// as v4 UUIDs). They must survive save/load unchanged, so no format is
/// imposed on ids read back from storage.
macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Graph entity IDs
define_id!(StateId);
define_id!(TriggerId);
define_id!(ConnectionId);

// Decoration IDs
define_id!(RaftId);

/// Name of a view overlay.
///
/// Two families exist: the distinguished `world` view and encounter views
/// named `encounter_<name>`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(String);

impl ViewId {
    pub const WORLD: &'static str = "world";
    pub const ENCOUNTER_PREFIX: &'static str = "encounter_";

    pub fn world() -> Self {
        Self(Self::WORLD.to_string())
    }

    pub fn encounter(name: &str) -> Self {
        Self(format!("{}{}", Self::ENCOUNTER_PREFIX, name))
    }

    pub fn is_world(&self) -> bool {
        self.0 == Self::WORLD
    }

    pub fn is_encounter(&self) -> bool {
        self.encounter_name().is_some()
    }

    /// The encounter name without the `encounter_` prefix.
    pub fn encounter_name(&self) -> Option<&str> {
        self.0
            .strip_prefix(Self::ENCOUNTER_PREFIX)
            .filter(|name| !name.is_empty())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for ViewId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ViewId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl Borrow<str> for ViewId {
    fn borrow(&self) -> &str {
        &self.0
    }
}
