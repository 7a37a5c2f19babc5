use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_string_id {
    ($name:ident) => {
        /// Opaque string identifier. Freshly generated ids are UUIDs, but
        /// ids carried by imported documents are preserved verbatim, so any
        /// non-empty string is valid.
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Generate a fresh unique id.
            pub fn generate() -> Self {
                Self(Uuid::new_v4().to_string())
            }

            /// Wrap an id read from storage or an imported document.
            pub fn from_raw(raw: impl Into<String>) -> Self {
                Self(raw.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::generate()
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
    };
}

// Registry IDs
define_string_id!(ProfileId);

// Quest log IDs
define_string_id!(QuestId);
define_string_id!(ObjectiveId);

// Journal IDs
define_string_id!(EntryId);

// Character sheet IDs
define_string_id!(SpecialId);
