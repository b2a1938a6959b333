//! Type-safe identifier wrappers around [`Uuid`].
//!
//! Every record the engine stores has a strongly-typed ID so a case ID can
//! never be handed to a cluster command by accident. All IDs use UUID v7:
//! a millisecond timestamp prefix followed by random bits, which keeps IDs
//! unique per call and sortable by creation time.
//!
//! IDs serialize as plain UUID strings, which is the form collaborators
//! hold on to and hand back (e.g. the cluster ID passed to
//! `dispatch_team`).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Generates a newtype wrapper around [`Uuid`] with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub Uuid);

        impl $name {
            /// Create a new identifier using UUID v7 (time-ordered).
            pub fn new() -> Self {
                Self(Uuid::now_v7())
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

        impl core::str::FromStr for $name {
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
    /// Unique identifier for a submitted case report.
    CaseId
}

define_id! {
    /// Unique identifier for a water-quality observation.
    WaterLogId
}

define_id! {
    /// Unique identifier for a detected or declared case cluster.
    ClusterId
}

define_id! {
    /// Unique identifier for an entry in the alert log.
    AlertId
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn consecutive_ids_are_unique() {
        let a = CaseId::new();
        let b = CaseId::new();
        assert_ne!(a, b);
        assert_ne!(a.into_inner(), Uuid::nil());
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = ClusterId::new();
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn id_parses_from_display_form() {
        let id = WaterLogId::new();
        let parsed: Result<WaterLogId, _> = id.to_string().parse();
        assert_eq!(parsed.ok(), Some(id));
    }

    #[test]
    fn garbage_does_not_parse() {
        let parsed: Result<ClusterId, _> = "not-a-cluster".parse();
        assert!(parsed.is_err());
    }
}
