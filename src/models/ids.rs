//! Strongly-typed ID wrappers for all entity types
//!
//! IDs display as a prefix plus the first eight hex digits of the UUID
//! (`dbt-1a2b3c4d`). That short form is what users type on the command line,
//! so every ID can be matched against it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

macro_rules! define_id {
    ($name:ident, $prefix:literal) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Display prefix for this ID type
            pub const PREFIX: &'static str = $prefix;

            /// Create a new random ID
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }

            /// The eight hex digits used in the display form
            pub fn short(&self) -> String {
                self.0.simple().to_string()[..8].to_string()
            }

            /// Whether user input refers to this ID
            ///
            /// Accepts the full UUID, the display form, or a hex prefix of
            /// at least four digits with or without the type prefix.
            pub fn matches(&self, input: &str) -> bool {
                let input = input.trim().to_lowercase();
                let bare = input.strip_prefix($prefix).unwrap_or(&input);
                if let Ok(uuid) = Uuid::parse_str(bare) {
                    return uuid == self.0;
                }
                let bare: String = bare.chars().filter(|c| *c != '-').collect();
                bare.len() >= 4 && self.0.simple().to_string().starts_with(&bare)
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.pad(&format!("{}{}", $prefix, self.short()))
            }
        }

        impl From<Uuid> for $name {
            fn from(uuid: Uuid) -> Self {
                Self(uuid)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            /// Parse a full UUID, optionally carrying the type prefix
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.trim();
                let s = s.strip_prefix($prefix).unwrap_or(s);
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_id!(PartyId, "pty-");
define_id!(CategoryId, "cat-");
define_id!(TransactionId, "txn-");
define_id!(DebtId, "dbt-");
define_id!(InstallmentId, "ins-");
define_id!(PaymentId, "pmt-");
define_id!(ProjectId, "prj-");
define_id!(MilestoneId, "mst-");
define_id!(GrantId, "grt-");
define_id!(ExchangeRateId, "fx-");
