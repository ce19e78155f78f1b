//! # Identifier Newtypes
//!
//! The remote API hands out opaque string identifiers for users, matches
//! (relations) and generated certificates. Each gets its own type so a
//! relation id can never be passed where a certificate id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Identifier of the authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

/// Identifier of a relation (match) between the user and a counterpart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationId(String);

/// Server-issued identifier of a created certificate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CertificateId(String);

macro_rules! string_id {
    ($ty:ident, $kind:literal) => {
        impl $ty {
            /// Wrap a raw identifier, rejecting empty or blank strings.
            pub fn new(raw: impl Into<String>) -> Result<Self, CoreError> {
                let raw = raw.into();
                if raw.trim().is_empty() {
                    return Err(CoreError::EmptyIdentifier { kind: $kind });
                }
                Ok(Self(raw))
            }

            /// Access the raw identifier.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl std::str::FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::new(s)
            }
        }
    };
}

string_id!(UserId, "user");
string_id!(RelationId, "relation");
string_id!(CertificateId, "certificate");
