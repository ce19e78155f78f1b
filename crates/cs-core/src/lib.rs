//! # cs-core: Foundational Types for the Certificate Workflow
//!
//! Leaf crate of the workspace. Defines the primitives every other crate
//! builds on: UTC timestamps and an injectable clock, identifier newtypes,
//! the relation/user records delivered by the user-data API, the fixed
//! enumerations (communication media, certificate languages), and the
//! generic list sorter used by participant and relation listings.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `cs-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - Public records derive `Debug`, `Clone`, and `Serialize`/`Deserialize`.

pub mod domain;
pub mod error;
pub mod identity;
pub mod sort;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use domain::{CommunicationMedium, LanguageCode, Participant, Relation, UserProfile};
pub use error::CoreError;
pub use identity::{CertificateId, RelationId, UserId};
pub use sort::{FieldValue, ListSorter, SortOrder, SortableRecord};
pub use temporal::{Clock, FixedClock, SystemClock, Timestamp};
