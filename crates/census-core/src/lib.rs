//! Core contracts for census.
//!
//! This crate defines the three entity kinds (people, workplaces, addresses),
//! the identifier scheme that ties them together, and the `Dataset` graph a
//! generation run produces. Storage adapters and the generator build on these
//! types.

pub mod dataset;
pub mod error;
pub mod fields;
pub mod ids;
pub mod model;
pub mod redaction;

pub use dataset::{Dataset, DatasetSummary, IntegrityViolation, LoadedRecords};
pub use error::{Error, Result};
pub use ids::{AddressId, EntityId, EntityKind, IdAllocator, PersonId, WorkplaceId, format_id};
pub use model::{Address, MAX_AGE, Person, Workplace};
pub use redaction::redact_database_url;
