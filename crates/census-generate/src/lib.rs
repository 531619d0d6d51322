//! Synthetic dataset generation for census.
//!
//! A [`Generator`] owns a seeded random source and a [`TextSource`]; with the
//! same seed and source it reproduces the same people, workplaces and
//! addresses, including every relationship between them.

pub mod engine;
pub mod errors;
pub mod locales;
pub mod model;
pub mod names;
pub mod text;

pub use engine::Generator;
pub use errors::GenerationError;
pub use locales::LocaleKey;
pub use model::{AddressOptions, DatasetRequest, PeopleOptions, WorkplaceOptions};
pub use text::{FakerTextSource, MAX_UNIQUE_ATTEMPTS, TextField, TextSource};
