use census_core::MAX_AGE;

use crate::locales::LocaleKey;

/// Options for [`crate::Generator::generate_workplaces`].
#[derive(Debug, Clone)]
pub struct WorkplaceOptions {
    /// Fixed location for every workplace; a locale city when unset.
    pub location: Option<String>,
    pub locale: LocaleKey,
    /// Never repeat a company name or city within one call.
    pub unique: bool,
}

impl Default for WorkplaceOptions {
    fn default() -> Self {
        Self {
            location: None,
            locale: LocaleKey::default(),
            unique: true,
        }
    }
}

/// Options for [`crate::Generator::generate_addresses`].
#[derive(Debug, Clone)]
pub struct AddressOptions {
    /// Fixed country for every address; a locale country when unset.
    pub country: Option<String>,
    pub locale: LocaleKey,
    pub unique: bool,
}

impl Default for AddressOptions {
    fn default() -> Self {
        Self {
            country: None,
            locale: LocaleKey::default(),
            unique: true,
        }
    }
}

/// Options for [`crate::Generator::generate_people`].
#[derive(Debug, Clone)]
pub struct PeopleOptions {
    /// Probability that a person is flagged male, in `[0, 1]`.
    pub male_ratio: f64,
    pub locale: LocaleKey,
    /// Never repeat a name within one call.
    pub unique: bool,
    pub min_age: u8,
    pub max_age: u8,
}

impl Default for PeopleOptions {
    fn default() -> Self {
        Self {
            male_ratio: 0.5,
            locale: LocaleKey::default(),
            unique: false,
            min_age: 0,
            max_age: MAX_AGE,
        }
    }
}

/// A whole dataset in one request: workplaces, addresses, then people spread
/// over both pools.
#[derive(Debug, Clone)]
pub struct DatasetRequest {
    pub people: usize,
    /// Pool size; the people call picks a random size when unset.
    pub workplaces: Option<usize>,
    /// Pool size; one address per person when unset.
    pub addresses: Option<usize>,
    pub workplace_options: WorkplaceOptions,
    pub address_options: AddressOptions,
    pub people_options: PeopleOptions,
}

impl DatasetRequest {
    pub fn new(people: usize) -> Self {
        Self {
            people,
            workplaces: None,
            addresses: None,
            workplace_options: WorkplaceOptions::default(),
            address_options: AddressOptions::default(),
            people_options: PeopleOptions::default(),
        }
    }
}
