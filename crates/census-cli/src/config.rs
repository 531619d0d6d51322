//! `census.toml` settings. Every key is optional; missing keys take the
//! defaults below and command-line flags override the file.

use std::path::{Path, PathBuf};

use census_core::MAX_AGE;
use census_generate::{
    AddressOptions, DatasetRequest, LocaleKey, PeopleOptions, WorkplaceOptions,
};
use census_store::{CsvOptions, JsonOptions, SqlOptions, XlsxOptions};
use serde::Deserialize;

use crate::CliError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CensusConfig {
    /// Fixed seed for reproducible runs; a fresh one is drawn when absent.
    pub seed: Option<u64>,
    pub locale: LocaleKey,
    pub unique: bool,
    pub people: PeopleSection,
    pub workplaces: WorkplacesSection,
    pub addresses: AddressesSection,
    pub csv: CsvSection,
    pub json: JsonSection,
    pub xlsx: XlsxSection,
    pub database: DatabaseSection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeopleSection {
    pub count: usize,
    pub male_ratio: f64,
    pub min_age: u8,
    pub max_age: u8,
}

impl Default for PeopleSection {
    fn default() -> Self {
        Self {
            count: 6,
            male_ratio: 0.5,
            min_age: 0,
            max_age: MAX_AGE,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkplacesSection {
    pub count: Option<usize>,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AddressesSection {
    pub count: Option<usize>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvSection {
    pub delimiter: char,
    pub header: bool,
}

impl Default for CsvSection {
    fn default() -> Self {
        Self {
            delimiter: ';',
            header: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JsonSection {
    pub pretty: bool,
}

impl Default for JsonSection {
    fn default() -> Self {
        Self { pretty: true }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct XlsxSection {
    pub header: bool,
    pub file: String,
}

impl Default for XlsxSection {
    fn default() -> Self {
        Self {
            header: true,
            file: "census.xlsx".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseSection {
    pub url: Option<String>,
    pub recreate: bool,
    pub people_table: String,
    pub workplace_table: String,
    pub address_table: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        let tables = census_store::SqlTables::default();
        Self {
            url: None,
            recreate: true,
            people_table: tables.people,
            workplace_table: tables.workplaces,
            address_table: tables.addresses,
        }
    }
}

impl CensusConfig {
    /// Load `path`, or the defaults when no file is given.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigFile {
            path: PathBuf::from(path),
            source,
        })?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self, CliError> {
        Ok(toml::from_str(text)?)
    }

    pub fn dataset_request(&self) -> DatasetRequest {
        DatasetRequest {
            people: self.people.count,
            workplaces: self.workplaces.count,
            addresses: self.addresses.count,
            workplace_options: WorkplaceOptions {
                location: self.workplaces.location.clone(),
                locale: self.locale,
                unique: self.unique,
            },
            address_options: AddressOptions {
                country: self.addresses.country.clone(),
                locale: self.locale,
                unique: self.unique,
            },
            people_options: PeopleOptions {
                male_ratio: self.people.male_ratio,
                locale: self.locale,
                unique: self.unique,
                min_age: self.people.min_age,
                max_age: self.people.max_age,
            },
        }
    }

    pub fn csv_options(&self) -> Result<CsvOptions, CliError> {
        let delimiter = u8::try_from(self.csv.delimiter)
            .ok()
            .filter(u8::is_ascii)
            .ok_or_else(|| {
                CliError::InvalidConfig(format!(
                    "csv delimiter '{}' must be a single ASCII character",
                    self.csv.delimiter
                ))
            })?;
        Ok(CsvOptions {
            delimiter,
            header: self.csv.header,
        })
    }

    pub fn json_options(&self) -> JsonOptions {
        JsonOptions {
            pretty: self.json.pretty,
        }
    }

    pub fn xlsx_options(&self) -> XlsxOptions {
        XlsxOptions {
            header: self.xlsx.header,
        }
    }

    pub fn sql_options(&self) -> SqlOptions {
        SqlOptions {
            url: self.database.url.clone(),
            recreate: self.database.recreate,
            tables: census_store::SqlTables {
                people: self.database.people_table.clone(),
                workplaces: self.database.workplace_table.clone(),
                addresses: self.database.address_table.clone(),
            },
            ..SqlOptions::default()
        }
    }
}
