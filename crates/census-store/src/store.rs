use census_core::{Address, Dataset, EntityKind, LoadedRecords, Person, Workplace};
use tracing::info;

use crate::error::StoreResult;

/// Per-kind file names for the directory-backed adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNames {
    pub people: String,
    pub workplaces: String,
    pub addresses: String,
}

impl FileNames {
    /// `people.<ext>`, `workplaces.<ext>`, `addresses.<ext>`.
    pub fn with_extension(extension: &str) -> Self {
        Self {
            people: format!("people.{extension}"),
            workplaces: format!("workplaces.{extension}"),
            addresses: format!("addresses.{extension}"),
        }
    }

    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Person => &self.people,
            EntityKind::Workplace => &self.workplaces,
            EntityKind::Address => &self.addresses,
        }
    }
}

/// Synchronous bulk export/import of the three record kinds.
///
/// Every call opens and releases its own file or workbook. Relationships
/// are written as id strings and read back unresolved.
pub trait RecordStore {
    /// Format identifier (e.g. `csv`).
    fn format(&self) -> &'static str;

    fn write_people(&self, people: &[Person]) -> StoreResult<()>;
    fn read_people(&self) -> StoreResult<Vec<Person>>;

    fn write_workplaces(&self, workplaces: &[Workplace]) -> StoreResult<()>;
    fn read_workplaces(&self) -> StoreResult<Vec<Workplace>>;

    fn write_addresses(&self, addresses: &[Address]) -> StoreResult<()>;
    fn read_addresses(&self) -> StoreResult<Vec<Address>>;

    /// Write a generated dataset: workplaces, then addresses, then people.
    fn write_dataset(&self, dataset: &Dataset) -> StoreResult<()> {
        self.write_workplaces(dataset.workplaces())?;
        self.write_addresses(dataset.addresses())?;
        self.write_people(dataset.people())?;
        info!(format = self.format(), "dataset written");
        Ok(())
    }

    fn read_all(&self) -> StoreResult<LoadedRecords> {
        let records = LoadedRecords {
            workplaces: self.read_workplaces()?,
            addresses: self.read_addresses()?,
            people: self.read_people()?,
        };
        info!(
            format = self.format(),
            people = records.people.len(),
            workplaces = records.workplaces.len(),
            addresses = records.addresses.len(),
            "records loaded"
        );
        Ok(records)
    }
}
