use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use census_core::{Address, EntityKind, Person, Workplace};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::store::{FileNames, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsonOptions {
    pub pretty: bool,
}

impl Default for JsonOptions {
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// One JSON array file per record kind. Absent references are `null`.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
    names: FileNames,
    options: JsonOptions,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_options(dir, FileNames::with_extension("json"), JsonOptions::default())
    }

    pub fn with_options(dir: impl Into<PathBuf>, names: FileNames, options: JsonOptions) -> Self {
        Self {
            dir: dir.into(),
            names,
            options,
        }
    }

    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(self.names.for_kind(kind))
    }

    fn write_array<T: Serialize>(&self, kind: EntityKind, records: &[T]) -> StoreResult<()> {
        let path = self.path_for(kind);
        let file = File::create(&path).map_err(|err| StoreError::unavailable(&path, err))?;
        let mut writer = BufWriter::new(file);
        if self.options.pretty {
            serde_json::to_writer_pretty(&mut writer, records)?;
        } else {
            serde_json::to_writer(&mut writer, records)?;
        }
        writer
            .write_all(b"\n")
            .and_then(|_| writer.flush())
            .map_err(|err| StoreError::unavailable(&path, err))?;
        info!(path = %path.display(), kind = %kind, rows = records.len(), "json written");
        Ok(())
    }

    fn read_array<T: DeserializeOwned>(&self, kind: EntityKind) -> StoreResult<Vec<T>> {
        let path = self.path_for(kind);
        let file = File::open(&path).map_err(|err| StoreError::unavailable(&path, err))?;
        let records: Vec<T> =
            serde_json::from_reader(BufReader::new(file)).map_err(|err| match err.classify() {
                serde_json::error::Category::Io => StoreError::Json(err),
                _ => StoreError::Format(format!("{}: {err}", path.display())),
            })?;
        info!(path = %path.display(), kind = %kind, rows = records.len(), "json read");
        Ok(records)
    }
}

impl RecordStore for JsonStore {
    fn format(&self) -> &'static str {
        "json"
    }

    fn write_people(&self, people: &[Person]) -> StoreResult<()> {
        self.write_array(EntityKind::Person, people)
    }

    fn read_people(&self) -> StoreResult<Vec<Person>> {
        let people: Vec<Person> = self.read_array(EntityKind::Person)?;
        for person in &people {
            person.validate().map_err(invalid_record)?;
        }
        Ok(people)
    }

    fn write_workplaces(&self, workplaces: &[Workplace]) -> StoreResult<()> {
        self.write_array(EntityKind::Workplace, workplaces)
    }

    fn read_workplaces(&self) -> StoreResult<Vec<Workplace>> {
        let workplaces: Vec<Workplace> = self.read_array(EntityKind::Workplace)?;
        for workplace in &workplaces {
            workplace.validate().map_err(invalid_record)?;
        }
        Ok(workplaces)
    }

    fn write_addresses(&self, addresses: &[Address]) -> StoreResult<()> {
        self.write_array(EntityKind::Address, addresses)
    }

    fn read_addresses(&self) -> StoreResult<Vec<Address>> {
        let addresses: Vec<Address> = self.read_array(EntityKind::Address)?;
        for address in &addresses {
            address.validate().map_err(invalid_record)?;
        }
        Ok(addresses)
    }
}

fn invalid_record(err: census_core::Error) -> StoreError {
    StoreError::Format(err.to_string())
}
