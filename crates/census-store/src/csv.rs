use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use census_core::fields::{ADDRESS_FIELDS, PERSON_FIELDS, WORKPLACE_FIELDS};
use census_core::{Address, EntityKind, Person, Workplace};
use serde::de::DeserializeOwned;
use tracing::info;

use crate::error::{StoreError, StoreResult};
use crate::rows::{AddressRow, PersonRow, WorkplaceRow};
use crate::store::{FileNames, RecordStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvOptions {
    pub delimiter: u8,
    /// Write a header row and match fields by name on read. Without it,
    /// fields are matched by position.
    pub header: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        Self {
            delimiter: b';',
            header: true,
        }
    }
}

/// Delimited text files, one per record kind, inside one directory.
#[derive(Debug, Clone)]
pub struct CsvStore {
    dir: PathBuf,
    names: FileNames,
    options: CsvOptions,
}

impl CsvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_options(dir, FileNames::with_extension("csv"), CsvOptions::default())
    }

    pub fn with_options(dir: impl Into<PathBuf>, names: FileNames, options: CsvOptions) -> Self {
        Self {
            dir: dir.into(),
            names,
            options,
        }
    }

    pub fn path_for(&self, kind: EntityKind) -> PathBuf {
        self.dir.join(self.names.for_kind(kind))
    }

    fn write_records<'a, const N: usize>(
        &self,
        kind: EntityKind,
        header: [&str; N],
        records: impl Iterator<Item = [&'a str; N]>,
    ) -> StoreResult<()> {
        let path = self.path_for(kind);
        let file = File::create(&path).map_err(|err| StoreError::unavailable(&path, err))?;
        let counting = CountingWriter::new(BufWriter::new(file));
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .delimiter(self.options.delimiter)
            .from_writer(counting);

        if self.options.header {
            writer.write_record(header)?;
        }

        let mut rows = 0usize;
        for record in records {
            writer.write_record(record)?;
            rows += 1;
        }

        writer.flush().map_err(|err| StoreError::unavailable(&path, err))?;
        let counting = writer
            .into_inner()
            .map_err(|err| StoreError::unavailable(&path, err.into_error()))?;
        info!(
            path = %path.display(),
            kind = %kind,
            rows,
            bytes = counting.bytes_written(),
            "csv written"
        );
        Ok(())
    }

    fn read_records<R, T>(&self, kind: EntityKind) -> StoreResult<Vec<T>>
    where
        R: DeserializeOwned,
        T: TryFrom<R, Error = StoreError>,
    {
        let path = self.path_for(kind);
        let file = open(&path)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(self.options.header)
            .delimiter(self.options.delimiter)
            .from_reader(BufReader::new(file));

        let mut records = Vec::new();
        for row in reader.deserialize::<R>() {
            let row = row.map_err(|err| classify(&path, err))?;
            records.push(T::try_from(row)?);
        }
        info!(path = %path.display(), kind = %kind, rows = records.len(), "csv read");
        Ok(records)
    }
}

impl RecordStore for CsvStore {
    fn format(&self) -> &'static str {
        "csv"
    }

    fn write_people(&self, people: &[Person]) -> StoreResult<()> {
        let rows: Vec<PersonRow> = people.iter().map(PersonRow::from).collect();
        self.write_records(EntityKind::Person, PERSON_FIELDS, rows.iter().map(PersonRow::cells))
    }

    fn read_people(&self) -> StoreResult<Vec<Person>> {
        self.read_records::<PersonRow, Person>(EntityKind::Person)
    }

    fn write_workplaces(&self, workplaces: &[Workplace]) -> StoreResult<()> {
        let rows: Vec<WorkplaceRow> = workplaces.iter().map(WorkplaceRow::from).collect();
        self.write_records(
            EntityKind::Workplace,
            WORKPLACE_FIELDS,
            rows.iter().map(WorkplaceRow::cells),
        )
    }

    fn read_workplaces(&self) -> StoreResult<Vec<Workplace>> {
        self.read_records::<WorkplaceRow, Workplace>(EntityKind::Workplace)
    }

    fn write_addresses(&self, addresses: &[Address]) -> StoreResult<()> {
        let rows: Vec<AddressRow> = addresses.iter().map(AddressRow::from).collect();
        self.write_records(
            EntityKind::Address,
            ADDRESS_FIELDS,
            rows.iter().map(AddressRow::cells),
        )
    }

    fn read_addresses(&self) -> StoreResult<Vec<Address>> {
        self.read_records::<AddressRow, Address>(EntityKind::Address)
    }
}

fn open(path: &Path) -> StoreResult<File> {
    File::open(path).map_err(|err| StoreError::unavailable(path, err))
}

// I/O failures stay csv errors; anything about the content is a format error.
fn classify(path: &Path, err: csv::Error) -> StoreError {
    match err.kind() {
        csv::ErrorKind::Io(_) => StoreError::Csv(err),
        _ => StoreError::Format(format!("{}: {err}", path.display())),
    }
}

struct CountingWriter<W: Write> {
    inner: W,
    bytes: u64,
}

impl<W: Write> CountingWriter<W> {
    fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    fn bytes_written(&self) -> u64 {
        self.bytes
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let size = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(size as u64);
        Ok(size)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
