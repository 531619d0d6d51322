use std::path::{Path, PathBuf};

use census_core::fields::{ADDRESS_FIELDS, PERSON_FIELDS, WORKPLACE_FIELDS};
use census_core::{Address, EntityKind, Person, Workplace};
use tracing::{debug, info};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::{StoreError, StoreResult};
use crate::rows::{AddressRow, PersonRow, WorkplaceRow};
use crate::store::RecordStore;

/// Sheet name per record kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetNames {
    pub people: String,
    pub workplaces: String,
    pub addresses: String,
}

impl Default for SheetNames {
    fn default() -> Self {
        Self {
            people: "people".to_string(),
            workplaces: "workplaces".to_string(),
            addresses: "addresses".to_string(),
        }
    }
}

impl SheetNames {
    pub fn for_kind(&self, kind: EntityKind) -> &str {
        match kind {
            EntityKind::Person => &self.people,
            EntityKind::Workplace => &self.workplaces,
            EntityKind::Address => &self.addresses,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XlsxOptions {
    /// Write field names into row 1.
    pub header: bool,
}

impl Default for XlsxOptions {
    fn default() -> Self {
        Self { header: true }
    }
}

/// One workbook holding a sheet per record kind.
#[derive(Debug, Clone)]
pub struct XlsxStore {
    path: PathBuf,
    sheets: SheetNames,
    options: XlsxOptions,
}

impl XlsxStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_options(path, SheetNames::default(), XlsxOptions::default())
    }

    pub fn with_options(path: impl Into<PathBuf>, sheets: SheetNames, options: XlsxOptions) -> Self {
        Self {
            path: path.into(),
            sheets,
            options,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the sheet of `kind` with `rows`, keeping every other sheet.
    fn write_sheet<'a, const N: usize>(
        &self,
        kind: EntityKind,
        header: [&str; N],
        rows: impl Iterator<Item = [&'a str; N]>,
        numeric: &[usize],
        boolean: &[usize],
    ) -> StoreResult<()> {
        let mut book = self.open_or_create()?;
        let name = self.sheets.for_kind(kind);
        if book.get_sheet_by_name(name).is_some() {
            book.remove_sheet_by_name(name)
                .map_err(|err| StoreError::Spreadsheet(format!("remove sheet '{name}': {err}")))?;
            debug!(sheet = name, "replacing existing sheet");
        }
        let sheet = book
            .new_sheet(name)
            .map_err(|err| StoreError::Spreadsheet(format!("create sheet '{name}': {err}")))?;

        let mut row_num = 1u32;
        if self.options.header {
            for (col, field) in header.iter().enumerate() {
                sheet
                    .get_cell_mut(address(col, row_num).as_str())
                    .set_value_string(*field);
            }
            row_num += 1;
        }

        let mut written = 0usize;
        for cells in rows {
            for (col, value) in cells.iter().enumerate() {
                let cell_kind = if numeric.contains(&col) {
                    CellKind::Number
                } else if boolean.contains(&col) {
                    CellKind::Bool
                } else {
                    CellKind::Text
                };
                set_cell(sheet, address(col, row_num), value, cell_kind);
            }
            row_num += 1;
            written += 1;
        }

        umya_spreadsheet::writer::xlsx::write(&book, &self.path)
            .map_err(|err| StoreError::Spreadsheet(format!("{}: {err}", self.path.display())))?;
        info!(
            path = %self.path.display(),
            sheet = name,
            rows = written,
            "xlsx sheet written"
        );
        Ok(())
    }

    /// Read `N` columns per row until column A is empty.
    fn read_sheet<const N: usize>(&self, kind: EntityKind) -> StoreResult<Vec<[String; N]>> {
        if !self.path.exists() {
            return Err(StoreError::unavailable(
                &self.path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "workbook not found"),
            ));
        }
        let book = umya_spreadsheet::reader::xlsx::read(&self.path)
            .map_err(|err| StoreError::Spreadsheet(format!("{}: {err}", self.path.display())))?;
        let name = self.sheets.for_kind(kind);
        let sheet = book
            .get_sheet_by_name(name)
            .ok_or_else(|| StoreError::Format(format!("sheet '{name}' not found")))?;

        let mut row_num = 1u32;
        if cell_text(sheet, 0, 1).trim().eq_ignore_ascii_case("id") {
            row_num = 2;
        }

        let mut rows = Vec::new();
        loop {
            if cell_text(sheet, 0, row_num).trim().is_empty() {
                break;
            }
            rows.push(std::array::from_fn(|col| cell_text(sheet, col, row_num)));
            row_num += 1;
        }
        info!(path = %self.path.display(), sheet = name, rows = rows.len(), "xlsx sheet read");
        Ok(rows)
    }

    fn open_or_create(&self) -> StoreResult<Spreadsheet> {
        if self.path.exists() {
            umya_spreadsheet::reader::xlsx::read(&self.path)
                .map_err(|err| StoreError::Spreadsheet(format!("{}: {err}", self.path.display())))
        } else {
            Ok(umya_spreadsheet::new_file_empty_worksheet())
        }
    }
}

impl RecordStore for XlsxStore {
    fn format(&self) -> &'static str {
        "xlsx"
    }

    fn write_people(&self, people: &[Person]) -> StoreResult<()> {
        let rows: Vec<PersonRow> = people.iter().map(PersonRow::from).collect();
        self.write_sheet(
            EntityKind::Person,
            PERSON_FIELDS,
            rows.iter().map(PersonRow::cells),
            &[2],
            &[3],
        )
    }

    fn read_people(&self) -> StoreResult<Vec<Person>> {
        self.read_sheet::<6>(EntityKind::Person)?
            .into_iter()
            .map(|[id, name, age, male, workplace, address]| {
                Person::try_from(PersonRow {
                    id,
                    name,
                    age,
                    male,
                    workplace,
                    address,
                })
            })
            .collect()
    }

    fn write_workplaces(&self, workplaces: &[Workplace]) -> StoreResult<()> {
        let rows: Vec<WorkplaceRow> = workplaces.iter().map(WorkplaceRow::from).collect();
        self.write_sheet(
            EntityKind::Workplace,
            WORKPLACE_FIELDS,
            rows.iter().map(WorkplaceRow::cells),
            &[],
            &[],
        )
    }

    fn read_workplaces(&self) -> StoreResult<Vec<Workplace>> {
        self.read_sheet::<4>(EntityKind::Workplace)?
            .into_iter()
            .map(|[id, name, location, employees]| {
                Workplace::try_from(WorkplaceRow {
                    id,
                    name,
                    location,
                    employees,
                })
            })
            .collect()
    }

    fn write_addresses(&self, addresses: &[Address]) -> StoreResult<()> {
        let rows: Vec<AddressRow> = addresses.iter().map(AddressRow::from).collect();
        self.write_sheet(
            EntityKind::Address,
            ADDRESS_FIELDS,
            rows.iter().map(AddressRow::cells),
            &[],
            &[],
        )
    }

    fn read_addresses(&self) -> StoreResult<Vec<Address>> {
        self.read_sheet::<5>(EntityKind::Address)?
            .into_iter()
            .map(|[id, street, city, country, resident]| {
                Address::try_from(AddressRow {
                    id,
                    street,
                    city,
                    country,
                    resident,
                })
            })
            .collect()
    }
}

fn address(col: usize, row: u32) -> String {
    // Records have at most six fields, so single-letter columns suffice.
    let letter = char::from(b'A' + col as u8);
    format!("{letter}{row}")
}

#[derive(Clone, Copy)]
enum CellKind {
    Text,
    Number,
    Bool,
}

// Empty values leave the cell unset so an absent reference reads back empty.
fn set_cell(sheet: &mut Worksheet, at: String, value: &str, kind: CellKind) {
    if value.is_empty() {
        return;
    }
    let cell = sheet.get_cell_mut(at.as_str());
    match (kind, value.parse::<f64>(), value.parse::<bool>()) {
        (CellKind::Number, Ok(number), _) => {
            cell.set_value_number(number);
        }
        (CellKind::Bool, _, Ok(flag)) => {
            cell.set_value_bool(flag);
        }
        // Stored verbatim; `set_value` would turn "007" into the number 7.
        _ => {
            cell.set_value_string(value);
        }
    }
}

fn cell_text(sheet: &Worksheet, col: usize, row: u32) -> String {
    sheet
        .get_cell(address(col, row).as_str())
        .map(|cell| cell.get_value().to_string())
        .unwrap_or_default()
}
