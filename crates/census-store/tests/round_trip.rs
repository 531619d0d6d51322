use std::fs;
use std::path::PathBuf;

use census_core::{
    Address, AddressId, Dataset, EntityKind, LoadedRecords, Person, PersonId, Workplace,
    WorkplaceId,
};
use census_generate::{DatasetRequest, Generator};
use census_store::{
    CsvOptions, CsvStore, FileNames, JsonOptions, JsonStore, RecordStore, SheetNames, XlsxOptions,
    XlsxStore,
};

/// Four workplaces, three addresses and six people: the last three people
/// have no address.
fn dataset() -> Dataset {
    let mut request = DatasetRequest::new(6);
    request.workplaces = Some(4);
    request.addresses = Some(3);
    Generator::new(2024)
        .generate_dataset(&request)
        .expect("generate dataset")
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("census_store_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn person_fields(person: &Person) -> (String, String, u8, bool, Option<String>, Option<String>) {
    (
        person.id.to_string(),
        person.name.clone(),
        person.age,
        person.male,
        person.workplace.as_ref().map(ToString::to_string),
        person.address.as_ref().map(ToString::to_string),
    )
}

fn workplace_fields(workplace: &Workplace) -> (String, String, String, Vec<String>) {
    (
        workplace.id.to_string(),
        workplace.name.clone(),
        workplace.location.clone(),
        workplace.employees.iter().map(ToString::to_string).collect(),
    )
}

fn address_fields(address: &Address) -> (String, String, String, String, Option<String>) {
    (
        address.id.to_string(),
        address.street.clone(),
        address.city.clone(),
        address.country.clone(),
        address.resident.as_ref().map(ToString::to_string),
    )
}

fn assert_same_records(loaded: &LoadedRecords, dataset: &Dataset) {
    let people: Vec<_> = loaded.people.iter().map(person_fields).collect();
    let expected: Vec<_> = dataset.people().iter().map(person_fields).collect();
    assert_eq!(people, expected);

    let workplaces: Vec<_> = loaded.workplaces.iter().map(workplace_fields).collect();
    let expected: Vec<_> = dataset.workplaces().iter().map(workplace_fields).collect();
    assert_eq!(workplaces, expected);

    let addresses: Vec<_> = loaded.addresses.iter().map(address_fields).collect();
    let expected: Vec<_> = dataset.addresses().iter().map(address_fields).collect();
    assert_eq!(addresses, expected);
}

#[test]
fn csv_round_trip_preserves_records() {
    let dataset = dataset();
    let store = CsvStore::new(temp_out_dir("csv"));

    store.write_dataset(&dataset).expect("write csv");
    let loaded = store.read_all().expect("read csv");

    assert_same_records(&loaded, &dataset);
    assert_eq!(
        loaded.people.iter().filter(|p| p.address.is_none()).count(),
        3
    );
}

#[test]
fn csv_writes_semicolon_header_and_empty_references() {
    let dataset = dataset();
    let store = CsvStore::new(temp_out_dir("csv_layout"));
    store.write_people(dataset.people()).expect("write people");

    let text = fs::read_to_string(store.path_for(EntityKind::Person)).expect("read people.csv");
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id;name;age;male;workplace;address"));
    let last = text.lines().last().expect("last row");
    assert!(last.starts_with("P-000006;"), "{last}");
    assert!(last.ends_with(';'), "address should be empty: {last}");
    assert_eq!(text.lines().count(), 7);
}

#[test]
fn csv_without_header_matches_by_position() {
    let dataset = dataset();
    let options = CsvOptions {
        delimiter: b',',
        header: false,
    };
    let store = CsvStore::with_options(
        temp_out_dir("csv_positional"),
        FileNames::with_extension("txt"),
        options,
    );

    store.write_dataset(&dataset).expect("write csv");
    let text = fs::read_to_string(store.path_for(EntityKind::Workplace)).expect("read workplaces");
    assert!(text.starts_with("WP-000001,"), "{text}");

    let loaded = store.read_all().expect("read csv");
    assert_same_records(&loaded, &dataset);
}

#[test]
fn json_round_trip_preserves_records() {
    let dataset = dataset();
    let store = JsonStore::new(temp_out_dir("json"));

    store.write_dataset(&dataset).expect("write json");
    let loaded = store.read_all().expect("read json");

    assert_same_records(&loaded, &dataset);
}

#[test]
fn json_writes_absent_references_as_null() {
    let dataset = dataset();
    let store = JsonStore::with_options(
        temp_out_dir("json_null"),
        FileNames::with_extension("json"),
        JsonOptions { pretty: false },
    );
    store.write_people(dataset.people()).expect("write people");

    let text = fs::read_to_string(store.path_for(EntityKind::Person)).expect("read people.json");
    let value: serde_json::Value = serde_json::from_str(&text).expect("parse people.json");
    let people = value.as_array().expect("array");
    assert_eq!(people.len(), 6);
    assert_eq!(people[5]["address"], serde_json::Value::Null);
    assert_eq!(people[0]["address"], "A-000001");
    assert_eq!(text.lines().count(), 1);
}

#[test]
fn json_reads_missing_reference_fields_as_absent() {
    let dir = temp_out_dir("json_missing");
    fs::write(
        dir.join("people.json"),
        r#"[{"id": "P-000001", "name": "Kovács Anna", "age": 31, "male": false}]"#,
    )
    .expect("write people.json");

    let people = JsonStore::new(&dir).read_people().expect("read people");
    assert_eq!(people.len(), 1);
    assert!(people[0].workplace.is_none());
    assert!(people[0].address.is_none());
}

#[test]
fn json_reads_blank_references_as_absent() {
    let dir = temp_out_dir("json_blank");
    fs::write(
        dir.join("people.json"),
        r#"[{"id": "P-000001", "name": "Kovács Anna", "age": 31, "male": false,
             "workplace": "", "address": ""}]"#,
    )
    .expect("write people.json");

    let people = JsonStore::new(&dir).read_people().expect("read people");
    assert!(people[0].workplace.is_none());
    assert!(people[0].address.is_none());
}

#[test]
fn xlsx_round_trip_preserves_records() {
    let dataset = dataset();
    let store = XlsxStore::new(temp_out_dir("xlsx").join("census.xlsx"));

    store.write_dataset(&dataset).expect("write xlsx");
    let loaded = store.read_all().expect("read xlsx");

    assert_same_records(&loaded, &dataset);
}

#[test]
fn xlsx_without_header_round_trips() {
    let dataset = dataset();
    let store = XlsxStore::with_options(
        temp_out_dir("xlsx_plain").join("census.xlsx"),
        SheetNames::default(),
        XlsxOptions { header: false },
    );

    store.write_dataset(&dataset).expect("write xlsx");
    let loaded = store.read_all().expect("read xlsx");

    assert_same_records(&loaded, &dataset);
}

#[test]
fn xlsx_rewriting_one_kind_keeps_other_sheets() {
    let dataset = dataset();
    let store = XlsxStore::new(temp_out_dir("xlsx_replace").join("census.xlsx"));
    store.write_dataset(&dataset).expect("write xlsx");

    store
        .write_people(&dataset.people()[..2])
        .expect("rewrite people");

    let loaded = store.read_all().expect("read xlsx");
    assert_eq!(loaded.people.len(), 2);
    assert_eq!(loaded.workplaces.len(), 4);
    assert_eq!(loaded.addresses.len(), 3);

    let book = umya_spreadsheet::reader::xlsx::read(store.path()).expect("open workbook");
    let sheets = ["people", "workplaces", "addresses"];
    for sheet in sheets {
        assert!(book.get_sheet_by_name(sheet).is_some(), "missing {sheet}");
    }
}

/// Text fields whose content parses as a number or a boolean.
fn numeric_looking_records() -> (Vec<Workplace>, Vec<Address>, Vec<Person>) {
    let workplaces = vec![Workplace::new(
        WorkplaceId::new("WP-000001"),
        "007".to_string(),
        "1.50".to_string(),
    )];
    let addresses = vec![Address::new(
        AddressId::new("A-000001"),
        "0042".to_string(),
        "TRUE".to_string(),
        "1e3".to_string(),
    )];
    let people = vec![Person {
        id: PersonId::new("P-000001"),
        name: "12".to_string(),
        age: 40,
        male: true,
        workplace: Some(WorkplaceId::new("WP-000001")),
        address: None,
    }];
    (workplaces, addresses, people)
}

fn assert_numeric_looking_text_survives(store: &dyn RecordStore) {
    let (workplaces, addresses, people) = numeric_looking_records();
    store.write_workplaces(&workplaces).expect("write workplaces");
    store.write_addresses(&addresses).expect("write addresses");
    store.write_people(&people).expect("write people");

    let loaded = store.read_all().expect("read back");
    assert_eq!(
        workplace_fields(&loaded.workplaces[0]),
        workplace_fields(&workplaces[0]),
        "{}",
        store.format()
    );
    assert_eq!(
        address_fields(&loaded.addresses[0]),
        address_fields(&addresses[0]),
        "{}",
        store.format()
    );
    assert_eq!(
        person_fields(&loaded.people[0]),
        person_fields(&people[0]),
        "{}",
        store.format()
    );
}

#[test]
fn numeric_looking_text_round_trips_in_every_file_format() {
    let csv = CsvStore::new(temp_out_dir("csv_numeric"));
    let json = JsonStore::new(temp_out_dir("json_numeric"));
    let xlsx = XlsxStore::new(temp_out_dir("xlsx_numeric").join("census.xlsx"));

    let stores: [&dyn RecordStore; 3] = [&csv, &json, &xlsx];
    for store in stores {
        assert_numeric_looking_text_survives(store);
    }
}
