use std::collections::BTreeSet;

use rand::RngCore;

use census_core::{Address, Dataset, Workplace};
use census_generate::{
    AddressOptions, DatasetRequest, GenerationError, Generator, LocaleKey, PeopleOptions,
    TextField, TextSource, WorkplaceOptions,
};

/// Deterministic source producing `"{field} {n}"`, always distinct.
#[derive(Default)]
struct Counting {
    next: u64,
}

impl TextSource for Counting {
    fn text(
        &mut self,
        field: TextField,
        _locale: LocaleKey,
        _rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        self.next += 1;
        Ok(format!("{field} {}", self.next))
    }
}

struct Constant;

impl TextSource for Constant {
    fn text(
        &mut self,
        _field: TextField,
        _locale: LocaleKey,
        _rng: &mut dyn RngCore,
    ) -> Result<String, GenerationError> {
        Ok("Kovács Anna".to_string())
    }
}

fn counting_generator(seed: u64) -> Generator {
    Generator::with_text_source(seed, Box::new(Counting::default()))
}

fn pools(generator: &mut Generator, workplaces: usize, addresses: usize) -> (Vec<Workplace>, Vec<Address>) {
    let workplaces = generator
        .generate_workplaces(workplaces, &WorkplaceOptions::default())
        .expect("workplaces");
    let addresses = generator
        .generate_addresses(addresses, &AddressOptions::default())
        .expect("addresses");
    (workplaces, addresses)
}

fn ids_of(dataset: &Dataset) -> Vec<String> {
    dataset.people().iter().map(|p| p.id.to_string()).collect()
}

#[test]
fn returns_requested_count_with_sequential_ids() {
    for count in [1_usize, 7, 50] {
        let mut generator = counting_generator(1);
        let dataset = generator
            .generate_people(count, None, None, &PeopleOptions::default())
            .expect("generate people");

        let expected: Vec<String> = (1..=count).map(|i| format!("P-{i:06}")).collect();
        assert_eq!(ids_of(&dataset), expected);
        dataset.verify_integrity().expect("integrity holds");
    }
}

#[test]
fn synthesized_pools_cover_everyone() {
    let mut generator = counting_generator(3);
    let dataset = generator
        .generate_people(12, None, None, &PeopleOptions::default())
        .expect("generate people");

    let workplaces = dataset.workplaces().len();
    assert!((1..=12).contains(&workplaces));
    assert!(dataset.workplaces().iter().all(|w| !w.employees.is_empty()));
    assert_eq!(dataset.addresses().len(), 12);
    assert!(dataset.people().iter().all(|p| p.address.is_some()));
}

#[test]
fn employees_union_matches_people() {
    let mut generator = counting_generator(5);
    let (workplaces, addresses) = pools(&mut generator, 3, 10);
    let dataset = generator
        .generate_people(10, Some(workplaces), Some(addresses), &PeopleOptions::default())
        .expect("generate people");

    let listed: BTreeSet<String> = dataset
        .workplaces()
        .iter()
        .flat_map(|w| w.employees.iter().map(ToString::to_string))
        .collect();
    let people: BTreeSet<String> = ids_of(&dataset).into_iter().collect();
    assert_eq!(listed, people);

    for workplace in dataset.workplaces() {
        let mut sorted = workplace.employees.clone();
        sorted.sort();
        assert_eq!(sorted, workplace.employees, "employees keep assignment order");
    }
}

#[test]
fn four_workplaces_six_addresses_six_people() {
    let mut generator = Generator::new(2024);
    let (workplaces, addresses) = pools(&mut generator, 4, 6);
    let dataset = generator
        .generate_people(6, Some(workplaces), Some(addresses), &PeopleOptions::default())
        .expect("generate people");

    assert_eq!(dataset.people().len(), 6);
    assert_eq!(dataset.workplaces().len(), 4);
    assert!(dataset.workplaces().iter().all(|w| !w.employees.is_empty()));
    for (person, address) in dataset.people().iter().zip(dataset.addresses()) {
        assert_eq!(person.address.as_ref(), Some(&address.id));
        assert_eq!(address.resident.as_ref(), Some(&person.id));
    }
    dataset.verify_integrity().expect("integrity holds");
}

#[test]
fn short_address_pool_leaves_people_without_address() {
    let mut generator = counting_generator(9);
    let (workplaces, addresses) = pools(&mut generator, 4, 3);
    let dataset = generator
        .generate_people(6, Some(workplaces), Some(addresses), &PeopleOptions::default())
        .expect("generate people");

    let assigned: Vec<Option<&str>> = dataset
        .people()
        .iter()
        .map(|p| p.address.as_ref().map(|a| a.as_str()))
        .collect();
    assert_eq!(
        assigned,
        [
            Some("A-000001"),
            Some("A-000002"),
            Some("A-000003"),
            None,
            None,
            None
        ]
    );
    assert_eq!(dataset.summary().people_without_address, 3);
    dataset.verify_integrity().expect("integrity holds");
}

#[test]
fn fixed_age_bounds() {
    let mut generator = counting_generator(11);
    let options = PeopleOptions {
        min_age: 42,
        max_age: 42,
        ..PeopleOptions::default()
    };
    let dataset = generator
        .generate_people(25, None, None, &options)
        .expect("generate people");
    assert!(dataset.people().iter().all(|p| p.age == 42));
}

#[test]
fn ages_stay_within_bounds() {
    let mut generator = counting_generator(12);
    let options = PeopleOptions {
        min_age: 18,
        max_age: 65,
        ..PeopleOptions::default()
    };
    let dataset = generator
        .generate_people(200, None, Some(Vec::new()), &options)
        .expect("generate people");
    assert!(dataset.people().iter().all(|p| (18..=65).contains(&p.age)));
}

#[test]
fn male_ratio_extremes() {
    let mut generator = counting_generator(13);
    let (workplaces, _) = pools(&mut generator, 5, 1);

    let all_female = PeopleOptions {
        male_ratio: 0.0,
        ..PeopleOptions::default()
    };
    let dataset = generator
        .generate_people(500, Some(workplaces.clone()), Some(Vec::new()), &all_female)
        .expect("generate people");
    assert!(dataset.people().iter().all(|p| !p.male));
    assert!(dataset.people().iter().all(|p| p.name.starts_with("female name")));

    let all_male = PeopleOptions {
        male_ratio: 1.0,
        ..PeopleOptions::default()
    };
    let dataset = generator
        .generate_people(500, Some(workplaces), Some(Vec::new()), &all_male)
        .expect("generate people");
    assert!(dataset.people().iter().all(|p| p.male));
}

#[test]
fn balanced_ratio_yields_both_sexes() {
    let mut generator = counting_generator(14);
    let dataset = generator
        .generate_people(400, None, Some(Vec::new()), &PeopleOptions::default())
        .expect("generate people");
    let males = dataset.people().iter().filter(|p| p.male).count();
    assert!((120..=280).contains(&males), "males = {males}");
}

#[test]
fn same_seed_reproduces_dataset() {
    let run = |seed| {
        let mut generator = Generator::new(seed);
        let dataset = generator
            .generate_dataset(&DatasetRequest {
                workplaces: Some(3),
                ..DatasetRequest::new(8)
            })
            .expect("generate dataset");
        dataset
            .people()
            .iter()
            .map(|p| {
                format!(
                    "{}|{}|{}|{}|{:?}|{:?}",
                    p.id, p.name, p.age, p.male, p.workplace, p.address
                )
            })
            .collect::<Vec<_>>()
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn fixed_location_and_country_are_used() {
    let mut generator = counting_generator(15);
    let workplaces = generator
        .generate_workplaces(
            3,
            &WorkplaceOptions {
                location: Some("Debrecen".to_string()),
                ..WorkplaceOptions::default()
            },
        )
        .expect("workplaces");
    assert!(workplaces.iter().all(|w| w.location == "Debrecen"));
    assert!(workplaces.iter().all(|w| w.employees.is_empty()));

    let addresses = generator
        .generate_addresses(
            3,
            &AddressOptions {
                country: Some("Magyarország".to_string()),
                ..AddressOptions::default()
            },
        )
        .expect("addresses");
    assert!(addresses.iter().all(|a| a.country == "Magyarország"));
    assert!(addresses.iter().all(|a| a.resident.is_none()));
    let ids: Vec<&str> = addresses.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, ["A-000001", "A-000002", "A-000003"]);
}

#[test]
fn rejects_invalid_arguments() {
    let mut generator = counting_generator(16);

    let zero = generator.generate_people(0, None, None, &PeopleOptions::default());
    assert!(matches!(zero, Err(GenerationError::InvalidArgument(_))));

    for male_ratio in [-0.1, 1.5, f64::NAN] {
        let options = PeopleOptions {
            male_ratio,
            ..PeopleOptions::default()
        };
        let result = generator.generate_people(3, None, None, &options);
        assert!(matches!(result, Err(GenerationError::InvalidArgument(_))));
    }

    for (min_age, max_age) in [(30, 20), (0, 101)] {
        let options = PeopleOptions {
            min_age,
            max_age,
            ..PeopleOptions::default()
        };
        let result = generator.generate_people(3, None, None, &options);
        assert!(matches!(result, Err(GenerationError::InvalidArgument(_))));
    }

    let empty_pool = generator.generate_people(3, Some(Vec::new()), None, &PeopleOptions::default());
    assert!(matches!(empty_pool, Err(GenerationError::InvalidArgument(_))));

    assert!(matches!(
        generator.generate_workplaces(0, &WorkplaceOptions::default()),
        Err(GenerationError::InvalidArgument(_))
    ));
    assert!(matches!(
        generator.generate_addresses(0, &AddressOptions::default()),
        Err(GenerationError::InvalidArgument(_))
    ));
}

#[test]
fn rejects_duplicate_ids_in_supplied_pool() {
    let mut generator = counting_generator(17);
    let mut workplaces = generator
        .generate_workplaces(2, &WorkplaceOptions::default())
        .expect("workplaces");
    workplaces.extend(
        generator
            .generate_workplaces(1, &WorkplaceOptions::default())
            .expect("workplaces"),
    );
    let result = generator.generate_people(3, Some(workplaces), None, &PeopleOptions::default());
    assert!(matches!(result, Err(GenerationError::InvalidArgument(_))));
}

#[test]
fn unique_names_exhaust_without_fallback() {
    let mut generator = Generator::with_text_source(18, Box::new(Constant));
    let workplaces = vec![Workplace::new(
        census_core::WorkplaceId::new("WP-000001"),
        "Lipóti pékség".to_string(),
        "Debrecen".to_string(),
    )];
    let options = PeopleOptions {
        unique: true,
        ..PeopleOptions::default()
    };
    let result = generator.generate_people(3, Some(workplaces), Some(Vec::new()), &options);
    assert!(matches!(
        result,
        Err(GenerationError::NameSpaceExhausted { .. })
    ));
}

#[test]
fn repeated_names_allowed_when_not_unique() {
    let mut generator = Generator::with_text_source(19, Box::new(Constant));
    let workplaces = vec![Workplace::new(
        census_core::WorkplaceId::new("WP-000001"),
        "Lipóti pékség".to_string(),
        "Debrecen".to_string(),
    )];
    let dataset = generator
        .generate_people(3, Some(workplaces), Some(Vec::new()), &PeopleOptions::default())
        .expect("generate people");
    assert!(dataset.people().iter().all(|p| p.name == "Kovács Anna"));
    assert_eq!(dataset.workplaces()[0].employees.len(), 3);
}

#[test]
fn faker_locales_generate_dataset() {
    for locale in LocaleKey::ALL {
        let mut generator = Generator::new(21);
        let mut request = DatasetRequest::new(5);
        request.workplace_options.locale = locale;
        request.address_options.locale = locale;
        request.people_options.locale = locale;
        let dataset = generator.generate_dataset(&request).expect("generate dataset");
        dataset.verify_integrity().expect("integrity holds");
        assert!(dataset.people().iter().all(|p| !p.name.is_empty()));
    }
}
