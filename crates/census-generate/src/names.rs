//! Gendered first names per locale. The faker backend has no male/female
//! split, so these lists pair with its locale-aware last names.

use crate::locales::LocaleKey;

const EN_US_MALE: &[&str] = &[
    "James", "John", "Robert", "Michael", "William", "David", "Richard", "Joseph", "Thomas",
    "Charles", "Christopher", "Daniel", "Matthew", "Anthony", "Mark", "Donald", "Steven", "Paul",
    "Andrew", "Joshua", "Kenneth", "Kevin", "Brian", "George", "Timothy", "Ronald", "Edward",
    "Jason", "Jeffrey", "Ryan",
];

const EN_US_FEMALE: &[&str] = &[
    "Mary", "Patricia", "Jennifer", "Linda", "Elizabeth", "Barbara", "Susan", "Jessica", "Sarah",
    "Karen", "Lisa", "Nancy", "Betty", "Margaret", "Sandra", "Ashley", "Kimberly", "Emily",
    "Donna", "Michelle", "Carol", "Amanda", "Dorothy", "Melissa", "Deborah", "Stephanie",
    "Rebecca", "Sharon", "Laura", "Cynthia",
];

const PT_BR_MALE: &[&str] = &[
    "João", "Pedro", "Lucas", "Gabriel", "Mateus", "Rafael", "Gustavo", "Felipe", "Bruno",
    "Thiago", "Rodrigo", "Leonardo", "Carlos", "Eduardo", "Marcelo", "André", "Fernando",
    "Ricardo", "Paulo", "Diego", "Vinícius", "Henrique", "Caio", "Daniel", "Samuel", "Arthur",
    "Heitor", "Davi", "Miguel", "Bernardo",
];

const PT_BR_FEMALE: &[&str] = &[
    "Maria", "Ana", "Juliana", "Fernanda", "Camila", "Beatriz", "Larissa", "Mariana", "Gabriela",
    "Letícia", "Amanda", "Bruna", "Carolina", "Patrícia", "Aline", "Vanessa", "Luana", "Isabela",
    "Sofia", "Helena", "Alice", "Laura", "Manuela", "Valentina", "Júlia", "Lívia", "Cecília",
    "Eduarda", "Rafaela", "Natália",
];

const FR_FR_MALE: &[&str] = &[
    "Jean", "Pierre", "Michel", "André", "Philippe", "Alain", "Jacques", "Bernard", "Louis",
    "Nicolas", "François", "Christophe", "Julien", "Antoine", "Mathieu", "Olivier", "Thomas",
    "Hugo", "Lucas", "Théo", "Maxime", "Sébastien", "Laurent", "Vincent", "Guillaume", "Arnaud",
    "Raphaël", "Gabriel", "Étienne", "Benoît",
];

const FR_FR_FEMALE: &[&str] = &[
    "Marie", "Nathalie", "Isabelle", "Sylvie", "Catherine", "Françoise", "Christine", "Monique",
    "Valérie", "Sophie", "Céline", "Julie", "Camille", "Léa", "Manon", "Chloé", "Emma", "Inès",
    "Sarah", "Aurélie", "Claire", "Élodie", "Margaux", "Pauline", "Juliette", "Amélie", "Lucie",
    "Anaïs", "Océane", "Mathilde",
];

pub fn first_names(locale: LocaleKey, male: bool) -> &'static [&'static str] {
    match (locale, male) {
        (LocaleKey::EnUs, true) => EN_US_MALE,
        (LocaleKey::EnUs, false) => EN_US_FEMALE,
        (LocaleKey::PtBr, true) => PT_BR_MALE,
        (LocaleKey::PtBr, false) => PT_BR_FEMALE,
        (LocaleKey::FrFr, true) => FR_FR_MALE,
        (LocaleKey::FrFr, false) => FR_FR_FEMALE,
    }
}
