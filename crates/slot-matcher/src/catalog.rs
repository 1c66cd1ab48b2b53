use crate::{Dictionary, Slot};
use std::collections::HashMap;

static EMPTY: Dictionary = Dictionary::new();

/// The full set of slot dictionaries, loaded once per process
#[derive(Debug, Clone)]
pub struct SlotCatalog {
    dictionaries: HashMap<Slot, Dictionary>,
}

impl SlotCatalog {
    /// An empty catalog. Every slot resolves to an empty dictionary.
    pub fn empty() -> Self {
        Self {
            dictionaries: HashMap::new(),
        }
    }

    /// The built-in menu tables. All triggers are lowercase.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        for slot in Slot::ALL {
            catalog.insert(slot, builtin_dictionary(slot));
        }
        catalog
    }

    /// Replace the dictionary for `slot`, returning the previous one
    pub fn insert(&mut self, slot: Slot, dictionary: Dictionary) -> Option<Dictionary> {
        self.dictionaries.insert(slot, dictionary)
    }

    pub fn dictionary(&self, slot: Slot) -> &Dictionary {
        self.dictionaries.get(&slot).unwrap_or(&EMPTY)
    }

    pub fn len(&self) -> usize {
        self.dictionaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.is_empty()
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

fn builtin_dictionary(slot: Slot) -> Dictionary {
    match slot {
        Slot::OrderType => Dictionary::from_pairs(&[
            ("burrito", &["burrito"]),
            ("burrito bowl", &["bowl", "burrito bowl"]),
            ("tacos", &["taco"]),
            ("salad", &["salad"]),
            ("kid's meal", &["kid"]),
            ("sides & drinks", &["side", "drink"]),
        ]),
        Slot::Address => Dictionary::from_pairs(&[
            ("recent", &["recent", "last"]),
            ("favorite", &["favorite", "favourite", "saved"]),
            ("nearby", &["nearby", "closest"]),
        ]),
        Slot::Fillings => Dictionary::from_pairs(&[
            ("chicken", &["chicken"]),
            ("steak", &["steak"]),
            ("barbacoa", &["barbacoa"]),
            ("carnitas", &["carnitas", "pork"]),
            ("sofritas", &["sofritas", "tofu"]),
            ("veggie", &["veggie", "vegetable"]),
        ]),
        Slot::Rice => Dictionary::from_pairs(&[
            ("white rice", &["white"]),
            ("brown rice", &["brown"]),
        ]),
        Slot::Beans => Dictionary::from_pairs(&[
            ("black beans", &["black"]),
            ("pinto beans", &["pinto"]),
        ]),
        Slot::Salsa => Dictionary::from_pairs(&[
            ("fresh tomato salsa", &["tomato", "mild"]),
            ("roasted chili-corn salsa", &["corn"]),
            ("tomatillo-green chili salsa", &["green", "medium"]),
            ("tomatillo-red chili salsa", &["red chili", "hot"]),
        ]),
        Slot::Toppings => Dictionary::from_pairs(&[
            ("fajita veggies", &["fajita"]),
            ("sour cream", &["sour cream"]),
            ("cheese", &["cheese"]),
            ("guacamole", &["guac"]),
            ("queso blanco", &["queso"]),
            ("romaine lettuce", &["lettuce", "romaine"]),
        ]),
        Slot::Sides => Dictionary::from_pairs(&[
            ("chips", &["chips"]),
            ("chips & guacamole", &["chips and guac", "chips & guac"]),
            ("chips & queso", &["chips and queso", "chips & queso"]),
            ("side of tortilla", &["tortilla on the side", "side of tortilla"]),
        ]),
        Slot::Tortilla => Dictionary::from_pairs(&[
            ("soft flour tortilla", &["soft", "flour"]),
            ("crispy corn tortilla", &["crispy", "crunchy", "hard shell"]),
        ]),
        Slot::Drinks => Dictionary::from_pairs(&[
            ("fountain drink", &["fountain", "soda", "coke", "sprite"]),
            ("bottled water", &["water"]),
            ("lemonade", &["lemonade"]),
            ("iced tea", &["iced tea", "tea"]),
            ("juice", &["juice"]),
        ]),
        Slot::Quantity => Dictionary::from_pairs(&[
            ("1", &["one", "a single", "1"]),
            ("2", &["two", "couple", "2"]),
            ("3", &["three", "3"]),
            ("4", &["four", "4"]),
            ("5", &["five", "5"]),
        ]),
        Slot::Payment => Dictionary::from_pairs(&[
            ("google pay", &["google"]),
            ("apple pay", &["apple"]),
            ("credit card", &["credit", "card"]),
            ("gift card", &["gift"]),
        ]),
    }
}
