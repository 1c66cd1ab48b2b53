use crate::{DictionaryError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Order attribute categories that own a keyword dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    /// Burrito, bowl, tacos, ...
    #[serde(rename = "ordertype")]
    OrderType,
    /// Which saved address to order from
    Address,
    Fillings,
    Rice,
    Beans,
    Salsa,
    Toppings,
    /// Chips and other sides
    Sides,
    /// Soft or crispy tortilla
    Tortilla,
    Drinks,
    Quantity,
    Payment,
}

impl Slot {
    pub const ALL: [Slot; 12] = [
        Slot::OrderType,
        Slot::Address,
        Slot::Fillings,
        Slot::Rice,
        Slot::Beans,
        Slot::Salsa,
        Slot::Toppings,
        Slot::Sides,
        Slot::Tortilla,
        Slot::Drinks,
        Slot::Quantity,
        Slot::Payment,
    ];

    /// Entity key used on the wire for this slot
    pub fn key(&self) -> &'static str {
        match self {
            Slot::OrderType => "ordertype",
            Slot::Address => "address",
            Slot::Fillings => "fillings",
            Slot::Rice => "rice",
            Slot::Beans => "beans",
            Slot::Salsa => "salsa",
            Slot::Toppings => "toppings",
            Slot::Sides => "sides",
            Slot::Tortilla => "tortilla",
            Slot::Drinks => "drinks",
            Slot::Quantity => "quantity",
            Slot::Payment => "payment",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One canonical value and the phrases that select it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub value: String,
    pub triggers: Vec<String>,
}

/// Ordered keyword table for one slot category.
///
/// Entry order is significant: single-match returns the last matching entry,
/// multi-match reports entries in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: Vec<DictionaryEntry>,
}

impl Dictionary {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Build a dictionary from static `(value, triggers)` pairs
    pub fn from_pairs(pairs: &[(&str, &[&str])]) -> Self {
        pairs
            .iter()
            .fold(Self::new(), |dict, (value, triggers)| dict.with_entry(value, triggers))
    }

    pub fn with_entry(mut self, value: &str, triggers: &[&str]) -> Self {
        self.entries.push(DictionaryEntry {
            value: value.to_string(),
            triggers: triggers.iter().map(|t| t.to_string()).collect(),
        });
        self
    }

    pub fn entries(&self) -> &[DictionaryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over every `(value, trigger)` pair in definition order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|entry| {
            entry
                .triggers
                .iter()
                .map(move |trigger| (entry.value.as_str(), trigger.as_str()))
        })
    }

    /// Reject tables that would match everything or shadow themselves.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if !seen.insert(entry.value.as_str()) {
                return Err(DictionaryError::DuplicateValue(entry.value.clone()));
            }
            if entry.triggers.is_empty() {
                return Err(DictionaryError::NoTriggers(entry.value.clone()));
            }
            if entry.triggers.iter().any(|t| t.is_empty()) {
                return Err(DictionaryError::EmptyTrigger(entry.value.clone()));
            }
        }
        Ok(())
    }
}
