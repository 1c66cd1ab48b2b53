//! slot-matcher: keyword dictionaries for order slots
//!
//! Each slot category (fillings, rice, drinks, ...) owns an ordered dictionary
//! mapping a canonical value to the phrases that trigger it. Matching is plain
//! substring containment, or whole-word for slots such as quantity; callers
//! decide whether to lowercase the query first.

mod types;
pub use types::{Dictionary, DictionaryEntry, Slot};

mod error;
pub use error::{DictionaryError, Result};

mod matcher;
pub use matcher::{
    contains_any, contains_word, find_any, find_phrase, find_word, match_multiple, match_single,
    match_single_word,
};

mod catalog;
pub use catalog::SlotCatalog;

mod loader;
pub use loader::load_catalog_file;

/// Initialize the slot matcher system
pub fn init() -> Result<()> {
    tracing::info!("Initializing slot matcher with {} slot dictionaries", Slot::ALL.len());
    Ok(())
}
