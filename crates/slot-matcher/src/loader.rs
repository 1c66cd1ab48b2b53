use crate::{Dictionary, Slot, SlotCatalog};
use anyhow::Context;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Load dictionary overrides from a YAML file on top of the built-in tables.
///
/// The document maps slot names to ordered lists of `{value, triggers}`
/// entries. Slots missing from the file keep their built-in dictionary.
pub fn load_catalog_file(path: impl AsRef<Path>) -> anyhow::Result<SlotCatalog> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading dictionaries: {}", path.display()))?;
    let overrides: HashMap<Slot, Dictionary> = serde_yaml::from_str(&raw)
        .with_context(|| format!("parsing yaml: {}", path.display()))?;

    let mut catalog = SlotCatalog::builtin();
    for (slot, dictionary) in overrides {
        dictionary
            .validate()
            .with_context(|| format!("invalid {} dictionary in {}", slot, path.display()))?;
        tracing::debug!(%slot, entries = dictionary.len(), "overriding slot dictionary");
        catalog.insert(slot, dictionary);
    }
    Ok(catalog)
}
