//! Turns struct doc comments into TOML comments for `pgext defconfig`.

use std::any::type_name;

use documented::{Documented, DocumentedFields};
use toml_edit::{ArrayOfTables, Decor, Item, RawString, Table};
use tracing::warn;

use crate::error::{ConfigError, Result};

/// Appends each line of `docs` as a `#` comment to the decor prefix, keeping
/// whatever prefix was already there.
pub fn append_docs_as_toml_comments(decor: &mut Decor, docs: &str) {
    let comments: String = docs
        .lines()
        .map(|line| {
            if line.is_empty() {
                "#\n".to_string()
            } else {
                format!("# {line}\n")
            }
        })
        .collect();

    let existing = decor.prefix().and_then(RawString::as_str).unwrap_or("");
    let new_prefix = if existing.is_empty() || existing.ends_with("\n\n") {
        format!("{existing}{comments}")
    } else if existing.ends_with('\n') {
        format!("{existing}#\n{comments}")
    } else {
        format!("{existing}\n{comments}")
    };
    decor.set_prefix(new_prefix);
}

/// Annotates every key of `table` with the field docs of `T`.
///
/// Non-root tables also receive the container docs of `T`.
pub fn annotate_toml_table<T>(table: &mut Table, is_root: bool) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if !is_root {
        append_docs_as_toml_comments(table.decor_mut(), T::DOCS);
    }

    for (mut key, item) in table.iter_mut() {
        let key_str = key.get().to_string();
        let Ok(docs) = T::get_field_docs(&key_str) else {
            warn!(
                "Field '{}' has no documentation on '{}'",
                key_str,
                type_name::<T>()
            );
            continue;
        };

        match item {
            Item::None => return Err(ConfigError::UnexpectedTomlItem(key_str)),
            Item::Value(_) => append_docs_as_toml_comments(key.leaf_decor_mut(), docs),
            Item::Table(sub_table) => append_docs_as_toml_comments(sub_table.decor_mut(), docs),
            Item::ArrayOfTables(array) => {
                let first = array
                    .iter_mut()
                    .next()
                    .ok_or_else(|| ConfigError::AnnotateFirstTable(key_str.clone()))?;
                append_docs_as_toml_comments(first.decor_mut(), docs);
            }
        }
    }

    Ok(())
}

/// Annotates the first table of an array of tables with the docs of `T`.
pub fn annotate_toml_array_of_tables<T>(array: &mut ArrayOfTables) -> Result<()>
where
    T: Documented + DocumentedFields,
{
    if let Some(first_table) = array.iter_mut().next() {
        annotate_toml_table::<T>(first_table, false)
            .map_err(|err| ConfigError::AnnotateFirstTable(err.to_string()))?;
    }
    Ok(())
}
