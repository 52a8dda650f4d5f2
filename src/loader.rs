//! Raw table ingestion.
//!
//! Reads the five tab-separated GOV dump tables into [`RawTables`]. Callers
//! are free to build `RawTables` directly in code instead, which is what the
//! test fixtures do.
//!
//! Missing time bounds become the `TIME_MIN`/`TIME_MAX` sentinels, name
//! content is lower-cased on the way in, and duplicate item ids abort the
//! load. A corrupt gazetteer cannot be safely matched against.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use hashbrown::HashSet;
use serde::Deserialize;
use tracing::info;

use crate::model::{Item, ItemId, NameRecord, Relation, TimeSpan, TypeId, TypeName, TypeRecord};
use crate::{Error, Result};

// ============================================================================
// Table file names (as published in the GOV dump)
// ============================================================================

pub const FILE_ITEMS: &str = "gov_a_govitem.csv";
pub const FILE_NAMES: &str = "gov_a_propertynames.csv";
pub const FILE_TYPES: &str = "gov_a_propertytypes.csv";
pub const FILE_RELATIONS: &str = "gov_a_relation.csv";
pub const FILE_TYPE_NAMES: &str = "gov_a_typenames.csv";

// ============================================================================
// Raw row shapes (serde targets for the csv reader)
// ============================================================================

#[derive(Debug, Deserialize)]
struct ItemRow {
    id: i64,
    textual_id: String,
    #[serde(deserialize_with = "flexible_bool")]
    deleted: bool,
}

#[derive(Debug, Deserialize)]
struct NameRow {
    id: i64,
    content: String,
    language: String,
    time_begin: Option<i64>,
    time_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TypeRow {
    id: i64,
    content: i32,
    time_begin: Option<i64>,
    time_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct RelationRow {
    child: i64,
    parent: i64,
    time_begin: Option<i64>,
    time_end: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TypeNameRow {
    type_id: i32,
    language: String,
    value: String,
}

/// The dump encodes booleans variously as 0/1 and True/False.
fn flexible_bool<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim() {
        "1" | "true" | "True" | "TRUE" => Ok(true),
        "0" | "false" | "False" | "FALSE" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("not a boolean: {other:?}"))),
    }
}

// ============================================================================
// RawTables
// ============================================================================

/// The five raw tables, schema-checked but otherwise unfiltered.
/// `GraphIndex::build` does the deleted/time filtering.
#[derive(Debug, Clone, Default)]
pub struct RawTables {
    pub items: Vec<Item>,
    pub names: Vec<NameRecord>,
    pub types: Vec<TypeRecord>,
    pub relations: Vec<Relation>,
    pub type_names: Vec<TypeName>,
}

impl RawTables {
    /// Read all five tables from a dump directory.
    pub fn from_dir(data_root: impl AsRef<Path>) -> Result<Self> {
        let data_root = data_root.as_ref();
        info!(dir = %data_root.display(), "loading gazetteer tables");

        let tables = Self {
            items: read_table(data_root, FILE_ITEMS, |row: ItemRow| Item {
                id: ItemId(row.id),
                textual_id: row.textual_id,
                deleted: row.deleted,
            })?,
            names: read_table(data_root, FILE_NAMES, |row: NameRow| NameRecord {
                item_id: ItemId(row.id),
                content: row.content.to_lowercase(),
                language: row.language,
                span: TimeSpan::from_bounds(row.time_begin, row.time_end),
            })?,
            types: read_table(data_root, FILE_TYPES, |row: TypeRow| TypeRecord {
                item_id: ItemId(row.id),
                code: TypeId(row.content),
                span: TimeSpan::from_bounds(row.time_begin, row.time_end),
            })?,
            relations: read_table(data_root, FILE_RELATIONS, |row: RelationRow| Relation {
                parent: ItemId(row.parent),
                child: ItemId(row.child),
                span: TimeSpan::from_bounds(row.time_begin, row.time_end),
            })?,
            type_names: read_table(data_root, FILE_TYPE_NAMES, |row: TypeNameRow| {
                TypeName::new(row.type_id, row.language, row.value)
            })?,
        };

        tables.check_integrity()?;

        info!(
            items = tables.items.len(),
            names = tables.names.len(),
            types = tables.types.len(),
            relations = tables.relations.len(),
            "finished loading gazetteer tables"
        );
        Ok(tables)
    }

    /// Duplicate item ids are fatal: every downstream index assumes the id
    /// is a unique key.
    pub fn check_integrity(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.items.len());
        for item in &self.items {
            if !seen.insert(item.id) {
                return Err(Error::DataIntegrity(format!(
                    "duplicate item id {} in {}",
                    item.id, FILE_ITEMS
                )));
            }
        }
        Ok(())
    }
}

fn read_table<R, T>(data_root: &Path, file: &str, convert: impl Fn(R) -> T) -> Result<Vec<T>>
where
    R: for<'de> Deserialize<'de>,
{
    let path = data_root.join(file);
    let reader = BufReader::new(File::open(&path)?);
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_reader(reader);

    let mut rows = Vec::new();
    for record in csv_reader.deserialize() {
        let row: R = record.map_err(|source| Error::Table { table: file.to_string(), source })?;
        rows.push(convert(row));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut f = File::create(dir.join(name)).unwrap();
        f.write_all(content.as_bytes()).unwrap();
    }

    fn write_minimal_dump(dir: &Path, items: &str) {
        write_file(dir, FILE_ITEMS, items);
        write_file(
            dir,
            FILE_NAMES,
            "id\tcontent\tlanguage\ttime_begin\ttime_end\n1\tAachen\tdeu\t\t24215942\n",
        );
        write_file(dir, FILE_TYPES, "id\tcontent\ttime_begin\ttime_end\n1\t130\t\t\n");
        write_file(dir, FILE_RELATIONS, "child\tparent\ttime_begin\ttime_end\n2\t1\t24047942\t\n");
        write_file(dir, FILE_TYPE_NAMES, "type_id\tlanguage\tvalue\n130\tdeu\tReich\n");
    }

    #[test]
    fn test_reads_all_tables() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_dump(dir.path(), "id\ttextual_id\tdeleted\n1\tobject_1\t0\n2\tobject_2\t1\n");

        let tables = RawTables::from_dir(dir.path()).unwrap();
        assert_eq!(tables.items.len(), 2);
        assert!(tables.items[1].deleted);
        // Content is lower-cased, missing begin becomes the sentinel.
        assert_eq!(tables.names[0].content, "aachen");
        assert_eq!(tables.names[0].span.begin, crate::model::TIME_MIN);
        assert_eq!(tables.names[0].span.end, 24215942);
        assert_eq!(tables.relations[0].parent, ItemId(1));
        assert_eq!(tables.relations[0].child, ItemId(2));
        assert_eq!(tables.relations[0].span.end, crate::model::TIME_MAX);
    }

    #[test]
    fn test_duplicate_item_id_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_dump(dir.path(), "id\ttextual_id\tdeleted\n1\tobject_1\t0\n1\tobject_1b\t0\n");

        let err = RawTables::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::DataIntegrity(_)));
    }

    #[test]
    fn test_malformed_row_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        write_minimal_dump(dir.path(), "id\ttextual_id\tdeleted\nnot_a_number\tobject_1\t0\n");

        let err = RawTables::from_dir(dir.path()).unwrap_err();
        assert!(matches!(err, Error::Table { .. }));
    }
}
