use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{NaiveDateTime, NaiveTime};

// ---------------------------------------------------------------------------
// Fixed column names
// ---------------------------------------------------------------------------

/// Provenance column inserted by the merge step. Always the first column.
pub const PROVIDER_COLUMN: &str = "Provider";
pub const SITE_COLUMN: &str = "Site";
pub const DATE_COLUMN: &str = "Date";
pub const REGION_COLUMN: &str = "Region";
pub const CLUSTER_MANAGER_COLUMN: &str = "Cluster MANAGER (L1)";
pub const AREA_MANAGER_COLUMN: &str = "Area MANAGER (L2)";
pub const AREA_EXECUTIVE_COLUMN: &str = "Area EXECUTIVE (L3)";

/// Columns every source must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = [
    SITE_COLUMN,
    DATE_COLUMN,
    REGION_COLUMN,
    CLUSTER_MANAGER_COLUMN,
    AREA_MANAGER_COLUMN,
    AREA_EXECUTIVE_COLUMN,
];

/// `DD-MM-YYYY`, used for filtering and for the rendered date column.
pub const DISPLAY_DATE_FORMAT: &str = "%d-%m-%Y";

// ---------------------------------------------------------------------------
// CellValue: a single spreadsheet cell
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring what spreadsheets store.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Empty,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            // Spreadsheets store whole numbers as floats; show `123`, not `123.0`.
            CellValue::Float(v) if v.fract() == 0.0 && v.abs() < 1e15 => {
                write!(f, "{}", *v as i64)
            }
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::DateTime(dt) if dt.time() == NaiveTime::MIN => {
                write!(f, "{}", dt.format("%Y-%m-%d"))
            }
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// SiteRecord: one row of the merged table
// ---------------------------------------------------------------------------

/// A single site record. The fixed schema columns are typed fields; every
/// other source column is carried through untouched in `extra`.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteRecord {
    /// Provenance label of the source this row came from.
    pub provider: String,
    /// Site identifier, text or numeric depending on the source.
    pub site: CellValue,
    pub date: NaiveDateTime,
    pub region: String,
    pub cluster_manager: String,
    pub area_manager: String,
    pub area_executive: String,
    /// Passthrough columns: column_name → value.
    pub extra: BTreeMap<String, CellValue>,
}

impl SiteRecord {
    /// String form of the site identifier, used for substring matching.
    pub fn site_text(&self) -> String {
        self.site.to_string()
    }

    /// The record's date rendered as `DD-MM-YYYY`.
    pub fn display_date(&self) -> String {
        self.date.format(DISPLAY_DATE_FORMAT).to_string()
    }

    /// Look up a cell by column name. Unknown columns read as empty.
    pub fn cell(&self, column: &str) -> CellValue {
        match column {
            PROVIDER_COLUMN => CellValue::Text(self.provider.clone()),
            SITE_COLUMN => self.site.clone(),
            DATE_COLUMN => CellValue::DateTime(self.date),
            REGION_COLUMN => CellValue::Text(self.region.clone()),
            CLUSTER_MANAGER_COLUMN => CellValue::Text(self.cluster_manager.clone()),
            AREA_MANAGER_COLUMN => CellValue::Text(self.area_manager.clone()),
            AREA_EXECUTIVE_COLUMN => CellValue::Text(self.area_executive.clone()),
            other => self.extra.get(other).cloned().unwrap_or(CellValue::Empty),
        }
    }
}

// ---------------------------------------------------------------------------
// FilterChoices: distinct values offered by the filter drop-downs
// ---------------------------------------------------------------------------

/// Distinct non-empty values per filterable column, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterChoices {
    pub regions: Vec<String>,
    pub cluster_managers: Vec<String>,
    pub area_managers: Vec<String>,
    pub area_executives: Vec<String>,
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = BTreeSet::new();
    values
        .filter(|v| !v.is_empty() && seen.insert(*v))
        .map(str::to_string)
        .collect()
}

impl FilterChoices {
    fn from_records(records: &[SiteRecord]) -> Self {
        FilterChoices {
            regions: distinct(records.iter().map(|r| r.region.as_str())),
            cluster_managers: distinct(records.iter().map(|r| r.cluster_manager.as_str())),
            area_managers: distinct(records.iter().map(|r| r.area_manager.as_str())),
            area_executives: distinct(records.iter().map(|r| r.area_executive.as_str())),
        }
    }
}

// ---------------------------------------------------------------------------
// SiteTable: the merged table
// ---------------------------------------------------------------------------

/// The merged table with its ordered column list and pre-computed choices.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteTable {
    /// All records, in source order then row order.
    pub records: Vec<SiteRecord>,
    /// Ordered column names; `Provider` is always first.
    pub column_names: Vec<String>,
    pub choices: FilterChoices,
}

impl SiteTable {
    /// Build a table, moving the provenance column to the front.
    pub fn new(column_names: Vec<String>, records: Vec<SiteRecord>) -> Self {
        let column_names = std::iter::once(PROVIDER_COLUMN.to_string())
            .chain(column_names.into_iter().filter(|c| c != PROVIDER_COLUMN))
            .collect();
        let choices = FilterChoices::from_records(&records);
        SiteTable {
            records,
            column_names,
            choices,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct provenance labels in first-seen order.
    pub fn providers(&self) -> Vec<String> {
        distinct(self.records.iter().map(|r| r.provider.as_str()))
    }
}

// ---------------------------------------------------------------------------
// FilteredTable: the rendered result of a filter pass
// ---------------------------------------------------------------------------

/// Output of the filter engine: the table's columns with every row laid out
/// in column order and the date column rendered as `DD-MM-YYYY` text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredTable {
    pub column_names: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl FilteredTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.column_names.iter().position(|c| c == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn record(provider: &str, region: &str, manager: &str) -> SiteRecord {
        SiteRecord {
            provider: provider.to_string(),
            site: CellValue::Integer(1),
            date: NaiveDate::from_ymd_opt(2024, 3, 5)
                .unwrap()
                .and_hms_opt(10, 30, 0)
                .unwrap(),
            region: region.to_string(),
            cluster_manager: manager.to_string(),
            area_manager: String::new(),
            area_executive: String::new(),
            extra: BTreeMap::from([("Status".to_string(), CellValue::Text("Up".into()))]),
        }
    }

    #[test]
    fn whole_floats_display_without_fraction() {
        assert_eq!(CellValue::Float(123.0).to_string(), "123");
        assert_eq!(CellValue::Float(12.5).to_string(), "12.5");
        assert_eq!(CellValue::Empty.to_string(), "");
    }

    #[test]
    fn provider_column_is_moved_first() {
        let table = SiteTable::new(
            vec!["Site".into(), "Provider".into(), "Date".into()],
            Vec::new(),
        );
        assert_eq!(table.column_names, vec!["Provider", "Site", "Date"]);
    }

    #[test]
    fn choices_are_distinct_in_first_seen_order() {
        let table = SiteTable::new(
            Vec::new(),
            vec![
                record("BSNL", "South", "Ravi"),
                record("VI", "North", ""),
                record("BSNL", "South", "Anil"),
            ],
        );
        assert_eq!(table.choices.regions, vec!["South", "North"]);
        assert_eq!(table.choices.cluster_managers, vec!["Ravi", "Anil"]);
        assert!(table.choices.area_managers.is_empty());
        assert_eq!(table.providers(), vec!["BSNL", "VI"]);
    }

    #[test]
    fn cell_lookup_covers_fixed_and_extra_columns() {
        let r = record("BSNL", "South", "Ravi");
        assert_eq!(r.cell("Provider"), CellValue::Text("BSNL".into()));
        assert_eq!(r.cell("Status"), CellValue::Text("Up".into()));
        assert_eq!(r.cell("Missing"), CellValue::Empty);
        assert_eq!(r.display_date(), "05-03-2024");
    }
}
