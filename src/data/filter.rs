use chrono::NaiveDate;

use super::model::{CellValue, FilteredTable, SiteRecord, SiteTable, DATE_COLUMN};

// ---------------------------------------------------------------------------
// Filter criteria
// ---------------------------------------------------------------------------

/// Optional constraints, combined with AND.
/// `None` or an empty string means "no constraint" for that dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Case-sensitive substring of the site identifier.
    pub site: Option<String>,
    /// Calendar day; time of day on the record is ignored.
    pub date: Option<NaiveDate>,
    pub region: Option<String>,
    pub cluster_manager: Option<String>,
    pub area_manager: Option<String>,
    pub area_executive: Option<String>,
}

fn active(criterion: &Option<String>) -> Option<&str> {
    criterion.as_deref().filter(|s| !s.is_empty())
}

fn exact(criterion: &Option<String>, value: &str) -> bool {
    active(criterion).map_or(true, |wanted| wanted == value)
}

impl FilterCriteria {
    /// True when no dimension is constrained.
    pub fn is_unconstrained(&self) -> bool {
        active(&self.site).is_none()
            && self.date.is_none()
            && active(&self.region).is_none()
            && active(&self.cluster_manager).is_none()
            && active(&self.area_manager).is_none()
            && active(&self.area_executive).is_none()
    }

    /// Whether a record passes every supplied criterion.
    pub fn matches(&self, record: &SiteRecord) -> bool {
        if let Some(site) = active(&self.site) {
            if !record.site_text().contains(site) {
                return false;
            }
        }
        if let Some(day) = self.date {
            if record.date.date() != day {
                return false;
            }
        }
        exact(&self.region, &record.region)
            && exact(&self.cluster_manager, &record.cluster_manager)
            && exact(&self.area_manager, &record.area_manager)
            && exact(&self.area_executive, &record.area_executive)
    }
}

// ---------------------------------------------------------------------------
// Filter passes
// ---------------------------------------------------------------------------

/// Indices of records passing `criteria`, in table order.
pub fn filtered_indices(table: &SiteTable, criteria: &FilterCriteria) -> Vec<usize> {
    table
        .records
        .iter()
        .enumerate()
        .filter(|(_, record)| criteria.matches(record))
        .map(|(i, _)| i)
        .collect()
}

/// Stable filter producing the display table.
///
/// Rows keep table order; every column of the table is emitted and the date
/// column is rewritten as `DD-MM-YYYY` text. An empty result is not an error.
pub fn filter_table(table: &SiteTable, criteria: &FilterCriteria) -> FilteredTable {
    let rows = filtered_indices(table, criteria)
        .into_iter()
        .map(|i| {
            let record = &table.records[i];
            table
                .column_names
                .iter()
                .map(|col| {
                    if col == DATE_COLUMN {
                        CellValue::Text(record.display_date())
                    } else {
                        record.cell(col)
                    }
                })
                .collect()
        })
        .collect();

    FilteredTable {
        column_names: table.column_names.clone(),
        rows,
    }
}
