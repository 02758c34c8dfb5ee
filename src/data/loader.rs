use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use calamine::{open_workbook_from_rs, Data, DataType, Ods, Reader, Xls, Xlsx};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde_json::Value as JsonValue;

use super::model::{
    CellValue, SiteRecord, SiteTable, DATE_COLUMN, PROVIDER_COLUMN, REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Everything that can abort an ingestion. Any error discards the whole table.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("{origin}: missing required column '{column}'")]
    Schema { origin: String, column: &'static str },

    #[error("{origin}: row {row}, column '{column}': cannot read '{value}' as a date")]
    Parse {
        origin: String,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("{origin}: {message}")]
    Decode { origin: String, message: String },

    #[error("{origin}: unsupported file extension '.{extension}'")]
    UnsupportedFormat { origin: String, extension: String },

    #[error("{origin}: workbook contains no worksheet")]
    EmptyWorkbook { origin: String },

    #[error("reading {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// One tabular source: a file name plus its raw bytes.
#[derive(Debug, Clone)]
pub struct SourceInput {
    /// File name (or path) the bytes came from; selects the decoder.
    pub name: String,
    /// Caller-supplied provenance label. When absent it is derived from `name`.
    pub label: Option<String>,
    pub bytes: Vec<u8>,
}

impl SourceInput {
    /// A user-uploaded file: the label comes from the file name.
    pub fn upload(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            label: None,
            bytes,
        }
    }

    /// A fixed source with an explicit label.
    pub fn labelled(label: impl Into<String>, name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            label: Some(label.into()),
            bytes,
        }
    }

    pub fn provenance(&self) -> String {
        self.label
            .clone()
            .unwrap_or_else(|| provenance_label(&self.name).to_string())
    }
}

/// Provenance label for a file: everything before the first `.` of its name.
///
/// `airtel.xlsx` → `airtel`, `vi.2024.xlsx` → `vi`.
pub fn provenance_label(name: &str) -> &str {
    let file_name = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(name);
    file_name.split('.').next().unwrap_or(file_name)
}

/// Decoder selected by file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Xlsx,
    Xls,
    Ods,
    Csv,
    Json,
}

impl SourceFormat {
    /// Extensions offered by the file picker.
    pub const EXTENSIONS: [&'static str; 6] = ["xlsx", "xlsm", "xls", "ods", "csv", "json"];

    pub fn from_name(name: &str) -> Result<Self, IngestError> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "ods" => Ok(Self::Ods),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(IngestError::UnsupportedFormat {
                origin: name.to_string(),
                extension: ext,
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Merge sources into one table.
///
/// Rows keep source order and intra-source order; the provenance column is
/// first; the remaining columns are the union of source columns in first-seen
/// order. The first failing source aborts the whole merge.
pub fn merge_sources(sources: &[SourceInput]) -> Result<SiteTable, IngestError> {
    let mut column_names: Vec<String> = Vec::new();
    let mut records = Vec::new();

    for source in sources {
        let sheet = decode_source(source)?;
        let label = source.provenance();
        let mut rows = records_from_sheet(&source.name, &label, &sheet)?;

        for header in &sheet.headers {
            if header != PROVIDER_COLUMN && !column_names.contains(header) {
                column_names.push(header.clone());
            }
        }

        log::debug!("{}: {} rows tagged '{label}'", source.name, rows.len());
        records.append(&mut rows);
    }

    Ok(SiteTable::new(column_names, records))
}

/// Load fixed local sources, each with its own label.
pub fn load_paths(sources: &[(String, PathBuf)]) -> Result<SiteTable, IngestError> {
    let inputs = sources
        .iter()
        .map(|(label, path)| -> Result<SourceInput, IngestError> {
            let bytes = read_file(path)?;
            Ok(SourceInput::labelled(label, path.to_string_lossy(), bytes))
        })
        .collect::<Result<Vec<_>, IngestError>>()?;
    merge_sources(&inputs)
}

/// Load user-picked files; labels come from the file names.
pub fn load_uploads(paths: &[PathBuf]) -> Result<SiteTable, IngestError> {
    let inputs = paths
        .iter()
        .map(|path| -> Result<SourceInput, IngestError> {
            let bytes = read_file(path)?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            Ok(SourceInput::upload(name, bytes))
        })
        .collect::<Result<Vec<_>, IngestError>>()?;
    merge_sources(&inputs)
}

fn read_file(path: &Path) -> Result<Vec<u8>, IngestError> {
    std::fs::read(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Decoding: bytes → header row + cell grid
// ---------------------------------------------------------------------------

/// A decoded first sheet: header names and data rows.
///
/// Each row carries its 1-based position in the source, header included, so
/// errors still point at the right line after blank rows are dropped.
#[derive(Debug, Default)]
struct RawSheet {
    headers: Vec<String>,
    rows: Vec<(usize, Vec<CellValue>)>,
}

fn decode_source(source: &SourceInput) -> Result<RawSheet, IngestError> {
    let origin = source.name.as_str();
    let bytes = source.bytes.as_slice();
    let mut sheet = match SourceFormat::from_name(origin)? {
        SourceFormat::Xlsx => decode_workbook::<Xlsx<_>>(origin, bytes)?,
        SourceFormat::Xls => decode_workbook::<Xls<_>>(origin, bytes)?,
        SourceFormat::Ods => decode_workbook::<Ods<_>>(origin, bytes)?,
        SourceFormat::Csv => decode_csv(origin, bytes)?,
        SourceFormat::Json => decode_json(origin, bytes)?,
    };
    sheet.headers = dedupe_headers(sheet.headers);
    // Formatted-but-blank trailing rows are common in workbooks.
    sheet.rows.retain(|(_, row)| !row.iter().all(CellValue::is_empty));
    Ok(sheet)
}

/// Read the first worksheet of a calamine-supported workbook.
fn decode_workbook<'a, R>(origin: &str, bytes: &'a [u8]) -> Result<RawSheet, IngestError>
where
    R: Reader<Cursor<&'a [u8]>>,
    R::Error: fmt::Display,
{
    let decode_err = |e: R::Error| IngestError::Decode {
        origin: origin.to_string(),
        message: e.to_string(),
    };

    let mut workbook: R = open_workbook_from_rs(Cursor::new(bytes)).map_err(decode_err)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| IngestError::EmptyWorkbook {
            origin: origin.to_string(),
        })?
        .map_err(decode_err)?;

    // The range starts at the first used cell, not necessarily at A1.
    let header_line = range.start().map_or(1, |(row, _)| row as usize + 1);
    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(RawSheet::default());
    };

    Ok(RawSheet {
        headers: header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect(),
        rows: rows
            .enumerate()
            .map(|(i, row)| (header_line + i + 1, row.iter().map(cell_from_calamine).collect()))
            .collect(),
    })
}

fn cell_from_calamine(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::Bool(b) => CellValue::Bool(*b),
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::Float(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_datetime()
            .map(CellValue::DateTime)
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// CSV layout: header row with column names, one record per line.
///
/// Cells stay text: CSV carries no types, and identifiers such as `0123`
/// must keep their leading zeros.
fn decode_csv(origin: &str, bytes: &[u8]) -> Result<RawSheet, IngestError> {
    let decode_err = |e: csv::Error| IngestError::Decode {
        origin: origin.to_string(),
        message: e.to_string(),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(bytes);
    let headers = reader
        .headers()
        .map_err(decode_err)?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let rows = reader
        .records()
        .enumerate()
        .map(|(i, record)| {
            let record = record.map_err(decode_err)?;
            let line = record.position().map_or(i + 2, |p| p.line() as usize);
            Ok((line, record.iter().map(text_cell).collect()))
        })
        .collect::<Result<Vec<_>, IngestError>>()?;

    Ok(RawSheet { headers, rows })
}

fn text_cell(s: &str) -> CellValue {
    if s.is_empty() {
        CellValue::Empty
    } else {
        CellValue::Text(s.to_string())
    }
}

/// Expected JSON schema (records-oriented, `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "Site": "1234", "Date": "2024-03-15", "Region": "South", ... },
///   ...
/// ]
/// ```
fn decode_json(origin: &str, bytes: &[u8]) -> Result<RawSheet, IngestError> {
    let decode_err = |message: String| IngestError::Decode {
        origin: origin.to_string(),
        message,
    };

    let root: JsonValue = serde_json::from_slice(bytes).map_err(|e| decode_err(e.to_string()))?;
    let records = root
        .as_array()
        .ok_or_else(|| decode_err("expected top-level JSON array".to_string()))?;

    let mut headers: Vec<String> = Vec::new();
    let mut objects = Vec::with_capacity(records.len());
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .ok_or_else(|| decode_err(format!("record {i} is not a JSON object")))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
        objects.push(obj);
    }

    // Record `i` is reported as row `i + 2`, as if a header line came first.
    let rows = objects
        .iter()
        .enumerate()
        .map(|(i, obj)| {
            let cells: Vec<CellValue> = headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Empty))
                .collect();
            (i + 2, cells)
        })
        .collect();

    Ok(RawSheet { headers, rows })
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) if s.is_empty() => CellValue::Empty,
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Empty,
        other => CellValue::Text(other.to_string()),
    }
}

/// Name blank headers `Unnamed: <n>` and suffix repeats with `.1`, `.2`, …
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.is_empty() { format!("Unnamed: {i}") } else { h };
            let n = counts.entry(base.clone()).or_insert(0);
            let name = if *n == 0 {
                base
            } else {
                format!("{base}.{n}")
            };
            *n += 1;
            name
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Schema mapping: raw grid → typed records
// ---------------------------------------------------------------------------

fn records_from_sheet(
    origin: &str,
    label: &str,
    sheet: &RawSheet,
) -> Result<Vec<SiteRecord>, IngestError> {
    let index_of = |column: &'static str| {
        sheet
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| IngestError::Schema {
                origin: origin.to_string(),
                column,
            })
    };

    let mut required = [0usize; REQUIRED_COLUMNS.len()];
    for (slot, column) in required.iter_mut().zip(REQUIRED_COLUMNS) {
        *slot = index_of(column)?;
    }
    let [site_idx, date_idx, region_idx, l1_idx, l2_idx, l3_idx] = required;

    // Everything except the fixed schema and any pre-existing provenance column.
    let extra_cols: Vec<(usize, &String)> = sheet
        .headers
        .iter()
        .enumerate()
        .filter(|(i, h)| !required.contains(i) && h.as_str() != PROVIDER_COLUMN)
        .collect();

    let empty = CellValue::Empty;
    sheet
        .rows
        .iter()
        .map(|(line, row)| -> Result<SiteRecord, IngestError> {
            let cell = |idx: usize| row.get(idx).unwrap_or(&empty);
            let text = |idx: usize| cell(idx).to_string();

            let date_cell = cell(date_idx);
            let date = parse_date_cell(date_cell).ok_or_else(|| IngestError::Parse {
                origin: origin.to_string(),
                row: *line,
                column: DATE_COLUMN,
                value: date_cell.to_string(),
            })?;

            let extra: BTreeMap<String, CellValue> = extra_cols
                .iter()
                .map(|(idx, name)| ((*name).clone(), cell(*idx).clone()))
                .collect();

            Ok(SiteRecord {
                provider: label.to_string(),
                site: cell(site_idx).clone(),
                date,
                region: text(region_idx),
                cluster_manager: text(l1_idx),
                area_manager: text(l2_idx),
                area_executive: text(l3_idx),
                extra,
            })
        })
        .collect()
}

const DATE_TIME_FORMATS: [&str; 8] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%Y/%m/%d %H:%M:%S",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%Y/%m/%d"];

/// Interpret a cell as a calendar date-time.
///
/// Accepts native date cells, Excel serial numbers and text in the
/// day-first and ISO layouts listed above.
pub(crate) fn parse_date_cell(cell: &CellValue) -> Option<NaiveDateTime> {
    match cell {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::Text(s) => parse_date_text(s.trim()),
        CellValue::Integer(i) => from_excel_serial(*i as f64),
        CellValue::Float(f) => from_excel_serial(*f),
        CellValue::Empty | CellValue::Bool(_) => None,
    }
}

fn parse_date_text(s: &str) -> Option<NaiveDateTime> {
    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .map(|d| d.and_time(NaiveTime::MIN))
        })
}

/// Excel serial day number (1900 date system) → date-time.
fn from_excel_serial(value: f64) -> Option<NaiveDateTime> {
    // 9999-12-31 is the last date Excel can represent.
    if !value.is_finite() || !(1.0..=2_958_465.0).contains(&value) {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_time(NaiveTime::MIN);
    let millis = (value * 86_400_000.0).round() as i64;
    epoch.checked_add_signed(TimeDelta::milliseconds(millis))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::testing::{xlsx_bytes, xlsx_with_native_dates, HEADERS};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_time(NaiveTime::MIN)
    }

    fn csv_source(name: &str, rows: &[&str]) -> SourceInput {
        let mut text = HEADERS.join(",");
        for row in rows {
            text.push('\n');
            text.push_str(row);
        }
        SourceInput::upload(name, text.into_bytes())
    }

    #[test]
    fn test_provenance_label() {
        assert_eq!(provenance_label("airtel.xlsx"), "airtel");
        assert_eq!(provenance_label("vi.2024.xlsx"), "vi");
        assert_eq!(provenance_label("/tmp/uploads/bsnl.xlsx"), "bsnl");
        assert_eq!(provenance_label("noext"), "noext");
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(SourceFormat::from_name("a.XLSX").unwrap(), SourceFormat::Xlsx);
        assert_eq!(SourceFormat::from_name("a.csv").unwrap(), SourceFormat::Csv);
        assert!(matches!(
            SourceFormat::from_name("a.txt"),
            Err(IngestError::UnsupportedFormat { extension, .. }) if extension == "txt"
        ));
    }

    #[test]
    fn merges_xlsx_sources_with_provider_first() {
        let bsnl = xlsx_bytes(&[
            &["1234", "2024-03-15", "South", "Ravi", "Meena", "Arun", "Up"],
            &["5678", "2024-03-16", "North", "Kiran", "Suresh", "Divya", "Down"],
        ]);
        let vi = xlsx_bytes(&[&["A123B", "15-03-2024", "South", "Ravi", "Meena", "Arun", "Up"]]);

        let table = merge_sources(&[
            SourceInput::upload("bsnl.xlsx", bsnl),
            SourceInput::labelled("VI", "vi.xlsx", vi),
        ])
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(
            table.column_names,
            vec![
                "Provider",
                "Site",
                "Date",
                "Region",
                "Cluster MANAGER (L1)",
                "Area MANAGER (L2)",
                "Area EXECUTIVE (L3)",
                "Status"
            ]
        );
        let providers: Vec<&str> = table.records.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(providers, vec!["bsnl", "bsnl", "VI"]);
        assert_eq!(table.records[0].date, ymd(2024, 3, 15));
        assert_eq!(table.records[2].date, ymd(2024, 3, 15));
        assert_eq!(table.records[1].extra["Status"], CellValue::Text("Down".into()));
    }

    #[test]
    fn reads_native_excel_dates() {
        let bytes = xlsx_with_native_dates(&[(2024, 1, 31), (2023, 12, 1)]);
        let table = merge_sources(&[SourceInput::upload("airtel.xlsx", bytes)]).unwrap();
        assert_eq!(table.records[0].date, ymd(2024, 1, 31));
        assert_eq!(table.records[1].date, ymd(2023, 12, 1));
        assert_eq!(table.records[0].site.to_string(), "1001");
    }

    #[test]
    fn missing_required_column_is_schema_error() {
        let src = SourceInput::upload("bad.csv", b"Site,Region\n1,South".to_vec());
        let err = merge_sources(&[src]).unwrap_err();
        assert!(matches!(err, IngestError::Schema { column: "Date", .. }), "{err}");
    }

    #[test]
    fn bad_date_fails_the_whole_merge() {
        let good = csv_source("a.csv", &["1,2024-01-01,South,L1,L2,L3,Up"]);
        let bad = csv_source(
            "b.csv",
            &["2,2024-01-02,South,L1,L2,L3,Up", "3,not a date,South,L1,L2,L3,Up"],
        );
        let err = merge_sources(&[good, bad]).unwrap_err();
        match err {
            IngestError::Parse { origin, row, value, .. } => {
                assert_eq!(origin, "b.csv");
                assert_eq!(row, 3);
                assert_eq!(value, "not a date");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn empty_date_is_a_parse_error() {
        let src = csv_source("a.csv", &["1,,South,L1,L2,L3,Up"]);
        assert!(matches!(
            merge_sources(&[src]),
            Err(IngestError::Parse { row: 2, .. })
        ));
    }

    #[test]
    fn no_sources_give_an_empty_table() {
        let table = merge_sources(&[]).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.column_names, vec!["Provider"]);
    }

    #[test]
    fn existing_provider_column_is_replaced() {
        let text = format!("Provider,{}\nOld,1,2024-01-01,S,a,b,c,Up", HEADERS.join(","));
        let table =
            merge_sources(&[SourceInput::upload("jio.csv", text.into_bytes())]).unwrap();
        assert_eq!(table.records[0].provider, "jio");
        assert_eq!(
            table.column_names.iter().filter(|c| *c == "Provider").count(),
            1
        );
    }

    #[test]
    fn json_records_are_accepted() {
        let json = br#"[
            {"Site": 42, "Date": "2024-05-01", "Region": "East",
             "Cluster MANAGER (L1)": "a", "Area MANAGER (L2)": "b", "Area EXECUTIVE (L3)": "c",
             "Zeta": 1, "Alpha": 2}
        ]"#;
        let table = merge_sources(&[SourceInput::upload("jio.json", json.to_vec())]).unwrap();
        assert_eq!(table.records[0].site, CellValue::Integer(42));
        assert_eq!(table.records[0].region, "East");
        // Keys keep document order, not alphabetical order.
        assert_eq!(
            table.column_names,
            vec![
                "Provider",
                "Site",
                "Date",
                "Region",
                "Cluster MANAGER (L1)",
                "Area MANAGER (L2)",
                "Area EXECUTIVE (L3)",
                "Zeta",
                "Alpha"
            ]
        );
    }

    #[test]
    fn csv_cells_keep_their_text() {
        let text = format!(
            "{},Code\n0123,2024-01-01,S,a,b,c,Up,007\n555,2024-01-02,S,a,b,c,Up,1.50",
            HEADERS.join(",")
        );
        let table =
            merge_sources(&[SourceInput::upload("bsnl.csv", text.into_bytes())]).unwrap();

        assert_eq!(table.records[0].site, CellValue::Text("0123".into()));
        assert_eq!(table.records[0].extra["Code"], CellValue::Text("007".into()));
        assert_eq!(table.records[1].extra["Code"].to_string(), "1.50");

        let view = crate::data::filter::filter_table(
            &table,
            &crate::data::filter::FilterCriteria {
                site: Some("0123".into()),
                ..Default::default()
            },
        );
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn parse_errors_count_skipped_blank_rows() {
        let src = csv_source(
            "a.csv",
            &["1,2024-01-01,S,a,b,c,Up", ",,,,,,", ",,,,,,", "2,bad,S,a,b,c,Up"],
        );
        match merge_sources(&[src]).unwrap_err() {
            IngestError::Parse { row, value, .. } => {
                assert_eq!(row, 5);
                assert_eq!(value, "bad");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn workbook_parse_errors_use_sheet_rows() {
        let bytes = xlsx_bytes(&[
            &["1", "2024-01-01", "S", "a", "b", "c", "Up"],
            &["", "", "", "", "", "", ""],
            &["2", "bad", "S", "a", "b", "c", "Up"],
        ]);
        assert!(matches!(
            merge_sources(&[SourceInput::upload("a.xlsx", bytes)]),
            Err(IngestError::Parse { row: 4, .. })
        ));
    }

    #[test]
    fn blank_rows_are_skipped() {
        let src = csv_source("a.csv", &["1,2024-01-01,S,a,b,c,Up", ",,,,,,"]);
        assert_eq!(merge_sources(&[src]).unwrap().len(), 1);
    }

    #[test]
    fn duplicate_headers_are_suffixed() {
        let headers = dedupe_headers(vec!["A".into(), "A".into(), "".into(), "A".into()]);
        assert_eq!(headers, vec!["A", "A.1", "Unnamed: 2", "A.2"]);
    }

    #[test]
    fn date_text_layouts() {
        let expected = ymd(2024, 3, 15);
        for text in ["2024-03-15", "15-03-2024", "15/03/2024", "15.03.2024", "2024/03/15"] {
            assert_eq!(parse_date_text(text), Some(expected), "{text}");
        }
        assert_eq!(
            parse_date_text("2024-03-15 18:45:00").map(|d| d.date()),
            Some(expected.date())
        );
        assert_eq!(from_excel_serial(45366.0), Some(expected));
        assert_eq!(parse_date_text("15th March"), None);
    }

    #[test]
    fn load_paths_reads_labelled_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bsnl.xlsx");
        std::fs::write(
            &path,
            xlsx_bytes(&[&["1", "2024-01-01", "S", "a", "b", "c", "Up"]]),
        )
        .unwrap();

        let table = load_paths(&[("BSNL".to_string(), path)]).unwrap();
        assert_eq!(table.records[0].provider, "BSNL");

        let missing = dir.path().join("missing.xlsx");
        assert!(matches!(
            load_uploads(&[missing]),
            Err(IngestError::Io { .. })
        ));
    }

    proptest! {
        /// Row count of a merge equals the sum of per-source row counts, and
        /// every row carries its own source's label.
        #[test]
        fn prop_merge_preserves_counts_and_labels(counts in prop::collection::vec(0usize..12, 0..5)) {
            let sources: Vec<SourceInput> = counts
                .iter()
                .enumerate()
                .map(|(s, n)| {
                    let rows: Vec<String> = (0..*n)
                        .map(|i| format!("{s}{i},2024-02-{:02},R,a,b,c,Up", i % 28 + 1))
                        .collect();
                    let refs: Vec<&str> = rows.iter().map(String::as_str).collect();
                    csv_source(&format!("src{s}.csv"), &refs)
                })
                .collect();

            let table = merge_sources(&sources).unwrap();
            prop_assert_eq!(table.len(), counts.iter().sum::<usize>());
            prop_assert_eq!(table.column_names[0].as_str(), PROVIDER_COLUMN);

            let expected: Vec<String> = counts
                .iter()
                .enumerate()
                .flat_map(|(s, n)| std::iter::repeat(format!("src{s}")).take(*n))
                .collect();
            let actual: Vec<String> = table.records.iter().map(|r| r.provider.clone()).collect();
            prop_assert_eq!(actual, expected);
        }
    }
}
