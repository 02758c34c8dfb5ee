/// Data layer: core types, ingestion, filtering and export.
///
/// Architecture:
/// ```text
///  .xlsx / .xls / .ods / .csv / .json   (one or more sources)
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  decode → schema check → tag provenance → concatenate
///   └──────────┘
///        │
///        ▼
///   ┌───────────┐
///   │ SiteTable  │  Vec<SiteRecord>, column order, filter choices
///   └───────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  criteria → FilteredTable (dates as DD-MM-YYYY)
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  export   │  FilteredTable → .xlsx bytes
///   └──────────┘
/// ```

pub mod export;
pub mod filter;
pub mod loader;
pub mod model;
