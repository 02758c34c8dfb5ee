use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};

use super::model::{CellValue, FilteredTable};

/// Name of the single worksheet in an export.
pub const EXPORT_SHEET_NAME: &str = "Sheet1";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("writing workbook: {0}")]
    Xlsx(#[from] XlsxError),

    #[error("{0} rows do not fit in a worksheet")]
    TooManyRows(usize),

    #[error("{0} columns do not fit in a worksheet")]
    TooManyColumns(usize),
}

/// Encode a filtered view as an `.xlsx` workbook.
///
/// One worksheet, a header row with the view's column names, no index column.
pub fn export_xlsx(table: &FilteredTable) -> Result<Vec<u8>, ExportError> {
    let n_cols = table.column_names.len();
    u16::try_from(n_cols).map_err(|_| ExportError::TooManyColumns(n_cols))?;
    u32::try_from(table.len() + 1).map_err(|_| ExportError::TooManyRows(table.len()))?;

    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let datetime = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");

    let worksheet = workbook.add_worksheet();
    worksheet.set_name(EXPORT_SHEET_NAME)?;

    for (col, name) in table.column_names.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, name, &header)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let row_num = r as u32 + 1;
        for (col, cell) in row.iter().enumerate().take(n_cols) {
            write_cell(worksheet, row_num, col as u16, cell, &datetime)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn write_cell(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    cell: &CellValue,
    datetime: &Format,
) -> Result<(), XlsxError> {
    match cell {
        CellValue::Empty => {}
        CellValue::Bool(b) => {
            worksheet.write_boolean(row, col, *b)?;
        }
        CellValue::Integer(i) => {
            worksheet.write_number(row, col, *i as f64)?;
        }
        CellValue::Float(f) => {
            worksheet.write_number(row, col, *f)?;
        }
        CellValue::Text(s) => {
            worksheet.write_string(row, col, s)?;
        }
        CellValue::DateTime(dt) => {
            worksheet.write_datetime_with_format(row, col, dt, datetime)?;
        }
    }
    Ok(())
}
