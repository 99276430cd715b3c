use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use mileage_tracker_lib::{Cell, Report};
use rust_xlsxwriter::{ExcelDateTime, Format, Workbook, XlsxError};

const CURRENCY_FORMAT: &str = "\"$\"#,##0.00";
const DATE_FORMAT: &str = "yyyy-mm-dd";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("failed to write xlsx: {0}")]
    Xlsx(#[from] XlsxError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    Csv,
    #[default]
    Xlsx,
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            _ => Err(s.to_string()),
        }
    }
}

impl ExportFormat {
    pub fn content_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv; charset=utf-8",
            ExportFormat::Xlsx => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        }
    }

    /// CSV downloads are dated, the claim workbook keeps its fixed name.
    pub fn file_name(self, today: NaiveDate) -> String {
        match self {
            ExportFormat::Csv => format!("mileage_report_{}.csv", today.format("%Y-%m-%d")),
            ExportFormat::Xlsx => "MileageClaim.xlsx".to_string(),
        }
    }

    pub fn render(self, report: &Report) -> Result<Vec<u8>, ExportError> {
        match self {
            ExportFormat::Csv => render_csv(report),
            ExportFormat::Xlsx => render_xlsx(report),
        }
    }
}

pub fn render_csv(report: &Report) -> Result<Vec<u8>, ExportError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer.write_record(report.header())?;
    for row in report.rows() {
        writer.write_record(row.cells().iter().map(Cell::to_text))?;
    }

    writer.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))
}

/// One worksheet: bold header in the first row, then the report rows with real dates and numbers.
pub fn render_xlsx(report: &Report) -> Result<Vec<u8>, ExportError> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let date_format = Format::new().set_num_format(DATE_FORMAT);
    let currency_format = Format::new().set_num_format(CURRENCY_FORMAT);

    let worksheet = workbook.add_worksheet().set_name("Mileage")?;

    for (col, title) in report.header().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, *title, &bold)?;
    }

    for (index, row) in report.rows().iter().enumerate() {
        let row_num = index as u32 + 1;

        for (col, cell) in row.cells().iter().enumerate() {
            let col = col as u16;
            match cell {
                Cell::Empty => {}
                Cell::Text(text) => {
                    worksheet.write_string(row_num, col, text)?;
                }
                Cell::Date(date) => {
                    let date = ExcelDateTime::from_ymd(date.year() as u16, date.month() as u8, date.day() as u8)?;
                    worksheet.write_datetime_with_format(row_num, col, &date, &date_format)?;
                }
                Cell::Miles(miles) => {
                    worksheet.write_number(row_num, col, *miles)?;
                }
                Cell::Currency(amount) => {
                    worksheet.write_number_with_format(row_num, col, *amount, &currency_format)?;
                }
            }
        }
    }

    worksheet.autofit();

    Ok(workbook.save_to_buffer()?)
}
