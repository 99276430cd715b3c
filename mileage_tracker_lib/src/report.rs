use chrono::NaiveDate;

use crate::{ledger::LedgerError, reimbursement::ReimbursementRate, trip::Trip};

pub const REPORT_HEADER: [&str; 4] = ["Date", "From", "To", "Miles"];
pub const TOTAL_MILES_LABEL: &str = "Total Miles";
pub const TOTAL_REIMBURSEMENT_LABEL: &str = "Total Reimbursement";

/// A single value in a report row. Sinks decide how each kind is rendered.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Date(NaiveDate),
    Miles(f64),
    Currency(f64),
}

impl Cell {
    /// Plain-text rendering, used by delimited exports.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Date(date) => date.format("%Y-%m-%d").to_string(),
            Cell::Miles(miles) => format_miles(*miles),
            Cell::Currency(amount) => format!("{amount:.2}"),
        }
    }
}

/// Drops float noise from summed distances (0.1 + 0.2 prints as 0.3).
pub fn format_miles(miles: f64) -> String {
    ((miles * 10_000.).round() / 10_000.).to_string()
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    cells: [Cell; 4],
}

impl ReportRow {
    fn trip(trip: &Trip) -> Self {
        Self {
            cells: [
                Cell::Date(trip.date()),
                Cell::Text(trip.origin.clone()),
                Cell::Text(trip.destination.clone()),
                Cell::Miles(trip.miles),
            ],
        }
    }

    fn blank() -> Self {
        Self {
            cells: [Cell::Empty, Cell::Empty, Cell::Empty, Cell::Empty],
        }
    }

    fn total(label: &str, value: Cell) -> Self {
        Self {
            cells: [Cell::Text(label.to_string()), Cell::Empty, Cell::Empty, value],
        }
    }

    pub fn cells(&self) -> &[Cell; 4] {
        &self.cells
    }

    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(|cell| *cell == Cell::Empty)
    }
}

/// The exportable trip log: one row per trip, a blank separator, then the two total rows.
/// The header is kept apart from the rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    rows: Vec<ReportRow>,
    total_miles: f64,
    total_reimbursement: f64,
}

impl Report {
    pub fn from_trips(trips: &[Trip], rate: ReimbursementRate) -> Result<Self, LedgerError> {
        if trips.is_empty() {
            return Err(LedgerError::EmptyLedger);
        }

        let total_miles = trips.iter().fold(0., |total, trip| total + trip.miles);
        let total_reimbursement = rate.reimbursement_for(total_miles);

        let mut rows: Vec<ReportRow> = trips.iter().map(ReportRow::trip).collect();
        rows.push(ReportRow::blank());
        rows.push(ReportRow::total(TOTAL_MILES_LABEL, Cell::Miles(total_miles)));
        rows.push(ReportRow::total(TOTAL_REIMBURSEMENT_LABEL, Cell::Currency(total_reimbursement)));

        Ok(Self {
            rows,
            total_miles,
            total_reimbursement,
        })
    }

    pub fn header(&self) -> &'static [&'static str; 4] {
        &REPORT_HEADER
    }

    pub fn rows(&self) -> &[ReportRow] {
        &self.rows
    }

    pub fn total_miles(&self) -> f64 {
        self.total_miles
    }

    pub fn total_reimbursement(&self) -> f64 {
        self.total_reimbursement
    }
}
