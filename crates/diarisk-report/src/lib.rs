//! Single-evaluation exports.
//!
//! - **PDF**: one A4 page summarising inputs and result
//! - **CSV**: header plus one row of the raw clinical fields

mod csv_row;
mod lines;
mod pdf;

pub use csv_row::render_csv_row;
pub use lines::{LineStyle, ReportLine, report_lines};
pub use pdf::render_pdf;
