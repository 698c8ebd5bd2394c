//! Results log storage and read access for diabetes risk evaluations.
//!
//! - [`RecordStore`]: append-only CSV log with header widening
//! - [`RecordTable`]: untyped rows, used for filtered CSV downloads
//! - [`AccessGate`]: plaintext email allow-list (not a security boundary)

pub mod access;
pub mod error;
pub mod row;
pub mod store;
pub mod table;

pub use access::{AccessDecision, AccessGate, DEFAULT_LEADER_EMAIL, DEFAULT_PROFESSIONAL_EMAILS};
pub use error::{Result, StoreError};
pub use row::{CANONICAL_COLUMNS, DATE_FORMAT, evaluation_to_row, evaluations_from_table};
pub use store::{RecordStore, write_atomic};
pub use table::RecordTable;
