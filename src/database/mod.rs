//! # Table Model
//!
//! Column headers, normalized tables and the normalizer that builds them from
//! worksheets.
pub mod column;
pub mod normalize;
pub mod table;

pub use column::{ColumnType, Header};
pub use normalize::{normalize_cell, normalize_sheet, NormalizeOptions};
pub use table::Table;
