//! Data export for offline analysis
//!
//! `rows` flattens the snapshot into a tabular row set; `csv` and
//! `workbook` are pure serializers over that row set.

pub mod csv;
pub mod rows;
pub mod workbook;

pub use csv::to_csv;
pub use rows::{build_rows, codebook_rows, Cell, ExportScope, RowSet};
pub use workbook::build_workbook;
