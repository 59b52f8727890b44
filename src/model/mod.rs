//! Data model for tabular data representation

mod dataset;
mod key;
mod schema;

pub use dataset::{CellValue, Dataset, Row};
pub use key::KeySpec;
pub use schema::{CellType, Column};
