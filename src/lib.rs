pub mod cli;
pub mod convert;
pub mod database;
pub mod error;
pub mod matcher;
pub mod schema;
pub mod summary;
pub mod tcx;
pub mod time;
pub mod track;
pub mod types;
pub mod utils;

pub use convert::{Conversion, convert};
pub use error::{ConvertError, Result};
