pub mod config;
pub mod data;
pub mod error;
pub mod stats;

pub use config::ReadOptions;
pub use data::file::{FileExtension, FileHandle};
pub use data::model::Dataset;
pub use error::{Result, StatError};
pub use stats::{ColumnSummary, StatisticsEngine};
