//! File I/O, validation, and serialization around the inflow clustering core.

mod domain;
mod error;
mod reader;
mod summary;
mod writer;

pub use domain::{Dataset, ExperimentName, ProjectId};
pub use error::IoError;
pub use reader::{DEFAULT_ZERO_SUBSTITUTE, InflowReader};
pub use summary::SummaryExporter;
pub use writer::ResultWriter;
