pub mod cli;
pub mod config;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod point;
pub mod report;
pub mod retention;
pub mod store;
pub mod util;

pub use error::{Error, Result};
pub use point::Point;
