//! Command-line front end for pathmetrics: runs the pipeline over config
//! files and prints the metrics of every path.

pub mod error;
pub mod report;
