//! Structured parsing of LLM-generated PLC security analysis reports.
//!
//! [`parser`] holds the pure parsing core. [`envelope`] locates the report
//! inside analyzer output, [`compare`] diffs a report against its baseline and
//! [`runner`] parses batches of files concurrently.

pub mod compare;
pub mod config;
pub mod discovery;
pub mod envelope;
pub mod error;
pub mod output;
pub mod parser;
pub mod runner;
