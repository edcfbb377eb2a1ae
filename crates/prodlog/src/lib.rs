//! `prodlog` - Production data entry and record keeping
//!
//! This library provides the form collection, CSV-backed record storage and
//! table presentation behind the `prodlog` command-line tool.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod cli;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod record;
pub mod storage;
pub mod table;

pub use config::Config;
pub use error::{Error, Result};
pub use form::{EntryForm, FormOptions, Prompter};
pub use logging::init_logging;
pub use record::{reworks_percent, Category, CategoryCounts, DownTime, NewRecord, ProductionRecord};
pub use storage::RecordStore;
pub use table::OutputFormat;
