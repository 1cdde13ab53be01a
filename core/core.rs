pub mod config;
pub mod emit;
pub mod error;
pub mod gather;
pub mod generator;
pub mod pack;
pub mod rules;

#[cfg(test)]
mod test_log;

pub use config::{Config, InputConfig, OutputConfig};
pub use emit::{discover_package_name, render, write_output};
pub use error::{AppError, Result};
pub use gather::{FileRecord, Manifest, collect};
pub use generator::{Generated, Generator};
pub use pack::{Bundle, pack, unpack};
pub use rules::{Candidate, Rule, RuleSet, build_rules};
