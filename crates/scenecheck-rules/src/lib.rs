//! Scenecheck Rules - content validation and auto-fix
//!
//! This crate provides the rule model and its JSON configuration, a registry
//! of built-in checks and corrective actions, the check runner, and result
//! reporting and export.

mod batch;
mod board;
mod config;
pub mod correctives;
mod export;
pub mod predicates;
mod probe;
mod registry;
mod report;
mod runner;
mod types;

pub use batch::{batch_check_multiple, default_output_path, run_batch_check, BatchRequest};
pub use board::{AdjustOutcome, ResultBoard};
pub use config::{
    config_path, list_configs, load_rule_config, try_load_rule_config, ConfigSummary,
    DEFAULT_CONFIG,
};
pub use export::{render_csv, write_csv, CSV_HEADER};
pub use probe::{collect_items, Probe};
pub use registry::{CheckRegistry, CorrectiveFn, PredicateFn};
pub use report::{ReportSummary, ViolationReport};
pub use runner::{CancelToken, CheckRunner, RunSession, RunState};
pub use types::{Category, Rule, RuleConfig, RuleEntry, Severity};
