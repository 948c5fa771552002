//! CLI commands

pub mod check_version;
pub mod inflate;
