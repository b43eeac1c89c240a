//! CLI subcommand implementations.

pub mod add;
pub mod archive;
pub mod calendar;
pub mod list;
pub mod stats;
pub mod status;
pub mod toggle;
pub mod util;
