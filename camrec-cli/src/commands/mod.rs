//! CLI command implementations

mod config;
mod list;
mod record;

pub use config::{config, ConfigArgs};
pub use list::{list, ListArgs};
pub use record::{record, RecordArgs};
