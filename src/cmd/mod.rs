//! CLI command implementations.
//!
//! | Module   | Commands handled                  |
//! |----------|-----------------------------------|
//! | `task`   | every alias, including `help`     |
//! | `config` | `Config`                          |

pub mod config;
pub mod task;

pub use config::cmd_config;
pub use task::{cmd_alias, cmd_help};
