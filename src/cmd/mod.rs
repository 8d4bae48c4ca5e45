//! CLI command implementations.
//!
//! Each submodule owns one or more related `Commands` variants:
//!
//! | Module          | Commands handled                                   |
//! |-----------------|-----------------------------------------------------|
//! | `project`       | `Init`, `Offline`                                  |
//! | `create`        | `Create`                                           |
//! | `catalog`       | `Catalog`                                          |
//! | `config`        | `Config`                                           |

pub mod catalog;
pub mod config;
pub mod create;
pub mod project;

pub use catalog::cmd_catalog;
pub use config::cmd_config;
pub use create::{CreateOptions, Finish, cmd_create};
pub use project::{cmd_init, cmd_offline};
