//! Project database integration and project layout definitions.
//!
//! The SQLite database stores:
//! - the stability baseline (one approved body per function name);
//! - translation run history and the failures of each run.
//!
//! Alongside it:
//! - `ProjectConfig`: serializable project metadata and output settings.
//! - `ProjectLayout`: computed paths for project directories/files.
//! - `ProjectContext`: layout + config + open database for one root.

mod config;
mod context;
mod layout;
mod models;
mod project_db;
mod util;

pub use config::{DbConfig, OutputConfig, ProjectConfig};
pub use context::ProjectContext;
pub use layout::ProjectLayout;
pub use models::{BaselineOrigin, BaselineRecord, RunFailureRecord, TranslationRunRecord};
pub use project_db::{DbError, DbResult, ProjectDb, CURRENT_SCHEMA_VERSION};
pub use util::{load_project_config, open_project_db};
