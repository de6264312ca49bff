//! JSON-backed hierarchical configuration.
//!
//! - [`ConfigStore`]: path-addressed reads, writes and deletes over one
//!   configuration document, with optional autosave
//! - [`resolver`]: locating the configuration file
//! - [`compat`]: the flat legacy view of a configuration

pub mod codec;
pub mod compat;
pub mod resolver;
pub mod store;

pub use soulconf_core_store::{path, Error, Path, PathError, Value};

pub use compat::{compat_data, CompatData, CompatGroup, CompatRule, ScalarKind, Shape, RULES};
pub use resolver::{FileResolver, Resolution, SearchPathResolver, CONFIG_FILE_NAME};
pub use store::{ConfigStore, APP_NAME};
