//! Core configuration tree types.
//!
//! - `Path`: ordered, non-empty sequence of object keys
//! - `Value`: the dynamically-tagged configuration tree
//! - `Error`: errors shared by the store crates
//! - [`json`]: conversions to and from `serde_json::Value`
//!
//! # Example
//!
//! ```rust
//! use soulconf_core_store::{path, Value};
//!
//! let mut tree = Value::map();
//! tree.set(&path!("downloads", "maxspeed"), Value::from(42i64));
//! assert_eq!(tree.get(&path!("downloads", "maxspeed")).map(Value::as_int), Some(42));
//! ```

mod error;
pub mod json;
mod path;
mod value;

pub use error::Error;
pub use path::{Path, PathError};
pub use value::Value;
