//! lconf - hierarchical configuration from relaxed JSON
//!
//! This crate loads human-editable configuration with support for:
//! - Relaxed JSON documents (comments, trailing commas, unquoted keys)
//! - Dot-separated and array-indexed key paths (`http.ports[0]`)
//! - File inclusion through the `#include#` key
//! - Typed accessors that fall back to a default
//! - Pluggable document stores in place of the filesystem
//! - Polling hot reload
//!
//! A typical document:
//!
//! ```text
//! {
//!     // http settings
//!     http: {
//!         addr: "www.example.com",
//!         ports: [80, 8080],
//!     },
//!     "#include#": "others.conf",
//! }
//! ```

pub mod conf;
pub mod error;
pub mod loader;
pub mod state;
pub mod util;
pub mod value;
pub mod watcher;

pub use conf::Conf;
pub use error::{ConfError, Result};
pub use loader::{load, load_file, parse_str, LoadOptions, INCLUDE_KEY};
pub use state::SharedConf;
pub use value::{Map, Value};
pub use watcher::ConfWatcher;
