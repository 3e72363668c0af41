// kbnav-common: data model, parsers and wire types shared by the daemon and the CLI.

pub mod error;
pub mod format;
pub mod path;
pub mod protocol;
pub mod query;
pub mod resource;
pub mod section;
pub mod types;

pub use error::{ErrorClass, KbError};
pub use format::Format;
