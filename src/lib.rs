//! apimd: generate Markdown API reference pages from api-extractor
//! `*.api.json` doc models.
//!
//! The pipeline is: [`loader`] builds an [`ApiModel`], [`collision`] indexes
//! sibling name clashes once, [`item_path`] decides which file and anchor each
//! item lands in, and [`render`] walks the model writing one page per
//! file-level item. [`driver::generate`] ties these together.

pub mod collision;
pub mod config;
pub mod driver;
pub mod error;
pub mod item_path;
pub mod kinds;
pub mod loader;
pub mod markdown;
pub mod model;
pub mod plugin;
pub mod render;
pub mod tsdoc;

pub use config::{DocumenterConfig, FileLevelSetting, NewlineKind};
pub use driver::{generate, GenerationReport};
pub use error::{DocumenterError, Result};
pub use kinds::Granularity;
pub use model::{ApiItemKind, ApiModel, NodeId};
