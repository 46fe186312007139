//! Extract translatable strings from HTML templates and JavaScript sources
//! into per-file gettext catalogs.
//!
//! ```no_run
//! use gettext_extract::{Config, Event, Extractor, SourceFile};
//!
//! let extractor = Extractor::new(&Config::default())?;
//! for event in extractor.transform(SourceFile::new("index.html", "<p translate>Hi</p>")) {
//!     match event {
//!         Event::File(file) => println!("{}", file.text().unwrap_or_default()),
//!         Event::Error(err) => eprintln!("{}", err),
//!     }
//! }
//! # Ok::<(), gettext_extract::ExtractError>(())
//! ```

pub mod catalog;
pub mod commands;
pub mod config;
pub mod delimiter;
pub mod error;
pub mod extractor;
pub mod fs;
pub mod html;
pub mod js;
pub mod logging;
pub mod registry;

pub use crate::catalog::{Catalog, Collation};
pub use crate::config::Config;
pub use crate::error::{ExtractError, PluginError, PLUGIN_NAME};
pub use crate::extractor::{Contents, Event, Extractor, FilePass, SourceFile, Strategy};
pub use crate::registry::{CatalogEntry, Occurrence, Registry};
