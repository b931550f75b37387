//! Docker Compose to 1Panel AppStore conversion.
//!
//! This crate translates a Docker Compose document into a 1Panel AppStore
//! application package: the app `data.yml`, the version install form and
//! the rewritten compose file.
//!
//! # Architecture
//!
//! 1. **Source schema** ([`compose`]) - a typed view of the compose
//!    document, parsed with `serde_yaml`. Parsing accepts any well-formed
//!    compose file.
//!
//! 2. **Mapping** ([`convert`]) - applies the per-attribute mapping rules,
//!    collecting install parameters and warnings, or rejecting constructs
//!    1Panel cannot deploy.
//!
//! 3. **Target schema** ([`appstore`]) - the package model and its
//!    deterministic rendering.
//!
//! Conversion is pure: the same input always produces byte-identical
//! output, and failures are returned as values.
//!
//! # Example
//!
//! ```
//! use toolkit_compose::{ConvertOptions, convert_str};
//!
//! let source = "services:\n  web:\n    image: nginx:latest\n    ports:\n      - \"80:80\"\n";
//! let conversion = convert_str(source, &ConvertOptions::default()).unwrap();
//! assert_eq!(conversion.package.key(), "web");
//! assert!(conversion.package.form_field("PANEL_APP_PORT_HTTP").is_some());
//! ```

pub mod appstore;
pub mod compose;
pub mod convert;
pub mod error;
pub mod options;
pub mod path;
pub mod reverse;
pub mod vars;

pub use appstore::{AppStorePackage, FormField, PackageFile};
pub use compose::{ComposeFile, Service, parse_compose};
pub use convert::{
    ComposeToAppStore, Conversion, ConversionRequest, ConversionResult, Converter, convert,
    convert_str,
};
pub use error::{ConversionWarning, ConvertError, Result};
pub use options::{AppMetadata, ConvertOptions};
pub use reverse::{restore_compose, restore_compose_text};
