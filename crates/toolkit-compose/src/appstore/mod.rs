//! 1Panel AppStore target schema

mod model;
mod render;

pub use model::{
    AppDefinition, AppProperties, AppStorePackage, CONTAINER_NAME_KEY, CREATED_BY_LABEL,
    CREATED_BY_VALUE, FieldType, FormField, FormFields, PANEL_NETWORK, PackageFile,
    VersionDefinition,
};
pub use render::{FILE_SEPARATOR, render_package_text, render_readme};
