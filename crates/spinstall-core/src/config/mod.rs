//! Configuration: the spinstall.toml schema, its loader, and the resolved
//! options every component is built from.

pub mod options;
pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use options::InstallOptions;
pub use parser::{parse_install_toml, parse_install_toml_str, to_toml};
pub use paths::InstallPaths;
pub use schema::{BundleEntry, InstallConfig, PackageManagerConfig};
pub use store::ConfigStore;
