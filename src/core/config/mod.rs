pub mod data;
pub mod detect;
pub mod io;

pub use data::{path_display, Config, ProviderConfig};
pub use detect::detect_providers;
pub use io::ConfigError;
