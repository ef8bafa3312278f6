pub mod configuration;
pub mod constants;
pub mod dated;
pub mod notifier;
pub mod obslog;
pub mod rss_errors;
pub mod time;
pub mod wavelength;

pub use configuration::{list_configurations, ConfigurationKey, ConfigurationMap, RoleBuckets};
pub use rss_errors::RssError;
