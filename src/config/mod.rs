pub mod settings;

pub use settings::{CacheBackend, CacheSettings, HubSpotSettings, ServerSettings, Settings};
