pub mod hubspot;

pub use hubspot::HubSpotService;
