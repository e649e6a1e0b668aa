pub mod health;

pub use health::*;

// Handlers OAuth2 ficam em src/auth/handlers.rs
