// Parley - scripted multi-party negotiation engine
// Library exports

pub mod agent;
pub mod config;
pub mod context;
pub mod deal;
pub mod driver;
pub mod errors;
pub mod game;
pub mod logging;
pub mod markup;
pub mod providers;
pub mod scheduling;
pub mod session;

pub use errors::NegotiationError;
