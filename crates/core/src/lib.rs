pub mod config;
pub mod controller;
pub mod error;
pub mod gateway;
pub mod model;
pub mod store;

pub use config::GatewayConfig;
pub use controller::{CatalogSnapshot, PlaybackController};
pub use error::{CatalogError, Result};
pub use gateway::{BackendGateway, HttpGateway};
pub use model::{RenderTarget, StreamEntry};
pub use store::{CatalogStore, SelectionState};
