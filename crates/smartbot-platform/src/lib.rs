//! Browser adapters for the SmartBot client.

pub mod http;
pub mod navigator;
pub mod storage;

pub use http::GlooHttpClient;
pub use navigator::BrowserNavigator;
