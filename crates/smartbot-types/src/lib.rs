pub mod config;
pub mod error;
pub mod event;
pub mod route;
pub mod session;


pub use error::SmartBotError;
pub type Result<T> = std::result::Result<T, SmartBotError>;
