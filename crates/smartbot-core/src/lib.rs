pub mod auth;
pub mod client;
pub mod event_bus;
pub mod manager;
pub mod ports;
pub mod services;
pub mod shell;
pub mod store;

#[cfg(test)]
mod tests;
