mod aggregate;
mod app;
mod config;
mod dispatch;
mod list;
mod registry;
mod validation;

#[cfg(test)]
mod test_support;

pub use aggregate::AggregateError;
pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use dispatch::{DispatchError, TransportError};
pub use list::ErrorList;
pub use registry::RegistryError;
pub use validation::ValidationError;
