mod loader;

pub use loader::{Config, TimeoutConfig};
