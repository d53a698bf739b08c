mod manager;
mod owner;

pub use manager::{WatchControl, WatchManager};
pub use owner::{Domain, Invalidation};
