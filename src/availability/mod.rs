pub mod error;
pub mod projection;
pub mod snapshot;
pub mod store;
