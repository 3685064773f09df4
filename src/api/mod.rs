pub mod availability;
pub mod constraints;
pub mod export;
pub mod extract;
pub mod session;
