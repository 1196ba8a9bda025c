// Storage models
pub mod session;
