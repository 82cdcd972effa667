//! Building blocks shared by services

/// Watchable values
pub mod property;

pub use property::Property;
