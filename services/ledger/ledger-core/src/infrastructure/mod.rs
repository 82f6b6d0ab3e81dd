pub mod memory;

#[cfg(feature = "persistence")]
pub mod persistence;
