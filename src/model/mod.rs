pub mod keys;
pub mod package;
pub mod requirements;
pub mod resolved;
pub mod tables;
pub mod types;
