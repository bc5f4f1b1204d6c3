pub mod container;
pub mod encoder;
pub mod registry;
