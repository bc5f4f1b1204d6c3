pub mod controller;
pub mod shutdown;
