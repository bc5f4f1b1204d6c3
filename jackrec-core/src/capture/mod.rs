pub mod client;
pub mod handler;
pub mod status;

#[cfg(test)]
pub(crate) mod loopback;
