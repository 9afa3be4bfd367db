pub mod config;
pub mod logging;

pub mod bootstrap;
pub mod cache;
pub mod checksum;
pub mod home;
pub mod transport;
