// Crate root for the CLASSIFICA race overlay server modules.

pub mod app;
pub mod config;
pub mod constants;
pub mod http;
pub mod store;
pub mod tasks;
pub mod udp;
pub mod utils;
pub mod ws;
