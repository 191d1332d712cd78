pub mod config;
pub mod runner;
pub mod sas;
pub mod search;
pub mod stat;
pub mod yaml;
