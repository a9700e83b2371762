pub mod browse;
pub mod browser;
pub mod config;
pub mod credentials;
pub mod git;
pub mod output;
