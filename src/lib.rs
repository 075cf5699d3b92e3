pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod output;
pub mod progress;
pub mod scanner;
pub mod session;
