pub mod archive;
pub mod config;
pub mod download;
pub mod error;
pub mod manifest;
pub mod process;
pub mod report;
pub mod resolve;
