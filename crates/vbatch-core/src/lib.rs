pub mod config;
pub mod logging;

pub mod compose;
pub mod control;
pub mod probe;
pub mod runner;
pub mod selector;
pub mod transcode;
