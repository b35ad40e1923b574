pub mod config;
pub mod logging;

pub mod archive_set;
pub mod checksum;
pub mod control;
pub mod progress;
pub mod remote;
pub mod session;
pub mod sfv;
pub mod storage;
pub mod tree;
