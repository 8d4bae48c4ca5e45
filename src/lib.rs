pub mod agent;
pub mod catalog;
pub mod config;
pub mod editor;
pub mod errors;
pub mod init;
pub mod intake;
pub mod normalize;
pub mod package;
pub mod rule47_config;
pub mod session;
pub mod storage;
pub mod ui;
