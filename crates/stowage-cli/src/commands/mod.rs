pub mod config;
pub mod init;
pub mod list;
pub mod storages;
pub mod store;
