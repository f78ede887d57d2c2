pub mod cloudfiles;
pub mod cycler;
pub mod local;
pub mod provider;
pub mod swift;
