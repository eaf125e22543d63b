pub mod calc;
pub mod config;
pub mod init;
pub mod record;
pub mod recover;
pub mod serve;
pub mod stats;
