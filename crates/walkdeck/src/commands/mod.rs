pub mod completion;
pub mod config;
pub mod pace;
pub mod present;
pub mod watch;
