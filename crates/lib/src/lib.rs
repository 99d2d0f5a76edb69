//! Cue core library — config, session identity, chat history, dialog client,
//! and reply interpretation used by both the CLI and desktop applications.

pub mod agent;
pub mod config;
pub mod history;
pub mod init;
pub mod reply;
pub mod session;
