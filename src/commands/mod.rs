pub mod comment;
pub mod create;
pub mod delete;
pub mod export;
pub mod init;
pub mod list;
pub mod search;
pub mod show;
pub mod update;
