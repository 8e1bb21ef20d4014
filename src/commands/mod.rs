#![allow(clippy::needless_pass_by_value)]

pub mod appointment;
pub mod auth;
pub mod comment;
pub mod init;
pub mod module;
pub mod post;
pub mod user;
