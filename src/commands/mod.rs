pub mod auth;
pub mod board;
pub mod init;
pub mod issues;
pub mod labels;
pub mod milestones;
pub mod repos;
