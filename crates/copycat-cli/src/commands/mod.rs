pub mod analyze;
pub mod cluster;
pub mod evaluate;
pub mod extract;
pub mod init;
pub mod student;
pub mod validate;
