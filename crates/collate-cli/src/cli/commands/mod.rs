pub mod build;
pub mod check;
pub mod dispatch;
pub mod init;

pub use dispatch::dispatch;
