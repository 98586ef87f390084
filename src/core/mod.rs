//! 进程级基础设施：优雅关闭

pub mod shutdown;

pub use shutdown::ShutdownManager;
