//! Command implementations for vfs-cli

pub mod check;
pub mod init_index;
pub mod render;
pub mod repair;

pub use check::run_check;
pub use init_index::run_init_index;
pub use repair::run_repair;

/// Process exit status for a completed command
pub const EXIT_OK: i32 = 0;
/// A fatal error stopped the command
pub const EXIT_FAILURE: i32 = 1;
/// `check` found discrepancies
pub const EXIT_UNHEALTHY: i32 = 2;
