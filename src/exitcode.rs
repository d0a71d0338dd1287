//! Standard exit codes (BSD sysexits.h compatible)

/// Command line usage error
pub const USAGE: i32 = 64;

/// Data format error (duplicate or invalid ids, corrupt snapshot)
pub const DATAERR: i32 = 65;

/// Cannot open input (skill not found)
pub const NOINPUT: i32 = 66;

/// Input/output error
pub const IOERR: i32 = 74;

/// Permission denied (protected root)
pub const NOPERM: i32 = 77;

/// Configuration error
pub const CONFIG: i32 = 78;
