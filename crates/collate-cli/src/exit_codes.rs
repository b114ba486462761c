//! Unified exit codes for the collate CLI.
//! These codes are part of the public contract and keep scripts stable across releases.

pub const SUCCESS: i32 = 0;
pub const BUNDLE_FAILED: i32 = 1; // An input could not be read or a target could not be written
pub const CONFIG_ERROR: i32 = 2; // Job file missing/invalid, or bad argument combination
