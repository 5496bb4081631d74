//! CLI Exit Code Registry
//!
//! Single source of truth for all `dwatch` exit codes. Exit codes are part
//! of the shell contract — wrapper scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range | Domain    | Description                                  |
//! |-------|-----------|----------------------------------------------|
//! | 0     | Universal | Success                                      |
//! | 1     | Universal | General error (unspecified)                  |
//! | 2     | Universal | CLI usage error (bad args)                   |
//! | 3-9   | files     | Input/config/output file problems            |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Query or data input file missing or unreadable.
pub const EXIT_INPUT: u8 = 3;

/// Harness config file missing or malformed.
pub const EXIT_CONFIG: u8 = 4;

/// Output file cannot be created or written.
pub const EXIT_OUTPUT: u8 = 5;
