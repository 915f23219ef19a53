//! Spindle CLI library: the source scanner grammar, the stderr logger and
//! the command implementations behind the `spindle` binary.

pub mod commands;
pub mod logger;
pub mod scanner;
