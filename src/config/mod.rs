//! File-based configuration for the command-line tools.

pub mod heal;
