//! Small terminal widget for keeping track of how much water you drank today, with an optional
//! daemon that reminds you to drink at a fixed interval.
//! Everything is stored locally in the application directory, there is no server involved.
//!

pub mod cli;
pub mod daemon;
pub mod fs;
pub mod intake;
pub mod reminder;
pub mod storage;
pub mod utils;
