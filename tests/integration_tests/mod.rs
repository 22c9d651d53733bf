// Scenarios drive git and POSIX shells; Unix only for now
#![cfg(unix)]

pub mod copy;
pub mod remove;
pub mod switch;
