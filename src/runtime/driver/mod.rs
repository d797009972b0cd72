//! Hosts for the runtime: an interactive terminal and a line-oriented TCP
//! socket for automation.

pub mod cli;
pub mod socket;
