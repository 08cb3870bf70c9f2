#![forbid(unsafe_code)]
#![deny(unused_must_use)]

pub mod cli;
pub mod host;
pub mod logging;
pub mod report;

pub use cli::{run, Cli, Format};
