//! Library half of the `nestfest-qv` binary: configuration, file IO and the
//! replay driver, kept here so they can be tested without spawning a process.

pub mod config;
pub mod error;
pub mod input;
pub mod replay;
pub mod response;

pub use config::CliConfig;
pub use error::CliError;
pub use replay::{replay, ReplayFile, ReplayReport};
pub use response::VoteResponse;
