//! Request counting per client IP over a directory of access logs, run as
//! a map phase and a reduce phase of separate worker processes that talk
//! only through artifact files.

pub mod codec;
pub mod common;
pub mod config;
pub mod error;
pub mod logging;
pub mod map_reduce_apps;
pub mod map_reduce_seq;
pub mod mapper;
pub mod mr_process;
pub mod parser;
pub mod partition;
pub mod reducer;
pub mod table;

pub use error::{Error, Result};
pub use table::{Bucket, Table};
