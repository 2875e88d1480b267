//! What outlives a single run: the per-database ignore file, and the results
//! store that reads and rewrites it.
//!
//! - `ignores`: handle -> rule keys, one json file per database
//! - `results`: violations of one run with their acknowledge marks

pub mod ignores;
pub mod results;

pub use ignores::{IgnoreSet, IgnoreStore};
pub use results::{Group, GroupMark, Row, VerifyResults};
