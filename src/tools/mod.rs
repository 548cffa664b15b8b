//! Trivo Tools module
//!
//! Tool implementations behind the MCP server. Each tool takes domain
//! values and returns a serializable response or a readable error string.

pub mod adjust;
pub mod data;
pub mod matching;
pub mod status;
