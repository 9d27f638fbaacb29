//! Pipeline stages shared by the CLI command handlers.
//!
//! load graph → resolve remote URLs → convert → serialize → write

mod load;
mod output;

pub use load::{load_graph_with_context, resolve_remote_urls};
pub use output::{serialize_bom, write_output, OutputTarget};
