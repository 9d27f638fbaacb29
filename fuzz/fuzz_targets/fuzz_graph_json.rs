#![no_main]
use conan_sbom::{graph_to_bom, ConanGraph, ConvertOptions};
use libfuzzer_sys::fuzz_target;

const MAX_WRAPPED_INPUT_LEN: usize = 10_000;

/// Fuzz graph JSON decoding and the conversion that follows it.
///
/// Also wraps the input as a single node so fuzzing reaches node-level
/// fields (licenses, remotes, dependency maps) rather than stopping at the
/// envelope.
fuzz_target!(|data: &[u8]| {
    if let Ok(s) = std::str::from_utf8(data) {
        if let Ok(graph) = ConanGraph::from_json_str(s) {
            let _ = graph_to_bom(&graph, &ConvertOptions::reproducible());
        }

        if s.len() < MAX_WRAPPED_INPUT_LEN {
            let wrapped = format!(r#"{{"graph":{{"nodes":{{"0":{s}}},"root":{{"0":"cli"}}}}}}"#);
            if let Ok(graph) = ConanGraph::from_json_str(&wrapped) {
                let _ = graph_to_bom(&graph, &ConvertOptions::reproducible());
            }
        }
    }
});
