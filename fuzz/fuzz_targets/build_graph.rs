#![no_main]

use libfuzzer_sys::fuzz_target;
use satrank_core::Snapshot;
use satrank_engine::ChannelGraph;

// Any snapshot that parses must either build a graph or return a
// MalformedSnapshot error; never panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(snapshot) = Snapshot::from_json(data) {
        let _ = ChannelGraph::build(&snapshot);
    }
});
