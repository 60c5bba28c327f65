#![no_main]

use libfuzzer_sys::fuzz_target;
use satrank_core::Snapshot;

// Snapshot parsing must never panic on arbitrary bytes.
fuzz_target!(|data: &[u8]| {
    let _ = Snapshot::from_json(data);
});
