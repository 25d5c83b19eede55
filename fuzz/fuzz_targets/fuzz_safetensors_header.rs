#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::Write;

fuzz_target!(|data: &[u8]| {
    // Fuzz SafeTensors checkpoint reading with arbitrary bytes
    // Targets: header validation, metadata parsing, tensor extraction
    if data.is_empty() {
        return;
    }

    let dir = std::env::temp_dir();
    let path = dir.join("fuzz_safetensors_header.safetensors");
    if let Ok(mut f) = std::fs::File::create(&path) {
        let _ = f.write_all(data);
        let _ = f.flush();

        // Corrupt input must return an error, never panic
        let _ = cotejar::serialization::load_safetensors(&path);
    }
    let _ = std::fs::remove_file(&path);
});
