#![no_main]
use libfuzzer_sys::fuzz_target;
use rar_ads::ads::rewrite_stream;
use rar_ads::analyze_media;

fuzz_target!(|data: &[u8]| {
    // Full archive: locate streams, then rewrite into memory
    if let Ok(streams) = analyze_media(data) {
        let mut output = Vec::new();
        let _ = rewrite_stream(&streams, &mut &data[..], &mut output);
    }
});
