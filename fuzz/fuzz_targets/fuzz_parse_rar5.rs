#![no_main]
use libfuzzer_sys::fuzz_target;
use rar_ads::parsing::rar5::Rar5BlockParser;

fuzz_target!(|data: &[u8]| {
    // Header CRCs reject nearly everything, so also try the raw header length path
    let _ = Rar5BlockParser::header_len(data, 0);
    let _ = Rar5BlockParser::parse(data, 0);
});
