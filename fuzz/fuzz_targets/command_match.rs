#![no_main]

use libfuzzer_sys::fuzz_target;
use sfx_dispatch::{has_trigger_prefix, match_command, CommandSpec};

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    let table = vec![
        CommandSpec::new("horn", "!horn", "horn.wav", 30),
        CommandSpec::new("dup", "!dup", "one.wav", 10),
        CommandSpec::new("dup-shadow", "!dup", "two.wav", 10),
    ];
    if let Some(index) = match_command(&text, &table) {
        assert_eq!(table[index].trigger, text.trim());
        assert_ne!(index, 2);
        assert!(has_trigger_prefix(text.trim(), "!"));
    }
});
