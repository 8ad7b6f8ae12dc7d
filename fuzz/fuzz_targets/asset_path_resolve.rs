#![no_main]

use std::path::{Component, Path};

use libfuzzer_sys::fuzz_target;
use sfx_core::resolve_asset_path;

fuzz_target!(|data: &[u8]| {
    let requested = String::from_utf8_lossy(data);
    let root = Path::new("audio");
    if let Ok(resolved) = resolve_asset_path(root, &requested) {
        let relative = resolved
            .strip_prefix(root)
            .expect("resolved path stays under the asset root");
        assert!(relative
            .components()
            .all(|component| matches!(component, Component::Normal(_))));
    }
});
