#![no_main]

use libfuzzer_sys::fuzz_target;
use mapui_placement::PlacementConfig;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    // Anything accepted must serialize and load again.
    for parsed in [
        PlacementConfig::from_toml_str(text),
        PlacementConfig::from_json_str(text),
    ] {
        let Ok(config) = parsed else {
            continue;
        };
        assert!(config.validate().is_empty(), "accepted an invalid config");
        let toml = config.to_toml_string().expect("serialize accepted config");
        PlacementConfig::from_toml_str(&toml).expect("reload serialized config");
    }
});
