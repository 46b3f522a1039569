#![no_main]

use effectprobe_core::config::Config;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if let Ok(config) = Config::from_toml(text) {
        assert!(config.validate().is_ok());
        let options = config.plan_options();
        assert_eq!(options.strategy, config.plan.strategy);
        assert_eq!(options.covering.seed, config.covering.seed);
    }
});
