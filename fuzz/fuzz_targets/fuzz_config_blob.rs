//! Fuzz target: stored configuration blob
//!
//! Writes arbitrary bytes where the postcard config blob lives and checks:
//! - `load` never panics
//! - anything `load` accepts passes `config::validate`
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use libfuzzer_sys::fuzz_target;
use weathermon::adapters::nvs::NvsConfigStore;
use weathermon::app::ports::ConfigPort;
use weathermon::config;

fuzz_target!(|data: &[u8]| {
    let Ok(store) = NvsConfigStore::new() else {
        return;
    };
    store.put_raw(data.to_vec());
    if let Ok(cfg) = store.load() {
        assert!(config::validate(&cfg).is_ok());
    }
});
