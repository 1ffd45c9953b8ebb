//! Fuzz target for configuration normalization.
//!
//! Feeds arbitrary JSON objects through normalization and descriptor construction.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_config_normalize
//! ```

#![no_main]

use libfuzzer_sys::fuzz_target;
use tabula_core::{ConfigNormalizer, ConnectionDescriptor, DriverResolver, RawConfig};

fuzz_target!(|data: &[u8]| {
    let Ok(input) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(raw) = RawConfig::from_json_str(input) else {
        return;
    };

    let resolver = DriverResolver::default();
    let normalizer = ConfigNormalizer::new(resolver.clone());
    let once = normalizer.normalize(&raw);

    if let Ok(descriptor) = ConnectionDescriptor::from_params(&once, &resolver) {
        let _ = descriptor.to_config();
    }
});
