//! Fuzz target for table prefixing.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_prefix_tables
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabula_core::IdentifierRewriter;

#[derive(Debug, Arbitrary)]
struct Input {
    prefix: String,
    database: String,
    name: String,
    use_identifier: bool,
}

fuzz_target!(|input: Input| {
    let rewriter = IdentifierRewriter::new('`', input.prefix.trim(), input.database.as_str());
    let _ = rewriter.prefix_name(&input.name, input.use_identifier);
    let _ = rewriter.trim_name(&input.name);
});
