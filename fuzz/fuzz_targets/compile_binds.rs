//! Fuzz target for placeholder compilation.
//!
//! Run with:
//! ```bash
//! cargo +nightly fuzz run fuzz_compile_binds
//! ```

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tabula_core::{BindValue, Bindings, PlaceholderCompiler, SqlQuoter};

#[derive(Debug, Arbitrary)]
enum FuzzBind {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    List(Vec<i64>),
}

impl From<FuzzBind> for BindValue {
    fn from(bind: FuzzBind) -> Self {
        match bind {
            FuzzBind::Null => BindValue::Null,
            FuzzBind::Bool(b) => BindValue::Bool(b),
            FuzzBind::Int(i) => BindValue::Int(i),
            FuzzBind::Float(f) => BindValue::Float(f),
            FuzzBind::Text(s) => BindValue::Text(s),
            FuzzBind::List(items) => BindValue::from(items),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    sql: String,
    binds: Vec<FuzzBind>,
    quote_char: char,
}

fuzz_target!(|input: Input| {
    let binds: Bindings = input.binds.into_iter().map(BindValue::from).collect();
    let quoter = SqlQuoter::new(input.quote_char);
    // Compilation may reject the input, but must never panic
    let _ = PlaceholderCompiler::compile(&input.sql, &binds, &quoter);
});
