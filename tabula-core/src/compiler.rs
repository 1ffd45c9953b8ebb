//! Inline `?` placeholders into SQL text.
//!
//! Markers inside single-quoted literals are left alone:
//!
//! ```rust
//! use tabula_core::{Bindings, BindValue, PlaceholderCompiler, SqlQuoter};
//!
//! let sql = PlaceholderCompiler::compile(
//!     "SELECT * FROM t WHERE a = ? AND b = '?'",
//!     &Bindings::from(vec![5]),
//!     &SqlQuoter::default(),
//! )
//! .unwrap();
//! assert_eq!(sql, "SELECT * FROM t WHERE a = 5 AND b = '?'");
//! ```

use std::ops::Range;
use std::sync::LazyLock;

use regex_lite::Regex;

use crate::bind::{BindValue, Bindings};
use crate::connection::Quoter;
use crate::error::{TabulaError, TabulaResult};

static QUOTED_LITERAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("'[^']*'").expect("literal pattern is valid"));

/// Substitutes bound values for `?` markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderCompiler;

impl PlaceholderCompiler {
    /// Compile `sql` with `binds`, quoting values through `quoter`.
    ///
    /// Integers are inlined bare, lists become `(a,b,c)` of quoted elements and anything else
    /// goes through [`Quoter::quote`]. When the text has quoted literals, a marker count that
    /// differs from the bind count is an error. Without literals the text is returned
    /// unchanged instead.
    pub fn compile<Q: Quoter + ?Sized>(
        sql: &str,
        binds: &Bindings,
        quoter: &Q,
    ) -> TabulaResult<String> {
        if binds.is_empty() || !sql.contains('?') {
            return Ok(sql.to_string());
        }

        let literals: Vec<Range<usize>> =
            QUOTED_LITERAL.find_iter(sql).map(|m| m.range()).collect();
        let markers = Self::markers(sql, &literals);

        if markers.len() != binds.len() {
            if literals.is_empty() {
                crate::tabula_debug!(
                    markers = markers.len(),
                    binds = binds.len(),
                    "Marker count differs, leaving statement as is"
                );
                return Ok(sql.to_string());
            }
            return Err(TabulaError::bind_count_mismatch(
                binds.len(),
                markers.len(),
                sql,
            ));
        }

        let mut compiled = sql.to_string();
        for (&pos, value) in markers.iter().zip(binds).rev() {
            compiled.replace_range(pos..pos + 1, &Self::render(value, quoter));
        }
        Ok(compiled)
    }

    /// Byte offsets of `?` markers outside quoted literals.
    fn markers(sql: &str, literals: &[Range<usize>]) -> Vec<usize> {
        sql.match_indices('?')
            .map(|(pos, _)| pos)
            .filter(|pos| !literals.iter().any(|span| span.contains(pos)))
            .collect()
    }

    fn render<Q: Quoter + ?Sized>(value: &BindValue, quoter: &Q) -> String {
        match value {
            BindValue::Int(i) => i.to_string(),
            BindValue::List(items) => {
                let quoted: Vec<String> = items.iter().map(|item| quoter.quote(item)).collect();
                format!("({})", quoted.join(","))
            }
            other => quoter.quote(other),
        }
    }
}
