//! Token-level scanning helpers for `.frc` rows.
//!
//! MSI assets prepend bookkeeping columns (`ver ref`) to data rows, so column
//! positions are unreliable. Rows are instead anchored on the last adjacent
//! run of float-like tokens, with the type names read immediately before it.

/// True if the token parses as a finite or non-finite `f64`.
pub(crate) fn is_float_like(tok: &str) -> bool {
    tok.parse::<f64>().is_ok()
}

/// Start index of the last run of `len` adjacent float-like tokens, scanning
/// from the end of the row.
pub(crate) fn last_float_run(toks: &[&str], len: usize) -> Option<usize> {
    if len == 0 || toks.len() < len {
        return None;
    }
    (0..=toks.len() - len)
        .rev()
        .find(|&i| toks[i..i + len].iter().all(|t| is_float_like(t)))
}

/// Drops an inline `;` comment and trailing whitespace.
pub(crate) fn strip_inline_comment(line: &str) -> &str {
    match line.split_once(';') {
        Some((head, _)) => head.trim_end(),
        None => line.trim_end(),
    }
}

/// Blank lines and `!`, `;`, `>`, `#` prose lines are skipped inside
/// recognized sections. MSI assets use all four freely.
pub(crate) fn is_ignorable(line: &str) -> bool {
    let s = line.trim();
    s.is_empty()
        || s.starts_with('!')
        || s.starts_with(';')
        || s.starts_with('#')
        || s.starts_with('>')
}

/// Joins trailing tokens after index `from` into an optional source string.
pub(crate) fn trailing_source(toks: &[&str], from: usize) -> Option<String> {
    if from >= toks.len() {
        return None;
    }
    let tail = toks[from..].join(" ");
    if tail.is_empty() {
        None
    } else {
        Some(tail)
    }
}
