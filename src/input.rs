//! Line reader shared by the instance file formats.
//!
//! All formats follow the DIMACS conventions: a line consisting of `c` or starting with `c `
//! is a comment, empty lines are skipped and a line starting with `%` ends the data. Numbering of the returned lines is
//! 1-based so it can be used directly in parse errors.

use crate::error::{KataError, Result};
use std::io::BufRead;
use std::str::FromStr;

fn is_comment(line: &str) -> bool {
    line.strip_prefix('c')
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

/// Reads every data line of `reader` together with its 1-based line number.
///
/// # Errors
///
/// Returns `KataError::Io` if a line cannot be read.
pub(crate) fn data_lines<R: BufRead>(reader: R) -> Result<Vec<(usize, String)>> {
    let mut lines = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();

        if trimmed.starts_with('%') {
            break;
        }
        if !trimmed.is_empty() && !is_comment(trimmed) {
            lines.push((idx + 1, trimmed.to_string()));
        }
    }

    Ok(lines)
}

/// Parses exactly `N` whitespace-separated numbers from a data line.
pub(crate) fn numbers<T: FromStr, const N: usize>(line_no: usize, line: &str) -> Result<[T; N]> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != N {
        return Err(KataError::parse(
            line_no,
            format!("expected {N} values, found {}", parts.len()),
        ));
    }

    let mut values = Vec::with_capacity(N);
    for part in parts {
        let value = part
            .parse::<T>()
            .map_err(|_| KataError::parse(line_no, format!("'{part}' is not a number")))?;
        values.push(value);
    }

    values
        .try_into()
        .map_err(|_| KataError::parse(line_no, "wrong number of values"))
}
