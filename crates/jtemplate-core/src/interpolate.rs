/*
 * interpolate.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! `${...}` string interpolation.
//!
//! Markers are found left to right. Each `${` is closed by its matching `}`:
//! nested braces are counted and braces inside quoted string literals are
//! skipped, so `"${a} and ${b}"` holds two independent markers. A `${` with
//! no closing brace, or an empty `${}`, is ordinary text.

use std::borrow::Cow;
use std::ops::Range;

use jtemplate_expr::Map;

use crate::error::RenderResult;
use crate::evaluator::ExpressionEvaluator;

/// Replace every marker in `source` with its stringified value.
///
/// Returns the input unchanged (borrowed) when it contains no marker.
pub fn interpolate<'s, E>(
    source: &'s str,
    evaluator: &E,
    context: &Map,
) -> RenderResult<Cow<'s, str>>
where
    E: ExpressionEvaluator + ?Sized,
{
    let markers = find_markers(source);
    if markers.is_empty() {
        return Ok(Cow::Borrowed(source));
    }

    let mut output = String::with_capacity(source.len());
    let mut last = 0;
    for span in markers {
        output.push_str(&source[last..span.start]);
        let body = source[span.start + 2..span.end - 1].trim();
        let value = evaluator.evaluate(body, context)?;
        output.push_str(&value.to_string());
        last = span.end;
    }
    output.push_str(&source[last..]);

    Ok(Cow::Owned(output))
}

/// Byte spans of the markers in `source`, including `${` and `}`.
pub fn find_markers(source: &str) -> Vec<Range<usize>> {
    let bytes = source.as_bytes();
    let mut markers = Vec::new();
    let mut pos = 0;

    while let Some(found) = source[pos..].find("${") {
        let open = pos + found;
        let Some(close) = matching_brace(bytes, open + 2) else {
            // Unterminated: the rest of the string is literal text
            break;
        };
        if close > open + 2 {
            markers.push(open..close + 1);
        }
        pos = close + 1;
    }

    markers
}

/// Index of the `}` closing a marker whose body starts at `start`.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 1usize;
    let mut quote: Option<u8> = None;
    let mut i = start;

    while i < bytes.len() {
        let c = bytes[i];
        match quote {
            Some(_) if c == b'\\' => i += 1,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None => match c {
                b'\'' | b'"' => quote = Some(c),
                b'{' => depth += 1,
                b'}' => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(i);
                    }
                }
                _ => {}
            },
        }
        i += 1;
    }

    None
}
