use super::types::{CmpOp, ParsedFilter, Term};

const GROUP_SEP: char = '|';
const TERM_SEP: char = ';';

/// Split a filter string into OR-groups of AND-terms.
///
/// Never fails: terms without an operator or with a malformed field path are
/// collected in [`ParsedFilter::rejected`] and otherwise ignored. Groups left
/// with no terms are omitted.
#[must_use]
pub fn parse_filter(input: &str) -> ParsedFilter {
    let mut out = ParsedFilter::default();
    for group_src in input.split(GROUP_SEP) {
        let mut group = Vec::new();
        for raw in group_src.split(TERM_SEP) {
            if raw.trim().is_empty() {
                continue;
            }
            match parse_term(raw) {
                Some(term) => group.push(term),
                None => out.rejected.push(raw.trim().to_string()),
            }
        }
        if !group.is_empty() {
            out.groups.push(group);
        }
    }
    out
}

/// Parse one `fieldPath operator value` term.
///
/// The earliest operator occurrence wins; at the same position the longer
/// token wins. The value is everything after the operator, trimmed.
#[must_use]
pub fn parse_term(raw: &str) -> Option<Term> {
    let (pos, token, op) = find_operator(raw)?;
    let path = raw[..pos].trim();
    if !is_valid_path(path) {
        return None;
    }
    let value = raw[pos + token.len()..].trim();
    Some(Term { path: path.to_string(), op, value: value.to_string() })
}

fn find_operator(raw: &str) -> Option<(usize, &'static str, CmpOp)> {
    let mut best: Option<(usize, &'static str, CmpOp)> = None;
    for (token, op) in CmpOp::TOKENS {
        if let Some(pos) = raw.find(token) {
            let better = match best {
                None => true,
                Some((bpos, btok, _)) => pos < bpos || (pos == bpos && token.len() > btok.len()),
            };
            if better {
                best = Some((pos, token, op));
            }
        }
    }
    best
}

fn is_valid_path(path: &str) -> bool {
    !path.is_empty() && path.split('.').all(|seg| is_identifier(seg.trim()))
}

fn is_identifier(seg: &str) -> bool {
    let mut chars = seg.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}
