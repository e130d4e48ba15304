//! `{variable}` substitution against the flat story state.

use fable_core::FlatState;

/// Passes before substitution gives up on self-referencing values.
pub const MAX_SUBSTITUTION_PASSES: usize = 16;

/// Replace `{path}` references with their values from `state`.
///
/// Innermost groups are resolved first and the text is rescanned until it
/// stops changing, so `{fruits.{roll}}` looks up `roll` before `fruits.<roll>`.
/// References that do not resolve are left in place.
pub fn substitute(text: &str, state: &FlatState) -> String {
    let mut current = text.to_string();
    for _ in 0..MAX_SUBSTITUTION_PASSES {
        let next = substitute_pass(&current, state);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn substitute_pass(text: &str, state: &FlatState) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(close) = rest.find('}') {
        match rest[..close].rfind('{') {
            Some(open) => {
                out.push_str(&rest[..open]);
                let key = &rest[open + 1..close];
                match state.get(key) {
                    Some(value) => out.push_str(&value.to_string()),
                    None => out.push_str(&rest[open..=close]),
                }
            }
            None => out.push_str(&rest[..=close]),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    out
}
