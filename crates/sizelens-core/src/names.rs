//! Identifier normalization and the debug-name to module-name matcher.
//!
//! Module text writes identifiers as `$name`, with bytes outside the
//! identifier alphabet escaped as `\XX`. Debug info carries plain source
//! names. Neither side is guaranteed to agree exactly (mangling, inlining,
//! merged duplicates), so matching is deliberately loose: one normalized name
//! containing the other is enough, and the first module function that
//! qualifies wins.

use crate::types::ModuleFunctionEntry;

fn hex_value(byte: u8) -> Option<u8>
{
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}

/// Replace every `\XX` hex escape with the byte it encodes.
///
/// Decoded bytes are reassembled as UTF-8; invalid sequences become U+FFFD.
///
/// ```rust
/// use sizelens_core::names::decode_escapes;
///
/// assert_eq!(decode_escapes(r"std::vector\3cint\3e"), "std::vector<int>");
/// assert_eq!(decode_escapes(r"caf\c3\a9"), "café");
/// ```
#[must_use]
pub fn decode_escapes(value: &str) -> String
{
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut index = 0;
    while index < bytes.len() {
        if bytes[index] == b'\\' && index + 2 < bytes.len() {
            if let (Some(high), Some(low)) = (hex_value(bytes[index + 1]), hex_value(bytes[index + 2])) {
                decoded.push((high << 4) | low);
                index += 3;
                continue;
            }
        }
        decoded.push(bytes[index]);
        index += 1;
    }
    String::from_utf8_lossy(&decoded).into_owned()
}

/// Decode escapes, then strip one leading `$` sigil.
#[must_use]
pub fn normalize_name(value: &str) -> String
{
    let decoded = decode_escapes(value);
    match decoded.strip_prefix('$') {
        Some(stripped) => stripped.to_string(),
        None => decoded,
    }
}

/// Symmetric containment on already-normalized names; empty never matches.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool
{
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.contains(b) || b.contains(a)
}

/// First module function whose normalized name matches `debug_name`.
#[must_use]
pub fn find_module_function<'a>(debug_name: &str, functions: &'a [ModuleFunctionEntry]) -> Option<&'a ModuleFunctionEntry>
{
    let target = normalize_name(debug_name.trim());
    if target.is_empty() {
        return None;
    }
    functions
        .iter()
        .find(|function| names_match(&target, &function.normalized_name))
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn entry(raw: &str) -> ModuleFunctionEntry
    {
        ModuleFunctionEntry {
            raw_name: raw.to_string(),
            normalized_name: normalize_name(raw),
            snippet_lines: vec![format!("(func {raw}")],
        }
    }

    #[test]
    fn test_decode_leaves_non_escapes_alone()
    {
        assert_eq!(decode_escapes(r"a\zzb"), r"a\zzb");
        assert_eq!(decode_escapes(r"trailing\4"), r"trailing\4");
        assert_eq!(decode_escapes(r"\5c41"), r"\41");
    }

    #[test]
    fn test_normalize_strips_single_sigil()
    {
        assert_eq!(normalize_name("$foo"), "foo");
        assert_eq!(normalize_name("$$foo"), "$foo");
        assert_eq!(normalize_name(r"\24foo"), "foo");
        assert_eq!(normalize_name("foo"), "foo");
    }

    #[test]
    fn test_names_match_is_symmetric()
    {
        assert!(names_match("render", "render_frame"));
        assert!(names_match("render_frame", "render"));
        assert!(!names_match("render", "update"));
        assert!(!names_match("", "render"));
        assert!(!names_match("render", ""));
    }

    #[test]
    fn test_find_prefers_first_match_over_best_match()
    {
        let functions = vec![entry("$Engine::tick_all"), entry("$Engine::tick")];
        let found = find_module_function("Engine::tick", &functions).unwrap();
        assert_eq!(found.raw_name, "$Engine::tick_all");
    }

    #[test]
    fn test_find_ignores_blank_names()
    {
        let functions = vec![entry("$main")];
        assert!(find_module_function("   ", &functions).is_none());
        assert!(find_module_function("$", &functions).is_none());
    }
}
