//! Canonical serialization: [`jtk_value::Value`] → UTF-8 bytes.
//!
//! A direct recursive-descent writer, not a line-width-reflowing doc-algebra
//! printer: output shape depends only on [`Options`] and the tree shape,
//! never on how wide a line "looks", so the same tree always serializes to
//! the same bytes.

use jtk_value::Value;

/// Controls pretty-printing, indentation, key ordering, and ASCII escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Options {
    pub pretty: bool,
    pub indent_size: usize,
    /// `jtk_value::Value::Object` is backed by a `BTreeMap`, so keys already
    /// iterate in ascending order regardless of this flag; it is kept on the
    /// public surface so callers that migrate to an order-preserving map
    /// later don't have to change their call sites.
    pub sort_keys: bool,
    pub escape_non_ascii: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self::compact()
    }
}

impl Options {
    #[must_use]
    pub fn compact() -> Self {
        Self {
            pretty: false,
            indent_size: 2,
            sort_keys: false,
            escape_non_ascii: false,
        }
    }

    #[must_use]
    pub fn pretty() -> Self {
        Self {
            pretty: true,
            ..Self::compact()
        }
    }
}

/// Serialize `value` to a `String` according to `options`.
#[must_use]
pub fn serialize(value: &Value, options: &Options) -> String {
    let mut out = String::new();
    write_value(value, options, 0, &mut out);
    out
}

/// Serialize `value` directly into an existing buffer, appending to it.
pub fn write_to(value: &Value, options: &Options, out: &mut String) {
    write_value(value, options, 0, out);
}

fn indent(options: &Options, depth: usize, out: &mut String) {
    if options.pretty {
        out.extend(std::iter::repeat(' ').take(depth * options.indent_size));
    }
}

fn newline(options: &Options, out: &mut String) {
    if options.pretty {
        out.push('\n');
    }
}

fn write_value(value: &Value, options: &Options, depth: usize, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(n) => out.push_str(&format_number(*n)),
        Value::String(s) => write_string(s, options, out),
        Value::Array(items) => write_array(items, options, depth, out),
        Value::Object(entries) => write_object(entries, options, depth, out),
    }
}

fn write_array(items: &[Value], options: &Options, depth: usize, out: &mut String) {
    if items.is_empty() {
        out.push_str("[]");
        return;
    }

    out.push('[');
    newline(options, out);

    let last = items.len() - 1;
    for (i, item) in items.iter().enumerate() {
        indent(options, depth + 1, out);
        write_value(item, options, depth + 1, out);
        if i != last {
            out.push(',');
        }
        newline(options, out);
    }

    indent(options, depth, out);
    out.push(']');
}

fn write_object(
    entries: &std::collections::BTreeMap<String, Value>,
    options: &Options,
    depth: usize,
    out: &mut String,
) {
    if entries.is_empty() {
        out.push_str("{}");
        return;
    }

    out.push('{');
    newline(options, out);

    let last = entries.len() - 1;
    for (i, (key, value)) in entries.iter().enumerate() {
        indent(options, depth + 1, out);
        write_string(key, options, out);
        out.push(':');
        if options.pretty {
            out.push(' ');
        }
        write_value(value, options, depth + 1, out);
        if i != last {
            out.push(',');
        }
        newline(options, out);
    }

    indent(options, depth, out);
    out.push('}');
}

fn write_string(s: &str, options: &Options, out: &mut String) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\u{c}' => out.push_str("\\f"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => {
                out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c if options.escape_non_ascii && (c as u32) > 0x7F => {
                write_unicode_escape(c, out);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_unicode_escape(ch: char, out: &mut String) {
    let cp = ch as u32;
    if cp > 0xFFFF {
        let adjusted = cp - 0x10000;
        let high = 0xD800 + (adjusted >> 10);
        let low = 0xDC00 + (adjusted & 0x3FF);
        out.push_str(&format!("\\u{high:04x}\\u{low:04x}"));
    } else {
        out.push_str(&format!("\\u{cp:04x}"));
    }
}

const SAFE_INTEGER_MAGNITUDE: f64 = 9_007_199_254_740_992.0; // 2^53

/// Emit an integer with no fractional part when `n` round-trips exactly
/// through `i64` within the safe-integer range; otherwise emit Rust's
/// shortest round-tripping decimal form (equivalent to, and more compact
/// than, a fixed 17-significant-digit rendering).
fn format_number(n: f64) -> String {
    if n == n.trunc() && n.abs() <= SAFE_INTEGER_MAGNITUDE && n.is_finite() {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn obj(pairs: &[(&str, Value)]) -> Value {
        Value::Object(pairs.iter().map(|(k, v)| ((*k).to_string(), v.clone())).collect())
    }

    #[test]
    fn compact_object_has_no_whitespace() {
        let v = obj(&[("a", Value::Number(1.0)), ("b", Value::Bool(true))]);
        assert_eq!(serialize(&v, &Options::compact()), r#"{"a":1,"b":true}"#);
    }

    #[test]
    fn pretty_object_indents_and_spaces_colon() {
        let v = obj(&[("a", Value::Number(1.0))]);
        assert_eq!(serialize(&v, &Options::pretty()), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn empty_containers_stay_on_one_line_when_pretty() {
        assert_eq!(serialize(&Value::Array(vec![]), &Options::pretty()), "[]");
        assert_eq!(serialize(&obj(&[]), &Options::pretty()), "{}");
    }

    #[test]
    fn object_keys_are_always_ascending_by_construction() {
        let v = obj(&[("z", Value::Null), ("a", Value::Null)]);
        assert_eq!(serialize(&v, &Options::compact()), r#"{"a":null,"z":null}"#);
    }

    #[test]
    fn integers_in_safe_range_have_no_decimal_point() {
        assert_eq!(format_number(42.0), "42");
        assert_eq!(format_number(-7.0), "-7");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn fractional_numbers_round_trip() {
        let rendered = format_number(3.14159);
        let reparsed: f64 = rendered.parse().unwrap();
        assert_eq!(reparsed, 3.14159);
    }

    #[test]
    fn string_escaping_covers_control_and_quote_characters() {
        let v = Value::String("a\"b\\c\nd".to_string());
        assert_eq!(serialize(&v, &Options::compact()), r#""a\"b\\c\nd""#);
    }

    #[test]
    fn escape_non_ascii_emits_uxxxx_with_surrogate_pairing() {
        let v = Value::String("😀".to_string());
        let mut options = Options::compact();
        options.escape_non_ascii = true;
        assert_eq!(serialize(&v, &options), "\"\\ud83d\\ude00\"");
    }

    #[test]
    fn non_ascii_passes_through_by_default() {
        let v = Value::String("héllo".to_string());
        assert_eq!(serialize(&v, &Options::compact()), "\"héllo\"");
    }

    #[test]
    fn nested_array_of_objects_pretty_prints() {
        let v = Value::Array(vec![obj(&[("x", Value::Number(1.0))])]);
        let expected = "[\n  {\n    \"x\": 1\n  }\n]";
        assert_eq!(serialize(&v, &Options::pretty()), expected);
    }

    #[test]
    fn pretty_output_of_a_mixed_document_matches_snapshot() {
        let v = obj(&[
            ("name", Value::String("widget".to_string())),
            ("count", Value::Number(3.0)),
            ("tags", Value::Array(vec![Value::String("a".to_string()), Value::String("b".to_string())])),
            ("meta", obj(&[("active", Value::Bool(true)), ("note", Value::Null)])),
        ]);
        insta::assert_snapshot!(serialize(&v, &Options::pretty()));
    }
}
