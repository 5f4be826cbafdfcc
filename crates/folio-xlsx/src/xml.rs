//! XML text helpers shared by the reader and writer

use quick_xml::events::BytesStart;

/// Escape the five XML special characters
pub(crate) fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Encode characters XML 1.0 cannot carry as `_xHHHH_`.
///
/// Control characters other than tab and line feed are encoded, as is a
/// carriage return. An underscore that would otherwise start a literal
/// `_xHHHH_` sequence is itself encoded as `_x005F_`.
pub(crate) fn encode_excel_escapes(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '_' if looks_like_escape(&s[i..]) => result.push_str("_x005F_"),
            '\t' | '\n' => result.push(c),
            c if (c as u32) < 0x20 || c == '\u{7f}' => {
                result.push_str(&format!("_x{:04X}_", c as u32));
            }
            c => result.push(c),
        }
    }
    result
}

fn looks_like_escape(s: &str) -> bool {
    let bytes = s.as_bytes();
    bytes.len() >= 7
        && bytes[0] == b'_'
        && (bytes[1] == b'x' || bytes[1] == b'X')
        && bytes[2..6].iter().all(u8::is_ascii_hexdigit)
        && bytes[6] == b'_'
}

/// Decode `_xHHHH_` escape sequences.
///
/// - `_x000D_` = CR (carriage return)
/// - `_x000A_` = LF (line feed)
/// - `_x0009_` = Tab
/// - `_x005F_` = Underscore (escaped underscore)
pub(crate) fn decode_excel_escapes(s: &str) -> String {
    if !s.contains("_x") && !s.contains("_X") {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('_') {
        result.push_str(&rest[..pos]);
        let candidate = &rest[pos..];
        let decoded = if looks_like_escape(candidate) {
            u32::from_str_radix(&candidate[2..6], 16)
                .ok()
                .and_then(char::from_u32)
        } else {
            None
        };
        match decoded {
            Some(c) => {
                result.push(c);
                rest = &candidate[7..];
            }
            None => {
                result.push('_');
                rest = &candidate[1..];
            }
        }
    }
    result.push_str(rest);
    result
}

/// Value of an attribute, unescaped
pub(crate) fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Boolean attribute (`"1"` or `"true"`)
pub(crate) fn attr_flag(e: &BytesStart<'_>, key: &[u8]) -> bool {
    attr(e, key).map_or(false, |v| v == "1" || v.eq_ignore_ascii_case("true"))
}

/// Whether text needs `xml:space="preserve"` to survive parsing
pub(crate) fn needs_space_preserve(s: &str) -> bool {
    s.starts_with(char::is_whitespace) || s.ends_with(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_xml() {
        assert_eq!(
            escape_xml(r#"<a href="x">Tom & 'Jerry'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; &apos;Jerry&apos;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_decode_carriage_return() {
        assert_eq!(decode_excel_escapes("a_x000D_b"), "a\rb");
        assert_eq!(decode_excel_escapes("a_x000d_b"), "a\rb");
    }

    #[test]
    fn test_decode_multiple() {
        assert_eq!(
            decode_excel_escapes("line1_x000D__x000A_line2_x0009_end"),
            "line1\r\nline2\tend"
        );
    }

    #[test]
    fn test_decode_partial_sequence() {
        assert_eq!(decode_excel_escapes("_x00"), "_x00");
        assert_eq!(decode_excel_escapes("snake_case_xyz"), "snake_case_xyz");
        assert_eq!(decode_excel_escapes("no escapes"), "no escapes");
    }

    #[test]
    fn test_encode_control_characters() {
        assert_eq!(encode_excel_escapes("a\rb"), "a_x000D_b");
        assert_eq!(encode_excel_escapes("tab\tnl\n"), "tab\tnl\n");
        assert_eq!(encode_excel_escapes("bell\u{7}"), "bell_x0007_");
    }

    #[test]
    fn test_literal_escape_is_protected() {
        let original = "keep _x0041_ literally";
        let encoded = encode_excel_escapes(original);
        assert_eq!(encoded, "keep _x005F_x0041_ literally");
        assert_eq!(decode_excel_escapes(&encoded), original);
    }

    #[test]
    fn test_encode_decode_mixed() {
        for s in ["a\r\nb", "x_x000D_y\r", "__x__", "plain", "é\u{1}ü"] {
            assert_eq!(decode_excel_escapes(&encode_excel_escapes(s)), s);
        }
    }
}
