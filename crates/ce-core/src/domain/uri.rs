//! Lightweight RFC 3986 syntax checks for `uri` and `uri-reference` values.

/// Characters allowed anywhere in a URI besides `%`-escapes.
fn is_uri_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '.' | '_' | '~' | ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&'
                | '\'' | '(' | ')' | '*' | '+' | ',' | ';' | '='
        )
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn has_valid_escapes(s: &str) -> bool {
    let bytes = s.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let valid = bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
                && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);
            if !valid {
                return false;
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    true
}

fn has_valid_chars(s: &str) -> bool {
    s.chars().all(|c| c == '%' || is_uri_char(c)) && has_valid_escapes(s)
}

/// The scheme of `s`, if its first path segment carries one.
fn scheme_of(s: &str) -> Option<&str> {
    let end = s
        .find(|c: char| matches!(c, '/' | '?' | '#'))
        .unwrap_or(s.len());
    s[..end].find(':').map(|idx| &s[..idx])
}

/// Absolute URI: `scheme ":" hier-part [ "?" query ] [ "#" fragment ]`.
#[must_use]
pub fn is_uri(s: &str) -> bool {
    if !has_valid_chars(s) {
        return false;
    }
    match s.find(':') {
        Some(idx) => is_scheme(&s[..idx]),
        None => false,
    }
}

/// URI or relative reference. The empty string is a valid reference.
#[must_use]
pub fn is_uri_reference(s: &str) -> bool {
    if !has_valid_chars(s) {
        return false;
    }
    match scheme_of(s) {
        Some(scheme) => is_scheme(scheme),
        None => true,
    }
}
