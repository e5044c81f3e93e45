//! Go identifier spelling for proto names

/// Convert a proto identifier to an exported Go name
///
/// Follows the protoc-gen-go rules: an underscore followed by a lower-case
/// letter is dropped and the letter upper-cased, every word starts upper-case,
/// and a leading underscore becomes `X`.
///
/// # Examples
/// ```
/// use protosample_common::naming::go_camel_case;
///
/// assert_eq!(go_camel_case("book_id"), "BookId");
/// assert_eq!(go_camel_case("x"), "X");
/// ```
pub fn go_camel_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len());
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        if ch == '_' && i == 0 {
            out.push('X');
        } else if ch == '_' && chars.get(i + 1).is_some_and(|c| c.is_ascii_lowercase()) {
            // next word starts upper-case
        } else if ch == '_' || ch.is_ascii_digit() {
            out.push(ch);
        } else {
            out.push(ch.to_ascii_uppercase());
            while let Some(next) = chars.get(i + 1).filter(|c| c.is_ascii_lowercase()) {
                out.push(*next);
                i += 1;
            }
        }
        i += 1;
    }

    out
}

/// Convert a proto identifier to an unexported Go name (`book_id` -> `bookId`)
pub fn go_lower_camel_case(name: &str) -> String {
    let camel = go_camel_case(name);
    let mut chars = camel.chars();
    match chars.next() {
        Some(first) => first.to_ascii_lowercase().to_string() + chars.as_str(),
        None => camel,
    }
}

/// Reduce arbitrary text to a Go package identifier
pub fn go_package_ident(name: &str) -> String {
    let ident: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect::<String>()
        .to_ascii_lowercase();

    match ident.chars().next() {
        Some(c) if c.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
        None => "pb".to_string(),
    }
}
