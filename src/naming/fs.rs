//! Formatted-string binding (`cpe:2.3:part:vendor:...`).

use crate::error::ConversionError;

use super::wfn::{is_plain, Attribute, AttributeValue, WellFormedName};

const FS_PREFIX: &str = "cpe:2.3:";
/// `cpe`, `2.3`, then one component per attribute.
const FS_COMPONENTS: usize = 2 + Attribute::ALL.len();

/// Parse a formatted string into a well-formed name.
///
/// Escaped colons (`\:`) do not delimit components. `*` and `-` as whole
/// components are the logical values ANY and NOT-APPLICABLE; any other
/// component is quoted into WFN form.
pub fn unbind_fs(fs: &str) -> Result<WellFormedName, ConversionError> {
    if !fs.starts_with(FS_PREFIX) {
        return Err(ConversionError::new(
            format!("missing '{}' prefix", FS_PREFIX),
            fs,
        ));
    }

    let components = split_components(fs);
    if components.len() != FS_COMPONENTS {
        return Err(ConversionError::new(
            format!(
                "expected {} colon-delimited components, found {}",
                FS_COMPONENTS,
                components.len()
            ),
            fs,
        ));
    }

    let mut wfn = WellFormedName::new();
    for (attr, raw) in Attribute::ALL.iter().zip(&components[2..]) {
        let value = unbind_value(raw)
            .map_err(|reason| ConversionError::new(format!("{}: {}", attr, reason), fs))?;
        wfn.set(*attr, value);
    }

    if let AttributeValue::Value(part) = wfn.get(Attribute::Part) {
        if !matches!(part.as_str(), "a" | "o" | "h") {
            return Err(ConversionError::new(
                format!("part must be one of a, o, h (got '{}')", part),
                fs,
            ));
        }
    }

    Ok(wfn)
}

/// Bind a well-formed name to its formatted string.
pub fn bind_to_fs(wfn: &WellFormedName) -> String {
    let mut out = String::from("cpe:2.3");
    for (_, value) in wfn.iter() {
        out.push(':');
        match value {
            AttributeValue::Any => out.push('*'),
            AttributeValue::NotApplicable => out.push('-'),
            AttributeValue::Value(s) => out.push_str(&process_quoted_chars(s)),
        }
    }
    out
}

fn split_components(s: &str) -> Vec<&str> {
    let mut parts = Vec::with_capacity(FS_COMPONENTS);
    let mut start = 0;
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            ':' => {
                parts.push(&s[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&s[start..]);
    parts
}

fn unbind_value(s: &str) -> Result<AttributeValue, String> {
    match s {
        "" => Err("empty component".to_string()),
        "*" => Ok(AttributeValue::Any),
        "-" => Ok(AttributeValue::NotApplicable),
        _ => add_quoting(s).map(AttributeValue::Value),
    }
}

/// Quote every special character of an FS component. Existing escapes
/// are kept; `*` and `?` stay unquoted only at either end of the value.
///
/// Only the canonical form is accepted: `.` and `-` appear unquoted, every
/// other printable ASCII punctuation character is escaped, and nothing
/// outside printable ASCII is allowed. The one exception is a value that is
/// exactly `\-`, the quoted form of a literal hyphen.
fn add_quoting(s: &str) -> Result<String, String> {
    let chars: Vec<char> = s.chars().collect();
    let last = chars.len() - 1;
    let mut out = String::with_capacity(s.len() + 8);
    let mut embedded = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if is_plain(c) {
            out.push(c);
            embedded = true;
            i += 1;
            continue;
        }
        match c {
            '\\' => {
                let next = *chars
                    .get(i + 1)
                    .ok_or_else(|| "trailing unescaped backslash".to_string())?;
                check_escape(next, chars.len() == 2)?;
                out.push('\\');
                out.push(next);
                embedded = true;
                i += 2;
            }
            '*' => {
                if i != 0 && i != last {
                    return Err("unquoted '*' inside a value".to_string());
                }
                out.push('*');
                embedded = true;
                i += 1;
            }
            '?' => {
                let leading_run = !embedded && i > 0 && chars[i - 1] == '?';
                let trailing_run = embedded && chars.get(i + 1) == Some(&'?');
                if i != 0 && i != last && !leading_run && !trailing_run {
                    return Err("unquoted '?' inside a value".to_string());
                }
                out.push('?');
                embedded = false;
                i += 1;
            }
            '.' | '-' => {
                out.push('\\');
                out.push(c);
                embedded = true;
                i += 1;
            }
            c if c.is_ascii_punctuation() => {
                return Err(format!("unquoted '{}' must be escaped", c));
            }
            c => {
                return Err(format!("illegal character '{}'", c.escape_default()));
            }
        }
    }

    Ok(out)
}

/// Validate the character after a backslash. `lone` is set when the
/// escape is the whole value.
fn check_escape(next: char, lone: bool) -> Result<(), String> {
    match next {
        '-' if lone => Ok(()),
        '.' | '-' | '_' => Err(format!("unnecessary escape '\\{}'", next)),
        c if c.is_ascii_punctuation() => Ok(()),
        c => Err(format!("illegal escape '\\{}'", c.escape_default())),
    }
}

/// Drop the quoting the formatted string does not need (`.`, `-`, `_`).
fn process_quoted_chars(s: &str) -> String {
    // A lone quoted hyphen would otherwise read back as NOT-APPLICABLE.
    if s == "\\-" {
        return s.to_string();
    }
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(next @ ('.' | '-' | '_')) => out.push(next),
            Some(next) => {
                out.push('\\');
                out.push(next);
            }
            None => out.push('\\'),
        }
    }
    out
}
