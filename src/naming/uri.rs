//! Legacy URI binding (`cpe:/part:vendor:product:...`).
//!
//! The URI form has seven components. The four extended attributes have
//! no component of their own; when any of them is set they are packed with
//! the edition as `~edition~sw_edition~target_sw~target_hw~other`.

use crate::error::ConversionError;

use super::wfn::{is_plain, Attribute, AttributeValue, WellFormedName};

const URI_PREFIX: &str = "cpe:/";

const URI_ATTRIBUTES: [Attribute; 7] = [
    Attribute::Part,
    Attribute::Vendor,
    Attribute::Product,
    Attribute::Version,
    Attribute::Update,
    Attribute::Edition,
    Attribute::Language,
];

/// Bind a well-formed name to the legacy URI form.
pub fn bind_to_uri(wfn: &WellFormedName) -> String {
    let mut uri = String::from(URI_PREFIX);
    for attr in URI_ATTRIBUTES {
        let component = if attr == Attribute::Edition {
            pack_edition(wfn)
        } else {
            bind_value(wfn.get(attr))
        };
        uri.push_str(&component);
        uri.push(':');
    }
    uri.trim_end_matches(':').to_string()
}

/// Parse a legacy URI back into a well-formed name.
///
/// The extended attributes are recovered from a packed edition component;
/// an unpacked edition leaves them ANY.
pub fn unbind_uri(uri: &str) -> Result<WellFormedName, ConversionError> {
    let rest = uri
        .strip_prefix(URI_PREFIX)
        .ok_or_else(|| ConversionError::new(format!("missing '{}' prefix", URI_PREFIX), uri))?;

    let components: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(':').collect()
    };
    if components.len() > URI_ATTRIBUTES.len() {
        return Err(ConversionError::new(
            format!(
                "expected at most {} components, found {}",
                URI_ATTRIBUTES.len(),
                components.len()
            ),
            uri,
        ));
    }

    let mut wfn = WellFormedName::new();
    for (attr, raw) in URI_ATTRIBUTES.iter().zip(&components) {
        let fail = |reason: String| ConversionError::new(format!("{}: {}", attr, reason), uri);
        if *attr == Attribute::Edition && raw.starts_with('~') {
            let packed: Vec<&str> = raw.split('~').collect();
            if packed.len() != 6 {
                return Err(fail(format!(
                    "packed edition needs 5 fields, found {}",
                    packed.len() - 1
                )));
            }
            wfn.set(Attribute::Edition, decode(packed[1]).map_err(fail)?);
            for (ext, field) in Attribute::EXTENDED.iter().zip(&packed[2..]) {
                wfn.set(*ext, decode(field).map_err(fail)?);
            }
        } else {
            wfn.set(*attr, decode(raw).map_err(fail)?);
        }
    }

    if let AttributeValue::Value(part) = wfn.get(Attribute::Part) {
        if !matches!(part.as_str(), "a" | "o" | "h") {
            return Err(ConversionError::new(
                format!("part must be one of a, o, h (got '{}')", part),
                uri,
            ));
        }
    }

    Ok(wfn)
}

fn pack_edition(wfn: &WellFormedName) -> String {
    let edition = bind_value(wfn.get(Attribute::Edition));
    let extended: Vec<String> = Attribute::EXTENDED
        .iter()
        .map(|a| bind_value(wfn.get(*a)))
        .collect();
    if extended.iter().all(String::is_empty) {
        return edition;
    }
    format!("~{}~{}", edition, extended.join("~"))
}

fn bind_value(value: &AttributeValue) -> String {
    match value {
        AttributeValue::Any => String::new(),
        AttributeValue::NotApplicable => "-".to_string(),
        AttributeValue::Value(s) => transform_for_uri(s),
    }
}

fn transform_for_uri(s: &str) -> String {
    // A bare `-` component means NOT-APPLICABLE.
    if s == "\\-" {
        return "%2d".to_string();
    }
    let mut out = String::with_capacity(s.len() + 8);
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        match c {
            c if is_plain(c) => out.push(c),
            '\\' => {
                if let Some(next) = chars.next() {
                    pct_encode(next, &mut out);
                }
            }
            '?' => out.push_str("%01"),
            '*' => out.push_str("%02"),
            other => pct_encode(other, &mut out),
        }
    }
    out
}

fn pct_encode(c: char, out: &mut String) {
    if c.is_ascii() && !c.is_ascii_alphanumeric() && !matches!(c, '-' | '.' | '_') {
        out.push_str(&format!("%{:02x}", c as u32));
    } else {
        out.push(c);
    }
}

/// Decode one URI component into WFN form.
fn decode(s: &str) -> Result<AttributeValue, String> {
    match s {
        "" => return Ok(AttributeValue::Any),
        "-" => return Ok(AttributeValue::NotApplicable),
        _ => {}
    }

    let bytes = s.as_bytes();
    let mut out = String::with_capacity(s.len() + 8);
    let mut embedded = false;
    let mut i = 0;

    while i < s.len() {
        if bytes[i] != b'%' {
            let c = s[i..].chars().next().unwrap_or_default();
            if !c.is_ascii_graphic() {
                return Err(format!("illegal character '{}'", c.escape_default()));
            }
            if !is_plain(c) {
                out.push('\\');
            }
            out.push(c);
            embedded = true;
            i += c.len_utf8();
            continue;
        }

        let hex = s
            .get(i + 1..i + 3)
            .ok_or_else(|| "truncated percent-encoding".to_string())?;
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(format!("invalid percent-encoding '%{}'", hex));
        }
        let at_edge = i == 0 || i + 3 == s.len();
        match hex {
            "01" => {
                let leading_run = !embedded && i >= 3 && s.get(i - 3..i) == Some("%01");
                let trailing_run = embedded && s[i + 3..].starts_with("%01");
                if !at_edge && !leading_run && !trailing_run {
                    return Err("'%01' inside a value".to_string());
                }
                out.push('?');
                embedded = false;
            }
            "02" => {
                if !at_edge {
                    return Err("'%02' inside a value".to_string());
                }
                out.push('*');
                embedded = true;
            }
            _ => {
                let code = u8::from_str_radix(hex, 16)
                    .map_err(|_| format!("invalid percent-encoding '%{}'", hex))?;
                let decoded = char::from(code);
                if !decoded.is_ascii_punctuation() {
                    return Err(format!("'%{}' does not encode punctuation", hex));
                }
                out.push('\\');
                out.push(decoded);
                embedded = true;
            }
        }
        i += 3;
    }

    Ok(AttributeValue::Value(out))
}
