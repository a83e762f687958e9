//! Well-formed names: the binding-neutral attribute set behind both CPE
//! string forms.

use std::fmt;

/// The eleven WFN attributes, in binding order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    Part,
    Vendor,
    Product,
    Version,
    Update,
    Edition,
    Language,
    SwEdition,
    TargetSw,
    TargetHw,
    Other,
}

impl Attribute {
    pub const ALL: [Attribute; 11] = [
        Attribute::Part,
        Attribute::Vendor,
        Attribute::Product,
        Attribute::Version,
        Attribute::Update,
        Attribute::Edition,
        Attribute::Language,
        Attribute::SwEdition,
        Attribute::TargetSw,
        Attribute::TargetHw,
        Attribute::Other,
    ];

    /// Attributes that the URI binding packs into the edition component.
    pub const EXTENDED: [Attribute; 4] = [
        Attribute::SwEdition,
        Attribute::TargetSw,
        Attribute::TargetHw,
        Attribute::Other,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Attribute::Part => "part",
            Attribute::Vendor => "vendor",
            Attribute::Product => "product",
            Attribute::Version => "version",
            Attribute::Update => "update",
            Attribute::Edition => "edition",
            Attribute::Language => "language",
            Attribute::SwEdition => "sw_edition",
            Attribute::TargetSw => "target_sw",
            Attribute::TargetHw => "target_hw",
            Attribute::Other => "other",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a single WFN attribute.
///
/// `Value` holds the WFN-quoted string: every character other than ASCII
/// alphanumerics and `_` is preceded by a backslash, except for unquoted
/// `*` and `?` wildcards at either end.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AttributeValue {
    #[default]
    Any,
    NotApplicable,
    Value(String),
}

impl AttributeValue {
    /// Builds a value from plain text, quoting every special character.
    pub fn literal(text: &str) -> Self {
        let mut quoted = String::with_capacity(text.len());
        for c in text.chars() {
            if !is_plain(c) {
                quoted.push('\\');
            }
            quoted.push(c);
        }
        AttributeValue::Value(quoted)
    }

    pub fn is_any(&self) -> bool {
        matches!(self, AttributeValue::Any)
    }
}

/// Characters that never need quoting in a WFN value.
pub(crate) fn is_plain(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// A CPE well-formed name. Unset attributes are ANY.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WellFormedName {
    values: [AttributeValue; 11],
}

impl WellFormedName {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, attr: Attribute) -> &AttributeValue {
        &self.values[attr.index()]
    }

    pub fn set(&mut self, attr: Attribute, value: AttributeValue) {
        self.values[attr.index()] = value;
    }

    /// Builder-style [`set`](Self::set).
    pub fn with(mut self, attr: Attribute, value: AttributeValue) -> Self {
        self.set(attr, value);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &AttributeValue)> {
        Attribute::ALL.iter().map(move |a| (*a, self.get(*a)))
    }
}
