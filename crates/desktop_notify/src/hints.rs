use std::collections::{BTreeMap, HashMap};

use zbus::zvariant::Value;

use crate::ImageData;

/// A typed hint value. Servers are picky about the exact D-Bus type of each hint (`urgency` has to
/// be a byte, `x` and `y` have to be `i32`, ...), so the variant picked here is what goes on the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint {
    Str(String),
    Byte(u8),
    U32(u32),
    I32(i32),
    Bool(bool),
    Bytes(Vec<u8>),
    Image(ImageData),
}

impl Hint {
    pub fn to_value(&self) -> Value<'static> {
        match self {
            Hint::Str(s) => Value::from(s.clone()),
            Hint::Byte(b) => Value::U8(*b),
            Hint::U32(n) => Value::U32(*n),
            Hint::I32(n) => Value::I32(*n),
            Hint::Bool(b) => Value::Bool(*b),
            Hint::Bytes(bytes) => Value::from(bytes.clone()),
            Hint::Image(image) => image.to_value(),
        }
    }
}

impl From<&str> for Hint {
    fn from(s: &str) -> Self {
        Hint::Str(s.to_owned())
    }
}

impl From<String> for Hint {
    fn from(s: String) -> Self {
        Hint::Str(s)
    }
}

impl From<bool> for Hint {
    fn from(b: bool) -> Self {
        Hint::Bool(b)
    }
}

impl From<i32> for Hint {
    fn from(n: i32) -> Self {
        Hint::I32(n)
    }
}

impl From<u32> for Hint {
    fn from(n: u32) -> Self {
        Hint::U32(n)
    }
}

impl From<ImageData> for Hint {
    fn from(image: ImageData) -> Self {
        Hint::Image(image)
    }
}

/// Encode a hint mapping into the `a{sv}` dictionary passed to `Notify`.
pub fn encode_hints(hints: &BTreeMap<String, Hint>) -> HashMap<String, Value<'static>> {
    hints.iter().map(|(key, hint)| (key.clone(), hint.to_value())).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct ParseUrgencyError(pub String);

impl std::fmt::Display for ParseUrgencyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Couldn't parse urgency: '{}'. Possible values are low normal critical", self.0)
    }
}

impl std::error::Error for ParseUrgencyError {}

impl Urgency {
    pub fn as_byte(self) -> u8 {
        match self {
            Urgency::Low => 0,
            Urgency::Normal => 1,
            Urgency::Critical => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Urgency {
    type Err = ParseUrgencyError;

    fn from_str(s: &str) -> std::result::Result<Self, ParseUrgencyError> {
        match s.to_lowercase().as_str() {
            "low" | "0" => Ok(Urgency::Low),
            "normal" | "1" => Ok(Urgency::Normal),
            "critical" | "2" => Ok(Urgency::Critical),
            _ => Err(ParseUrgencyError(s.to_owned())),
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Urgency> for Hint {
    fn from(urgency: Urgency) -> Self {
        Hint::Byte(urgency.as_byte())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::names::hint;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_encode_hints_keeps_wire_types() {
        let mut hints = BTreeMap::new();
        hints.insert(hint::URGENCY.to_string(), Hint::from(Urgency::Critical));
        hints.insert(hint::CATEGORY.to_string(), Hint::from("email.arrived"));
        hints.insert(hint::X.to_string(), Hint::from(-20));
        hints.insert(hint::TRANSIENT.to_string(), Hint::from(true));
        hints.insert("x-vendor-blob".to_string(), Hint::Bytes(vec![1, 2, 3]));

        let encoded = encode_hints(&hints);
        assert_eq!(encoded.len(), 5);
        assert_eq!(encoded[hint::URGENCY], Value::U8(2));
        assert_eq!(encoded[hint::CATEGORY], Value::from("email.arrived"));
        assert_eq!(encoded[hint::X], Value::I32(-20));
        assert_eq!(encoded[hint::TRANSIENT], Value::Bool(true));
        assert_eq!(encoded["x-vendor-blob"].value_signature().as_str(), "ay");
    }

    #[test]
    fn test_parse_urgency() {
        assert_eq!("low".parse(), Ok(Urgency::Low));
        assert_eq!("CRITICAL".parse(), Ok(Urgency::Critical));
        assert_eq!("1".parse(), Ok(Urgency::Normal));
        assert!("urgent".parse::<Urgency>().is_err());
    }
}
