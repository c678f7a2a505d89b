use crate::{Error, Result};

/// Identity of the notification server, as returned by `GetServerInformation`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerInformation {
    pub name: String,
    pub vendor: String,
    pub version: String,
    /// Version of the notification specification the server conforms to.
    pub spec_version: String,
}

impl ServerInformation {
    /// Build from the reply fields, in wire order. Anything but exactly four fields is a decode
    /// error.
    pub fn from_fields(fields: Vec<String>) -> Result<Self> {
        let count = fields.len();
        match <[String; 4]>::try_from(fields) {
            Ok([name, vendor, version, spec_version]) => Ok(Self { name, vendor, version, spec_version }),
            Err(_) => Err(Error::Decode(format!("GetServerInformation returned {} fields, expected 4", count))),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fields(xs: &[&str]) -> Vec<String> {
        xs.iter().map(|x| x.to_string()).collect()
    }

    #[test]
    fn test_four_fields_in_order() {
        let info = ServerInformation::from_fields(fields(&["dunst", "knopwob", "1.9.2", "1.2"])).unwrap();
        assert_eq!(
            info,
            ServerInformation {
                name: "dunst".to_string(),
                vendor: "knopwob".to_string(),
                version: "1.9.2".to_string(),
                spec_version: "1.2".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_field_is_decode_error() {
        let err = ServerInformation::from_fields(fields(&["dunst", "knopwob", "1.9.2"])).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }
}
