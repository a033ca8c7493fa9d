use crate::DELIMITER;
use crate::filter::{self, Filter};

/// Passcode that requests an unverified, receive-only session.
pub const READ_ONLY_PASSCODE: &str = "-1";

/// Client software identification sent as `vers <name> <version>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Software {
    pub name: String,
    pub version: String,
}

impl Software {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }
}

/// The read-only login directive.
///
/// Wire form: `user <call> pass -1[ vers <name> <version>][ filter <expr> ...]`.
#[derive(Clone, Debug, PartialEq)]
pub struct Login<'a> {
    pub callsign: &'a str,
    pub filters: &'a [Filter],
    pub software: Option<&'a Software>,
}

impl<'a> Login<'a> {
    pub fn new(callsign: &'a str, filters: &'a [Filter]) -> Self {
        Self {
            callsign,
            filters,
            software: None,
        }
    }

    pub fn with_software(mut self, software: Option<&'a Software>) -> Self {
        self.software = software;
        self
    }

    /// Render the directive without the trailing delimiter.
    pub fn format_line(&self) -> String {
        let mut line = format!("user {} pass {READ_ONLY_PASSCODE}", self.callsign);
        if let Some(software) = self.software {
            line.push_str(&format!(" vers {} {}", software.name, software.version));
        }
        if !self.filters.is_empty() {
            line.push_str(" filter ");
            line.push_str(&filter::join(self.filters));
        }
        line
    }

    /// Serialize to wire bytes, delimiter included.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.format_line().into_bytes();
        bytes.extend_from_slice(DELIMITER);
        bytes
    }
}
