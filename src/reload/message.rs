//! Messages pushed to the browser.
//!
//! ```json
//! {"type":"reload"}
//! {"type":"css"}
//! ```

use serde::{Deserialize, Serialize};

use crate::watch::ReloadKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReloadMessage {
    /// Reload the whole page.
    Reload,
    /// Re-fetch stylesheets in place.
    Css,
}

impl ReloadMessage {
    pub fn to_json(self) -> String {
        serde_json::to_string(&self).unwrap_or_else(|_| r#"{"type":"reload"}"#.to_string())
    }

    #[cfg(test)]
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}

impl From<ReloadKind> for ReloadMessage {
    fn from(kind: ReloadKind) -> Self {
        match kind {
            ReloadKind::Full => Self::Reload,
            ReloadKind::Css => Self::Css,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_format() {
        assert_eq!(ReloadMessage::Reload.to_json(), r#"{"type":"reload"}"#);
        assert_eq!(ReloadMessage::from(ReloadKind::Css).to_json(), r#"{"type":"css"}"#);
    }

    #[test]
    fn test_parse() {
        assert_eq!(ReloadMessage::from_json(r#"{"type":"css"}"#), Some(ReloadMessage::Css));
        assert_eq!(ReloadMessage::from_json(r#"{"type":"patch"}"#), None);
    }
}
