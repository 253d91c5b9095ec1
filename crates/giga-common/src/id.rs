use std::fmt;

use uuid::Uuid;

/// Identifies one conversation run to the remote service (`X-Session-ID`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// Eight hex digits tagging the log lines of one streamed turn.
pub fn turn_tag() -> String {
    let mut tag = Uuid::new_v4().simple().to_string();
    tag.truncate(8);
    tag
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_id_displays_as_hyphenated_v4() {
        let sid = SessionId::new();
        let parsed = Uuid::parse_str(&sid.to_string()).unwrap();
        assert_eq!(parsed.get_version_num(), 4);
        assert_eq!(sid.to_string().len(), 36);
        assert_ne!(sid, SessionId::new());
    }

    #[test]
    fn turn_tag_is_short_hex() {
        let tag = turn_tag();
        assert_eq!(tag.len(), 8);
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
