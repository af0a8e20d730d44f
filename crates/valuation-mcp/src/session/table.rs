//! The transport listener's table of live sessions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

/// What the listener knows about a live session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    pub peer: String,
    pub opened_at: DateTime<Utc>,
}

impl SessionInfo {
    pub fn new(peer: &str) -> Self {
        Self {
            peer: peer.to_string(),
            opened_at: Utc::now(),
        }
    }
}

/// Live sessions keyed by session id. Mutated only by the listener loop.
#[derive(Debug, Default)]
pub struct ActiveSessions {
    sessions: HashMap<String, SessionInfo>,
}

impl ActiveSessions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, session_id: &str, info: SessionInfo) {
        self.sessions.insert(session_id.to_string(), info);
    }

    pub fn remove(&mut self, session_id: &str) -> Option<SessionInfo> {
        self.sessions.remove(session_id)
    }

    pub fn contains(&self, session_id: &str) -> bool {
        self.sessions.contains_key(session_id)
    }

    /// Number of active sessions.
    pub fn count(&self) -> usize {
        self.sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_remove() {
        let mut table = ActiveSessions::new();
        table.insert("s1", SessionInfo::new("127.0.0.1:1"));
        assert!(table.contains("s1"));
        assert_eq!(table.count(), 1);
        assert_eq!(table.remove("s1").unwrap().peer, "127.0.0.1:1");
        assert_eq!(table.count(), 0);
        assert!(table.remove("s1").is_none());
    }
}
