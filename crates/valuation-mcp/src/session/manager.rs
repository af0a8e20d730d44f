//! Session lifecycle and in-flight request tracking.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use crate::protocol::NegotiatedCapabilities;
use crate::types::{McpError, McpResult, RequestId};

/// Bookkeeping for one request whose handler has not reported back yet.
#[derive(Debug)]
pub struct InFlight {
    pub method: String,
    pub cancellation: CancellationToken,
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
}

/// Server-side state for one client connection.
///
/// Owned by exactly one connection driver; never shared across tasks.
#[derive(Debug)]
pub struct Session {
    id: String,
    peer: String,
    created_at: DateTime<Utc>,
    capabilities: NegotiatedCapabilities,
    in_flight: HashMap<RequestId, InFlight>,
}

impl Session {
    /// Open a new session for the given peer label.
    pub fn open(peer: &str) -> Self {
        let id = uuid::Uuid::new_v4().to_string();
        tracing::info!("Session {id} opened for {peer}");
        Self {
            id,
            peer: peer.to_string(),
            created_at: Utc::now(),
            capabilities: NegotiatedCapabilities::default(),
            in_flight: HashMap::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn peer(&self) -> &str {
        &self.peer
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn capabilities(&self) -> &NegotiatedCapabilities {
        &self.capabilities
    }

    pub fn capabilities_mut(&mut self) -> &mut NegotiatedCapabilities {
        &mut self.capabilities
    }

    /// Track a new request. Reusing an id that is still in flight is a
    /// protocol violation and leaves the original request untouched.
    pub fn begin(&mut self, id: &RequestId, method: &str) -> McpResult<CancellationToken> {
        if self.in_flight.contains_key(id) {
            return Err(McpError::DuplicateRequestId(id.clone()));
        }
        let token = CancellationToken::new();
        self.in_flight.insert(
            id.clone(),
            InFlight {
                method: method.to_string(),
                cancellation: token.clone(),
                cancelled: false,
                started_at: Utc::now(),
            },
        );
        Ok(token)
    }

    /// Signal cancellation of an in-flight request. Returns `false` when the
    /// id is unknown or already finished.
    pub fn cancel(&mut self, id: &RequestId) -> bool {
        match self.in_flight.get_mut(id) {
            Some(entry) => {
                entry.cancelled = true;
                entry.cancellation.cancel();
                tracing::debug!("Cancelled request {id} ({})", entry.method);
                true
            }
            None => false,
        }
    }

    /// Stop tracking a request whose handler has reported back.
    pub fn complete(&mut self, id: &RequestId) -> Option<InFlight> {
        self.in_flight.remove(id)
    }

    pub fn is_in_flight(&self, id: &RequestId) -> bool {
        self.in_flight.contains_key(id)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Cancel every outstanding request. Called on disconnect.
    pub fn close(&mut self) {
        let pending = self.in_flight.len();
        for (_, entry) in self.in_flight.drain() {
            entry.cancellation.cancel();
        }
        let lifetime = Utc::now() - self.created_at;
        tracing::info!(
            "Session {} for {} closed after {}s ({} pending request(s) cancelled)",
            self.id,
            self.peer,
            lifetime.num_seconds(),
            pending
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_in_flight_id_rejected() {
        let mut session = Session::open("test");
        let id = RequestId::from("1");
        let token = session.begin(&id, "slow").unwrap();

        let err = session.begin(&id, "slow").unwrap_err();
        assert!(matches!(err, McpError::DuplicateRequestId(_)));
        assert!(!token.is_cancelled());
        assert_eq!(session.in_flight_count(), 1);
    }

    #[test]
    fn test_id_reusable_after_completion() {
        let mut session = Session::open("test");
        let id = RequestId::from(7);
        session.begin(&id, "ping").unwrap();
        let entry = session.complete(&id).unwrap();
        assert!(!entry.cancelled);
        assert!(session.begin(&id, "ping").is_ok());
    }

    #[test]
    fn test_cancel_trips_token() {
        let mut session = Session::open("test");
        let id = RequestId::from("3");
        let token = session.begin(&id, "slow").unwrap();

        assert!(session.cancel(&id));
        assert!(token.is_cancelled());
        assert!(session.is_in_flight(&id));
        assert!(session.complete(&id).unwrap().cancelled);
        assert!(!session.cancel(&id));
    }

    #[test]
    fn test_close_cancels_everything() {
        let mut session = Session::open("test");
        let a = session.begin(&RequestId::from("a"), "x").unwrap();
        let b = session.begin(&RequestId::from("b"), "x").unwrap();
        session.close();
        assert!(a.is_cancelled() && b.is_cancelled());
        assert_eq!(session.in_flight_count(), 0);
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        let a = Session::open("10.0.0.1:5000");
        assert_ne!(a.id(), Session::open("b").id());
        assert_eq!(a.peer(), "10.0.0.1:5000");
        assert!(a.created_at() <= Utc::now());
        assert!(!a.capabilities().initialized);
    }
}
