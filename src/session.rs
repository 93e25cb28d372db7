//! Per-user session state: who is logged in, their current OCEAN score,
//! and the metric feedback gathered during the session.

use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::feedback::MetricFeedbackStore;
use crate::ocean::{normalize, OceanScore};

#[derive(Debug)]
struct SessionInner {
    session_id: Uuid,
    user_id: Option<String>,
    ocean: Option<OceanScore>,
}

impl SessionInner {
    fn empty() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: None,
            ocean: None,
        }
    }
}

/// Injectable session container. Clones share the same state.
#[derive(Debug, Clone)]
pub struct SessionState {
    inner: Arc<RwLock<SessionInner>>,
    feedback: MetricFeedbackStore,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    /// Logged-out session with an empty feedback store.
    pub fn new() -> Self {
        Self::with_store(MetricFeedbackStore::new())
    }

    pub fn with_store(feedback: MetricFeedbackStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(SessionInner::empty())),
            feedback,
        }
    }

    /// Start a session for `user_id` at the neutral score.
    pub fn login(&self, user_id: impl Into<String>) {
        self.login_with_score(user_id, OceanScore::neutral());
    }

    /// Start a session with a score loaded from the user's profile.
    ///
    /// Logging in as a different user first ends the previous session, so
    /// its feedback never reaches the new user.
    pub fn login_with_score(&self, user_id: impl Into<String>, ocean: OceanScore) {
        let user_id = user_id.into();
        let mut inner = self.inner.write();
        if let Some(previous) = inner.user_id.as_deref().filter(|prev| *prev != user_id) {
            log::info!(
                "Session {} of user {} replaced by a new login",
                inner.session_id,
                previous
            );
            *inner = SessionInner::empty();
            self.feedback.clear_all();
        }
        log::info!("Session {} started for user {}", inner.session_id, user_id);
        inner.user_id = Some(user_id);
        inner.ocean = Some(normalize(ocean));
    }

    /// End the session: forget the user, the score and all feedback.
    pub fn logout(&self) {
        let mut inner = self.inner.write();
        log::info!("Session {} ended", inner.session_id);
        *inner = SessionInner::empty();
        self.feedback.clear_all();
    }

    /// Id of the current session; rotates on logout and on a login as another user.
    pub fn session_id(&self) -> Uuid {
        self.inner.read().session_id
    }

    /// Logged-in user, if any.
    pub fn user_id(&self) -> Option<String> {
        self.inner.read().user_id.clone()
    }

    pub fn is_logged_in(&self) -> bool {
        self.inner.read().user_id.is_some()
    }

    /// Current normalized score; `None` while logged out.
    pub fn ocean(&self) -> Option<OceanScore> {
        self.inner.read().ocean
    }

    /// Replace the whole score. The value is normalized on the way in.
    pub fn set_ocean(&self, ocean: OceanScore) -> OceanScore {
        let normalized = normalize(ocean);
        self.inner.write().ocean = Some(normalized);
        normalized
    }

    pub fn clear_ocean(&self) {
        self.inner.write().ocean = None;
    }

    /// Metric feedback gathered in this session.
    pub fn feedback(&self) -> &MetricFeedbackStore {
        &self.feedback
    }
}
