use std::collections::HashMap;

use indexmap::IndexMap;
use teloxide::types::UserId;
use tokio::sync::Mutex;

use crate::catalog::Catalog;

/// Ephemeral quiz progress of one user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub(crate) scores: IndexMap<String, u32>,
    pub(crate) question_index: usize,
    pub(crate) awaiting_feedback: bool,
}

impl Session {
    /// Fresh quiz: a zero counter for every category, in catalog order.
    pub fn started(catalog: &Catalog) -> Self {
        Self {
            scores: catalog.categories().keys().map(|key| (key.clone(), 0)).collect(),
            question_index: 0,
            awaiting_feedback: false,
        }
    }

    pub fn scores(&self) -> &IndexMap<String, u32> {
        &self.scores
    }

    pub fn score(&self, category: &str) -> Option<u32> {
        self.scores.get(category).copied()
    }

    pub fn question_index(&self) -> usize {
        self.question_index
    }

    pub fn awaiting_feedback(&self) -> bool {
        self.awaiting_feedback
    }

    /// A session without counters never went through a quiz start.
    pub fn is_started(&self) -> bool {
        !self.scores.is_empty()
    }

    /// +1 for every weight key that is a known category. Unknown keys are skipped.
    pub(crate) fn apply_weights<'a>(&mut self, keys: impl IntoIterator<Item = &'a String>) {
        for key in keys {
            if let Some(score) = self.scores.get_mut(key.as_str()) {
                *score += 1;
            }
        }
    }

    /// Highest counter; ties go to the category seen first.
    pub fn leader(&self) -> Option<&str> {
        let mut best: Option<(&str, u32)> = None;
        for (key, &score) in &self.scores {
            match best {
                Some((_, top)) if score <= top => {}
                _ => best = Some((key.as_str(), score)),
            }
        }
        best.map(|(key, _)| key)
    }
}

/// In-memory session repository. Nothing survives a process restart.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever the user had with `session`.
    pub async fn reset(&self, user: UserId, session: Session) {
        self.sessions.lock().await.insert(user, session);
    }

    /// Runs `f` on the user's session, creating an idle one first if needed.
    pub async fn with_session<R>(&self, user: UserId, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut sessions = self.sessions.lock().await;
        f(sessions.entry(user).or_default())
    }

    /// Runs `f` only if the user already has a session. Never inserts.
    pub async fn with_existing<R>(
        &self,
        user: UserId,
        f: impl FnOnce(&mut Session) -> R,
    ) -> Option<R> {
        self.sessions.lock().await.get_mut(&user).map(f)
    }

    pub async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.lock().await.get(&user).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CategoryProfile;

    fn catalog(keys: &[&str]) -> Catalog {
        let categories = keys
            .iter()
            .map(|key| (key.to_string(), CategoryProfile::default()))
            .collect();
        Catalog::new(Vec::new(), categories)
    }

    fn with_scores(scores: &[(&str, u32)]) -> Session {
        Session {
            scores: scores.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ..Session::default()
        }
    }

    #[test]
    fn started_session_has_zeroed_counters_in_catalog_order() {
        let session = Session::started(&catalog(&["owl", "lion", "bear"]));

        let keys: Vec<&str> = session.scores().keys().map(String::as_str).collect();
        assert_eq!(keys, ["owl", "lion", "bear"]);
        assert!(session.scores().values().all(|&score| score == 0));
        assert_eq!(session.question_index(), 0);
        assert!(!session.awaiting_feedback());
        assert!(session.is_started());
    }

    #[test]
    fn applies_only_known_weights() {
        let mut session = Session::started(&catalog(&["lion", "owl", "bear"]));
        let weights = vec!["lion".to_string(), "tiger".to_string(), "bear".to_string()];

        session.apply_weights(&weights);

        assert_eq!(session.score("lion"), Some(1));
        assert_eq!(session.score("owl"), Some(0));
        assert_eq!(session.score("bear"), Some(1));
        assert_eq!(session.score("tiger"), None);
    }

    #[test]
    fn leader_breaks_ties_by_first_seen() {
        assert_eq!(with_scores(&[("A", 2), ("B", 2), ("C", 1)]).leader(), Some("A"));
        assert_eq!(with_scores(&[("B", 2), ("A", 2)]).leader(), Some("B"));
        assert_eq!(with_scores(&[("A", 0), ("B", 3)]).leader(), Some("B"));
        assert_eq!(with_scores(&[("A", 0), ("B", 0)]).leader(), Some("A"));
        assert_eq!(Session::default().leader(), None);
    }

    #[tokio::test]
    async fn store_creates_idle_sessions_on_demand() {
        let store = SessionStore::new();
        let user = UserId(7);

        assert_eq!(store.get(user).await, None);
        store.with_session(user, |s| s.awaiting_feedback = true).await;

        let session = store.get(user).await.unwrap();
        assert!(session.awaiting_feedback());
        assert!(!session.is_started());
    }

    #[tokio::test]
    async fn lookups_do_not_create_sessions() {
        let store = SessionStore::new();
        let user = UserId(7);

        assert_eq!(store.with_existing(user, |s| s.question_index).await, None);
        assert_eq!(store.len().await, 0);

        store.reset(user, with_scores(&[("A", 1)])).await;
        let index = store
            .with_existing(user, |s| {
                s.question_index += 1;
                s.question_index
            })
            .await;
        assert_eq!(index, Some(1));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn reset_overwrites_previous_session() {
        let store = SessionStore::new();
        let user = UserId(7);
        store.reset(user, with_scores(&[("A", 5)])).await;
        store.reset(user, with_scores(&[("A", 0)])).await;

        assert_eq!(store.get(user).await.unwrap().score("A"), Some(0));
        assert_eq!(store.len().await, 1);
    }
}
