//! In-memory session store
//!
//! Maps canonical session ids to ordered conversation histories. The table is
//! a sharded lock map, so mutations of one session are mutually exclusive
//! while other sessions proceed in parallel. Every operation is synchronous
//! and completes without I/O; no lock is ever held across an `.await`.

use dashmap::DashMap;
use greptile_mcp_core::config::SessionConfig;
use greptile_mcp_core::{Message, Result, Role, SessionId};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

/// Bounds on how much history the store keeps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Oldest turns are dropped beyond this many messages
    pub max_messages_per_session: usize,
    /// Sessions untouched for this long are evicted by [`SessionStore::evict_idle`]
    pub idle_ttl: Option<Duration>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for RetentionPolicy {
    fn from(config: &SessionConfig) -> Self {
        Self {
            max_messages_per_session: config.max_messages_per_session.max(1),
            idle_ttl: config.idle_ttl(),
        }
    }
}

#[derive(Debug)]
struct SessionEntry {
    messages: Vec<Message>,
    last_touched: Instant,
}

impl SessionEntry {
    fn new() -> Self {
        Self {
            messages: Vec::new(),
            last_touched: Instant::now(),
        }
    }

    fn push(&mut self, message: Message, limit: usize) {
        self.messages.push(message);
        self.truncate_front(limit);
        self.last_touched = Instant::now();
    }

    fn truncate_front(&mut self, limit: usize) {
        if self.messages.len() > limit {
            let excess = self.messages.len() - limit;
            self.messages.drain(..excess);
        }
    }
}

/// Conversation histories keyed by session id
#[derive(Debug)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SessionEntry>,
    retention: RetentionPolicy,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}

impl SessionStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        Self {
            sessions: DashMap::new(),
            retention,
        }
    }

    pub fn retention(&self) -> &RetentionPolicy {
        &self.retention
    }

    /// Snapshot of a session's history; empty for unknown sessions
    pub fn get_history(&self, session_id: &SessionId) -> Vec<Message> {
        self.sessions
            .get(session_id)
            .map(|entry| entry.messages.clone())
            .unwrap_or_default()
    }

    /// Append one turn, creating the session if needed
    pub fn append_message(
        &self,
        session_id: &SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<()> {
        let message = Message::new(role, content)?;
        self.sessions
            .entry(session_id.clone())
            .or_insert_with(SessionEntry::new)
            .push(message, self.retention.max_messages_per_session);
        Ok(())
    }

    /// Replace a session's history wholesale
    pub fn set_history(&self, session_id: &SessionId, messages: Vec<Message>) {
        debug!(
            "Replacing history of session {session_id} with {} messages",
            messages.len()
        );
        let mut entry = SessionEntry {
            messages,
            last_touched: Instant::now(),
        };
        entry.truncate_front(self.retention.max_messages_per_session);
        self.sessions.insert(session_id.clone(), entry);
    }

    /// Remove a session; returns whether it existed
    pub fn clear_session(&self, session_id: &SessionId) -> bool {
        let existed = self.sessions.remove(session_id).is_some();
        if existed {
            debug!("Cleared session {session_id}");
        }
        existed
    }

    /// Append a user turn and return the resulting history in one step
    pub fn append_user_turn(
        &self,
        session_id: &SessionId,
        content: impl Into<String>,
    ) -> Result<Vec<Message>> {
        let message = Message::user(content)?;
        let mut entry = self
            .sessions
            .entry(session_id.clone())
            .or_insert_with(SessionEntry::new);
        entry.push(message, self.retention.max_messages_per_session);
        Ok(entry.messages.clone())
    }

    /// Replace the history and append a user turn under a single lock
    ///
    /// No other turn can land between the replacement and the new turn.
    pub fn replace_and_append_user_turn(
        &self,
        session_id: &SessionId,
        history: Vec<Message>,
        content: impl Into<String>,
    ) -> Result<Vec<Message>> {
        let message = Message::user(content)?;
        debug!(
            "Replacing history of session {session_id} with {} messages",
            history.len()
        );
        let mut entry = self
            .sessions
            .entry(session_id.clone())
            .or_insert_with(SessionEntry::new);
        entry.messages = history;
        entry.push(message, self.retention.max_messages_per_session);
        Ok(entry.messages.clone())
    }

    /// Append one turn only if the session still exists
    ///
    /// Returns `false` when the session was cleared or evicted in the meantime;
    /// nothing is stored in that case.
    pub fn append_to_existing(
        &self,
        session_id: &SessionId,
        role: Role,
        content: impl Into<String>,
    ) -> Result<bool> {
        let message = Message::new(role, content)?;
        match self.sessions.get_mut(session_id) {
            Some(mut entry) => {
                entry.push(message, self.retention.max_messages_per_session);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of live sessions
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle for longer than the retention TTL
    ///
    /// Returns the number of sessions removed. Does nothing when idle
    /// eviction is disabled.
    pub fn evict_idle(&self, now: Instant) -> usize {
        let Some(ttl) = self.retention.idle_ttl else {
            return 0;
        };

        let mut evicted = 0;
        self.sessions.retain(|_, entry| {
            let keep = now.saturating_duration_since(entry.last_touched) < ttl;
            if !keep {
                evicted += 1;
            }
            keep
        });

        if evicted > 0 {
            info!(
                "Evicted {evicted} idle sessions, {} remain",
                self.sessions.len()
            );
        }
        evicted
    }
}

/// Periodically evict idle sessions until the task is aborted
pub fn spawn_idle_sweeper(store: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            store.evict_idle(Instant::now());
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sid(raw: &str) -> SessionId {
        SessionId::resolve(Some(raw)).unwrap()
    }

    fn msg(role: Role, content: &str) -> Message {
        Message::new(role, content).unwrap()
    }

    const S: &str = "11111111-2222-3333-4444-555555555555";

    #[test]
    fn test_unknown_session_reads_empty() {
        let store = SessionStore::default();
        assert!(store.get_history(&SessionId::generate()).is_empty());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_read_is_idempotent() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "a").unwrap();
        assert_eq!(store.get_history(&s), store.get_history(&s));
    }

    #[test]
    fn test_accumulation_law() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "a").unwrap();
        store.append_message(&s, Role::Assistant, "b").unwrap();
        assert_eq!(
            store.get_history(&s),
            vec![msg(Role::User, "a"), msg(Role::Assistant, "b")]
        );
    }

    #[test]
    fn test_override_law() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "old question").unwrap();
        store.append_message(&s, Role::Assistant, "old answer").unwrap();

        let m1 = msg(Role::User, "m1");
        let m2 = msg(Role::Assistant, "m2");
        store.set_history(&s, vec![m1.clone(), m2.clone()]);
        store.append_message(&s, Role::User, "q").unwrap();

        assert_eq!(store.get_history(&s), vec![m1, m2, msg(Role::User, "q")]);
    }

    #[test]
    fn test_empty_content_rejected_without_creating_session() {
        let store = SessionStore::default();
        let s = sid(S);
        assert!(store.append_message(&s, Role::User, "").is_err());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_clear_session_forgets_history() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "a").unwrap();
        assert!(store.clear_session(&s));
        assert!(store.get_history(&s).is_empty());
        assert!(!store.clear_session(&s));
    }

    #[test]
    fn test_sessions_are_isolated() {
        let store = SessionStore::default();
        let a = SessionId::generate();
        let b = SessionId::generate();
        store.append_message(&a, Role::User, "for a").unwrap();
        store.append_message(&b, Role::User, "for b").unwrap();
        assert_eq!(store.get_history(&a), vec![msg(Role::User, "for a")]);
        assert_eq!(store.get_history(&b), vec![msg(Role::User, "for b")]);
    }

    #[test]
    fn test_retention_drops_oldest_turns() {
        let store = SessionStore::new(RetentionPolicy {
            max_messages_per_session: 3,
            idle_ttl: None,
        });
        let s = sid(S);
        for i in 0..5 {
            store.append_message(&s, Role::User, format!("q{i}")).unwrap();
        }
        let contents: Vec<String> = store
            .get_history(&s)
            .into_iter()
            .map(|m| m.content)
            .collect();
        assert_eq!(contents, vec!["q2", "q3", "q4"]);
    }

    #[test]
    fn test_set_history_respects_retention() {
        let store = SessionStore::new(RetentionPolicy {
            max_messages_per_session: 2,
            idle_ttl: None,
        });
        let s = sid(S);
        store.set_history(
            &s,
            vec![
                msg(Role::User, "1"),
                msg(Role::Assistant, "2"),
                msg(Role::User, "3"),
            ],
        );
        assert_eq!(
            store.get_history(&s),
            vec![msg(Role::Assistant, "2"), msg(Role::User, "3")]
        );
    }

    #[test]
    fn test_append_user_turn_returns_snapshot() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "a").unwrap();
        store.append_message(&s, Role::Assistant, "b").unwrap();
        let snapshot = store.append_user_turn(&s, "c").unwrap();
        assert_eq!(snapshot.len(), 3);
        assert_eq!(snapshot, store.get_history(&s));
    }

    #[test]
    fn test_append_user_turn_always_appends() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_user_turn(&s, "why?").unwrap();
        let snapshot = store.append_user_turn(&s, "why?").unwrap();
        assert_eq!(
            snapshot,
            vec![msg(Role::User, "why?"), msg(Role::User, "why?")]
        );
    }

    #[test]
    fn test_replace_and_append_keeps_new_turn() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "old").unwrap();

        let snapshot = store
            .replace_and_append_user_turn(&s, vec![msg(Role::User, "q")], "q")
            .unwrap();
        assert_eq!(snapshot, vec![msg(Role::User, "q"), msg(Role::User, "q")]);
        assert_eq!(store.get_history(&s), snapshot);
    }

    #[test]
    fn test_replace_and_append_rejects_empty_turn_without_replacing() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "kept").unwrap();

        assert!(store
            .replace_and_append_user_turn(&s, vec![], " ")
            .is_err());
        assert_eq!(store.get_history(&s), vec![msg(Role::User, "kept")]);
    }

    #[test]
    fn test_append_to_existing_skips_cleared_session() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_user_turn(&s, "q").unwrap();
        assert!(store.append_to_existing(&s, Role::Assistant, "a").unwrap());
        assert_eq!(store.get_history(&s).len(), 2);

        store.clear_session(&s);
        assert!(!store.append_to_existing(&s, Role::Assistant, "late").unwrap());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn test_evict_idle_removes_stale_sessions() {
        let store = SessionStore::new(RetentionPolicy {
            max_messages_per_session: 10,
            idle_ttl: Some(Duration::from_secs(60)),
        });
        let s = sid(S);
        store.append_message(&s, Role::User, "a").unwrap();

        assert_eq!(store.evict_idle(Instant::now()), 0);
        assert_eq!(store.session_count(), 1);

        let later = Instant::now() + Duration::from_secs(61);
        assert_eq!(store.evict_idle(later), 1);
        assert!(store.get_history(&s).is_empty());
    }

    #[test]
    fn test_evict_idle_disabled() {
        let store = SessionStore::new(RetentionPolicy {
            max_messages_per_session: 10,
            idle_ttl: None,
        });
        store
            .append_message(&SessionId::generate(), Role::User, "a")
            .unwrap();
        let far_future = Instant::now() + Duration::from_secs(10 * 365 * 24 * 3600);
        assert_eq!(store.evict_idle(far_future), 0);
    }

    #[test]
    fn test_concurrent_appends_on_one_session_both_land() {
        let store = SessionStore::default();
        let s = sid(S);
        store.append_message(&s, Role::User, "before").unwrap();

        std::thread::scope(|scope| {
            scope.spawn(|| store.append_message(&s, Role::User, "left").unwrap());
            scope.spawn(|| store.append_message(&s, Role::Assistant, "right").unwrap());
        });

        let history = store.get_history(&s);
        assert_eq!(history.len(), 3);
        assert_eq!(history[0], msg(Role::User, "before"));
        assert!(history.contains(&msg(Role::User, "left")));
        assert!(history.contains(&msg(Role::Assistant, "right")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_sweeper_evicts_in_background() {
        let store = Arc::new(SessionStore::new(RetentionPolicy {
            max_messages_per_session: 10,
            idle_ttl: Some(Duration::ZERO),
        }));
        store
            .append_message(&SessionId::generate(), Role::User, "a")
            .unwrap();

        let handle = spawn_idle_sweeper(Arc::clone(&store), Duration::from_secs(1));
        tokio::time::sleep(Duration::from_secs(2)).await;
        handle.abort();

        assert_eq!(store.session_count(), 0);
    }
}
