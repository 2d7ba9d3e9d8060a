//! Session service orchestrating conversation lifecycle and persistence.
//!
//! `SessionService` coordinates between live `Conversation` state and the
//! `SessionRepository`: starting sessions, recording exchanges, ending and
//! deleting sessions. The session record is persisted *before* any chat
//! state exists; if that write fails, the service retains nothing and the
//! error surfaces to the caller.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use solace_types::chat::{ChatMessage, ChatSession, SessionStatus};
use solace_types::error::{RepositoryError, SessionError};
use solace_types::intake::IntakeInfo;

use crate::session::conversation::Conversation;
use crate::session::repository::SessionRepository;

/// Orchestrates session lifecycle, live conversation state, and message
/// persistence.
///
/// Generic over `SessionRepository` to maintain clean architecture
/// (solace-core never depends on solace-infra). One exchange at a time
/// per session: a submission that arrives while another is being
/// processed is rejected with `SessionError::ExchangeInProgress`.
pub struct SessionService<R: SessionRepository> {
    repo: R,
    live: DashMap<Uuid, Arc<Mutex<Conversation>>>,
}

impl<R: SessionRepository> SessionService<R> {
    /// Create a new session service with the given repository.
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            live: DashMap::new(),
        }
    }

    /// Access the session repository.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    // --- Session lifecycle ---

    /// Start a session for a user: persist the session record, generate
    /// the opening message, persist it, and register the live
    /// conversation.
    ///
    /// The record is created first; when that fails no chat state is
    /// retained and the failure is returned for display. Returns the
    /// session record and the opening assistant message.
    pub async fn start_session(
        &self,
        user_id: Uuid,
        intake: IntakeInfo,
    ) -> Result<(ChatSession, ChatMessage), SessionError> {
        let mut session = ChatSession::new(user_id, intake.clone(), Utc::now());
        self.repo.create_session(&session).await?;

        let mut conversation = Conversation::new();
        let opening = conversation
            .start(intake)
            .map_err(|e| {
                // A fresh conversation cannot already be active.
                warn!(session_id = %session.id, "conversation start failed: {e}");
                e
            })?
            .clone();

        if let Err(e) = self.repo.save_message(&session.id, &opening).await {
            // Roll back the record so a retry starts clean.
            if let Err(del) = self.repo.delete_session(&session.id).await {
                warn!(session_id = %session.id, "session rollback failed: {del}");
            }
            return Err(e.into());
        }
        session.message_count = 1;

        self.live
            .insert(session.id, Arc::new(Mutex::new(conversation)));
        info!(session_id = %session.id, user_id = %user_id, "session started");

        Ok((session, opening))
    }

    /// Record one exchange on a session: append the user message,
    /// generate and append the reply, persist both, return both.
    ///
    /// If persisting either side fails, the live conversation is dropped
    /// so the next submission rehydrates from the repository; the
    /// in-memory history never outlives what the store has seen.
    pub async fn submit_message(
        &self,
        session_id: &Uuid,
        text: &str,
    ) -> Result<(ChatMessage, ChatMessage), SessionError> {
        let conversation = self.live_conversation(session_id).await?;
        let mut guard = conversation
            .try_lock()
            .map_err(|_| SessionError::ExchangeInProgress)?;

        let (user_msg, reply) = guard.submit_user_message(text)?;

        let saved = match self.repo.save_message(session_id, &user_msg).await {
            Ok(()) => self.repo.save_message(session_id, &reply).await,
            Err(e) => Err(e),
        };
        if let Err(e) = saved {
            warn!(session_id = %session_id, "exchange persistence failed, discarding live state: {e}");
            drop(guard);
            self.live.remove(session_id);
            return Err(e.into());
        }

        Ok((user_msg, reply))
    }

    /// End a session: drop its live state and mark the record `Ended`.
    ///
    /// Ending a session whose record is already gone only logs a warning,
    /// so the operation stays idempotent.
    pub async fn end_session(&self, session_id: &Uuid) -> Result<(), SessionError> {
        self.live.remove(session_id);

        match self.repo.get_session(session_id).await? {
            Some(mut session) => {
                if session.status != SessionStatus::Ended {
                    session.status = SessionStatus::Ended;
                    session.ended_at = Some(Utc::now());
                    self.repo.update_session(&session).await?;
                }
                info!(session_id = %session_id, "session ended");
            }
            None => {
                warn!(session_id = %session_id, "attempted to end non-existent session");
            }
        }
        Ok(())
    }

    /// Reset a session: drop its live state and delete the record along
    /// with every message.
    pub async fn delete_session(&self, session_id: &Uuid) -> Result<(), SessionError> {
        self.live.remove(session_id);
        self.repo.delete_session(session_id).await?;
        info!(session_id = %session_id, "session deleted");
        Ok(())
    }

    // --- Reads ---

    /// Get a session record by ID.
    pub async fn get_session(
        &self,
        session_id: &Uuid,
    ) -> Result<Option<ChatSession>, SessionError> {
        Ok(self.repo.get_session(session_id).await?)
    }

    /// List sessions owned by a user, most recent first.
    pub async fn list_sessions(&self, user_id: &Uuid) -> Result<Vec<ChatSession>, SessionError> {
        Ok(self.repo.list_sessions(user_id).await?)
    }

    /// Get the persisted message history of a session.
    pub async fn get_messages(
        &self,
        session_id: &Uuid,
    ) -> Result<Vec<ChatMessage>, SessionError> {
        Ok(self.repo.get_messages(session_id).await?)
    }

    // --- Internals ---

    /// Fetch the live conversation for a session, rehydrating it from the
    /// repository after a restart.
    async fn live_conversation(
        &self,
        session_id: &Uuid,
    ) -> Result<Arc<Mutex<Conversation>>, SessionError> {
        if let Some(entry) = self.live.get(session_id) {
            return Ok(entry.clone());
        }

        let session = self
            .repo
            .get_session(session_id)
            .await?
            .ok_or(SessionError::NotFound)?;
        if session.status != SessionStatus::Active {
            return Err(SessionError::NotFound);
        }

        let messages = self.repo.get_messages(session_id).await?;
        let conversation = Conversation::resume(session.intake, messages);
        info!(session_id = %session_id, "conversation rehydrated from repository");

        let entry = self
            .live
            .entry(*session_id)
            .or_insert_with(|| Arc::new(Mutex::new(conversation)));
        Ok(entry.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    fn intake() -> IntakeInfo {
        IntakeInfo::new("Sam", "overwhelmed", "work stress", "someone to listen").unwrap()
    }

    /// In-memory repository used to exercise the service without SQLite.
    #[derive(Default)]
    struct InMemoryRepo {
        sessions: StdMutex<HashMap<Uuid, ChatSession>>,
        messages: StdMutex<HashMap<Uuid, Vec<ChatMessage>>>,
    }

    impl SessionRepository for InMemoryRepo {
        async fn create_session(
            &self,
            session: &ChatSession,
        ) -> Result<ChatSession, RepositoryError> {
            self.sessions
                .lock()
                .unwrap()
                .insert(session.id, session.clone());
            Ok(session.clone())
        }

        async fn get_session(
            &self,
            session_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            let mut session = self.sessions.lock().unwrap().get(session_id).cloned();
            if let Some(s) = session.as_mut() {
                s.message_count = self
                    .messages
                    .lock()
                    .unwrap()
                    .get(session_id)
                    .map_or(0, |m| m.len() as u32);
            }
            Ok(session)
        }

        async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
            let mut sessions = self.sessions.lock().unwrap();
            if !sessions.contains_key(&session.id) {
                return Err(RepositoryError::NotFound);
            }
            sessions.insert(session.id, session.clone());
            Ok(())
        }

        async fn list_sessions(
            &self,
            user_id: &Uuid,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            let mut sessions: Vec<ChatSession> = self
                .sessions
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.user_id == *user_id)
                .cloned()
                .collect();
            sessions.sort_by(|a, b| b.started_at.cmp(&a.started_at));
            Ok(sessions)
        }

        async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
            self.sessions.lock().unwrap().remove(session_id);
            self.messages.lock().unwrap().remove(session_id);
            Ok(())
        }

        async fn save_message(
            &self,
            session_id: &Uuid,
            message: &ChatMessage,
        ) -> Result<(), RepositoryError> {
            self.messages
                .lock()
                .unwrap()
                .entry(*session_id)
                .or_default()
                .push(message.clone());
            Ok(())
        }

        async fn get_messages(
            &self,
            session_id: &Uuid,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .get(session_id)
                .cloned()
                .unwrap_or_default())
        }

        async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
            Ok(self
                .messages
                .lock()
                .unwrap()
                .get(session_id)
                .map_or(0, |m| m.len() as u32))
        }
    }

    /// Repository that fails the next `fail_saves` message saves, then
    /// behaves like `InMemoryRepo`.
    #[derive(Default)]
    struct FlakyRepo {
        inner: InMemoryRepo,
        fail_saves: StdMutex<u32>,
    }

    impl FlakyRepo {
        fn fail_next_saves(&self, n: u32) {
            *self.fail_saves.lock().unwrap() = n;
        }
    }

    impl SessionRepository for FlakyRepo {
        async fn create_session(
            &self,
            session: &ChatSession,
        ) -> Result<ChatSession, RepositoryError> {
            self.inner.create_session(session).await
        }

        async fn get_session(
            &self,
            session_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            self.inner.get_session(session_id).await
        }

        async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
            self.inner.update_session(session).await
        }

        async fn list_sessions(
            &self,
            user_id: &Uuid,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            self.inner.list_sessions(user_id).await
        }

        async fn delete_session(&self, session_id: &Uuid) -> Result<(), RepositoryError> {
            self.inner.delete_session(session_id).await
        }

        async fn save_message(
            &self,
            session_id: &Uuid,
            message: &ChatMessage,
        ) -> Result<(), RepositoryError> {
            {
                let mut remaining = self.fail_saves.lock().unwrap();
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(RepositoryError::Connection);
                }
            }
            self.inner.save_message(session_id, message).await
        }

        async fn get_messages(
            &self,
            session_id: &Uuid,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            self.inner.get_messages(session_id).await
        }

        async fn get_message_count(&self, session_id: &Uuid) -> Result<u32, RepositoryError> {
            self.inner.get_message_count(session_id).await
        }
    }

    /// Repository whose session creation always fails.
    struct FailingRepo;

    impl SessionRepository for FailingRepo {
        async fn create_session(
            &self,
            _session: &ChatSession,
        ) -> Result<ChatSession, RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn get_session(
            &self,
            _session_id: &Uuid,
        ) -> Result<Option<ChatSession>, RepositoryError> {
            Ok(None)
        }

        async fn update_session(&self, _session: &ChatSession) -> Result<(), RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn list_sessions(
            &self,
            _user_id: &Uuid,
        ) -> Result<Vec<ChatSession>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn delete_session(&self, _session_id: &Uuid) -> Result<(), RepositoryError> {
            Ok(())
        }

        async fn save_message(
            &self,
            _session_id: &Uuid,
            _message: &ChatMessage,
        ) -> Result<(), RepositoryError> {
            Err(RepositoryError::Connection)
        }

        async fn get_messages(
            &self,
            _session_id: &Uuid,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(Vec::new())
        }

        async fn get_message_count(&self, _session_id: &Uuid) -> Result<u32, RepositoryError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn test_start_session_persists_record_and_opening() {
        let service = SessionService::new(InMemoryRepo::default());
        let user_id = Uuid::now_v7();

        let (session, opening) = service.start_session(user_id, intake()).await.unwrap();
        assert_eq!(session.user_id, user_id);
        assert_eq!(session.status, SessionStatus::Active);
        assert_eq!(session.message_count, 1);
        assert!(opening.text.contains("Sam"));

        let stored = service.get_messages(&session.id).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, opening.id);
    }

    #[tokio::test]
    async fn test_start_session_failure_retains_no_state() {
        let service = SessionService::new(FailingRepo);
        let err = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Repository(RepositoryError::Connection)
        ));
        assert!(service.live.is_empty());
    }

    #[tokio::test]
    async fn test_submit_message_persists_both_sides() {
        let service = SessionService::new(InMemoryRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();

        let (user_msg, reply) = service
            .submit_message(&session.id, "I'm anxious about everything")
            .await
            .unwrap();
        assert_eq!(user_msg.sender, solace_types::chat::Sender::User);
        assert!(reply.text.contains("grounding technique"));

        let stored = service.get_messages(&session.id).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[1].id, user_msg.id);
        assert_eq!(stored[2].id, reply.id);
    }

    #[tokio::test]
    async fn test_submit_to_unknown_session_fails() {
        let service = SessionService::new(InMemoryRepo::default());
        let err = service
            .submit_message(&Uuid::now_v7(), "hello")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFound));
    }

    #[tokio::test]
    async fn test_end_session_is_idempotent_and_blocks_submissions() {
        let service = SessionService::new(InMemoryRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();

        service.end_session(&session.id).await.unwrap();
        service.end_session(&session.id).await.unwrap();

        let stored = service.get_session(&session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, SessionStatus::Ended);
        assert!(stored.ended_at.is_some());

        let err = service
            .submit_message(&session.id, "anyone there?")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_session_discards_everything() {
        let service = SessionService::new(InMemoryRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();
        service.submit_message(&session.id, "hello").await.unwrap();

        service.delete_session(&session.id).await.unwrap();
        assert!(service.get_session(&session.id).await.unwrap().is_none());
        assert!(service.get_messages(&session.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_save_discards_live_state() {
        let service = SessionService::new(FlakyRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();

        service.repo().fail_next_saves(1);
        let err = service
            .submit_message(&session.id, "hello")
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SessionError::Repository(RepositoryError::Connection)
        ));

        // The live entry is gone; the store still holds only the opening.
        assert!(!service.live.contains_key(&session.id));
        assert_eq!(service.get_messages(&session.id).await.unwrap().len(), 1);

        // A retry rehydrates from the repository; persisted and live
        // histories stay in step afterwards.
        service
            .submit_message(&session.id, "hello again")
            .await
            .unwrap();
        let stored = service.get_messages(&session.id).await.unwrap();
        assert_eq!(stored.len(), 3);

        let conversation = service.live.get(&session.id).unwrap().clone();
        let live_len = conversation.lock().await.messages().len();
        assert_eq!(stored.len(), live_len);
    }

    #[tokio::test]
    async fn test_overlapping_submission_is_rejected() {
        let service = SessionService::new(InMemoryRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();

        // Hold the per-session lock the way an in-flight exchange would.
        let conversation = service.live.get(&session.id).unwrap().clone();
        let _guard = conversation.lock().await;

        let err = service
            .submit_message(&session.id, "second submission")
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::ExchangeInProgress));
    }

    #[tokio::test]
    async fn test_rehydrates_active_session_after_restart() {
        let service = SessionService::new(InMemoryRepo::default());
        let (session, _) = service
            .start_session(Uuid::now_v7(), intake())
            .await
            .unwrap();

        // Simulate a restart: live state gone, repository intact.
        service.live.clear();

        let (_, reply) = service
            .submit_message(&session.id, "I feel anxious again")
            .await
            .unwrap();
        assert!(reply.text.contains("grounding technique"));

        let stored = service.get_messages(&session.id).await.unwrap();
        assert_eq!(stored.len(), 3);
    }

    #[tokio::test]
    async fn test_list_sessions_is_scoped_to_user() {
        let service = SessionService::new(InMemoryRepo::default());
        let alice = Uuid::now_v7();
        let bob = Uuid::now_v7();
        service.start_session(alice, intake()).await.unwrap();
        service.start_session(alice, intake()).await.unwrap();
        service.start_session(bob, intake()).await.unwrap();

        assert_eq!(service.list_sessions(&alice).await.unwrap().len(), 2);
        assert_eq!(service.list_sessions(&bob).await.unwrap().len(), 1);
    }
}
