//! In-memory state holder for one conversation.
//!
//! Owns the intake profile and the append-only message history for a
//! single session, and drives the response engine for each exchange.
//! Mutated only in strict request/response pairs by its caller; there is
//! no shared state across conversations.

use solace_types::chat::{ChatMessage, Sender};
use solace_types::error::SessionError;
use solace_types::intake::IntakeInfo;

use crate::clock::{Clock, SystemClock};
use crate::responder::ResponseEngine;

/// Per-session state machine: `Uninitialized -> Active -> Uninitialized`.
enum State {
    Uninitialized,
    Active {
        intake: IntakeInfo,
        messages: Vec<ChatMessage>,
    },
}

/// One session's conversation state.
///
/// History invariants: insertion order is chronological order; entries
/// are never reordered or mutated in place; the history grows by exactly
/// two messages per submission and is discarded on [`reset`].
///
/// [`reset`]: Conversation::reset
pub struct Conversation<C: Clock = SystemClock> {
    engine: ResponseEngine<C>,
    state: State,
}

impl Conversation<SystemClock> {
    pub fn new() -> Self {
        Self::with_engine(ResponseEngine::new())
    }

    /// Rebuild an active conversation from a persisted intake and
    /// history, e.g. after a process restart. The history is adopted
    /// verbatim; an empty one behaves like a freshly started session
    /// minus the opening message.
    pub fn resume(intake: IntakeInfo, messages: Vec<ChatMessage>) -> Self {
        Self {
            engine: ResponseEngine::new(),
            state: State::Active { intake, messages },
        }
    }
}

impl Default for Conversation<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Conversation<C> {
    /// Build a conversation around an explicit engine (test seam).
    pub fn with_engine(engine: ResponseEngine<C>) -> Self {
        Self {
            engine,
            state: State::Uninitialized,
        }
    }

    /// Begin the session: the history is initialized to exactly one
    /// assistant opening message, generated with an empty utterance and
    /// empty history.
    ///
    /// Starting an already-active conversation is rejected; call
    /// [`reset`](Conversation::reset) first.
    pub fn start(&mut self, intake: IntakeInfo) -> Result<&ChatMessage, SessionError> {
        if matches!(self.state, State::Active { .. }) {
            return Err(SessionError::AlreadyActive);
        }

        let opening = self.engine.generate_reply("", &intake, &[]);
        self.state = State::Active {
            intake,
            messages: vec![opening],
        };

        match &self.state {
            State::Active { messages, .. } => Ok(&messages[0]),
            State::Uninitialized => unreachable!("state was just set to Active"),
        }
    }

    /// Record one exchange: append the user message, generate the reply,
    /// append it, and return both in order.
    ///
    /// The reply is generated against the history as it stood *before*
    /// the user message was appended; the engine sees the new utterance
    /// only through its `utterance` argument. Text is appended verbatim --
    /// blank-input rejection is the caller's responsibility.
    pub fn submit_user_message(
        &mut self,
        text: &str,
    ) -> Result<(ChatMessage, ChatMessage), SessionError> {
        let State::Active { intake, messages } = &mut self.state else {
            return Err(SessionError::NotActive);
        };

        let user_msg = ChatMessage::new(text, Sender::User, self.engine.now());
        let reply = self.engine.generate_reply(text, intake, messages);

        messages.push(user_msg.clone());
        messages.push(reply.clone());

        Ok((user_msg, reply))
    }

    /// Discard intake and history entirely. Idempotent; a subsequent
    /// [`start`](Conversation::start) begins a fresh session.
    pub fn reset(&mut self) {
        self.state = State::Uninitialized;
    }

    /// The ordered message history (empty when uninitialized).
    pub fn messages(&self) -> &[ChatMessage] {
        match &self.state {
            State::Active { messages, .. } => messages,
            State::Uninitialized => &[],
        }
    }

    /// The session's intake profile, if the session is active.
    pub fn intake(&self) -> Option<&IntakeInfo> {
        match &self.state {
            State::Active { intake, .. } => Some(intake),
            State::Uninitialized => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, State::Active { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn intake() -> IntakeInfo {
        IntakeInfo::new("Sam", "overwhelmed", "work stress", "someone to listen").unwrap()
    }

    fn started() -> Conversation {
        let mut convo = Conversation::with_engine(ResponseEngine::with_seed(11));
        convo.start(intake()).unwrap();
        convo
    }

    #[test]
    fn test_start_yields_single_assistant_opening() {
        let convo = started();
        let messages = convo.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::Assistant);
        assert!(messages[0].text.contains("Sam"));
    }

    #[test]
    fn test_start_twice_is_rejected() {
        let mut convo = started();
        let err = convo.start(intake()).unwrap_err();
        assert!(matches!(err, SessionError::AlreadyActive));
        // The original history survives the rejected start.
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn test_submit_appends_exactly_two_preserving_order() {
        let mut convo = started();
        let opening = convo.messages()[0].clone();

        let (user_msg, reply) = convo.submit_user_message("hello there").unwrap();
        let messages = convo.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0], opening);
        assert_eq!(messages[1], user_msg);
        assert_eq!(messages[2], reply);
        assert_eq!(user_msg.sender, Sender::User);
        assert_eq!(reply.sender, Sender::Assistant);

        convo.submit_user_message("still here").unwrap();
        assert_eq!(convo.messages().len(), 5);
        assert_eq!(convo.messages()[0], opening);
    }

    #[test]
    fn test_submit_before_start_is_rejected() {
        let mut convo = Conversation::with_engine(ResponseEngine::with_seed(11));
        let err = convo.submit_user_message("hello").unwrap_err();
        assert!(matches!(err, SessionError::NotActive));
    }

    #[test]
    fn test_reply_is_generated_not_opening() {
        // After start, the history is non-empty, so the next reply must
        // never be the opening template again.
        let mut convo = started();
        let (_, reply) = convo.submit_user_message("just checking in").unwrap();
        assert!(!reply.text.contains("I'm Dr. AI"));
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut convo = started();
        convo.reset();
        assert!(!convo.is_active());
        assert!(convo.messages().is_empty());
        assert!(convo.intake().is_none());

        convo.reset();
        assert!(!convo.is_active());
        assert!(convo.messages().is_empty());

        // A fresh start works after reset.
        convo.start(intake()).unwrap();
        assert_eq!(convo.messages().len(), 1);
    }

    #[test]
    fn test_resume_adopts_persisted_history() {
        let mut original = started();
        original.submit_user_message("hello").unwrap();
        let history = original.messages().to_vec();

        let mut resumed = Conversation::resume(intake(), history.clone());
        assert!(resumed.is_active());
        assert_eq!(resumed.messages(), history.as_slice());

        resumed.submit_user_message("still here").unwrap();
        assert_eq!(resumed.messages().len(), 5);
    }

    #[test]
    fn test_end_to_end_intake_scenario() {
        let mut convo = started();
        let opening = &convo.messages()[0];
        assert!(opening.text.contains("Sam"));
        assert!(opening.text.contains("overwhelmed"));
        assert!(opening.text.contains("work stress"));

        let (_, reply) = convo
            .submit_user_message("I'm so anxious about my deadline")
            .unwrap();
        assert!(reply.text.contains("5-4-3-2-1 grounding technique"));
        assert!(reply.text.ends_with("What triggers your anxiety the most?"));
    }
}
