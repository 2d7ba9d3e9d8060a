//! Reply composition.
//!
//! `ResponseEngine` turns the latest user utterance, the intake profile,
//! and the prior history into the next assistant message. Branch selection
//! is deterministic; the only nondeterminism is the uniform pick inside a
//! phrase pool, driven by an owned seedable RNG so tests can pin output.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use solace_types::chat::{ChatMessage, Sender};
use solace_types::intake::IntakeInfo;

use crate::clock::{Clock, SystemClock};
use crate::responder::branch::Branch;
use crate::responder::pools::{
    BREATHING_STRATEGY, COPING_STRATEGIES, EMPATHIC_RESPONSES, GROUNDING_STRATEGY,
    SUPPORTIVE_PHRASES,
};

/// Scripted reply generator.
///
/// Infallible by construction: unmatched utterances resolve to the
/// generic fallback, and degenerate inputs (empty strings) degrade to the
/// same path. The engine is pure apart from reading the injected clock
/// and advancing its RNG.
pub struct ResponseEngine<C: Clock = SystemClock> {
    rng: StdRng,
    clock: C,
}

impl ResponseEngine<SystemClock> {
    /// Engine with an entropy-seeded RNG and the system clock.
    pub fn new() -> Self {
        Self::with_parts(StdRng::from_entropy(), SystemClock)
    }

    /// Engine with a fixed RNG seed and the system clock.
    ///
    /// Two engines built from the same seed produce identical phrase
    /// picks in the same call order.
    pub fn with_seed(seed: u64) -> Self {
        Self::with_parts(StdRng::seed_from_u64(seed), SystemClock)
    }
}

impl Default for ResponseEngine<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> ResponseEngine<C> {
    /// Engine with explicit RNG and clock (test seam).
    pub fn with_parts(rng: StdRng, clock: C) -> Self {
        Self { rng, clock }
    }

    /// Generate the next assistant message.
    ///
    /// An empty `history` signals "produce the opening message"; the
    /// utterance is ignored in that case. Otherwise the utterance is
    /// dispatched through the branch table. `history` is the conversation
    /// *before* this exchange: the utterance being answered is never part
    /// of it.
    pub fn generate_reply(
        &mut self,
        utterance: &str,
        intake: &IntakeInfo,
        history: &[ChatMessage],
    ) -> ChatMessage {
        let text = if history.is_empty() {
            self.opening(intake)
        } else {
            match Branch::detect(utterance) {
                Some(branch) => {
                    debug!(%branch, "matched response branch");
                    self.branch_reply(branch)
                }
                None => self.fallback(),
            }
        };

        ChatMessage::new(text, Sender::Assistant, self.now())
    }

    /// Current time from the injected clock.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Fixed-template opening: greeting, context acknowledgment,
    /// safe-space framing, open question.
    fn opening(&self, intake: &IntakeInfo) -> String {
        format!(
            "Hello {}, I'm Dr. AI. Thank you for taking this important step in reaching out.\n\n\
             I've read what you shared about feeling {} and your concerns about {}.\n\n\
             This is a safe space where you can express yourself freely. I'm here to listen, \
             understand, and support you through whatever you're experiencing.\n\n\
             How are you feeling right now in this moment?",
            intake.name,
            intake.feelings.to_lowercase(),
            intake.concerns.to_lowercase(),
        )
    }

    fn branch_reply(&mut self, branch: Branch) -> String {
        match branch {
            Branch::Anxiety => {
                let phrase = self.pick(&SUPPORTIVE_PHRASES);
                format!(
                    "{phrase}\n\nAnxiety can feel overwhelming, but there are ways to manage it. {}\
                     \n\nWhat triggers your anxiety the most?",
                    COPING_STRATEGIES[GROUNDING_STRATEGY],
                )
            }
            Branch::Sadness => {
                let phrase = self.pick(&EMPATHIC_RESPONSES);
                format!(
                    "{phrase}\n\nSadness is a natural human emotion, and it's important to \
                     acknowledge it rather than push it away. Sometimes sadness is our mind's way \
                     of processing difficult experiences.\n\nCan you tell me more about what's \
                     been contributing to these feelings?"
                )
            }
            Branch::Anger => format!(
                "I can hear the frustration in your words, and that's completely understandable. \
                 Anger often masks other emotions like hurt, disappointment, or feeling unheard.\
                 \n\n{}\n\nWhat do you think might be underneath the anger?",
                COPING_STRATEGIES[BREATHING_STRATEGY],
            ),
            Branch::Loneliness => "Loneliness can be one of the most painful experiences. Even \
                 when we're surrounded by people, we can still feel deeply alone if we don't feel \
                 truly seen or understood.\n\nYou're not alone in this conversation with me. What \
                 does connection mean to you?"
                .to_string(),
            Branch::HelpSeeking => "I appreciate you asking for guidance. Rather than telling you \
                 what to do, I'd like to help you discover what feels right for you.\n\nWhat \
                 options have you considered? Sometimes talking through the possibilities can \
                 help clarify our own wisdom."
                .to_string(),
            Branch::Improvement => "I'm so glad to hear you're experiencing some positive \
                 moments. That takes strength, especially when you've been struggling.\n\nWhat's \
                 been helping you feel better? It's important to recognize and nurture the things \
                 that support your wellbeing."
                .to_string(),
        }
    }

    /// Generic reply for unmatched utterances: one supportive phrase and
    /// one empathic response, blank-line separated.
    fn fallback(&mut self) -> String {
        let phrase = self.pick(&SUPPORTIVE_PHRASES);
        let empathic = self.pick(&EMPATHIC_RESPONSES);
        format!("{phrase}\n\n{empathic}")
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        // Pools are non-empty constants; the fallback entry is unreachable.
        pool.choose(&mut self.rng).copied().unwrap_or("")
    }
}
