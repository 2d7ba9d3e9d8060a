//! Static phrase pools.
//!
//! Configuration data, not derived at runtime: three pools of five
//! interchangeable phrases each. Branches either pick a uniformly random
//! entry or reference a fixed entry by index (the grounding and breathing
//! strategies).

/// Openers that validate what the user shared.
pub const SUPPORTIVE_PHRASES: [&str; 5] = [
    "I hear you, and what you're feeling is completely valid.",
    "Thank you for sharing that with me. It takes courage to open up.",
    "I can sense the weight of what you're carrying.",
    "Your feelings matter, and I'm here to listen without judgment.",
    "That sounds really challenging. How are you coping with all of this?",
];

/// Concrete techniques a branch can suggest.
pub const COPING_STRATEGIES: [&str; 5] = [
    "When you're feeling overwhelmed, try the 5-4-3-2-1 grounding technique: name 5 things you can see, 4 you can touch, 3 you can hear, 2 you can smell, and 1 you can taste.",
    "Deep breathing can be really helpful. Try breathing in for 4 counts, holding for 4, and exhaling for 6.",
    "Consider keeping a journal to track your thoughts and feelings. Sometimes writing things down can help us process them better.",
    "Remember that it's okay to take things one day at a time, or even one moment at a time.",
    "Self-care isn't selfish. Make sure you're taking care of your basic needs - sleep, nutrition, and gentle movement.",
];

/// Reflective follow-ups that invite the user to keep talking.
pub const EMPATHIC_RESPONSES: [&str; 5] = [
    "It sounds like you've been carrying a lot. How long have you been feeling this way?",
    "I can imagine how difficult this must be for you. What has been the hardest part?",
    "Thank you for trusting me with this. What would feel most helpful right now?",
    "That must feel really isolating. Have you been able to talk to anyone else about this?",
    "It's understandable that you'd feel that way given what you've been through.",
];

/// Index into [`COPING_STRATEGIES`] for the anxiety branch.
pub const GROUNDING_STRATEGY: usize = 0;

/// Index into [`COPING_STRATEGIES`] for the anger branch.
pub const BREATHING_STRATEGY: usize = 1;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pools_are_five_entries_of_nonempty_text() {
        for pool in [&SUPPORTIVE_PHRASES, &COPING_STRATEGIES, &EMPATHIC_RESPONSES] {
            assert_eq!(pool.len(), 5);
            assert!(pool.iter().all(|p| !p.is_empty()));
        }
    }

    #[test]
    fn test_fixed_strategy_indices() {
        assert!(COPING_STRATEGIES[GROUNDING_STRATEGY].contains("5-4-3-2-1"));
        assert!(COPING_STRATEGIES[BREATHING_STRATEGY].contains("breathing in for 4 counts"));
    }
}
