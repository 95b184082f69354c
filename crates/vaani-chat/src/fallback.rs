//! Canned replies used when the chat provider cannot answer.

use rand::seq::IndexedRandom;

use vaani_core::types::{Message, Role};

/// Shown when no reply could be produced at all.
pub const ERROR_REPLY: &str = "Sorry, I encountered an error. Please try again.";

const GREETING: &str = "Hello! How can I help you today?";

const ENGLISH: &[&str] = &[
    "I understand you're asking about that. Let me help you with that.",
    "That's an interesting question. Here's what I think...",
    "I'd be happy to assist you with that. Let me provide some guidance.",
    "Great question! Here's my response to help you out.",
];

const HINDI: &[&str] = &[
    "मैं आपकी बात समझ गया हूं। मैं आपकी मदद कर सकता हूं।",
    "यह एक दिलचस्प सवाल है। मेरा जवाब यह है...",
    "मैं आपकी मदद करने में खुशी होगी।",
    "बहुत अच्छा सवाल! यहां मेरा जवाब है।",
];

const SPANISH: &[&str] = &[
    "Entiendo tu pregunta. Te puedo ayudar con eso.",
    "Esa es una pregunta interesante. Aquí está mi respuesta...",
    "Estaré encantado de ayudarte con eso.",
    "¡Excelente pregunta! Aquí tienes mi respuesta.",
];

/// Reply set for a language; English when there is none.
pub fn replies_for(language: &str) -> &'static [&'static str] {
    match language {
        "hi" => HINDI,
        "es" => SPANISH,
        _ => ENGLISH,
    }
}

/// Pick a canned reply for the conversation. A conversation that does not
/// end with a user message gets a greeting.
pub fn fallback_reply(messages: &[Message], language: &str) -> String {
    match messages.last() {
        Some(last) if last.role == Role::User => {
            let mut rng = rand::rng();
            replies_for(language)
                .choose(&mut rng)
                .copied()
                .unwrap_or(ERROR_REPLY)
                .to_string()
        }
        _ => GREETING.to_string(),
    }
}
