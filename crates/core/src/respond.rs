//! Tone-adaptive canned responses.
//!
//! A static table maps each supported emotion label to a fixed list of
//! phrasings; one is chosen uniformly at random per turn. Labels the table
//! doesn't know (the model emits more than four) get a single fallback line.

use rand::Rng;
use rand::seq::SliceRandom;

const JOY: &[&str] = &[
    "Your joy lights up the moment! Keep spreading positivity!",
    "Feeling great, huh? The world shines brighter when you're happy!",
    "Your happiness is inspiring — share the good vibes!",
    "Feeling great? You're the energy boost we all need today!",
    "Ah, I see you're feeling great! Let's keep the positivity alive.",
];

const SADNESS: &[&str] = &[
    "It's okay to feel down — better days are always ahead.",
    "Even in sadness, there's hope for brighter moments. Hang in there.",
    "I'm here to support you through the tough times. Things will improve.",
    "It's okay to feel a little blue; moments like these make the brighter ones shine even more.",
    "Remember, tough times are temporary. Let hope guide you toward brighter moments.",
];

const ANGER: &[&str] = &[
    "Feeling frustrated? Let's pause and take a deep breath together.",
    "Anger can drive change — channel it into something meaningful!",
    "Let your mind cool and reflect — growth often stems from challenges.",
    "I sense you're upset. Let's take a deep breath together.",
    "I can tell you're feeling upset. Let's pause for a moment and breathe deeply together.",
];

const NEUTRAL: &[&str] = &[
    "I sense you're feeling calm — let's keep the peace alive.",
    "Not sure how you're feeling, but I'm here for a meaningful conversation.",
    "You seem neutral — ready for some inspiring dialogue?",
    "It seems like a good day for some thoughtful exploration.",
    "Feeling neutral? Perfect space to spark some curiosity and ideas.",
];

/// Returned verbatim for labels with no table entry.
pub const FALLBACK: &str = "I'm not sure how you're feeling, but I'm here to listen!";

/// Candidate responses for a label (case-insensitive), if the table has it.
pub fn candidates(label: &str) -> Option<&'static [&'static str]> {
    match label.to_lowercase().as_str() {
        "joy" => Some(JOY),
        "sadness" => Some(SADNESS),
        "anger" => Some(ANGER),
        "neutral" => Some(NEUTRAL),
        _ => None,
    }
}

/// Pick a response for `label` using the given random source.
/// Unknown labels get [`FALLBACK`]. No state carries between calls.
pub fn select<R: Rng + ?Sized>(label: &str, rng: &mut R) -> &'static str {
    match candidates(label) {
        // Lists are non-empty consts, so choose never yields None.
        Some(list) => list.choose(rng).copied().unwrap_or(FALLBACK),
        None => FALLBACK,
    }
}

/// Pick a response for `label` with the thread-local RNG.
pub fn pick(label: &str) -> &'static str {
    select(label, &mut rand::thread_rng())
}
