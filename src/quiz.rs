//! Tiered parsing of quiz questions out of free-form model replies.
//!
//! The text model is asked for a JSON payload but routinely wraps it in
//! prose or markdown fences. Parsing degrades in three tiers: strict JSON,
//! then the substring between the first `{` and the last `}`, then a static
//! pool of canned questions. The tier that produced the result is reported
//! so callers (and tests) can tell real model output from the fallback.

use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

pub const FALLBACK_COUNT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuizSource {
    /// The whole reply was valid JSON.
    Parsed,
    /// JSON was recovered from inside surrounding prose.
    Extracted,
    /// Both parses failed; questions come from the static pool.
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSet {
    pub questions: Vec<QuizQuestion>,
    pub source: QuizSource,
}

#[derive(Debug, Deserialize)]
struct QuizPayload {
    questions: Vec<QuizQuestion>,
}

/// Parse a model reply into quiz questions, degrading through the tiers.
pub fn parse_quiz_response(text: &str) -> QuizSet {
    if let Some(questions) = parse_strict(text) {
        return QuizSet {
            questions,
            source: QuizSource::Parsed,
        };
    }

    if let Some(questions) = extract_embedded(text).and_then(|json| parse_strict(&json)) {
        return QuizSet {
            questions,
            source: QuizSource::Extracted,
        };
    }

    QuizSet {
        questions: fallback_questions(),
        source: QuizSource::Fallback,
    }
}

fn parse_strict(text: &str) -> Option<Vec<QuizQuestion>> {
    let payload: QuizPayload = serde_json::from_str(text).ok()?;
    if payload.questions.is_empty() {
        return None;
    }
    let well_formed = payload
        .questions
        .iter()
        .all(|q| !q.question.trim().is_empty() && !q.options.is_empty());
    well_formed.then_some(payload.questions)
}

/// Slice out the substring between the first `{` and the last `}`.
fn extract_embedded(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

/// Draw `FALLBACK_COUNT` canned questions from the static pool.
pub fn fallback_questions() -> Vec<QuizQuestion> {
    let mut rng = rand::thread_rng();
    let mut pool: Vec<&(&str, [&str; 3])> = FALLBACK_POOL.iter().collect();
    pool.shuffle(&mut rng);

    pool.into_iter()
        .take(FALLBACK_COUNT)
        .map(|(question, options)| QuizQuestion {
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
        })
        .collect()
}

const FALLBACK_POOL: [(&str, [&str; 3]); 8] = [
    (
        "A close friend cancels plans at the last minute. What do you do?",
        [
            "A. Shrug it off and enjoy the free evening",
            "B. Ask them what happened",
            "C. Feel hurt but say nothing",
        ],
    ),
    (
        "You find a wallet full of cash on an empty street. What next?",
        [
            "A. Hand it to the police untouched",
            "B. Try to find the owner yourself",
            "C. Leave it where it was",
        ],
    ),
    (
        "Your team's project is failing a day before the deadline. You...",
        [
            "A. Pull an all-nighter to rescue it",
            "B. Renegotiate the deadline honestly",
            "C. Ship what exists and move on",
        ],
    ),
    (
        "A stranger compliments you in public. How do you react?",
        [
            "A. Thank them warmly and chat",
            "B. Smile politely and keep walking",
            "C. Feel suspicious of their motive",
        ],
    ),
    (
        "You win a free trip leaving tomorrow. What is your first feeling?",
        [
            "A. Pure excitement, start packing",
            "B. Stress about rearranging plans",
            "C. Doubt that it is real",
        ],
    ),
    (
        "When making a big decision, you usually trust...",
        [
            "A. Careful lists of pros and cons",
            "B. Your gut feeling",
            "C. Advice from people you respect",
        ],
    ),
    (
        "An old hobby you abandoned resurfaces. Do you...",
        [
            "A. Pick it up again seriously",
            "B. Dabble for nostalgia's sake",
            "C. Let the past stay past",
        ],
    ),
    (
        "At a party where you know nobody, you tend to...",
        [
            "A. Introduce yourself to everyone",
            "B. Find one person to talk to deeply",
            "C. Leave early",
        ],
    ),
];
