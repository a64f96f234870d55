//! Flashcard generation.
//!
//! - [`prompt`]: the instruction template sent to the model
//! - [`normalizer`]: recovery of a card array from the model's raw reply
//! - [`service`]: one upload in, one list of cards out

pub mod normalizer;
pub mod prompt;
pub mod service;

pub use normalizer::normalize;
pub use prompt::build_prompt;
pub use service::{FlashcardError, FlashcardService};

use serde::{Deserialize, Serialize};

/// A question/answer pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Flashcard {
    /// The question.
    pub front: String,
    /// The answer.
    pub back: String,
}

/// One element of a normalized model reply.
///
/// Elements are not validated: anything that is not exactly a
/// `{front, back}` object of strings is carried as [`CardRecord::Other`]
/// and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CardRecord {
    Card(Flashcard),
    Other(serde_json::Value),
}

impl CardRecord {
    /// The card, if this element is well formed.
    pub fn as_flashcard(&self) -> Option<&Flashcard> {
        match self {
            Self::Card(card) => Some(card),
            Self::Other(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_card_round_trips_as_plain_object() {
        let record = CardRecord::Card(Flashcard {
            front: "Q".into(),
            back: "A".into(),
        });
        assert_eq!(serde_json::to_value(&record).unwrap(), json!({"front": "Q", "back": "A"}));
        assert!(record.as_flashcard().is_some());
    }

    #[test]
    fn test_other_serializes_verbatim() {
        let value = json!({"question": "Q", "answer": "A"});
        let record: CardRecord = serde_json::from_value(value.clone()).unwrap();
        assert!(record.as_flashcard().is_none());
        assert_eq!(serde_json::to_value(&record).unwrap(), value);
    }

    #[test]
    fn test_other_keeps_key_order() {
        let raw = r#"{"front":"Q","back":"A","hint":"h","deck":{"z":1,"a":2}}"#;
        let record: CardRecord = serde_json::from_str(raw).unwrap();
        assert!(matches!(record, CardRecord::Other(_)));
        assert_eq!(serde_json::to_string(&record).unwrap(), raw);
    }
}
