use crate::dictionary::Translations;

const REFERENCE_NOTE: &str = "Use the dictionary below as a reference, but if a translation is not found, please use your own resources to translate each word.";
const OUTPUT_NOTE: &str = "Only include the text of the translation in your output.";

/// Translation request for one submission.
///
/// The message is kept apart from the instruction so the completion client can
/// send it as its own chat message instead of splicing it into the instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    language: String,
    message: String,
    reference: String,
}

impl Prompt {
    pub fn message(&self) -> &str {
        &self.message
    }

    /// System instruction: target language plus the reference dictionary.
    pub fn instruction(&self) -> String {
        format!(
            "Translate the user's message into {}.\n{}\n{}\n{}",
            self.language, REFERENCE_NOTE, self.reference, OUTPUT_NOTE
        )
    }

    /// Single-string rendering with the message inlined, used for logging.
    pub fn text(&self) -> String {
        format!(
            "Translate the following phrase into {}: \"{}\"\n{}\n{}\n{}",
            self.language, self.message, REFERENCE_NOTE, self.reference, OUTPUT_NOTE
        )
    }
}

/// Never fails; a missing entry is rendered as `undefined`.
pub fn build_prompt(message: &str, language: &str, reference: Option<&Translations>) -> Prompt {
    let reference = match reference {
        // a map of strings always serializes
        Some(map) => serde_json::to_string(map).unwrap_or_else(|_| "undefined".to_string()),
        None => "undefined".to_string(),
    };
    Prompt {
        language: language.to_string(),
        message: message.to_string(),
        reference,
    }
}
