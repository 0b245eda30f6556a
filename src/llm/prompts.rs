// Fixed instructions for contact-field extraction.

use crate::llm::types::DocumentKind;
use crate::record::FieldKey;

const PROMPT_INTRO: &str = "and extract any personal or business information that could be used to fill a form.";

const PROMPT_SCHEMA_HEADER: &str =
    "Please extract and return a JSON object with the following fields (if found):";

const PROMPT_RULES: &str = "Return ONLY a valid JSON object, no additional text or markdown. Use null for fields that cannot be found.";

/// Builds the extraction prompt for a document. The PDF and image variants
/// differ only in how they refer to the document; both request the same
/// schema.
pub fn extraction_prompt(kind: DocumentKind) -> String {
    let subject = match kind {
        DocumentKind::Pdf => "Analyze this PDF document",
        DocumentKind::Image => "Analyze this document image",
    };

    let mut prompt = format!("{} {}\n\n{}\n", subject, PROMPT_INTRO, PROMPT_SCHEMA_HEADER);
    for key in FieldKey::ALL {
        prompt.push_str(&format!("- {}: {}\n", key.as_str(), key.description()));
    }
    prompt.push('\n');
    prompt.push_str(PROMPT_RULES);
    prompt
}
