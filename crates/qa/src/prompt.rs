/// Fixed persona preamble sent as the system message on every question.
pub const SYSTEM_PROMPT: &str = "You are a Crystal Reports expert assistant. You help users \
understand their reports by analyzing the report metadata and answering questions about report \
structure, data sources, fields, formulas, and relationships. Provide clear, accurate answers \
based only on the metadata provided.";

/// Compose the user message: context block plus the verbatim question.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "Based on the following report metadata, answer the user's question accurately.\n\n\
REPORT METADATA:\n{context}\n\
USER QUESTION: {question}\n\n\
Give a specific answer grounded in the metadata above. If the question cannot be answered \
from the available metadata, say so and explain what information would be needed."
    )
}
