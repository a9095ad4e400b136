use serde::{Deserialize, Serialize};

/// Configuration for the assistant module
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    #[serde(default = "default_pdf_bucket")]
    pub pdf_bucket: String,
    /// Instruction sent ahead of the document.
    #[serde(default = "default_summary_instruction")]
    pub summary_instruction: String,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            pdf_bucket: default_pdf_bucket(),
            summary_instruction: default_summary_instruction(),
        }
    }
}

fn default_pdf_bucket() -> String {
    "pdfs".to_string()
}

pub(crate) fn default_summary_instruction() -> String {
    "Please analyze the PDF and provide a broad summary of its contents. \
     Focus on the main points, key findings, and any important conclusions. \
     Categorize the content into sections and provide a summary of each section. \
     Return the summary directly. Use markdown formatting."
        .to_string()
}
