use std::sync::Arc;

use folio_kit::AccessToken;
use platform::{
    AuthProvider, ChatMessage, ContentPart, Models, ObjectStore, TextStream, UploadOptions,
};
use tracing::{debug, info, instrument};

use crate::contract::model::{PdfUpload, PDF_MEDIA_TYPE};
use crate::domain::document::{is_pdf, stored_pdf_name, stored_pdf_path};
use crate::domain::error::DomainError;

pub const PROMPT_REQUIRED: &str = "Prompt is required and must be a string";
pub const NO_FILE: &str = "No file uploaded";
pub const NOT_A_PDF: &str = "Invalid file type. Please upload a PDF file.";

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub pdf_bucket: String,
    pub summary_instruction: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            pdf_bucket: "pdfs".to_string(),
            summary_instruction: crate::config::default_summary_instruction(),
        }
    }
}

/// One-shot generation and the upload-then-summarize pipeline.
#[derive(Clone)]
pub struct Service {
    auth: Arc<dyn AuthProvider>,
    storage: Arc<dyn ObjectStore>,
    models: Models,
    config: ServiceConfig,
}

impl Service {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        storage: Arc<dyn ObjectStore>,
        models: Models,
        config: ServiceConfig,
    ) -> Self {
        Self {
            auth,
            storage,
            models,
            config,
        }
    }

    /// Complete text for `prompt` from the general model. `None` stands for a
    /// prompt that was missing or not a string.
    #[instrument(name = "assistant.service.generate", skip_all, fields(model = %self.models.text.model_id()))]
    pub async fn generate(&self, prompt: Option<&str>) -> Result<String, DomainError> {
        let prompt = prompt
            .filter(|p| !p.is_empty())
            .ok_or_else(|| DomainError::bad_input(PROMPT_REQUIRED))?;

        let text = self
            .models
            .text
            .generate_text(prompt)
            .await
            .map_err(DomainError::inference)?;
        debug!(chars = text.len(), "generation finished");
        Ok(text)
    }

    /// Store the document under the caller's folder, then open a summary stream
    /// on the vision model. The stored copy is not read back.
    #[instrument(name = "assistant.service.analyze_pdf", skip_all)]
    pub async fn analyze_pdf(
        &self,
        token: Option<&AccessToken>,
        upload: Option<PdfUpload>,
    ) -> Result<TextStream, DomainError> {
        let upload = upload.ok_or_else(|| DomainError::bad_input(NO_FILE))?;
        if !is_pdf(&upload.file_name) {
            return Err(DomainError::bad_input(NOT_A_PDF));
        }
        let token = token.ok_or(DomainError::NotAuthenticated)?;

        let user = self
            .auth
            .current_user(token)
            .await
            .map_err(DomainError::remote)?;

        let name = stored_pdf_name(chrono::Utc::now().timestamp_millis(), &upload.file_name);
        let path = stored_pdf_path(&user.id, &name);
        info!(user_id = %user.id, path = %path, size = upload.data.len(), "Uploading document");

        let opts = UploadOptions {
            content_type: PDF_MEDIA_TYPE.to_string(),
            upsert: false,
        };
        self.storage
            .upload(token, &self.config.pdf_bucket, &path, upload.data.clone(), &opts)
            .await
            .map_err(DomainError::upload)?;

        let public_url = self.storage.public_url(&self.config.pdf_bucket, &path);
        debug!(url = %public_url, "document stored");

        let message = ChatMessage::user(vec![
            ContentPart::Text(self.config.summary_instruction.clone()),
            ContentPart::File {
                media_type: PDF_MEDIA_TYPE.to_string(),
                filename: Some(upload.file_name),
                data: upload.data,
            },
        ]);
        let stream = self
            .models
            .vision
            .stream_text(vec![message])
            .await
            .map_err(DomainError::inference)?;

        info!(model = %self.models.vision.model_id(), "summary stream opened");
        Ok(stream)
    }
}
