use bytes::Bytes;

/// Media type sent to storage and to the model for uploaded documents.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// The first part of an analyze request. `file_name` is empty when the
/// part carried no file name.
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub data: Bytes,
}
