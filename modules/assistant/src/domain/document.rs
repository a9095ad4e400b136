/// `true` when the name ends in `.pdf`, ignoring case.
pub fn is_pdf(file_name: &str) -> bool {
    file_name.to_ascii_lowercase().ends_with(".pdf")
}

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
pub fn sanitize_file_name(file_name: &str) -> String {
    file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Object name for a stored document: millisecond timestamp, dash, sanitized name.
pub fn stored_pdf_name(timestamp_millis: i64, file_name: &str) -> String {
    format!("{timestamp_millis}-{}", sanitize_file_name(file_name))
}

/// Object path inside the document bucket.
pub fn stored_pdf_path(user_id: &str, stored_name: &str) -> String {
    format!("{user_id}/{stored_name}")
}
