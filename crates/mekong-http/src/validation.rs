//! Upload validation.
//!
//! Rejects unacceptable uploads before any cryptographic or network work:
//! presence, then size, then MIME type, in that order. The validator runs
//! strictly before the signature engine, so rejected input never produces a
//! partial upload.

use mekong_core::GatewayError;

use crate::multipart::UploadedFile;

/// MIME types accepted for upload.
pub const ALLOWED_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

/// Validate an uploaded file against the size ceiling and MIME allow-list.
///
/// # Errors
///
/// Returns [`GatewayError::InvalidInput`] with one of three fixed messages:
/// `"No file provided"`, `"File exceeds size limit (10MB)"`, or
/// `"Invalid file type"`.
pub fn validate_upload(file: Option<&UploadedFile>, max_bytes: usize) -> Result<(), GatewayError> {
    let Some(file) = file else {
        return Err(GatewayError::invalid_input("No file provided"));
    };
    if file.data.is_empty() {
        return Err(GatewayError::invalid_input("No file provided"));
    }

    if file.data.len() > max_bytes {
        return Err(GatewayError::invalid_input("File exceeds size limit (10MB)"));
    }

    let declared = file
        .content_type
        .as_deref()
        .ok_or_else(|| GatewayError::invalid_input("Invalid file type"))?;
    if !is_allowed_mime(declared) {
        return Err(GatewayError::invalid_input("Invalid file type"));
    }

    Ok(())
}

/// Check a declared content type against the allow-list.
///
/// Parameters (e.g. `; charset=...`) are ignored; only the essence is
/// compared.
fn is_allowed_mime(declared: &str) -> bool {
    declared
        .parse::<mime::Mime>()
        .ok()
        .is_some_and(|m| ALLOWED_MIME_TYPES.contains(&m.essence_str()))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;

    const MAX: usize = 10 * 1024 * 1024;

    fn file(data: &'static [u8], content_type: Option<&str>) -> UploadedFile {
        UploadedFile {
            data: Bytes::from_static(data),
            content_type: content_type.map(ToOwned::to_owned),
            file_name: Some("leaf.jpg".to_owned()),
        }
    }

    #[test]
    fn test_should_accept_small_jpeg() {
        let f = file(b"jpeg bytes", Some("image/jpeg"));
        assert!(validate_upload(Some(&f), MAX).is_ok());
    }

    #[test]
    fn test_should_accept_every_allowed_type() {
        for mime_type in ALLOWED_MIME_TYPES {
            let f = file(b"bytes", Some(mime_type));
            assert!(validate_upload(Some(&f), MAX).is_ok(), "{mime_type}");
        }
    }

    #[test]
    fn test_should_reject_missing_file() {
        let err = validate_upload(None, MAX).unwrap_err();
        assert_eq!(err.client_message(), "No file provided");
    }

    #[test]
    fn test_should_reject_empty_file() {
        let f = file(b"", Some("image/jpeg"));
        let err = validate_upload(Some(&f), MAX).unwrap_err();
        assert_eq!(err.client_message(), "No file provided");
    }

    #[test]
    fn test_should_reject_oversized_file() {
        let big = vec![0u8; MAX + 1];
        let f = UploadedFile {
            data: Bytes::from(big),
            content_type: Some("image/png".to_owned()),
            file_name: None,
        };
        let err = validate_upload(Some(&f), MAX).unwrap_err();
        assert_eq!(err.client_message(), "File exceeds size limit (10MB)");
    }

    #[test]
    fn test_should_reject_disallowed_mime_type() {
        for declared in ["application/pdf", "text/html", "image/svg+xml", "video/mp4"] {
            let f = file(b"bytes", Some(declared));
            let err = validate_upload(Some(&f), MAX).unwrap_err();
            assert_eq!(err.client_message(), "Invalid file type", "{declared}");
        }
    }

    #[test]
    fn test_should_reject_missing_content_type() {
        let f = file(b"bytes", None);
        let err = validate_upload(Some(&f), MAX).unwrap_err();
        assert_eq!(err.client_message(), "Invalid file type");
    }

    #[test]
    fn test_should_ignore_mime_parameters() {
        let f = file(b"bytes", Some("image/jpeg; charset=binary"));
        assert!(validate_upload(Some(&f), MAX).is_ok());
    }

    #[test]
    fn test_should_check_size_before_mime_type() {
        // An oversized file with a bad MIME type reports the size error:
        // checks run in presence -> size -> type order.
        let big = vec![0u8; MAX + 1];
        let f = UploadedFile {
            data: Bytes::from(big),
            content_type: Some("application/pdf".to_owned()),
            file_name: None,
        };
        let err = validate_upload(Some(&f), MAX).unwrap_err();
        assert_eq!(err.client_message(), "File exceeds size limit (10MB)");
    }
}
