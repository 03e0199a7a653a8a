//! Multipart form data parser for the upload endpoint.
//!
//! Parses `multipart/form-data` bodies into named fields and an optional
//! file payload. Works synchronously on the already-collected body bytes;
//! the uploaded file's declared content type and original file name are
//! surfaced because the key derivation needs the extension and the
//! validator needs the MIME type.

use std::collections::HashMap;

use bytes::Bytes;
use mekong_core::GatewayError;

/// The uploaded file part of a multipart submission.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Raw file bytes.
    pub data: Bytes,
    /// Declared `Content-Type` of the file part, if any.
    pub content_type: Option<String>,
    /// Original file name from `Content-Disposition`, if any.
    pub file_name: Option<String>,
}

/// A parsed multipart form-data submission.
#[derive(Debug)]
pub struct MultipartForm {
    /// Non-file form fields (name → value).
    pub fields: HashMap<String, String>,
    /// The uploaded file, when a file part was present.
    pub file: Option<UploadedFile>,
}

/// Extract the boundary from a `Content-Type: multipart/form-data; boundary=...` header.
///
/// # Errors
///
/// Returns an error if the content type is missing the multipart media type
/// or the boundary parameter.
pub fn extract_boundary(content_type: &str) -> Result<String, GatewayError> {
    if !content_type
        .to_ascii_lowercase()
        .starts_with("multipart/form-data")
    {
        return Err(GatewayError::invalid_input(
            "Expected multipart/form-data request",
        ));
    }

    for part in content_type.split(';') {
        let trimmed = part.trim();
        if let Some(val) = trimmed.strip_prefix("boundary=") {
            let boundary = val.trim_matches('"').to_owned();
            if boundary.is_empty() {
                return Err(GatewayError::invalid_input("Invalid multipart form data"));
            }
            return Ok(boundary);
        }
    }

    Err(GatewayError::invalid_input("Invalid multipart form data"))
}

/// Parse a multipart/form-data body into form fields and an optional file.
///
/// A part named `file`, or any part carrying a `filename` parameter, is
/// treated as the file payload; all other parts become string fields.
///
/// # Errors
///
/// Returns an error if the body does not contain a single well-formed
/// multipart payload.
pub fn parse_multipart(body: &[u8], boundary: &str) -> Result<MultipartForm, GatewayError> {
    let delimiter = format!("--{boundary}");
    let end_delimiter = format!("--{boundary}--");

    let mut fields: HashMap<String, String> = HashMap::new();
    let mut file: Option<UploadedFile> = None;

    let parts = split_multipart_parts(body, delimiter.as_bytes(), end_delimiter.as_bytes());
    if parts.is_empty() {
        return Err(GatewayError::invalid_input("Invalid multipart form data"));
    }

    for part_bytes in parts {
        let Some((headers_section, part_body)) = split_headers_body(part_bytes) else {
            continue;
        };

        let disposition = parse_content_disposition(headers_section);
        let Some(field_name) = disposition.name else {
            continue;
        };

        if field_name == "file" || disposition.filename.is_some() {
            file = Some(UploadedFile {
                data: Bytes::copy_from_slice(part_body),
                content_type: parse_part_content_type(headers_section),
                file_name: disposition.filename,
            });
        } else {
            let value = String::from_utf8_lossy(part_body).into_owned();
            fields.insert(field_name, value);
        }
    }

    Ok(MultipartForm { fields, file })
}

/// Split the multipart body into individual parts by boundary.
fn split_multipart_parts<'a>(
    body: &'a [u8],
    delimiter: &[u8],
    end_delimiter: &[u8],
) -> Vec<&'a [u8]> {
    let mut parts = Vec::new();
    let mut remaining = body;

    // Skip the preamble (everything before the first delimiter).
    if let Some(pos) = find_bytes(remaining, delimiter) {
        remaining = &remaining[pos + delimiter.len()..];
        remaining = skip_crlf(remaining);
    } else {
        return parts;
    }

    loop {
        if remaining.starts_with(end_delimiter)
            || remaining
                .strip_prefix(b"\r\n")
                .is_some_and(|r| r.starts_with(end_delimiter))
        {
            break;
        }

        if let Some(pos) = find_bytes(remaining, delimiter) {
            let part = strip_trailing_crlf(&remaining[..pos]);
            parts.push(part);
            remaining = &remaining[pos + delimiter.len()..];
            remaining = skip_crlf(remaining);
        } else {
            // No more delimiters: the rest is the last part.
            let part = strip_trailing_crlf(remaining);
            if !part.is_empty() {
                parts.push(part);
            }
            break;
        }
    }

    parts
}

/// Split a part into headers section and body at the first `\r\n\r\n`.
fn split_headers_body(part: &[u8]) -> Option<(&[u8], &[u8])> {
    let separator = b"\r\n\r\n";
    find_bytes(part, separator).map(|pos| (&part[..pos], &part[pos + separator.len()..]))
}

/// Parsed Content-Disposition header fields.
struct ContentDisposition {
    name: Option<String>,
    filename: Option<String>,
}

/// Parse the Content-Disposition header out of a part's headers section.
fn parse_content_disposition(headers: &[u8]) -> ContentDisposition {
    let headers_str = String::from_utf8_lossy(headers);
    let mut name = None;
    let mut filename = None;

    for line in headers_str.split("\r\n") {
        if !line
            .to_ascii_lowercase()
            .starts_with("content-disposition:")
        {
            continue;
        }
        if let Some(n) = extract_quoted_param(line, "name") {
            name = Some(n);
        }
        if let Some(f) = extract_quoted_param(line, "filename") {
            filename = Some(f);
        }
    }

    ContentDisposition { name, filename }
}

/// Extract the Content-Type from a part's headers section.
fn parse_part_content_type(headers: &[u8]) -> Option<String> {
    let headers_str = String::from_utf8_lossy(headers);
    for line in headers_str.split("\r\n") {
        let lower = line.to_ascii_lowercase();
        if let Some(rest) = lower.strip_prefix("content-type:") {
            return Some(rest.trim().to_owned());
        }
    }
    None
}

/// Extract a `param="value"` or `param=value` parameter from a header line.
fn extract_quoted_param(header_line: &str, param_name: &str) -> Option<String> {
    let quoted_pattern = format!("{param_name}=\"");
    let unquoted_pattern = format!("{param_name}=");

    let lower_line = header_line.to_ascii_lowercase();

    if let Some(pos) = lower_line.find(&quoted_pattern) {
        let start = pos + quoted_pattern.len();
        let rest = &header_line[start..];
        if let Some(end) = rest.find('"') {
            return Some(rest[..end].to_owned());
        }
    }

    if let Some(pos) = lower_line.find(&unquoted_pattern) {
        let start = pos + unquoted_pattern.len();
        let rest = &header_line[start..];
        let end = rest.find(';').unwrap_or(rest.len());
        let val = rest[..end].trim().to_owned();
        if !val.is_empty() {
            return Some(val);
        }
    }

    None
}

/// Find the position of a needle in a haystack.
fn find_bytes(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

/// Skip leading `\r\n`.
fn skip_crlf(data: &[u8]) -> &[u8] {
    data.strip_prefix(b"\r\n").unwrap_or(data)
}

/// Strip trailing `\r\n`.
fn strip_trailing_crlf(data: &[u8]) -> &[u8] {
    data.strip_suffix(b"\r\n").unwrap_or(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_extract_boundary() {
        let ct = "multipart/form-data; boundary=----WebKitFormBoundary7MA4YWxkTrZu0gW";
        let b = extract_boundary(ct).expect("should extract boundary");
        assert_eq!(b, "----WebKitFormBoundary7MA4YWxkTrZu0gW");
    }

    #[test]
    fn test_should_extract_quoted_boundary() {
        let ct = r#"multipart/form-data; boundary="abc123""#;
        let b = extract_boundary(ct).expect("should extract boundary");
        assert_eq!(b, "abc123");
    }

    #[test]
    fn test_should_reject_non_multipart_content_type() {
        assert!(extract_boundary("application/json").is_err());
    }

    #[test]
    fn test_should_parse_file_with_name_and_content_type() {
        let boundary = "----boundary";
        let body = "------boundary\r\n\
             Content-Disposition: form-data; name=\"userId\"\r\n\
             \r\n\
             spoofed-user\r\n\
             ------boundary\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"leaf spot.JPG\"\r\n\
             Content-Type: image/jpeg\r\n\
             \r\n\
             fake jpeg bytes\r\n\
             ------boundary--\r\n";

        let result = parse_multipart(body.as_bytes(), boundary).expect("should parse");
        assert_eq!(
            result.fields.get("userId").map(String::as_str),
            Some("spoofed-user")
        );

        let file = result.file.expect("file part");
        assert_eq!(file.data.as_ref(), b"fake jpeg bytes");
        assert_eq!(file.content_type.as_deref(), Some("image/jpeg"));
        assert_eq!(file.file_name.as_deref(), Some("leaf spot.JPG"));
    }

    #[test]
    fn test_should_parse_binary_file_content() {
        let boundary = "xyzzy";
        let body = "--xyzzy\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
             Content-Type: image/png\r\n\
             \r\n\
             \x00\x01\x02\x03\r\n\
             --xyzzy--\r\n";

        let result = parse_multipart(body.as_bytes(), boundary).expect("should parse");
        let file = result.file.expect("file part");
        assert_eq!(file.data.as_ref(), b"\x00\x01\x02\x03");
    }

    #[test]
    fn test_should_return_no_file_when_only_fields_present() {
        let boundary = "abc";
        let body = "--abc\r\n\
                     Content-Disposition: form-data; name=\"userId\"\r\n\
                     \r\n\
                     u1\r\n\
                     --abc--\r\n";

        let result = parse_multipart(body.as_bytes(), boundary).expect("should parse");
        assert!(result.file.is_none());
        assert_eq!(result.fields.len(), 1);
    }

    #[test]
    fn test_should_reject_body_without_boundary() {
        let result = parse_multipart(b"not multipart at all", "abc");
        assert!(result.is_err());
    }
}
