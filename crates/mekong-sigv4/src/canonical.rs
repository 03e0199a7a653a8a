//! Canonical request construction for AWS Signature Version 4.
//!
//! The canonical request is the deterministic string representation the
//! signature is computed over:
//!
//! ```text
//! HTTPRequestMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! SignedHeaders\n
//! HashedPayload
//! ```
//!
//! Unlike a verifying server, a signing client controls its own header set,
//! so this module expects headers to arrive as lowercase names in sorted
//! order and only normalizes their values.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// The set of characters that must be percent-encoded in URI path segments.
///
/// Per the SigV4 spec, everything except the RFC 3986 unreserved characters
/// (A-Z, a-z, 0-9, `-`, `_`, `.`, `~`) is encoded. Forward slashes between
/// segments are preserved.
const URI_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Build the canonical URI by percent-encoding each path segment.
///
/// The path must be raw (not already percent-encoded); the same encoded form
/// must then be used for the actual request URL, or the store recomputes a
/// different signature.
///
/// # Examples
///
/// ```
/// use mekong_sigv4::build_canonical_uri;
///
/// assert_eq!(build_canonical_uri("/bucket/diagnoses/user_1/17.jpg"),
///            "/bucket/diagnoses/user_1/17.jpg");
/// assert_eq!(build_canonical_uri(""), "/");
/// ```
#[must_use]
pub fn build_canonical_uri(path: &str) -> String {
    if path.is_empty() || path == "/" {
        return "/".to_owned();
    }

    path.split('/')
        .map(|segment| utf8_percent_encode(segment, URI_ENCODE_SET).to_string())
        .collect::<Vec<_>>()
        .join("/")
}

/// Build the canonical headers block from `(lowercase-name, value)` pairs.
///
/// Values are trimmed and internal whitespace runs collapse to a single
/// space. The caller must pass the pairs already sorted by name; the result
/// carries the trailing newline the canonical request format requires.
#[must_use]
pub fn build_canonical_headers(headers: &[(&str, &str)]) -> String {
    let mut out = String::new();
    for (name, value) in headers {
        out.push_str(name);
        out.push(':');
        out.push_str(&collapse_whitespace(value.trim()));
        out.push('\n');
    }
    out
}

/// Build the signed headers list as a semicolon-separated string.
///
/// # Examples
///
/// ```
/// use mekong_sigv4::build_signed_headers_string;
///
/// assert_eq!(
///     build_signed_headers_string(&["content-type", "host", "x-amz-date"]),
///     "content-type;host;x-amz-date"
/// );
/// ```
#[must_use]
pub fn build_signed_headers_string(signed_headers: &[&str]) -> String {
    signed_headers.join(";")
}

/// Assemble the full canonical request.
///
/// `headers` must be sorted by lowercase name and `signed_headers` must list
/// exactly those names in the same order.
#[must_use]
pub fn build_canonical_request(
    method: &str,
    uri: &str,
    query_string: &str,
    headers: &[(&str, &str)],
    signed_headers: &[&str],
    payload_hash: &str,
) -> String {
    let canonical_uri = build_canonical_uri(uri);
    let canonical_headers = build_canonical_headers(headers);
    let signed_headers_str = build_signed_headers_string(signed_headers);

    format!(
        "{method}\n{canonical_uri}\n{query_string}\n{canonical_headers}\n{signed_headers_str}\n{payload_hash}"
    )
}

/// Collapse consecutive whitespace characters to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut prev_was_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_was_space {
                result.push(' ');
                prev_was_space = true;
            }
        } else {
            result.push(ch);
            prev_was_space = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_keep_unreserved_path_unchanged() {
        assert_eq!(
            build_canonical_uri("/mekong-doctor/diagnoses/u1/1700000000000.jpg"),
            "/mekong-doctor/diagnoses/u1/1700000000000.jpg"
        );
    }

    #[test]
    fn test_should_normalize_empty_path_to_slash() {
        assert_eq!(build_canonical_uri(""), "/");
        assert_eq!(build_canonical_uri("/"), "/");
    }

    #[test]
    fn test_should_encode_special_characters_in_path() {
        assert_eq!(build_canonical_uri("/hello world"), "/hello%20world");
        assert_eq!(build_canonical_uri("/a/b:c"), "/a/b%3Ac");
    }

    #[test]
    fn test_should_build_canonical_headers_with_trailing_newline() {
        let headers = [
            ("content-type", "image/jpeg"),
            ("host", "acct.r2.cloudflarestorage.com"),
            ("x-amz-date", "20130524T000000Z"),
        ];
        let result = build_canonical_headers(&headers);
        assert_eq!(
            result,
            "content-type:image/jpeg\n\
             host:acct.r2.cloudflarestorage.com\n\
             x-amz-date:20130524T000000Z\n"
        );
    }

    #[test]
    fn test_should_collapse_whitespace_in_header_values() {
        let headers = [("host", "  example.com  "), ("x-custom", "a   b   c")];
        let result = build_canonical_headers(&headers);
        assert_eq!(result, "host:example.com\nx-custom:a b c\n");
    }

    #[test]
    fn test_should_build_canonical_request_matching_aws_example() {
        use sha2::{Digest, Sha256};

        // AWS test vector: GET /test.txt from examplebucket, 20130524.
        let empty_hash = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let headers = [
            ("host", "examplebucket.s3.amazonaws.com"),
            ("range", "bytes=0-9"),
            ("x-amz-content-sha256", empty_hash),
            ("x-amz-date", "20130524T000000Z"),
        ];
        let signed = ["host", "range", "x-amz-content-sha256", "x-amz-date"];

        let canonical =
            build_canonical_request("GET", "/test.txt", "", &headers, &signed, empty_hash);

        let expected = "GET\n\
                        /test.txt\n\
                        \n\
                        host:examplebucket.s3.amazonaws.com\n\
                        range:bytes=0-9\n\
                        x-amz-content-sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855\n\
                        x-amz-date:20130524T000000Z\n\
                        \n\
                        host;range;x-amz-content-sha256;x-amz-date\n\
                        e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        assert_eq!(canonical, expected);

        // The hash of the canonical request is also published by AWS.
        let hash = hex::encode(Sha256::digest(canonical.as_bytes()));
        assert_eq!(
            hash,
            "7344ae5b7ee6c3e7e6b0fe0640412a37625d1fbfff95c48bbb2dc43964946972"
        );
    }
}
