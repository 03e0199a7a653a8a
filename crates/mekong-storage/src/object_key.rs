//! Object key generation.
//!
//! Keys are derived exclusively from the authenticated subject, the upload
//! timestamp, and a sanitized file extension. No client-supplied path
//! component ever reaches the key, which rules out traversal into another
//! caller's namespace.

use std::fmt;

use mekong_core::SubjectId;

/// Extension used when the original file name yields nothing usable.
const DEFAULT_EXTENSION: &str = "jpg";

/// A generated object-store key of the form
/// `diagnoses/{subject}/{unix_millis}.{extension}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectKey(String);

impl ObjectKey {
    /// Prefix under which all diagnosis uploads are stored.
    pub const PREFIX: &str = "diagnoses";

    /// Generate the key for an upload.
    ///
    /// The extension is taken from the original file name, lowercased and
    /// stripped to ASCII alphanumerics, falling back to `jpg`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mekong_core::SubjectId;
    /// use mekong_storage::ObjectKey;
    ///
    /// let subject = SubjectId::new("user_1").unwrap();
    /// let key = ObjectKey::generate(&subject, "rice paddy.PNG", 1_700_000_000_000);
    /// assert_eq!(key.as_str(), "diagnoses/user_1/1700000000000.png");
    /// ```
    #[must_use]
    pub fn generate(subject: &SubjectId, original_file_name: &str, unix_millis: i64) -> Self {
        let extension = sanitize_extension(original_file_name);
        Self(format!(
            "{}/{}/{unix_millis}.{extension}",
            Self::PREFIX,
            subject.as_str()
        ))
    }

    /// Get the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extract a safe extension from the original file name.
fn sanitize_extension(file_name: &str) -> String {
    let Some((stem, ext)) = file_name.rsplit_once('.') else {
        return DEFAULT_EXTENSION.to_owned();
    };
    if stem.is_empty() {
        // ".jpg" and similar dotfiles carry no real extension.
        return DEFAULT_EXTENSION.to_owned();
    }

    let cleaned: String = ext
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect();

    if cleaned.is_empty() {
        DEFAULT_EXTENSION.to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> SubjectId {
        SubjectId::new("user_2abc").expect("valid subject")
    }

    #[test]
    fn test_should_namespace_key_under_subject() {
        let key = ObjectKey::generate(&subject(), "leaf.jpg", 1_700_000_000_000);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1700000000000.jpg");
        assert!(key.as_str().starts_with("diagnoses/user_2abc/"));
    }

    #[test]
    fn test_should_lowercase_extension() {
        let key = ObjectKey::generate(&subject(), "IMG_0042.JPEG", 1);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1.jpeg");
    }

    #[test]
    fn test_should_default_extension_when_name_has_none() {
        let key = ObjectKey::generate(&subject(), "photo", 1);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1.jpg");
    }

    #[test]
    fn test_should_default_extension_for_dotfile_name() {
        let key = ObjectKey::generate(&subject(), ".png", 1);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1.jpg");
    }

    #[test]
    fn test_should_strip_non_alphanumeric_extension_characters() {
        let key = ObjectKey::generate(&subject(), "evil.p/n?g", 1);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1.png");
    }

    #[test]
    fn test_should_ignore_traversal_attempts_in_file_name() {
        // The file name only ever contributes an extension; path components
        // and parent references cannot reach the key.
        let key = ObjectKey::generate(&subject(), "../../other-user/secret.png", 1);
        assert_eq!(key.as_str(), "diagnoses/user_2abc/1.png");
    }
}
