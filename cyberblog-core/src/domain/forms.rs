//! Form validation
//!
//! Each form is a plain data holder filled from submitted fields plus a
//! `validate` method that reports field-level messages. Checks that need the
//! database (username uniqueness) live in the services.

use std::collections::{BTreeMap, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use super::thought::MAX_THOUGHT_LENGTH;

const REQUIRED: &str = "This field is required.";

pub const USERNAME_MAX_LENGTH: usize = 150;
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Ratio at or above which a password counts as too similar to the username
const SIMILARITY_THRESHOLD: f64 = 0.7;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\w.@+-]+$").expect("username pattern is valid"));

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid")
});

/// Passwords rejected outright, compared case-insensitively
const COMMON_PASSWORDS: &[&str] = &[
    "123456", "12345678", "123456789", "1234567890", "password", "password1",
    "password123", "qwerty", "qwerty123", "qwertyuiop", "abc123", "abcd1234",
    "111111", "11111111", "000000", "00000000", "iloveyou", "letmein",
    "welcome", "welcome1", "monkey", "dragon", "football", "baseball",
    "sunshine", "princess", "trustno1", "superman", "starwars", "whatever",
    "passw0rd", "p@ssw0rd", "admin", "admin123", "administrator", "changeme",
    "secret", "master", "login", "hello123", "1q2w3e4r", "zaq12wsx",
];

// ============================================================================
// Errors and outcomes
// ============================================================================

/// Field-level and form-level validation messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
    non_field: Vec<String>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn add_non_field(&mut self, message: impl Into<String>) {
        self.non_field.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.non_field.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn field(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn non_field(&self) -> &[String] {
        &self.non_field
    }
}

/// Outcome of submitting a form that writes something
#[derive(Debug)]
pub enum Submission<T> {
    Accepted(T),
    Rejected(FormErrors),
}

impl<T> Submission<T> {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Submission::Accepted(_))
    }
}

fn field(fields: &HashMap<String, String>, name: &str) -> String {
    fields.get(name).cloned().unwrap_or_default()
}

// ============================================================================
// Registration
// ============================================================================

/// New-account form: username, email and a password typed twice
#[derive(Debug, Clone, Default, Serialize)]
pub struct RegistrationForm {
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password1: String,
    #[serde(skip_serializing)]
    pub password2: String,
}

impl RegistrationForm {
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            username: field(fields, "username").trim().to_string(),
            email: field(fields, "email").trim().to_string(),
            password1: field(fields, "password1"),
            password2: field(fields, "password2"),
        }
    }

    /// Check every rule that does not need the database
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();

        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        } else if self.username.chars().count() > USERNAME_MAX_LENGTH {
            errors.add(
                "username",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    USERNAME_MAX_LENGTH,
                    self.username.chars().count()
                ),
            );
        } else if !USERNAME_RE.is_match(&self.username) {
            errors.add(
                "username",
                "Enter a valid username. This value may contain only letters, \
                 numbers, and @/./+/-/_ characters.",
            );
        }

        if self.email.is_empty() {
            errors.add("email", REQUIRED);
        } else if !EMAIL_RE.is_match(&self.email) {
            errors.add("email", "Enter a valid email address.");
        }

        if self.password1.is_empty() {
            errors.add("password1", REQUIRED);
        }
        if self.password2.is_empty() {
            errors.add("password2", REQUIRED);
        }

        if !self.password1.is_empty() && !self.password2.is_empty() {
            if self.password1 != self.password2 {
                errors.add("password2", "The two password fields didn't match.");
            } else {
                for message in password_problems(&self.password1, &self.username, &self.email) {
                    errors.add("password2", message);
                }
            }
        }

        errors
    }
}

/// Run the password rules, returning one message per broken rule
pub fn password_problems(password: &str, username: &str, email: &str) -> Vec<String> {
    let mut problems = Vec::new();

    if is_too_similar(password, username) {
        problems.push("The password is too similar to the username.".to_string());
    } else if is_too_similar(password, email_local_part(email)) {
        problems.push("The password is too similar to the email address.".to_string());
    }

    if password.chars().count() < PASSWORD_MIN_LENGTH {
        problems.push(format!(
            "This password is too short. It must contain at least {} characters.",
            PASSWORD_MIN_LENGTH
        ));
    }

    let lowered = password.trim().to_lowercase();
    if COMMON_PASSWORDS.contains(&lowered.as_str()) {
        problems.push("This password is too common.".to_string());
    }

    if !password.is_empty() && password.chars().all(|c| c.is_ascii_digit()) {
        problems.push("This password is entirely numeric.".to_string());
    }

    problems
}

fn email_local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or("")
}

fn is_too_similar(password: &str, attribute: &str) -> bool {
    if attribute.chars().count() < 3 {
        return false;
    }
    let password = password.to_lowercase();
    let attribute = attribute.to_lowercase();
    if password.contains(&attribute) || attribute.contains(&password) {
        return true;
    }
    similarity_ratio(&password, &attribute) >= SIMILARITY_THRESHOLD
}

/// 2 * common-subsequence length / total length, in [0, 1]
fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }

    let mut prev = vec![0usize; b.len() + 1];
    for ca in &a {
        let mut cur = vec![0usize; b.len() + 1];
        for (j, cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        prev = cur;
    }

    2.0 * prev[b.len()] as f64 / (a.len() + b.len()) as f64
}

// ============================================================================
// Login
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct LoginForm {
    pub username: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl LoginForm {
    pub const INVALID_LOGIN: &'static str = "Please enter a correct username and password. \
         Note that both fields may be case-sensitive.";

    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self {
            username: field(fields, "username").trim().to_string(),
            password: field(fields, "password"),
        }
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        if self.username.is_empty() {
            errors.add("username", REQUIRED);
        }
        if self.password.is_empty() {
            errors.add("password", REQUIRED);
        }
        errors
    }
}

// ============================================================================
// Thought
// ============================================================================

#[derive(Debug, Clone, Default, Serialize)]
pub struct ThoughtForm {
    pub text: String,
}

impl ThoughtForm {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into().trim().to_string(),
        }
    }

    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        Self::new(field(fields, "text"))
    }

    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::new();
        let length = self.text.chars().count();
        if length == 0 {
            errors.add("text", REQUIRED);
        } else if length > MAX_THOUGHT_LENGTH {
            errors.add(
                "text",
                format!(
                    "Ensure this value has at most {} characters (it has {}).",
                    MAX_THOUGHT_LENGTH, length
                ),
            );
        }
        errors
    }
}

// ============================================================================
// Profile picture
// ============================================================================

/// Image formats accepted for avatars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageFormat {
    /// Detect the format from the leading bytes of the file
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(Self::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(Self::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(Self::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(Self::Webp)
        } else {
            None
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// A file received in a multipart submission
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

/// An upload that passed validation
#[derive(Debug, Clone)]
pub struct ValidImage {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct ProfileUpdateForm {
    pub image: Option<UploadedFile>,
}

impl ProfileUpdateForm {
    pub fn new(image: Option<UploadedFile>) -> Self {
        Self { image }
    }

    /// Validate the upload against the size cap and the image signatures
    pub fn validate(&self, max_bytes: usize) -> Result<ValidImage, FormErrors> {
        let mut errors = FormErrors::new();

        let Some(file) = self.image.as_ref().filter(|f| !f.bytes.is_empty()) else {
            errors.add("image", REQUIRED);
            return Err(errors);
        };

        if file.bytes.len() > max_bytes {
            errors.add(
                "image",
                format!("The image is too large. The limit is {} bytes.", max_bytes),
            );
            return Err(errors);
        }

        match ImageFormat::sniff(&file.bytes) {
            Some(format) => Ok(ValidImage {
                format,
                bytes: file.bytes.clone(),
            }),
            None => {
                errors.add(
                    "image",
                    "Upload a valid image. The file you uploaded was either not an \
                     image or a corrupted image.",
                );
                Err(errors)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registration(username: &str, password1: &str, password2: &str) -> RegistrationForm {
        RegistrationForm {
            username: username.to_string(),
            email: format!("{}@example.com", username),
            password1: password1.to_string(),
            password2: password2.to_string(),
        }
    }

    #[test]
    fn test_valid_registration() {
        let form = registration("alice", "Tr0ub4dor&3x", "Tr0ub4dor&3x");
        assert!(form.validate().is_empty());
    }

    #[test]
    fn test_registration_requires_fields() {
        let errors = RegistrationForm::default().validate();
        for name in ["username", "email", "password1", "password2"] {
            assert_eq!(errors.field(name), &[REQUIRED.to_string()], "{}", name);
        }
    }

    #[test]
    fn test_username_charset() {
        let errors = registration("bad name!", "Tr0ub4dor&3x", "Tr0ub4dor&3x").validate();
        assert!(errors.field("username")[0].starts_with("Enter a valid username"));

        let errors = registration("ok.name+tag@x_y-z", "Tr0ub4dor&3x", "Tr0ub4dor&3x").validate();
        assert!(!errors.has_field("username"));
    }

    #[test]
    fn test_username_too_long() {
        let long = "a".repeat(USERNAME_MAX_LENGTH + 1);
        let errors = registration(&long, "Tr0ub4dor&3x", "Tr0ub4dor&3x").validate();
        assert!(errors.field("username")[0].contains("at most 150"));
    }

    #[test]
    fn test_invalid_email() {
        let mut form = registration("alice", "Tr0ub4dor&3x", "Tr0ub4dor&3x");
        form.email = "not-an-email".to_string();
        assert_eq!(form.validate().field("email"), &["Enter a valid email address."]);
    }

    #[test]
    fn test_password_mismatch() {
        let errors = registration("alice", "Tr0ub4dor&3x", "Tr0ub4dor&3y").validate();
        assert_eq!(
            errors.field("password2"),
            &["The two password fields didn't match."]
        );
    }

    #[test]
    fn test_password_rules() {
        let short = password_problems("x9!k", "alice", "alice@example.com");
        assert!(short.iter().any(|p| p.contains("too short")));

        let numeric = password_problems("20242025", "alice", "alice@example.com");
        assert!(numeric.iter().any(|p| p.contains("entirely numeric")));

        let common = password_problems("Password123", "alice", "alice@example.com");
        assert!(common.iter().any(|p| p.contains("too common")));

        let similar = password_problems("alice2024", "alice", "alice@example.com");
        assert!(similar.iter().any(|p| p.contains("too similar to the username")));

        let like_email = password_problems("wonderland77", "alice", "wonderland@example.com");
        assert!(like_email
            .iter()
            .any(|p| p == "The password is too similar to the email address."));
        assert!(!like_email.iter().any(|p| p.contains("username")));

        assert!(password_problems("Tr0ub4dor&3x", "alice", "alice@example.com").is_empty());
    }

    #[test]
    fn test_similarity_ratio() {
        assert_eq!(similarity_ratio("abc", "abc"), 1.0);
        assert_eq!(similarity_ratio("abc", "xyz"), 0.0);
        assert!(similarity_ratio("bobbyy", "bobby") > SIMILARITY_THRESHOLD);
    }

    #[test]
    fn test_login_form_requires_both_fields() {
        let errors = LoginForm::default().validate();
        assert!(errors.has_field("username"));
        assert!(errors.has_field("password"));
    }

    #[test]
    fn test_thought_form_trims_and_limits() {
        assert!(ThoughtForm::new("   ").validate().has_field("text"));
        assert!(ThoughtForm::new("hello").validate().is_empty());
        assert_eq!(ThoughtForm::new("  hi  ").text, "hi");

        let at_limit = "x".repeat(MAX_THOUGHT_LENGTH);
        assert!(ThoughtForm::new(at_limit).validate().is_empty());

        let over = "x".repeat(MAX_THOUGHT_LENGTH + 1);
        assert!(ThoughtForm::new(over).validate().field("text")[0].contains("at most 280"));
    }

    #[test]
    fn test_image_sniffing() {
        assert_eq!(ImageFormat::sniff(b"\x89PNG\r\n\x1a\nrest"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::sniff(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::sniff(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::sniff(b"RIFF\0\0\0\0WEBPVP8 "), Some(ImageFormat::Webp));
        assert_eq!(ImageFormat::sniff(b"<?php echo 1; ?>"), None);
    }

    #[test]
    fn test_profile_form_rejects_missing_and_bad_files() {
        let missing = ProfileUpdateForm::new(None).validate(1024).unwrap_err();
        assert_eq!(missing.field("image"), &[REQUIRED.to_string()]);

        let script = UploadedFile {
            file_name: Some("shell.png".to_string()),
            content_type: Some("image/png".to_string()),
            bytes: b"#!/bin/sh\nrm -rf /".to_vec(),
        };
        let bad = ProfileUpdateForm::new(Some(script)).validate(1024).unwrap_err();
        assert!(bad.field("image")[0].starts_with("Upload a valid image"));
    }

    #[test]
    fn test_profile_form_size_cap() {
        let mut bytes = b"\x89PNG\r\n\x1a\n".to_vec();
        bytes.resize(64, 0);
        let file = UploadedFile {
            bytes,
            ..Default::default()
        };
        let form = ProfileUpdateForm::new(Some(file));
        assert!(form.validate(32).is_err());
        assert_eq!(form.validate(64).unwrap().format, ImageFormat::Png);
    }
}
