//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`BranchName`] - Validated name of the primary branch
//! - [`Oid`] - Git object identifier (SHA)
//! - [`AuthorIdentity`] - `Name <email>` pair used for imported commits
//! - [`UtcTimestamp`] - Authorship time recovered from an archive header
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so a bad `--author` or branch setting is
//! reported before any repository is touched.
//!
//! # Examples
//!
//! ```
//! use tarball_history::core::types::{AuthorIdentity, BranchName, Oid};
//!
//! let branch = BranchName::new("master").unwrap();
//! let oid = Oid::new("abc123def4567890abc123def4567890abc12345").unwrap();
//! let author = AuthorIdentity::parse("Apple <opensource@apple.com>").unwrap();
//!
//! assert_eq!(branch.as_str(), "master");
//! assert_eq!(oid.short(7), "abc123d");
//! assert_eq!(author.email(), "opensource@apple.com");
//!
//! assert!(BranchName::new("bad..name").is_err());
//! assert!(AuthorIdentity::parse("no email here").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid branch name: {0}")]
    InvalidBranchName(String),

    #[error("invalid object id: {0}")]
    InvalidOid(String),

    #[error("invalid author identity: {0}")]
    InvalidAuthor(String),
}

/// A validated Git branch name.
///
/// Follows the subset of `git check-ref-format` rules that matter for a
/// branch we create ourselves:
/// - Cannot be empty or exactly `@`
/// - No component may start with `.` or end with `.lock`
/// - Cannot start with `-` or end with `/`
/// - Cannot contain `..`, `@{`, `//`, control characters, or any of
///   ` ~^:\?*[`
///
/// # Example
///
/// ```
/// use tarball_history::core::types::BranchName;
///
/// assert!(BranchName::new("master").is_ok());
/// assert!(BranchName::new("import/apple").is_ok());
/// assert!(BranchName::new("").is_err());
/// assert!(BranchName::new("has space").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BranchName(String);

impl BranchName {
    const FORBIDDEN_SEQUENCES: [&'static str; 3] = ["..", "@{", "//"];
    const FORBIDDEN_CHARS: [char; 8] = [' ', '~', '^', ':', '\\', '?', '*', '['];

    /// Create a new validated branch name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidBranchName` if the name violates Git's refname rules.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    fn validate(name: &str) -> Result<(), TypeError> {
        let reject = |why: String| -> Result<(), TypeError> {
            Err(TypeError::InvalidBranchName(why))
        };

        if name.is_empty() {
            return reject("branch name cannot be empty".into());
        }
        if name == "@" {
            return reject("branch name cannot be '@'".into());
        }
        if name.starts_with('-') || name.ends_with('/') {
            return reject(format!("'{name}' cannot start with '-' or end with '/'"));
        }
        if let Some(seq) = Self::FORBIDDEN_SEQUENCES
            .iter()
            .find(|seq| name.contains(*seq))
        {
            return reject(format!("branch name cannot contain '{seq}'"));
        }
        if let Some(c) = name
            .chars()
            .find(|c| Self::FORBIDDEN_CHARS.contains(c) || c.is_ascii_control())
        {
            return reject(format!("branch name cannot contain {c:?}"));
        }
        if name
            .split('/')
            .any(|part| part.starts_with('.') || part.ends_with(".lock"))
        {
            return reject("path component cannot start with '.' or end with '.lock'".into());
        }

        Ok(())
    }

    /// Get the branch name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The full ref this branch lives at (`refs/heads/<name>`).
    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.0)
    }
}

impl TryFrom<String> for BranchName {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BranchName> for String {
    fn from(name: BranchName) -> Self {
        name.0
    }
}

impl std::fmt::Display for BranchName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A Git object identifier (SHA-1 or SHA-256), normalized to lowercase.
///
/// Only used as an opaque key: the resolver compares hashes for equality
/// and never inspects their content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Oid(String);

impl Oid {
    /// Create a new validated object id.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidOid` unless the input is 40 or 64 hex characters.
    pub fn new(oid: impl Into<String>) -> Result<Self, TypeError> {
        let oid = oid.into().to_ascii_lowercase();
        if oid.len() != 40 && oid.len() != 64 {
            return Err(TypeError::InvalidOid(format!(
                "expected 40 or 64 hex characters, got {}",
                oid.len()
            )));
        }
        if !oid.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TypeError::InvalidOid(
                "object id must be hexadecimal".into(),
            ));
        }
        Ok(Self(oid))
    }

    /// Abbreviated form: the first `len` characters (or all of them).
    pub fn short(&self, len: usize) -> &str {
        &self.0[..len.min(self.0.len())]
    }

    /// Get the object id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Oid {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Oid> for String {
    fn from(oid: Oid) -> Self {
        oid.0
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Commit author in `Name <email>` form, as accepted by `--author`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AuthorIdentity {
    name: String,
    email: String,
}

impl AuthorIdentity {
    /// Parse `Name <email>`.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidAuthor` if the angle-bracketed email is
    /// missing, empty, or followed by trailing text, or the name is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use tarball_history::core::types::AuthorIdentity;
    ///
    /// let who = AuthorIdentity::parse("Jane Doe <jane@example.com>").unwrap();
    /// assert_eq!(who.name(), "Jane Doe");
    /// assert_eq!(who.to_string(), "Jane Doe <jane@example.com>");
    /// ```
    pub fn parse(raw: &str) -> Result<Self, TypeError> {
        let raw = raw.trim();
        let invalid = || TypeError::InvalidAuthor(format!("expected 'Name <email>', got '{raw}'"));

        let open = raw.find('<').ok_or_else(invalid)?;
        let close = raw.rfind('>').ok_or_else(invalid)?;
        if close < open || close != raw.len() - 1 {
            return Err(invalid());
        }

        let name = raw[..open].trim();
        let email = raw[open + 1..close].trim();
        if name.is_empty() || email.is_empty() {
            return Err(invalid());
        }

        Ok(Self {
            name: name.to_string(),
            email: email.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }
}

impl TryFrom<String> for AuthorIdentity {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<AuthorIdentity> for String {
    fn from(who: AuthorIdentity) -> Self {
        who.to_string()
    }
}

impl std::fmt::Display for AuthorIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} <{}>", self.name, self.email)
    }
}

/// A UTC timestamp, rendered as RFC3339.
///
/// # Example
///
/// ```
/// use tarball_history::core::types::UtcTimestamp;
///
/// let ts = UtcTimestamp::from_unix_seconds(668).unwrap();
/// assert_eq!(ts.unix_seconds(), 668);
/// assert_eq!(ts.to_string(), "1970-01-01T00:11:08+00:00");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UtcTimestamp(chrono::DateTime<chrono::Utc>);

impl UtcTimestamp {
    /// Create a timestamp for the current moment.
    pub fn now() -> Self {
        Self(chrono::Utc::now())
    }

    /// Create a timestamp from seconds since the Unix epoch.
    ///
    /// Returns `None` if the value is outside chrono's representable range.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        chrono::DateTime::from_timestamp(secs, 0).map(Self)
    }

    /// Seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }
}

impl std::fmt::Display for UtcTimestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.to_rfc3339())
    }
}
