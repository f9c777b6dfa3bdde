//! Email address type.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty.
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The input contains more than one @ symbol.
    #[error("email must contain exactly one @ symbol")]
    MultipleAtSymbols,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The local part (before @) is too long.
    #[error("email local part must be at most {max} characters")]
    LocalPartTooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The local part contains a character outside the dot-atom grammar.
    #[error("email local part cannot contain '{0}'")]
    InvalidLocalCharacter(char),
    /// The local part starts or ends with a dot, or has two dots in a row.
    #[error("email local part cannot start or end with a period or contain two periods in a row")]
    MisplacedDot,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The domain has a single label.
    #[error("email domain must contain a period")]
    DomainWithoutDot,
    /// A domain label is empty, too long, or contains invalid characters.
    #[error("email domain label '{0}' is not valid")]
    InvalidDomainLabel(String),
    /// The top-level domain label is all digits.
    #[error("email domain cannot end with a numeric label")]
    NumericTopLevelDomain,
}

/// A normalized email address.
///
/// Parsing validates the address against the dot-atom grammar of RFC 5322
/// (no quoted local parts, no IP literals) and normalizes it by lowercasing
/// the domain. The local part keeps its case, since mailbox names may be
/// case-sensitive.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Exactly one @ symbol
/// - Local part: 1-64 characters, letters, digits and ``!#$%&'*+-/=?^_`{|}~``,
///   with dots only between other characters
/// - Domain: at least two dot-separated labels of letters, digits and hyphens,
///   no label starting or ending with a hyphen, non-numeric top-level label
///
/// ## Examples
///
/// ```
/// use mercato_core::Email;
///
/// // Valid emails
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("user.name+tag@domain.co.uk").is_ok());
///
/// // The domain is normalized to lowercase
/// let email = Email::parse("John.Smith@Email.COM").unwrap();
/// assert_eq!(email.as_str(), "John.Smith@email.com");
///
/// // Invalid emails
/// assert!(Email::parse("").is_err());             // empty
/// assert!(Email::parse("no-at-symbol").is_err());   // missing @
/// assert!(Email::parse("@domain.com").is_err());    // empty local part
/// assert!(Email::parse("user@").is_err());          // empty domain
/// assert!(Email::parse("user@localhost").is_err()); // no period in domain
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Maximum length of the local part (RFC 5321).
    pub const MAX_LOCAL_LENGTH: usize = 64;

    /// Maximum length of a single domain label (RFC 1035).
    const MAX_LABEL_LENGTH: usize = 63;

    /// Parse and normalize an `Email` from a string.
    ///
    /// Parsing an already normalized address returns it unchanged.
    ///
    /// # Errors
    ///
    /// Returns an [`EmailError`] describing the first rule the input breaks.
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        let (local, domain) = s.split_once('@').ok_or(EmailError::MissingAtSymbol)?;

        if domain.contains('@') {
            return Err(EmailError::MultipleAtSymbols);
        }

        validate_local_part(local)?;
        let domain = normalize_domain(domain)?;

        Ok(Self(format!("{local}@{domain}")))
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `Email` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Returns the local part of the email (before the @).
    #[must_use]
    pub fn local_part(&self) -> &str {
        self.0.split('@').next().unwrap_or("")
    }

    /// Returns the domain part of the email (after the @).
    #[must_use]
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

fn validate_local_part(local: &str) -> Result<(), EmailError> {
    if local.is_empty() {
        return Err(EmailError::EmptyLocalPart);
    }

    if local.chars().count() > Email::MAX_LOCAL_LENGTH {
        return Err(EmailError::LocalPartTooLong {
            max: Email::MAX_LOCAL_LENGTH,
        });
    }

    if local.starts_with('.') || local.ends_with('.') || local.contains("..") {
        return Err(EmailError::MisplacedDot);
    }

    match local.chars().find(|&c| !is_atext(c) && c != '.') {
        Some(c) => Err(EmailError::InvalidLocalCharacter(c)),
        None => Ok(()),
    }
}

/// RFC 5322 `atext`, extended with non-ASCII letters and digits (RFC 6531).
fn is_atext(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || "!#$%&'*+-/=?^_`{|}~".contains(c)
        || (!c.is_ascii() && c.is_alphanumeric())
}

fn normalize_domain(domain: &str) -> Result<String, EmailError> {
    if domain.is_empty() {
        return Err(EmailError::EmptyDomain);
    }

    if !domain.contains('.') {
        return Err(EmailError::DomainWithoutDot);
    }

    let domain = domain.to_ascii_lowercase();

    for label in domain.split('.') {
        let valid = !label.is_empty()
            && label.len() <= Email::MAX_LABEL_LENGTH
            && !label.starts_with('-')
            && !label.ends_with('-')
            && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');

        if !valid {
            return Err(EmailError::InvalidDomainLabel(label.to_owned()));
        }
    }

    let top_level = domain.rsplit('.').next().unwrap_or_default();
    if top_level.chars().all(|c| c.is_ascii_digit()) {
        return Err(EmailError::NumericTopLevelDomain);
    }

    Ok(domain)
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name@example.com").is_ok());
        assert!(Email::parse("user+tag@example.com").is_ok());
        assert!(Email::parse("user@subdomain.example.com").is_ok());
        assert!(Email::parse("user@example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
        assert!(Email::parse("o'brien@example.ie").is_ok());
        assert!(Email::parse("josé@example.es").is_ok());
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(Email::parse(""), Err(EmailError::Empty)));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_missing_at() {
        assert!(matches!(
            Email::parse("no-at-symbol"),
            Err(EmailError::MissingAtSymbol)
        ));
    }

    #[test]
    fn test_parse_multiple_at() {
        assert!(matches!(
            Email::parse("a@b@example.com"),
            Err(EmailError::MultipleAtSymbols)
        ));
    }

    #[test]
    fn test_parse_empty_local_part() {
        assert!(matches!(
            Email::parse("@domain.com"),
            Err(EmailError::EmptyLocalPart)
        ));
    }

    #[test]
    fn test_parse_local_part_too_long() {
        let long = format!("{}@example.com", "a".repeat(65));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::LocalPartTooLong { max: 64 })
        ));
    }

    #[test]
    fn test_parse_misplaced_dots() {
        for input in [".user@example.com", "user.@example.com", "us..er@example.com"] {
            assert!(
                matches!(Email::parse(input), Err(EmailError::MisplacedDot)),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_rejects_surrounding_whitespace() {
        assert!(matches!(
            Email::parse(" user@example.com"),
            Err(EmailError::InvalidLocalCharacter(' '))
        ));
        assert!(Email::parse("user@example.com ").is_err());
    }

    #[test]
    fn test_parse_invalid_local_character() {
        assert!(matches!(
            Email::parse("john smith@example.com"),
            Err(EmailError::InvalidLocalCharacter(' '))
        ));
        assert!(matches!(
            Email::parse("john(smith)@example.com"),
            Err(EmailError::InvalidLocalCharacter('('))
        ));
    }

    #[test]
    fn test_parse_empty_domain() {
        assert!(matches!(
            Email::parse("user@"),
            Err(EmailError::EmptyDomain)
        ));
    }

    #[test]
    fn test_parse_domain_without_dot() {
        assert!(matches!(
            Email::parse("user@localhost"),
            Err(EmailError::DomainWithoutDot)
        ));
    }

    #[test]
    fn test_parse_invalid_domain_labels() {
        for input in [
            "user@-example.com",
            "user@example-.com",
            "user@exa_mple.com",
            "user@example..com",
            "user@.example.com",
        ] {
            assert!(
                matches!(Email::parse(input), Err(EmailError::InvalidDomainLabel(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_numeric_tld() {
        assert!(matches!(
            Email::parse("user@192.168.0.1"),
            Err(EmailError::NumericTopLevelDomain)
        ));
    }

    #[test]
    fn test_domain_is_lowercased() {
        let email = Email::parse("JohnSmith@EMAIL.com").unwrap();
        assert_eq!(email.as_str(), "JohnSmith@email.com");
        assert_eq!(email.local_part(), "JohnSmith");
        assert_eq!(email.domain(), "email.com");
    }

    #[test]
    fn test_display() {
        let email = Email::parse("user@example.com").unwrap();
        assert_eq!(format!("{email}"), "user@example.com");
    }

    #[test]
    fn test_serde_validates_on_deserialize() {
        let email = Email::parse("user@Example.com").unwrap();
        let json = serde_json::to_string(&email).unwrap();
        assert_eq!(json, "\"user@example.com\"");

        let parsed: Email = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, email);

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }

    #[test]
    fn test_from_str() {
        let email: Email = "user@example.com".parse().unwrap();
        assert_eq!(email.as_str(), "user@example.com");
    }

    proptest! {
        #[test]
        fn normalization_is_idempotent(
            local in "[a-zA-Z0-9][a-zA-Z0-9+_-]{0,20}",
            domain in "[a-zA-Z][a-zA-Z0-9]{0,10}\\.[a-zA-Z]{2,6}",
        ) {
            let once = Email::parse(&format!("{local}@{domain}")).unwrap();
            let twice = Email::parse(once.as_str()).unwrap();
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn parse_never_panics(input in "\\PC{0,80}") {
            let _ = Email::parse(&input);
        }
    }
}
