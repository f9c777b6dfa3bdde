//! Phone number type, stored in E.164 form.

use core::fmt;

use phonenumber::Mode;
use phonenumber::metadata::DATABASE;
use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
///
/// The messages are shown to API clients as-is.
#[derive(thiserror::Error, Debug)]
pub enum PhoneError {
    /// The input could not be parsed as an international number.
    #[error("Invalid phone number: {0}")]
    Unparseable(#[from] phonenumber::ParseError),
    /// The number parsed but its length is not used by its region.
    #[error("Invalid number format, ensure E.164 formatting")]
    Impossible,
    /// The number has a possible shape but is not an assigned number.
    #[error("Number is correct format but not in use")]
    NotInUse,
}

/// A phone number normalized to E.164.
///
/// Input must be international (leading `+` and country code); separators
/// such as spaces, dashes and parentheses are accepted and dropped.
///
/// ```
/// use mercato_core::PhoneNumber;
///
/// let phone = PhoneNumber::parse("+1 (415) 555-2671").unwrap();
/// assert_eq!(phone.as_str(), "+14155552671");
///
/// assert!(PhoneNumber::parse("not a number").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parse, check and normalize a phone number.
    ///
    /// # Errors
    ///
    /// - [`PhoneError::Unparseable`] if the text is not an international number
    /// - [`PhoneError::Impossible`] if no number of that length exists in its region
    /// - [`PhoneError::NotInUse`] if the number is not valid for its region
    pub fn parse(s: &str) -> Result<Self, PhoneError> {
        let number = phonenumber::parse(None, s)?;

        if !is_possible(&number) {
            return Err(PhoneError::Impossible);
        }

        if !number.is_valid() {
            return Err(PhoneError::NotInUse);
        }

        Ok(Self(number.format().mode(Mode::E164).to_string()))
    }

    /// Returns the E.164 string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its E.164 string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Whether the national number has a length some number in its region uses,
/// counting lengths that are only dialable locally.
fn is_possible(number: &phonenumber::PhoneNumber) -> bool {
    let Some(metadata) = number.metadata(&DATABASE) else {
        return false;
    };
    let general = metadata.descriptors().general();
    let Ok(length) = u16::try_from(number.national().to_string().len()) else {
        return false;
    };

    general.possible_length().contains(&length) || general.possible_local_length().contains(&length)
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = PhoneError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(phone: PhoneNumber) -> Self {
        phone.0
    }
}
