//! ISO 3166 country and subdivision codes.
//!
//! Both types only check shape (length and alphabet), not membership in the
//! ISO registry, and store the code uppercased.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`CountryCode`] or [`StateCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegionCodeError {
    /// The country code is not exactly two letters.
    #[error("ISO 3166 country code must be 2 alphabetical characters")]
    InvalidCountryCode,
    /// The subdivision code is not two or three letters.
    #[error("ISO 3166-2 subdivision code must be 2 or 3 alphabetical characters")]
    InvalidStateCode,
}

fn is_alphabetic_of_len(s: &str, lengths: &[usize]) -> bool {
    lengths.contains(&s.chars().count()) && s.chars().all(|c| c.is_ascii_alphabetic())
}

/// An ISO 3166-1 alpha-2 country code, stored uppercase.
///
/// ```
/// use mercato_core::CountryCode;
///
/// assert_eq!(CountryCode::parse("us").unwrap().as_str(), "US");
/// assert!(CountryCode::parse("USA").is_err());
/// assert!(CountryCode::parse("U1").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CountryCode(String);

impl CountryCode {
    /// Parse a country code, uppercasing it.
    ///
    /// # Errors
    ///
    /// Returns [`RegionCodeError::InvalidCountryCode`] unless the input is
    /// exactly two ASCII letters.
    pub fn parse(s: &str) -> Result<Self, RegionCodeError> {
        if !is_alphabetic_of_len(s, &[2]) {
            return Err(RegionCodeError::InvalidCountryCode);
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// An ISO 3166-2 subdivision code (the part after the country prefix), stored uppercase.
///
/// ```
/// use mercato_core::StateCode;
///
/// assert_eq!(StateCode::parse("ca").unwrap().as_str(), "CA");
/// assert_eq!(StateCode::parse("nsw").unwrap().as_str(), "NSW");
/// assert!(StateCode::parse("C").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StateCode(String);

impl StateCode {
    /// Parse a subdivision code, uppercasing it.
    ///
    /// # Errors
    ///
    /// Returns [`RegionCodeError::InvalidStateCode`] unless the input is two
    /// or three ASCII letters.
    pub fn parse(s: &str) -> Result<Self, RegionCodeError> {
        if !is_alphabetic_of_len(s, &[2, 3]) {
            return Err(RegionCodeError::InvalidStateCode);
        }
        Ok(Self(s.to_ascii_uppercase()))
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! impl_string_conversions {
    ($name:ident) => {
        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = RegionCodeError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(code: $name) -> Self {
                code.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl_string_conversions!(CountryCode);
impl_string_conversions!(StateCode);
