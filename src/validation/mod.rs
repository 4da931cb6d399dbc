//! Parameter validation for endpoint services.
//!
//! Every check here runs before a request is built.

use crate::errors::ValidationError;
use std::fmt;
use std::str::FromStr;

/// Earliest congress for which amendment text is published.
pub const MIN_TEXT_CONGRESS: u32 = 118;

/// Highest district number in use.
pub const MAX_DISTRICT: u32 = 99;

/// Legislation type of a bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BillType {
    /// House bill.
    Hr,
    /// Senate bill.
    S,
    /// House joint resolution.
    Hjres,
    /// Senate joint resolution.
    Sjres,
    /// House concurrent resolution.
    Hconres,
    /// Senate concurrent resolution.
    Sconres,
    /// House simple resolution.
    Hres,
    /// Senate simple resolution.
    Sres,
}

impl BillType {
    /// All bill types.
    pub const ALL: [BillType; 8] = [
        Self::Hr,
        Self::S,
        Self::Hjres,
        Self::Sjres,
        Self::Hconres,
        Self::Sconres,
        Self::Hres,
        Self::Sres,
    ];

    /// Path segment of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hr => "hr",
            Self::S => "s",
            Self::Hjres => "hjres",
            Self::Sjres => "sjres",
            Self::Hconres => "hconres",
            Self::Sconres => "sconres",
            Self::Hres => "hres",
            Self::Sres => "sres",
        }
    }
}

/// Legislation type of an amendment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AmendmentType {
    /// House amendment.
    Hamdt,
    /// Senate amendment.
    Samdt,
    /// Senate unprinted amendment.
    Suamdt,
    /// Senate resolution.
    Sres,
}

impl AmendmentType {
    /// All amendment types.
    pub const ALL: [AmendmentType; 4] = [Self::Hamdt, Self::Samdt, Self::Suamdt, Self::Sres];

    /// Path segment of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hamdt => "hamdt",
            Self::Samdt => "samdt",
            Self::Suamdt => "suamdt",
            Self::Sres => "sres",
        }
    }

    /// Returns true if the text endpoint serves this type.
    pub fn supports_text(&self) -> bool {
        matches!(self, Self::Hamdt | Self::Samdt | Self::Suamdt | Self::Sres)
    }
}

fn joined<T>(types: &[T], name: fn(&T) -> &'static str) -> String {
    types.iter().map(name).collect::<Vec<_>>().join(", ")
}

impl FromStr for BillType {
    type Err = ValidationError;

    /// Parses a bill type, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidBillType {
                value: s.to_string(),
                valid: joined(&Self::ALL, Self::as_str),
            })
    }
}

impl FromStr for AmendmentType {
    type Err = ValidationError;

    /// Parses an amendment type, ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::InvalidAmendmentType {
                value: s.to_string(),
                valid: joined(&Self::ALL, Self::as_str),
            })
    }
}

impl AsRef<str> for BillType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl AsRef<str> for AmendmentType {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for BillType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for AmendmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Checks that a congress number is positive.
pub fn validate_congress(congress: u32) -> Result<u32, ValidationError> {
    if congress == 0 {
        return Err(ValidationError::InvalidCongress(congress));
    }
    Ok(congress)
}

/// Checks that a bill or amendment number is positive.
pub fn validate_number(number: u32) -> Result<u32, ValidationError> {
    if number == 0 {
        return Err(ValidationError::InvalidBillNumber(number));
    }
    Ok(number)
}

/// Checks amendment text availability for a congress and type.
pub fn validate_text_congress(congress: u32, amendment_type: AmendmentType) -> Result<(), ValidationError> {
    if congress < MIN_TEXT_CONGRESS || !amendment_type.supports_text() {
        return Err(ValidationError::TextNotSupported {
            congress,
            min: MIN_TEXT_CONGRESS,
        });
    }
    Ok(())
}

/// Checks that a bioguide id is a non-empty ASCII alphanumeric string.
pub fn validate_bioguide_id(id: &str) -> Result<&str, ValidationError> {
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ValidationError::InvalidBioguideId(id.to_string()));
    }
    Ok(id)
}

/// Checks a two-letter state code and returns it upper-cased.
pub fn validate_state_code(code: &str) -> Result<String, ValidationError> {
    if code.len() != 2 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::InvalidStateCode(code.to_string()));
    }
    Ok(code.to_ascii_uppercase())
}

/// Checks a district number. At-large seats use district 0.
pub fn validate_district(district: u32) -> Result<u32, ValidationError> {
    if district > MAX_DISTRICT {
        return Err(ValidationError::InvalidDistrict(district));
    }
    Ok(district)
}
