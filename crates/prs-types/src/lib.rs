/// Errors that can occur when creating validated text types.
#[derive(Debug, thiserror::Error)]
pub enum TextError {
    /// The input text was empty or contained only whitespace
    #[error("Text cannot be empty")]
    Empty,
    /// The input was not a syntactically valid email address
    #[error("Enter a valid email address")]
    InvalidEmail,
    /// The input was not a valid phone number
    #[error("Enter a valid phone number (9 to 15 digits, optional leading +1)")]
    InvalidPhone,
}

/// A string type that guarantees non-empty content.
///
/// This type wraps a `String` and ensures it contains at least one non-whitespace character.
/// The input is automatically trimmed of leading and trailing whitespace during construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonEmptyText(String);

impl NonEmptyText {
    /// Creates a new `NonEmptyText` from the given input.
    ///
    /// The input is trimmed of leading and trailing whitespace. If the trimmed
    /// result is empty, an error is returned.
    ///
    /// # Arguments
    ///
    /// * `input` - Any type that can be converted to a string reference
    ///
    /// # Returns
    ///
    /// Returns `Ok(NonEmptyText)` if the trimmed input is non-empty,
    /// or `Err(TextError::Empty)` if it's empty or contains only whitespace.
    pub fn new(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();
        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the inner string as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the inner `String`.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for NonEmptyText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for NonEmptyText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl serde::Serialize for NonEmptyText {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for NonEmptyText {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        NonEmptyText::new(&s).map_err(serde::de::Error::custom)
    }
}

/// A syntactically valid email address.
///
/// Validation is structural only: exactly one `@`, a non-empty local part, and
/// a domain containing at least one interior dot. Deliverability is not
/// checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Parses an email address from the given input.
    ///
    /// The input is trimmed before validation.
    ///
    /// # Errors
    ///
    /// Returns `TextError::InvalidEmail` if the input does not have the shape
    /// `local@domain.tld`.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();

        let (local, domain) = trimmed.split_once('@').ok_or(TextError::InvalidEmail)?;

        if local.is_empty() || domain.is_empty() {
            return Err(TextError::InvalidEmail);
        }
        if trimmed.chars().any(char::is_whitespace) || domain.contains('@') {
            return Err(TextError::InvalidEmail);
        }
        if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
            return Err(TextError::InvalidEmail);
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for EmailAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for EmailAddress {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        EmailAddress::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A phone number in the record-store format: an optional leading `+`, an
/// optional country prefix `1`, then 9 to 15 digits.
///
/// Equivalent to the pattern `^\+?1?\d{9,15}$`. The number is stored exactly
/// as supplied (after trimming); no normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Parses a phone number from the given input.
    ///
    /// # Errors
    ///
    /// Returns `TextError::InvalidPhone` if the trimmed input does not match
    /// the accepted shape.
    pub fn parse(input: impl AsRef<str>) -> Result<Self, TextError> {
        let trimmed = input.as_ref().trim();

        let rest = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if rest.is_empty() || !rest.bytes().all(|b| b.is_ascii_digit()) {
            return Err(TextError::InvalidPhone);
        }

        let digits = rest.strip_prefix('1').unwrap_or(rest);
        if !(9..=15).contains(&digits.len()) {
            // A bare "1..." run of 10-16 digits is also acceptable when read
            // without the country prefix.
            if !(9..=15).contains(&rest.len()) {
                return Err(TextError::InvalidPhone);
            }
        }

        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl serde::Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> serde::Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_empty_text_trims_and_accepts() {
        let text = NonEmptyText::new("  Alice  ").expect("should accept non-empty input");
        assert_eq!(text.as_str(), "Alice");
    }

    #[test]
    fn test_non_empty_text_rejects_whitespace_only() {
        let err = NonEmptyText::new("   ").expect_err("whitespace-only input should fail");
        assert!(matches!(err, TextError::Empty));
    }

    #[test]
    fn test_email_accepts_plain_address() {
        let email = EmailAddress::parse("nurse@clinic.example.org").expect("should parse");
        assert_eq!(email.as_str(), "nurse@clinic.example.org");
    }

    #[test]
    fn test_email_rejects_malformed_addresses() {
        for bad in ["", "no-at-sign", "@clinic.org", "a@", "a@b", "a b@c.org", "a@b@c.org"] {
            assert!(
                EmailAddress::parse(bad).is_err(),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_phone_accepts_pattern_variants() {
        for good in ["123456789", "+123456789", "+1123456789", "123456789012345"] {
            assert!(PhoneNumber::parse(good).is_ok(), "should accept {good:?}");
        }
    }

    #[test]
    fn test_phone_rejects_bad_numbers() {
        for bad in ["", "12345678", "abc123456789", "+0123456789012345678", "12 34 56 78 9"] {
            assert!(PhoneNumber::parse(bad).is_err(), "should reject {bad:?}");
        }
    }

    #[test]
    fn test_phone_preserves_input_verbatim() {
        let phone = PhoneNumber::parse(" +15551234567 ").expect("should parse");
        assert_eq!(phone.as_str(), "+15551234567");
    }
}
