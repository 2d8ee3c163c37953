//! Format validation for banking identifiers.
//!
//! All checks are offline format checks; nothing is looked up against bank
//! registries.

use std::fmt;

/// Error returned when a banking identifier fails format validation.
#[derive(Debug, Clone)]
pub struct BankingFormatError {
    /// The invalid input value.
    pub value: String,
    /// Why the value failed validation.
    pub reason: String,
}

impl fmt::Display for BankingFormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid value '{}': {}", self.value, self.reason)
    }
}

impl std::error::Error for BankingFormatError {}

fn err(value: &str, reason: impl Into<String>) -> BankingFormatError {
    BankingFormatError {
        value: value.into(),
        reason: reason.into(),
    }
}

/// Normalize user-entered banking identifiers: strip spaces, uppercase.
pub fn normalize(s: &str) -> String {
    s.trim().replace(' ', "").to_uppercase()
}

/// Validate an IBAN: country prefix, length bounds, charset, mod-97 checksum.
pub fn validate_iban(iban: &str) -> Result<(), BankingFormatError> {
    let iban = normalize(iban);
    if iban.len() < 15 || iban.len() > 34 {
        return Err(err(&iban, "IBAN must be 15 to 34 characters"));
    }
    let bytes = iban.as_bytes();
    if !bytes[..2].iter().all(u8::is_ascii_uppercase) {
        return Err(err(&iban, "IBAN must start with a 2-letter country code"));
    }
    if !bytes[2..4].iter().all(u8::is_ascii_digit) {
        return Err(err(&iban, "IBAN check digits must be numeric"));
    }
    if !bytes.iter().all(u8::is_ascii_alphanumeric) {
        return Err(err(&iban, "IBAN may only contain letters and digits"));
    }

    // ISO 7064 mod 97-10 over the rearranged IBAN (BBAN + country + check).
    let rearranged = iban[4..].bytes().chain(iban[..4].bytes());
    let mut rem: u32 = 0;
    for b in rearranged {
        if b.is_ascii_digit() {
            rem = (rem * 10 + u32::from(b - b'0')) % 97;
        } else {
            rem = (rem * 100 + u32::from(b - b'A') + 10) % 97;
        }
    }
    if rem != 1 {
        return Err(err(&iban, "IBAN checksum is invalid"));
    }
    Ok(())
}

/// Validate a BIC: 8 or 11 characters, ISO 9362 shape.
pub fn validate_bic(bic: &str) -> Result<(), BankingFormatError> {
    let bic = normalize(bic);
    if bic.len() != 8 && bic.len() != 11 {
        return Err(err(&bic, "BIC must be 8 or 11 characters"));
    }
    let bytes = bic.as_bytes();
    if !bytes[..4].iter().all(u8::is_ascii_uppercase) {
        return Err(err(&bic, "BIC bank code must be 4 letters"));
    }
    if !bytes[4..6].iter().all(u8::is_ascii_uppercase) {
        return Err(err(&bic, "BIC country code must be 2 letters"));
    }
    if !bytes[6..].iter().all(u8::is_ascii_alphanumeric) {
        return Err(err(&bic, "BIC location/branch part must be alphanumeric"));
    }
    Ok(())
}

/// Characters permitted in SEPA references and creditor identifiers beyond
/// letters and digits.
fn is_sepa_special(c: char) -> bool {
    matches!(c, '\'' | ',' | '.' | ':' | '+' | '-' | '/' | '(' | ')' | '?')
}

/// Validate a SEPA creditor identifier (e.g. "DE98ZZZ09999999999"):
/// country code, check digits, business code, 1–28 char national identifier.
pub fn validate_creditor_id(id: &str) -> Result<(), BankingFormatError> {
    let id = id.trim();
    if id.len() < 8 || id.len() > 35 {
        return Err(err(id, "creditor ID must be 8 to 35 characters"));
    }
    let mut chars = id.chars();
    if !chars.by_ref().take(2).all(|c| c.is_ascii_alphabetic()) {
        return Err(err(id, "creditor ID must start with a 2-letter country code"));
    }
    if !chars.by_ref().take(2).all(|c| c.is_ascii_digit()) {
        return Err(err(id, "creditor ID check digits must be numeric"));
    }
    if !id[4..]
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_sepa_special(c))
    {
        return Err(err(id, "creditor ID contains characters outside the SEPA set"));
    }
    Ok(())
}

/// Validate the charset of a mandate reference or reference prefix.
pub fn validate_reference_charset(reference: &str) -> Result<(), BankingFormatError> {
    if reference.is_empty() {
        return Err(err(reference, "reference must not be empty"));
    }
    if !reference
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || is_sepa_special(c))
    {
        return Err(err(
            reference,
            "reference may only contain letters, numbers and ' , . : + - / ( ) ?",
        ));
    }
    Ok(())
}

/// Whether an IBAN is refused by the organizer's blocklist.
///
/// Entries are matched as prefixes against the normalized IBAN, so a bare
/// country code blocks the whole country.
pub fn iban_blocklisted(iban: &str, blocklist: &[String]) -> bool {
    let iban = normalize(iban);
    blocklist
        .iter()
        .map(|entry| normalize(entry))
        .filter(|entry| !entry.is_empty())
        .any(|entry| iban.starts_with(&entry))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn iban_checksum() {
        assert!(validate_iban("DE89370400440532013000").is_ok());
        assert!(validate_iban("DE89 3704 0044 0532 0130 00").is_ok());
        // Flipped digit
        assert!(validate_iban("DE89370400440532013001").is_err());
        assert!(validate_iban("DE89").is_err());
        assert!(validate_iban("1289370400440532013000").is_err());
    }

    #[test]
    fn bic_shape() {
        assert!(validate_bic("COBADEFF").is_ok());
        assert!(validate_bic("COBADEFFXXX").is_ok());
        assert!(validate_bic("cobadeff").is_ok()); // normalized
        assert!(validate_bic("COBADEFFXX").is_err());
        assert!(validate_bic("CO1ADEFF").is_err());
    }

    #[test]
    fn creditor_id_format() {
        assert!(validate_creditor_id("DE98ZZZ09999999999").is_ok());
        assert!(validate_creditor_id("XX00").is_err());
        assert!(validate_creditor_id("D198ZZZ09999999999").is_err());
        assert!(validate_creditor_id("DE98ZZZ09999 99999").is_err());
    }

    #[test]
    fn blocklist_prefix_match() {
        let blocklist = vec!["GB".to_string(), "DE8937".to_string()];
        assert!(iban_blocklisted("GB33BUKB20201555555555", &blocklist));
        assert!(iban_blocklisted("de89 3704 0044 0532 0130 00", &blocklist));
        assert!(!iban_blocklisted("FR1420041010050500013M02606", &blocklist));
        assert!(!iban_blocklisted("FR1420041010050500013M02606", &[]));
    }
}
