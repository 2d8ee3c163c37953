//! Mandate reference construction.

use super::error::DebitError;
use super::validation::validate_reference_charset;

/// Maximum length of a SEPA mandate reference.
pub const MAX_REFERENCE_LEN: usize = 35;

/// Build the unique mandate reference for an order:
/// `[prefix-]SLUG-CODE`, with the event slug uppercased.
///
/// The reference identifies the debit relationship on the customer's bank
/// statement, so the full string must stay within the SEPA charset and
/// 35-character limit.
pub fn mandate_reference(
    prefix: Option<&str>,
    event_slug: &str,
    order_code: &str,
) -> Result<String, DebitError> {
    let base = format!("{}-{}", event_slug.to_uppercase(), order_code);
    let reference = match prefix {
        Some(p) if !p.is_empty() => format!("{p}-{base}"),
        _ => base,
    };

    validate_reference_charset(&reference)
        .map_err(|e| DebitError::Builder(format!("invalid mandate reference: {e}")))?;
    if reference.len() > MAX_REFERENCE_LEN {
        return Err(DebitError::Builder(format!(
            "mandate reference '{reference}' exceeds {MAX_REFERENCE_LEN} characters"
        )));
    }
    Ok(reference)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn without_prefix() {
        assert_eq!(
            mandate_reference(None, "democon", "ABC12").unwrap(),
            "DEMOCON-ABC12"
        );
    }

    #[test]
    fn with_prefix() {
        assert_eq!(
            mandate_reference(Some("TIX"), "democon", "ABC12").unwrap(),
            "TIX-DEMOCON-ABC12"
        );
    }

    #[test]
    fn rejects_bad_charset() {
        assert!(mandate_reference(None, "demo con", "ABC12").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let slug = "x".repeat(40);
        assert!(mandate_reference(None, &slug, "ABC12").is_err());
    }
}
