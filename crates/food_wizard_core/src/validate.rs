//! Query validation. Runs before any network or storage access.

use crate::domain::ValidQuery;

pub const MAX_QUERY_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryRejection {
    #[error("Search Parameter is Required")]
    Missing,
    #[error("Search Parameter is Required")]
    Empty,
    #[error("Query Too Long (max 100 chars)")]
    TooLong { length: usize },
}

/// Trims and bounds a raw query.
pub fn validate(raw: Option<&str>) -> Result<ValidQuery, QueryRejection> {
    let trimmed = raw.ok_or(QueryRejection::Missing)?.trim();
    if trimmed.is_empty() {
        return Err(QueryRejection::Empty);
    }
    let length = trimmed.chars().count();
    if length > MAX_QUERY_CHARS {
        return Err(QueryRejection::TooLong { length });
    }
    Ok(ValidQuery::new(trimmed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_and_trims() {
        let q = validate(Some("  apple ")).unwrap();
        assert_eq!(q.as_str(), "apple");
    }

    #[test]
    fn rejects_missing_and_blank() {
        assert_eq!(validate(None), Err(QueryRejection::Missing));
        assert_eq!(validate(Some("")), Err(QueryRejection::Empty));
        assert_eq!(validate(Some(" \t\n ")), Err(QueryRejection::Empty));
    }

    #[test]
    fn length_is_counted_after_trimming() {
        let exact = "a".repeat(MAX_QUERY_CHARS);
        let padded = format!("  {exact}  ");
        assert!(validate(Some(padded.as_str())).is_ok());

        let long = "a".repeat(MAX_QUERY_CHARS + 1);
        assert_eq!(
            validate(Some(long.as_str())),
            Err(QueryRejection::TooLong { length: 101 })
        );
    }

    #[test]
    fn counts_characters_not_bytes() {
        let accented = "é".repeat(MAX_QUERY_CHARS);
        assert!(validate(Some(accented.as_str())).is_ok());
    }
}
