//! Centralized input validation and sanitization.
//!
//! Every handler routes user input through here exactly once before it
//! reaches a repository or service. Nothing below this layer re-validates.

use crate::error::ApiError;

pub const MIN_NAME_LENGTH: usize = 2;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_SEARCH_LENGTH: usize = 100;
pub const DEFAULT_PAGE_LIMIT: i64 = 20;
pub const MAX_PAGE_LIMIT: i64 = 100;

/// Validate a person or organization name field
pub fn validate_name(field: &str, value: &str) -> Result<(), ApiError> {
    let trimmed = value.trim();
    if trimmed.len() < MIN_NAME_LENGTH {
        return Err(ApiError::validation(format!(
            "{} must be at least {} characters",
            field, MIN_NAME_LENGTH
        )));
    }
    Ok(())
}

/// Basic structural email validation
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ApiError::validation("Email is required"));
    }

    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 || parts[0].is_empty() || parts[1].is_empty() || !parts[1].contains('.') {
        return Err(ApiError::validation("Invalid email format"));
    }

    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

/// Derive a URL-safe slug from a display name: lowercase, runs of
/// non-alphanumeric characters collapsed to a single hyphen, leading and
/// trailing hyphens stripped. Deterministic for a given input.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true; // suppress a leading hyphen

    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Sanitize free-text search input before it reaches an ILIKE pattern.
/// Length-capped, control characters dropped, and the pattern metacharacters
/// `%`, `_` and `\` escaped so attacker input cannot alter match semantics.
pub fn sanitize_search(input: &str) -> String {
    let mut out = String::with_capacity(input.len().min(MAX_SEARCH_LENGTH) * 2);
    for c in input.trim().chars().take(MAX_SEARCH_LENGTH) {
        if c.is_control() {
            continue;
        }
        if c == '%' || c == '_' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Sanitized pagination inputs with floor defaults
#[derive(Debug, Clone, Copy)]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
}

impl Pagination {
    pub fn from_query(page: Option<i64>, limit: Option<i64>) -> Self {
        let page = page.unwrap_or(1).max(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT);
        Self { page, limit }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }

    /// Total page count for a result set of `total` rows
    pub fn pages(&self, total: i64) -> i64 {
        if total == 0 {
            0
        } else {
            (total + self.limit - 1) / self.limit
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_is_lowercase_and_hyphenated() {
        assert_eq!(slugify("Acme Inc"), "acme-inc");
        assert_eq!(slugify("  Big -- Deal Co.  "), "big-deal-co");
        assert_eq!(slugify("ALLCAPS"), "allcaps");
        assert_eq!(slugify("a&b@c"), "a-b-c");
    }

    #[test]
    fn slugify_strips_edge_hyphens() {
        assert_eq!(slugify("--edge--"), "edge");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn slugify_is_deterministic() {
        assert_eq!(slugify("Acme Inc"), slugify("Acme Inc"));
    }

    #[test]
    fn email_validation() {
        assert!(validate_email("a@acme.com").is_ok());
        assert!(validate_email("a@b").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("@acme.com").is_err());
        assert!(validate_email("").is_err());
    }

    #[test]
    fn password_minimum_length() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn search_escapes_pattern_metacharacters() {
        assert_eq!(sanitize_search("100%_done"), "100\\%\\_done");
        assert_eq!(sanitize_search("back\\slash"), "back\\\\slash");
        assert_eq!(sanitize_search("plain text"), "plain text");
    }

    #[test]
    fn search_drops_control_chars_and_caps_length() {
        assert_eq!(sanitize_search("a\x00b\nc"), "abc");
        let long = "x".repeat(500);
        assert_eq!(sanitize_search(&long).len(), MAX_SEARCH_LENGTH);
    }

    #[test]
    fn pagination_defaults_and_clamps() {
        let p = Pagination::from_query(None, None);
        assert_eq!((p.page, p.limit), (1, 20));

        let p = Pagination::from_query(Some(0), Some(0));
        assert_eq!((p.page, p.limit), (1, 1));

        let p = Pagination::from_query(Some(-3), Some(500));
        assert_eq!((p.page, p.limit), (1, 100));

        let p = Pagination::from_query(Some(3), Some(10));
        assert_eq!(p.offset(), 20);
    }

    #[test]
    fn page_count_is_ceiling_of_total_over_limit() {
        let p = Pagination::from_query(Some(1), Some(20));
        assert_eq!(p.pages(0), 0);
        assert_eq!(p.pages(1), 1);
        assert_eq!(p.pages(20), 1);
        assert_eq!(p.pages(21), 2);
        assert_eq!(p.pages(45), 3);
    }
}
