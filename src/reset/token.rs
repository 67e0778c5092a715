use regex::Regex;
use std::sync::LazyLock;
use uuid::Uuid;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,6}$").unwrap()
});

// 22 hex chars (legacy tokens) or a canonical UUID.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:[0-9a-f]{22}|[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12})$",
    )
    .unwrap()
});

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Cheap lexical check done before any store lookup.
pub fn is_well_formed(token: &str) -> bool {
    TOKEN_RE.is_match(token)
}

/// Fresh reset token: a random (v4) UUID in canonical form.
pub fn generate() -> String {
    Uuid::new_v4().to_string()
}
