//! RFC 5321 mailbox validation for bare `local-part@domain` strings.
//!
//! Candidate addresses are machine-composed and user-supplied sender
//! addresses arrive without angle brackets, so this parser handles the
//! Mailbox production only — no paths, source routes, quoted strings, or
//! address literals.
//!
//! # ABNF (RFC 5321 Section 4.1.2, subset)
//!
//! ```text
//! Mailbox     = Local-part "@" Domain
//! Local-part  = Dot-string
//! Dot-string  = Atom *("." Atom)
//! Atom        = 1*atext
//! Domain      = sub-domain *("." sub-domain)
//! sub-domain  = Let-dig [Ldh-str]
//! ```
//!
//! Size limits: local-part ≤ 64 octets, domain ≤ 255 octets.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced while validating a mailbox string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Empty input.
    #[error("empty address")]
    Empty,

    /// Missing '@' separator.
    #[error("missing '@' separator")]
    MissingAtSign,

    /// Local-part exceeds 64 octets.
    #[error("local-part exceeds 64 octets")]
    LocalPartTooLong,

    /// Domain exceeds 255 octets.
    #[error("domain exceeds 255 octets")]
    DomainTooLong,

    /// Invalid character or structure in the local-part.
    #[error("invalid local-part: {0}")]
    InvalidLocalPart(String),

    /// Invalid character or structure in the domain.
    #[error("invalid domain: {0}")]
    InvalidDomain(String),
}

/// A validated mailbox (`local-part@domain`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mailbox {
    /// The part before '@'.
    pub local_part: String,
    /// The part after '@'.
    pub domain: String,
}

impl std::fmt::Display for Mailbox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.local_part, self.domain)
    }
}

impl Mailbox {
    /// Validates and splits a bare `local-part@domain` string.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if the input is not a valid RFC 5321
    /// dot-string mailbox.
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }

        // Exactly one '@' splits local-part from domain. A second '@' can
        // only come from malformed input since quoted strings are not
        // accepted here.
        let at_pos = trimmed.find('@').ok_or(AddressError::MissingAtSign)?;
        let (local_part, domain) = trimmed.split_at(at_pos);
        let domain = &domain[1..];

        if local_part.len() > 64 {
            return Err(AddressError::LocalPartTooLong);
        }
        if domain.len() > 255 {
            return Err(AddressError::DomainTooLong);
        }

        validate_dot_string(local_part)?;
        validate_domain(domain)?;

        Ok(Self {
            local_part: local_part.to_string(),
            domain: domain.to_string(),
        })
    }
}

/// Validate a Dot-string: Atom *("." Atom)
fn validate_dot_string(input: &str) -> Result<(), AddressError> {
    if input.is_empty() {
        return Err(AddressError::InvalidLocalPart(
            "empty local-part".to_string(),
        ));
    }

    if input.starts_with('.') || input.ends_with('.') {
        return Err(AddressError::InvalidLocalPart(
            "dot-string cannot start or end with '.'".to_string(),
        ));
    }

    if input.contains("..") {
        return Err(AddressError::InvalidLocalPart(
            "dot-string cannot contain consecutive dots".to_string(),
        ));
    }

    for atom in input.split('.') {
        for ch in atom.chars() {
            if !is_atext(ch) {
                return Err(AddressError::InvalidLocalPart(format!(
                    "invalid character '{ch}' in atom"
                )));
            }
        }
    }

    Ok(())
}

/// Validate a Domain: sub-domain *("." sub-domain)
fn validate_domain(input: &str) -> Result<(), AddressError> {
    if input.is_empty() {
        return Err(AddressError::InvalidDomain("empty domain".to_string()));
    }

    if input.starts_with('.') || input.ends_with('.') {
        return Err(AddressError::InvalidDomain(
            "domain cannot start or end with '.'".to_string(),
        ));
    }

    if input.contains("..") {
        return Err(AddressError::InvalidDomain(
            "domain cannot contain consecutive dots".to_string(),
        ));
    }

    for subdomain in input.split('.') {
        validate_subdomain(subdomain)?;
    }

    Ok(())
}

/// Validate a sub-domain: Let-dig [Ldh-str]
fn validate_subdomain(input: &str) -> Result<(), AddressError> {
    if input
        .chars()
        .next()
        .is_none_or(|first| !first.is_ascii_alphanumeric())
    {
        return Err(AddressError::InvalidDomain(
            "subdomain must start with a letter or digit".to_string(),
        ));
    }

    if input
        .chars()
        .last()
        .is_none_or(|last| !last.is_ascii_alphanumeric())
    {
        return Err(AddressError::InvalidDomain(
            "subdomain must end with a letter or digit".to_string(),
        ));
    }

    for ch in input.chars() {
        if !ch.is_ascii_alphanumeric() && ch != '-' {
            return Err(AddressError::InvalidDomain(format!(
                "invalid character '{ch}' in subdomain"
            )));
        }
    }

    Ok(())
}

/// atext = ALPHA / DIGIT / "!" / "#" / "$" / "%" / "&" / "'" /
///         "*" / "+" / "-" / "/" / "=" / "?" / "^" / "_" / "\`" /
///         "{" / "|" / "}" / "~"
#[inline]
const fn is_atext(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || matches!(
            ch,
            '!' | '#'
                | '$'
                | '%'
                | '&'
                | '\''
                | '*'
                | '+'
                | '-'
                | '/'
                | '='
                | '?'
                | '^'
                | '_'
                | '`'
                | '{'
                | '|'
                | '}'
                | '~'
        )
}
