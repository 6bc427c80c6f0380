//! Company website to bare hostname.

use tracing::debug;
use url::Url;

/// Extracts the bare hostname from a company website.
///
/// A missing scheme defaults to `https://`, and a leading `www.` is
/// stripped. Returns `None` when no hostname can be parsed out of the
/// input.
#[must_use]
pub fn resolve_domain(website: &str) -> Option<String> {
    let website = website.trim();
    let full = if website.starts_with("http") {
        website.to_string()
    } else {
        format!("https://{website}")
    };

    let url = match Url::parse(&full) {
        Ok(url) => url,
        Err(err) => {
            debug!(website, %err, "failed to parse website URL");
            return None;
        }
    };

    let host = url.host_str()?;
    Some(host.strip_prefix("www.").unwrap_or(host).to_string())
}
