//! JSON-RPC endpoint URL validation.

use crate::error::EndpointError;
use std::net::Ipv4Addr;
use url::{Host, Url};

/// Schemes accepted for an endpoint URL.
pub const ACCEPTED_SCHEMES: [&str; 6] = ["http", "https", "wss", "wsss", "rpc", "rpcs"];

/// Validate an endpoint of the form `scheme://host[:port][/path]`.
///
/// The host must be a domain name, `localhost`, or a dotted IPv4 address.
pub fn validate_endpoint(raw: &str) -> Result<Url, EndpointError> {
    if raw.chars().any(char::is_whitespace) {
        return Err(EndpointError::Whitespace);
    }

    let url = Url::parse(raw).map_err(|e| EndpointError::Parse(e.to_string()))?;

    if !ACCEPTED_SCHEMES.contains(&url.scheme()) {
        return Err(EndpointError::Scheme(url.scheme().to_string()));
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err(EndpointError::Credentials);
    }

    let valid_host = match url.host() {
        // Special schemes normalize shorthand like `127.1` or `2130706433`
        // into an address, so the host must be checked as written.
        Some(Host::Ipv4(_)) => written_host(raw).is_some_and(|host| host.parse::<Ipv4Addr>().is_ok()),
        // Non-special schemes (rpc, wss) keep the host opaque, so dotted
        // addresses arrive here as domains.
        Some(Host::Domain(domain)) => {
            domain.eq_ignore_ascii_case("localhost")
                || domain.parse::<Ipv4Addr>().is_ok()
                || is_domain_name(domain)
        }
        Some(Host::Ipv6(_)) | None => false,
    };
    if !valid_host {
        return Err(EndpointError::Host(raw.to_string()));
    }

    Ok(url)
}

/// Host portion of `scheme://host[:port]...` exactly as it appears in `raw`.
fn written_host(raw: &str) -> Option<&str> {
    let (_, rest) = raw.split_once("://")?;
    let authority = rest.split(['/', '?', '#']).next()?;
    match authority.rsplit_once(':') {
        Some((host, port)) if port.chars().all(|c| c.is_ascii_digit()) => Some(host),
        _ => Some(authority),
    }
}

/// At least two dot-separated labels; a trailing dot is allowed.
fn is_domain_name(domain: &str) -> bool {
    let domain = domain.strip_suffix('.').unwrap_or(domain);
    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };
    if rest.is_empty()
        || tld.len() < 2
        || !tld.chars().all(is_label_char)
        || tld.chars().all(|c| c.is_ascii_digit())
    {
        return false;
    }
    rest.iter().all(|label| {
        (1..=63).contains(&label.len())
            && label.chars().all(is_label_char)
            && !label.starts_with('-')
            && !label.ends_with('-')
    })
}

fn is_label_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-'
}
