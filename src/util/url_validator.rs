use std::net::IpAddr;
use thiserror::Error;
use url::Url;

/// Errors that can occur while validating the API base URL.
#[derive(Error, Debug)]
pub enum UrlValidationError {
    /// The URL string could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// The URL uses a scheme other than http or https.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    /// Plain HTTP to anything other than the local machine.
    #[error("HTTPS required (plain HTTP is only allowed for localhost)")]
    Insecure,
}

/// Validates the API base URL the bearer token will be sent to.
///
/// HTTPS is required, except for `localhost` and loopback addresses so a
/// development backend or a test server can be used. The returned URL
/// always has a trailing slash on its path, so relative endpoint paths
/// join beneath it instead of replacing its last segment.
///
/// # Examples
///
/// ```
/// use newsdesk::util::validate_base_url;
///
/// let url = validate_base_url("https://cms.example.com/api").unwrap();
/// assert_eq!(url.join("user").unwrap().as_str(), "https://cms.example.com/api/user");
///
/// assert!(validate_base_url("http://localhost:8000/api/").is_ok());
/// assert!(validate_base_url("http://cms.example.com/api/").is_err());
/// ```
pub fn validate_base_url(url_str: &str) -> Result<Url, UrlValidationError> {
    let mut url = Url::parse(url_str.trim())?;

    match url.scheme() {
        "https" => {}
        "http" => {
            if !is_local_host(&url) {
                return Err(UrlValidationError::Insecure);
            }
        }
        scheme => return Err(UrlValidationError::UnsupportedScheme(scheme.to_owned())),
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

fn is_local_host(url: &Url) -> bool {
    let Some(host) = url.host_str() else {
        return false;
    };
    if host == "localhost" {
        return true;
    }

    // Strip brackets from IPv6 addresses for parsing
    let host_for_parse = host
        .strip_prefix('[')
        .and_then(|h| h.strip_suffix(']'))
        .unwrap_or(host);

    host_for_parse
        .parse::<IpAddr>()
        .is_ok_and(|ip| ip.is_loopback())
}
