use std::{net::IpAddr, time::Instant};

use dom_smoothie::{Article, Readability};
use tracing::{info, warn};

use common::error::AppError;

/// Readable text pulled out of one fetched page.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub title: String,
    pub text: String,
}

/// Fetches a URL and extracts its readable article text.
///
/// `allow_private_hosts` lifts the loopback/private-range restriction; it is
/// meant for local setups and tests, never for an internet-facing deployment.
pub async fn extract_text_from_url(
    http: &reqwest::Client,
    url: &str,
    allow_private_hosts: bool,
) -> Result<FetchedDocument, AppError> {
    info!("Fetching URL: {}", url);
    let now = Instant::now();

    let parsed_url = url::Url::parse(url)
        .map_err(|_| AppError::Validation(format!("Invalid URL: {url}")))?;
    ensure_ingestion_url_allowed(&parsed_url, allow_private_hosts)?;

    let response = http.get(parsed_url).send().await?.error_for_status()?;
    let raw_content = response.text().await?;

    let mut readability = Readability::new(raw_content, Some(url), None)?;
    let article: Article = readability.parse()?;

    info!(
        "URL: {}. Extracted {} chars in {:?}",
        url,
        article.text_content.len(),
        now.elapsed()
    );

    Ok(FetchedDocument {
        url: url.to_string(),
        title: article.title,
        text: article.text_content.into(),
    })
}

fn ensure_ingestion_url_allowed(
    url: &url::Url,
    allow_private_hosts: bool,
) -> Result<(), AppError> {
    match url.scheme() {
        "http" | "https" => {}
        scheme => {
            warn!(%url, %scheme, "Rejected ingestion URL due to unsupported scheme");
            return Err(AppError::Validation(
                "Unsupported URL scheme for ingestion".to_string(),
            ));
        }
    }

    let Some(host) = url.host_str() else {
        warn!(%url, "Rejected ingestion URL missing host");
        return Err(AppError::Validation(
            "URL is missing a host component".to_string(),
        ));
    };

    if allow_private_hosts {
        return Ok(());
    }

    if host.eq_ignore_ascii_case("localhost") {
        warn!(%url, host, "Rejected ingestion URL to localhost");
        return Err(AppError::Validation(
            "Ingestion URL host is not allowed".to_string(),
        ));
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        let is_disallowed = match ip {
            IpAddr::V4(v4) => v4.is_private() || v4.is_link_local(),
            IpAddr::V6(v6) => v6.is_unique_local() || v6.is_unicast_link_local(),
        };

        if ip.is_loopback() || ip.is_unspecified() || ip.is_multicast() || is_disallowed {
            warn!(%url, host, %ip, "Rejected ingestion URL pointing to restricted network range");
            return Err(AppError::Validation(
                "Ingestion URL host is not allowed".to_string(),
            ));
        }
    }

    Ok(())
}
