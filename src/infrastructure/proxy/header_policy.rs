//! Per-source header policy for the stream proxy.

/// The set of outbound headers the proxy injects for a given source tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderPolicy {
    pub origin: &'static str,
    pub referer: &'static str,
}

/// Recognized proxy source tags and their header policy.
pub const HEADER_POLICIES: &[(&str, HeaderPolicy)] = &[
    (
        "shadowlands",
        HeaderPolicy { origin: "https://cloudnestra.com", referer: "https://cloudnestra.com/" },
    ),
    (
        "vidsrc",
        HeaderPolicy { origin: "https://vidsrc.xyz", referer: "https://vidsrc.xyz/" },
    ),
    (
        "embed.su",
        HeaderPolicy { origin: "https://embed.su", referer: "https://embed.su/" },
    ),
    (
        "cloudnestra",
        HeaderPolicy { origin: "https://cloudnestra.com", referer: "https://cloudnestra.com/" },
    ),
];

/// A realistic desktop user agent applied to all proxied requests.
pub const PROXY_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Looks up the header policy for a source tag. Unknown tags fall back
/// to the `cloudnestra` policy, the most defensive of the four.
pub fn policy_for(source: &str) -> HeaderPolicy {
    HEADER_POLICIES
        .iter()
        .find(|(tag, _)| *tag == source)
        .map(|(_, policy)| *policy)
        .unwrap_or_else(|| policy_for("cloudnestra"))
}
