//! Play-button selector fallback list and manifest URL pattern matching.
//!
//! Treated as data, not code: both engines consult the same ordered
//! selector list and the same host/token matching rules, so a provider
//! markup change only ever needs a constant updated here.

/// CSS selectors tried in order at the rcp stage; first element present
/// in the DOM wins.
pub const PLAY_BUTTON_SELECTORS: &[&str] = &["#pl_but", ".fa-play", "button.vjs-big-play-button", "[class*=\"play\"]"];

/// Host substrings that flag a resolved URL for shadowlands-routed proxying.
pub const SHADOWLANDS_HOST_MARKERS: &[&str] = &["shadowlandschronicles.com", "shadowlands"];

/// Token that also flags a URL for shadowlands-routed proxying even
/// when the host doesn't literally contain "shadowlands".
pub const SHADOWLANDS_TOKEN: &str = "tmstr";

/// Host substring identifying a cloudnestra-origin manifest, proxied
/// under the requesting server's own source tag.
pub const CLOUDNESTRA_HOST_MARKER: &str = "cloudnestra.com";

/// Classifies a resolved manifest/stream URL the way stage 5 requires:
/// shadowlands URLs and `tmstr`-tagged URLs proxy as `shadowlands`;
/// cloudnestra URLs proxy under the requesting server's own tag; any
/// other `.m3u8` URL is used directly.
pub fn classify_stream_url(url: &str, server: &str) -> (bool, Option<String>) {
    let lower = url.to_lowercase();

    if SHADOWLANDS_HOST_MARKERS.iter().any(|m| lower.contains(m)) || lower.contains(SHADOWLANDS_TOKEN) {
        return (true, Some("shadowlands".to_string()));
    }
    if lower.contains(CLOUDNESTRA_HOST_MARKER) {
        return (true, Some(server.to_string()));
    }
    (false, None)
}

/// Builds the top-level vidsrc embed URL for a title.
pub fn vidsrc_embed_url(kind: &str, tmdb_id: u64, season: Option<u32>, episode: Option<u32>) -> String {
    match (season, episode) {
        (Some(s), Some(e)) => format!("https://vidsrc.xyz/embed/{kind}/{tmdb_id}/{s}-{e}"),
        _ => format!("https://vidsrc.xyz/embed/{kind}/{tmdb_id}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_shadowlands_variants_as_shadowlands() {
        assert_eq!(
            classify_stream_url("https://shadowlandschronicles.com/x/index.m3u8", "vidsrc"),
            (true, Some("shadowlands".to_string()))
        );
        assert_eq!(
            classify_stream_url("https://cdn.example/tmstr/abc/index.m3u8", "vidsrc"),
            (true, Some("shadowlands".to_string()))
        );
    }

    #[test]
    fn classifies_cloudnestra_under_requesting_server() {
        assert_eq!(
            classify_stream_url("https://cloudnestra.com/hls/index.m3u8", "embed.su"),
            (true, Some("embed.su".to_string()))
        );
    }

    #[test]
    fn classifies_plain_manifest_as_direct() {
        assert_eq!(classify_stream_url("https://cdn.example/1080p/index.m3u8", "vidsrc"), (false, None));
    }

    #[test]
    fn builds_embed_url_for_movie_and_episode() {
        assert_eq!(vidsrc_embed_url("movie", 550, None, None), "https://vidsrc.xyz/embed/movie/550");
        assert_eq!(vidsrc_embed_url("tv", 1399, Some(1), Some(1)), "https://vidsrc.xyz/embed/tv/1399/1-1");
    }
}
