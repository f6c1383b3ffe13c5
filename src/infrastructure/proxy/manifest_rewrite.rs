//! HLS manifest (M3U8) rewriting for the stream proxy.
//!
//! Grounded on the reverse-proxy rewrite logic used elsewhere in the
//! corpus for per-provider M3U8 passthrough, generalized here to also
//! rewrite `URI="..."` attributes on `EXT-X-KEY`, `EXT-X-MAP`, and
//! `EXT-X-MEDIA` tag lines, not just bare URI lines.

use url::Url;

/// Tags whose value carries a `URI="..."` attribute that must be rewritten.
const URI_ATTRIBUTE_TAGS: [&str; 3] = ["#EXT-X-KEY", "#EXT-X-MAP", "#EXT-X-MEDIA"];

/// Rewrites every URI-bearing line or attribute in an M3U8 body so it
/// routes back through the proxy, preserving the given source tag.
/// All `#EXT*` tags are preserved verbatim (RFC 8216); only URI values change.
pub fn rewrite_manifest(body: &str, manifest_url: &str, proxy_base: &str, source: &str) -> String {
    let base = Url::parse(manifest_url).ok();
    let mut output = String::with_capacity(body.len() + 256);

    for line in body.lines() {
        if line.starts_with('#') {
            if URI_ATTRIBUTE_TAGS.iter().any(|tag| line.starts_with(tag)) {
                output.push_str(&rewrite_uri_attribute(line, base.as_ref(), proxy_base, source));
            } else {
                output.push_str(line);
            }
        } else {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                output.push_str(line);
            } else {
                let absolute = make_absolute(trimmed, base.as_ref());
                output.push_str(&proxied_url(&absolute, proxy_base, source));
            }
        }
        output.push('\n');
    }

    output
}

/// Resolves a possibly-relative URI against the manifest's own URL.
fn make_absolute(raw: &str, base: Option<&Url>) -> String {
    if raw.starts_with("http://") || raw.starts_with("https://") {
        return raw.to_string();
    }
    if let Some(base) = base {
        if let Ok(joined) = base.join(raw) {
            return joined.to_string();
        }
    }
    raw.to_string()
}

fn rewrite_uri_attribute(line: &str, base: Option<&Url>, proxy_base: &str, source: &str) -> String {
    let pattern = "URI=\"";
    let mut result = String::with_capacity(line.len());
    let mut remaining = line;

    while let Some(start) = remaining.find(pattern) {
        result.push_str(&remaining[..start + pattern.len()]);
        remaining = &remaining[start + pattern.len()..];

        if let Some(end) = remaining.find('"') {
            let uri = &remaining[..end];
            let absolute = make_absolute(uri, base);
            result.push_str(&proxied_url(&absolute, proxy_base, source));
            result.push('"');
            remaining = &remaining[end + 1..];
        } else {
            result.push_str(remaining);
            remaining = "";
        }
    }

    result.push_str(remaining);
    result
}

fn proxied_url(absolute_url: &str, proxy_base: &str, source: &str) -> String {
    format!("{}?url={}&source={}", proxy_base, percent_encode(absolute_url), source)
}

/// Percent-encodes a value for embedding as a query-string parameter,
/// leaving only unreserved characters (RFC 3986) unescaped.
pub fn percent_encode(input: &str) -> String {
    use std::fmt::Write;
    let mut result = String::with_capacity(input.len() * 2);
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                result.push(byte as char);
            }
            _ => {
                let _ = write!(result, "%{byte:02X}");
            }
        }
    }
    result
}

/// True if a response should be treated as an HLS manifest and rewritten:
/// either the declared content type or a sniffed `#EXTM3U` body.
pub fn looks_like_manifest(content_type: Option<&str>, body_prefix: &str) -> bool {
    if let Some(ct) = content_type {
        if ct.contains("application/vnd.apple.mpegurl") || ct.contains("application/x-mpegurl") {
            return true;
        }
    }
    body_prefix.trim_start().starts_with("#EXTM3U")
}
