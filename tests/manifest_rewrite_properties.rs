//! Property tests for the manifest rewrite and percent-encoding helpers:
//! line count and tag-line preservation must hold for arbitrary
//! well-formed segment lists, not just the handful of fixtures in the
//! unit tests beside the implementation.

use proptest::collection::vec as prop_vec;
use proptest::prelude::*;

use streamcore::infrastructure::proxy::manifest_rewrite::{percent_encode, rewrite_manifest};

fn segment_name() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,12}".prop_map(|s| format!("{s}.ts"))
}

proptest! {
    /// Rewriting never changes the number of lines in the manifest: every
    /// `#EXT*` tag line and every URI line maps to exactly one output line.
    #[test]
    fn rewrite_preserves_line_count(segments in prop_vec(segment_name(), 0..50)) {
        let mut manifest = String::from("#EXTM3U\n#EXT-X-VERSION:6\n");
        for segment in &segments {
            manifest.push_str("#EXTINF:6.000,\n");
            manifest.push_str(segment);
            manifest.push('\n');
        }

        let out = rewrite_manifest(&manifest, "https://cdn.example/hls/master.m3u8", "/api/stream-proxy", "shadowlands");

        prop_assert_eq!(manifest.lines().count(), out.lines().count());
    }

    /// Every non-tag, non-blank line in the output is routed through the
    /// configured proxy base path.
    #[test]
    fn every_segment_line_is_proxied(segments in prop_vec(segment_name(), 1..20)) {
        let mut manifest = String::from("#EXTM3U\n");
        for segment in &segments {
            manifest.push_str(segment);
            manifest.push('\n');
        }

        let out = rewrite_manifest(&manifest, "https://cdn.example/hls/master.m3u8", "/api/stream-proxy", "vidsrc");

        for line in out.lines().skip(1) {
            prop_assert!(line.starts_with("/api/stream-proxy?url="));
            prop_assert!(line.ends_with("&source=vidsrc"));
        }
    }

    /// `percent_encode` only ever emits unreserved characters or
    /// `%XX` triplets, and round-trips length in a bounded way (never
    /// shrinks, grows by exactly 2 bytes per escaped byte).
    #[test]
    fn percent_encode_only_emits_unreserved_or_escape_triplets(input in ".*") {
        let encoded = percent_encode(&input);
        let escaped_bytes = input.bytes().filter(|b| {
            !matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~')
        }).count();
        let unreserved_bytes = input.bytes().count() - escaped_bytes;

        prop_assert_eq!(encoded.len(), unreserved_bytes + escaped_bytes * 3);
        prop_assert!(encoded.chars().all(|c| c.is_ascii()));
    }
}
