//! SRT to WebVTT converter.
//!
//! Converts SubRip (.srt) subtitle content to WebVTT, block by block,
//! so that a handful of malformed blocks in an otherwise good file don't
//! sink the whole conversion. Each block is validated independently and
//! a bad one is simply dropped; the caller decides whether the overall
//! yield was good enough to accept.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::shared::error::SubtitleError;

/// Matches an SRT or VTT timestamp pair, tolerant of either `,` or `.`
/// as the millisecond separator so it also accepts VTT input unchanged.
static TIMESTAMP_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d{2}):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d{2}):(\d{2}):(\d{2})[,.](\d{3})").unwrap()
});

static FONT_OPEN_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<font[^>]*>").unwrap());
static FONT_CLOSE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)</font\s*>").unwrap());

const MIN_CUE_DURATION_SECONDS: f64 = 0.1;
const MIN_BLOCK_SUCCESS_RATIO: f64 = 0.8;

/// One successfully parsed SRT block, ready to be rendered as a VTT cue.
struct ParsedBlock {
    start_seconds: f64,
    end_seconds: f64,
    text_lines: Vec<String>,
}

/// Converts SRT content to WebVTT, validating and rendering block by
/// block. Returns `SubtitleFormatError` if fewer than 80% of the input
/// blocks parsed successfully, or if not a single cue was emitted.
pub fn convert_srt_to_vtt(srt_content: &str) -> Result<String, SubtitleError> {
    let normalized = srt_content.replace("\r\n", "\n").replace('\r', "\n");
    let raw_blocks: Vec<&str> = normalized
        .split("\n\n")
        .flat_map(|chunk| chunk.split("\n\n"))
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .collect();

    if raw_blocks.is_empty() {
        return Ok("WEBVTT\n\n".to_string());
    }

    let mut parsed = Vec::with_capacity(raw_blocks.len());
    for block in &raw_blocks {
        if let Some(p) = parse_block(block) {
            parsed.push(p);
        }
    }

    let success_ratio = parsed.len() as f64 / raw_blocks.len() as f64;
    if parsed.is_empty() || success_ratio < MIN_BLOCK_SUCCESS_RATIO {
        return Err(SubtitleError::InvalidFormat(format!(
            "only {}/{} subtitle blocks parsed successfully",
            parsed.len(),
            raw_blocks.len()
        )));
    }

    Ok(render_vtt(&parsed))
}

/// Parses one blank-line-delimited SRT block. Returns `None` if the
/// block is malformed in any of the ways the caller should discard and
/// continue on: missing timestamp line, sub-threshold duration, or
/// empty cue text after tag stripping.
fn parse_block(block: &str) -> Option<ParsedBlock> {
    let mut lines = block.lines();
    let _index_line = lines.next()?;
    let timestamp_line = lines.next()?.trim();

    let caps = TIMESTAMP_LINE.captures(timestamp_line)?;
    let start_seconds = timestamp_from_captures(&caps, 1);
    let end_seconds = timestamp_from_captures(&caps, 5);

    if end_seconds - start_seconds < MIN_CUE_DURATION_SECONDS {
        return None;
    }

    let text_lines: Vec<String> = lines
        .map(strip_font_tags)
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect();

    if text_lines.is_empty() {
        return None;
    }

    Some(ParsedBlock { start_seconds, end_seconds, text_lines })
}

fn timestamp_from_captures(caps: &regex::Captures, group_offset: usize) -> f64 {
    let hours: f64 = caps[group_offset].parse().unwrap_or(0.0);
    let minutes: f64 = caps[group_offset + 1].parse().unwrap_or(0.0);
    let seconds: f64 = caps[group_offset + 2].parse().unwrap_or(0.0);
    let millis: f64 = caps[group_offset + 3].parse().unwrap_or(0.0);
    hours * 3600.0 + minutes * 60.0 + seconds + millis / 1000.0
}

/// Strips `<font ...>`/`</font>` tags while preserving `<i>`, `<b>`, `<u>`
/// and their content untouched.
fn strip_font_tags(line: &str) -> String {
    let without_open = FONT_OPEN_TAG.replace_all(line, "");
    FONT_CLOSE_TAG.replace_all(&without_open, "").to_string()
}

fn render_vtt(blocks: &[ParsedBlock]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for (i, block) in blocks.iter().enumerate() {
        out.push_str(&(i + 1).to_string());
        out.push('\n');
        out.push_str(&format!(
            "{} --> {}\n",
            format_timestamp(block.start_seconds),
            format_timestamp(block.end_seconds)
        ));
        out.push_str(&block.text_lines.join("\n"));
        out.push_str("\n\n");
    }
    out
}

/// Formats seconds as a VTT timestamp (HH:MM:SS.mmm).
fn format_timestamp(total_seconds: f64) -> String {
    let hours = (total_seconds / 3600.0).floor() as u32;
    let minutes = ((total_seconds % 3600.0) / 60.0).floor() as u32;
    let seconds = (total_seconds % 60.0).floor() as u32;
    let millis = ((total_seconds % 1.0) * 1000.0).round() as u32;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// Counts emitted cues in a rendered VTT body: one per `-->` line.
/// Used to confirm a cached blob is well-formed without re-parsing it
/// as SRT.
pub fn cue_count(vtt_body: &str) -> usize {
    vtt_body.lines().filter(|l| l.contains("-->")).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_well_formed_srt() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nHello World\n\n2\n00:00:05,500 --> 00:00:08,000\nSecond line\n";
        let vtt = convert_srt_to_vtt(srt).unwrap();

        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:04.000"));
        assert!(vtt.contains("00:00:05.500 --> 00:00:08.000"));
        assert!(vtt.contains("Hello World"));
        assert!(vtt.contains("Second line"));
        assert_eq!(cue_count(&vtt), 2);
    }

    #[test]
    fn preserves_multiline_cue_text() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\nLine one\nLine two\n";
        let vtt = convert_srt_to_vtt(srt).unwrap();
        assert!(vtt.contains("Line one\nLine two"));
    }

    #[test]
    fn strips_font_tags_but_keeps_italics() {
        let srt = "1\n00:00:01,000 --> 00:00:04,000\n<font color=\"#FFFFFF\">Hello <i>world</i></font>\n";
        let vtt = convert_srt_to_vtt(srt).unwrap();
        assert!(vtt.contains("Hello <i>world</i>"));
        assert!(!vtt.contains("<font"));
        assert!(!vtt.contains("</font>"));
    }

    #[test]
    fn discards_block_with_sub_threshold_duration() {
        let srt = concat!(
            "1\n00:00:01,000 --> 00:00:01,050\nToo short\n\n",
            "2\n00:00:02,000 --> 00:00:05,000\nGood block\n",
        );
        let vtt = convert_srt_to_vtt(srt).unwrap();
        assert!(!vtt.contains("Too short"));
        assert!(vtt.contains("Good block"));
        assert_eq!(cue_count(&vtt), 1);
    }

    #[test]
    fn discards_block_with_empty_text() {
        let srt = concat!(
            "1\n00:00:01,000 --> 00:00:04,000\n\n\n",
            "2\n00:00:05,000 --> 00:00:08,000\nReal text\n",
        );
        let vtt = convert_srt_to_vtt(srt).unwrap();
        assert!(vtt.contains("Real text"));
        assert_eq!(cue_count(&vtt), 1);
    }

    #[test]
    fn rejects_file_below_block_success_threshold() {
        let srt = concat!(
            "1\nnot a timestamp\nbroken\n\n",
            "2\nalso broken\nbroken\n\n",
            "3\n00:00:01,000 --> 00:00:04,000\nonly one good block\n",
        );
        let result = convert_srt_to_vtt(srt);
        assert!(result.is_err());
    }

    #[test]
    fn empty_input_yields_bare_header() {
        assert_eq!(convert_srt_to_vtt("").unwrap(), "WEBVTT\n\n");
    }

    #[test]
    fn cue_count_counts_arrow_lines_only() {
        let vtt = "WEBVTT\n\n1\n00:00:01.000 --> 00:00:02.000\nHi\n\n2\n00:00:03.000 --> 00:00:04.000\nBye\n\n";
        assert_eq!(cue_count(vtt), 2);
    }
}
