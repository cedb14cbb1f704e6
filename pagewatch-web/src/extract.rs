//! "Latest update" snippet extraction.
//!
//! The page is reduced to plain text (tags become line breaks, comments
//! are dropped, common entities are decoded), then the first date-shaped
//! substring anchors a forward window that becomes the snippet. Pages
//! with no date anywhere fall back to their first lines of text.

use regex::Regex;
use std::sync::OnceLock;

/// Characters taken past the date match start. Arbitrary boundary:
/// longer update blocks are silently clipped before normalisation.
/// Changing it changes every fingerprint, so leave it alone.
const SNIPPET_WINDOW_CHARS: usize = 1000;

/// Fallback when no date-shaped substring exists anywhere on the page.
const FALLBACK_LINES: usize = 40;

/// Matches `2024年5月1日`, `2024/5/1`, and `2024-5-1` style dates, year
/// prefixed with `20`, 1-2 digit month/day. A substring match, not
/// calendar validation; keep the pattern exactly as-is or the change
/// detector's sensitivity silently shifts.
fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(20\d{2}年\s*\d{1,2}月\s*\d{1,2}日|20\d{2}[/-]\d{1,2}[/-]\d{1,2})")
            .expect("date pattern compiles")
    })
}

/// Extract the normalized "latest update" snippet from raw HTML.
///
/// Always succeeds: a page with no date match still yields its leading
/// text, and an empty page yields an empty string.
pub fn extract_latest_block(html: &str) -> String {
    let text = text_from_html(html);
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    let joined = lines.join("\n");

    let candidate = match date_pattern().find(&joined) {
        Some(m) => {
            // Back up to the newline before the match so the snippet
            // starts at the beginning of the line containing the date.
            let start = joined[..m.start()].rfind('\n').unwrap_or(0);
            let end = char_window_end(&joined, m.start(), SNIPPET_WINDOW_CHARS);
            tracing::debug!(
                anchor_offset = m.start(),
                window_bytes = end - start,
                "extract.date_anchor"
            );
            joined[start..end].to_string()
        }
        None => {
            tracing::debug!(line_count = lines.len(), "extract.fallback");
            lines
                .iter()
                .take(FALLBACK_LINES)
                .copied()
                .collect::<Vec<_>>()
                .join("\n")
        }
    };

    collapse_whitespace(&candidate)
}

/// Byte offset `chars` characters past `from`, clipped to the text end.
fn char_window_end(s: &str, from: usize, chars: usize) -> usize {
    s[from..]
        .char_indices()
        .nth(chars)
        .map(|(off, _)| from + off)
        .unwrap_or(s.len())
}

/// Collapse all whitespace runs (newlines included) to single spaces.
fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Strip markup from HTML, emitting a line break at every tag boundary so
/// block structure survives as newlines. Comments are dropped entirely;
/// script/style text is kept (the fingerprint only needs stability, and
/// inline script churn is real page change anyway).
fn text_from_html(html: &str) -> String {
    let mut out = String::with_capacity(html.len() / 4);
    let mut rest = html;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix("<!--") {
            match stripped.find("-->") {
                Some(end) => rest = &stripped[end + 3..],
                None => break,
            }
            out.push('\n');
            continue;
        }
        if rest.starts_with('<') {
            match rest.find('>') {
                Some(end) => rest = &rest[end + 1..],
                None => break,
            }
            out.push('\n');
            continue;
        }
        match rest.find('<') {
            Some(next) => {
                push_decoded(&mut out, &rest[..next]);
                rest = &rest[next..];
            }
            None => {
                push_decoded(&mut out, rest);
                break;
            }
        }
    }

    out
}

/// Append `text` to `out`, decoding character entities as we go.
fn push_decoded(out: &mut String, text: &str) {
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match decode_entity(tail) {
            Some((ch, len)) => {
                out.push(ch);
                rest = &tail[len..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
}

/// Decode a leading entity (`tail` starts at `&`). Returns the character
/// and the consumed byte length, or `None` to pass the `&` through.
fn decode_entity(tail: &str) -> Option<(char, usize)> {
    let semi = tail[1..].find(';')? + 1;
    if semi > 32 {
        return None;
    }
    let name = &tail[1..semi];
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix('x').or_else(|| digits.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse::<u32>().ok()?
            };
            char::from_u32(code)?
        }
    };
    Some((ch, semi + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_on_first_date_line() {
        let html = "<html><body>\
            <p>会社概要やナビゲーションなどの前置きテキスト</p>\
            <div>2024年5月1日 更新情報：新着あり</div>\
            <p>続きの本文</p>\
            </body></html>";
        let snippet = extract_latest_block(html);
        assert!(snippet.starts_with("2024年5月1日"));
        assert!(snippet.contains("更新情報：新着あり"));
        assert!(!snippet.contains("前置き"));
    }

    #[test]
    fn slash_and_dash_dates_also_anchor() {
        for date in ["2025/1/7", "2025-1-7"] {
            let html = format!("<p>boilerplate</p><p>news {date} item</p>");
            let snippet = extract_latest_block(&html);
            assert!(snippet.starts_with("news"), "snippet was: {snippet}");
        }
    }

    #[test]
    fn only_first_date_is_used() {
        let html = "<p>intro</p><p>first 2024/3/1 entry</p><p>second 2024/4/1 entry</p>";
        let snippet = extract_latest_block(html);
        assert!(snippet.starts_with("first 2024/3/1"));
        // The window extends past the first match, so later entries may
        // appear inside the snippet; they just never move the anchor.
        assert!(snippet.contains("second 2024/4/1 entry"));
    }

    #[test]
    fn pre_2000_years_do_not_anchor() {
        let html = "<p>established 1998/4/1</p><p>plain text line</p>";
        let snippet = extract_latest_block(html);
        assert_eq!(snippet, "established 1998/4/1 plain text line");
    }

    #[test]
    fn fallback_takes_first_forty_nonempty_lines() {
        let body: String = (1..=60).map(|i| format!("<p>line {i}</p>")).collect();
        let snippet = extract_latest_block(&body);
        assert!(snippet.starts_with("line 1 "));
        assert!(snippet.contains("line 40"));
        assert!(!snippet.contains("line 41"));
    }

    #[test]
    fn window_clips_at_one_thousand_chars_past_the_match() {
        let long_tail = "x".repeat(3000);
        let html = format!("<p>2024/6/1 {long_tail}</p>");
        let snippet = extract_latest_block(&html);
        // "2024/6/1" is 8 chars; the window spans 1000 chars from the
        // match start, whitespace collapse does not add any here.
        assert_eq!(snippet.chars().count(), 1000);
    }

    #[test]
    fn whitespace_reflow_yields_identical_snippets() {
        let a = "<p>2024年5月1日   更新</p><p>本文</p>";
        let b = "<p>2024年5月1日\n更新</p>\n\n<p>本文</p>";
        assert_eq!(extract_latest_block(a), extract_latest_block(b));
    }

    #[test]
    fn comments_are_dropped_and_entities_decoded() {
        let html = "<!-- 2024/1/1 hidden --><p>Q&amp;A &#x3042; &nbsp;page</p>";
        let snippet = extract_latest_block(html);
        assert_eq!(snippet, "Q&A あ page");
    }

    #[test]
    fn empty_page_yields_empty_snippet() {
        assert_eq!(extract_latest_block(""), "");
        assert_eq!(extract_latest_block("<html><body></body></html>"), "");
    }

    #[test]
    fn stray_ampersands_pass_through() {
        let html = "<p>fish & chips &unknownentity; here</p>";
        let snippet = extract_latest_block(html);
        assert_eq!(snippet, "fish & chips &unknownentity; here");
    }
}
