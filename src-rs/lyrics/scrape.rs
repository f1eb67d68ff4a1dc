//! Pulls plain lyrics out of a Genius song page.

use std::sync::OnceLock;

use regex::Regex;

fn container_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?s)<div[^>]*data-lyrics-container="true"[^>]*>(.*?)</div>"#).expect("valid regex")
    })
}

fn line_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("valid regex"))
}

fn section_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[^\]]*\]").expect("valid regex"))
}

/// Returns `None` when the page has no lyrics containers or they are empty.
pub fn extract_lyrics(html: &str) -> Option<String> {
    let sections: Vec<String> = container_re()
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| clean_section(m.as_str()))
        .filter(|section| !section.is_empty())
        .collect();

    if sections.is_empty() {
        return None;
    }
    Some(sections.join("\n\n"))
}

fn clean_section(raw: &str) -> String {
    let text = line_break_re().replace_all(raw, "\n");
    let text = tag_re().replace_all(&text, "");
    let text = decode_entities(&text);
    let text = section_marker_re().replace_all(&text, "");

    let mut lines: Vec<&str> = Vec::new();
    for line in text.lines().map(str::trim) {
        if line.is_empty() && lines.last().map_or(true, |prev| prev.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        let decoded = tail
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&tail[1..end]).map(|ch| (ch, end)));
        match decoded {
            Some((ch, end)) => {
                out.push(ch);
                rest = &tail[end + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                name.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_and_cleans_sections() {
        let html = r#"
            <html><body>
            <div class="Lyrics" data-lyrics-container="true">[Verse 1]<br/>Hello <a href="/x"><span>darkness</span></a>, my old friend<br>I&#x27;ve come to talk&nbsp;with you again</div>
            <div data-lyrics-container="true" class="x">[Chorus]<br/><br/>And the vision &amp; the sound</div>
            </body></html>
        "#;
        let lyrics = extract_lyrics(html).unwrap();
        assert_eq!(
            lyrics,
            "Hello darkness, my old friend\nI've come to talk with you again\n\nAnd the vision & the sound"
        );
    }

    #[test]
    fn test_missing_container_is_none() {
        assert!(extract_lyrics("<html><div class=\"lyrics\">nope</div></html>").is_none());
    }

    #[test]
    fn test_container_with_only_markers_is_none() {
        let html = r#"<div data-lyrics-container="true">[Instrumental]</div>"#;
        assert!(extract_lyrics(html).is_none());
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(decode_entities("rock & roll &bogus; &#65;"), "rock & roll &bogus; A");
    }
}
