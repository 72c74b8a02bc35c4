//! Markdown preview and table of contents.
//!
//! Headings of level 1 to 3 written as `#` lines get an id derived from their
//! text; the same id is used by the table of contents and in the rendered HTML,
//! so that the table's links land on the heading.

use pulldown_cmark::{html, CowStr, Event, HeadingLevel, Options, Parser, Tag};

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize)]
pub struct Heading {
    pub level: u8,
    pub text: String,
    pub id: String,
}

fn options() -> Options {
    Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS
}

/// Anchor for a heading: lowercase, with every run of characters other than
/// ascii letters, digits and CJK ideographs turned into a single dash
pub fn heading_id(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut gap = false;
    for c in text.trim().chars().flat_map(|c| c.to_lowercase()) {
        let kept = c.is_ascii_lowercase() || c.is_ascii_digit() || ('\u{4e00}'..='\u{9fa5}').contains(&c);
        if !kept {
            gap = true;
            continue;
        }
        if gap && !res.is_empty() {
            res.push('-');
        }
        gap = false;
        res.push(c);
    }
    res
}

/// Parses `# text`, `## text` or `### text`
pub fn parse_heading_line(line: &str) -> Option<Heading> {
    let level = line.len() - line.trim_start_matches('#').len();
    if !(1..=3).contains(&level) {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    if text.is_empty() {
        return None;
    }
    Some(Heading {
        level: level as u8,
        text: text.to_string(),
        id: heading_id(text),
    })
}

fn level_number(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

/// Heading whose markdown source starts at the beginning of `source`
fn heading_at(level: HeadingLevel, source: &str) -> Option<Heading> {
    let line = source.lines().next()?.trim_end();
    parse_heading_line(line).filter(|h| h.level == level_number(level))
}

/// Table of contents, in document order. Lines inside code blocks are not
/// headings.
pub fn extract_headings(markdown: &str) -> Vec<Heading> {
    Parser::new_ext(markdown, options())
        .into_offset_iter()
        .filter_map(|(event, range)| match event {
            Event::Start(Tag::Heading(level, ..)) => heading_at(level, &markdown[range]),
            _ => None,
        })
        .collect()
}

pub fn render_preview(markdown: &str) -> String {
    let mut anchored = false;
    let events = Parser::new_ext(markdown, options())
        .into_offset_iter()
        .map(|(event, range)| match event {
            Event::Start(Tag::Heading(level, ..)) => match heading_at(level, &markdown[range]) {
                Some(h) => {
                    anchored = true;
                    Event::Html(CowStr::from(format!("<h{} id=\"{}\">", h.level, h.id)))
                }
                None => event,
            },
            Event::End(Tag::Heading(level, ..)) if anchored => {
                anchored = false;
                Event::Html(CowStr::from(format!("</h{}>\n", level_number(level))))
            }
            event => event,
        });
    let mut res = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut res, events);
    res
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_ids() {
        assert_eq!(heading_id("Hello, World!"), "hello-world");
        assert_eq!(heading_id("  Getting Started  "), "getting-started");
        assert_eq!(heading_id("Rust 与 WebAssembly"), "rust-与-webassembly");
        assert_eq!(heading_id("--?--"), "");
    }

    #[test]
    fn heading_lines() {
        let h = parse_heading_line("## Install steps").unwrap();
        assert_eq!((h.level, h.text.as_str(), h.id.as_str()), (2, "Install steps", "install-steps"));
        assert!(parse_heading_line("#### too deep").is_none());
        assert!(parse_heading_line("#hashtag").is_none());
        assert!(parse_heading_line("# ").is_none());
        assert!(parse_heading_line(" # indented").is_none());
    }

    #[test]
    fn toc_skips_code_and_deep_headings() {
        let md = "# Title\n\ntext\n\n```sh\n# not a heading\n```\n\n## Part 1\n\n#### Deep\n\n### Part 1.1\n";
        let toc = extract_headings(md);
        let ids = toc.iter().map(|h| h.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["title", "part-1", "part-1-1"]);
        assert_eq!(toc[2].level, 3);
    }

    #[test]
    fn toc_follows_block_structure() {
        let md = "- ## In a list\n\n> # Quoted\n\nSetext\n======\n\n    # indented code\n";
        let ids = extract_headings(md)
            .into_iter()
            .map(|h| h.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["in-a-list", "quoted"]);
    }

    #[test]
    fn rendered_headings_carry_toc_ids() {
        let md = "# Hello World\n\nSome *text*.\n\n## Next Steps\n\n#### small\n";
        let html = render_preview(md);
        for h in extract_headings(md) {
            assert!(html.contains(&format!("id=\"{}\"", h.id)), "{html}");
        }
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"));
        assert!(html.contains("<em>text</em>"));
        assert!(html.contains("<h4>small</h4>"));
    }

    #[test]
    fn tables_and_strikethrough() {
        let html = render_preview("| a | b |\n|---|---|\n| 1 | 2 |\n\n~~gone~~\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<del>gone</del>"));
    }
}
