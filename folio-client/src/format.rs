use std::ops::Range;

/// Markdown toolbar actions
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Format {
    Bold,
    Italic,
    Strikethrough,
    Heading,
    UnorderedList,
    OrderedList,
    AlignLeft,
    AlignCenter,
    AlignRight,
    Link,
    Image,
    CodeBlock,
    Mermaid,
}

impl Format {
    pub const ALL: [Format; 13] = [
        Format::Bold,
        Format::Italic,
        Format::Strikethrough,
        Format::Heading,
        Format::UnorderedList,
        Format::OrderedList,
        Format::AlignLeft,
        Format::AlignCenter,
        Format::AlignRight,
        Format::Link,
        Format::Image,
        Format::CodeBlock,
        Format::Mermaid,
    ];

    /// Text put before and after the selection
    pub fn markers(self) -> (&'static str, &'static str) {
        match self {
            Format::Bold => ("**", "**"),
            Format::Italic => ("*", "*"),
            Format::Strikethrough => ("~~", "~~"),
            Format::Heading => ("### ", ""),
            Format::UnorderedList => ("- ", ""),
            Format::OrderedList => ("1. ", ""),
            Format::AlignLeft => ("<div align=\"left\">\n\n", "\n\n</div>"),
            Format::AlignCenter => ("<div align=\"center\">\n\n", "\n\n</div>"),
            Format::AlignRight => ("<div align=\"right\">\n\n", "\n\n</div>"),
            Format::Link => ("[", "](url)"),
            Format::Image => ("![alt](", ")"),
            Format::CodeBlock => ("```\n", "\n```"),
            Format::Mermaid => ("```mermaid\ngraph TD;\n    A-->B;\n", "```"),
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Format::Bold => "Bold",
            Format::Italic => "Italic",
            Format::Strikethrough => "Strikethrough",
            Format::Heading => "Heading",
            Format::UnorderedList => "Unordered List",
            Format::OrderedList => "Ordered List",
            Format::AlignLeft => "Align Left",
            Format::AlignCenter => "Align Center",
            Format::AlignRight => "Align Right",
            Format::Link => "Link",
            Format::Image => "Image",
            Format::CodeBlock => "Code Block",
            Format::Mermaid => "Mermaid Chart",
        }
    }

    /// Short text for the toolbar button
    pub fn label(self) -> &'static str {
        match self {
            Format::Bold => "B",
            Format::Italic => "I",
            Format::Strikethrough => "S",
            Format::Heading => "H",
            Format::UnorderedList => "•",
            Format::OrderedList => "1.",
            Format::AlignLeft => "⇤",
            Format::AlignCenter => "↔",
            Format::AlignRight => "⇥",
            Format::Link => "🔗",
            Format::Image => "🖼",
            Format::CodeBlock => "</>",
            Format::Mermaid => "📊",
        }
    }

    /// Wraps the selected characters of `text` in the markers.
    ///
    /// `selection` counts characters, is clamped to the text and may be
    /// reversed. Returns the new text and the range of the wrapped selection in
    /// it, so the caret can be put back right after the prefix.
    pub fn apply(self, text: &str, selection: Range<usize>) -> (String, Range<usize>) {
        let (prefix, suffix) = self.markers();
        let len = text.chars().count();
        let (start, end) = match selection.start <= selection.end {
            true => (selection.start, selection.end),
            false => (selection.end, selection.start),
        };
        let (start, end) = (start.min(len), end.min(len));
        let byte = |c: usize| text.char_indices().nth(c).map_or(text.len(), |(b, _)| b);
        let (bstart, bend) = (byte(start), byte(end));

        let mut res = String::with_capacity(text.len() + prefix.len() + suffix.len());
        res.push_str(&text[..bstart]);
        res.push_str(prefix);
        res.push_str(&text[bstart..bend]);
        res.push_str(suffix);
        res.push_str(&text[bend..]);

        let shift = prefix.chars().count();
        (res, start + shift..end + shift)
    }
}

/// Browsers count text positions in UTF-16 code units
pub fn utf16_to_char_offset(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        if units >= utf16 {
            return i;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}

pub fn char_to_utf16_offset(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_selection() {
        let (text, sel) = Format::Bold.apply("hello world", 6..11);
        assert_eq!(text, "hello **world**");
        assert_eq!(sel, 8..13);
        let (text, sel) = Format::Heading.apply("title", 0..0);
        assert_eq!(text, "### title");
        assert_eq!(sel, 4..4);
    }

    #[test]
    fn multibyte_and_out_of_range_selections() {
        let (text, sel) = Format::Italic.apply("héllo 世界", 9..6);
        assert_eq!(text, "héllo *世界*");
        assert_eq!(sel, 7..9);
        let (text, _) = Format::Link.apply("abc", 10..20);
        assert_eq!(text, "abc[](url)");
    }

    #[test]
    fn block_formats() {
        let (text, _) = Format::AlignCenter.apply("x", 0..1);
        assert_eq!(text, "<div align=\"center\">\n\nx\n\n</div>");
        let (text, _) = Format::CodeBlock.apply("", 0..0);
        assert_eq!(text, "```\n\n```");
    }

    #[test]
    fn utf16_offsets() {
        let s = "a😀b";
        assert_eq!(utf16_to_char_offset(s, 3), 2);
        assert_eq!(char_to_utf16_offset(s, 2), 3);
        assert_eq!(utf16_to_char_offset(s, 100), 3);
    }
}
