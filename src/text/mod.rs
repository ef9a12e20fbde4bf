//! # Text Layout
//!
//! Greedy line breaking over UAX#14 break opportunities, measured with the
//! [`FontBook`]. Resume text is short and single-style per block, so there
//! is no hyphenation and no optimal-fit pass.

use crate::font::FontBook;
use crate::style::TextStyle;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The text on this line, trailing whitespace removed.
    pub text: String,
    /// Width of `text` in px.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Entry `i` is the opportunity to break *before* `char[i]`. Index 0 is
/// always `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout<'a> {
    fonts: &'a FontBook,
}

impl<'a> TextLayout<'a> {
    pub fn new(fonts: &'a FontBook) -> Self {
        Self { fonts }
    }

    pub fn measure(&self, text: &str, style: &TextStyle) -> f64 {
        self.fonts.measure(text, style)
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Mandatory breaks (newlines) always end a line. A word wider than
    /// `max_width` is split between characters. Empty input yields no lines.
    pub fn break_into_lines(&self, text: &str, max_width: f64, style: &TextStyle) -> Vec<BrokenLine> {
        let chars: Vec<char> = text.chars().collect();
        if chars.iter().all(|c| c.is_whitespace()) {
            return Vec::new();
        }

        let widths: Vec<f64> = chars
            .iter()
            .map(|&c| {
                if is_newline(c) {
                    0.0
                } else {
                    self.fonts.char_width(c, style) + style.letter_spacing
                }
            })
            .collect();
        let opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0usize;
        let mut line_width = 0.0f64;
        // Index of the first char after the last allowed break on this line.
        let mut last_break: Option<usize> = None;

        let mut i = 0usize;
        while i < chars.len() {
            match opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(self.make_line(&chars[line_start..i], &widths[line_start..i]));
                    line_start = i;
                    line_width = 0.0;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }

            let w = widths[i];
            if line_width + w > max_width && i > line_start && !chars[i].is_whitespace() {
                let split = match last_break {
                    Some(bp) if bp > line_start => bp,
                    _ => i,
                };
                lines.push(self.make_line(&chars[line_start..split], &widths[line_start..split]));
                line_start = split;
                line_width = widths[split..i].iter().sum();
                last_break = None;
            }
            line_width += w;
            i += 1;
        }
        if line_start < chars.len() {
            lines.push(self.make_line(&chars[line_start..], &widths[line_start..]));
        }

        lines
    }

    fn make_line(&self, chars: &[char], widths: &[f64]) -> BrokenLine {
        let mut end = chars.len();
        while end > 0 && chars[end - 1].is_whitespace() {
            end -= 1;
        }
        BrokenLine {
            text: chars[..end].iter().collect(),
            width: widths[..end].iter().sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customize::FontChoice;
    use crate::style::Color;

    fn style() -> TextStyle {
        TextStyle::new(FontChoice::Inter, 10.0, 1.4, Color::BLACK)
    }

    #[test]
    fn test_short_text_is_one_line() {
        let fonts = FontBook::new();
        let tl = TextLayout::new(&fonts);
        let lines = tl.break_into_lines("Hello world", 500.0, &style());
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Hello world");
        assert!((lines[0].width - fonts.measure("Hello world", &style())).abs() < 1e-9);
    }

    #[test]
    fn test_wraps_at_spaces() {
        let fonts = FontBook::new();
        let tl = TextLayout::new(&fonts);
        let s = style();
        let max = fonts.measure("Shipped things", &s) + 1.0;
        let lines = tl.break_into_lines("Shipped things to customers", max, &s);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].text, "Shipped things");
        assert_eq!(lines[1].text, "to customers");
        for line in &lines {
            assert!(line.width <= max);
        }
    }

    #[test]
    fn test_newline_forces_break() {
        let fonts = FontBook::new();
        let tl = TextLayout::new(&fonts);
        let lines = tl.break_into_lines("one\ntwo", 500.0, &style());
        let texts: Vec<_> = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two"]);
    }

    #[test]
    fn test_overlong_word_is_split() {
        let fonts = FontBook::new();
        let tl = TextLayout::new(&fonts);
        let s = style();
        let lines = tl.break_into_lines("abcdefghijklmnop", 30.0, &s);
        assert!(lines.len() > 1);
        let joined: String = lines.iter().map(|l| l.text.as_str()).collect();
        assert_eq!(joined, "abcdefghijklmnop");
    }

    #[test]
    fn test_blank_text_has_no_lines() {
        let fonts = FontBook::new();
        let tl = TextLayout::new(&fonts);
        assert!(tl.break_into_lines("", 100.0, &style()).is_empty());
        assert!(tl.break_into_lines("   ", 100.0, &style()).is_empty());
    }
}
