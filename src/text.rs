use crate::text_metrics;

/// A laid-out block of text. Sizes are in points.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub width: f32,
    pub height: f32,
    pub line_height: f32,
}

/// Font parameters needed to measure a block.
#[derive(Debug, Clone, Copy)]
pub struct FontSpec<'a> {
    pub family: &'a str,
    pub size: f32,
    pub bold: bool,
    pub line_spacing: f32,
}

impl FontSpec<'_> {
    pub fn line_height(&self) -> f32 {
        self.size * self.line_spacing
    }
}

/// Measures `text` as given, one line per `\n`.
pub fn measure_block(text: &str, font: FontSpec<'_>) -> TextBlock {
    block_from_lines(split_lines(text), font)
}

/// Measures `text`, wrapping every line wider than `max_width` points at
/// word boundaries. Explicit line breaks are kept.
pub fn wrap_block(text: &str, max_width: f32, font: FontSpec<'_>) -> TextBlock {
    let lines = split_lines(text)
        .into_iter()
        .flat_map(|line| wrap_line(&line, max_width, font))
        .collect();
    block_from_lines(lines, font)
}

fn block_from_lines(mut lines: Vec<String>, font: FontSpec<'_>) -> TextBlock {
    if lines.is_empty() {
        lines.push(String::new());
    }
    let width = lines
        .iter()
        .map(|line| text_width(line, font))
        .fold(0.0, f32::max);
    let line_height = font.line_height();
    TextBlock {
        height: lines.len() as f32 * line_height,
        lines,
        width,
        line_height,
    }
}

pub(crate) fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.trim_end().to_string())
        .collect()
}

pub(crate) fn wrap_line(line: &str, max_width: f32, font: FontSpec<'_>) -> Vec<String> {
    if text_width(line, font) <= max_width {
        return vec![line.to_string()];
    }

    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, font) > max_width {
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            current.push_str(word);
        } else {
            current = candidate;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}

pub fn text_width(text: &str, font: FontSpec<'_>) -> f32 {
    text_metrics::measure_text_width(text, font.size, font.family, font.bold)
        .unwrap_or_else(|| fallback_text_width(text, font.size, font.bold))
}

fn fallback_text_width(text: &str, font_size: f32, bold: bool) -> f32 {
    let weight = if bold { 1.08 } else { 1.0 };
    text.chars().map(char_width_factor).sum::<f32>() * font_size * weight
}

fn char_width_factor(ch: char) -> f32 {
    // Advance widths of a common sans-serif face, in ems.
    match ch {
        ' ' => 0.318,
        '.' | ',' | ':' | ';' | '|' | '!' | '\'' | 'i' | 'j' | 'l' => 0.278,
        '(' | ')' | '[' | ']' | '{' | '}' | 'f' | 't' | 'r' => 0.39,
        'I' => 0.295,
        'M' | 'W' | 'm' | 'w' => 0.9,
        'A'..='Z' => 0.69,
        'a'..='z' => 0.6,
        '0'..='9' => 0.636,
        '@' | '#' | '%' | '&' => 0.9,
        '•' | '-' | '_' => 0.5,
        _ => 0.6,
    }
}
