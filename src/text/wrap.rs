/// Width measurement for a run of text at a given font size.
pub trait TextMeasure {
    /// Rendered advance width of `text` in pixels, trailing spaces included.
    fn measure(&mut self, text: &str, font_size_px: f32) -> f32;
}

/// Font-free measurer: every character advances by `em_advance * font_size_px`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ApproxMeasure {
    pub em_advance: f32,
}

impl Default for ApproxMeasure {
    fn default() -> Self {
        Self { em_advance: 0.55 }
    }
}

impl TextMeasure for ApproxMeasure {
    fn measure(&mut self, text: &str, font_size_px: f32) -> f32 {
        text.chars().count() as f32 * font_size_px * self.em_advance
    }
}

/// One committed line and its measured width.
#[derive(Clone, Debug, PartialEq)]
pub struct WrappedLine {
    pub text: String,
    pub width: f32,
}

/// Greedy line breaking.
///
/// Paragraphs are split on `\n`, words on single spaces. Each word is appended with a trailing
/// space; when the candidate line measures wider than `max_width_px` and the current line already
/// holds a word, the current line is committed and the word starts the next one. A word wider than
/// the limit therefore sits alone on its line. Empty content yields no lines.
pub fn wrap_greedy(
    content: &str,
    font_size_px: f32,
    max_width_px: f32,
    measure: &mut dyn TextMeasure,
) -> Vec<WrappedLine> {
    let mut lines = Vec::new();
    if content.is_empty() {
        return lines;
    }

    for paragraph in content.split('\n') {
        let mut current = String::new();
        let mut current_width = 0.0f32;

        for (n, word) in paragraph.split(' ').enumerate() {
            let candidate = format!("{current}{word} ");
            let candidate_width = measure.measure(&candidate, font_size_px);

            if candidate_width > max_width_px && n > 0 {
                lines.push(WrappedLine {
                    text: std::mem::take(&mut current),
                    width: current_width,
                });
                current = format!("{word} ");
                current_width = measure.measure(&current, font_size_px);
            } else {
                current = candidate;
                current_width = candidate_width;
            }
        }

        lines.push(WrappedLine {
            text: current,
            width: current_width,
        });
    }

    lines
}

/// Widest measured line, or 0 for no lines.
pub fn widest(lines: &[WrappedLine]) -> f32 {
    lines.iter().map(|l| l.width).fold(0.0, f32::max)
}

#[cfg(test)]
#[path = "../../tests/unit/text/wrap.rs"]
mod tests;
