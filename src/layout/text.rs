use crate::font::Typeface;
use crate::units::Pt;

/// Calculates the vertical offset from a text coordinate to the font's
/// baseline.
///
/// In PDF, text coordinates specify the baseline position. This function
/// returns the negative ascent value, which can be added to a y-coordinate to
/// account for the font's ascender height when positioning text from a top
/// reference point.
pub fn baseline_offset<F: Typeface>(font: &F, size: Pt) -> Pt {
    Pt(0.0) - font.ascent(size)
}

/// Greedy word wrap: splits `text` on whitespace and packs tokens into lines
/// whose measured width does not exceed `max_width`.
///
/// A single token wider than `max_width` is emitted on its own line without
/// being split further—it overflows, which is accepted rather than silently
/// patched. Empty or whitespace-only input yields no lines. The function
/// keeps no state between calls.
pub fn wrap<F: Typeface>(font: &F, text: &str, size: Pt, max_width: Pt) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    let mut buffer = String::new();

    for token in text.split_whitespace() {
        let candidate = if buffer.is_empty() {
            token.to_string()
        } else {
            format!("{buffer} {token}")
        };

        if font.width_of(&candidate, size) > max_width && !buffer.is_empty() {
            lines.push(std::mem::replace(&mut buffer, token.to_string()));
        } else {
            buffer = candidate;
        }
    }

    if !buffer.is_empty() {
        lines.push(buffer);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::test_support::MonoMeasure;

    fn mono() -> MonoMeasure {
        MonoMeasure { advance: 10.0 }
    }

    #[test]
    fn baseline_offset_is_the_negative_ascent() {
        let font = mono();
        let size = Pt(12.0);
        assert_eq!(baseline_offset(&font, size), Pt(0.0) - font.ascent(size));
        assert!(baseline_offset(&font, size) < Pt(0.0));
    }

    #[test]
    fn empty_input_yields_no_lines() {
        let font = mono();
        assert!(wrap(&font, "", Pt(12.0), Pt(100.0)).is_empty());
        assert!(wrap(&font, "   \n \t ", Pt(12.0), Pt(100.0)).is_empty());
    }

    #[test]
    fn lines_fit_within_max_width() {
        let font = mono();
        // 10 chars fit per line at advance 10 / width 100
        let lines = wrap(&font, "aa bb cc dd ee ff gg", Pt(12.0), Pt(100.0));
        for line in &lines {
            assert!(font.width_of(line, Pt(12.0)) <= Pt(100.0), "line {line:?} too wide");
        }
        assert_eq!(lines, vec!["aa bb cc", "dd ee ff", "gg"]);
    }

    #[test]
    fn overwide_token_is_not_split() {
        let font = mono();
        let lines = wrap(&font, "tiny incomprehensibilities tiny", Pt(12.0), Pt(100.0));
        assert_eq!(
            lines,
            vec!["tiny", "incomprehensibilities", "tiny"],
        );
    }

    #[test]
    fn wrapping_is_idempotent() {
        let font = mono();
        let text = "one two three four five six seven eight nine ten eleven twelve";
        let first = wrap(&font, text, Pt(12.0), Pt(120.0));
        let rejoined = first.join("\n");
        let second = wrap(&font, &rejoined, Pt(12.0), Pt(120.0));
        assert_eq!(first, second);
    }

    #[test]
    fn collapses_internal_whitespace() {
        let font = mono();
        let lines = wrap(&font, "a   b\tc", Pt(12.0), Pt(1000.0));
        assert_eq!(lines, vec!["a b c"]);
    }
}
