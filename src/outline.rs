//! Recovers a nested outline (category → numbered item → bullet examples)
//! from loosely formatted, human-authored text.
//!
//! Upstream free-text generation emits the same logical structure in several
//! inconsistent shapes: a header followed by a flat numbered list, numbered
//! items with bullet lines underneath, an inline compressed form with dash
//! separators, and a degenerate flat-numbered form where two consecutive
//! numbered lines actually describe one item. The parser maps all of them to
//! the same model and never fails on malformed business text: unrecognized
//! lines are repaired into the previous item's title or dropped with a debug
//! log.

use regex::Regex;

/// Retain at most this many items per category group
const MAX_ITEMS: usize = 5;
/// Retain at most this many examples per item
const MAX_EXAMPLES: usize = 2;
/// A section with at least this many numbered lines and no bullets is
/// treated as the degenerate pair-per-item shape
const PAIR_REPAIR_THRESHOLD: usize = 6;

/// The closed set of categories a group can belong to. Synonym spellings in
/// the input (German and English) are normalized to these at parse time.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Category {
    Fears,
    Goals,
    Objections,
}

impl Category {
    /// The canonical display label drawn above the group
    pub fn label(&self) -> &'static str {
        match self {
            Category::Fears => "Typische Ängste",
            Category::Goals => "Typische Ziele",
            Category::Objections => "Typische Einwände",
        }
    }
}

/// One numbered point within a category group. Input numbering is not kept:
/// items are re-numbered 1..N at render time since input numbering may be
/// sparse or duplicated.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub title: String,
    pub examples: Vec<String>,
}

/// A labeled cluster of items sharing a theme
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryGroup {
    pub category: Category,
    pub items: Vec<Item>,
}

/// Compiled line patterns, built once per parse
struct LineClassifier {
    header: Regex,
    numbered: Regex,
    bullet: Regex,
    separator: Regex,
}

impl LineClassifier {
    fn new() -> LineClassifier {
        LineClassifier {
            header: Regex::new(
                r"(?i)^\s*(?:typische\s+|typical\s+)?(ängste|sorgen|befürchtungen|fears|worries|anxieties|ziele|wünsche|goals|wishes|desires|einwände|vorbehalte|bedenken|objections|concerns|doubts)(?:\s*[–—-]\s*(?:beispiele|examples))?\s*:?\s*$",
            )
            .expect("header pattern compiles"),
            numbered: Regex::new(r"^\s*\d+\s*[.)]\s*(\S.*?)\s*$").expect("numbered pattern compiles"),
            bullet: Regex::new(r"^\s*[•▪◦*·–—-]\s+(\S.*?)\s*$").expect("bullet pattern compiles"),
            separator: Regex::new(r"\s+[–—-]\s+").expect("separator pattern compiles"),
        }
    }

    fn category(&self, line: &str) -> Option<Category> {
        let captures = self.header.captures(line)?;
        let name = captures.get(1)?.as_str().to_lowercase();
        match name.as_str() {
            "ängste" | "sorgen" | "befürchtungen" | "fears" | "worries" | "anxieties" => {
                Some(Category::Fears)
            }
            "ziele" | "wünsche" | "goals" | "wishes" | "desires" => Some(Category::Goals),
            "einwände" | "vorbehalte" | "bedenken" | "objections" | "concerns" | "doubts" => {
                Some(Category::Objections)
            }
            _ => None,
        }
    }

    fn numbered_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.numbered
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    fn bullet_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        self.bullet
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str())
    }

    /// Split an inline compressed line (`title – example – example`) on its
    /// dash separators into a title and up to two trailing examples
    fn split_inline(&self, text: &str) -> (String, Vec<String>) {
        let mut parts = self.separator.splitn(text, 3);
        let title = parts.next().unwrap_or("").trim().to_string();
        let examples = parts
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        (title, examples)
    }
}

/// Parse raw section text into category groups.
///
/// Groups appear in the order their headers are encountered; items in
/// numbered order as encountered, capped at 5 per group with at most 2
/// examples each. A group that parses to zero items is omitted. Lines before
/// the first recognized header are skipped.
pub fn parse_outline(raw: &str) -> Vec<CategoryGroup> {
    let classifier = LineClassifier::new();

    let mut sections: Vec<(Category, Vec<&str>)> = Vec::new();
    for line in raw.lines() {
        let line = line.trim_end();
        if line.trim().is_empty() {
            continue;
        }
        if let Some(category) = classifier.category(line) {
            sections.push((category, Vec::new()));
        } else if let Some((_, lines)) = sections.last_mut() {
            lines.push(line);
        } else {
            log::debug!("skipping line outside any category section: {line:?}");
        }
    }

    sections
        .into_iter()
        .filter_map(|(category, lines)| {
            let items = parse_section(&classifier, &lines);
            if items.is_empty() {
                None
            } else {
                Some(CategoryGroup { category, items })
            }
        })
        .collect()
}

/// Extract the text of every numbered line in `raw`, in order. Used for
/// bodies that are a plain numbered list with no category headers at all.
pub fn numbered_lines(raw: &str) -> Vec<String> {
    let classifier = LineClassifier::new();
    raw.lines()
        .filter_map(|line| classifier.numbered_text(line))
        .map(|text| text.to_string())
        .collect()
}

fn parse_section(classifier: &LineClassifier, lines: &[&str]) -> Vec<Item> {
    let has_bullets = lines.iter().any(|l| classifier.bullet_text(l).is_some());
    let numbered_count = lines
        .iter()
        .filter(|l| classifier.numbered_text(l).is_some())
        .count();

    if !has_bullets && numbered_count >= PAIR_REPAIR_THRESHOLD {
        parse_paired(classifier, lines)
    } else {
        parse_listing(classifier, lines)
    }
}

/// Shapes 1–3: numbered lines open items (inline dash segments become
/// examples), bullet lines attach to the current item, anything else
/// continues the current item's title (soft line-wrap repair).
fn parse_listing(classifier: &LineClassifier, lines: &[&str]) -> Vec<Item> {
    let mut items: Vec<Item> = Vec::new();
    for line in lines {
        if let Some(text) = classifier.numbered_text(line) {
            let (title, examples) = classifier.split_inline(text);
            push_item(&mut items, title, examples);
        } else if let Some(text) = classifier.bullet_text(line) {
            match items.last_mut() {
                Some(item) => push_example(item, text),
                None => log::debug!("dropping example with no preceding item: {text:?}"),
            }
        } else if let Some(item) = items.last_mut() {
            item.title.push(' ');
            item.title.push_str(line.trim());
        } else {
            log::debug!("skipping unrecognized line: {line:?}");
        }
    }
    items
}

/// Shape 4 repair: consecutive pairs of flat numbered lines belong to the
/// same logical item. Each line of a pair is split on its own dash; the item
/// title comes from the first line, the examples from both after-dash
/// segments (or the whole second line when it carries no dash). Only applies
/// when no explicit bullets are present, so the well-formed case is never
/// corrupted.
fn parse_paired(classifier: &LineClassifier, lines: &[&str]) -> Vec<Item> {
    let numbered: Vec<&str> = lines
        .iter()
        .filter_map(|l| classifier.numbered_text(l))
        .collect();
    log::debug!(
        "repairing degenerate flat-numbered section of {} entries into paired items",
        numbered.len()
    );

    let mut items: Vec<Item> = Vec::new();
    for pair in numbered.chunks_exact(2) {
        let (title, mut examples) = classifier.split_inline(pair[0]);
        examples.truncate(1);
        let (second_title, second_examples) = classifier.split_inline(pair[1]);
        examples.push(
            second_examples
                .into_iter()
                .next()
                .unwrap_or(second_title),
        );
        push_item(&mut items, title, examples);
    }
    items
}

/// Append an item, applying the merge-repeated-titles rule: a new entry whose
/// title matches the previous one case-insensitively is folded into it,
/// accumulating examples instead of opening a duplicate item.
fn push_item(items: &mut Vec<Item>, title: String, examples: Vec<String>) {
    let title = title.trim().to_string();
    if title.is_empty() {
        return;
    }
    if let Some(last) = items.last_mut() {
        if last.title.to_lowercase() == title.to_lowercase() {
            for example in examples {
                push_example(last, &example);
            }
            return;
        }
    }
    if items.len() >= MAX_ITEMS {
        log::debug!("dropping item beyond the per-group cap: {title:?}");
        return;
    }
    let mut item = Item {
        title,
        examples: Vec::new(),
    };
    for example in examples {
        push_example(&mut item, &example);
    }
    items.push(item);
}

fn push_example(item: &mut Item, raw: &str) {
    let text = normalize_example(raw, &item.title);
    if text.is_empty() || item.examples.len() >= MAX_EXAMPLES {
        return;
    }
    item.examples.push(text);
}

/// Strip a leading bullet glyph, wrapping quotation marks, and a redundant
/// `"<title> – "` prefix so the same text never appears doubled as both
/// title and example
fn normalize_example(raw: &str, title: &str) -> String {
    let text = raw.trim();
    let text = text
        .trim_start_matches(['•', '▪', '◦', '*', '·', '-', '–', '—'])
        .trim_start();
    let text = text
        .trim_matches(['"', '\'', '„', '“', '”', '‚', '‘', '’', '«', '»'])
        .trim();
    strip_title_prefix(text, title).trim().to_string()
}

/// Case-insensitively strip `"<title> – "` (or `"<title>: "`) from the front
/// of `text`, returning `text` unchanged when the prefix is absent
fn strip_title_prefix<'a>(text: &'a str, title: &str) -> &'a str {
    let title = title.trim();
    if title.is_empty() {
        return text;
    }

    let mut rest = text;
    for expected in title.chars() {
        let mut chars = rest.chars();
        match chars.next() {
            Some(actual) if actual.to_lowercase().eq(expected.to_lowercase()) => {
                rest = chars.as_str();
            }
            _ => return text,
        }
    }

    let after = rest.trim_start();
    match after.strip_prefix(['–', '—', '-', ':']) {
        Some(stripped) => stripped.trim_start(),
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("Typische Ängste:", Category::Fears ; "fears with qualifier and colon")]
    #[test_case("ängste", Category::Fears ; "bare lowercase umlaut synonym")]
    #[test_case("Sorgen:", Category::Fears ; "fears synonym")]
    #[test_case("Typische Ziele", Category::Goals ; "goals canonical")]
    #[test_case("Wünsche – Beispiele:", Category::Goals ; "goals with trailing qualifier")]
    #[test_case("EINWÄNDE", Category::Objections ; "objections uppercase")]
    #[test_case("Bedenken - Examples", Category::Objections ; "objections english qualifier hyphen")]
    fn recognizes_category_headers(line: &str, expected: Category) {
        let classifier = LineClassifier::new();
        assert_eq!(classifier.category(line), Some(expected));
    }

    #[test_case("1. Angst vor Kosten" ; "numbered item")]
    #[test_case("Irgendein Fließtext ohne Struktur" ; "prose")]
    #[test_case("Ängste sind menschlich und normal" ; "header word with trailing prose")]
    fn rejects_non_headers(line: &str) {
        let classifier = LineClassifier::new();
        assert_eq!(classifier.category(line), None);
    }

    #[test]
    fn shape_one_flat_numbered_list_keeps_titles_verbatim() {
        let groups = parse_outline("Typische Ängste:\n1. Angst A\n2. Angst B\n3. Angst C");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, Category::Fears);
        let titles: Vec<&str> = groups[0].items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Angst A", "Angst B", "Angst C"]);
        assert!(groups[0].items.iter().all(|i| i.examples.is_empty()));
    }

    #[test]
    fn shape_two_bullets_attach_to_their_item() {
        let raw = "Typische Ziele:\n\
                   1. Mehr Umsatz\n\
                   - \u{201e}Wir wollen wachsen\u{201c}\n\
                   - Planbare Auslastung\n\
                   2. Weniger Aufwand\n\
                   • Abläufe automatisieren\n";
        let groups = parse_outline(raw);
        assert_eq!(groups.len(), 1);
        let items = &groups[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "Mehr Umsatz");
        assert_eq!(
            items[0].examples,
            vec!["Wir wollen wachsen", "Planbare Auslastung"]
        );
        assert_eq!(items[1].title, "Weniger Aufwand");
        assert_eq!(items[1].examples, vec!["Abläufe automatisieren"]);
    }

    #[test]
    fn shape_three_inline_dashes_become_examples() {
        let groups = parse_outline(
            "Einwände:\n1. Zu teuer – Das Budget ist schon verplant – Andere sind billiger",
        );
        let items = &groups[0].items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Zu teuer");
        assert_eq!(
            items[0].examples,
            vec!["Das Budget ist schon verplant", "Andere sind billiger"]
        );
    }

    #[test]
    fn shape_four_pairs_consecutive_numbered_lines() {
        let raw = "Typische Ängste:\n\
                   1. Kontrollverlust – Beispiel eins\n\
                   2. Es geht etwas schief\n\
                   3. Kostenfalle – Beispiel zwei\n\
                   4. Versteckte Gebühren tauchen auf\n\
                   5. Zeitfresser – Beispiel drei\n\
                   6. Das Projekt zieht sich endlos\n";
        let groups = parse_outline(raw);
        let items = &groups[0].items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[0].title, "Kontrollverlust");
        assert_eq!(
            items[0].examples,
            vec!["Beispiel eins", "Es geht etwas schief"]
        );
        assert_eq!(items[1].title, "Kostenfalle");
        assert_eq!(items[2].title, "Zeitfresser");
    }

    #[test]
    fn shape_four_yields_floor_of_half_the_lines() {
        let raw: String = std::iter::once("Ziele:".to_string())
            .chain((1..=7).map(|n| format!("{n}. Titel {n} – Beispiel {n}")))
            .collect::<Vec<_>>()
            .join("\n");
        let groups = parse_outline(&raw);
        // 7 numbered lines, no bullets: min(5, floor(7/2)) = 3 items
        assert_eq!(groups[0].items.len(), 3);
    }

    #[test]
    fn shape_four_does_not_trigger_when_bullets_are_present() {
        let raw: String = std::iter::once("Ziele:".to_string())
            .chain((1..=6).map(|n| format!("{n}. Titel {n}")))
            .chain(std::iter::once("- ein Beispiel".to_string()))
            .collect::<Vec<_>>()
            .join("\n");
        let groups = parse_outline(&raw);
        // bullets present, so every numbered line stays its own item (cap 5)
        assert_eq!(groups[0].items.len(), 5);
        assert_eq!(groups[0].items[4].examples, vec!["ein Beispiel"]);
    }

    #[test]
    fn caps_items_and_examples() {
        let mut raw = String::from("Typische Einwände:\n");
        for n in 1..=8 {
            raw.push_str(&format!("{n}. Einwand {n}\n"));
            raw.push_str("- Beispiel eins\n- Beispiel zwei\n- Beispiel drei\n");
        }
        let groups = parse_outline(&raw);
        assert_eq!(groups[0].items.len(), 5);
        for item in &groups[0].items {
            assert_eq!(item.examples.len(), 2);
        }
    }

    #[test]
    fn unrecognized_lines_continue_the_previous_title() {
        let groups = parse_outline(
            "Ziele:\n1. Ein sehr langes Ziel das\numgebrochen wurde\n2. Kurzes Ziel",
        );
        let items = &groups[0].items;
        assert_eq!(items[0].title, "Ein sehr langes Ziel das umgebrochen wurde");
        assert_eq!(items[1].title, "Kurzes Ziel");
    }

    #[test]
    fn strips_redundant_title_prefix_and_quotes_from_examples() {
        let groups = parse_outline("Ängste:\n1. Kontrollverlust\n- \"Kontrollverlust – Ich sehe nicht was passiert\"");
        assert_eq!(
            groups[0].items[0].examples,
            vec!["Ich sehe nicht was passiert"]
        );
    }

    #[test]
    fn omits_empty_groups_and_junk_before_headers() {
        let groups = parse_outline("Lorem ipsum prose\nZiele:\n\nÄngste:\n1. Etwas Konkretes");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, Category::Fears);
    }

    #[test]
    fn scenario_a_trigger_summary() {
        let groups = parse_outline("Typische Ängste:\n1. Angst A\n2. Angst B");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category, Category::Fears);
        assert_eq!(groups[0].items.len(), 2);
        assert!(groups[0].items.iter().all(|i| i.examples.is_empty()));
    }

    #[test]
    fn scenario_b_repeated_title_merges() {
        // pinned policy: merge-repeated-titles — consecutive numbered lines
        // sharing a title fold into one item, examples accumulate
        let groups =
            parse_outline("Typische Ängste\n1. Titel X – Beispiel 1\n2. Titel X – Beispiel 2");
        assert_eq!(groups.len(), 1);
        let items = &groups[0].items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "Titel X");
        assert_eq!(items[0].examples, vec!["Beispiel 1", "Beispiel 2"]);
    }

    #[test]
    fn numbered_lines_extracts_plain_lists() {
        let lines = numbered_lines("1. eins\nprose\n2) zwei\n");
        assert_eq!(lines, vec!["eins", "zwei"]);
    }
}
