use std::collections::HashSet;

use chrono::NaiveDate;

use crate::model::Priority;
use crate::util::date::upcoming_monday;

/// Structured draft extracted from one quick-entry string.
///
/// Every field is optional except the clean title, which may come back empty;
/// callers fall back to the raw input in that case. Parsing never fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuickEntry {
    pub priority: Option<Priority>,
    /// First-seen casing, insertion order, case-insensitive dedupe
    pub tags: Vec<String>,
    pub due_date: Option<NaiveDate>,
    /// Canonical casing of the known project the input referenced
    pub project: Option<String>,
    /// Input with all recognized tokens removed and whitespace collapsed
    pub clean_title: String,
}

/// Parse a quick-entry string: `!priority`, `#tag`, `@project`, and relative
/// date keywords, everything else becoming the clean title.
///
/// Safe to call on every keystroke; re-parsing a clean title extracts
/// nothing further.
pub fn parse_quick_entry(input: &str, known_projects: &[String], today: NaiveDate) -> QuickEntry {
    let mut priority = None;
    let mut tags: Vec<String> = Vec::new();
    let mut seen_tags: HashSet<String> = HashSet::new();
    let mut project: Option<String> = None;
    let mut rest = String::with_capacity(input.len());

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if !matches!(c, '#' | '@' | '!') {
            rest.push(c);
            continue;
        }
        let token = take_token(&mut chars);
        if token.is_empty() {
            // a bare marker is ordinary text
            rest.push(c);
            continue;
        }
        match c {
            '#' => {
                if seen_tags.insert(token.to_lowercase()) {
                    tags.push(token);
                }
            }
            '@' => {
                // every @token is stripped, resolved or not; first hit wins
                if project.is_none()
                    && let Some(known) = known_projects
                        .iter()
                        .find(|p| p.to_lowercase() == token.to_lowercase())
                {
                    project = Some(known.clone());
                }
            }
            _ => match Priority::from_keyword(&token) {
                // recognized markers are all stripped; the first sets priority
                Some(p) => {
                    if priority.is_none() {
                        priority = Some(p);
                    }
                }
                // `!` followed by any other word is ordinary text
                None => {
                    rest.push(c);
                    rest.push_str(&token);
                }
            },
        }
    }

    let (clean_title, due_date) = extract_due_date(&rest, today);

    QuickEntry {
        priority,
        tags,
        due_date,
        project,
        clean_title,
    }
}

/// Longest run of token characters: anything except whitespace and the
/// marker characters themselves.
fn take_token(chars: &mut std::iter::Peekable<std::str::Chars>) -> String {
    let mut token = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() || matches!(c, '#' | '@' | '!') {
            break;
        }
        token.push(c);
        chars.next();
    }
    token
}

/// Scan whitespace-delimited words for relative date keywords, strip every
/// recognized keyword, and collapse what's left into the clean title.
///
/// The due date comes from the highest-priority rule present (today beats
/// tomorrow beats next week), but all keyword words are removed either way
/// so a second parse finds nothing.
fn extract_due_date(text: &str, today: NaiveDate) -> (String, Option<NaiveDate>) {
    let words: Vec<&str> = text.split_whitespace().collect();
    let mut keep = vec![true; words.len()];
    let mut saw_today = false;
    let mut saw_tomorrow = false;
    let mut saw_next_week = false;

    let mut i = 0;
    while i < words.len() {
        let word = words[i].to_lowercase();
        if word == "next" && words.get(i + 1).is_some_and(|w| w.to_lowercase() == "week") {
            saw_next_week = true;
            keep[i] = false;
            keep[i + 1] = false;
            i += 2;
            continue;
        }
        match word.as_str() {
            "today" | "tod" => {
                saw_today = true;
                keep[i] = false;
            }
            "tomorrow" | "tmr" | "tom" => {
                saw_tomorrow = true;
                keep[i] = false;
            }
            _ => {}
        }
        i += 1;
    }

    let due_date = if saw_today {
        Some(today)
    } else if saw_tomorrow {
        today.succ_opt()
    } else if saw_next_week {
        Some(upcoming_monday(today))
    } else {
        None
    };

    let title = words
        .iter()
        .zip(&keep)
        .filter(|(_, keep)| **keep)
        .map(|(word, _)| *word)
        .collect::<Vec<_>>()
        .join(" ");

    (title, due_date)
}
