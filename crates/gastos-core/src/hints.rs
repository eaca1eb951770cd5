//! Keyword→category hints used when no rule or LLM signal is available
//!
//! Ordered, first-match-wins. Hints are deliberately broad; they only have
//! to beat "Miscellaneous", not an LLM. Dining comes before transportation
//! so "grabfood" lands on dining rather than the bare "grab" transit word.

use regex::Regex;

/// (pattern, category) pairs, checked in order
const HINTS: &[(&str, &str)] = &[
    (
        r"(?i)(food|meal|dinner|lunch|breakfast|grabfood|restaurant|coffee|milk tea|snack|jollibee|starbucks)",
        "Food & Dining",
    ),
    (
        r"(?i)(grab|angkas|joyride|taxi|lrt|mrt|bus|fuel|gas|parking|toll|ride)",
        "Transportation",
    ),
    (
        r"(?i)(grocery|supermarket|palengke|hypermarket|landers)",
        "Groceries",
    ),
    (r"(?i)(netflix|spotify|movie|cinema|game)", "Entertainment"),
    (
        r"(?i)(electric|water|internet|wifi|utility|meralco|maynilad|pldt|load|smart)",
        "Utilities",
    ),
    (
        r"(?i)(medicine|clinic|hospital|dental|doctor|drug|watsons)",
        "Health",
    ),
    (r"(?i)(tuition|book|course|class|school)", "Education"),
    (r"(?i)(flight|hotel|airbnb|travel|cebu pacific)", "Travel"),
    (
        r"(?i)(shop|uniqlo|mall|lazada|shopee|zalora|watsons|pet express)",
        "Shopping",
    ),
    (
        r"(?i)(bill|rent|subscription|loan|insurance|fee)",
        "Bills & Fees",
    ),
    (r"(?i)(salary|payroll|income|received)", "Income"),
    (r"(?i)(transfer|transferred)", "Transfer"),
    (r"(?i)(donate|donation)", "Miscellaneous"),
];

pub struct CategoryHintTable {
    hints: Vec<(Regex, &'static str)>,
}

impl Default for CategoryHintTable {
    fn default() -> Self {
        Self::new()
    }
}

impl CategoryHintTable {
    pub fn new() -> Self {
        Self {
            hints: HINTS
                .iter()
                .map(|(pattern, category)| (Regex::new(pattern).expect("static pattern"), *category))
                .collect(),
        }
    }

    /// Category of the first matching hint, or `fallback` if none match
    pub fn guess<'a>(&self, text: &str, fallback: &'a str) -> &'a str {
        for (pattern, category) in &self.hints {
            if pattern.is_match(text) {
                return category;
            }
        }
        fallback
    }
}
