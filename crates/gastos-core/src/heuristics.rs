//! Deterministic extraction of amount, date and merchant from free text
//!
//! This is the baseline every parse starts from: rule-free pattern matching
//! with no machine-learning involvement. It never fails; unparsable text
//! still yields a usable candidate with today's date and an "Unknown"
//! merchant.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use regex::Regex;

use crate::config::{DEFAULT_ACCOUNT, DEFAULT_CURRENCY};
use crate::models::ParseCandidate;

/// Words stripped from the text before deriving merchant and note
const STOP_WORDS: &str =
    r"(?i)\b(today|yesterday|tomorrow|last night|this morning|spent|pay|paid|for|at|on|total|kahapon)\b";

/// Currency-like numeric token: optional ₱/PHP/$ prefix, thousands
/// separators, up to two decimals, optional "-ish" suffix
const AMOUNT_TOKEN: &str = r"(?:₱|(?i:php)|\$)?\s*([0-9]+(?:,[0-9]{3})*(?:\.[0-9]{1,2})?)(?:-ish)?";

pub struct HeuristicExtractor {
    total: Regex,
    split_bill: Regex,
    kilo: Regex,
    amount_token: Regex,
    amount_strip: Regex,
    stop_words: Regex,
    whitespace: Regex,
    last_weekday: Regex,
    plain_weekday: Regex,
    currency: String,
    account: String,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY, DEFAULT_ACCOUNT)
    }
}

impl HeuristicExtractor {
    pub fn new(currency: &str, account: &str) -> Self {
        Self {
            total: Regex::new(r"\btotal\s+([0-9]+(?:\.[0-9]+)?)").expect("static pattern"),
            split_bill: Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*/\s*([0-9]+(?:\.[0-9]+)?)")
                .expect("static pattern"),
            kilo: Regex::new(r"([0-9]+(?:\.[0-9]+)?)\s*k\b").expect("static pattern"),
            amount_token: Regex::new(AMOUNT_TOKEN).expect("static pattern"),
            amount_strip: Regex::new(
                r"(?:₱|(?i:php)|\$)?\s*[0-9]+(?:,[0-9]{3})*(?:\.[0-9]{1,2})?(?:-ish)?",
            )
            .expect("static pattern"),
            stop_words: Regex::new(STOP_WORDS).expect("static pattern"),
            whitespace: Regex::new(r"\s+").expect("static pattern"),
            last_weekday: Regex::new(
                r"last\s+(sunday|monday|tuesday|wednesday|thursday|friday|saturday)",
            )
            .expect("static pattern"),
            plain_weekday: Regex::new(r"(sunday|monday|tuesday|wednesday|thursday|friday|saturday)")
                .expect("static pattern"),
            currency: currency.to_string(),
            account: account.to_string(),
        }
    }

    /// Build the baseline candidate for a quick-add input
    ///
    /// `now` is the caller's current instant already shifted into the
    /// configured timezone offset; relative keywords and weekday names
    /// resolve against it. Category is always `None` here; category
    /// selection belongs to the rule/LLM/hint layers above.
    pub fn extract(&self, text: &str, now: DateTime<FixedOffset>) -> ParseCandidate {
        let amount = self.parse_amount(text);
        let date = self.parse_date(text, now);
        let (merchant, note) = self.parse_merchant_and_note(text, amount);

        ParseCandidate {
            amount,
            date: Some(date.format("%Y-%m-%d").to_string()),
            merchant: Some(merchant),
            note,
            currency: self.currency.clone(),
            account: self.account.clone(),
            category: None,
        }
    }

    /// Best-guess amount, tried in strict priority order:
    /// explicit "total N" → split-bill a/b → "Nk" shorthand → the maximum
    /// of all currency-like tokens. The largest number is usually the
    /// total, not a quantity or a time.
    fn parse_amount(&self, text: &str) -> Option<f64> {
        let lower = text.to_lowercase();

        if let Some(caps) = self.total.captures(&lower) {
            if let Ok(value) = caps[1].parse::<f64>() {
                return Some(value);
            }
        }

        if let Some(caps) = self.split_bill.captures(&lower) {
            if let (Ok(numerator), Ok(denominator)) =
                (caps[1].parse::<f64>(), caps[2].parse::<f64>())
            {
                if denominator > 0.0 {
                    return Some(round_to_two(numerator / denominator));
                }
            }
        }

        if let Some(caps) = self.kilo.captures(&lower) {
            if let Ok(value) = caps[1].parse::<f64>() {
                return Some(round_to_two(value * 1000.0));
            }
        }

        let mut best: Option<f64> = None;
        for caps in self.amount_token.captures_iter(text) {
            let raw = caps[1].replace(',', "");
            if let Ok(parsed) = raw.parse::<f64>() {
                if parsed.is_finite() && best.map_or(true, |b| parsed > b) {
                    best = Some(parsed);
                }
            }
        }

        best
    }

    /// Resolve the transaction date, defaulting to today
    fn parse_date(&self, text: &str, now: DateTime<FixedOffset>) -> NaiveDate {
        let today = now.date_naive();
        let lower = text.to_lowercase();

        if lower.contains("today") || lower.contains("this morning") || lower.contains("tonight") {
            return today;
        }
        if lower.contains("yesterday") || lower.contains("last night") || lower.contains("kahapon")
        {
            return today - Duration::days(1);
        }
        if lower.contains("tomorrow") {
            return today + Duration::days(1);
        }

        if let Some(date) = self.parse_weekday(&lower, today) {
            return date;
        }

        if let Some(date) = self.scan_explicit_dates(text, today) {
            return date;
        }

        today
    }

    /// "last monday" → the most recent Monday strictly before today, even
    /// when today is Monday. A bare weekday name → the most recent
    /// occurrence on/before today (today counts if it matches).
    fn parse_weekday(&self, lower: &str, today: NaiveDate) -> Option<NaiveDate> {
        if let Some(caps) = self.last_weekday.captures(lower) {
            let target = weekday_from_name(&caps[1])?;
            return Some(previous_weekday(today, target));
        }

        if let Some(caps) = self.plain_weekday.captures(lower) {
            let target = weekday_from_name(&caps[1])?;
            return Some(closest_past_weekday(today, target));
        }

        None
    }

    /// Scan 1–3 word windows left to right against the fixed format list;
    /// the first valid match wins. Month/day forms without a year are
    /// anchored to the current year.
    fn scan_explicit_dates(&self, text: &str, today: NaiveDate) -> Option<NaiveDate> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        for i in 0..tokens.len() {
            for span in 1..=3usize {
                if i + span > tokens.len() {
                    break;
                }
                let chunk = tokens[i..i + span].join(" ");

                // Full dates first; chrono's %m/%d accept 1- or 2-digit
                // fields, and %b accepts both abbreviated and full month
                // names, so one entry covers each family of formats.
                for format in ["%Y-%m-%d", "%m/%d/%Y"] {
                    if let Ok(date) = NaiveDate::parse_from_str(&chunk, format) {
                        return Some(date);
                    }
                }
                for format in ["%m/%d", "%b %d"] {
                    if let Some(date) = parse_month_day(&chunk, format, today.year()) {
                        return Some(date);
                    }
                }
            }
        }

        None
    }

    /// Strip amount-like tokens and stop words; first two remaining words
    /// become the merchant, the rest the note.
    fn parse_merchant_and_note(&self, text: &str, amount: Option<f64>) -> (String, String) {
        let cleaned = self.amount_strip.replace_all(text, " ");
        let cleaned = self.stop_words.replace_all(&cleaned, " ");
        let cleaned = self.whitespace.replace_all(&cleaned, " ");
        let cleaned = cleaned.trim();

        if cleaned.is_empty() {
            let note = match amount {
                Some(amount) => format!("Auto-parsed amount {}", amount),
                None => String::new(),
            };
            return ("Unknown".to_string(), note);
        }

        let words: Vec<&str> = cleaned.split(' ').filter(|w| !w.is_empty()).collect();
        let merchant = words[..words.len().min(2)].join(" ");
        let merchant = if merchant.is_empty() {
            "Unknown".to_string()
        } else {
            merchant
        };
        let note = words.get(2..).unwrap_or(&[]).join(" ");

        (merchant, note)
    }
}

/// Parse a month/day chunk with no year, anchoring to `year`
fn parse_month_day(chunk: &str, format: &str, year: i32) -> Option<NaiveDate> {
    use chrono::format::{parse, Parsed, StrftimeItems};

    let mut parsed = Parsed::new();
    parse(&mut parsed, chunk, StrftimeItems::new(format)).ok()?;
    parsed.set_year(year as i64).ok()?;
    parsed.to_naive_date().ok()
}

fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name {
        "sunday" => Some(Weekday::Sun),
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        _ => None,
    }
}

/// Most recent occurrence strictly before `reference`
fn previous_weekday(reference: NaiveDate, target: Weekday) -> NaiveDate {
    let mut cursor = reference - Duration::days(1);
    while cursor.weekday() != target {
        cursor = cursor - Duration::days(1);
    }
    cursor
}

/// Most recent occurrence on/before `reference`
fn closest_past_weekday(reference: NaiveDate, target: Weekday) -> NaiveDate {
    let mut cursor = reference;
    while cursor.weekday() != target {
        cursor = cursor - Duration::days(1);
    }
    cursor
}

fn round_to_two(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
