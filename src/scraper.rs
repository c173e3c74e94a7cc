use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Seat availability for a single watched CRN, as observed this cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SeatStatus {
    /// Seats remaining (always > 0).
    Open(u32),
    /// Row found, zero seats.
    Closed,
    /// Row missing or seat count unreadable; retried next cycle.
    NotFound,
}

impl SeatStatus {
    pub fn is_open(&self) -> bool {
        matches!(self, SeatStatus::Open(_))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Observation {
    pub status: SeatStatus,
    /// Course title scraped from the row, when one is recognizable.
    pub title: Option<String>,
    /// Raw row text, carried into the alert body.
    pub detail: String,
}

impl Observation {
    fn not_found() -> Self {
        Observation {
            status: SeatStatus::NotFound,
            title: None,
            detail: String::new(),
        }
    }
}

/// Extracts seat availability from the rendered results page. Rows are
/// matched by CRN text, never by position: the portal reorders and filters
/// results between searches.
pub struct SeatScraper {
    row_selector: Selector,
    fallback_row_selector: Selector,
    cell_selector: Selector,
    rgx_of_seats: Regex,
    rgx_seats_kv: Vec<Regex>,
    rgx_cap_enr_rem: Regex,
}

impl Default for SeatScraper {
    fn default() -> Self {
        Self::new()
    }
}

impl SeatScraper {
    pub fn new() -> Self {
        SeatScraper {
            row_selector: Selector::parse("table tbody tr").unwrap(),
            fallback_row_selector: Selector::parse("tr").unwrap(),
            cell_selector: Selector::parse("td").unwrap(),
            rgx_of_seats: Regex::new(r"(?i)(\d+)\s*of\s*(\d+)\s*seats").unwrap(),
            rgx_seats_kv: vec![
                Regex::new(r"(?i)seats\s*(?:available|remaining)\s*[:\-]?\s*(\d+)").unwrap(),
                Regex::new(r"(?i)\bremaining\s*[:\-]?\s*(\d+)").unwrap(),
                Regex::new(r"(?i)\bavailable\s*[:\-]?\s*(\d+)").unwrap(),
            ],
            rgx_cap_enr_rem: Regex::new(
                r"(?is)(?:capacity|cap)\s*[:\-]?\s*\d+.{0,40}?(?:enrolled|enr)\s*[:\-]?\s*\d+.{0,40}?(?:remaining|rem)\s*[:\-]?\s*(\d+)",
            )
            .unwrap(),
        }
    }

    /// Produce one observation per watched CRN from the current page HTML.
    /// CRNs with no matching row come back as NotFound, never dropped.
    pub fn scan(&self, html: &str, crns: &[String]) -> HashMap<String, Observation> {
        let document = Html::parse_document(html);

        let mut rows: Vec<ElementRef> = document.select(&self.row_selector).collect();
        if rows.is_empty() {
            rows = document.select(&self.fallback_row_selector).collect();
        }

        let row_blobs: Vec<String> = rows.iter().map(|row| self.row_text(*row)).collect();

        let mut snapshot = HashMap::new();
        for crn in crns {
            // Word boundaries keep "1111" from matching inside "11111".
            let crn_pattern = match Regex::new(&format!(r"\b{}\b", crn)) {
                Ok(rgx) => rgx,
                Err(_) => {
                    snapshot.insert(crn.clone(), Observation::not_found());
                    continue;
                }
            };

            let observation = rows
                .iter()
                .zip(row_blobs.iter())
                .find(|(_, blob)| crn_pattern.is_match(blob))
                .map(|(row, blob)| self.observe_row(*row, blob))
                .unwrap_or_else(Observation::not_found);

            snapshot.insert(crn.clone(), observation);
        }

        snapshot
    }

    fn observe_row(&self, row: ElementRef, blob: &str) -> Observation {
        let status = match self.parse_seats(blob) {
            Some(0) => SeatStatus::Closed,
            Some(seats) => SeatStatus::Open(seats),
            None => SeatStatus::NotFound,
        };

        Observation {
            status,
            title: self.row_title(row),
            detail: truncate(blob, 400),
        }
    }

    /// Seat-count cascade, most specific pattern first. Returns None when the
    /// row carries no recognizable seat information.
    fn parse_seats(&self, text: &str) -> Option<u32> {
        if let Some(captures) = self.rgx_of_seats.captures(text) {
            if let Ok(seats) = captures[1].parse() {
                return Some(seats);
            }
        }

        for rgx in &self.rgx_seats_kv {
            if let Some(captures) = rgx.captures(text) {
                if let Ok(seats) = captures[1].parse() {
                    return Some(seats);
                }
            }
        }

        if let Some(captures) = self.rgx_cap_enr_rem.captures(text) {
            if let Ok(seats) = captures[1].parse() {
                return Some(seats);
            }
        }

        let lower = text.to_lowercase();
        if lower.contains("full") || lower.contains("closed") {
            return Some(0);
        }
        if lower.contains("open") {
            return Some(1);
        }

        None
    }

    /// Row text plus the hover/accessibility attributes the portal hides
    /// status in (the visible cell is sometimes just a colored badge).
    fn row_text(&self, row: ElementRef) -> String {
        let mut chunks: Vec<String> = Vec::new();

        let text = row.text().collect::<Vec<_>>().join(" ");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if !text.is_empty() {
            chunks.push(text);
        }

        for descendant in row.descendants() {
            if let Some(element) = ElementRef::wrap(descendant) {
                for attr in ["title", "aria-label", "data-original-title"] {
                    if let Some(value) = element.value().attr(attr) {
                        let value = value.trim();
                        if !value.is_empty() && !chunks.iter().any(|c| c == value) {
                            chunks.push(value.to_string());
                        }
                    }
                }
            }
        }

        chunks.join(" | ")
    }

    fn row_title(&self, row: ElementRef) -> Option<String> {
        for cell in row.select(&self.cell_selector) {
            let text = cell.text().collect::<Vec<_>>().join(" ");
            let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
            if !text.is_empty() && !text.chars().all(|c| c.is_ascii_digit()) {
                return Some(text);
            }
        }
        None
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        text[..end].to_string()
    }
}
