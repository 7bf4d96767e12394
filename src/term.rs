//! Academic terms: date windows derived from coded term identifiers, and the
//! per-run registry of term entities.
//!
//! A term code is `YYYYPP`: a four digit year followed by a two digit period.
//! Spring-like periods belong to the academic year that started in the
//! previous calendar year, so their dates fall in `YYYY + 1`.

use std::collections::HashMap;

use chrono::NaiveDateTime;

use crate::error::{CoursegraphError, Result, UnknownPeriod};
use crate::ingest::RawRow;

const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Start/end suffixes (`MM-DDTHH:MM:SS`) for one period code.
#[derive(Debug, Clone, Copy)]
pub struct PeriodWindow {
    pub period: &'static str,
    pub start: &'static str,
    pub end: &'static str,
    /// Dates fall in the calendar year after the coded year.
    pub rolls_year: bool,
}

pub const PERIOD_TABLE: [PeriodWindow; 7] = [
    PeriodWindow { period: "00", start: "06-01T00:00:00", end: "08-31T00:00:00", rolls_year: false },
    PeriodWindow { period: "09", start: "09-01T00:00:00", end: "12-31T00:00:00", rolls_year: false },
    PeriodWindow { period: "10", start: "09-01T00:00:00", end: "12-31T00:00:00", rolls_year: false },
    PeriodWindow { period: "15", start: "01-01T00:00:00", end: "01-31T00:00:00", rolls_year: true },
    PeriodWindow { period: "19", start: "09-01T00:00:00", end: "12-31T00:00:00", rolls_year: false },
    PeriodWindow { period: "20", start: "02-01T00:00:00", end: "05-31T00:00:00", rolls_year: true },
    PeriodWindow { period: "29", start: "02-01T00:00:00", end: "05-31T00:00:00", rolls_year: true },
];

pub fn period_window(period: &str) -> Option<&'static PeriodWindow> {
    PERIOD_TABLE.iter().find(|w| w.period == period)
}

/// Start and end of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl TermWindow {
    pub fn start_iso(&self) -> String {
        self.start.format(DATE_TIME_FORMAT).to_string()
    }

    pub fn end_iso(&self) -> String {
        self.end.format(DATE_TIME_FORMAT).to_string()
    }
}

/// Split a term code into its numeric year and its period code.
fn split_term_code(term_code: &str) -> Result<(i32, &str)> {
    let invalid = |reason: &str| CoursegraphError::InvalidTermCode {
        term_code: term_code.to_string(),
        reason: reason.to_string(),
    };

    if !term_code.is_ascii() || term_code.len() < 6 {
        return Err(invalid("expected at least six ASCII characters"));
    }
    let year = term_code[..4]
        .parse::<i32>()
        .map_err(|_| invalid("first four characters are not a year"))?;
    Ok((year, &term_code[term_code.len() - 2..]))
}

/// Compute the date window of a term code.
pub fn term_window(term_code: &str) -> Result<TermWindow> {
    let (year, period) = split_term_code(term_code)?;
    let window = period_window(period).ok_or_else(|| CoursegraphError::UnknownTermPeriod {
        unknown: vec![UnknownPeriod {
            term_code: term_code.to_string(),
            period: period.to_string(),
            first_row: None,
        }],
    })?;

    let year = if window.rolls_year { year + 1 } else { year };
    let parse = |suffix: &str| {
        NaiveDateTime::parse_from_str(&format!("{:04}-{}", year, suffix), DATE_TIME_FORMAT).map_err(|e| {
            CoursegraphError::InvalidTermCode {
                term_code: term_code.to_string(),
                reason: format!("period table entry {} does not form a date: {}", period, e),
            }
        })
    };

    Ok(TermWindow {
        start: parse(window.start)?,
        end: parse(window.end)?,
    })
}

/// Check every term code in the batch before any service is contacted.
///
/// Malformed codes fail on the first occurrence; unknown periods are
/// collected so one error lists all of them.
pub fn check_term_codes(rows: &[RawRow]) -> Result<()> {
    let mut unknown: Vec<UnknownPeriod> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        let (_, period) = split_term_code(&row.term_code)?;
        if period_window(period).is_none() && !unknown.iter().any(|u| u.term_code == row.term_code) {
            unknown.push(UnknownPeriod {
                term_code: row.term_code.clone(),
                period: period.to_string(),
                first_row: Some(idx + 1),
            });
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(CoursegraphError::UnknownTermPeriod { unknown })
    }
}

/// An academic term as it appears in the graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TermEntity {
    pub code: String,
    pub label: String,
    pub reference: String,
    pub start_reference: String,
    pub end_reference: String,
    pub window: TermWindow,
}

/// Registry of the terms seen in this run, in first-encounter order.
#[derive(Debug)]
pub struct TermCalendar {
    namespace: String,
    terms: Vec<TermEntity>,
    by_code: HashMap<String, usize>,
}

impl TermCalendar {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            terms: Vec::new(),
            by_code: HashMap::new(),
        }
    }

    /// Return the term entity for `code`, creating it on first sight.
    ///
    /// The window is computed once per code. Later rows never relabel a term.
    pub fn term_for(&mut self, code: &str, label: &str) -> Result<&TermEntity> {
        if let Some(&idx) = self.by_code.get(code) {
            return Ok(&self.terms[idx]);
        }

        let window = term_window(code)?;
        let entity = TermEntity {
            code: code.to_string(),
            label: label.to_string(),
            reference: format!("{}termcode-{}", self.namespace, code),
            start_reference: format!("{}termstart-{}", self.namespace, code),
            end_reference: format!("{}termend-{}", self.namespace, code),
            window,
        };
        log::debug!(
            "New term {} ({} .. {})",
            code,
            entity.window.start_iso(),
            entity.window.end_iso()
        );

        let idx = self.terms.len();
        self.terms.push(entity);
        self.by_code.insert(code.to_string(), idx);
        Ok(&self.terms[idx])
    }

    pub fn terms(&self) -> &[TermEntity] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::row::fixtures::row;

    const NS: &str = "http://vivo.brown.edu/individual/";

    #[test]
    fn test_fall_window() {
        let window = term_window("202009").unwrap();
        assert_eq!(window.start_iso(), "2020-09-01T00:00:00");
        assert_eq!(window.end_iso(), "2020-12-31T00:00:00");
    }

    #[test]
    fn test_spring_like_period_rolls_year() {
        let window = term_window("202015").unwrap();
        assert_eq!(window.start_iso(), "2021-01-01T00:00:00");
        assert_eq!(window.end_iso(), "2021-01-31T00:00:00");

        let window = term_window("201920").unwrap();
        assert_eq!(window.start_iso(), "2020-02-01T00:00:00");
        assert_eq!(window.end_iso(), "2020-05-31T00:00:00");
    }

    #[test]
    fn test_summer_window() {
        let window = term_window("202100").unwrap();
        assert_eq!(window.start_iso(), "2021-06-01T00:00:00");
        assert_eq!(window.end_iso(), "2021-08-31T00:00:00");
    }

    #[test]
    fn test_every_table_entry_forms_a_date() {
        for entry in PERIOD_TABLE {
            let window = term_window(&format!("2023{}", entry.period)).unwrap();
            assert!(window.start <= window.end, "period {}", entry.period);
        }
    }

    #[test]
    fn test_unknown_period_is_fatal() {
        match term_window("202044") {
            Err(CoursegraphError::UnknownTermPeriod { unknown }) => {
                assert_eq!(unknown.len(), 1);
                assert_eq!(unknown[0].period, "44");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_term_codes() {
        assert!(matches!(term_window("2020"), Err(CoursegraphError::InvalidTermCode { .. })));
        assert!(matches!(term_window("ABCD10"), Err(CoursegraphError::InvalidTermCode { .. })));
        assert!(matches!(term_window("2020é0"), Err(CoursegraphError::InvalidTermCode { .. })));
    }

    #[test]
    fn test_check_term_codes_collects_all_unknown() {
        let rows = vec![
            row("202010", "CSCI", "0150", "A", "B01"),
            row("202044", "CSCI", "0150", "A", "B01"),
            row("202044", "CSCI", "0160", "B", "B01"),
            row("201977", "CSCI", "0170", "C", "B02"),
        ];
        match check_term_codes(&rows) {
            Err(CoursegraphError::UnknownTermPeriod { unknown }) => {
                assert_eq!(
                    unknown,
                    vec![
                        UnknownPeriod {
                            term_code: "202044".to_string(),
                            period: "44".to_string(),
                            first_row: Some(2),
                        },
                        UnknownPeriod {
                            term_code: "201977".to_string(),
                            period: "77".to_string(),
                            first_row: Some(4),
                        },
                    ]
                );
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_check_term_codes_accepts_known() {
        let rows = vec![
            row("202010", "CSCI", "0150", "A", "B01"),
            row("202020", "CSCI", "0150", "A", "B01"),
        ];
        assert!(check_term_codes(&rows).is_ok());
    }

    #[test]
    fn test_calendar_memoizes_and_keeps_first_label() {
        let mut calendar = TermCalendar::new(NS);
        let first = calendar.term_for("202010", "Fall 2020").unwrap().clone();
        let again = calendar.term_for("202010", "Fall Semester 2020").unwrap().clone();
        assert_eq!(first, again);
        assert_eq!(again.label, "Fall 2020");
        assert_eq!(calendar.len(), 1);

        assert_eq!(first.reference, "http://vivo.brown.edu/individual/termcode-202010");
        assert_eq!(first.start_reference, "http://vivo.brown.edu/individual/termstart-202010");
        assert_eq!(first.end_reference, "http://vivo.brown.edu/individual/termend-202010");
    }

    #[test]
    fn test_calendar_preserves_first_encounter_order() {
        let mut calendar = TermCalendar::new(NS);
        for code in ["202020", "202010", "202020", "202100"] {
            calendar.term_for(code, "t").unwrap();
        }
        let codes: Vec<_> = calendar.terms().iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["202020", "202010", "202100"]);
    }

    #[test]
    fn test_calendar_does_not_register_bad_codes() {
        let mut calendar = TermCalendar::new(NS);
        assert!(calendar.term_for("202044", "Bad").is_err());
        assert!(calendar.is_empty());
    }
}
