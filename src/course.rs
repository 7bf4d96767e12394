//! Course identity resolution and merging.
//!
//! A course is identified by its instructor's short id together with its
//! normalized label. Term and section are not part of the key: the same
//! title taught by the same person in different semesters is one
//! course, while co-taught sections become one course per instructor.

use std::collections::HashMap;

use crate::bridge::IdentifiedRow;
use crate::error::Result;
use crate::ingest::RawRow;
use crate::mint::IdentifierMinter;
use crate::term::TermCalendar;

/// A row with every reference the statement assembler needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    pub row: RawRow,
    pub short_id: String,
    pub teacher_ref: String,
    pub course_label: String,
    pub course_ref: String,
    pub term_ref: String,
}

/// Collapse whitespace runs to single spaces and trim the ends.
pub fn normalize_title(title: &str) -> String {
    title.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `SUBJ NUM - Title`
pub fn course_label(row: &RawRow) -> String {
    format!(
        "{} {} - {}",
        row.subject_code,
        row.course_number,
        normalize_title(&row.course_title)
    )
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ResolverStats {
    /// Course references minted in this run
    pub minted: usize,
    /// Rows that reused an already-minted course
    pub merged: usize,
}

/// Owns the course and term registries for one run.
pub struct CourseResolver {
    /// short id → (course label → course reference)
    courses: HashMap<String, HashMap<String, String>>,
    terms: TermCalendar,
    minter: IdentifierMinter,
    course_prefix: String,
    stats: ResolverStats,
}

impl CourseResolver {
    pub fn new(terms: TermCalendar, minter: IdentifierMinter, course_prefix: impl Into<String>) -> Self {
        Self {
            courses: HashMap::new(),
            terms,
            minter,
            course_prefix: course_prefix.into(),
            stats: ResolverStats::default(),
        }
    }

    /// Attach course and term references to an identified row, minting a
    /// course reference only the first time its (short id, label) pair is seen.
    pub async fn resolve(&mut self, identified: IdentifiedRow) -> Result<ResolvedRow> {
        let IdentifiedRow {
            row,
            short_id,
            teacher_ref,
        } = identified;

        let term_ref = self
            .terms
            .term_for(&row.term_code, &row.term_description)?
            .reference
            .clone();

        let label = course_label(&row);
        let existing = self
            .courses
            .get(&short_id)
            .and_then(|by_label| by_label.get(&label))
            .cloned();

        let course_ref = match existing {
            Some(reference) => {
                self.stats.merged += 1;
                reference
            }
            None => {
                let context = format!("course '{}' taught by {}", label, short_id);
                let reference = self.minter.mint(&self.course_prefix, &context).await?;
                log::debug!("Minted {} for {}", reference, context);
                self.courses
                    .entry(short_id.clone())
                    .or_default()
                    .insert(label.clone(), reference.clone());
                self.stats.minted += 1;
                reference
            }
        };

        Ok(ResolvedRow {
            row,
            short_id,
            teacher_ref,
            course_label: label,
            course_ref,
            term_ref,
        })
    }

    /// Resolve a batch in order, stopping at the first fatal error.
    pub async fn resolve_all(&mut self, rows: Vec<IdentifiedRow>) -> Result<Vec<ResolvedRow>> {
        let mut resolved = Vec::with_capacity(rows.len());
        for row in rows {
            resolved.push(self.resolve(row).await?);
        }
        log::info!(
            "Resolved {} rows onto {} courses ({} merged) across {} terms",
            resolved.len(),
            self.stats.minted,
            self.stats.merged,
            self.terms.len()
        );
        Ok(resolved)
    }

    pub fn terms(&self) -> &TermCalendar {
        &self.terms
    }

    pub fn stats(&self) -> ResolverStats {
        self.stats
    }

    /// Number of distinct courses known to the registry.
    pub fn course_count(&self) -> usize {
        self.courses.values().map(HashMap::len).sum()
    }
}
