//! Statement assembly: terms first (registry order), then one block per row.

use super::vocab::{blocal, owl, rdf, rdfs, vitro, vivo, xsd};
use super::Statement;
use crate::course::ResolvedRow;
use crate::term::TermEntity;

/// Type, label and start/end date values of one term.
pub fn term_statements(term: &TermEntity) -> Vec<Statement> {
    let mut out = vec![
        Statement::link(&term.reference, rdf("type"), &vivo("AcademicTerm")),
        Statement::link(&term.reference, rdf("type"), &owl("Thing")),
        Statement::link(&term.reference, rdf("type"), &vivo("DateTimeInterval")),
        Statement::link(&term.reference, vitro("mostSpecificType"), &vivo("AcademicTerm")),
        Statement::literal(&term.reference, rdfs("label"), &term.label),
    ];

    let bounds = [
        (&term.start_reference, term.window.start_iso(), "start"),
        (&term.end_reference, term.window.end_iso(), "end"),
    ];
    for (reference, value, link) in bounds {
        out.extend([
            Statement::link(reference, rdf("type"), &vivo("DateTimeValue")),
            Statement::link(reference, rdf("type"), &owl("Thing")),
            Statement::link(reference, vitro("mostSpecificType"), &vivo("DateTimeValue")),
            Statement::literal(reference, rdfs("label"), &value),
            Statement::typed(reference, vivo("dateTime"), &value, xsd("dateTime")),
            Statement::link(reference, vivo("dateTimePrecision"), &vivo("yearMonthDayPrecision")),
            Statement::link(&term.reference, vivo(link), reference),
        ]);
    }

    out
}

/// Course type, label, term interval and the teaching relation both ways.
pub fn course_statements(row: &ResolvedRow) -> Vec<Statement> {
    let course = row.course_ref.as_str();
    vec![
        Statement::link(course, rdf("type"), &vivo("Course")),
        Statement::link(course, rdf("type"), &owl("Thing")),
        Statement::link(course, vitro("mostSpecificType"), &vivo("Course")),
        Statement::literal(course, rdfs("label"), &row.course_label),
        Statement::link(course, vivo("dateTimeInterval"), &row.term_ref),
        Statement::link(&row.teacher_ref, blocal("teacherFor"), course),
        Statement::link(course, blocal("hasTeacher"), &row.teacher_ref),
    ]
}

/// Every statement of the run. Duplicates from merged courses are kept.
pub fn assemble_statements(terms: &[TermEntity], rows: &[ResolvedRow]) -> Vec<Statement> {
    let mut statements: Vec<Statement> = terms.iter().flat_map(term_statements).collect();
    statements.extend(rows.iter().flat_map(course_statements));
    log::info!(
        "Assembled {} statements for {} terms and {} rows",
        statements.len(),
        terms.len(),
        rows.len()
    );
    statements
}
