use serde::Serialize;

/// Column headers of the offering export, in file order.
pub const COLUMNS: [&str; 16] = [
    "TERM CODE",
    "TERM CODE DESCRIPTION",
    "CRN",
    "SUBJECT CODE",
    "SUBJECT CODE DESCRIPTION",
    "COURSE NUMBER",
    "SECTION NUMBER",
    "SECTION ENROLLMENT COUNT",
    "DEPARTMENT CODE OFFERING COURSE",
    "DEPARTMENT CODE DESCRIPTION",
    "COURSE TITLE",
    "COURSE DESCRIPTION",
    "INSTRUCTOR BROWN ID",
    "PRIMARY INSTRUCTOR",
    "GRADUATE STUDENT",
    "INSTRUCTOR NAME",
];

/// One offering-section-instructor line of the export.
///
/// Serializes with the original column headers as keys, so a skipped row
/// can be written back out with every field intact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawRow {
    #[serde(rename = "TERM CODE")]
    pub term_code: String,
    #[serde(rename = "TERM CODE DESCRIPTION")]
    pub term_description: String,
    #[serde(rename = "CRN")]
    pub crn: String,
    #[serde(rename = "SUBJECT CODE")]
    pub subject_code: String,
    #[serde(rename = "SUBJECT CODE DESCRIPTION")]
    pub subject_description: String,
    #[serde(rename = "COURSE NUMBER")]
    pub course_number: String,
    #[serde(rename = "SECTION NUMBER")]
    pub section_number: String,
    #[serde(rename = "SECTION ENROLLMENT COUNT")]
    pub section_enrollment: String,
    #[serde(rename = "DEPARTMENT CODE OFFERING COURSE")]
    pub department_code: String,
    #[serde(rename = "DEPARTMENT CODE DESCRIPTION")]
    pub department_description: String,
    #[serde(rename = "COURSE TITLE")]
    pub course_title: String,
    #[serde(rename = "COURSE DESCRIPTION")]
    pub course_description: String,
    #[serde(rename = "INSTRUCTOR BROWN ID")]
    pub instructor_id: String,
    #[serde(rename = "PRIMARY INSTRUCTOR")]
    pub primary_instructor: String,
    #[serde(rename = "GRADUATE STUDENT")]
    pub graduate_student: String,
    #[serde(rename = "INSTRUCTOR NAME")]
    pub instructor_name: String,
}

impl RawRow {
    /// Build a row from exactly `COLUMNS.len()` fields in column order.
    pub fn from_fields(fields: [String; 16]) -> Self {
        let [
            term_code,
            term_description,
            crn,
            subject_code,
            subject_description,
            course_number,
            section_number,
            section_enrollment,
            department_code,
            department_description,
            course_title,
            course_description,
            instructor_id,
            primary_instructor,
            graduate_student,
            instructor_name,
        ] = fields;
        Self {
            term_code,
            term_description,
            crn,
            subject_code,
            subject_description,
            course_number,
            section_number,
            section_enrollment,
            department_code,
            department_description,
            course_title,
            course_description,
            instructor_id,
            primary_instructor,
            graduate_student,
            instructor_name,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::row;
    use super::*;

    #[test]
    fn test_serializes_with_original_headers_in_order() {
        let r = row("202010", "CSCI", "0150", "Intro", "B01");
        let json = serde_json::to_string(&r).unwrap();
        let mut last = 0;
        for column in COLUMNS {
            let pos = json.find(&format!("\"{}\"", column)).unwrap();
            assert!(pos >= last, "{} out of order", column);
            last = pos;
        }
    }
}
