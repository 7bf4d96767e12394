//! Statement graph: typed triples about terms and courses, and their
//! serialization.

mod assemble;
mod writer;
pub mod vocab;

pub use assemble::{assemble_statements, course_statements, term_statements};
pub use writer::{write_graph, GraphWriter};

use serde::{Deserialize, Serialize};

/// Object position of a statement.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Object {
    /// Entity reference (IRI)
    Reference(String),
    /// Plain string literal
    Literal(String),
    /// Literal with a datatype IRI
    Typed { value: String, datatype: String },
}

/// One graph fact (subject --predicate--> object).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: String,
    pub predicate: String,
    pub object: Object,
}

impl Statement {
    pub fn link(subject: &str, predicate: String, object: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate,
            object: Object::Reference(object.to_string()),
        }
    }

    pub fn literal(subject: &str, predicate: String, value: &str) -> Self {
        Self {
            subject: subject.to_string(),
            predicate,
            object: Object::Literal(value.to_string()),
        }
    }

    pub fn typed(subject: &str, predicate: String, value: &str, datatype: String) -> Self {
        Self {
            subject: subject.to_string(),
            predicate,
            object: Object::Typed {
                value: value.to_string(),
                datatype,
            },
        }
    }
}

/// Output notation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GraphFormat {
    #[default]
    Turtle,
    NTriples,
}
