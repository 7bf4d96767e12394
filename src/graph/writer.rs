//! Graph serialization via oxigraph's RDF serializers.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use oxigraph::io::{RdfFormat, RdfSerializer};
use oxigraph::model::{GraphName, Literal, NamedNode, Quad, Term};

use super::vocab::PREFIXES;
use super::{GraphFormat, Object, Statement};
use crate::error::{CoursegraphError, Result};

fn iri(value: &str) -> Result<NamedNode> {
    NamedNode::new(value)
        .map_err(|e| CoursegraphError::Serialization(format!("invalid IRI <{}>: {}", value, e)))
}

fn to_quad(statement: &Statement) -> Result<Quad> {
    let object: Term = match &statement.object {
        Object::Reference(reference) => iri(reference)?.into(),
        Object::Literal(value) => Literal::new_simple_literal(value.as_str()).into(),
        Object::Typed { value, datatype } => {
            Literal::new_typed_literal(value.as_str(), iri(datatype)?).into()
        }
    };
    Ok(Quad::new(
        iri(&statement.subject)?,
        iri(&statement.predicate)?,
        object,
        GraphName::DefaultGraph,
    ))
}

/// Writes statements in the configured notation.
pub struct GraphWriter {
    format: GraphFormat,
}

impl GraphWriter {
    pub fn new(format: GraphFormat) -> Self {
        Self { format }
    }

    fn serializer(&self) -> Result<RdfSerializer> {
        match self.format {
            GraphFormat::NTriples => Ok(RdfSerializer::from_format(RdfFormat::NTriples)),
            GraphFormat::Turtle => {
                let mut serializer = RdfSerializer::from_format(RdfFormat::Turtle);
                for (prefix, namespace) in PREFIXES {
                    serializer = serializer.with_prefix(prefix, namespace).map_err(|e| {
                        CoursegraphError::Serialization(format!("invalid prefix {}: {}", prefix, e))
                    })?;
                }
                Ok(serializer)
            }
        }
    }

    /// Serialize `statements` into `out`, in order.
    pub fn write_to<W: Write>(&self, statements: &[Statement], out: W) -> Result<W> {
        let mut writer = self.serializer()?.for_writer(out);
        for statement in statements {
            writer.serialize_quad(&to_quad(statement)?)?;
        }
        Ok(writer.finish()?)
    }
}

/// Write the graph file at `path`.
pub fn write_graph(path: &Path, statements: &[Statement], format: GraphFormat) -> Result<()> {
    let file = File::create(path)?;
    let mut out = GraphWriter::new(format).write_to(statements, BufWriter::new(file))?;
    out.flush()?;
    log::info!("Wrote {} statements to {}", statements.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::vocab::{blocal, rdf, rdfs, vivo, xsd};
    use oxigraph::io::RdfParser;
    use std::collections::BTreeSet;
    use tempfile::TempDir;

    fn sample() -> Vec<Statement> {
        let course = "http://vivo.brown.edu/individual/course-0a1b";
        let teacher = "http://vivo.brown.edu/individual/jdoe";
        vec![
            Statement::link(course, rdf("type"), &vivo("Course")),
            Statement::literal(course, rdfs("label"), "CSCI 0150 - \"Intro\" to Systems"),
            Statement::typed(
                "http://vivo.brown.edu/individual/termstart-202010",
                vivo("dateTime"),
                "2020-09-01T00:00:00",
                xsd("dateTime"),
            ),
            Statement::link(teacher, blocal("teacherFor"), course),
            Statement::link(course, blocal("hasTeacher"), teacher),
            // merged rows repeat statements
            Statement::link(course, blocal("hasTeacher"), teacher),
        ]
    }

    fn expected(statements: &[Statement]) -> BTreeSet<String> {
        statements.iter().map(|s| to_quad(s).unwrap().to_string()).collect()
    }

    fn read_back(bytes: &[u8], format: RdfFormat) -> BTreeSet<String> {
        RdfParser::from_format(format)
            .for_reader(bytes)
            .map(|quad| quad.unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_turtle_round_trip() {
        let statements = sample();
        let bytes = GraphWriter::new(GraphFormat::Turtle).write_to(&statements, Vec::new()).unwrap();
        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.contains("@prefix vivo:"));
        assert_eq!(read_back(&bytes, RdfFormat::Turtle), expected(&statements));
    }

    #[test]
    fn test_ntriples_round_trip() {
        let statements = sample();
        let bytes = GraphWriter::new(GraphFormat::NTriples).write_to(&statements, Vec::new()).unwrap();
        assert_eq!(read_back(&bytes, RdfFormat::NTriples), expected(&statements));
    }

    #[test]
    fn test_invalid_reference_is_rejected() {
        let statements = vec![Statement::link("not an iri", rdf("type"), &vivo("Course"))];
        let err = GraphWriter::new(GraphFormat::NTriples)
            .write_to(&statements, Vec::new())
            .unwrap_err();
        assert!(matches!(err, CoursegraphError::Serialization(_)));
    }

    #[test]
    fn test_write_graph_is_deterministic() {
        let temp_dir = TempDir::new().unwrap();
        let first = temp_dir.path().join("a.ttl");
        let second = temp_dir.path().join("b.ttl");
        write_graph(&first, &sample(), GraphFormat::Turtle).unwrap();
        write_graph(&second, &sample(), GraphFormat::Turtle).unwrap();
        assert_eq!(std::fs::read(first).unwrap(), std::fs::read(second).unwrap());
    }
}
