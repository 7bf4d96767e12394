//! Namespaces and terms of the target ontology.

pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
pub const OWL: &str = "http://www.w3.org/2002/07/owl#";
pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
pub const VIVO: &str = "http://vivoweb.org/ontology/core#";
pub const VITRO: &str = "http://vitro.mannlib.cornell.edu/ns/vitro/0.7#";
pub const BLOCAL: &str = "http://vivo.brown.edu/ontology/vivo-brown/";

/// Prefixes bound in serialized output.
pub const PREFIXES: [(&str, &str); 7] = [
    ("rdf", RDF),
    ("rdfs", RDFS),
    ("owl", OWL),
    ("xsd", XSD),
    ("vivo", VIVO),
    ("vitro", VITRO),
    ("blocal", BLOCAL),
];

pub fn rdf(local: &str) -> String {
    format!("{}{}", RDF, local)
}

pub fn rdfs(local: &str) -> String {
    format!("{}{}", RDFS, local)
}

pub fn owl(local: &str) -> String {
    format!("{}{}", OWL, local)
}

pub fn xsd(local: &str) -> String {
    format!("{}{}", XSD, local)
}

pub fn vivo(local: &str) -> String {
    format!("{}{}", VIVO, local)
}

pub fn vitro(local: &str) -> String {
    format!("{}{}", VITRO, local)
}

pub fn blocal(local: &str) -> String {
    format!("{}{}", BLOCAL, local)
}
