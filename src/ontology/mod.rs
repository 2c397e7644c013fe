//! Supplier ontology: namespaces, schema declarations and controlled vocabularies
//!
//! The schema is fixed. Everything a row may point at (process types, product
//! types, certificates) is declared here before any instance data is written:
//! - **Namespaces** - prefixes used in the graph, the Turtle output and queries
//! - **Classes and properties** - documentary `rdfs:label` statements
//! - **Vocabulary** - ProcessType / ProductType enumerations and the registry
//!   of declared vocabulary IRIs
//! - **Certificates** - token splitting, the two sanitizers and discovery

pub mod certificate;
pub mod vocabulary;

pub use certificate::{
    CertificateMode, discover_certificates, sanitize_for_discovery, sanitize_for_reference,
    split_tokens,
};
pub use vocabulary::{ProcessType, ProductType, Vocabulary};

use crate::error::BuildError;
use oxigraph::model::NamedNode;
use oxigraph::model::NamedNodeRef;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

/// Base IRI of supplier entities, vocabularies and properties.
pub const BEN: &str = "http://benettondata.it/graph/";
pub const SCHEMA: &str = "http://schema.org/";
pub const GR: &str = "http://purl.org/goodrelations/v1#";

/// Prefixes bound in serialized graphs and prepended to catalog queries.
pub const PREFIXES: &[(&str, &str)] = &[
    ("ben", BEN),
    ("rdf", "http://www.w3.org/1999/02/22-rdf-syntax-ns#"),
    ("rdfs", "http://www.w3.org/2000/01/rdf-schema#"),
    ("xsd", "http://www.w3.org/2001/XMLSchema#"),
    ("schema", SCHEMA),
    ("gr", GR),
    ("foaf", "http://xmlns.com/foaf/0.1/"),
];

pub const BUSINESS_ENTITY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://purl.org/goodrelations/v1#BusinessEntity");
pub const POSTAL_ADDRESS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/PostalAddress");
pub const ADDRESS_COUNTRY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/addressCountry");
pub const ADDRESS_REGION: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/addressRegion");
pub const POSTAL_CODE: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/postalCode");
pub const ADDRESS_LOCALITY: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/addressLocality");
pub const STREET_ADDRESS: NamedNodeRef<'static> =
    NamedNodeRef::new_unchecked("http://schema.org/streetAddress");

/// Schema-level classes with their labels.
pub const CLASSES: &[(&str, &str)] = &[
    (
        "ProductType",
        "Represents types of products in the Benetton supply chain.",
    ),
    (
        "Certificate",
        "Represents certifications that a supplier might have.",
    ),
    (
        "UnionInfo",
        "Contains information about trade unions associated with the supplier.",
    ),
    (
        "ProcessType",
        "ProcessType class, part of the Benetton Suppliers Ontology and that represents the various processes that are carried out by the supplier's network",
    ),
];

/// Declared relations with their descriptions. Documentary only.
pub const PROPERTIES: &[(&str, &str)] = &[
    ("hasProcess", "Indicates the processes a company is involved in."),
    (
        "hasProductType",
        "Indicates the types of products a company produces.",
    ),
    ("hasCertificate", "Indicates the certificates a company holds."),
    (
        "minEmployees",
        "Indicates the minimum number of employees in the company.",
    ),
    (
        "maxEmployees",
        "Indicates the maximum number of employees in the company.",
    ),
    (
        "percentageOfMen",
        "Indicates the percentage of men in a company.",
    ),
    (
        "percentageOfWomen",
        "Indicates the percentage of women in a company.",
    ),
    (
        "percentageOfMigrants",
        "Indicates the percentage of migrant workers in a company.",
    ),
    (
        "hasWorkersRepresentative",
        "Indicates if an organization has workers' representatives.",
    ),
    ("hasTradeUnion", "Indicates if a company has a trade union."),
    ("tradeUnionName", "Name of the trade union within the company."),
    (
        "collectiveBargainingAgreement",
        "Indicates if a company has a collective bargaining agreement.",
    ),
    (
        "coverageCBA",
        "Percentage of workforce covered by the collective bargaining agreement.",
    ),
];

/// Characters that may not appear verbatim in an IRI local name.
const IRI_RESERVED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// IRI in the `ben:` namespace for an already safe local name.
pub fn ben(local: &str) -> Result<NamedNode, BuildError> {
    let iri = format!("{BEN}{local}");
    NamedNode::new(iri.clone()).map_err(|_| BuildError::InvalidIri(iri))
}

/// IRI in the `ben:` namespace for a data-derived token.
pub fn ben_encoded(token: &str) -> Result<NamedNode, BuildError> {
    ben(&utf8_percent_encode(token, IRI_RESERVED).to_string())
}

/// SPARQL `PREFIX` header for every namespace in [`PREFIXES`].
pub fn sparql_prologue() -> String {
    PREFIXES
        .iter()
        .map(|(prefix, iri)| format!("PREFIX {prefix}: <{iri}>\n"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ben_iris_are_namespaced() {
        let iri = ben("WetProcess").unwrap();
        assert_eq!(iri.as_str(), "http://benettondata.it/graph/WetProcess");
    }

    #[test]
    fn encoded_tokens_form_valid_iris() {
        let iri = ben_encoded("GOTS<v6>|100%").unwrap();
        assert_eq!(
            iri.as_str(),
            "http://benettondata.it/graph/GOTS%3Cv6%3E%7C100%25"
        );
    }

    #[test]
    fn thirteen_properties_are_declared() {
        assert_eq!(PROPERTIES.len(), 13);
        assert_eq!(CLASSES.len(), 4);
    }

    #[test]
    fn prologue_binds_every_prefix() {
        let prologue = sparql_prologue();
        for (prefix, _) in PREFIXES {
            assert!(prologue.contains(&format!("PREFIX {prefix}:")));
        }
    }
}
