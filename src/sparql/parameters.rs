//! Query parameters and read-only enforcement.
//!
//! Catalog queries may contain `$name` placeholders. Each placeholder is
//! replaced with the SPARQL serialization of a typed value, produced by
//! oxigraph's own term writer, so strings are always quoted and escaped and
//! IRIs are always validated. No raw text is ever spliced into a query.

use crate::error::ReportError;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use oxigraph::model::vocab::xsd;
use oxigraph::model::{Literal, NamedNode};
use oxigraph::sparql::SparqlEvaluator;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("placeholder pattern is valid")
});

static PARAMETER_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("name pattern is valid"));

static UPDATE_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(INSERT|DELETE|DROP|CLEAR|LOAD|CREATE|COPY|MOVE|ADD)\b")
        .expect("update keyword pattern is valid")
});

/// A typed value bound to a `$name` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum QueryParameter {
    Decimal(f64),
    Integer(i64),
    Boolean(bool),
    String(String),
    Iri(String),
}

impl QueryParameter {
    /// SPARQL term text for this value
    pub fn to_sparql(&self, name: &str) -> Result<String, ReportError> {
        let rendered = match self {
            QueryParameter::Decimal(value) => {
                if !value.is_finite() {
                    return Err(ReportError::InvalidParameter {
                        name: name.to_string(),
                        reason: format!("{value} is not a finite decimal"),
                    });
                }
                Literal::new_typed_literal(decimal_lexical(*value), xsd::DECIMAL).to_string()
            }
            QueryParameter::Integer(value) => Literal::from(*value).to_string(),
            QueryParameter::Boolean(value) => Literal::from(*value).to_string(),
            QueryParameter::String(value) => Literal::new_simple_literal(value).to_string(),
            QueryParameter::Iri(value) => NamedNode::new(value.as_str())
                .map_err(|e| ReportError::InvalidParameter {
                    name: name.to_string(),
                    reason: e.to_string(),
                })?
                .to_string(),
        };
        Ok(rendered)
    }
}

impl fmt::Display for QueryParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryParameter::Decimal(v) => write!(f, "{v}"),
            QueryParameter::Integer(v) => write!(f, "{v}"),
            QueryParameter::Boolean(v) => write!(f, "{v}"),
            QueryParameter::String(v) => write!(f, "{v:?}"),
            QueryParameter::Iri(v) => write!(f, "<{v}>"),
        }
    }
}

/// xsd:decimal lexical form: always carries a fractional part.
fn decimal_lexical(value: f64) -> String {
    let text = value.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

pub fn validate_parameter_name(name: &str) -> Result<(), ReportError> {
    if PARAMETER_NAME.is_match(name) {
        Ok(())
    } else {
        Err(ReportError::InvalidParameter {
            name: name.to_string(),
            reason: "names must match [A-Za-z_][A-Za-z0-9_]*".to_string(),
        })
    }
}

/// Replace every `$name` placeholder in `source` with its bound value.
///
/// # Errors
///
/// [`ReportError::InvalidParameter`] for a badly named or unrenderable
/// binding, [`ReportError::MissingParameter`] for a placeholder with no
/// binding.
pub fn bind_parameters(
    source: &str,
    parameters: &IndexMap<String, QueryParameter>,
) -> Result<String, ReportError> {
    let mut rendered = IndexMap::with_capacity(parameters.len());
    for (name, value) in parameters {
        validate_parameter_name(name)?;
        rendered.insert(name.as_str(), value.to_sparql(name)?);
    }

    let mut output = String::with_capacity(source.len());
    let mut last = 0;
    for capture in PLACEHOLDER.captures_iter(source) {
        let (Some(whole), Some(name)) = (capture.get(0), capture.get(1)) else {
            continue;
        };
        let value = rendered
            .get(name.as_str())
            .ok_or_else(|| ReportError::MissingParameter(name.as_str().to_string()))?;
        output.push_str(&source[last..whole.start()]);
        output.push_str(value);
        last = whole.end();
    }
    output.push_str(&source[last..]);
    Ok(output)
}

/// Reject anything that could modify the graph.
///
/// Only text that parses as a SPARQL update is rejected. Text that is a
/// query, or that parses as neither, passes through and is left to query
/// evaluation. Identifiers such as `?load` or `ben:copy` are never
/// mistaken for update operations.
pub fn check_query_safety(query: &str) -> Result<(), ReportError> {
    if SparqlEvaluator::new().parse_query(query).is_ok()
        || SparqlEvaluator::new().parse_update(query).is_err()
    {
        return Ok(());
    }
    // an update without any operation (a bare prologue) changes nothing
    match UPDATE_KEYWORD.captures(query).and_then(|c| c.get(1)) {
        Some(keyword) => Err(ReportError::UnsafeQuery(keyword.as_str().to_uppercase())),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, QueryParameter)]) -> IndexMap<String, QueryParameter> {
        entries
            .iter()
            .map(|(name, value)| (name.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn decimal_placeholder_is_typed() {
        let query = bind_parameters(
            "FILTER(?w > $threshold)",
            &params(&[("threshold", QueryParameter::Decimal(70.0))]),
        )
        .unwrap();
        assert_eq!(
            query,
            "FILTER(?w > \"70.0\"^^<http://www.w3.org/2001/XMLSchema#decimal>)"
        );
    }

    #[test]
    fn strings_are_escaped() {
        let query = bind_parameters(
            "?x ben:name $name .",
            &params(&[(
                "name",
                QueryParameter::String("Acme\" } ; DROP ALL #".to_string()),
            )]),
        )
        .unwrap();
        assert_eq!(query, "?x ben:name \"Acme\\\" } ; DROP ALL #\" .");
    }

    #[test]
    fn unbound_placeholder_is_missing() {
        let err = bind_parameters("FILTER(?w > $limit)", &IndexMap::new()).unwrap_err();
        assert_eq!(err, ReportError::MissingParameter("limit".into()));
    }

    #[test]
    fn bad_names_and_values_are_rejected() {
        let err = bind_parameters("", &params(&[("1bad", QueryParameter::Integer(1))])).unwrap_err();
        assert!(matches!(err, ReportError::InvalidParameter { .. }));

        let err = bind_parameters(
            "$x",
            &params(&[("x", QueryParameter::Iri("not an iri".into()))]),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::InvalidParameter { .. }));

        let err = bind_parameters(
            "$x",
            &params(&[("x", QueryParameter::Decimal(f64::NAN))]),
        )
        .unwrap_err();
        assert!(matches!(err, ReportError::InvalidParameter { .. }));
    }

    #[test]
    fn updates_are_unsafe() {
        assert!(check_query_safety("SELECT ?s WHERE { ?s ?p ?o }").is_ok());
        assert_eq!(
            check_query_safety("delete where { ?s ?p ?o }"),
            Err(ReportError::UnsafeQuery("DELETE".into()))
        );
        assert_eq!(
            check_query_safety("PREFIX ex: <http://example.com/>\nINSERT DATA { ex:a ex:b ex:c }"),
            Err(ReportError::UnsafeQuery("INSERT".into()))
        );
    }

    #[test]
    fn update_words_in_identifiers_are_read_only() {
        let query = "PREFIX ben: <http://benettondata.it/graph/>\n\
                     SELECT ?load ?move WHERE { ?load ben:copy ?move ; ben:delete ?created }";
        assert!(check_query_safety(query).is_ok());
    }

    #[test]
    fn unparsable_text_is_left_to_evaluation() {
        assert!(check_query_safety("SELECT WHERE {").is_ok());
        assert!(check_query_safety("").is_ok());
    }
}
