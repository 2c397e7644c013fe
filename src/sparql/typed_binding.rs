// =============================================================================
// Type-Safe SPARQL Bindings
// =============================================================================
// Extract SPARQL bindings as tagged values with fallible numeric views

use oxigraph::model::Term;
use oxigraph::model::vocab::xsd;
use oxigraph::sparql::QuerySolution;
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

/// Errors that can occur when extracting typed bindings
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BindingError {
    #[error("Unsupported term kind for '{var}': {found}")]
    UnsupportedTerm { var: String, found: String },
}

/// Value of one result cell.
///
/// Numeric datatypes are parsed eagerly; a literal whose lexical form does
/// not fit its datatype stays a [`TypedValue::TypedLiteral`] so it can still
/// be displayed.
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    Iri(String),
    Literal(String),
    TypedLiteral { value: String, datatype: String },
    LangLiteral { value: String, language: String },
    BlankNode(String),
    Integer(i64),
    Decimal(f64),
    Boolean(bool),
}

impl TypedValue {
    /// Fallible numeric view. Never fails loudly: anything that is not a
    /// number yields `None`.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            TypedValue::Integer(i) => Some(*i as f64),
            TypedValue::Decimal(d) => Some(*d),
            TypedValue::Literal(s) | TypedValue::TypedLiteral { value: s, .. } => {
                s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
            }
            _ => None,
        }
    }

    /// JSON form used by the JSON report renderer
    pub fn to_json(&self) -> JsonValue {
        match self {
            TypedValue::Iri(s) | TypedValue::Literal(s) => JsonValue::String(s.clone()),
            TypedValue::TypedLiteral { value, datatype } => serde_json::json!({
                "value": value,
                "type": "literal",
                "datatype": datatype
            }),
            TypedValue::LangLiteral { value, language } => serde_json::json!({
                "value": value,
                "type": "literal",
                "language": language
            }),
            TypedValue::BlankNode(s) => serde_json::json!({
                "value": s,
                "type": "bnode"
            }),
            TypedValue::Integer(i) => JsonValue::Number((*i).into()),
            TypedValue::Decimal(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            TypedValue::Boolean(b) => JsonValue::Bool(*b),
        }
    }
}

impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Iri(s)
            | TypedValue::Literal(s)
            | TypedValue::TypedLiteral { value: s, .. }
            | TypedValue::LangLiteral { value: s, .. } => write!(f, "{s}"),
            TypedValue::BlankNode(s) => write!(f, "_:{s}"),
            TypedValue::Integer(i) => write!(f, "{i}"),
            TypedValue::Decimal(d) => write!(f, "{d}"),
            TypedValue::Boolean(b) => write!(f, "{b}"),
        }
    }
}

/// Typed view over one query solution
pub struct TypedBinding<'a> {
    solution: &'a QuerySolution,
}

impl<'a> TypedBinding<'a> {
    pub fn new(solution: &'a QuerySolution) -> Self {
        Self { solution }
    }

    /// Get optional term for a variable
    pub fn get_term_opt(&self, var: &str) -> Option<&Term> {
        self.solution.get(var)
    }

    /// Extract optional typed value; unbound variables are `Ok(None)`
    pub fn get_typed_value_opt(&self, var: &str) -> Result<Option<TypedValue>, BindingError> {
        match self.get_term_opt(var) {
            Some(term) => term_to_typed_value(var, term).map(Some),
            None => Ok(None),
        }
    }
}

/// Convert a term to a typed value
pub fn term_to_typed_value(var: &str, term: &Term) -> Result<TypedValue, BindingError> {
    #[allow(unreachable_patterns)]
    match term {
        Term::NamedNode(node) => Ok(TypedValue::Iri(node.as_str().to_string())),
        Term::BlankNode(node) => Ok(TypedValue::BlankNode(node.as_str().to_string())),
        Term::Literal(lit) => {
            let value = lit.value().to_string();
            if let Some(language) = lit.language() {
                return Ok(TypedValue::LangLiteral {
                    value,
                    language: language.to_string(),
                });
            }

            let datatype = lit.datatype();
            if datatype == xsd::INTEGER || datatype == xsd::INT || datatype == xsd::LONG {
                if let Ok(i) = value.parse::<i64>() {
                    return Ok(TypedValue::Integer(i));
                }
            } else if datatype == xsd::DECIMAL
                || datatype == xsd::DOUBLE
                || datatype == xsd::FLOAT
            {
                if let Ok(d) = value.parse::<f64>() {
                    return Ok(TypedValue::Decimal(d));
                }
            } else if datatype == xsd::BOOLEAN {
                if let Ok(b) = value.parse::<bool>() {
                    return Ok(TypedValue::Boolean(b));
                }
            } else if datatype == xsd::STRING {
                return Ok(TypedValue::Literal(value));
            }

            Ok(TypedValue::TypedLiteral {
                value,
                datatype: datatype.as_str().to_string(),
            })
        }
        _ => Err(BindingError::UnsupportedTerm {
            var: var.to_string(),
            found: term.to_string(),
        }),
    }
}
