//! The report catalog: named, parameterized SELECT queries.
//!
//! Query sources are written without a prologue; the engine prepends the
//! supplier prefixes before evaluation.

use crate::error::ConfigError;
use crate::sparql::QueryParameter;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Default threshold for the women-majority report, in percent.
pub const DEFAULT_WOMEN_THRESHOLD: f64 = 70.0;

/// Whether a query answers with one aggregate row or a row sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultShape {
    SingleRow,
    #[default]
    Rows,
}

/// What a query computes. Only [`QueryKind::Ratio`] changes how results
/// are checked; the other kinds are descriptive.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QueryKind {
    Count,
    #[default]
    Listing,
    GroupedAggregate,
    FilteredListing,
    /// Names of the projected numerator, denominator and ratio variables
    Ratio {
        numerator: String,
        denominator: String,
        ratio: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    pub name: String,
    pub description: String,
    pub sparql: String,
    #[serde(default)]
    pub shape: ResultShape,
    #[serde(default)]
    pub kind: QueryKind,
    #[serde(default)]
    pub parameters: IndexMap<String, QueryParameter>,
}

impl QuerySpec {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        sparql: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            sparql: sparql.into(),
            shape: ResultShape::Rows,
            kind: QueryKind::Listing,
            parameters: IndexMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: QueryKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn single_row(mut self) -> Self {
        self.shape = ResultShape::SingleRow;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: QueryParameter) -> Self {
        self.parameters.insert(name.into(), value);
        self
    }
}

const WET_PROCESS_CERTIFIED: &str = r#"
SELECT (COUNT(DISTINCT ?company) AS ?count) WHERE {
  ?company a gr:BusinessEntity ;
           ben:hasProcess ben:WetProcess ;
           ben:hasCertificate ?cert .
}"#;

const TRADE_UNION_NAMES: &str = r#"
SELECT ?companyName ?tradeUnionName WHERE {
  ?company a gr:BusinessEntity ;
           ben:hasTradeUnion true ;
           ben:tradeUnionName ?tradeUnionName ;
           ben:name ?companyName .
}
ORDER BY ?companyName ?tradeUnionName"#;

const DEMOGRAPHICS_BY_COUNTRY: &str = r#"
SELECT ?country (AVG(?menPercentage) AS ?avgMen) (AVG(?womenPercentage) AS ?avgWomen) (AVG(?migrantPercentage) AS ?avgMigrants) WHERE {
  ?company a gr:BusinessEntity ;
           ben:address ?address ;
           ben:percentageOfMen ?menPercentage ;
           ben:percentageOfWomen ?womenPercentage ;
           ben:percentageOfMigrants ?migrantPercentage .
  ?address schema:addressCountry ?country .
  FILTER(isNumeric(?menPercentage) && isNumeric(?womenPercentage) && isNumeric(?migrantPercentage))
}
GROUP BY ?country
ORDER BY ?country"#;

const CBA_COVERAGE: &str = r#"
SELECT ?companyName ?cbaPercentage WHERE {
  ?company a gr:BusinessEntity ;
           ben:collectiveBargainingAgreement true ;
           ben:coverageCBA ?cbaPercentage ;
           ben:name ?companyName .
}
ORDER BY ?companyName ?cbaPercentage"#;

const WET_PROCESS_CERTIFICATION_RATIO: &str = r#"
SELECT ?certified ?total ?percentage WHERE {
  {
    SELECT (COUNT(DISTINCT ?company) AS ?certified) WHERE {
      ?company a gr:BusinessEntity ;
               ben:hasProcess ben:WetProcess ;
               ben:hasCertificate ?cert .
    }
  }
  {
    SELECT (COUNT(DISTINCT ?candidate) AS ?total) WHERE {
      ?candidate a gr:BusinessEntity ;
                 ben:hasProcess ben:WetProcess .
    }
  }
  BIND(?certified * 100.0 / ?total AS ?percentage)
}"#;

const WOMEN_MAJORITY: &str = r#"
SELECT ?companyName ?percentageOfWomen WHERE {
  ?company a gr:BusinessEntity ;
           ben:name ?companyName ;
           ben:percentageOfWomen ?percentageOfWomen .
  FILTER(isLiteral(?percentageOfWomen) && xsd:decimal(?percentageOfWomen) > $threshold)
}
ORDER BY ?companyName"#;

/// Ordered set of queries, unique by name.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Catalog {
    queries: IndexMap<String, QuerySpec>,
}

impl Catalog {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The six built-in supplier reports, in report order.
    pub fn default_catalog(women_threshold: f64) -> Self {
        let mut catalog = Self::empty();
        catalog.insert(
            QuerySpec::new(
                "wet_process_certified",
                "Number of companies running a wet process that hold at least one certificate",
                WET_PROCESS_CERTIFIED,
            )
            .with_kind(QueryKind::Count)
            .single_row(),
        );
        catalog.insert(QuerySpec::new(
            "trade_union_names",
            "Trade unions present in companies that declare one",
            TRADE_UNION_NAMES,
        ));
        catalog.insert(
            QuerySpec::new(
                "demographics_by_country",
                "Average percentage of men, women and migrant workers per country",
                DEMOGRAPHICS_BY_COUNTRY,
            )
            .with_kind(QueryKind::GroupedAggregate),
        );
        catalog.insert(QuerySpec::new(
            "cba_coverage",
            "Workforce coverage of collective bargaining agreements",
            CBA_COVERAGE,
        ));
        catalog.insert(
            QuerySpec::new(
                "wet_process_certification_ratio",
                "Percentage of wet process companies holding at least one certificate",
                WET_PROCESS_CERTIFICATION_RATIO,
            )
            .with_kind(QueryKind::Ratio {
                numerator: "certified".to_string(),
                denominator: "total".to_string(),
                ratio: "percentage".to_string(),
            })
            .single_row(),
        );
        catalog.insert(
            QuerySpec::new(
                "women_majority",
                "Companies where women exceed the configured share of the workforce",
                WOMEN_MAJORITY,
            )
            .with_kind(QueryKind::FilteredListing)
            .with_parameter("threshold", QueryParameter::Decimal(women_threshold)),
        );
        catalog
    }

    /// Add a query, replacing any query of the same name in place.
    pub fn insert(&mut self, spec: QuerySpec) -> Option<QuerySpec> {
        self.queries.insert(spec.name.clone(), spec)
    }

    /// Merge queries loaded from elsewhere: same-named entries are
    /// overridden in place, new ones are appended.
    pub fn extend(&mut self, specs: impl IntoIterator<Item = QuerySpec>) {
        for spec in specs {
            let name = spec.name.clone();
            if self.insert(spec).is_some() {
                tracing::debug!(query = %name, "catalog entry overridden");
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&QuerySpec> {
        self.queries.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &QuerySpec> {
        self.queries.values()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.queries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.queries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Load a list of [`QuerySpec`] from a YAML or JSON file.
pub fn load_catalog_file(path: &Path) -> Result<Vec<QuerySpec>, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::MissingFile(path.to_path_buf()));
    }
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Invalid(format!("failed to read {path:?}: {e}")))?;

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&contents)
            .map_err(|e| ConfigError::Invalid(format!("catalog {path:?}: {e}"))),
        "json" => serde_json::from_str(&contents)
            .map_err(|e| ConfigError::Invalid(format!("catalog {path:?}: {e}"))),
        other => Err(ConfigError::UnsupportedExtension(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_catalog_order() {
        let catalog = Catalog::default_catalog(DEFAULT_WOMEN_THRESHOLD);
        let names: Vec<_> = catalog.names().collect();
        assert_eq!(
            names,
            vec![
                "wet_process_certified",
                "trade_union_names",
                "demographics_by_country",
                "cba_coverage",
                "wet_process_certification_ratio",
                "women_majority",
            ]
        );
        assert_eq!(
            catalog.get("women_majority").unwrap().parameters["threshold"],
            QueryParameter::Decimal(70.0)
        );
    }

    #[test]
    fn extending_overrides_in_place() {
        let mut catalog = Catalog::default_catalog(DEFAULT_WOMEN_THRESHOLD);
        catalog.extend(vec![
            QuerySpec::new("trade_union_names", "replaced", "SELECT ?x WHERE { }"),
            QuerySpec::new("extra", "appended", "SELECT ?x WHERE { }"),
        ]);
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.names().nth(1), Some("trade_union_names"));
        assert_eq!(catalog.get("trade_union_names").unwrap().description, "replaced");
        assert_eq!(catalog.names().last(), Some("extra"));
    }

    #[test]
    fn yaml_catalog_file() {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
        writeln!(
            file,
            r#"
- name: big_companies
  description: Companies with more than a threshold of employees
  sparql: "SELECT ?c WHERE {{ ?c ben:maxEmployees ?m FILTER(?m > $min) }}"
  shape: rows
  kind:
    type: filtered_listing
  parameters:
    min:
      type: integer
      value: 500
"#
        )
        .unwrap();

        let specs = load_catalog_file(file.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].kind, QueryKind::FilteredListing);
        assert_eq!(specs[0].parameters["min"], QueryParameter::Integer(500));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        let err = load_catalog_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedExtension(ext) if ext == "toml"));
    }
}
