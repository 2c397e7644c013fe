//! Typed supplier rows consumed by the graph builder.
//!
//! A row is what the ingest layer hands over after parsing: column values are
//! already split into strings, flags and loosely typed cells. Nothing here
//! knows about RDF.

use crate::ontology::{ProcessType, ProductType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

// ============================================================================
// EntityId - row-derived identifier
// ============================================================================

/// Identifier of a BusinessEntity, `C<row_index>`.
///
/// Derived from the zero-based position of the row in the input table, not
/// from any business key. Re-running the same file yields the same ids;
/// reordering or inserting rows shifts them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(usize);

impl EntityId {
    pub fn from_row_index(index: usize) -> Self {
        Self(index)
    }

    pub fn row_index(&self) -> usize {
        self.0
    }

    /// Local name of the owned address sub-entity.
    pub fn address_local_name(&self) -> String {
        format!("{}/address", self)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C{}", self.0)
    }
}

// ============================================================================
// CellValue - loosely typed source cell
// ============================================================================

/// A source cell whose type is only known at runtime.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Boolean(bool),
    Integer(i64),
    Decimal(f64),
    Text(String),
}

impl CellValue {
    /// Truthiness used to gate statement emission.
    ///
    /// Empty cells, `false`, zero, NaN and empty text are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Empty => false,
            CellValue::Boolean(b) => *b,
            CellValue::Integer(i) => *i != 0,
            CellValue::Decimal(d) => *d != 0.0 && !d.is_nan(),
            CellValue::Text(s) => !s.trim().is_empty(),
        }
    }

    /// Lexical form written into the graph.
    pub fn lexical(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Boolean(b) => b.to_string(),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Decimal(d) => d.to_string(),
            CellValue::Text(s) => s.trim().to_string(),
        }
    }

    /// Fallible numeric view; text is parsed, booleans are not numbers.
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Decimal(d) if !d.is_nan() => Some(*d),
            CellValue::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        CellValue::Text(value.into())
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Boolean(value)
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        CellValue::Integer(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Decimal(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

// ============================================================================
// SupplierRecord
// ============================================================================

/// Postal address columns. Plain strings, no validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AddressRecord {
    pub country: Option<String>,
    pub region: Option<String>,
    pub postal_code: Option<String>,
    pub locality: Option<String>,
    pub street: Option<String>,
}

/// One facility row of the supplier table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SupplierRecord {
    pub company_name: Option<String>,
    pub address: AddressRecord,
    /// Process columns whose flag is set
    pub processes: BTreeSet<ProcessType>,
    /// Product columns whose flag is set
    pub products: BTreeSet<ProductType>,
    pub has_certifications: bool,
    /// Raw `;`/`,` delimited certification list
    pub certifications: Option<String>,
    pub min_employees: CellValue,
    pub max_employees: CellValue,
    pub percentage_men: CellValue,
    pub percentage_women: CellValue,
    pub percentage_migrants: CellValue,
    pub workers_representative: CellValue,
    pub trade_union: CellValue,
    pub trade_union_name: CellValue,
    pub collective_bargaining: CellValue,
    pub cba_coverage: CellValue,
}

impl SupplierRecord {
    pub fn new(company_name: impl Into<String>) -> Self {
        Self {
            company_name: Some(company_name.into()),
            ..Self::default()
        }
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.address.country = Some(country.into());
        self
    }

    pub fn with_process(mut self, process: ProcessType) -> Self {
        self.processes.insert(process);
        self
    }

    pub fn with_product(mut self, product: ProductType) -> Self {
        self.products.insert(product);
        self
    }

    /// Sets the certification list and raises the certification flag.
    pub fn with_certifications(mut self, raw: impl Into<String>) -> Self {
        self.has_certifications = true;
        self.certifications = Some(raw.into());
        self
    }

    pub fn with_demographics(
        mut self,
        men: impl Into<CellValue>,
        women: impl Into<CellValue>,
        migrants: impl Into<CellValue>,
    ) -> Self {
        self.percentage_men = men.into();
        self.percentage_women = women.into();
        self.percentage_migrants = migrants.into();
        self
    }

    pub fn with_trade_union(mut self, name: impl Into<String>) -> Self {
        self.trade_union = CellValue::Boolean(true);
        self.trade_union_name = CellValue::Text(name.into());
        self
    }

    pub fn with_cba(mut self, coverage: impl Into<CellValue>) -> Self {
        self.collective_bargaining = CellValue::Boolean(true);
        self.cba_coverage = coverage.into();
        self
    }

    pub fn with_employees(mut self, min: i64, max: i64) -> Self {
        self.min_employees = CellValue::Integer(min);
        self.max_employees = CellValue::Integer(max);
        self
    }
}
