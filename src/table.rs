//! Supplier table ingest: CSV rows to [`SupplierRecord`]s.
//!
//! Columns are matched by header name; missing columns read as empty and
//! unknown columns are ignored. Cells are typed loosely:
//! - flag cells accept `true/false`, `yes/no`, `y/n`, `x`, `1/0`
//! - numeric cells parse as an integer, then a decimal, else stay text
//!
//! When the `hasCertifications` column is absent the flag is inferred from a
//! non-empty `CERTIFICATIONS` cell.

use crate::error::TableError;
use crate::model::{AddressRecord, CellValue, SupplierRecord};
use crate::ontology::{ProcessType, ProductType};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use strum::IntoEnumIterator;

const HAS_CERTIFICATIONS: &str = "hasCertifications";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSupplierRow {
    #[serde(rename = "COMPANY NAME")]
    company_name: Option<String>,
    #[serde(rename = "COUNTRY")]
    country: Option<String>,
    #[serde(rename = "COUNTY")]
    county: Option<String>,
    #[serde(rename = "ZIP")]
    zip: Option<String>,
    #[serde(rename = "CITY")]
    city: Option<String>,
    #[serde(rename = "STREET")]
    street: Option<String>,

    #[serde(rename = "MANUFACTURING")]
    manufacturing: Option<String>,
    #[serde(rename = "OTHER_PROCESSING")]
    other_processing: Option<String>,
    #[serde(rename = "PRINTING")]
    printing: Option<String>,
    #[serde(rename = "SPINNING")]
    spinning: Option<String>,
    #[serde(rename = "WEAVING")]
    weaving: Option<String>,
    #[serde(rename = "WET_PROCESS")]
    wet_process: Option<String>,

    #[serde(rename = "APPAREL")]
    apparel: Option<String>,
    #[serde(rename = "SHOES")]
    shoes: Option<String>,
    #[serde(rename = "ACCESSORIES")]
    accessories: Option<String>,

    #[serde(rename = "hasCertifications")]
    has_certifications: Option<String>,
    #[serde(rename = "CERTIFICATIONS")]
    certifications: Option<String>,

    #[serde(rename = "MIN_EMPLOYEES")]
    min_employees: Option<String>,
    #[serde(rename = "MAX_EMPLOYEES")]
    max_employees: Option<String>,
    #[serde(rename = "% MEN")]
    percentage_men: Option<String>,
    #[serde(rename = "% WOMEN")]
    percentage_women: Option<String>,
    #[serde(rename = "% MIGRANT WORKERS")]
    percentage_migrants: Option<String>,

    #[serde(rename = "WORKERS' REPRESENTATIVES")]
    workers_representative: Option<String>,
    #[serde(rename = "TRADE UNION")]
    trade_union: Option<String>,
    #[serde(rename = "NAME OF THE TRADE UNION")]
    trade_union_name: Option<String>,
    #[serde(rename = "COLLECTIVE BARGAINING AGREEMENT")]
    collective_bargaining: Option<String>,
    #[serde(rename = "% WORKFORCE COVERED BY THE CBA")]
    cba_coverage: Option<String>,
}

impl RawSupplierRow {
    fn process_flag(&self, process: ProcessType) -> &Option<String> {
        match process {
            ProcessType::Manufacturing => &self.manufacturing,
            ProcessType::OtherProcessing => &self.other_processing,
            ProcessType::Printing => &self.printing,
            ProcessType::Spinning => &self.spinning,
            ProcessType::Weaving => &self.weaving,
            ProcessType::WetProcess => &self.wet_process,
        }
    }

    fn product_flag(&self, product: ProductType) -> &Option<String> {
        match product {
            ProductType::Apparel => &self.apparel,
            ProductType::Shoes => &self.shoes,
            ProductType::Accessories => &self.accessories,
        }
    }

    fn into_record(self, infer_certification_flag: bool) -> SupplierRecord {
        let certifications = non_empty(self.certifications.clone());
        let has_certifications = if infer_certification_flag {
            certifications.is_some()
        } else {
            parse_flag(self.has_certifications.as_deref()).is_truthy()
        };

        let processes = ProcessType::iter()
            .filter(|p| parse_flag(self.process_flag(*p).as_deref()).is_truthy())
            .collect();
        let products = ProductType::iter()
            .filter(|p| parse_flag(self.product_flag(*p).as_deref()).is_truthy())
            .collect();

        SupplierRecord {
            company_name: non_empty(self.company_name),
            address: AddressRecord {
                country: non_empty(self.country),
                region: non_empty(self.county),
                postal_code: non_empty(self.zip),
                locality: non_empty(self.city),
                street: non_empty(self.street),
            },
            processes,
            products,
            has_certifications,
            certifications,
            min_employees: parse_number(self.min_employees.as_deref()),
            max_employees: parse_number(self.max_employees.as_deref()),
            percentage_men: parse_number(self.percentage_men.as_deref()),
            percentage_women: parse_number(self.percentage_women.as_deref()),
            percentage_migrants: parse_number(self.percentage_migrants.as_deref()),
            workers_representative: parse_flag(self.workers_representative.as_deref()),
            trade_union: parse_flag(self.trade_union.as_deref()),
            trade_union_name: non_empty(self.trade_union_name)
                .map(CellValue::Text)
                .unwrap_or_default(),
            collective_bargaining: parse_flag(self.collective_bargaining.as_deref()),
            cba_coverage: parse_number(self.cba_coverage.as_deref()),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Loosely typed flag cell.
///
/// Recognized yes/no spellings become booleans; anything else falls back
/// to [`parse_number`], so `2` stays a truthy integer and free text stays
/// truthy text.
pub fn parse_flag(raw: Option<&str>) -> CellValue {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return CellValue::Empty;
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "x" | "1" => CellValue::Boolean(true),
        "false" | "no" | "n" | "0" => CellValue::Boolean(false),
        _ => parse_number(Some(raw)),
    }
}

/// Loosely typed numeric cell: integer, then decimal, else text.
/// A trailing `%` is ignored for the numeric attempts.
pub fn parse_number(raw: Option<&str>) -> CellValue {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return CellValue::Empty;
    };
    let numeric = raw.strip_suffix('%').map(str::trim_end).unwrap_or(raw);
    if let Ok(i) = numeric.parse::<i64>() {
        return CellValue::Integer(i);
    }
    match numeric.parse::<f64>() {
        Ok(d) if d.is_finite() => CellValue::Decimal(d),
        _ => CellValue::Text(raw.to_string()),
    }
}

/// Read supplier rows from any CSV source with a header line.
pub fn read_suppliers_from_reader<R: Read>(reader: R) -> Result<Vec<SupplierRecord>, TableError> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv.headers()?.clone();
    let infer_certification_flag = !headers.iter().any(|h| h == HAS_CERTIFICATIONS);
    if infer_certification_flag {
        tracing::debug!("no {HAS_CERTIFICATIONS} column; inferring the flag from CERTIFICATIONS");
    }

    let mut rows = Vec::new();
    for (index, result) in csv.deserialize::<RawSupplierRow>().enumerate() {
        let raw = result.map_err(|e| TableError::Row {
            row: index,
            reason: e.to_string(),
        })?;
        rows.push(raw.into_record(infer_certification_flag));
    }
    Ok(rows)
}

/// Read the supplier table at `path`.
pub fn read_suppliers(path: &Path) -> Result<Vec<SupplierRecord>, TableError> {
    if !path.exists() {
        return Err(TableError::NotFound(path.to_path_buf()));
    }
    let file = File::open(path).map_err(csv::Error::from)?;
    let rows = read_suppliers_from_reader(file)?;
    tracing::info!(path = %path.display(), rows = rows.len(), "supplier table loaded");
    Ok(rows)
}
