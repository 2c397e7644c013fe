//! Supplier table → RDF graph.
//!
//! Construction happens in three ordered phases:
//! 1. schema and fixed vocabularies (classes, process/product instances, properties)
//! 2. certificate discovery over the whole table
//! 3. one BusinessEntity (plus its address) per row, in row order
//!
//! Phase 2 completes before phase 3 starts, so every certificate a row can
//! resolve to exists before the first instance statement is written.

use super::SupplierGraph;
use crate::error::BuildError;
use crate::model::{CellValue, EntityId, SupplierRecord};
use crate::ontology::{
    self, BUSINESS_ENTITY, CLASSES, CertificateMode, POSTAL_ADDRESS, PROPERTIES, ProcessType,
    ProductType, Vocabulary, ben, ben_encoded, discover_certificates, split_tokens,
};
use oxigraph::model::vocab::{rdf, rdfs, xsd};
use oxigraph::model::{Literal, NamedNode, NamedNodeRef, Term};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    pub certificate_mode: CertificateMode,
}

/// Counters reported once a build finishes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStats {
    pub rows: usize,
    pub entities: usize,
    pub addresses: usize,
    pub certificates: usize,
    pub certificate_references: usize,
    /// Row references that match no discovered certificate (faithful mode only)
    pub unresolved_certificate_references: usize,
    pub triples: usize,
}

pub struct GraphBuilder {
    options: BuildOptions,
}

impl GraphBuilder {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    /// Build an immutable graph from the supplier rows.
    ///
    /// Missing optional cells produce no statement; missing required cells
    /// (name, address parts) are written as empty strings.
    ///
    /// # Errors
    ///
    /// [`BuildError::UnresolvedReference`] when a row would point at an
    /// undeclared vocabulary entry (only reachable for certificates in
    /// unified mode), plus IRI and storage failures.
    pub fn build(&self, rows: &[SupplierRecord]) -> Result<(SupplierGraph, BuildStats), BuildError> {
        let _span = tracing::info_span!(
            "build_graph",
            rows = rows.len(),
            certificate_mode = %self.options.certificate_mode
        )
        .entered();

        let graph = SupplierGraph::empty()?;
        let mut stats = BuildStats {
            rows: rows.len(),
            ..BuildStats::default()
        };

        let mut vocabulary = declare_schema(&graph)?;
        stats.certificates = declare_certificates(&graph, &mut vocabulary, rows)?;
        tracing::debug!(
            certificates = stats.certificates,
            "vocabulary initialized"
        );

        for (index, row) in rows.iter().enumerate() {
            self.add_entity(&graph, &vocabulary, EntityId::from_row_index(index), row, &mut stats)?;
        }

        stats.triples = graph.len()?;
        tracing::info!(
            entities = stats.entities,
            certificates = stats.certificates,
            certificate_references = stats.certificate_references,
            unresolved_certificate_references = stats.unresolved_certificate_references,
            triples = stats.triples,
            "graph built"
        );

        Ok((graph, stats))
    }

    fn add_entity(
        &self,
        graph: &SupplierGraph,
        vocabulary: &Vocabulary,
        id: EntityId,
        row: &SupplierRecord,
        stats: &mut BuildStats,
    ) -> Result<(), BuildError> {
        let subject = ben(&id.to_string())?;
        let address = ben(&id.address_local_name())?;

        graph.insert(&subject, rdf::TYPE, BUSINESS_ENTITY.into_owned())?;
        graph.insert(&subject, ben("name")?, plain(row.company_name.as_deref()))?;
        stats.entities += 1;

        graph.insert(&subject, ben("address")?, address.clone())?;
        graph.insert(&address, rdf::TYPE, POSTAL_ADDRESS.into_owned())?;
        let parts = [
            (ontology::ADDRESS_COUNTRY, &row.address.country),
            (ontology::ADDRESS_REGION, &row.address.region),
            (ontology::POSTAL_CODE, &row.address.postal_code),
            (ontology::ADDRESS_LOCALITY, &row.address.locality),
            (ontology::STREET_ADDRESS, &row.address.street),
        ];
        for (predicate, value) in parts {
            graph.insert(&address, predicate, plain(value.as_deref()))?;
        }
        stats.addresses += 1;

        let has_process = ben("hasProcess")?;
        for process in ProcessType::iter().filter(|p| row.processes.contains(p)) {
            let target = process.iri()?;
            vocabulary.require(&subject, &target)?;
            graph.insert(&subject, has_process.clone(), target)?;
        }

        let has_product = ben("hasProductType")?;
        for product in ProductType::iter().filter(|p| row.products.contains(p)) {
            let target = product.iri()?;
            vocabulary.require(&subject, &target)?;
            graph.insert(&subject, has_product.clone(), target)?;
        }

        if row.has_certifications {
            self.add_certificate_references(graph, vocabulary, &subject, row, stats)?;
        }

        emit_typed(graph, &subject, "minEmployees", &row.min_employees, xsd::INTEGER)?;
        emit_typed(graph, &subject, "maxEmployees", &row.max_employees, xsd::INTEGER)?;
        emit_typed(graph, &subject, "percentageOfMen", &row.percentage_men, xsd::DECIMAL)?;
        emit_typed(graph, &subject, "percentageOfWomen", &row.percentage_women, xsd::DECIMAL)?;
        emit_typed(
            graph,
            &subject,
            "percentageOfMigrants",
            &row.percentage_migrants,
            xsd::DECIMAL,
        )?;

        if row.workers_representative.is_truthy() {
            graph.insert(
                &subject,
                ben("hasWorkersRepresentative")?,
                flag(&row.workers_representative),
            )?;
        }

        // Dependent fields follow their flag even when their own cell is empty.
        if row.trade_union.is_truthy() {
            graph.insert(&subject, ben("hasTradeUnion")?, flag(&row.trade_union))?;
            graph.insert(
                &subject,
                ben("tradeUnionName")?,
                Literal::new_simple_literal(row.trade_union_name.lexical()),
            )?;
        }

        if row.collective_bargaining.is_truthy() {
            graph.insert(
                &subject,
                ben("collectiveBargainingAgreement")?,
                flag(&row.collective_bargaining),
            )?;
            let coverage = match &row.cba_coverage {
                CellValue::Empty => Literal::new_simple_literal(""),
                cell => Literal::new_typed_literal(cell.lexical(), xsd::DECIMAL),
            };
            graph.insert(&subject, ben("coverageCBA")?, coverage)?;
        }

        Ok(())
    }

    fn add_certificate_references(
        &self,
        graph: &SupplierGraph,
        vocabulary: &Vocabulary,
        subject: &NamedNode,
        row: &SupplierRecord,
        stats: &mut BuildStats,
    ) -> Result<(), BuildError> {
        let Some(raw) = row.certifications.as_deref() else {
            return Ok(());
        };
        let has_certificate = ben("hasCertificate")?;
        let mode = self.options.certificate_mode;

        for token in split_tokens(raw) {
            let reference = mode.sanitize_reference(token);
            if reference.is_empty() {
                continue;
            }
            let target = ben_encoded(&reference)?;

            if !vocabulary.certificates().contains(&reference) {
                match mode {
                    CertificateMode::Unified => {
                        return Err(BuildError::UnresolvedReference {
                            subject: subject.as_str().to_string(),
                            reference: target.as_str().to_string(),
                        });
                    }
                    CertificateMode::Faithful => {
                        tracing::warn!(
                            entity = %subject,
                            token,
                            reference = %reference,
                            "certificate reference does not match a discovered certificate"
                        );
                        stats.unresolved_certificate_references += 1;
                    }
                }
            }

            graph.insert(subject, has_certificate.clone(), target)?;
            stats.certificate_references += 1;
        }
        Ok(())
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

/// Phase 1: classes, fixed enumerations and property declarations.
fn declare_schema(graph: &SupplierGraph) -> Result<Vocabulary, BuildError> {
    for (class, label) in CLASSES {
        let iri = ben(class)?;
        graph.insert(&iri, rdf::TYPE, rdfs::CLASS.into_owned())?;
        graph.insert(&iri, rdfs::LABEL, Literal::new_simple_literal(*label))?;
    }

    let process_class = ben("ProcessType")?;
    for process in ProcessType::iter() {
        let iri = process.iri()?;
        graph.insert(&iri, rdf::TYPE, process_class.clone())?;
        graph.insert(&iri, rdfs::LABEL, Literal::new_simple_literal(process.local_name()))?;
    }

    let product_class = ben("ProductType")?;
    for product in ProductType::iter() {
        let iri = product.iri()?;
        graph.insert(&iri, rdf::TYPE, product_class.clone())?;
        graph.insert(&iri, rdfs::LABEL, Literal::new_simple_literal(product.local_name()))?;
    }

    for (property, label) in PROPERTIES {
        let iri = ben(property)?;
        graph.insert(&iri, rdf::TYPE, rdf::PROPERTY.into_owned())?;
        graph.insert(&iri, rdfs::LABEL, Literal::new_simple_literal(*label))?;
    }

    Vocabulary::with_fixed_enumerations()
}

/// Phase 2: one Certificate per distinct discovered token.
fn declare_certificates(
    graph: &SupplierGraph,
    vocabulary: &mut Vocabulary,
    rows: &[SupplierRecord],
) -> Result<usize, BuildError> {
    let certificate_class = ben("Certificate")?;
    let tokens = discover_certificates(rows);
    for token in &tokens {
        let iri = ben_encoded(token)?;
        graph.insert(&iri, rdf::TYPE, certificate_class.clone())?;
        graph.insert(&iri, rdfs::LABEL, Literal::new_simple_literal(token.as_str()))?;
        vocabulary.declare_certificate(token, iri);
    }
    Ok(tokens.len())
}

fn plain(value: Option<&str>) -> Literal {
    Literal::new_simple_literal(value.map(str::trim).unwrap_or_default())
}

/// Natural literal for a flag cell.
fn flag(cell: &CellValue) -> Term {
    match cell {
        CellValue::Boolean(b) => Literal::from(*b).into(),
        CellValue::Integer(i) => Literal::from(*i).into(),
        CellValue::Decimal(_) => Literal::new_typed_literal(cell.lexical(), xsd::DECIMAL).into(),
        CellValue::Text(_) | CellValue::Empty => Literal::new_simple_literal(cell.lexical()).into(),
    }
}

/// Typed literal gated on the cell being truthy. The lexical form is kept as
/// is, even if it is not valid for the datatype.
fn emit_typed(
    graph: &SupplierGraph,
    subject: &NamedNode,
    property: &str,
    cell: &CellValue,
    datatype: NamedNodeRef<'static>,
) -> Result<(), BuildError> {
    if cell.is_truthy() {
        graph.insert(
            subject,
            ben(property)?,
            Literal::new_typed_literal(cell.lexical(), datatype),
        )?;
    }
    Ok(())
}
