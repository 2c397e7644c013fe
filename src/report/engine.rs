//! Runs a catalog against a graph.

use super::catalog::{Catalog, QueryKind, QuerySpec, ResultShape};
use crate::error::ReportError;
use crate::graph::SupplierGraph;
use crate::ontology::sparql_prologue;
use crate::sparql::{ResultTable, bind_parameters, check_query_safety};
use std::time::Instant;

/// Result of one catalog entry.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryOutcome {
    pub name: String,
    pub description: String,
    pub shape: ResultShape,
    pub result: Result<ResultTable, ReportError>,
}

impl QueryOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Read-only report runner over one graph.
pub struct ReportEngine<'g> {
    graph: &'g SupplierGraph,
    prologue: String,
}

impl<'g> ReportEngine<'g> {
    pub fn new(graph: &'g SupplierGraph) -> Self {
        Self {
            graph,
            prologue: sparql_prologue(),
        }
    }

    /// Run every query in catalog order. A failing query is recorded in its
    /// outcome and the remaining queries still run.
    pub fn run(&self, catalog: &Catalog) -> Vec<QueryOutcome> {
        let _span = tracing::info_span!("run_reports", queries = catalog.len()).entered();

        let outcomes: Vec<QueryOutcome> = catalog
            .iter()
            .map(|spec| QueryOutcome {
                name: spec.name.clone(),
                description: spec.description.clone(),
                shape: spec.shape,
                result: self.run_query(spec),
            })
            .collect();

        let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
        tracing::info!(
            queries = outcomes.len(),
            failed,
            "reports finished"
        );
        outcomes
    }

    /// Bind, evaluate and check one query.
    pub fn run_query(&self, spec: &QuerySpec) -> Result<ResultTable, ReportError> {
        let start = Instant::now();
        let result = self.evaluate(spec);

        match &result {
            Ok(table) => tracing::debug!(
                query = %spec.name,
                rows = table.len(),
                duration_ms = start.elapsed().as_millis() as u64,
                "query executed"
            ),
            Err(error) => tracing::warn!(
                query = %spec.name,
                error = %error,
                "query failed"
            ),
        }
        result
    }

    fn evaluate(&self, spec: &QuerySpec) -> Result<ResultTable, ReportError> {
        let body = bind_parameters(&spec.sparql, &spec.parameters)?;
        let query = format!("{}{}", self.prologue, body);
        check_query_safety(&query)?;

        let table = self.graph.query(&spec.name, &query)?;

        if spec.shape == ResultShape::SingleRow && table.len() != 1 {
            return Err(ReportError::Evaluation(format!(
                "'{}' should produce one row, produced {}",
                spec.name,
                table.len()
            )));
        }

        if let QueryKind::Ratio { denominator, .. } = &spec.kind {
            check_denominator(spec, &table, denominator)?;
        }

        Ok(table)
    }
}

/// A ratio whose denominator matched nothing is a distinct failure, never a
/// silent zero or an unbound cell.
fn check_denominator(
    spec: &QuerySpec,
    table: &ResultTable,
    denominator: &str,
) -> Result<(), ReportError> {
    for row in 0..table.len() {
        let zero = match table.get(row, denominator) {
            Some(value) => value.as_decimal() == Some(0.0),
            None => true,
        };
        if zero {
            return Err(ReportError::DivisionByZero {
                query: spec.name.clone(),
                denominator: denominator.to_string(),
            });
        }
    }
    Ok(())
}

/// Convenience wrapper for [`ReportEngine::run`].
pub fn run_reports(graph: &SupplierGraph, catalog: &Catalog) -> Vec<QueryOutcome> {
    ReportEngine::new(graph).run(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphBuilder;
    use crate::model::SupplierRecord;
    use crate::report::DEFAULT_WOMEN_THRESHOLD;

    fn empty_graph() -> SupplierGraph {
        GraphBuilder::default().build(&[]).unwrap().0
    }

    #[test]
    fn failures_do_not_stop_the_catalog() {
        let graph = empty_graph();
        let mut catalog = Catalog::empty();
        catalog.insert(QuerySpec::new("broken", "unparsable", "SELECT WHERE {"));
        catalog.insert(QuerySpec::new(
            "entities",
            "all entities",
            "SELECT ?c WHERE { ?c a gr:BusinessEntity }",
        ));

        let outcomes = run_reports(&graph, &catalog);
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(outcomes[0].result, Err(ReportError::Evaluation(_))));
        assert!(outcomes[1].result.as_ref().unwrap().is_empty());
    }

    #[test]
    fn ratio_over_nothing_is_division_by_zero() {
        let graph = empty_graph();
        let catalog = Catalog::default_catalog(DEFAULT_WOMEN_THRESHOLD);
        let spec = catalog.get("wet_process_certification_ratio").unwrap();
        let err = ReportEngine::new(&graph).run_query(spec).unwrap_err();
        assert!(err.is_division_by_zero());
    }

    #[test]
    fn update_queries_never_reach_the_store() {
        let rows = vec![SupplierRecord::new("Acme")];
        let (graph, stats) = GraphBuilder::default().build(&rows).unwrap();
        let spec = QuerySpec::new("wipe", "drop everything", "DELETE WHERE { ?s ?p ?o }");

        let err = ReportEngine::new(&graph).run_query(&spec).unwrap_err();
        assert_eq!(err, ReportError::UnsafeQuery("DELETE".into()));
        assert_eq!(graph.len().unwrap(), stats.triples);
    }

    #[test]
    fn update_words_as_variable_names_still_run() {
        let rows = vec![SupplierRecord::new("Acme").with_employees(10, 49)];
        let (graph, _) = GraphBuilder::default().build(&rows).unwrap();
        let spec = QuerySpec::new(
            "headcount",
            "employee range",
            "SELECT ?load ?move WHERE { ?c ben:minEmployees ?load ; ben:maxEmployees ?move }",
        );

        let table = ReportEngine::new(&graph).run_query(&spec).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.variables, vec!["load", "move"]);
    }
}
