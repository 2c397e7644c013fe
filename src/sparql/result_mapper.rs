// =============================================================================
// SPARQL Result Mapper
// =============================================================================
// Collect SELECT solutions into an ordered table of typed values

use super::typed_binding::{TypedBinding, TypedValue};
use crate::error::ReportError;
use oxigraph::sparql::{QueryResults, SparqlEvaluator};
use oxigraph::store::Store;

/// Rows of a SELECT result, in solution order.
///
/// `variables` keeps the projection order of the query; each row has one
/// cell per variable, `None` when the variable is unbound in that solution.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ResultTable {
    pub variables: Vec<String>,
    pub rows: Vec<Vec<Option<TypedValue>>>,
}

impl ResultTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column position of a variable
    pub fn column(&self, var: &str) -> Option<usize> {
        self.variables.iter().position(|v| v == var)
    }

    /// Cell at `row` for `var`, `None` when unbound or out of range
    pub fn get(&self, row: usize, var: &str) -> Option<&TypedValue> {
        let column = self.column(var)?;
        self.rows.get(row)?.get(column)?.as_ref()
    }

    /// The single row of a one-row result
    pub fn single(&self) -> Option<&[Option<TypedValue>]> {
        match self.rows.as_slice() {
            [row] => Some(row.as_slice()),
            _ => None,
        }
    }

    /// Rows rendered to strings and sorted, for order-insensitive comparison
    pub fn sorted_rows(&self) -> Vec<Vec<String>> {
        let mut rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|cell| cell.as_ref().map(ToString::to_string).unwrap_or_default())
                    .collect()
            })
            .collect();
        rows.sort();
        rows
    }
}

/// Evaluate a SELECT query against `store` and collect every solution.
pub fn execute_select(store: &Store, name: &str, sparql: &str) -> Result<ResultTable, ReportError> {
    let results = SparqlEvaluator::new()
        .parse_query(sparql)
        .map_err(|e| ReportError::Evaluation(e.to_string()))?
        .on_store(store)
        .execute()
        .map_err(|e| ReportError::Evaluation(e.to_string()))?;

    match results {
        QueryResults::Solutions(solutions) => {
            let variables: Vec<String> = solutions
                .variables()
                .iter()
                .map(|v| v.as_str().to_string())
                .collect();

            let mut rows = Vec::new();
            for solution in solutions {
                let solution = solution.map_err(|e| ReportError::Evaluation(e.to_string()))?;
                let binding = TypedBinding::new(&solution);
                let row = variables
                    .iter()
                    .map(|var| binding.get_typed_value_opt(var))
                    .collect::<Result<Vec<_>, _>>()?;
                rows.push(row);
            }

            Ok(ResultTable { variables, rows })
        }
        _ => Err(ReportError::NotASelect(name.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ResultTable {
        ResultTable {
            variables: vec!["country".into(), "avg".into()],
            rows: vec![
                vec![Some(TypedValue::Literal("IT".into())), Some(TypedValue::Decimal(60.0))],
                vec![Some(TypedValue::Literal("ES".into())), None],
            ],
        }
    }

    #[test]
    fn lookup_by_variable() {
        let table = table();
        assert_eq!(table.get(0, "avg"), Some(&TypedValue::Decimal(60.0)));
        assert_eq!(table.get(1, "avg"), None);
        assert_eq!(table.get(5, "avg"), None);
        assert!(table.single().is_none());
    }

    #[test]
    fn sorted_rows_ignore_solution_order() {
        let table = table();
        let mut reversed = table.clone();
        reversed.rows.reverse();
        assert_eq!(table.sorted_rows(), reversed.sorted_rows());
    }

    #[test]
    fn select_over_store() {
        let store = Store::new().unwrap();
        let result = execute_select(&store, "empty", "SELECT ?s WHERE { ?s ?p ?o }").unwrap();
        assert_eq!(result.variables, vec!["s".to_string()]);
        assert!(result.is_empty());
    }

    #[test]
    fn syntax_errors_are_evaluation_failures() {
        let store = Store::new().unwrap();
        let err = execute_select(&store, "broken", "SELECT WHERE {").unwrap_err();
        assert!(matches!(err, ReportError::Evaluation(_)));
    }

    #[test]
    fn ask_is_not_a_select() {
        let store = Store::new().unwrap();
        let err = execute_select(&store, "ask", "ASK { ?s ?p ?o }").unwrap_err();
        assert_eq!(err, ReportError::NotASelect("ask".into()));
    }
}
