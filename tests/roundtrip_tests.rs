//! Build, persist, reload, report: the persisted graph must answer the
//! catalog exactly like the in-memory one.

mod support;

use anyhow::Result;
use assert_matches::assert_matches;
use supplygraph::report::{Catalog, DEFAULT_WOMEN_THRESHOLD, OutputFormat};
use supplygraph::table::read_suppliers_from_reader;
use supplygraph::{
    BuildOptions, CertificateMode, ErrorCode, GraphBuilder, GraphLoadError, PipelineConfig, Task,
    load_turtle, run, run_reports, write_turtle,
};
use support::{sample_csv, write_file};
use tempfile::TempDir;

fn config(task: Task) -> PipelineConfig {
    PipelineConfig {
        task,
        certificate_mode: CertificateMode::Faithful,
        delimiter: ", ".to_string(),
        women_threshold: DEFAULT_WOMEN_THRESHOLD,
        format: OutputFormat::Text,
        catalog: None,
    }
}

#[test]
fn reloaded_graph_reports_like_the_original() -> Result<()> {
    let dir = TempDir::new()?;
    let rows = read_suppliers_from_reader(sample_csv().as_bytes())?;
    for mode in [CertificateMode::Faithful, CertificateMode::Unified] {
        let (graph, _) = GraphBuilder::new(BuildOptions {
            certificate_mode: mode,
        })
        .build(&rows)?;
        let path = dir.path().join(format!("nested/{mode}.ttl"));
        write_turtle(&graph, &path)?;
        let reloaded = load_turtle(&path)?;
        assert_eq!(reloaded.len()?, graph.len()?);

        let catalog = Catalog::default_catalog(50.0);
        let before = run_reports(&graph, &catalog);
        let after = run_reports(&reloaded, &catalog);
        assert_eq!(before.len(), after.len());
        for (b, a) in before.iter().zip(&after) {
            assert_eq!(b.name, a.name);
            match (&b.result, &a.result) {
                (Ok(left), Ok(right)) => {
                    assert_eq!(left.variables, right.variables);
                    assert_eq!(left.sorted_rows(), right.sorted_rows(), "{}", b.name);
                }
                (Err(left), Err(right)) => assert_eq!(left, right),
                (left, right) => panic!("{} differs: {left:?} vs {right:?}", b.name),
            }
        }
    }
    Ok(())
}

#[test]
fn turtle_output_is_deterministic() -> Result<()> {
    let rows = read_suppliers_from_reader(sample_csv().as_bytes())?;
    let first = GraphBuilder::default().build(&rows)?.0.to_turtle()?;
    let second = GraphBuilder::default().build(&rows)?.0.to_turtle()?;
    assert_eq!(first, second);
    assert!(first.contains("@prefix ben:"));
    Ok(())
}

#[test]
fn sample_table_end_to_end() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_file(dir.path(), "suppliers.csv", &sample_csv());
    let output = dir.path().join("suppliers.ttl");

    let mut config = config(Task::Run {
        input,
        output: Some(output.clone()),
    });
    config.women_threshold = 50.0;
    config.delimiter = " | ".to_string();

    let mut out = Vec::new();
    let summary = run(&config, &mut out)?;
    assert!(output.is_file());
    assert_eq!(summary.queries, 6);
    assert_eq!(summary.failed_queries, 0);
    let stats = summary.build.expect("build stats");
    assert_eq!(stats.entities, 3);
    assert_eq!(stats.certificates, 3);
    assert_eq!(stats.certificate_references, 4);
    assert_eq!(stats.unresolved_certificate_references, 2);

    let text = String::from_utf8(out)?;
    assert!(text.contains("Query: wet_process_certified\n"));
    assert!(text.contains("Filatura Rossi | FILCTEM\n"));
    assert!(text.contains("Filatura Rossi | 60\n"));
    assert!(text.contains("Textiles Norte | 70\n"));
    assert!(!text.contains("error:"));
    Ok(())
}

#[test]
fn json_report_lists_every_query() -> Result<()> {
    let dir = TempDir::new()?;
    let input = write_file(dir.path(), "suppliers.csv", &sample_csv());
    let mut config = config(Task::Run {
        input,
        output: None,
    });
    config.format = OutputFormat::Json;

    let mut out = Vec::new();
    run(&config, &mut out)?;
    let value: serde_json::Value = serde_json::from_slice(&out)?;
    let queries = value["queries"].as_array().expect("queries array");
    assert_eq!(queries.len(), 6);
    assert_eq!(queries[0]["name"], "wet_process_certified");
    assert_eq!(queries[0]["shape"], "single_row");
    assert!(value["generated_at"].is_string());
    Ok(())
}

#[test]
fn missing_graph_fails_before_any_report() -> Result<()> {
    let dir = TempDir::new()?;
    let config = config(Task::Report {
        graph: dir.path().join("absent.ttl"),
    });

    let mut out = Vec::new();
    let err = run(&config, &mut out).unwrap_err();
    assert_matches!(
        err.downcast_ref::<GraphLoadError>(),
        Some(GraphLoadError::NotFound(_))
    );
    assert_eq!(ErrorCode::from_anyhow(&err), ErrorCode::GraphLoadFailure);
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn malformed_graph_is_a_parse_error() -> Result<()> {
    let dir = TempDir::new()?;
    let graph = write_file(dir.path(), "broken.ttl", "@prefix ben: <http://x/> .\nben:a ben:b");
    let err = load_turtle(&graph).unwrap_err();
    assert_matches!(err, GraphLoadError::Parse(_));
    Ok(())
}
