#![allow(dead_code)]

use oxigraph::model::NamedNode;
use std::fs;
use std::path::{Path, PathBuf};
use supplygraph::ontology::{ProcessType, ben};
use supplygraph::{BuildOptions, GraphBuilder, SupplierGraph, SupplierRecord};

/// Header line of the supplier table, in source order.
pub const CSV_HEADER: &str = "COMPANY NAME,COUNTRY,COUNTY,ZIP,CITY,STREET,MANUFACTURING,OTHER_PROCESSING,PRINTING,SPINNING,WEAVING,WET_PROCESS,APPAREL,SHOES,ACCESSORIES,hasCertifications,CERTIFICATIONS,MIN_EMPLOYEES,MAX_EMPLOYEES,% MEN,% WOMEN,% MIGRANT WORKERS,WORKERS' REPRESENTATIVES,TRADE UNION,NAME OF THE TRADE UNION,COLLECTIVE BARGAINING AGREEMENT,% WORKFORCE COVERED BY THE CBA";

/// Three facilities covering most column kinds.
pub fn sample_csv() -> String {
    [
        CSV_HEADER,
        r#"Filatura Rossi,IT,Treviso,31100,Ponzano,Via Roma 1,x,,,x,,x,x,,,yes,"GOTS; OEKO TEX",50,249,40,60,5,yes,yes,FILCTEM,yes,100"#,
        r#"Tintoria Bianchi,IT,Vicenza,36100,Schio,Via Verdi 2,,,,,,x,x,,,no,ISO 14001,10,49,55,45,0,no,no,,,"#,
        r#"Textiles Norte,ES,Porto,4000,Porto,Rua A 3,x,,x,,,,,x,x,yes,"OEKO  TEX, BCI",250,499,30,70,12.5,yes,,,yes,"#,
    ]
    .join("\n")
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

pub fn build(rows: &[SupplierRecord]) -> SupplierGraph {
    build_with(rows, BuildOptions::default())
}

pub fn build_with(rows: &[SupplierRecord], options: BuildOptions) -> SupplierGraph {
    GraphBuilder::new(options).build(rows).expect("build graph").0
}

pub fn iri(local: &str) -> NamedNode {
    ben(local).expect("valid iri")
}

/// `total` wet-process entities, the first `certified` of which hold a
/// certificate.
pub fn wet_process_rows(total: usize, certified: usize) -> Vec<SupplierRecord> {
    (0..total)
        .map(|i| {
            let row = SupplierRecord::new(format!("Wet {i}")).with_process(ProcessType::WetProcess);
            if i < certified {
                row.with_certifications("GOTS")
            } else {
                row
            }
        })
        .collect()
}
