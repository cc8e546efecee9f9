// End-to-end run over a small fixture tree: one triple reference, two
// assemblers, one of them without a mapping file.
use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use asmstats::report;
use asmstats::run::{run_all, RunConfig};

const PAF_LINE: &str =
    "contig_1\t900\t0\t900\t+\tref_A\t3000\t0\t900\t880\t900\t60\tcg:Z:880=20X";

fn write_fixtures(root: &Path) -> RunConfig {
    let assemblies = root.join("assemblies");
    let mappings = root.join("mappings");
    fs::create_dir(&assemblies).unwrap();
    fs::create_dir(&mappings).unwrap();

    // Triple reference: true length 1000.
    let reference = root.join("references_triple.fasta");
    fs::write(&reference, format!(">ref_A circular\n{}\n", "A".repeat(3000))).unwrap();

    // One mapped contig, one unmapped.
    fs::write(
        assemblies.join("mock_sample_skesa.fasta"),
        format!(">contig_1\n{}\n>contig_2\n{}\n", "A".repeat(900), "C".repeat(100)),
    )
    .unwrap();
    fs::write(mappings.join("mock_sample_skesa.paf"), format!("{PAF_LINE}\n")).unwrap();

    // This assembler has no mapping file and must be skipped, not fatal.
    fs::write(
        assemblies.join("mock_sample_broken.fasta"),
        format!(">contig_1\n{}\n", "G".repeat(500)),
    )
    .unwrap();

    RunConfig {
        assemblies_dir: assemblies,
        mappings_dir: mappings,
        reference,
        window: 1000,
    }
}

#[test]
fn full_run_over_fixture_tree() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());

    let results = run_all(&config).unwrap();

    // The assembler without a mapping file is dropped.
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.assembler(), "skesa");

    assert_eq!(result.summary.contigs, 2);
    assert_eq!(result.summary.total_bases, 1000);
    assert_eq!(result.summary.n50, 900);
    assert!((result.summary.mapped_contig_fraction - 0.5).abs() < 1e-9);
    assert!((result.summary.mapped_base_fraction - 0.9).abs() < 1e-9);

    assert_eq!(result.references.len(), 1);
    let metrics = &result.references[0];
    assert_eq!(metrics.reference, "ref_A");
    assert_eq!(metrics.reference_length, 1000);
    assert!((metrics.contiguity - 0.9).abs() < 1e-9);
    assert!((metrics.breadth_of_coverage - 0.9).abs() < 1e-9);
    assert!((metrics.identity - 880.0 / 900.0).abs() < 1e-9);
    // 900 expanded operations never fill a 1000-base window.
    assert_eq!(metrics.lowest_identity, 0.0);
    assert_eq!(metrics.c90, 1);
    assert_eq!(metrics.c95, 1);
    assert_eq!(metrics.aligned_contigs, 1);
    assert_eq!(metrics.n50, 900);
    assert_eq!(metrics.aligned_bases, 900);
}

#[test]
fn tables_and_report_from_a_full_run() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_fixtures(dir.path());
    let results = run_all(&config).unwrap();

    let table = report::reference_table(&results);
    assert!(table.contains("skesa,ref_A,1000,0.90,0.977778,0.000000,0.90,1,1,1,900,900"));

    let phred = report::phred_table(&results);
    assert!(phred.contains("skesa,ref_A,contig_1,900,"));
    assert!(!phred.contains("contig_2"));

    report::write_coverage_csvs(&results, dir.path()).unwrap();
    let csv = fs::read_to_string(
        dir.path().join("skesa_breadth_of_coverage_contigs.csv"),
    )
    .unwrap();
    assert_eq!(
        csv,
        "Reference,Breadth of Coverage,Contigs\nref_A,0.900000,1\n"
    );

    let html_path = dir.path().join("report.html");
    report::write_html_report(&html_path, &results).unwrap();
    let html = fs::read_to_string(&html_path).unwrap();
    assert!(html.contains("skesa"));
    assert!(html.contains("ref_A"));
}
