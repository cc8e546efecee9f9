//! Reporting: CSV tables and a self-contained HTML report with embedded SVG
//! scatter plots comparing assemblers.
//!
//! Everything here is presentation. The tables are derived from the
//! computed [`AssemblerResults`]; unmapped contigs are excluded from the
//! per-reference views by convention.

use std::fmt::Write as FmtWrite;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use crate::metrics::PHRED_CAP;
use crate::run::AssemblerResults;

/// Qualitative palette for assembler series.
const COLOURS: [&str; 12] = [
    "#a6cee3", "#1f78b4", "#b2df8a", "#33a02c", "#fb9a99", "#e31a1c",
    "#fdbf6f", "#ff7f00", "#cab2d6", "#6a3d9a", "#ffff99", "#b15928",
];

fn colour(i: usize) -> &'static str {
    COLOURS[i % COLOURS.len()]
}

/// Per-reference metrics table, one row per (assembler, reference), CSV.
pub fn reference_table(results: &[AssemblerResults]) -> String {
    let mut out = String::new();
    out.push_str(
        "Assembler,Reference,Reference Length,Contiguity,Identity,Lowest Identity,\
         Breadth of Coverage,C90,C95,Aligned Contigs,N50,Aligned Basepairs\n",
    );
    for result in results {
        for m in &result.references {
            let _ = writeln!(
                out,
                "{},{},{},{:.2},{:.6},{:.6},{:.2},{},{},{},{},{}",
                result.assembler(),
                m.reference,
                m.reference_length,
                m.contiguity,
                m.identity,
                m.lowest_identity,
                m.breadth_of_coverage,
                m.c90,
                m.c95,
                m.aligned_contigs,
                m.n50,
                m.aligned_bases,
            );
        }
    }
    out
}

/// Per-contig Phred score table, CSV. Only mapped contigs appear.
pub fn phred_table(results: &[AssemblerResults]) -> String {
    let mut out = String::new();
    out.push_str("Assembler,Reference,Contig,Contig Length,Phred Score\n");
    for result in results {
        for m in &result.references {
            for contig in &m.contigs {
                let _ = writeln!(
                    out,
                    "{},{},{},{},{:.2}",
                    result.assembler(),
                    m.reference,
                    contig.contig,
                    contig.length,
                    contig.phred,
                );
            }
        }
    }
    out
}

/// Whole-assembly summary table, one row per assembler, CSV.
pub fn summary_table(results: &[AssemblerResults]) -> String {
    let mut out = String::new();
    out.push_str(
        "Assembler,Contigs,Total Basepairs,Max Contig,N50,Mapped Contigs (%),Mapped Basepairs (%)\n",
    );
    for result in results {
        let s = &result.summary;
        let _ = writeln!(
            out,
            "{},{},{},{},{},{:.2},{:.2}",
            result.assembler(),
            s.contigs,
            s.total_bases,
            s.max_contig,
            s.n50,
            s.mapped_contig_fraction * 100.0,
            s.mapped_base_fraction * 100.0,
        );
    }
    out
}

/// One breadth-of-coverage CSV per assembler, written into `dir`.
pub fn write_coverage_csvs(results: &[AssemblerResults], dir: &Path) -> Result<()> {
    for result in results {
        let mut out = String::new();
        out.push_str("Reference,Breadth of Coverage,Contigs\n");
        for m in &result.references {
            let _ = writeln!(
                out,
                "{},{:.6},{}",
                m.reference, m.breadth_of_coverage, m.aligned_contigs
            );
        }
        let path = dir.join(format!(
            "{}_breadth_of_coverage_contigs.csv",
            result.assembler()
        ));
        fs::write(&path, out)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    Ok(())
}

fn csv_as_html_table(csv: &str, html: &mut String) -> Result<()> {
    writeln!(html, "<table class=\"table\">")?;
    for (i, line) in csv.lines().enumerate() {
        let tag = if i == 0 { "th" } else { "td" };
        write!(html, "<tr>")?;
        for cell in line.split(',') {
            write!(html, "<{tag}>{cell}</{tag}>")?;
        }
        writeln!(html, "</tr>")?;
    }
    writeln!(html, "</table>")?;
    Ok(())
}

/// Scatter of C90 per reference, one colored series per assembler.
fn c90_svg(results: &[AssemblerResults], html: &mut String) -> Result<()> {
    let references: Vec<&str> = match results.first() {
        Some(first) => first.references.iter().map(|m| m.reference.as_str()).collect(),
        None => return Ok(()),
    };

    let max_c90 = results
        .iter()
        .flat_map(|r| r.references.iter().map(|m| m.c90))
        .max()
        .unwrap_or(0)
        .max(1);

    let (left, top, plot_w, row_h) = (220.0, 30.0, 460.0, 28.0);
    let height = top + references.len() as f64 * row_h + 40.0;
    let width = left + plot_w + 20.0;

    writeln!(
        html,
        "<svg class=\"plot\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
    )?;
    for (row, reference) in references.iter().enumerate() {
        let y = top + row as f64 * row_h + row_h / 2.0;
        writeln!(
            html,
            "<line x1=\"{left}\" y1=\"{y}\" x2=\"{:.1}\" y2=\"{y}\" stroke=\"#DCDCDC\"/>",
            left + plot_w
        )?;
        writeln!(
            html,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"end\">{reference}</text>",
            left - 8.0,
            y + 4.0
        )?;
        for (i, result) in results.iter().enumerate() {
            if let Some(m) = result.references.get(row) {
                let x = left + m.c90 as f64 / max_c90 as f64 * plot_w;
                writeln!(
                    html,
                    "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"9\" fill=\"{}\" \
                     stroke=\"black\" stroke-width=\"1\" fill-opacity=\"0.7\"/>",
                    colour(i)
                )?;
            }
        }
    }
    // x axis with a handful of ticks
    let axis_y = top + references.len() as f64 * row_h + 8.0;
    for tick in 0..=4 {
        let value = max_c90 as f64 * tick as f64 / 4.0;
        let x = left + tick as f64 / 4.0 * plot_w;
        writeln!(
            html,
            "<text x=\"{x:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">{:.0}</text>",
            axis_y + 12.0,
            value
        )?;
    }
    writeln!(
        html,
        "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"12\" text-anchor=\"middle\">Contigs</text>",
        left + plot_w / 2.0,
        height - 4.0
    )?;
    writeln!(html, "</svg>")?;
    Ok(())
}

/// Phred score vs contig length, one panel per reference.
fn phred_svg(results: &[AssemblerResults], html: &mut String) -> Result<()> {
    let references: Vec<&str> = match results.first() {
        Some(first) => first.references.iter().map(|m| m.reference.as_str()).collect(),
        None => return Ok(()),
    };

    writeln!(html, "<div>")?;
    for (row, reference) in references.iter().enumerate() {
        let max_len = results
            .iter()
            .filter_map(|r| r.references.get(row))
            .flat_map(|m| m.contigs.iter().map(|c| c.length))
            .max()
            .unwrap_or(0)
            .max(1);

        let (left, top, plot_w, plot_h) = (40.0, 26.0, 280.0, 160.0);
        let width = left + plot_w + 12.0;
        let height = top + plot_h + 32.0;

        writeln!(
            html,
            "<svg class=\"plot\" width=\"{width}\" height=\"{height}\" viewBox=\"0 0 {width} {height}\">"
        )?;
        writeln!(
            html,
            "<text x=\"{:.1}\" y=\"16\" font-size=\"13\" text-anchor=\"middle\">{reference}</text>",
            left + plot_w / 2.0
        )?;
        writeln!(
            html,
            "<rect x=\"{left}\" y=\"{top}\" width=\"{plot_w}\" height=\"{plot_h}\" \
             fill=\"none\" stroke=\"#DCDCDC\"/>"
        )?;
        for (i, result) in results.iter().enumerate() {
            let Some(m) = result.references.get(row) else {
                continue;
            };
            for contig in &m.contigs {
                let x = left + contig.length as f64 / max_len as f64 * plot_w;
                let y = top + plot_h - (contig.phred / PHRED_CAP).min(1.0) * plot_h;
                writeln!(
                    html,
                    "<circle cx=\"{x:.1}\" cy=\"{y:.1}\" r=\"5\" fill=\"{}\" \
                     stroke=\"black\" stroke-width=\"1\" fill-opacity=\"0.7\"/>",
                    colour(i)
                )?;
            }
        }
        writeln!(
            html,
            "<text x=\"{:.1}\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\">Contig length</text>",
            left + plot_w / 2.0,
            height - 6.0
        )?;
        writeln!(
            html,
            "<text x=\"12\" y=\"{:.1}\" font-size=\"11\" text-anchor=\"middle\" \
             transform=\"rotate(-90 12 {:.1})\">Phred</text>",
            top + plot_h / 2.0,
            top + plot_h / 2.0
        )?;
        writeln!(html, "</svg>")?;
    }
    writeln!(html, "</div>")?;
    Ok(())
}

fn legend(results: &[AssemblerResults], html: &mut String) -> Result<()> {
    writeln!(html, "<div class=\"legend\">")?;
    for (i, result) in results.iter().enumerate() {
        writeln!(
            html,
            "<span><svg width=\"14\" height=\"14\"><circle cx=\"7\" cy=\"7\" r=\"6\" \
             fill=\"{}\" stroke=\"black\"/></svg> {}</span>",
            colour(i),
            result.assembler()
        )?;
    }
    writeln!(html, "</div>")?;
    Ok(())
}

/// Write the full HTML report: summary and metrics tables plus the C90 and
/// Phred scatter plots.
pub fn write_html_report(path: &Path, results: &[AssemblerResults]) -> Result<()> {
    let mut html = String::with_capacity(64 * 1024);

    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html lang=\"en\">")?;
    writeln!(html, "<head>")?;
    writeln!(html, "<meta charset=\"utf-8\"/>")?;
    writeln!(html, "<title>Assembly mapping statistics</title>")?;
    writeln!(html, "<style>")?;
    writeln!(
        html,
        "body{{font-family:Arial,Helvetica,sans-serif;margin:20px;color:#222;background:#fff;}}"
    )?;
    writeln!(html, "h1{{margin:0 0 8px 0;font-size:24px;}}")?;
    writeln!(html, "h2{{margin:24px 0 8px 0;font-size:20px;}}")?;
    writeln!(
        html,
        ".table{{border-collapse:collapse;width:100%;max-width:1100px;font-size:12px;}}"
    )?;
    writeln!(
        html,
        ".table th,.table td{{border:1px solid #ddd;padding:4px 6px;text-align:right;}}"
    )?;
    writeln!(
        html,
        ".table th:first-child,.table td:first-child{{text-align:left;}}"
    )?;
    writeln!(html, ".legend span{{margin-right:16px;font-size:13px;}}")?;
    writeln!(html, "svg{{background:#fafafa;margin:4px;}}")?;
    writeln!(html, "</style>")?;
    writeln!(html, "</head>")?;
    writeln!(html, "<body>")?;
    writeln!(html, "<h1>Assembly mapping statistics</h1>")?;

    writeln!(html, "<h2>Assemblies</h2>")?;
    csv_as_html_table(&summary_table(results), &mut html)?;

    writeln!(html, "<h2>Per-reference metrics</h2>")?;
    csv_as_html_table(&reference_table(results), &mut html)?;

    writeln!(html, "<h2>C90 per reference</h2>")?;
    legend(results, &mut html)?;
    c90_svg(results, &mut html)?;

    writeln!(html, "<h2>Phred score per contig</h2>")?;
    legend(results, &mut html)?;
    phred_svg(results, &mut html)?;

    writeln!(html, "</body>")?;
    writeln!(html, "</html>")?;

    fs::write(path, html).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::{Assembly, Contig};
    use crate::metrics::{ContigQuality, ReferenceMetrics};

    fn sample_results() -> Vec<AssemblerResults> {
        let assembly = Assembly {
            assembler: "spades".to_string(),
            contigs: vec![
                Contig {
                    name: "contig_1".to_string(),
                    length: 900,
                    reference: Some("ref_A".to_string()),
                },
                Contig {
                    name: "contig_2".to_string(),
                    length: 100,
                    reference: None,
                },
            ],
        };
        let summary = assembly.summary();
        vec![AssemblerResults {
            assembly,
            summary,
            references: vec![ReferenceMetrics {
                reference: "ref_A".to_string(),
                reference_length: 1000,
                contiguity: 0.9,
                identity: 0.977778,
                lowest_identity: 0.0,
                breadth_of_coverage: 0.9,
                c90: 1,
                c95: 1,
                aligned_contigs: 1,
                n50: 900,
                aligned_bases: 900,
                contigs: vec![ContigQuality {
                    contig: "contig_1".to_string(),
                    length: 900,
                    identity: 0.977778,
                    phred: 16.53,
                }],
            }],
        }]
    }

    #[test]
    fn reference_table_rows() {
        let table = reference_table(&sample_results());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Assembler,Reference,Reference Length"));
        assert!(lines[1].starts_with("spades,ref_A,1000,0.90,0.977778"));
    }

    #[test]
    fn phred_table_lists_mapped_contigs_only() {
        let table = phred_table(&sample_results());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "spades,ref_A,contig_1,900,16.53");
        assert!(!table.contains("contig_2"));
    }

    #[test]
    fn html_report_contains_all_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.html");
        write_html_report(&path, &sample_results()).unwrap();

        let html = std::fs::read_to_string(&path).unwrap();
        assert!(html.contains("C90 per reference"));
        assert!(html.contains("Phred score per contig"));
        assert!(html.contains("<svg"));
        assert!(html.contains("spades"));
    }
}
