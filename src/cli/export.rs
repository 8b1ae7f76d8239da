use std::io::Write;
use std::path::PathBuf;

use crate::cli::load_month;
use pocketbook::error::Result;
use pocketbook::reports::{build_summary_rows, SummaryRow};
use pocketbook::settings::{load_settings, shellexpand_path};

pub fn run(month: Option<String>, file: Option<String>, output: Option<String>) -> Result<()> {
    let settings = load_settings();
    let loaded = load_month(&settings, month.as_deref(), file.as_deref())?;
    let rows = build_summary_rows(&loaded.result, &loaded.outcome.transactions, &loaded.table);

    let out_path = match output {
        Some(p) => PathBuf::from(shellexpand_path(&p)),
        None => settings
            .exports_dir()
            .join(format!("{}_summary.csv", loaded.result.period)),
    };
    if let Some(dir) = out_path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let file = std::fs::File::create(&out_path)?;
    write_summary_csv(file, &rows)?;

    println!("Exported {} rows to {}", rows.len(), out_path.display());
    Ok(())
}

/// Header and spacer rows become empty cells, never zeros.
pub fn write_summary_csv<W: Write>(writer: W, rows: &[SummaryRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["Category", "Amount", "Percentage"])?;
    for row in rows {
        let amount = row.amount.map(|a| format!("{:.2}", unsigned_zero(a))).unwrap_or_default();
        let fraction = row
            .fraction
            .map(|f| format!("{:.2}%", unsigned_zero(f * 100.0)))
            .unwrap_or_default();
        wtr.write_record([row.label.as_str(), amount.as_str(), fraction.as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

/// `-0.0` formats as "-0.00"; a sheet cell should read 0.00.
fn unsigned_zero(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else {
        v
    }
}
