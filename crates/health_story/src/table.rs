use crate::error::{Result, StoryError};
use crate::indicators::IndicatorTable;

use csv::WriterBuilder;
use log::info;
use std::{fs::File, io::BufWriter, path::Path};

/// Writes the header and the given rows (already ranked) with their
/// original cell text
pub fn write_top_table(table: &IndicatorTable, rows: &[usize], output_path: &Path) -> Result<()> {
    let file = File::create(output_path).map_err(|e| StoryError::WriteFile {
        path: output_path.to_path_buf(),
        source: e,
    })?;

    let mut wtr = WriterBuilder::new()
        .flexible(true)
        .from_writer(BufWriter::new(file));

    wtr.write_record(table.headers())?;
    for &row in rows {
        if let Some(record) = table.records().get(row) {
            wtr.write_record(record)?;
        }
    }

    wtr.flush()?;
    info!("Top {} table written to {}", rows.len(), output_path.display());
    Ok(())
}
