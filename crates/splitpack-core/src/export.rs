use crate::error::Error;
use crate::model::Group;
use csv::Writer;
use std::io::Write;
use std::path::Path;
use tracing::info;

const HEADERS: [&str; 5] = ["group", "kind", "size", "path", "needs_review"];

/// Write one row per placed item; groups are numbered from 1.
/// Returns the number of rows written.
pub fn write_plan_csv<W: Write>(groups: &[Group], sink: W) -> Result<usize, Error> {
    let mut writer = Writer::from_writer(sink);
    writer.write_record(HEADERS)?;

    let mut rows = 0;
    for (index, group) in groups.iter().enumerate() {
        for item in group.items() {
            writer.write_record(&[
                (index + 1).to_string(),
                item.kind.as_str().to_string(),
                item.size.to_string(),
                item.path.to_string_lossy().into_owned(),
                item.needs_review().to_string(),
            ])?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

pub fn write_plan_csv_file(groups: &[Group], file_path: &Path) -> Result<usize, Error> {
    let file = std::fs::File::create(file_path)?;
    let rows = write_plan_csv(groups, file)?;
    info!("Wrote {} plan rows to {}", rows, file_path.display());
    Ok(rows)
}
