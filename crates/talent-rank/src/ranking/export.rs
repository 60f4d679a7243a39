use std::fs;
use std::io;
use std::path::Path;

use super::domain::Applicant;

/// File name offered for the ranking download.
pub const EXPORT_FILE_NAME: &str = "applicant_ranking.csv";

pub const EXPORT_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

const HEADER: [&str; 7] = ["Rank", "Name", "Email", "Phone", "Score", "Status", "Skills"];

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to encode CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to flush CSV buffer: {0}")]
    Flush(String),
    #[error("CSV output is not valid UTF-8")]
    Encoding(#[from] std::string::FromUtf8Error),
    #[error("failed to write export file: {0}")]
    Io(#[from] io::Error),
}

/// Render applicants in the given order.
///
/// Name and skills are always quoted with embedded quotes doubled. Email, phone, and
/// status come from controlled vocabularies and are written verbatim.
pub fn to_csv(applicants: &[Applicant]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Never)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer.write_record(HEADER)?;
    for applicant in applicants {
        writer.write_record([
            applicant.rank.to_string(),
            quoted(&applicant.name),
            applicant.email.clone(),
            applicant.phone.clone(),
            applicant.score.to_string(),
            applicant.status.label().to_string(),
            quoted(&applicant.skills.join("; ")),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|err| ExportError::Flush(err.error().to_string()))?;
    let mut text = String::from_utf8(bytes)?;
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Write the export to `path`, using the fixed file name when `path` is a directory.
pub fn write_csv<P: AsRef<Path>>(path: P, applicants: &[Applicant]) -> Result<(), ExportError> {
    let csv = to_csv(applicants)?;
    let path = path.as_ref();
    let target = if path.is_dir() {
        path.join(EXPORT_FILE_NAME)
    } else {
        path.to_path_buf()
    };
    fs::write(target, csv)?;
    Ok(())
}

fn quoted(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}
