use std::path::Path;

use tracing::info;

use crate::error::Result;
use crate::record::OutputRow;

const HEADER: &[&str] = &[
    "Meeting Title",
    "Agenda URL",
    "Date",
    "Contribution Title",
    "Speaker",
    "Institution",
    "PDF Link",
];

/// Serialize the accumulated rows to a UTF-8 CSV file, header included.
/// Rows that never materialized (failed chain) are simply absent; the file
/// is written either way so partial results stay inspectable.
pub fn write_rows(path: &Path, rows: &[OutputRow]) -> Result<()> {
    // Header written by hand so even an empty crawl leaves a valid file.
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_path(path)?;
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    info!(path = %path.display(), rows = rows.len(), "wrote CSV");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(title: &str, speaker: &str, pdf: Option<&str>) -> OutputRow {
        OutputRow {
            meeting_title: "CYGNO Collaboration Meeting 2024".into(),
            agenda_url: "https://agenda.infn.it/event/44949/".into(),
            date: "2024-11-27 09:00".into(),
            contribution_title: title.into(),
            speaker: speaker.into(),
            institution: "Istituto Nazionale di Fisica Nucleare".into(),
            pdf_link: pdf.map(String::from),
        }
    }

    #[test]
    fn writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_rows(
            &path,
            &[row("Detector simulation", "Pietro Meloni", Some("https://x/p.pdf"))],
        )
        .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Meeting Title,Agenda URL,Date,Contribution Title,Speaker,Institution,PDF Link"
        );
        let data = lines.next().unwrap();
        assert!(data.contains("Detector simulation"));
        assert!(data.contains("Pietro Meloni"));
        assert!(data.contains("https://x/p.pdf"));
    }

    #[test]
    fn quotes_fields_containing_commas_and_keeps_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_rows(&path, &[row("Status, plans, and open issues", "J. Müller", None)]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains(r#""Status, plans, and open issues""#));
        assert!(contents.contains("J. Müller"));
        // Missing attachment serializes as an empty trailing field.
        assert!(contents.lines().nth(1).unwrap().ends_with(','));
    }

    #[test]
    fn empty_result_still_produces_a_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");

        write_rows(&path, &[]).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("Meeting Title,"));
    }
}
