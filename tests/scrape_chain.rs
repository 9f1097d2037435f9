//! End-to-end: seed URL -> traverse -> CSV on disk, without a live browser.

use std::collections::HashMap;

use async_trait::async_trait;
use url::Url;

use indico2csv::{export, Error, PageSource, RenderedPage, Result, Traverser};

struct FixtureSource {
    pages: HashMap<String, String>,
}

#[async_trait]
impl PageSource for FixtureSource {
    async fn fetch(&mut self, url: &Url) -> Result<RenderedPage> {
        let html = self.pages.get(url.as_str()).ok_or_else(|| Error::Fetch {
            url: url.to_string(),
            reason: "not in fixture set".into(),
        })?;
        Ok(RenderedPage {
            url: url.clone(),
            html: html.clone(),
        })
    }
}

const CYGNO_PAGE: &str = r#"<html><body>
  <h1 itemprop="name">CYGNO Collaboration Meeting 2024</h1>
  <time itemprop="startDate">Wednesday Nov 27, 2024, 9:00 AM</time>
  <ul>
    <li class="timetable-item timetable-contrib">
      <span class="timetable-title">Detector simulation and digitization¶</span>
      <div class="speaker-list">
        <span>Speaker:</span>
        <span>Pietro Meloni <span class="affiliation">(Istituto Nazionale di Fisica Nucleare)</span></span>
      </div>
      <div class="js-attachment-container">
        <a href="/event/44949/contributions/7/attachments/digitization.pdf">slides</a>
      </div>
    </li>
  </ul>
</body></html>"#;

#[tokio::test]
async fn single_event_chain_produces_one_csv_row() {
    let seed = Url::parse("https://agenda.infn.it/event/44949/").unwrap();
    let source = FixtureSource {
        pages: HashMap::from([(seed.to_string(), CYGNO_PAGE.to_string())]),
    };

    let outcome = Traverser::new(source).run(&seed).await;
    assert!(!outcome.is_failed());
    assert_eq!(outcome.events_visited, 1);
    assert_eq!(outcome.rows.len(), 1);

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("events_contributions.csv");
    export::write_rows(&path, &outcome.rows).unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        "Meeting Title,Agenda URL,Date,Contribution Title,Speaker,Institution,PDF Link"
    );
    assert_eq!(
        lines[1],
        "CYGNO Collaboration Meeting 2024,\
         https://agenda.infn.it/event/44949/,\
         2024-11-27 09:00,\
         Detector simulation and digitization,\
         Pietro Meloni,\
         Istituto Nazionale di Fisica Nucleare,\
         https://agenda.infn.it/event/44949/contributions/7/attachments/digitization.pdf"
    );
}

#[tokio::test]
async fn missing_seed_page_yields_failed_status_and_empty_rows() {
    let seed = Url::parse("https://agenda.infn.it/event/1/").unwrap();
    let source = FixtureSource {
        pages: HashMap::new(),
    };

    let outcome = Traverser::new(source).run(&seed).await;
    assert!(outcome.is_failed());
    assert!(outcome.rows.is_empty());

    // A failed chain still leaves a valid (header-only) CSV behind.
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");
    export::write_rows(&path, &outcome.rows).unwrap();
    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(contents.starts_with("Meeting Title,"));
}
