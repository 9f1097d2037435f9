use serde::Serialize;
use url::Url;

/// One visited agenda page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    pub title: String,
    pub agenda_url: Url,
    pub date: String,
}

/// One talk within an event. Fields that could not be located on the page
/// are empty strings, except the attachment which stays `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contribution {
    pub title: String,
    pub speaker: String,
    pub institution: String,
    pub pdf_link: Option<String>,
}

/// Flattened event x contribution join, exactly one CSV data row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OutputRow {
    #[serde(rename = "Meeting Title")]
    pub meeting_title: String,
    #[serde(rename = "Agenda URL")]
    pub agenda_url: String,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Contribution Title")]
    pub contribution_title: String,
    #[serde(rename = "Speaker")]
    pub speaker: String,
    #[serde(rename = "Institution")]
    pub institution: String,
    #[serde(rename = "PDF Link")]
    pub pdf_link: Option<String>,
}

impl OutputRow {
    pub fn flatten(event: &EventRecord, contribution: &Contribution) -> Self {
        Self {
            meeting_title: event.title.clone(),
            agenda_url: event.agenda_url.to_string(),
            date: event.date.clone(),
            contribution_title: contribution.title.clone(),
            speaker: contribution.speaker.clone(),
            institution: contribution.institution.clone(),
            pdf_link: contribution.pdf_link.clone(),
        }
    }
}
