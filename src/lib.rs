pub mod browser;
pub mod config;
pub mod error;
pub mod export;
pub mod fetch;
pub mod page;
pub mod parse;
pub mod record;
pub mod traverse;

pub use browser::Browser;
pub use config::BrowserConfig;
pub use error::{Error, Result};
pub use fetch::{BrowserFetcher, PageSource, RenderedPage};
pub use parse::{EventParser, ParsedEvent};
pub use record::{Contribution, EventRecord, OutputRow};
pub use traverse::{ChainStatus, TraverseOutcome, Traverser};
