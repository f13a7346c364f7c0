//! Textual bulletin attached to a snapshot.

use serde::Deserialize;

/// Literal line used by bulletins as a visual divider.
pub const REPORT_SEPARATOR: &str = "-------------------------------------------------";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Report {
    #[serde(default)]
    pub text_bloc_item: Vec<ReportBlock>,
}

impl Report {
    pub fn blocks(&self) -> &[ReportBlock] {
        &self.text_bloc_item
    }
}

/// One block of a bulletin: either a titled heading or a line of body text.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReportBlock {
    #[serde(default)]
    pub bloc_title: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Heading,
    Body,
    Separator,
}

impl ReportBlock {
    pub fn kind(&self) -> BlockKind {
        match (&self.bloc_title, self.text.as_deref()) {
            (Some(_), _) => BlockKind::Heading,
            (None, Some(REPORT_SEPARATOR)) => BlockKind::Separator,
            (None, _) => BlockKind::Body,
        }
    }
}
