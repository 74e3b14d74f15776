use serde::{Deserialize, Serialize};

/// Value the API sends in `next` when there are no further pages.
pub const NO_NEXT_PAGE: &str = "";

/// A page of results from a multi-item endpoint.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DecodedEnvelope<T> {
    pub results: Vec<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
}

impl<T> DecodedEnvelope<T> {
    /// Drops a `next` cursor that is really the "no more pages" marker.
    pub fn normalized(mut self) -> Self {
        self.next = self.next.filter(|cursor| !is_no_next_page(cursor));
        self
    }

    pub fn has_next_page(&self) -> bool {
        self.next.is_some()
    }
}

pub fn is_no_next_page(cursor: &str) -> bool {
    cursor.trim() == NO_NEXT_PAGE
}
