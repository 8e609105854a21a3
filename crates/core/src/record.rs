//! Remote rows and their display projection.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// One row exactly as the remote grid or report returned it.
pub type RawRecord = Map<String, Value>;

/// The subset of a [`RawRecord`] shown on the dashboard, in projection order.
pub type DisplayRecord = IndexMap<String, Value>;

/// Field selection applied to every raw row of a site.
///
/// Values are copied untouched; a field the raw row lacks is left out of the
/// display record rather than filled with `null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Projection {
    fields: Vec<String>,
}

impl Projection {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = std::collections::HashSet::new();
        let fields = fields
            .into_iter()
            .map(Into::into)
            .filter(|f: &String| seen.insert(f.clone()))
            .collect();
        Self { fields }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn allows(&self, field: &str) -> bool {
        self.fields.iter().any(|f| f == field)
    }

    pub fn project(&self, raw: &RawRecord) -> DisplayRecord {
        self.fields
            .iter()
            .filter_map(|f| raw.get(f).map(|v| (f.clone(), v.clone())))
            .collect()
    }

    pub fn project_all(&self, rows: &[RawRecord]) -> Vec<DisplayRecord> {
        rows.iter().map(|r| self.project(r)).collect()
    }
}
