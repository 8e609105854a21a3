use chrono::{Months, NaiveDate};

/// Team-wide (unfiltered) or filtered by one member's name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    TeamWide,
    Member,
}

/// One extraction request. Built by an orchestrator, consumed by an extractor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuerySpec {
    pub kind: QueryKind,
    /// Free-text filter; empty for team-wide queries.
    pub filter: String,
    pub since: NaiveDate,
    pub until: Option<NaiveDate>,
}

impl QuerySpec {
    /// Team-wide query over the year leading up to `today`.
    pub fn team_wide(today: NaiveDate) -> Self {
        Self {
            kind: QueryKind::TeamWide,
            filter: String::new(),
            since: one_year_before(today),
            until: None,
        }
    }

    /// Query filtered by a member's display name over the year leading up to `today`.
    pub fn member(name: &str, today: NaiveDate) -> Self {
        Self {
            kind: QueryKind::Member,
            filter: name.to_string(),
            since: one_year_before(today),
            until: None,
        }
    }

    /// Unfiltered query over an explicit date range, both ends inclusive.
    pub fn range(since: NaiveDate, until: NaiveDate) -> Self {
        Self {
            kind: QueryKind::TeamWide,
            filter: String::new(),
            since,
            until: Some(until),
        }
    }

    /// Human label for logs.
    pub fn label(&self) -> String {
        match self.kind {
            QueryKind::TeamWide => "team".to_string(),
            QueryKind::Member => format!("member:{}", self.filter),
        }
    }
}

fn one_year_before(today: NaiveDate) -> NaiveDate {
    today.checked_sub_months(Months::new(12)).unwrap_or(today)
}
