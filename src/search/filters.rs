use chrono::{DateTime, NaiveDate, Utc};

use crate::models::{Record, Role, Session};

/// Optional narrowing applied on top of keyword matching.
///
/// Filters combine with AND: a record counts only when its session passes
/// the project filter and the record itself passes the role and date filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    /// Case-insensitive substring of the session's project path; `~` expands to home
    pub project: Option<String>,
    pub role: Option<Role>,
    /// Keep records at or after midnight UTC of this date
    pub since: Option<NaiveDate>,
}

impl SearchFilter {
    pub fn is_empty(&self) -> bool {
        self.project.is_none() && self.role.is_none() && self.since.is_none()
    }

    pub fn matches_session(&self, session: &Session) -> bool {
        let Some(ref wanted) = self.project else {
            return true;
        };
        let Some(ref project_path) = session.project_path else {
            return false;
        };

        let lower_path = project_path.to_string_lossy().to_lowercase();
        lower_path.contains(&expand_home(&wanted.to_lowercase()))
    }

    pub fn matches_record(&self, record: &Record) -> bool {
        if let Some(role) = self.role
            && record.role != role
        {
            return false;
        }
        match self.since {
            Some(date) => record.timestamp.is_some_and(|ts| ts >= start_of_day(date)),
            None => true,
        }
    }

    /// Session-level date check for listings: the session was active on or
    /// after the `since` date.
    pub fn matches_session_activity(&self, ended_at: Option<DateTime<Utc>>) -> bool {
        match self.since {
            Some(date) => ended_at.is_some_and(|ts| ts >= start_of_day(date)),
            None => true,
        }
    }
}

/// Parse a `YYYY-MM-DD` date for the `since` filter
pub fn parse_since(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

fn expand_home(value: &str) -> String {
    if value.starts_with('~')
        && let Some(home) = dirs::home_dir()
    {
        let home_str = home.to_string_lossy().to_lowercase();
        return value.replacen('~', &home_str, 1);
    }
    value.to_string()
}
