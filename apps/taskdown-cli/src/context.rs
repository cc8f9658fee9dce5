//! Shared command context: profile, paths and fetch filters.

use crate::config::{self, ConfigPaths};
use crate::error::{CliError, CliResult};
use chrono::{DateTime, Duration as ChronoDuration, Local, LocalResult, NaiveDate, TimeZone, Utc};
use std::time::Duration;
use taskdown_core::Snapshot;
use taskdown_gtasks::{fetch_snapshot, FetchOptions, RetryPolicy, TasksClient};

/// Request timeout for every API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything a command needs besides its own arguments.
pub struct Context {
    pub user: String,
    pub paths: ConfigPaths,
    pub fetch_options: FetchOptions,
    pub retry: RetryPolicy,
}

impl Context {
    /// Build the context from the global CLI flags.
    pub fn from_globals(
        user: &str,
        completed_after: Option<&str>,
        completed_before: Option<&str>,
        status: Option<&str>,
    ) -> CliResult<Self> {
        let completed_after = match completed_after {
            Some(date) => Some(parse_date(date)?),
            None => Some(Utc::now() - ChronoDuration::days(7)),
        };
        let completed_before = completed_before.map(parse_date).transpose()?;
        let status = status
            .map(|s| {
                s.parse()
                    .map_err(|e| CliError::Validation(format!("--status: {e}")))
            })
            .transpose()?;

        Ok(Self {
            user: user.to_string(),
            paths: ConfigPaths::for_user(user)?,
            fetch_options: FetchOptions {
                completed_after,
                completed_before,
                status,
            },
            retry: RetryPolicy::default(),
        })
    }

    /// Build an API client from this profile's stored credentials.
    pub fn client(&self) -> CliResult<TasksClient> {
        let credentials = config::load_credentials(&self.paths)?;
        Ok(taskdown_gtasks::build_client(credentials, REQUEST_TIMEOUT)?)
    }

    /// Fetch the current remote snapshot.
    pub async fn fetch(&self, client: &TasksClient) -> CliResult<Snapshot> {
        Ok(fetch_snapshot(client, &self.retry, &self.fetch_options).await?)
    }
}

/// Parse a `YYYY-MM-DD` flag as local midnight.
fn parse_date(date: &str) -> CliResult<DateTime<Utc>> {
    let naive = NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| CliError::Validation(format!("'{date}' is not a YYYY-MM-DD date")))?
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| CliError::Validation(format!("'{date}' has no valid midnight")))?;

    let local = match Local.from_local_datetime(&naive) {
        LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => dt,
        LocalResult::None => {
            return Err(CliError::Validation(format!(
                "'{date}' does not exist in the local timezone"
            )))
        }
    };
    Ok(local.with_timezone(&Utc))
}
