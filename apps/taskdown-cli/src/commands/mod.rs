//! Subcommand implementations.

pub mod auth;
pub mod edit;
pub mod reconcile;
pub mod rollback;
pub mod view;

use crate::error::{CliError, CliResult};
use taskdown_core::Snapshot;
use taskdown_gtasks::TasksClient;

/// Run the reconciliation and report the outcome to the user.
///
/// The engine itself never fails as a whole; a run with failed per-item
/// operations surfaces as a non-zero exit so scripts notice.
pub(crate) async fn run_reconcile(
    client: &TasksClient,
    old: &Snapshot,
    new: &Snapshot,
) -> CliResult<()> {
    let report = taskdown_gtasks::reconcile(client, old, new).await;
    println!("{report}");

    if report.is_clean() {
        Ok(())
    } else {
        for failure in &report.failures {
            eprintln!("failed: {failure}");
        }
        Err(CliError::PartialFailure {
            failed: report.failures.len(),
        })
    }
}
