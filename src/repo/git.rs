//! Git Subprocess Runner
//!
//! Thin wrapper over the `git` binary. Callers map the plain error message
//! into the error kind appropriate to their boundary (acquisition,
//! publication, ...).

use std::path::Path;

use tokio::process::Command;
use tracing::debug;

/// Run `git <args>` in `dir`, returning trimmed stdout.
///
/// The error string carries the subcommand and stderr so callers can wrap it
/// without losing context.
pub(crate) async fn run(dir: &Path, args: &[&str]) -> Result<String, String> {
    debug!("git {} (in {})", args.join(" "), dir.display());

    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .await
        .map_err(|e| format!("failed to spawn git {}: {}", args.join(" "), e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "git {} failed: {}",
            args.join(" "),
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Branch and short commit hash of a repository, for log correlation.
/// Returns "unknown" when the path is not a git work tree.
pub async fn repo_version(root: &Path) -> String {
    let branch = run(root, &["rev-parse", "--abbrev-ref", "HEAD"]).await;
    let commit = run(root, &["rev-parse", "--short=8", "HEAD"]).await;

    match (branch, commit) {
        (Ok(branch), Ok(commit)) => format!("{}@{}", branch, commit),
        _ => "unknown".to_string(),
    }
}
