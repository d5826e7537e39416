//! Project accounts the current user can charge jobs to.
//!
//! Accounts are the user's Unix groups whose names start with `P`, as listed
//! by `id`.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::scheduler::subprocess::run_command;

static GROUP_ENTRY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\((\w+)\)").expect("valid group regex"));

static ACCOUNT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^P\w+$").expect("valid account regex"));

/// Extract project account names from the output of `id`.
///
/// ```
/// use blendfarm_core::accounts::parse_id_groups;
///
/// let out = "uid=1(ann) gid=1(ann) groups=1(ann),5301(PZS0530),5302(PAS1234)";
/// assert_eq!(parse_id_groups(out), vec!["PZS0530", "PAS1234"]);
/// ```
pub fn parse_id_groups(id_output: &str) -> Vec<String> {
    let Some((_, groups)) = id_output.split_once("groups=") else {
        return Vec::new();
    };
    GROUP_ENTRY
        .captures_iter(groups)
        .map(|c| c[1].to_string())
        .filter(|name| ACCOUNT_NAME.is_match(name))
        .collect()
}

/// Run `id` and return the current user's project accounts.
///
/// Returns an empty list if `id` cannot be run.
pub async fn current_accounts() -> Vec<String> {
    match run_command("id", &[], Duration::from_secs(5)).await {
        Ok(output) if output.success() => parse_id_groups(&output.stdout),
        Ok(output) => {
            tracing::warn!(exit_code = output.exit_code, "`id` failed, no accounts available");
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not run `id`, no accounts available");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_only_p_groups_in_order() {
        let out = "uid=30001(jdoe) gid=30001(jdoe) groups=30001(jdoe),5501(PZS1010),100(users),5502(PAS0042)\n";
        assert_eq!(parse_id_groups(out), vec!["PZS1010", "PAS0042"]);
    }

    #[test]
    fn no_groups_section() {
        assert!(parse_id_groups("uid=0(root) gid=0(root)").is_empty());
        assert!(parse_id_groups("").is_empty());
    }

    #[test]
    fn lowercase_p_is_not_an_account() {
        assert!(parse_id_groups("groups=1(pgroup),2(P)").is_empty());
    }
}
