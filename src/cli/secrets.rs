//! The `secrets` command
//!
//! Inventories the SSM parameters declared in the CI configuration,
//! grouped by the owner recorded in the trailing comment.

use std::path::Path;

use anyhow::Context;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex_lite::Regex;

use crate::config::RevisarConfig;

// Matches `SOME_SSM_NAME: <param>  # <owner>` variable declarations.
static SSM_OWNER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Z].*_SSM_(NAME|KEY): (?P<param>[^ ]+) +# +(?P<owner>.+)$")
        .expect("valid owner pattern")
});

/// Output format for the secrets inventory
#[derive(Debug, Clone, Copy, Default, clap::ValueEnum)]
pub enum SecretsFormat {
    #[default]
    Text,
    Json,
}

/// Parameters declared in `contents`, grouped by owner in order of
/// first appearance.
pub fn parameters_by_owner(contents: &str) -> IndexMap<String, Vec<String>> {
    let mut owners: IndexMap<String, Vec<String>> = IndexMap::new();
    for line in contents.lines() {
        if let Some(captures) = SSM_OWNER.captures(line.trim()) {
            owners
                .entry(captures["owner"].to_string())
                .or_default()
                .push(captures["param"].to_string());
        }
    }
    owners
}

pub fn cmd_secrets(repo: &Path, format: SecretsFormat) -> anyhow::Result<()> {
    let config = RevisarConfig::load_or_default(repo);
    let entry_point = repo.join(&config.ci.entry_point);
    let contents = std::fs::read_to_string(&entry_point)
        .with_context(|| format!("failed to read {}", entry_point.display()))?;

    let owners = parameters_by_owner(&contents);
    match format {
        SecretsFormat::Text => {
            for (owner, params) in &owners {
                println!("Owner:{owner}");
                for param in params {
                    println!("  - {param}");
                }
            }
        }
        SecretsFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&owners)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parameters_grouped_by_owner() {
        let contents = "\
variables:
  AGENT_API_KEY_SSM_NAME: ci.datadog-agent.api_key  # agent-ci
  AGENT_APP_KEY_SSM_KEY: ci.datadog-agent.app_key  # agent-ci
  TOOLING_TOKEN_SSM_NAME: ci.tooling.token  # tooling
";
        let owners = parameters_by_owner(contents);
        assert_eq!(owners.len(), 2);
        assert_eq!(
            owners["agent-ci"],
            vec!["ci.datadog-agent.api_key", "ci.datadog-agent.app_key"]
        );
        assert_eq!(owners["tooling"], vec!["ci.tooling.token"]);
    }

    #[test]
    fn test_owners_keep_first_seen_order() {
        let contents = "\
  ZED_SSM_NAME: param.z  # zulu
  ABLE_SSM_KEY: param.a  # alpha
";
        let owners = parameters_by_owner(contents);
        let order: Vec<&String> = owners.keys().collect();
        assert_eq!(order, ["zulu", "alpha"]);
    }

    #[test]
    fn test_unannotated_declarations_ignored() {
        let contents = "\
  AGENT_API_KEY_SSM_NAME: ci.datadog-agent.api_key
  lowercase_ssm_name: ci.thing  # owner
  UNRELATED_VARIABLE: value  # comment
";
        let owners = parameters_by_owner(contents);
        assert!(owners.is_empty(), "owners: {owners:?}");
    }
}
