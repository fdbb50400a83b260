use clap::Parser;

use crate::sites::{REGISTRY, default_tokens, find_entry};
use crate::utils::error::{AppError, Result};

/// Check storefronts for newly listed signed merch and email alerts.
#[derive(Debug, Parser)]
#[command(name = "merch-watch", version, about)]
pub struct Cli {
    /// Site token(s) to check (default: all enabled sites)
    pub sites: Vec<String>,

    /// Run every registered site
    #[arg(long, short = 'a')]
    pub all: bool,

    /// List available sites and exit
    #[arg(long, short = 'l')]
    pub list: bool,

    /// Quiet mode: suppress console output, keep per-site logs
    #[arg(long, short = 'q')]
    pub quiet: bool,
}

impl Cli {
    /// Resolve which registry tokens this invocation should run.
    /// Unknown tokens are a configuration error (non-zero exit).
    pub fn tokens_to_run(&self) -> Result<Vec<String>> {
        if self.all {
            return Ok(REGISTRY.iter().map(|e| e.token.to_string()).collect());
        }
        if self.sites.is_empty() {
            return Ok(default_tokens().iter().map(|t| t.to_string()).collect());
        }

        for token in &self.sites {
            if find_entry(token).is_none() {
                return Err(AppError::UnknownSite {
                    token: token.clone(),
                });
            }
        }
        Ok(self.sites.clone())
    }
}

/// Render the registry for --list.
pub fn render_site_list() -> String {
    let defaults = default_tokens();
    let mut out = String::from("Available sites:\n");
    for entry in REGISTRY {
        let marker = if defaults.contains(&entry.token) { " (default)" } else { "" };
        out.push_str(&format!("  {:<12} {}{}\n", entry.token, entry.name, marker));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_args_runs_defaults() {
        let cli = Cli::parse_from(["merch-watch"]);
        let tokens = cli.tokens_to_run().unwrap();
        assert_eq!(tokens, default_tokens());
    }

    #[test]
    fn test_explicit_sites() {
        let cli = Cli::parse_from(["merch-watch", "taylor", "jonas"]);
        let tokens = cli.tokens_to_run().unwrap();
        assert_eq!(tokens, vec!["taylor".to_string(), "jonas".to_string()]);
    }

    #[test]
    fn test_all_flag_overrides_site_args() {
        let cli = Cli::parse_from(["merch-watch", "--all", "taylor"]);
        let tokens = cli.tokens_to_run().unwrap();
        assert_eq!(tokens.len(), REGISTRY.len());
    }

    #[test]
    fn test_unknown_token_is_rejected() {
        let cli = Cli::parse_from(["merch-watch", "bogus"]);
        let err = cli.tokens_to_run().unwrap_err();
        assert!(matches!(err, AppError::UnknownSite { .. }));
    }

    #[test]
    fn test_quiet_flag() {
        let cli = Cli::parse_from(["merch-watch", "-q", "taylor"]);
        assert!(cli.quiet);
    }

    #[test]
    fn test_render_site_list_mentions_every_token() {
        let listing = render_site_list();
        for entry in REGISTRY {
            assert!(listing.contains(entry.token));
            assert!(listing.contains(entry.name));
        }
    }
}
