// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Command-line interface for the github-stats binary.
//!
//! Configuration is read from the environment variables used by the GitHub
//! Actions workflow (`ACCESS_TOKEN`, `GITHUB_ACTOR`, `EXCLUDED`,
//! `EXCLUDED_LANGS`, `EXCLUDE_FORKED_REPOS`); each one can also be passed as a
//! flag. Both badges are rendered concurrently on a single-threaded runtime.

use std::{
    io,
    path::{Path, PathBuf},
    process,
};

use clap::{ArgAction, Parser};
use github_stats::{
    AccountStats, BadgeLayout, Error, GithubClient, RenderConfig, StatsAggregator, output_error,
    render_languages, render_overview,
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Command line interface for rendering account statistics badges.
#[derive(Debug, Parser,)]
#[command(name = "github-stats", version, about = "Render GitHub account statistics into SVG badges")]
struct Cli
{
    /// Personal access token used for every GitHub request.
    #[arg(long = "access-token", env = "ACCESS_TOKEN", hide_env_values = true, value_name = "TOKEN")]
    access_token: Option<String,>,

    /// Account whose commits are attributed when counting changed lines.
    #[arg(long = "user", env = "GITHUB_ACTOR", value_name = "LOGIN")]
    user: Option<String,>,

    /// Comma-separated `owner/name` repositories to leave out.
    #[arg(long = "excluded", env = "EXCLUDED", value_name = "REPOS")]
    excluded: Option<String,>,

    /// Comma-separated languages to leave out of the languages badge.
    #[arg(long = "excluded-langs", env = "EXCLUDED_LANGS", value_name = "LANGS")]
    excluded_langs: Option<String,>,

    /// Skip forked repositories unless the value is empty or `false`.
    #[arg(long = "exclude-forked-repos", env = "EXCLUDE_FORKED_REPOS", value_name = "BOOL")]
    exclude_forked_repos: Option<String,>,

    /// Directory holding the `overview.svg` and `languages.svg` templates.
    #[arg(long = "templates", value_name = "DIR", default_value = "templates")]
    templates: PathBuf,

    /// Directory that will receive the rendered badges.
    #[arg(long = "output", value_name = "DIR", default_value = "generated")]
    output: PathBuf,

    /// Print the collected statistics as JSON after rendering.
    #[arg(long = "json", action = ArgAction::SetTrue)]
    json: bool,
}

impl Cli
{
    fn render_config(&self,) -> Result<RenderConfig, Error,>
    {
        RenderConfig::builder()
            .access_token(self.access_token.clone(),)
            .user(self.user.clone(),)
            .excluded_repos(self.excluded.as_deref(),)
            .excluded_langs(self.excluded_langs.as_deref(),)
            .exclude_forked_repos(self.exclude_forked_repos.as_deref(),)
            .build()
    }

    fn layout(&self,) -> BadgeLayout
    {
        BadgeLayout {
            template_dir: self.templates.clone(),
            output_dir:   self.output.clone(),
        }
    }
}

/// Entry point that reports errors and sets the appropriate exit status.
#[tokio::main(flavor = "current_thread")]
async fn main()
{
    init_tracing();

    if let Err(error,) = run(Cli::parse(),).await {
        eprintln!("{}", error.to_display_string());
        process::exit(1,);
    }
}

fn init_tracing()
{
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info",),);
    let _ = tracing_subscriber::fmt().with_env_filter(filter,).with_writer(io::stderr,).try_init();
}

/// Validates configuration, then renders both badges.
///
/// # Errors
///
/// Configuration errors are returned before any request is sent. Remote,
/// template and output errors abort both renderers.
async fn run(cli: Cli,) -> Result<(), Error,>
{
    let config = cli.render_config()?;
    let layout = cli.layout();
    debug!("Resolved configuration: {:?}", config);

    let client = GithubClient::new(&config,)?;
    let stats = StatsAggregator::new(client, &config,);

    let (overview, languages,) =
        tokio::try_join!(render_overview(&stats, &layout), render_languages(&stats, &layout))?;
    info!("Rendered {} and {}", overview.display(), languages.display());

    if cli.json {
        let snapshot = stats.account_stats().await?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        write_stats_json(&mut handle, &snapshot,)?;
    }

    Ok((),)
}

fn write_stats_json<W: io::Write,>(writer: &mut W, stats: &AccountStats,) -> Result<(), Error,>
{
    serde_json::to_writer_pretty(&mut *writer, stats,)
        .map_err(|source| output_error(Path::new("<stdout>",), source.into(),),)?;
    writeln!(writer).map_err(|source| output_error(Path::new("<stdout>",), source,),)
}

#[cfg(test)]
mod tests
{
    use std::{io::Cursor, path::Path};

    use clap::Parser;

    use super::{AccountStats, Cli, Error, write_stats_json};

    fn cli() -> Cli
    {
        Cli {
            access_token:         Some("token".to_owned(),),
            user:                 Some("octocat".to_owned(),),
            excluded:             None,
            excluded_langs:       None,
            exclude_forked_repos: None,
            templates:            "templates".into(),
            output:               "generated".into(),
            json:                 false,
        }
    }

    #[test]
    fn cli_accepts_flags_for_every_input()
    {
        let cli = Cli::try_parse_from([
            env!("CARGO_PKG_NAME"),
            "--access-token",
            "token",
            "--user",
            "octocat",
            "--excluded",
            "octocat/a,octocat/b",
            "--excluded-langs",
            "HTML",
            "--exclude-forked-repos",
            "true",
            "--templates",
            "tpl",
            "--output",
            "out",
            "--json",
        ],)
        .expect("failed to parse CLI",);

        let config = cli.render_config().expect("valid configuration",);
        assert_eq!(config.user(), "octocat");
        assert!(config.is_repository_excluded("octocat/b"));
        assert!(config.is_language_excluded("html"));
        assert!(config.exclude_forked_repos());
        assert!(cli.json);

        let layout = cli.layout();
        assert_eq!(layout.template_dir, Path::new("tpl"));
        assert_eq!(layout.output_dir, Path::new("out"));
    }

    #[test]
    fn missing_token_fails_before_any_request()
    {
        let mut cli = cli();
        cli.access_token = None;

        let error = cli.render_config().expect_err("expected configuration error",);
        match error {
            Error::Configuration {
                message,
            } => assert!(message.contains("ACCESS_TOKEN")),
            other => panic!("unexpected error variant: {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_stops_on_missing_user()
    {
        let mut cli = cli();
        cli.user = None;

        let error = super::run(cli,).await.expect_err("expected configuration error",);
        assert!(matches!(error, Error::Configuration { .. }));
    }

    #[test]
    fn layout_uses_default_directories()
    {
        let layout = cli().layout();
        assert_eq!(layout.template_dir, Path::new("templates"));
        assert_eq!(layout.output_dir, Path::new("generated"));
    }

    #[test]
    fn stats_json_is_pretty_printed()
    {
        let stats = AccountStats {
            name:                "Octocat".to_owned(),
            stargazer_count:     1,
            fork_count:          2,
            total_contributions: 3,
            lines_added:         4,
            lines_deleted:       5,
            view_count:          6,
            repository_count:    7,
        };
        let mut buffer = Cursor::new(Vec::new(),);
        write_stats_json(&mut buffer, &stats,).expect("failed to serialize stats",);

        let output = String::from_utf8(buffer.into_inner(),).expect("invalid UTF-8",);
        assert!(output.starts_with("{\n  \"name\": \"Octocat\""));
        assert!(output.contains("\"repository_count\": 7"));
        assert!(output.ends_with("}\n"));
    }
}
