// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Run configuration derived from the process environment.
//!
//! Raw values are collected by the CLI layer and converted exactly once into
//! an immutable [`RenderConfig`]. Validation happens in
//! [`RenderConfigBuilder::build`], before any remote query is attempted.

use std::{collections::BTreeSet, fmt};

use crate::error::Error;

/// Immutable configuration shared by the aggregator for a single run.
///
/// # Examples
///
/// ```
/// use github_stats::RenderConfig;
///
/// let config = RenderConfig::builder()
///     .access_token(Some("ghp_example".to_owned(),),)
///     .user(Some("octocat".to_owned(),),)
///     .excluded_repos(Some("octocat/old, octocat/fork",),)
///     .build()
///     .expect("valid configuration",);
/// assert!(config.is_repository_excluded("octocat/old"));
/// assert!(!config.exclude_forked_repos());
/// ```
#[derive(Clone,)]
pub struct RenderConfig
{
    user:                 String,
    access_token:         String,
    excluded_repos:       BTreeSet<String,>,
    excluded_langs:       BTreeSet<String,>,
    exclude_forked_repos: bool,
}

impl RenderConfig
{
    /// Starts a builder with every input unset.
    pub fn builder() -> RenderConfigBuilder
    {
        RenderConfigBuilder::default()
    }

    /// Account identifier whose commit statistics are attributed.
    pub fn user(&self,) -> &str
    {
        &self.user
    }

    /// Personal access token used to authenticate every request.
    pub fn access_token(&self,) -> &str
    {
        &self.access_token
    }

    /// Whether forked repositories are skipped.
    pub fn exclude_forked_repos(&self,) -> bool
    {
        self.exclude_forked_repos
    }

    /// Returns `true` when `name_with_owner` matches an excluded repository
    /// exactly. Matching is case-sensitive.
    pub fn is_repository_excluded(&self, name_with_owner: &str,) -> bool
    {
        self.excluded_repos.contains(name_with_owner,)
    }

    /// Returns `true` when the language is excluded, ignoring ASCII case.
    pub fn is_language_excluded(&self, language: &str,) -> bool
    {
        self.excluded_langs.contains(&language.to_lowercase(),)
    }
}

impl fmt::Debug for RenderConfig
{
    fn fmt(&self, f: &mut fmt::Formatter<'_,>,) -> fmt::Result
    {
        f.debug_struct("RenderConfig",)
            .field("user", &self.user,)
            .field("access_token", &"<redacted>",)
            .field("excluded_repos", &self.excluded_repos,)
            .field("excluded_langs", &self.excluded_langs,)
            .field("exclude_forked_repos", &self.exclude_forked_repos,)
            .finish()
    }
}

/// Collects raw environment values before validation.
#[derive(Debug, Default, Clone,)]
pub struct RenderConfigBuilder
{
    user:                 Option<String,>,
    access_token:         Option<String,>,
    excluded_repos:       BTreeSet<String,>,
    excluded_langs:       BTreeSet<String,>,
    exclude_forked_repos: bool,
}

impl RenderConfigBuilder
{
    /// Sets the account identifier (`GITHUB_ACTOR`).
    pub fn user(mut self, value: Option<String,>,) -> Self
    {
        self.user = value;
        self
    }

    /// Sets the personal access token (`ACCESS_TOKEN`).
    pub fn access_token(mut self, value: Option<String,>,) -> Self
    {
        self.access_token = value;
        self
    }

    /// Parses a comma-separated repository list (`EXCLUDED`).
    pub fn excluded_repos(mut self, raw: Option<&str,>,) -> Self
    {
        self.excluded_repos = raw.map(parse_name_list,).unwrap_or_default();
        self
    }

    /// Parses a comma-separated language list (`EXCLUDED_LANGS`).
    pub fn excluded_langs(mut self, raw: Option<&str,>,) -> Self
    {
        self.excluded_langs = raw
            .map(parse_name_list,)
            .unwrap_or_default()
            .into_iter()
            .map(|language| language.to_lowercase(),)
            .collect();
        self
    }

    /// Interprets the `EXCLUDE_FORKED_REPOS` flag, see [`parse_flag`].
    pub fn exclude_forked_repos(mut self, raw: Option<&str,>,) -> Self
    {
        self.exclude_forked_repos = parse_flag(raw,);
        self
    }

    /// Validates the collected values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] when the access token or the account
    /// identifier is missing or blank. The token is checked first.
    pub fn build(self,) -> Result<RenderConfig, Error,>
    {
        let access_token = non_blank(self.access_token,).ok_or_else(|| {
            Error::configuration("a personal access token (ACCESS_TOKEN) is required",)
        },)?;
        let user = non_blank(self.user,)
            .ok_or_else(|| Error::configuration("GITHUB_ACTOR must be set",),)?;

        Ok(RenderConfig {
            user,
            access_token,
            excluded_repos: self.excluded_repos,
            excluded_langs: self.excluded_langs,
            exclude_forked_repos: self.exclude_forked_repos,
        },)
    }
}

fn non_blank(value: Option<String,>,) -> Option<String,>
{
    value.map(|raw| raw.trim().to_owned(),).filter(|trimmed| !trimmed.is_empty(),)
}

/// Splits a comma-separated list, trimming entries and dropping empty ones.
///
/// # Examples
///
/// ```
/// use github_stats::parse_name_list;
///
/// let names = parse_name_list(" a/b ,, c/d ",);
/// assert_eq!(names.into_iter().collect::<Vec<_,>>(), vec!["a/b", "c/d"]);
/// ```
pub fn parse_name_list(raw: &str,) -> BTreeSet<String,>
{
    raw.split(',',)
        .map(str::trim,)
        .filter(|entry| !entry.is_empty(),)
        .map(str::to_owned,)
        .collect()
}

/// Converts a truthy environment string into a boolean.
///
/// Unset and empty values are `false`, as is `"false"` in any case with
/// surrounding whitespace. Every other value is `true`.
pub fn parse_flag(raw: Option<&str,>,) -> bool
{
    match raw {
        None | Some("",) => false,
        Some(value,) => !value.trim().eq_ignore_ascii_case("false",),
    }
}
