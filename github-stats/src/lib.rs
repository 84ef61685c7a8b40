// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! GitHub account statistics rendered into SVG badges.
//!
//! [`StatsAggregator`] pulls repository, language, contribution, commit and
//! traffic data from a [`StatsSource`] (in production a [`GithubClient`]) and
//! memoizes every derived statistic for the lifetime of a run. The badge
//! renderers substitute those statistics into `{{ placeholder }}` templates
//! and write the results to disk.

pub mod badge;
mod config;
mod error;
mod github;
mod language;
pub mod source;
mod stats;
mod template;

pub use badge::{
    BadgeKind, BadgeLayout, OverviewValues, format_thousands, language_substitutions,
    overview_substitutions, render_languages, render_overview,
};
pub use config::{RenderConfig, RenderConfigBuilder, parse_flag, parse_name_list};
pub use error::{Error, output_error, template_error};
pub use github::GithubClient;
pub use language::{DEFAULT_LANGUAGE_COLOR, LanguageBreakdown, LanguageShare, LanguageTally};
pub use source::StatsSource;
pub use stats::{AccountStats, ConsideredRepository, LinesChanged, RepositoryOverview, StatsAggregator};
pub use template::{Substitutions, Template};
