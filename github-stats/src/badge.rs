// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
//
// SPDX-License-Identifier: MIT

//! Badge rendering.
//!
//! Two badges are produced: an overview of scalar statistics and a language
//! breakdown. Each renderer loads its template before touching the network,
//! pulls the statistics it needs from the shared [`StatsAggregator`], and
//! writes the result into the output directory, creating it when absent.

use std::{
    borrow::Cow,
    fmt::Write as _,
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf}
};

use tracing::{debug, info};

use crate::{
    error::{self, Error},
    language::LanguageBreakdown,
    source::StatsSource,
    stats::StatsAggregator,
    template::{Substitutions, Template}
};

/// Delay between consecutive language list entries, in milliseconds.
pub const ANIMATION_DELAY_STEP_MS: usize = 150;

/// Badges produced by a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeKind {
    Overview,
    Languages
}

impl BadgeKind {
    /// File name shared by the template and the generated badge.
    pub fn file_name(self) -> &'static str {
        match self {
            BadgeKind::Overview => "overview.svg",
            BadgeKind::Languages => "languages.svg"
        }
    }
}

/// Template and output locations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BadgeLayout {
    /// Directory holding `overview.svg` and `languages.svg` templates.
    pub template_dir: PathBuf,
    /// Directory receiving the rendered badges.
    pub output_dir:   PathBuf
}

impl Default for BadgeLayout {
    fn default() -> Self {
        Self {
            template_dir: PathBuf::from("templates"),
            output_dir:   PathBuf::from("generated")
        }
    }
}

impl BadgeLayout {
    pub fn template_path(&self, kind: BadgeKind) -> PathBuf {
        self.template_dir.join(kind.file_name())
    }

    pub fn output_path(&self, kind: BadgeKind) -> PathBuf {
        self.output_dir.join(kind.file_name())
    }
}

/// Values substituted into the overview template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverviewValues<'a> {
    pub name:          &'a str,
    pub stars:         u64,
    pub forks:         u64,
    pub contributions: u64,
    /// Lines added plus lines deleted.
    pub lines_changed: u64,
    pub views:         u64,
    /// Number of considered repositories.
    pub repos:         usize
}

/// Renders the overview badge and returns the written path.
///
/// # Errors
///
/// Returns [`Error::Template`] when the template is missing, any error
/// produced by the aggregator, and [`Error::Output`] when the badge cannot be
/// written.
pub async fn render_overview<S>(
    stats: &StatsAggregator<'_, S>,
    layout: &BadgeLayout
) -> Result<PathBuf, Error>
where
    S: StatsSource
{
    let template = Template::load(&layout.template_path(BadgeKind::Overview))?;

    let (name, stars, forks, contributions, lines, views, repos) = tokio::try_join!(
        stats.name(),
        stats.stargazer_count(),
        stats.fork_count(),
        stats.total_contributions(),
        stats.lines_changed(),
        stats.views(),
        stats.repos()
    )?;

    let values = OverviewValues {
        name,
        stars,
        forks,
        contributions,
        lines_changed: lines.total(),
        views,
        repos: repos.len()
    };

    let path = layout.output_path(BadgeKind::Overview);
    let rendered = fill(&template, BadgeKind::Overview, &overview_substitutions(&values));
    write_badge(&path, &rendered)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

/// Renders the languages badge and returns the written path.
///
/// # Errors
///
/// Same conditions as [`render_overview`].
pub async fn render_languages<S>(
    stats: &StatsAggregator<'_, S>,
    layout: &BadgeLayout
) -> Result<PathBuf, Error>
where
    S: StatsSource
{
    let template = Template::load(&layout.template_path(BadgeKind::Languages))?;
    let languages = stats.languages().await?;

    let path = layout.output_path(BadgeKind::Languages);
    let rendered = fill(&template, BadgeKind::Languages, &language_substitutions(languages));
    write_badge(&path, &rendered)?;
    info!("Wrote {} ({} languages)", path.display(), languages.len());
    Ok(path)
}

/// Formats the overview values for substitution.
pub fn overview_substitutions(values: &OverviewValues<'_>) -> Substitutions<'static> {
    let mut substitutions = Substitutions::new();
    substitutions.insert("name", escape_xml(values.name).into_owned());
    substitutions.insert("stars", format_thousands(values.stars));
    substitutions.insert("forks", format_thousands(values.forks));
    substitutions.insert("contributions", format_thousands(values.contributions));
    substitutions.insert("lines_changed", format_thousands(values.lines_changed));
    substitutions.insert("views", format_thousands(values.views));
    substitutions.insert("repos", format_thousands(values.repos as u64));
    substitutions
}

/// Builds the `progress` and `lang_list` fragments, largest language first.
pub fn language_substitutions(languages: &LanguageBreakdown) -> Substitutions<'static> {
    let mut progress = String::new();
    let mut lang_list = String::new();

    for (rank, share) in languages.iter().enumerate() {
        let color = escape_xml(share.display_color());
        let name = escape_xml(&share.name);
        let delay = rank * ANIMATION_DELAY_STEP_MS;

        let _ = write!(
            progress,
            "<span style=\"background-color: {color};width: {:.3}%;\" class=\"progress-item\"></span>",
            share.proportion
        );
        let _ = write!(
            lang_list,
            "\n<li style=\"animation-delay: {delay}ms;\">\n<svg xmlns=\"http://www.w3.org/2000/svg\" class=\"octicon\" style=\"fill:{color};\"\nviewBox=\"0 0 16 16\" version=\"1.1\" width=\"16\" height=\"16\"><path\nfill-rule=\"evenodd\" d=\"M8 4a4 4 0 100 8 4 4 0 000-8z\"></path></svg>\n<span class=\"lang\">{name}</span>\n<span class=\"percent\">{:.2}%</span>\n</li>\n\n",
            share.proportion
        );
    }

    let mut substitutions = Substitutions::new();
    substitutions.insert("progress", progress);
    substitutions.insert("lang_list", lang_list);
    substitutions
}

/// Formats an integer with comma thousands separators.
///
/// # Examples
///
/// ```
/// use github_stats::format_thousands;
///
/// assert_eq!(format_thousands(1234567), "1,234,567");
/// assert_eq!(format_thousands(999), "999");
/// ```
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut formatted = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, digit) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            formatted.push(',');
        }
        formatted.push(digit);
    }
    formatted
}

fn fill(template: &Template, kind: BadgeKind, substitutions: &Substitutions<'_>) -> String {
    let unfilled = template.unfilled(substitutions);
    if !unfilled.is_empty() {
        debug!("{} keeps unknown placeholders: {}", kind.file_name(), unfilled.join(", "));
    }
    template.render(substitutions)
}

fn write_badge(path: &Path, contents: &str) -> Result<(), Error> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| error::output_error(parent, source))?;
    }

    let file = File::create(path).map_err(|source| error::output_error(path, source))?;
    let mut writer = BufWriter::new(file);
    writer
        .write_all(contents.as_bytes())
        .map_err(|source| error::output_error(path, source))?;
    writer
        .flush()
        .map_err(|source| error::output_error(path, source))
}

fn escape_xml(value: &str) -> Cow<'_, str> {
    if value
        .chars()
        .any(|character| matches!(character, '&' | '<' | '>' | '\"' | '\''))
    {
        let mut escaped = String::with_capacity(value.len());
        for character in value.chars() {
            match character {
                '&' => escaped.push_str("&amp;"),
                '<' => escaped.push_str("&lt;"),
                '>' => escaped.push_str("&gt;"),
                '\"' => escaped.push_str("&quot;"),
                '\'' => escaped.push_str("&apos;"),
                other => escaped.push(other)
            }
        }
        Cow::Owned(escaped)
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use proptest::prelude::*;
    use tempfile::tempdir;

    use super::*;
    use crate::{
        config::RenderConfig,
        language::LanguageTally,
        source::{
            ContributorStats, CountObj, LanguageConnection, LanguageEdge, LanguageNode,
            OverviewPage, PageInfo, RepositoryConnection, RepositoryNode, TrafficViews
        }
    };

    const OVERVIEW_TEMPLATE: &str = "<svg><text>{{ name }}</text><text>{{ stars }}</text><text>{{ forks }}</text><text>{{ contributions }}</text><text>{{ lines_changed }}</text><text>{{ views }}</text><text>{{ repos }}</text></svg>";
    const LANGUAGES_TEMPLATE: &str = "<svg><div>{{ progress }}</div><ul>{{ lang_list }}</ul></svg>";

    struct StaticSource;

    impl StatsSource for StaticSource {
        async fn overview_page(
            &self,
            _owned_cursor: Option<&str>,
            _contributed_cursor: Option<&str>
        ) -> Result<OverviewPage, Error> {
            Ok(OverviewPage {
                login:       Some("octocat".to_owned()),
                name:        Some("Octo & Cat".to_owned()),
                owned:       RepositoryConnection {
                    page_info: PageInfo::default(),
                    nodes:     vec![Some(RepositoryNode {
                        name_with_owner: "octocat/a".to_owned(),
                        is_fork:         false,
                        stargazers:      CountObj {
                            total_count: 1500
                        },
                        fork_count:      3,
                        languages:       LanguageConnection {
                            edges: vec![
                                LanguageEdge {
                                    size: 300,
                                    node: LanguageNode {
                                        name:  "Python".to_owned(),
                                        color: Some("#3572A5".to_owned())
                                    }
                                },
                                LanguageEdge {
                                    size: 100,
                                    node: LanguageNode {
                                        name:  "JavaScript".to_owned(),
                                        color: None
                                    }
                                },
                            ]
                        }
                    })]
                },
                contributed: RepositoryConnection::default()
            })
        }

        async fn contribution_years(&self) -> Result<Vec<i32>, Error> {
            Ok(vec![2024])
        }

        async fn contributions_by_year(&self, _years: &[i32]) -> Result<Vec<u64>, Error> {
            Ok(vec![12345])
        }

        async fn contributor_stats(&self, _name: &str) -> Result<Vec<ContributorStats>, Error> {
            Ok(Vec::new())
        }

        async fn traffic_views(&self, _name: &str) -> Result<TrafficViews, Error> {
            Ok(TrafficViews::default())
        }
    }

    fn config() -> RenderConfig {
        RenderConfig::builder()
            .access_token(Some("token".to_owned()))
            .user(Some("octocat".to_owned()))
            .build()
            .expect("valid config")
    }

    fn layout_with_templates(root: &Path) -> BadgeLayout {
        let template_dir = root.join("templates");
        fs::create_dir_all(&template_dir).expect("failed to create template dir");
        fs::write(template_dir.join("overview.svg"), OVERVIEW_TEMPLATE).expect("write overview");
        fs::write(template_dir.join("languages.svg"), LANGUAGES_TEMPLATE).expect("write languages");
        BadgeLayout {
            template_dir,
            output_dir: root.join("generated")
        }
    }

    fn sample_values() -> OverviewValues<'static> {
        OverviewValues {
            name:          "Octocat",
            stars:         1234,
            forks:         56,
            contributions: 7890,
            lines_changed: 1_000_000,
            views:         42,
            repos:         1001
        }
    }

    proptest! {
        #[test]
        fn thousands_formatting_round_trips(value in any::<u64>()) {
            let formatted = format_thousands(value);
            prop_assert_eq!(formatted.replace(',', ""), value.to_string());
            prop_assert!(formatted.split(',').skip(1).all(|group| group.len() == 3));
        }
    }

    #[test]
    fn format_thousands_handles_boundaries() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(100), "100");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(100000), "100,000");
        assert_eq!(format_thousands(1000000), "1,000,000");
    }

    #[test]
    fn overview_with_all_tokens_leaves_no_placeholders() {
        let template = Template::new(OVERVIEW_TEMPLATE);
        let rendered = template.render(&overview_substitutions(&sample_values()));

        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("<text>1,234</text>"));
        assert!(rendered.contains("<text>1,000,000</text>"));
        assert!(rendered.contains("<text>1,001</text>"));
    }

    fn shipped_template(kind: BadgeKind) -> Template {
        let directory = Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/../templates"));
        Template::load(&directory.join(kind.file_name())).expect("shipped template loads")
    }

    #[test]
    fn shipped_overview_template_is_fully_substituted() {
        let template = shipped_template(BadgeKind::Overview);
        let substitutions = overview_substitutions(&sample_values());
        assert!(template.unfilled(&substitutions).is_empty());

        let rendered = fill(&template, BadgeKind::Overview, &substitutions);
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("1,000,000"));
    }

    #[test]
    fn shipped_languages_template_is_fully_substituted() {
        let mut tally = LanguageTally::default();
        tally.add("Rust", 300, Some("#dea584"));
        tally.add("Go", 100, None);
        let template = shipped_template(BadgeKind::Languages);
        let substitutions = language_substitutions(&tally.finish());
        assert!(template.unfilled(&substitutions).is_empty());

        let rendered = fill(&template, BadgeKind::Languages, &substitutions);
        assert!(!rendered.contains("{{"));
        assert!(rendered.contains("<span class=\"lang\">Rust</span>"));
        assert!(rendered.contains("width: 75.000%;"));
    }

    #[test]
    fn overview_tokens_absent_from_mapping_stay_literal() {
        let template = Template::new("{{ stars }} {{ followers }}");
        let rendered = template.render(&overview_substitutions(&sample_values()));
        assert_eq!(rendered, "1,234 {{ followers }}");
    }

    #[test]
    fn overview_name_is_escaped() {
        let mut values = sample_values();
        values.name = "A <B> & C";
        let substitutions = overview_substitutions(&values);
        assert_eq!(substitutions["name"], "A &lt;B&gt; &amp; C");
    }

    #[test]
    fn language_fragments_follow_size_order() {
        let mut tally = LanguageTally::default();
        tally.add("JavaScript", 100, Some("#f1e05a"));
        tally.add("Python", 300, None);
        let substitutions = language_substitutions(&tally.finish());

        let progress = &substitutions["progress"];
        assert_eq!(
            progress,
            "<span style=\"background-color: #000000;width: 75.000%;\" class=\"progress-item\"></span><span style=\"background-color: #f1e05a;width: 25.000%;\" class=\"progress-item\"></span>"
        );

        let list = &substitutions["lang_list"];
        let python = list.find("Python").expect("python listed");
        let javascript = list.find("JavaScript").expect("javascript listed");
        assert!(python < javascript);
        assert!(list.contains("animation-delay: 0ms;"));
        assert!(list.contains("animation-delay: 150ms;"));
        assert!(list.contains("<span class=\"percent\">75.00%</span>"));
        assert!(list.contains("<span class=\"percent\">25.00%</span>"));
    }

    #[test]
    fn empty_breakdown_produces_no_segments() {
        let substitutions = language_substitutions(&LanguageBreakdown::default());
        assert_eq!(substitutions["progress"], "");
        assert_eq!(substitutions["lang_list"], "");
    }

    #[test]
    fn escape_xml_returns_borrowed_when_no_escaping_needed() {
        match escape_xml("Rust") {
            Cow::Borrowed(value) => assert_eq!(value, "Rust"),
            Cow::Owned(_) => panic!("expected borrowed variant")
        }
        assert_eq!(escape_xml("C'\"#"), "C&apos;&quot;#");
    }

    #[test]
    fn layout_defaults_to_templates_and_generated() {
        let layout = BadgeLayout::default();
        assert_eq!(layout.template_path(BadgeKind::Overview), Path::new("templates/overview.svg"));
        assert_eq!(layout.output_path(BadgeKind::Languages), Path::new("generated/languages.svg"));
    }

    #[test]
    fn write_badge_creates_missing_directory() {
        let directory = tempdir().expect("failed to create temp dir");
        let path = directory.path().join("nested").join("generated").join("badge.svg");

        write_badge(&path, "<svg/>").expect("write should succeed");
        assert_eq!(fs::read_to_string(&path).expect("readable"), "<svg/>");
    }

    #[test]
    fn write_badge_reports_blocked_directory() {
        let directory = tempdir().expect("failed to create temp dir");
        let blocker = directory.path().join("generated");
        File::create(&blocker).expect("failed to create placeholder file");

        let error = write_badge(&blocker.join("overview.svg"), "<svg/>").expect_err("expected io failure");
        assert!(matches!(error, Error::Output { .. }));
    }

    #[tokio::test]
    async fn both_renderers_write_their_badges() {
        let directory = tempdir().expect("failed to create temp dir");
        let layout = layout_with_templates(directory.path());
        let config = config();
        let stats = StatsAggregator::new(StaticSource, &config);

        let (overview, languages) = tokio::try_join!(
            render_overview(&stats, &layout),
            render_languages(&stats, &layout)
        )
        .expect("rendering should succeed");

        let overview = fs::read_to_string(overview).expect("overview written");
        assert!(overview.contains("<text>Octo &amp; Cat</text>"));
        assert!(overview.contains("<text>1,500</text>"));
        assert!(overview.contains("<text>12,345</text>"));
        assert!(!overview.contains("{{"));

        let languages = fs::read_to_string(languages).expect("languages written");
        assert!(languages.contains("width: 75.000%;"));
        assert!(languages.contains("background-color: #000000;width: 25.000%;"));
    }

    #[tokio::test]
    async fn missing_template_is_fatal_and_writes_nothing() {
        let directory = tempdir().expect("failed to create temp dir");
        let layout = BadgeLayout {
            template_dir: directory.path().join("absent"),
            output_dir:   directory.path().join("generated")
        };
        let config = config();
        let stats = StatsAggregator::new(StaticSource, &config);

        let error = render_overview(&stats, &layout).await.expect_err("template missing");
        assert!(matches!(error, Error::Template { .. }));
        assert!(!layout.output_path(BadgeKind::Overview).exists());
    }
}
