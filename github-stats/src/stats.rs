// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Memoized account statistics backed by a [`StatsSource`].
///
/// Every accessor fetches on first use and returns the cached value
/// afterwards. Concurrent callers of the same accessor wait for the single
/// in-flight fetch instead of issuing a duplicate request. The repository
/// overview feeds several statistics (name, stars, forks, repositories,
/// languages) and is cached once for all of them.
use std::collections::HashSet;

use serde::Serialize;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::{
    config::RenderConfig,
    error::Error,
    language::{LanguageBreakdown, LanguageTally},
    source::{PageInfo, RepositoryNode, StatsSource},
};

const FALLBACK_NAME: &str = "No Name";

/// A repository that survived de-duplication and exclusion filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct ConsideredRepository
{
    /// `owner/name` identifier.
    pub name_with_owner: String,
    /// Whether the repository came from the viewer's owned repositories.
    pub owned:           bool,
}

/// Aggregates derived from the paginated repository overview.
#[derive(Debug, Clone, Default,)]
pub struct RepositoryOverview
{
    pub name:            String,
    pub stargazer_count: u64,
    pub fork_count:      u64,
    pub repositories:    Vec<ConsideredRepository,>,
    pub languages:       LanguageBreakdown,
}

/// Lines added and deleted by the account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize,)]
pub struct LinesChanged
{
    pub additions: u64,
    pub deletions: u64,
}

impl LinesChanged
{
    /// Additions plus deletions.
    pub fn total(&self,) -> u64
    {
        self.additions.saturating_add(self.deletions,)
    }
}

/// Snapshot of every scalar statistic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize,)]
pub struct AccountStats
{
    pub name:                String,
    pub stargazer_count:     u64,
    pub fork_count:          u64,
    pub total_contributions: u64,
    pub lines_added:         u64,
    pub lines_deleted:       u64,
    pub view_count:          u64,
    pub repository_count:    usize,
}

/// On-demand statistics for the configured account.
///
/// # Example
///
/// ```no_run
/// use github_stats::{GithubClient, RenderConfig, StatsAggregator};
///
/// # async fn example(config: RenderConfig) -> Result<(), github_stats::Error> {
/// let client = GithubClient::new(&config,)?;
/// let stats = StatsAggregator::new(client, &config,);
/// println!("{} has {} stars", stats.name().await?, stats.stargazer_count().await?);
/// # Ok(())
/// # }
/// ```
pub struct StatsAggregator<'cfg, S,>
{
    source:        S,
    config:        &'cfg RenderConfig,
    overview:      OnceCell<RepositoryOverview,>,
    contributions: OnceCell<u64,>,
    lines_changed: OnceCell<LinesChanged,>,
    views:         OnceCell<u64,>,
}

impl<'cfg, S,> StatsAggregator<'cfg, S,>
where
    S: StatsSource,
{
    pub fn new(source: S, config: &'cfg RenderConfig,) -> Self
    {
        Self {
            source,
            config,
            overview: OnceCell::new(),
            contributions: OnceCell::new(),
            lines_changed: OnceCell::new(),
            views: OnceCell::new(),
        }
    }

    /// Paginated repository overview, fetched once.
    pub async fn overview(&self,) -> Result<&RepositoryOverview, Error,>
    {
        self.overview.get_or_try_init(|| self.fetch_overview(),).await
    }

    /// Display name of the account, falling back to the login.
    pub async fn name(&self,) -> Result<&str, Error,>
    {
        Ok(self.overview().await?.name.as_str(),)
    }

    pub async fn stargazer_count(&self,) -> Result<u64, Error,>
    {
        Ok(self.overview().await?.stargazer_count,)
    }

    pub async fn fork_count(&self,) -> Result<u64, Error,>
    {
        Ok(self.overview().await?.fork_count,)
    }

    /// Repositories considered for every aggregate.
    pub async fn repos(&self,) -> Result<&[ConsideredRepository], Error,>
    {
        Ok(self.overview().await?.repositories.as_slice(),)
    }

    /// Language proportions across considered repositories.
    pub async fn languages(&self,) -> Result<&LanguageBreakdown, Error,>
    {
        Ok(&self.overview().await?.languages,)
    }

    /// Contribution calendar totals summed over every year with history.
    pub async fn total_contributions(&self,) -> Result<u64, Error,>
    {
        self.contributions.get_or_try_init(|| self.fetch_contributions(),).await.copied()
    }

    /// Lines added and deleted by the account across considered repositories.
    pub async fn lines_changed(&self,) -> Result<LinesChanged, Error,>
    {
        self.lines_changed.get_or_try_init(|| self.fetch_lines_changed(),).await.copied()
    }

    /// Traffic views of owned repositories over the trailing 14 days.
    pub async fn views(&self,) -> Result<u64, Error,>
    {
        self.views.get_or_try_init(|| self.fetch_views(),).await.copied()
    }

    /// Collects every scalar statistic, fetching concurrently.
    pub async fn account_stats(&self,) -> Result<AccountStats, Error,>
    {
        let (overview, total_contributions, lines, view_count,) = tokio::try_join!(
            self.overview(),
            self.total_contributions(),
            self.lines_changed(),
            self.views()
        )?;

        Ok(AccountStats {
            name: overview.name.clone(),
            stargazer_count: overview.stargazer_count,
            fork_count: overview.fork_count,
            total_contributions,
            lines_added: lines.additions,
            lines_deleted: lines.deletions,
            view_count,
            repository_count: overview.repositories.len(),
        },)
    }

    async fn fetch_overview(&self,) -> Result<RepositoryOverview, Error,>
    {
        let mut accumulator = OverviewAccumulator::new(self.config,);
        let mut owned_cursor: Option<String,> = None;
        let mut contributed_cursor: Option<String,> = None;

        loop {
            let page = self
                .source
                .overview_page(owned_cursor.as_deref(), contributed_cursor.as_deref(),)
                .await?;

            accumulator.set_name(page.name.as_deref(), page.login.as_deref(),);
            accumulator.absorb(&page.owned.nodes, true,);
            accumulator.absorb(&page.contributed.nodes, false,);

            let owned_next = next_cursor(&page.owned.page_info, "repositories",)?;
            let contributed_next = next_cursor(&page.contributed.page_info, "repositoriesContributedTo",)?;
            if owned_next.is_none() && contributed_next.is_none() {
                break;
            }

            if let Some(cursor,) = page.owned.page_info.end_cursor {
                owned_cursor = Some(cursor,);
            }
            if let Some(cursor,) = page.contributed.page_info.end_cursor {
                contributed_cursor = Some(cursor,);
            }
        }

        let overview = accumulator.finish();
        info!(
            "Considered {} repositories with {} languages for {}",
            overview.repositories.len(),
            overview.languages.len(),
            overview.name
        );
        Ok(overview,)
    }

    async fn fetch_contributions(&self,) -> Result<u64, Error,>
    {
        let years = self.source.contribution_years().await?;
        debug!("Fetching contribution calendars for {} years", years.len());
        let totals = self.source.contributions_by_year(&years,).await?;
        Ok(totals.into_iter().fold(0u64, u64::saturating_add,),)
    }

    async fn fetch_lines_changed(&self,) -> Result<LinesChanged, Error,>
    {
        let mut lines = LinesChanged::default();

        for repository in self.repos().await? {
            let contributors = self.source.contributor_stats(&repository.name_with_owner,).await?;
            let authored = contributors.iter().filter(|entry| {
                entry
                    .author
                    .as_ref()
                    .is_some_and(|author| author.login.eq_ignore_ascii_case(self.config.user(),),)
            },);

            for entry in authored {
                for week in &entry.weeks {
                    lines.additions = lines.additions.saturating_add(week.a,);
                    lines.deletions = lines.deletions.saturating_add(week.d,);
                }
            }
        }

        debug!("Lines changed: +{} -{}", lines.additions, lines.deletions);
        Ok(lines,)
    }

    async fn fetch_views(&self,) -> Result<u64, Error,>
    {
        let mut total = 0u64;

        for repository in self.repos().await?.iter().filter(|repository| repository.owned,) {
            let traffic = self.source.traffic_views(&repository.name_with_owner,).await?;
            total = traffic.views.iter().fold(total, |sum, view| sum.saturating_add(view.count,),);
        }

        Ok(total,)
    }
}

fn next_cursor<'page,>(page_info: &'page PageInfo, connection: &str,) -> Result<Option<&'page str,>, Error,>
{
    if !page_info.has_next_page {
        return Ok(None,);
    }
    match page_info.end_cursor.as_deref() {
        Some(cursor,) => Ok(Some(cursor,),),
        None => Err(Error::remote(format!("{connection} reports another page but no endCursor"),),),
    }
}

/// Folds overview pages into a [`RepositoryOverview`].
struct OverviewAccumulator<'cfg,>
{
    config:       &'cfg RenderConfig,
    name:         Option<String,>,
    seen:         HashSet<String,>,
    overview:     RepositoryOverview,
    languages:    LanguageTally,
}

impl<'cfg,> OverviewAccumulator<'cfg,>
{
    fn new(config: &'cfg RenderConfig,) -> Self
    {
        Self {
            config,
            name: None,
            seen: HashSet::new(),
            overview: RepositoryOverview::default(),
            languages: LanguageTally::default(),
        }
    }

    fn set_name(&mut self, name: Option<&str,>, login: Option<&str,>,)
    {
        if self.name.is_none() {
            let present = |value: &&str| !value.trim().is_empty();
            self.name = name.filter(present,).or(login.filter(present,),).map(str::to_owned,);
        }
    }

    fn absorb(&mut self, nodes: &[Option<RepositoryNode,>], owned: bool,)
    {
        for repository in nodes.iter().flatten() {
            let name = repository.name_with_owner.as_str();
            if self.seen.contains(name,) || self.config.is_repository_excluded(name,) {
                continue;
            }
            if repository.is_fork && self.config.exclude_forked_repos() {
                debug!("Skipping fork {}", name);
                continue;
            }

            self.seen.insert(name.to_owned(),);
            self.overview.repositories.push(ConsideredRepository {
                name_with_owner: name.to_owned(),
                owned,
            },);
            self.overview.stargazer_count =
                self.overview.stargazer_count.saturating_add(repository.stargazers.total_count,);
            self.overview.fork_count = self.overview.fork_count.saturating_add(repository.fork_count,);

            for edge in &repository.languages.edges {
                if self.config.is_language_excluded(&edge.node.name,) {
                    continue;
                }
                self.languages.add(&edge.node.name, edge.size, edge.node.color.as_deref(),);
            }
        }
    }

    fn finish(self,) -> RepositoryOverview
    {
        RepositoryOverview {
            name: self.name.unwrap_or_else(|| FALLBACK_NAME.to_owned(),),
            languages: self.languages.finish(),
            ..self.overview
        }
    }
}
