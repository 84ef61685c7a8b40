// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Remote data source abstraction and the payload shapes it returns.
///
/// [`StatsSource`] is the seam between the aggregator and the network. The
/// production implementation is [`crate::GithubClient`]; tests use in-memory
/// fakes.
use std::future::Future;

use serde::Deserialize;

use crate::error::Error;

/// `totalCount` wrapper used by GraphQL connections.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct CountObj
{
    #[serde(rename = "totalCount", default)]
    pub total_count: u64,
}

/// Cursor state of a GraphQL connection.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct PageInfo
{
    #[serde(rename = "hasNextPage", default)]
    pub has_next_page: bool,
    #[serde(rename = "endCursor")]
    pub end_cursor:    Option<String,>,
}

/// Language node attached to a repository language edge.
#[derive(Debug, Clone, Deserialize,)]
pub struct LanguageNode
{
    pub name:  String,
    pub color: Option<String,>,
}

/// One `languages.edges` entry: bytes of a language in a repository.
#[derive(Debug, Clone, Deserialize,)]
pub struct LanguageEdge
{
    #[serde(default)]
    pub size: u64,
    pub node: LanguageNode,
}

#[derive(Debug, Clone, Default, Deserialize,)]
pub struct LanguageConnection
{
    #[serde(default)]
    pub edges: Vec<LanguageEdge,>,
}

/// Repository node returned by the overview query.
#[derive(Debug, Clone, Deserialize,)]
pub struct RepositoryNode
{
    #[serde(rename = "nameWithOwner")]
    pub name_with_owner: String,
    #[serde(rename = "isFork", default)]
    pub is_fork:         bool,
    #[serde(default)]
    pub stargazers:      CountObj,
    #[serde(rename = "forkCount", default)]
    pub fork_count:      u64,
    #[serde(default)]
    pub languages:       LanguageConnection,
}

/// One page of a repository connection. Null nodes are tolerated.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct RepositoryConnection
{
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
    #[serde(default)]
    pub nodes:     Vec<Option<RepositoryNode,>,>,
}

/// One page of the overview query covering owned and contributed
/// repositories at once.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct OverviewPage
{
    pub login:       Option<String,>,
    pub name:        Option<String,>,
    #[serde(rename = "repositories", default)]
    pub owned:       RepositoryConnection,
    #[serde(rename = "repositoriesContributedTo", default)]
    pub contributed: RepositoryConnection,
}

/// Weekly additions and deletions of one contributor.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct WeeklyStats
{
    #[serde(default)]
    pub a: u64,
    #[serde(default)]
    pub d: u64,
}

#[derive(Debug, Clone, Deserialize,)]
pub struct Author
{
    #[serde(default)]
    pub login: String,
}

/// Entry of `/repos/{repo}/stats/contributors`.
#[derive(Debug, Clone, Deserialize,)]
pub struct ContributorStats
{
    pub author: Option<Author,>,
    #[serde(default)]
    pub weeks:  Vec<WeeklyStats,>,
}

#[derive(Debug, Clone, Default, Deserialize,)]
pub struct ViewCount
{
    #[serde(default)]
    pub count: u64,
}

/// Body of `/repos/{repo}/traffic/views`; covers the trailing 14 days.
#[derive(Debug, Clone, Default, Deserialize,)]
pub struct TrafficViews
{
    #[serde(default)]
    pub views: Vec<ViewCount,>,
}

/// Query surface required by [`crate::StatsAggregator`].
///
/// Every method maps one logical remote query. Implementations report any
/// transport or payload failure as [`Error::RemoteQuery`].
pub trait StatsSource
{
    /// Fetches one page of owned and contributed repositories. `None` cursors
    /// request the first page of the respective connection.
    fn overview_page(
        &self,
        owned_cursor: Option<&str,>,
        contributed_cursor: Option<&str,>,
    ) -> impl Future<Output = Result<OverviewPage, Error,>,>;

    /// Years in which the viewer has contribution history.
    fn contribution_years(&self,) -> impl Future<Output = Result<Vec<i32,>, Error,>,>;

    /// Contribution calendar totals, one entry per requested year.
    fn contributions_by_year(
        &self,
        years: &[i32],
    ) -> impl Future<Output = Result<Vec<u64,>, Error,>,>;

    /// Per-contributor weekly statistics of a repository. An empty vector
    /// means the statistics are not available.
    fn contributor_stats(
        &self,
        name_with_owner: &str,
    ) -> impl Future<Output = Result<Vec<ContributorStats,>, Error,>,>;

    /// Traffic views of a repository.
    fn traffic_views(
        &self,
        name_with_owner: &str,
    ) -> impl Future<Output = Result<TrafficViews, Error,>,>;
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn overview_page_tolerates_null_nodes_and_missing_fields()
    {
        let json = serde_json::json!({
            "login": "octocat",
            "name": null,
            "repositories": {
                "pageInfo": { "hasNextPage": true, "endCursor": "abc" },
                "nodes": [
                    null,
                    {
                        "nameWithOwner": "octocat/hello",
                        "isFork": false,
                        "stargazers": { "totalCount": 3 },
                        "forkCount": 1,
                        "languages": { "edges": [
                            { "size": 10, "node": { "name": "Rust", "color": "#dea584" } },
                            { "size": 4, "node": { "name": "Nix", "color": null } }
                        ] }
                    }
                ]
            }
        });

        let page: OverviewPage = serde_json::from_value(json,).expect("valid page",);
        assert_eq!(page.login.as_deref(), Some("octocat"));
        assert!(page.name.is_none());
        assert!(page.owned.page_info.has_next_page);
        assert_eq!(page.owned.page_info.end_cursor.as_deref(), Some("abc"));
        assert_eq!(page.owned.nodes.len(), 2);
        assert!(page.contributed.nodes.is_empty());
        assert!(!page.contributed.page_info.has_next_page);

        let repo = page.owned.nodes[1].as_ref().expect("repository node",);
        assert_eq!(repo.stargazers.total_count, 3);
        assert_eq!(repo.languages.edges[1].node.color, None);
    }

    #[test]
    fn contributor_stats_accepts_missing_author()
    {
        let json = r#"[{"author": null, "weeks": [{"w": 1, "a": 5, "d": 2, "c": 1}]}]"#;
        let stats: Vec<ContributorStats,> = serde_json::from_str(json,).expect("valid stats",);
        assert!(stats[0].author.is_none());
        assert_eq!(stats[0].weeks[0].a, 5);
    }

    #[test]
    fn traffic_views_ignores_extra_fields()
    {
        let json = r#"{"count": 7, "uniques": 2, "views": [{"timestamp": "x", "count": 4, "uniques": 1}]}"#;
        let views: TrafficViews = serde_json::from_str(json,).expect("valid views",);
        assert_eq!(views.views.len(), 1);
        assert_eq!(views.views[0].count, 4);
    }
}
