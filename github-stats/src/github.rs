// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// GitHub API client backing [`StatsSource`].
///
/// GraphQL is used for account-level data (repositories, languages,
/// contribution calendars); REST is used for per-repository statistics and
/// traffic. Failures are never retried. The only repeated request is the
/// poll on `202 Accepted`, which GitHub returns while it computes statistics.
use std::{collections::BTreeMap, time::Duration};

use octocrab::Octocrab;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::{
    config::RenderConfig,
    error::Error,
    source::{ContributorStats, OverviewPage, StatsSource, TrafficViews},
};

const PENDING_POLL_INTERVAL: Duration = Duration::from_secs(2,);
const PENDING_POLL_LIMIT: u32 = 60;

const OVERVIEW_QUERY: &str = r#"
query($ownedCursor: String, $contributedCursor: String) {
  viewer {
    login
    name
    repositories(
        first: 100,
        orderBy: {field: UPDATED_AT, direction: DESC},
        ownerAffiliations: OWNER,
        after: $ownedCursor
    ) {
      ...RepositoryPage
    }
    repositoriesContributedTo(
        first: 100,
        includeUserRepositories: false,
        orderBy: {field: UPDATED_AT, direction: DESC},
        contributionTypes: [COMMIT, PULL_REQUEST, REPOSITORY, PULL_REQUEST_REVIEW],
        after: $contributedCursor
    ) {
      ...RepositoryPage
    }
  }
}

fragment RepositoryPage on RepositoryConnection {
  pageInfo {
    hasNextPage
    endCursor
  }
  nodes {
    nameWithOwner
    isFork
    stargazers {
      totalCount
    }
    forkCount
    languages(first: 10, orderBy: {field: SIZE, direction: DESC}) {
      edges {
        size
        node {
          name
          color
        }
      }
    }
  }
}
"#;

const CONTRIBUTION_YEARS_QUERY: &str = r#"
query {
  viewer {
    contributionsCollection {
      contributionYears
    }
  }
}
"#;

/// Authenticated GitHub client for one account.
#[derive(Clone,)]
pub struct GithubClient
{
    octocrab: Octocrab,
}

impl GithubClient
{
    /// Builds a client authenticated with the configured personal access
    /// token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::RemoteQuery`] when the HTTP client cannot be built.
    pub fn new(config: &RenderConfig,) -> Result<Self, Error,>
    {
        let octocrab = Octocrab::builder()
            .personal_token(config.access_token(),)
            .build()
            .map_err(|e| Error::remote(format!("failed to initialize GitHub client: {e}"),),)?;

        Ok(Self {
            octocrab,
        },)
    }

    async fn graphql(&self, query: &str, variables: Value,) -> Result<Value, Error,>
    {
        let payload = json!({ "query": query, "variables": variables });
        let response: Value = self.octocrab.graphql(&payload,).await?;
        ensure_no_graphql_errors(&response,)?;
        Ok(response,)
    }

    /// GETs a REST path, polling while GitHub answers `202 Accepted`.
    ///
    /// `204 No Content` and an exhausted poll both yield `T::default()`.
    async fn rest<T,>(&self, path: &str,) -> Result<T, Error,>
    where
        T: DeserializeOwned + Default,
    {
        for attempt in 1..=PENDING_POLL_LIMIT {
            let response = self.octocrab._get(path,).await?;
            let status = response.status().as_u16();

            if status == 202 {
                debug!("{} is still being computed (poll {}/{})", path, attempt, PENDING_POLL_LIMIT);
                sleep(PENDING_POLL_INTERVAL,).await;
                continue;
            }

            if status == 204 {
                return Ok(T::default(),);
            }

            let body = self.octocrab.body_to_string(response,).await?;
            if !(200..300).contains(&status,) {
                return Err(Error::remote(format!("GET {path} returned HTTP {status}: {body}"),),);
            }

            return decode_body(&body,);
        }

        warn!("{} stayed pending after {} polls; its data will be incomplete", path, PENDING_POLL_LIMIT);
        Ok(T::default(),)
    }
}

impl StatsSource for GithubClient
{
    async fn overview_page(
        &self,
        owned_cursor: Option<&str,>,
        contributed_cursor: Option<&str,>,
    ) -> Result<OverviewPage, Error,>
    {
        debug!("Fetching repository overview page");
        let variables = json!({
            "ownedCursor": owned_cursor,
            "contributedCursor": contributed_cursor,
        });
        let response = self.graphql(OVERVIEW_QUERY, variables,).await?;
        Ok(serde_json::from_value(viewer(response,)?,)?,)
    }

    async fn contribution_years(&self,) -> Result<Vec<i32,>, Error,>
    {
        #[derive(Deserialize,)]
        struct Viewer
        {
            #[serde(rename = "contributionsCollection")]
            contributions_collection: Collection,
        }
        #[derive(Deserialize,)]
        struct Collection
        {
            #[serde(rename = "contributionYears", default)]
            contribution_years: Vec<i32,>,
        }

        let response = self.graphql(CONTRIBUTION_YEARS_QUERY, Value::Null,).await?;
        let parsed: Viewer = serde_json::from_value(viewer(response,)?,)?;
        Ok(parsed.contributions_collection.contribution_years,)
    }

    async fn contributions_by_year(&self, years: &[i32],) -> Result<Vec<u64,>, Error,>
    {
        if years.is_empty() {
            return Ok(Vec::new(),);
        }

        let response = self.graphql(&contributions_query(years,), Value::Null,).await?;
        parse_contributions_by_year(viewer(response,)?,)
    }

    async fn contributor_stats(&self, name_with_owner: &str,) -> Result<Vec<ContributorStats,>, Error,>
    {
        self.rest(&format!("/repos/{name_with_owner}/stats/contributors"),).await
    }

    async fn traffic_views(&self, name_with_owner: &str,) -> Result<TrafficViews, Error,>
    {
        self.rest(&format!("/repos/{name_with_owner}/traffic/views"),).await
    }
}

fn ensure_no_graphql_errors(response: &Value,) -> Result<(), Error,>
{
    match response.get("errors",) {
        Some(errors,) if !errors.is_null() => {
            Err(Error::remote(format!("GraphQL reported errors: {errors}"),),)
        }
        _ => Ok((),),
    }
}

fn viewer(mut response: Value,) -> Result<Value, Error,>
{
    match response.pointer_mut("/data/viewer",) {
        Some(viewer,) if !viewer.is_null() => Ok(viewer.take(),),
        _ => Err(Error::remote("GraphQL response is missing data.viewer",),),
    }
}

fn decode_body<T,>(body: &str,) -> Result<T, Error,>
where
    T: DeserializeOwned + Default,
{
    if body.trim().is_empty() {
        return Ok(T::default(),);
    }
    Ok(serde_json::from_str(body,)?,)
}

/// Builds one aliased query fetching the contribution calendar of every year.
fn contributions_query(years: &[i32],) -> String
{
    let mut query = String::from("query {\n  viewer {\n",);
    for year in years {
        let next = year + 1;
        query.push_str(&format!(
            "    year{year}: contributionsCollection(from: \"{year}-01-01T00:00:00Z\", to: \"{next}-01-01T00:00:00Z\") {{\n      contributionCalendar {{\n        totalContributions\n      }}\n    }}\n"
        ),);
    }
    query.push_str("  }\n}\n",);
    query
}

fn parse_contributions_by_year(viewer: Value,) -> Result<Vec<u64,>, Error,>
{
    #[derive(Deserialize,)]
    struct YearCollection
    {
        #[serde(rename = "contributionCalendar")]
        contribution_calendar: Calendar,
    }
    #[derive(Deserialize,)]
    struct Calendar
    {
        #[serde(rename = "totalContributions", default)]
        total_contributions: u64,
    }

    let by_year: BTreeMap<String, YearCollection,> = serde_json::from_value(viewer,)?;
    Ok(by_year.into_values().map(|year| year.contribution_calendar.total_contributions,).collect(),)
}
