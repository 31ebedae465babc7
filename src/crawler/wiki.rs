//! Encyclopedia content and discovery APIs
//!
//! Every call goes through the shared [`Fetcher`], so each page of a listing
//! and each summary costs one limiter grant.
//!
//! Discovery calls (category listing, random sampling, top-viewed ranking)
//! degrade to an empty result on failure; the caller decides what an empty
//! answer means (see `FreshnessCache`).

use chrono::NaiveDate;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;

use crate::config::WikiConfig;
use crate::crawler::fetcher::Fetcher;
use crate::crawler::log_fetch_failure;
use crate::models::PageSummary;
use crate::utils::encode_page_title;
use crate::utils::error::FetchError;

/// Page size requested from the category listing
const CATEGORY_PAGE_SIZE: &str = "500";

/// Client for one language edition
#[derive(Clone)]
pub struct WikiClient {
    fetcher: Fetcher,
    site_base: String,
    metrics_base: String,
    project: String,
}

#[derive(Debug, Default, Deserialize)]
struct TitleRecord {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CategoryQuery {
    #[serde(default)]
    categorymembers: Vec<TitleRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct CategoryContinue {
    #[serde(default)]
    cmcontinue: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct CategoryResponse {
    #[serde(default)]
    query: Option<CategoryQuery>,
    #[serde(rename = "continue", default)]
    cont: Option<CategoryContinue>,
}

#[derive(Debug, Default, Deserialize)]
struct RandomQuery {
    #[serde(default)]
    random: Vec<TitleRecord>,
}

#[derive(Debug, Default, Deserialize)]
struct RandomResponse {
    #[serde(default)]
    query: Option<RandomQuery>,
}

#[derive(Debug, Default, Deserialize)]
struct RankedArticle {
    #[serde(default)]
    article: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RankingDay {
    #[serde(default)]
    articles: Vec<RankedArticle>,
}

#[derive(Debug, Default, Deserialize)]
struct RankingResponse {
    #[serde(default)]
    items: Vec<RankingDay>,
}

/// Position in a paginated category listing
enum Cursor {
    Start,
    Continue(String),
    Done,
}

fn titles(records: Vec<TitleRecord>) -> Vec<String> {
    records
        .into_iter()
        .filter_map(|r| r.title)
        .filter(|t| !t.is_empty())
        .collect()
}

impl WikiClient {
    /// Create a client for the language edition described by `config`
    pub fn new(fetcher: Fetcher, config: &WikiConfig) -> Self {
        Self {
            fetcher,
            site_base: config.site_base().trim_end_matches('/').to_string(),
            metrics_base: config.metrics_base().trim_end_matches('/').to_string(),
            project: config.project(),
        }
    }

    fn api_url(&self) -> String {
        format!("{}/w/api.php", self.site_base)
    }

    /// Public page URL for a title
    pub fn page_url(&self, title: &str) -> String {
        format!("{}/wiki/{}", self.site_base, encode_page_title(title))
    }

    /// REST summary URL for a title; the whole title is percent-encoded
    pub fn summary_url(&self, title: &str) -> String {
        format!(
            "{}/api/rest_v1/page/summary/{}",
            self.site_base,
            urlencoding::encode(title)
        )
    }

    /// Lazily list the members of a category, one page of titles per item.
    ///
    /// Each poll that needs a new page issues one request. The stream ends
    /// when the API stops returning a continuation token or a request fails.
    /// Calling this again starts a fresh listing.
    pub fn category_pages<'a>(&'a self, category: &str) -> impl Stream<Item = Vec<String>> + 'a {
        let cmtitle = format!("Category:{category}");

        stream::unfold(Cursor::Start, move |cursor| {
            let cmtitle = cmtitle.clone();
            async move {
                let token = match cursor {
                    Cursor::Done => return None,
                    Cursor::Start => None,
                    Cursor::Continue(token) => Some(token),
                };

                let mut query = vec![
                    ("action", "query"),
                    ("list", "categorymembers"),
                    ("cmtitle", cmtitle.as_str()),
                    ("cmnamespace", "0"),
                    ("cmlimit", CATEGORY_PAGE_SIZE),
                    ("format", "json"),
                ];
                if let Some(token) = token.as_deref() {
                    query.push(("cmcontinue", token));
                }

                match self.fetcher.get_json::<CategoryResponse>(&self.api_url(), &query).await {
                    Ok(response) => {
                        let next = response
                            .cont
                            .and_then(|c| c.cmcontinue)
                            .filter(|t| !t.is_empty())
                            .map(Cursor::Continue)
                            .unwrap_or(Cursor::Done);
                        let page = titles(response.query.unwrap_or_default().categorymembers);
                        Some((page, next))
                    }
                    Err(e) => {
                        log_fetch_failure("category", &cmtitle, &e);
                        None
                    }
                }
            }
        })
    }

    /// Collect up to `limit` titles from a category
    pub async fn category_titles(&self, category: &str, limit: usize) -> Vec<String> {
        let mut pages = std::pin::pin!(self.category_pages(category));
        let mut collected = Vec::new();

        while let Some(page) = pages.next().await {
            for title in page {
                collected.push(title);
                if collected.len() >= limit {
                    return collected;
                }
            }
        }

        collected
    }

    /// Ask for `n` random main-namespace titles
    pub async fn random_titles(&self, n: usize) -> Vec<String> {
        if n == 0 {
            return Vec::new();
        }

        let limit = n.to_string();
        let query = [
            ("action", "query"),
            ("list", "random"),
            ("rnnamespace", "0"),
            ("rnlimit", limit.as_str()),
            ("format", "json"),
        ];

        match self.fetcher.get_json::<RandomResponse>(&self.api_url(), &query).await {
            Ok(response) => titles(response.query.unwrap_or_default().random),
            Err(e) => {
                log_fetch_failure("random", &self.project, &e);
                Vec::new()
            }
        }
    }

    /// Most viewed main-namespace titles for `day`
    ///
    /// Underscores become spaces; titles with a namespace prefix (`:`) are
    /// dropped.
    pub async fn top_viewed(&self, day: NaiveDate) -> Vec<String> {
        let url = format!(
            "{}/metrics/pageviews/top/{}/all-access/{}",
            self.metrics_base,
            self.project,
            day.format("%Y/%m/%d")
        );

        match self.fetcher.get_json::<RankingResponse>(&url, &[]).await {
            Ok(response) => response
                .items
                .into_iter()
                .next()
                .map(|day| day.articles)
                .unwrap_or_default()
                .into_iter()
                .filter_map(|a| a.article)
                .map(|t| t.replace('_', " "))
                .filter(|t| !t.is_empty() && !t.contains(':'))
                .collect(),
            Err(e) => {
                log_fetch_failure("topview", &url, &e);
                Vec::new()
            }
        }
    }

    /// Fetch the summary record of one page
    ///
    /// # Errors
    ///
    /// Any [`FetchError`] from the underlying request.
    pub async fn page_summary(&self, title: &str) -> Result<PageSummary, FetchError> {
        self.fetcher.get_json(&self.summary_url(title), &[]).await
    }
}
