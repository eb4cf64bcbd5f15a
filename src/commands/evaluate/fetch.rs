use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use tracing::{debug, info};

use crate::model::RawComment;

pub const DEFAULT_PAGE_SIZE: usize = 100;
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(500);

/// A paginated, read-only comment feed.
pub trait CommentSource {
    fn fetch_page(&self, resource_id: &str, offset: usize, limit: usize)
    -> Result<Vec<RawComment>>;
}

#[derive(Debug, Clone, Copy)]
pub struct FetchOptions {
    pub page_size: usize,
    pub page_delay: Duration,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct FetchedComments {
    pub comments: Vec<RawComment>,
    pub pages_requested: usize,
}

/// Requests pages until one comes back shorter than `page_size`. Any failed
/// page aborts the whole fetch.
pub fn fetch_all(
    source: &dyn CommentSource,
    resource_id: &str,
    options: &FetchOptions,
) -> Result<FetchedComments> {
    let page_size = options.page_size;
    if page_size == 0 {
        bail!("page size must be at least 1");
    }
    let mut fetched = FetchedComments::default();
    let mut offset = 0usize;

    loop {
        let page = source
            .fetch_page(resource_id, offset, page_size)
            .with_context(|| format!("failed to fetch comment page at offset {offset}"))?;
        fetched.pages_requested += 1;

        let page_len = page.len();
        fetched.comments.extend(page);
        debug!(offset, page_len, total = fetched.comments.len(), "comment page fetched");

        if page_len < page_size {
            break;
        }

        offset += page_size;
        if !options.page_delay.is_zero() {
            thread::sleep(options.page_delay);
        }
    }

    info!(
        resource_id,
        pages = fetched.pages_requested,
        comments = fetched.comments.len(),
        "comment fetch completed"
    );

    Ok(fetched)
}

/// Daum movie comment API.
pub struct DaumCommentSource {
    client: Client,
    base_url: String,
}

impl DaumCommentSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build comment source http client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn comments_url(&self, resource_id: &str) -> String {
        format!("{}/apis/v1/posts/{}/comments", self.base_url, resource_id)
    }
}

impl CommentSource for DaumCommentSource {
    fn fetch_page(
        &self,
        resource_id: &str,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<RawComment>> {
        let url = self.comments_url(resource_id);
        let offset = offset.to_string();
        let limit = limit.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("parentId", "0"),
                ("offset", offset.as_str()),
                ("limit", limit.as_str()),
                ("sort", "LATEST"),
                ("isInitial", "false"),
                ("hasNext", "true"),
            ])
            .send()
            .with_context(|| format!("request to {url} failed"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("comment source {url} answered with status {status}");
        }

        response
            .json::<Vec<RawComment>>()
            .with_context(|| format!("failed to decode comment page from {url}"))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::DaumCommentSource;

    #[test]
    fn comments_url_trims_trailing_slash() {
        let source = DaumCommentSource::new("https://comment.daum.net/", Duration::from_secs(1))
            .expect("client should build");
        assert_eq!(
            source.comments_url("149662594"),
            "https://comment.daum.net/apis/v1/posts/149662594/comments"
        );
    }
}
