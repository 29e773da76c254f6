use std::collections::{HashSet, VecDeque};
use std::time::Duration;

use log::{debug, info, warn};
use percent_encoding::percent_decode_str;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue};
use scraper::{Html, Selector};

use super::{target_domain, title_from_url, vendor_for};
use crate::config::WebSearchConfig;
use crate::error::WebError;
use crate::traits::{Document, WebResults, WebSearch};

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:109.0) Gecko/20100101 Firefox/119.0";

/// Searches vendor application-note libraries through the DuckDuckGo HTML
/// endpoint, one `site:`-filtered request per vendor.
///
/// Results are produced lazily: a site is only queried once every candidate
/// from the previous one has been consumed, with a randomized pause between
/// requests to stay clear of rate limiting.
pub struct DuckDuckGoSearch {
    client: Result<Client, String>,
    config: WebSearchConfig,
}

impl DuckDuckGoSearch {
    pub fn new(config: WebSearchConfig) -> Self {
        let client = build_client(&config).map_err(|e| {
            warn!("{}", e);
            e.to_string()
        });
        DuckDuckGoSearch { client, config }
    }
}

impl Default for DuckDuckGoSearch {
    fn default() -> Self {
        Self::new(WebSearchConfig::default())
    }
}

fn build_client(config: &WebSearchConfig) -> Result<Client, WebError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));
    headers.insert("DNT", HeaderValue::from_static("1"));
    headers.insert("Upgrade-Insecure-Requests", HeaderValue::from_static("1"));

    Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(WebError::Client)
}

impl WebSearch for DuckDuckGoSearch {
    fn search(&self, query: &str, max_results: usize) -> WebResults {
        let client = match &self.client {
            Ok(client) => client.clone(),
            Err(message) => {
                return Box::new(std::iter::once(Document::error_sentinel(message.clone())));
            }
        };
        if self.config.sites.is_empty() {
            return Box::new(std::iter::once(Document::error_sentinel(
                WebError::NoSites.to_string(),
            )));
        }

        let mut rng = StdRng::from_entropy();
        let mut sites = self.config.sites.clone();
        if self.config.shuffle_sites {
            sites.shuffle(&mut rng);
        }
        info!(
            "Web search for '{}' across {} sites (max {} results)",
            query,
            sites.len(),
            max_results
        );

        Box::new(SiteResults {
            client,
            config: self.config.clone(),
            query: query.to_string(),
            sites: sites.into(),
            pending: VecDeque::new(),
            collected: HashSet::new(),
            max_results,
            produced: 0,
            succeeded_sites: 0,
            last_error: None,
            pause: None,
            rng,
            finished: false,
        })
    }
}

/// One hit scraped from a results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawHit {
    pub title: String,
    pub url: String,
}

/// Extracts result links from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str) -> Vec<RawHit> {
    let doc = Html::parse_document(html);
    let (Ok(result_sel), Ok(link_sel)) =
        (Selector::parse(".result"), Selector::parse("a.result__a"))
    else {
        return Vec::new();
    };

    doc.select(&result_sel)
        .filter_map(|result| {
            let link = result.select(&link_sel).next()?;
            let href = link.value().attr("href")?;
            let url = extract_ddg_url(href);
            if !url.starts_with("http") {
                return None;
            }
            let title = link.text().collect::<String>().trim().to_string();
            Some(RawHit { title, url })
        })
        .collect()
}

/// DDG wraps result URLs in redirect links like
/// `//duckduckgo.com/l/?uddg=https%3A%2F%2Fexample.com&rut=...`.
fn extract_ddg_url(href: &str) -> String {
    if let Some(pos) = href.find("uddg=") {
        let start = pos + 5;
        let end = href[start..]
            .find('&')
            .map(|i| start + i)
            .unwrap_or(href.len());
        let encoded = &href[start..end];
        if !encoded.is_empty() {
            return percent_decode_str(encoded).decode_utf8_lossy().into_owned();
        }
    }
    href.to_string()
}

/// Keeps the hits that belong to `domain` and were not collected yet, at most
/// `limit` of them, and turns them into web documents.
fn select_hits(
    hits: Vec<RawHit>,
    domain: &str,
    limit: usize,
    collected: &mut HashSet<String>,
) -> Vec<Document> {
    let mut docs = Vec::new();
    for hit in hits {
        if docs.len() >= limit {
            break;
        }
        if !hit.url.contains(domain) || collected.contains(&hit.url) {
            continue;
        }
        let title = if hit.title.is_empty() {
            title_from_url(&hit.url)
        } else {
            hit.title
        };
        collected.insert(hit.url.clone());
        docs.push(Document::web(vendor_for(&hit.url), &title, &hit.url, domain));
    }
    docs
}

struct SiteResults {
    client: Client,
    config: WebSearchConfig,
    query: String,
    sites: VecDeque<String>,
    pending: VecDeque<Document>,
    collected: HashSet<String>,
    max_results: usize,
    produced: usize,
    succeeded_sites: usize,
    last_error: Option<String>,
    /// Pause owed before the next request, chosen by the previous outcome.
    pause: Option<Duration>,
    rng: StdRng,
    finished: bool,
}

impl SiteResults {
    fn fetch_site(&self, site: &str) -> Result<Vec<RawHit>, WebError> {
        let full_query = format!("\"{}\" filetype:pdf {}", self.query, site);
        let resp = self
            .client
            .post(&self.config.endpoint)
            .form(&[("q", full_query.as_str())])
            .send()
            .map_err(|source| WebError::Request {
                target: site.to_string(),
                source,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(WebError::Status {
                target: site.to_string(),
                status,
            });
        }
        let body = resp.text().map_err(|source| WebError::Request {
            target: site.to_string(),
            source,
        })?;
        Ok(parse_results(&body))
    }

    fn visit(&mut self, site: &str) {
        if let Some(pause) = self.pause.take() {
            debug!("Pausing {:.1}s before the next request", pause.as_secs_f64());
            std::thread::sleep(pause);
        }

        let domain = target_domain(site).to_string();
        info!("Searching DuckDuckGo (target: {})", domain);
        match self.fetch_site(site) {
            Ok(hits) if hits.is_empty() => {
                debug!("No results from {}", domain);
                self.succeeded_sites += 1;
                self.pause = Some(self.config.empty_delay.sample(&mut self.rng));
            }
            Ok(hits) => {
                self.succeeded_sites += 1;
                let remaining = self
                    .max_results
                    .saturating_sub(self.produced + self.pending.len());
                let limit = self.config.per_site.min(remaining);
                let docs = select_hits(hits, &domain, limit, &mut self.collected);
                debug!("{} new results from {}", docs.len(), domain);
                self.pending.extend(docs);
                self.pause = Some(self.config.delay.sample(&mut self.rng));
            }
            Err(e) => {
                warn!("Web search on {} failed: {}", domain, e);
                self.last_error = Some(e.to_string());
                self.pause = Some(self.config.error_delay.sample(&mut self.rng));
            }
        }
    }
}

impl Iterator for SiteResults {
    type Item = Document;

    fn next(&mut self) -> Option<Document> {
        loop {
            if self.finished || self.produced >= self.max_results {
                if self.produced >= self.max_results && !self.finished {
                    info!("Reached the limit of {} web results", self.max_results);
                }
                self.finished = true;
                return None;
            }
            if let Some(doc) = self.pending.pop_front() {
                self.produced += 1;
                return Some(doc);
            }
            let Some(site) = self.sites.pop_front() else {
                self.finished = true;
                if self.succeeded_sites == 0 && self.produced == 0 {
                    if let Some(message) = self.last_error.take() {
                        return Some(Document::error_sentinel(format!(
                            "Web search unavailable: {}",
                            message
                        )));
                    }
                }
                return None;
            };
            self.visit(&site);
        }
    }
}
