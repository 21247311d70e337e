//! arXiv provider over the Atom export API.

use std::sync::Arc;

use async_trait::async_trait;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;
use serde_json::json;

use super::{own_transport, trim_base};
use crate::transport::{HttpRequest, Transport};
use crate::{Provider, Result, SearchError, SearchRequest, SearchResult, SortBy, SortOrder};

/// Name reported by `Provider::name` and stamped on every result.
const NAME: &str = "arxiv";

const DEFAULT_BASE_URL: &str = "https://export.arxiv.org";

/// arXiv paper search.
///
/// Accepts free text, an identifier list, or both (the API then filters the
/// listed papers by the query).
pub struct Arxiv {
    base_url: String,
    transport: Arc<dyn Transport>,
}

impl Arxiv {
    /// Creates a provider against the public arXiv API.
    pub fn new() -> Result<Self> {
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            transport: own_transport()?,
        })
    }

    /// Overrides the API base URL.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = trim_base(base_url);
        self
    }

    /// Replaces the HTTP transport.
    pub fn with_transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = transport;
        self
    }

    fn build_request(&self, request: &SearchRequest) -> Result<HttpRequest> {
        let query = request.query_text();
        let ids = request.ids();
        if query.is_none() && ids.is_none() {
            return Err(SearchError::config("arxiv requires a search query or an id list"));
        }

        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(query) = query {
            params.push(("search_query", search_query(query)));
        }
        if let Some(ids) = ids {
            params.push(("id_list", ids.replace(' ', "")));
        }
        params.push(("start", request.offset().to_string()));
        params.push(("max_results", request.max_results.to_string()));
        if let Some(sort_by) = request.sort_by {
            params.push((
                "sortBy",
                match sort_by {
                    SortBy::Relevance => "relevance",
                    SortBy::LastUpdatedDate => "lastUpdatedDate",
                    SortBy::SubmittedDate => "submittedDate",
                }
                .to_string(),
            ));
        }
        if let Some(order) = request.sort_order {
            params.push((
                "sortOrder",
                match order {
                    SortOrder::Ascending => "ascending",
                    SortOrder::Descending => "descending",
                }
                .to_string(),
            ));
        }

        let url = url::Url::parse_with_params(&format!("{}/api/query", self.base_url), &params)?;
        Ok(HttpRequest::get(url.to_string(), request.timeout))
    }
}

/// Plain text searches all fields; field-prefixed queries pass through.
fn search_query(query: &str) -> String {
    let fielded = ["all:", "ti:", "au:", "abs:", "co:", "jr:", "cat:", "rn:", "id:"];
    if fielded.iter().any(|prefix| query.contains(prefix)) {
        query.to_string()
    } else {
        format!("all:{}", query)
    }
}

#[async_trait]
impl Provider for Arxiv {
    fn name(&self) -> &str {
        NAME
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        let http_request = self.build_request(request)?;
        let response = self.transport.execute(http_request, &request.debug).await?;
        parse_feed(response.text())
    }

    fn supports_id_list(&self) -> bool {
        true
    }

    fn troubleshooting_hint(&self) -> Option<&str> {
        Some("Check the query syntax and arXiv identifiers; the arXiv API also asks clients to wait three seconds between calls")
    }
}

/// One `<entry>` of the Atom feed.
#[derive(Debug, Default)]
struct Entry {
    id: String,
    title: String,
    summary: String,
    published: String,
    updated: String,
    authors: Vec<String>,
    categories: Vec<String>,
    pdf_url: Option<String>,
    doi: Option<String>,
}

impl Entry {
    fn into_result(self) -> SearchResult {
        let title = collapse_whitespace(&self.title);
        let raw = json!({
            "id": self.id,
            "authors": self.authors,
            "categories": self.categories,
            "updated": self.updated,
            "pdf_url": self.pdf_url,
            "doi": self.doi,
        });
        let mut result = SearchResult::new(self.id, title, NAME)
            .with_snippet(collapse_whitespace(&self.summary))
            .with_domain("arxiv.org");
        if !self.published.is_empty() {
            result = result.with_published_date(self.published);
        }
        result.with_raw(raw)
    }
}

fn parse_feed(xml: &str) -> Result<Vec<SearchResult>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut entries = Vec::new();
    let mut current: Option<Entry> = None;
    let mut field: Option<String> = None;
    let mut saw_feed = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                let tag = tag_name(e);
                match tag.as_str() {
                    "feed" => saw_feed = true,
                    "entry" => current = Some(Entry::default()),
                    "id" | "title" | "summary" | "published" | "updated" | "name" | "arxiv:doi"
                        if current.is_some() =>
                    {
                        field = Some(tag.clone());
                    }
                    _ => {}
                }
            }
            Ok(Event::Empty(ref e)) => {
                if let Some(entry) = current.as_mut() {
                    read_empty(e, entry);
                }
            }
            Ok(Event::Text(e)) => {
                if let (Some(entry), Some(tag)) = (current.as_mut(), field.as_deref()) {
                    let text = e
                        .unescape()
                        .map_err(|err| SearchError::parse(format!("invalid arXiv text: {}", err)))?;
                    let target = match tag {
                        "id" => &mut entry.id,
                        "title" => &mut entry.title,
                        "summary" => &mut entry.summary,
                        "published" => &mut entry.published,
                        "updated" => &mut entry.updated,
                        "arxiv:doi" => {
                            entry.doi = Some(text.into_owned());
                            continue;
                        }
                        _ => {
                            entry.authors.push(text.into_owned());
                            continue;
                        }
                    };
                    target.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => {
                let name = e.name();
                let tag = String::from_utf8_lossy(name.as_ref());
                if tag == "entry" {
                    if let Some(entry) = current.take() {
                        if is_error_entry(&entry) {
                            return Err(SearchError::Transport {
                                status: Some(400),
                                message: format!("arXiv API error: {}", collapse_whitespace(&entry.summary)),
                                body: None,
                            });
                        }
                        entries.push(entry);
                    }
                } else if field.as_deref() == Some(&*tag) {
                    field = None;
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SearchError::parse(format!("invalid arXiv Atom feed: {}", e))),
            _ => {}
        }
    }

    if !saw_feed {
        return Err(SearchError::parse("arXiv response is not an Atom feed"));
    }
    Ok(entries.into_iter().map(Entry::into_result).collect())
}

fn tag_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.name().as_ref()).into_owned()
}

fn read_empty(e: &BytesStart<'_>, entry: &mut Entry) {
    let tag = tag_name(e);
    let attr = |key: &str| {
        e.attributes()
            .filter_map(|a| a.ok())
            .find(|a| a.key.as_ref() == key.as_bytes())
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
    };
    match tag.as_str() {
        "category" => {
            if let Some(term) = attr("term") {
                entry.categories.push(term);
            }
        }
        "link" if attr("title").as_deref() == Some("pdf") => entry.pdf_url = attr("href"),
        _ => {}
    }
}

/// arXiv reports bad queries as a single entry titled "Error".
fn is_error_entry(entry: &Entry) -> bool {
    entry.title.trim() == "Error" && entry.id.contains("/api/errors")
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
