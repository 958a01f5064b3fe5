//! Paged listing.
//!
//! A [`PageRequest`] is the cursor: page size, page number, the paging flag
//! and any extra filter parameters. [`BookerClient::paginate`] walks pages in
//! ascending order until the server returns an empty one.

use reqwest::Method;
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::http::BookerClient;
use super::request::without_token;
use crate::diagnostics::IssueContext;
use crate::error::{ApiFailure, BookerError, Result};
use crate::types::{map_record, Resource, ResourceKind};

/// Fault code of the vendor defect that makes single pages unreadable.
pub const SKIPPABLE_FAULT_CODE: i64 = 100_000;

/// Page size parameter.
pub const PAGE_SIZE_PARAM: &str = "PageSize";

/// 1-based page number parameter.
pub const PAGE_NUMBER_PARAM: &str = "PageNumber";

/// Paging flag parameter.
pub const USE_PAGING_PARAM: &str = "UsePaging";

/// One page request.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    /// Records per page. Must be at least 1.
    pub page_size: u32,

    /// 1-based page number. Must be at least 1.
    pub page_number: u32,

    /// Paging must be explicitly enabled.
    pub use_paging: bool,

    /// Additional filter parameters sent with every page.
    pub params: Map<String, Value>,
}

impl PageRequest {
    /// First page of `page_size` records with paging enabled.
    #[must_use]
    pub fn new(page_size: u32) -> Self {
        Self {
            page_size,
            page_number: 1,
            use_paging: true,
            params: Map::new(),
        }
    }

    /// Starts at `page_number` instead of the first page.
    #[must_use]
    pub const fn starting_at(mut self, page_number: u32) -> Self {
        self.page_number = page_number;
        self
    }

    /// Sets the paging flag.
    #[must_use]
    pub const fn with_paging(mut self, use_paging: bool) -> Self {
        self.use_paging = use_paging;
        self
    }

    /// Adds one filter parameter.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Reads a cursor out of a vendor-style parameter map.
    ///
    /// `PageSize`, `PageNumber` and `UsePaging` are taken out of `params`;
    /// everything else becomes a filter parameter.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::InvalidPagination`] if a paging field is
    /// missing or not a positive integer / `true`.
    pub fn from_params(mut params: Map<String, Value>) -> Result<Self> {
        let page_size = params
            .remove(PAGE_SIZE_PARAM)
            .and_then(|v| positive(&v))
            .ok_or(BookerError::InvalidPagination)?;
        let page_number = params
            .remove(PAGE_NUMBER_PARAM)
            .and_then(|v| positive(&v))
            .ok_or(BookerError::InvalidPagination)?;
        let use_paging = params
            .remove(USE_PAGING_PARAM)
            .and_then(|v| v.as_bool())
            .ok_or(BookerError::InvalidPagination)?;

        let page = Self {
            page_size,
            page_number,
            use_paging,
            params,
        };
        page.validate()?;
        Ok(page)
    }

    /// Checks the cursor.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::InvalidPagination`] unless page size and page
    /// number are at least 1 and paging is enabled.
    pub fn validate(&self) -> Result<()> {
        if self.page_size < 1 || self.page_number < 1 || !self.use_paging {
            return Err(BookerError::InvalidPagination);
        }
        Ok(())
    }

    /// Wire parameters for this page: the filters plus the paging fields.
    #[must_use]
    pub fn to_params(&self) -> Map<String, Value> {
        let mut params = self.params.clone();
        params.insert(USE_PAGING_PARAM.to_string(), Value::from(self.use_paging));
        params.insert(PAGE_SIZE_PARAM.to_string(), Value::from(self.page_size));
        params.insert(PAGE_NUMBER_PARAM.to_string(), Value::from(self.page_number));
        params
    }

    fn next(&self) -> Self {
        Self {
            page_number: self.page_number.saturating_add(1),
            ..self.clone()
        }
    }
}

fn positive(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    u32::try_from(n).ok().filter(|n| *n >= 1)
}

/// The failure behind `err` if it is the known per-page defect.
fn skippable(err: &BookerError) -> Option<&ApiFailure> {
    match err {
        BookerError::Api(failure) if failure.fault_code() == Some(SKIPPABLE_FAULT_CODE) => {
            Some(failure)
        }
        _ => None,
    }
}

impl BookerClient {
    /// Fetches `path` page by page and maps every record into `R`.
    ///
    /// See [`BookerClient::paginate_raw`] for the paging rules.
    ///
    /// # Errors
    ///
    /// Returns the paging errors of [`BookerClient::paginate_raw`] and
    /// [`BookerError::Deserialization`] if a record does not fit `R`.
    pub async fn paginate<R: Resource>(
        &self,
        method: Method,
        path: &str,
        page: &PageRequest,
        fetch_all: bool,
    ) -> Result<Vec<R>> {
        let kind = R::kind();
        self.paginate_raw(method, path, page, Some(&kind), fetch_all)
            .await?
            .into_iter()
            .map(map_record)
            .collect()
    }

    /// Fetches `path` page by page.
    ///
    /// With `fetch_all` unset exactly one call is made and its records are
    /// returned. Otherwise pages are requested in ascending order and
    /// concatenated until a page comes back empty. A page failing with the
    /// vendor fault [`SKIPPABLE_FAULT_CODE`] is reported to the issue logger
    /// and skipped; any other error aborts.
    ///
    /// Paging parameters go in the query string for GET and in the body
    /// otherwise.
    ///
    /// # Errors
    ///
    /// Returns [`BookerError::InvalidPagination`] before any call if the
    /// cursor is invalid, and [`BookerError::NotACollection`] if a page is
    /// not an array.
    pub async fn paginate_raw(
        &self,
        method: Method,
        path: &str,
        page: &PageRequest,
        kind: Option<&ResourceKind>,
        fetch_all: bool,
    ) -> Result<Vec<Value>> {
        page.validate()?;

        if !fetch_all {
            return self.fetch_page(&method, path, page, kind).await;
        }

        let mut fetched: Vec<Value> = Vec::new();
        let mut current = page.clone();

        loop {
            let shown = Value::Object(without_token(&current.to_params()));
            info!(
                "fetching {} with {}. {} results so far.",
                path,
                shown,
                fetched.len()
            );

            let results = match self.fetch_page(&method, path, &current, kind).await {
                Ok(results) => results,
                Err(err) => match skippable(&err) {
                    Some(failure) => {
                        let message = format!("Skipping page of {} due to API error.", path);
                        warn!("{} page {}: {}", message, current.page_number, failure);
                        self.issues()
                            .log_issue(&message, &IssueContext::from(failure));
                        current = current.next();
                        continue;
                    }
                    None => return Err(err),
                },
            };

            if results.is_empty() {
                return Ok(fetched);
            }

            fetched.extend(results);
            current = current.next();
        }
    }

    async fn fetch_page(
        &self,
        method: &Method,
        path: &str,
        page: &PageRequest,
        kind: Option<&ResourceKind>,
    ) -> Result<Vec<Value>> {
        let params = page.to_params();
        let payload = self.send_params(method, path, params.clone(), kind).await?;

        match payload {
            Value::Array(results) => Ok(results),
            _ => Err(BookerError::NotACollection {
                path: path.to_string(),
                params: Value::Object(without_token(&params)).to_string(),
            }),
        }
    }
}
