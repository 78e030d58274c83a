use super::config::{DEFAULT_PAGE_SIZE, PAGE_SIZES};
use crate::error::{Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::BTreeMap;

pub const FILTER_SOURCE: &str = "source";
pub const FILTER_UNIT_NAME: &str = "unitName";
pub const FILTER_START_DATE: &str = "startDate";
pub const FILTER_END_DATE: &str = "endDate";
pub const FILTER_LEVEL: &str = "level";

/// `{page, pageSize, filters}` as sent to a list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageQuery {
    pub page: u32,
    pub page_size: u32,
    pub filters: BTreeMap<String, String>,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
            filters: BTreeMap::new(),
        }
    }
}

impl PageQuery {
    /// Query string pairs; also the parameter half of the query identity
    #[must_use]
    pub fn params(&self) -> BTreeMap<String, String> {
        let mut params = self.filters.clone();
        params.insert("page".to_string(), self.page.to_string());
        params.insert("pageSize".to_string(), self.page_size.to_string());
        params
    }
}

#[must_use]
pub fn is_allowed_page_size(size: u32) -> bool {
    PAGE_SIZES.contains(&size)
}

/// Page, page size and filters of one list view.
///
/// Changing the page size or any filter puts the view back on page 1.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaginationFilterState {
    query: PageQuery,
    known_pages: Option<u32>,
}

impl PaginationFilterState {
    /// # Errors
    ///
    /// Will return `Err` if `page_size` is not one of the allowed sizes
    pub fn with_page_size(page_size: u32) -> Result<Self> {
        let mut state = Self::default();
        state.set_page_size(page_size)?;
        Ok(state)
    }

    #[must_use]
    pub const fn query(&self) -> &PageQuery {
        &self.query
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.query.page
    }

    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.query.page_size
    }

    #[must_use]
    pub const fn filters(&self) -> &BTreeMap<String, String> {
        &self.query.filters
    }

    #[must_use]
    pub fn filter(&self, name: &str) -> Option<&str> {
        self.query.filters.get(name).map(String::as_str)
    }

    /// Page count reported by the last response, if any
    #[must_use]
    pub const fn known_pages(&self) -> Option<u32> {
        self.known_pages
    }

    /// Pages past the last known one are allowed; values below 1 clamp to 1
    pub fn set_page(&mut self, page: u32) {
        self.query.page = page.max(1);
    }

    /// # Errors
    ///
    /// Will return `Err` if `page_size` is not one of the allowed sizes
    pub fn set_page_size(&mut self, page_size: u32) -> Result<()> {
        if !is_allowed_page_size(page_size) {
            return Err(Error::InvalidPageSize(page_size));
        }
        self.query.page_size = page_size;
        self.reset_page();
        Ok(())
    }

    /// Step through the allowed sizes, wrapping around at either end
    pub fn cycle_page_size(&mut self, forward: bool) {
        let current = PAGE_SIZES
            .iter()
            .position(|&size| size == self.query.page_size)
            .unwrap_or(0);
        let len = PAGE_SIZES.len();
        let next = if forward {
            (current + 1) % len
        } else {
            (current + len - 1) % len
        };
        self.query.page_size = PAGE_SIZES[next];
        self.reset_page();
    }

    /// A blank value removes the filter
    pub fn set_filter(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        let value = value.trim();
        if value.is_empty() {
            self.query.filters.remove(name);
        } else {
            self.query
                .filters
                .insert(name.to_string(), value.to_string());
        }
        self.reset_page();
    }

    /// Date filters travel as RFC 3339 timestamps
    pub fn set_date_filter(&mut self, name: &str, value: Option<DateTime<Utc>>) {
        let value = value
            .map(|date| date.to_rfc3339_opts(SecondsFormat::Secs, true))
            .unwrap_or_default();
        self.set_filter(name, value);
    }

    pub fn clear_filter(&mut self, name: &str) {
        self.set_filter(name, "");
    }

    pub fn clear_filters(&mut self) {
        self.query.filters.clear();
        self.reset_page();
    }

    /// Stops at the last known page
    pub fn next_page(&mut self) -> bool {
        if self
            .known_pages
            .is_some_and(|pages| self.query.page >= pages)
        {
            return false;
        }
        self.query.page += 1;
        true
    }

    pub fn prev_page(&mut self) -> bool {
        if self.query.page <= 1 {
            return false;
        }
        self.query.page -= 1;
        true
    }

    pub const fn observe_pages(&mut self, pages: u32) {
        self.known_pages = Some(pages);
    }

    const fn reset_page(&mut self) {
        self.query.page = 1;
        self.known_pages = None;
    }
}
