//! HTTP client for the trends web protocol
//!
//! Each lookup repeats the explore call for the current parameters and then
//! fetches one widget. There is no retry or rate limiting: a failed or
//! throttled request surfaces immediately as a [`FetchError`].

use async_trait::async_trait;
use reqwest::{header::USER_AGENT, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tokio::sync::OnceCell;

use crate::config::TrendsConfig;
use crate::models::{
    QueryParameters, RegionResult, RelatedQueryEntry, RelatedQueryResult, Resolution,
    TimeSeriesResult,
};
use crate::utils::error::FetchError;

use super::protocol::{
    apply_resolution, trim_prefix, ComparedGeoResponse, ExplorePayload, ExploreResponse,
    MultilineResponse, RelatedSearchesResponse, Widget, EXPLORE_TRIM, GEO_MAP_WIDGET,
    RELATED_QUERIES_WIDGET, TIMESERIES_WIDGET, WIDGET_TRIM,
};
use super::TrendsSource;

const EXPLORE_PATH: &str = "/trends/api/explore";
const MULTILINE_PATH: &str = "/trends/api/widgetdata/multiline";
const COMPARED_GEO_PATH: &str = "/trends/api/widgetdata/comparedgeo";
const RELATED_SEARCHES_PATH: &str = "/trends/api/widgetdata/relatedsearches";

/// Session handle to the trends service
///
/// Holds a cookie-storing HTTP client. The service hands out session cookies
/// from its home page, which is visited once before the first explore call.
pub struct GoogleTrendsClient {
    /// HTTP client with cookie store and configured timeout
    client: Client,

    /// Service root, without trailing slash
    base_url: String,

    /// Host language (`hl`)
    locale: String,

    /// Timezone offset in minutes (`tz`)
    timezone_offset: i32,

    user_agent: String,

    /// Set once the session cookies were requested
    session: OnceCell<()>,
}

impl GoogleTrendsClient {
    /// Create a new client from configuration
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the HTTP client cannot be created
    pub fn new(config: &TrendsConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .gzip(true)
            .cookie_store(true)
            .build()?;

        tracing::debug!(
            base_url = %config.base_url,
            locale = %config.locale,
            tz = config.timezone_offset,
            "Created trends client"
        );

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            locale: config.locale.clone(),
            timezone_offset: config.timezone_offset,
            user_agent: config.user_agent.clone(),
            session: OnceCell::new(),
        })
    }

    /// Create a client against a custom base URL for testing
    ///
    /// # Errors
    ///
    /// Returns `FetchError` if the HTTP client cannot be created
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let mut config = crate::config::Config::default().trends;
        config.base_url = base_url.to_string();
        Self::new(&config)
    }

    pub fn locale(&self) -> &str {
        &self.locale
    }

    pub fn timezone_offset(&self) -> i32 {
        self.timezone_offset
    }

    /// Country hint for the cookie request: last two characters of the locale
    fn geo_hint(&self) -> String {
        let chars: Vec<char> = self.locale.chars().collect();
        chars[chars.len().saturating_sub(2)..].iter().collect()
    }

    /// Request session cookies once per handle
    ///
    /// A failure here is not fatal; the explore call reports the real error.
    async fn ensure_session(&self) {
        self.session
            .get_or_init(|| async {
                let url = format!("{}/?geo={}", self.base_url, self.geo_hint());
                match self
                    .client
                    .get(&url)
                    .header(USER_AGENT, &self.user_agent)
                    .send()
                    .await
                {
                    Ok(response) => {
                        tracing::debug!(status = %response.status(), "Requested session cookies");
                    }
                    Err(e) => {
                        tracing::debug!(error = %e, "Session cookie request failed");
                    }
                }
            })
            .await;
    }

    /// Send a request and parse its body after stripping `trim` characters
    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        path: &str,
        trim: usize,
    ) -> Result<T, FetchError> {
        let response = request.header(USER_AGENT, &self.user_agent).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(path, status = %status, "Trends request rejected");
            return Err(FetchError::status(path, status.as_u16()));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(trim_prefix(&body, trim))?)
    }

    /// Run the explore call for a set of parameters
    async fn explore(&self, params: &QueryParameters) -> Result<ExploreResponse, FetchError> {
        self.ensure_session().await;

        let req = serde_json::to_string(&ExplorePayload::from_params(params))?;
        let url = format!("{}{EXPLORE_PATH}", self.base_url);
        let tz = self.timezone_offset.to_string();

        tracing::debug!(keywords = ?params.keywords(), timeframe = %params.timeframe(), geo = %params.geo(), "Building payload");

        let request = self.client.post(&url).query(&[
            ("hl", self.locale.as_str()),
            ("tz", tz.as_str()),
            ("req", req.as_str()),
        ]);

        self.send_json(request, EXPLORE_PATH, EXPLORE_TRIM).await
    }

    /// Fetch the data behind one widget
    async fn widget_data<T: DeserializeOwned>(
        &self,
        path: &str,
        widget: &Widget,
    ) -> Result<T, FetchError> {
        let req = serde_json::to_string(&widget.request)?;
        let url = format!("{}{path}", self.base_url);
        let tz = self.timezone_offset.to_string();

        let request = self.client.get(&url).query(&[
            ("hl", self.locale.as_str()),
            ("tz", tz.as_str()),
            ("req", req.as_str()),
            ("token", widget.token.as_str()),
        ]);

        self.send_json(request, path, WIDGET_TRIM).await
    }
}

#[async_trait]
impl TrendsSource for GoogleTrendsClient {
    async fn fetch_time_series(
        &self,
        params: &QueryParameters,
    ) -> Result<TimeSeriesResult, FetchError> {
        let explore = self.explore(params).await?;
        let widget = explore.widget(TIMESERIES_WIDGET)?;

        let response: MultilineResponse = self.widget_data(MULTILINE_PATH, widget).await?;
        let result = response.into_result(params.keywords())?;

        tracing::info!(rows = result.rows.len(), "Fetched interest over time");
        Ok(result)
    }

    async fn fetch_by_region(
        &self,
        params: &QueryParameters,
        resolution: Resolution,
    ) -> Result<RegionResult, FetchError> {
        let explore = self.explore(params).await?;
        let mut widget = explore.widget(GEO_MAP_WIDGET)?.clone();
        apply_resolution(&mut widget.request, params.geo(), resolution);

        let response: ComparedGeoResponse = self.widget_data(COMPARED_GEO_PATH, &widget).await?;
        let result = response.into_result(params.keywords());

        tracing::info!(rows = result.rows.len(), resolution = %resolution, "Fetched interest by region");
        Ok(result)
    }

    async fn fetch_related_queries(
        &self,
        params: &QueryParameters,
    ) -> Result<RelatedQueryResult, FetchError> {
        let explore = self.explore(params).await?;
        let widgets = explore.widgets_with_prefix(RELATED_QUERIES_WIDGET);

        let mut result = RelatedQueryResult::default();
        for (idx, widget) in widgets.into_iter().enumerate() {
            let keyword = widget
                .restricted_keyword()
                .map(str::to_string)
                .or_else(|| params.keywords().get(idx).cloned())
                .unwrap_or_default();

            let response: RelatedSearchesResponse =
                self.widget_data(RELATED_SEARCHES_PATH, widget).await?;
            let entry: RelatedQueryEntry = response.into_entry();

            tracing::debug!(
                keyword = %keyword,
                top = entry.top.as_ref().map_or(0, |l| l.len()),
                rising = entry.rising.as_ref().map_or(0, |l| l.len()),
                "Fetched related queries"
            );
            result.insert(keyword, entry);
        }

        tracing::info!(keywords = result.entries.len(), "Fetched related queries");
        Ok(result)
    }
}
