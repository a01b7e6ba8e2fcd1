//! BigQuery REST client
//!
//! Implements [`SinkClient`] over the BigQuery v2 REST API with a blocking
//! HTTP client. Failed calls are retried with exponential backoff while the
//! per-call deadline allows it.

use super::models::{
    ErrorResponse, InsertAllRequest, InsertAllResponse, QueryRequest, QueryResponse,
    TableReference, TableResource,
};
use crate::adapters::sink::{QueryResult, SinkClient, TableHandle};
use crate::config::BigQueryConfig;
use crate::domain::{ProcessedRow, QuarryError, Result, RowError, SinkError};
use crate::log_retry_attempt;
use reqwest::blocking::{Client, RequestBuilder, Response};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

/// Retry deadline for table lookups and queries
pub const METADATA_CALL_DEADLINE: Duration = Duration::from_secs(60);

/// BigQuery sink client
///
/// # Example
///
/// ```no_run
/// use quarry::adapters::bigquery::BigQueryClient;
/// use quarry::adapters::sink::SinkClient;
/// use quarry::config::BigQueryConfig;
///
/// # fn example() -> quarry::domain::Result<()> {
/// let client = BigQueryClient::new(BigQueryConfig::default())?;
/// let table = client.get_table("my-project.analytics.items")?;
/// println!("{} columns", table.schema.fields.len());
/// # Ok(())
/// # }
/// ```
pub struct BigQueryClient {
    http: Client,
    base_url: String,
    config: BigQueryConfig,
    dry_run: bool,
}

impl BigQueryClient {
    /// Create a new client
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the base URL is invalid or the HTTP
    /// client cannot be built.
    pub fn new(config: BigQueryConfig) -> Result<Self> {
        let base_url = url::Url::parse(&config.base_url).map_err(|e| {
            QuarryError::Configuration(format!(
                "Invalid bigquery.base_url '{}': {}",
                config.base_url, e
            ))
        })?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                QuarryError::Configuration(format!("Failed to build HTTP client: {e}"))
            })?;

        if config.access_token.is_none() {
            tracing::warn!("No BigQuery access token configured, sending unauthenticated requests");
        }

        Ok(Self {
            http,
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            config,
            dry_run: false,
        })
    }

    /// Only log inserts instead of sending them
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// REST API root
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_reference(&self, table_id: &str) -> Result<TableReference> {
        TableReference::parse(table_id, self.config.project.as_deref())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.access_token {
            Some(token) => {
                let token: &str = token.expose_secret().as_ref();
                request.bearer_auth(token)
            }
            None => request,
        }
    }

    /// Send a request and decode a successful JSON body
    fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> std::result::Result<T, SinkError> {
        let response = self
            .authorize(request)
            .send()
            .map_err(|e| SinkError::ConnectionFailed(e.to_string()))?;

        Self::check_status(response)?
            .json::<T>()
            .map_err(|e| SinkError::InvalidResponse(e.to_string()))
    }

    fn check_status(response: Response) -> std::result::Result<Response, SinkError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        Err(match status.as_u16() {
            401 | 403 => SinkError::AuthenticationFailed(message),
            code if code >= 500 => SinkError::ServerError {
                status: code,
                message,
            },
            code => SinkError::ClientError {
                status: code,
                message,
            },
        })
    }

    /// Run `call` until it succeeds, fails permanently, or the deadline passes
    ///
    /// Without a deadline the call is attempted once.
    fn with_retry<T, F>(&self, deadline: Option<Duration>, mut call: F) -> Result<T>
    where
        F: FnMut() -> std::result::Result<T, SinkError>,
    {
        let started = Instant::now();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let error = match call() {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => return Err(e.into()),
                Err(e) => e,
            };

            let Some(deadline) = deadline else {
                return Err(error.into());
            };

            let delay = self.config.retry.delay_for(attempt);
            if started.elapsed() + delay >= deadline {
                return Err(SinkError::DeadlineExceeded {
                    deadline_secs: deadline.as_secs(),
                    attempts: attempt,
                    last_error: error.to_string(),
                }
                .into());
            }

            log_retry_attempt!(attempt, delay, error);
            std::thread::sleep(delay);
        }
    }
}

impl SinkClient for BigQueryClient {
    fn get_table(&self, table_id: &str) -> Result<TableHandle> {
        let reference = self.table_reference(table_id)?;
        let url = self.url(&reference.path());

        tracing::debug!(table = %reference, "Fetching table schema");

        let resource: TableResource = self
            .with_retry(Some(METADATA_CALL_DEADLINE), || self.send(self.http.get(&url)))
            .map_err(|e| match e {
                QuarryError::SinkTransport(SinkError::ClientError { status: 404, message }) => {
                    SinkError::TableNotFound(format!("{reference}: {message}")).into()
                }
                other => other,
            })?;

        tracing::info!(
            table = %reference,
            columns = resource.schema.fields.len(),
            "Fetched table schema"
        );

        Ok(TableHandle::new(table_id, resource.schema))
    }

    fn insert_rows(
        &self,
        table: &TableHandle,
        rows: &[ProcessedRow],
        retry_deadline: Option<Duration>,
    ) -> Result<Vec<RowError>> {
        let reference = self.table_reference(&table.table_id)?;

        if self.dry_run {
            tracing::info!(
                table = %reference,
                rows = rows.len(),
                "DRY RUN: skipping insert"
            );
            return Ok(Vec::new());
        }

        let url = self.url(&format!("{}/insertAll", reference.path()));
        let body = InsertAllRequest::new(rows);

        let response: InsertAllResponse = self.with_retry(retry_deadline, || {
            self.send(self.http.post(&url).json(&body))
        })?;

        tracing::debug!(
            table = %reference,
            rows = rows.len(),
            rejected = response.insert_errors.len(),
            "Inserted rows"
        );

        Ok(response.insert_errors)
    }

    fn query(&self, sql: &str) -> Result<QueryResult> {
        let project = self.config.project.as_deref().ok_or_else(|| {
            QuarryError::Configuration("bigquery.project is required to run queries".to_string())
        })?;
        let url = self.url(&format!("projects/{project}/queries"));
        let body = QueryRequest {
            query: sql,
            use_legacy_sql: false,
            timeout_ms: self.config.timeout_seconds * 1000,
        };

        let response: QueryResponse = self
            .with_retry(Some(METADATA_CALL_DEADLINE), || {
                self.send(self.http.post(&url).json(&body))
            })
            .map_err(|e| match e {
                QuarryError::SinkTransport(SinkError::ClientError { status, message }) => {
                    SinkError::QueryFailed(format!("{status}: {message}")).into()
                }
                other => other,
            })?;

        if !response.job_complete {
            return Err(SinkError::QueryFailed(format!(
                "Query did not complete within {}s",
                self.config.timeout_seconds
            ))
            .into());
        }

        Ok(QueryResult::new(response.into_values()))
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
