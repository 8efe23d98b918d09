//! Athena-compatible query engine client (JSON 1.1 protocol, SigV4 signed).

use std::time::Duration;

use serde::{Deserialize, Serialize};
use shopmetrics_core::config::CatalogConfig;
use tracing::debug;

use crate::catalog::{QueryEngine, QueryState, QueryStatus, RepairRequest};
use crate::error::PublishError;
use crate::sigv4::{Credentials, RequestSigner};

const SERVICE: &str = "athena";
const CONTENT_TYPE: &str = "application/x-amz-json-1.1";

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionInput<'a> {
    query_string: &'a str,
    client_request_token: &'a str,
    query_execution_context: QueryExecutionContext<'a>,
    result_configuration: ResultConfiguration<'a>,
    work_group: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecutionContext<'a> {
    database: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ResultConfiguration<'a> {
    output_location: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct StartQueryExecutionOutput {
    query_execution_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryExecutionInput<'a> {
    query_execution_id: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetQueryExecutionOutput {
    query_execution: QueryExecution,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct QueryExecution {
    status: ExecutionStatus,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExecutionStatus {
    state: String,
    state_change_reason: Option<String>,
}

pub struct AthenaClient {
    http: reqwest::blocking::Client,
    url: reqwest::Url,
    host: String,
    region: String,
    credentials: Credentials,
}

impl AthenaClient {
    /// Build a client from `[catalog]`, reading credentials from the environment.
    pub fn from_config(config: &CatalogConfig) -> Result<Self, PublishError> {
        Self::new(config, Credentials::from_env()?)
    }

    pub fn new(config: &CatalogConfig, credentials: Credentials) -> Result<Self, PublishError> {
        let endpoint = config
            .endpoint
            .clone()
            .unwrap_or_else(|| format!("https://athena.{}.amazonaws.com/", config.region));
        let url = reqwest::Url::parse(&endpoint)
            .map_err(|e| PublishError::QueryRequest(format!("bad endpoint {endpoint:?}: {e}")))?;
        let host = match (url.host_str(), url.port()) {
            (Some(h), Some(p)) => format!("{h}:{p}"),
            (Some(h), None) => h.to_string(),
            (None, _) => {
                return Err(PublishError::QueryRequest(format!(
                    "endpoint {endpoint:?} has no host"
                )))
            }
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PublishError::QueryRequest(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            url,
            host,
            region: config.region.clone(),
            credentials,
        })
    }

    fn call<I: Serialize, O: for<'de> Deserialize<'de>>(
        &self,
        operation: &str,
        input: &I,
    ) -> Result<O, PublishError> {
        let body = serde_json::to_vec(input)
            .map_err(|e| PublishError::QueryRequest(format!("{operation}: encode: {e}")))?;
        let target = format!("AmazonAthena.{operation}");

        let signer = RequestSigner {
            credentials: &self.credentials,
            region: &self.region,
            service: SERVICE,
        };
        let signed = signer.sign_post(
            &self.host,
            &[("content-type", CONTENT_TYPE), ("x-amz-target", &target)],
            &body,
            chrono::Utc::now(),
        )?;

        let mut request = self.http.post(self.url.clone()).body(body);
        for (name, value) in &signed.headers {
            // reqwest derives Host from the URL.
            if name != "host" {
                request = request.header(name.as_str(), value.as_str());
            }
        }

        let response = request
            .send()
            .map_err(|e| PublishError::QueryRequest(format!("{operation}: {e}")))?;
        let status = response.status();
        let text = response
            .text()
            .map_err(|e| PublishError::QueryRequest(format!("{operation}: reading body: {e}")))?;
        if !status.is_success() {
            return Err(PublishError::QueryRequest(format!("{operation} returned {status}: {text}")));
        }
        debug!(operation, %status, "query engine call");

        serde_json::from_str(&text)
            .map_err(|e| PublishError::QueryRequest(format!("{operation}: decode: {e}")))
    }
}

impl QueryEngine for AthenaClient {
    fn start_query(&self, request: &RepairRequest) -> Result<String, PublishError> {
        let input = StartQueryExecutionInput {
            query_string: &request.statement,
            client_request_token: &request.client_token,
            query_execution_context: QueryExecutionContext {
                database: &request.database,
            },
            result_configuration: ResultConfiguration {
                output_location: &request.output_location,
            },
            work_group: &request.workgroup,
        };
        let out: StartQueryExecutionOutput = self.call("StartQueryExecution", &input)?;
        Ok(out.query_execution_id)
    }

    fn query_status(&self, job_id: &str) -> Result<QueryStatus, PublishError> {
        let out: GetQueryExecutionOutput = self.call(
            "GetQueryExecution",
            &GetQueryExecutionInput {
                query_execution_id: job_id,
            },
        )?;
        let status = out.query_execution.status;
        Ok(QueryStatus {
            state: QueryState::parse(&status.state)?,
            reason: status.state_change_reason,
        })
    }
}
