//! Thermistor Query Endpoint
//!
//! ## Overview
//!
//! The dashboard polls `GET /api/thermistors` for a fresh reading of every
//! thermistor. Serving HTTP is left to whatever server the deployment runs;
//! this module owns the routing decision and the response so that any
//! server built on the [`http`] types can hand its request to
//! [`QueryEndpoint::handle`] and write back what it returns.
//!
//! | Request                     | Status | Body                      |
//! |-----------------------------|--------|---------------------------|
//! | `GET /api/thermistors`      | 200    | thermistor report (JSON)  |
//! | other method, same path     | 405    | empty, `Allow: GET`       |
//! | any other path              | 404    | empty                     |
//!
//! A query samples the pack without advancing the fault detector and sends
//! nothing on the bus.
//!
//! ## Example Usage
//!
//! ```rust
//! use http::{Request, StatusCode};
//! use thermguard_connectors::query::QueryEndpoint;
//! use thermguard_core::{time::MockTimeSource, ChannelId, MonitorConfig, PackMonitor};
//!
//! let endpoint = QueryEndpoint::default();
//! let mut monitor = PackMonitor::new(MonitorConfig::default())?;
//! let mut adc = |_: ChannelId| 2400u16;
//! let clock = MockTimeSource::new(0);
//!
//! let request = Request::get("/api/thermistors").body(())?;
//! let response = endpoint.handle(&request, &mut monitor, &mut adc, &clock);
//! assert_eq!(response.status(), StatusCode::OK);
//! assert!(response.body().starts_with(r#"{"thermistors":[{"segmentNumber":1"#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use http::header::{HeaderValue, ALLOW, CONTENT_TYPE};
use http::{Method, Request, Response, StatusCode};
use log::{debug, error};
use thermguard_core::time::TimeSource;
use thermguard_core::{AnalogSource, PackMonitor, ThermistorReport};

use crate::ConnectorResult;

/// Path the dashboard polls
pub const THERMISTORS_PATH: &str = "/api/thermistors";

/// Router for the thermistor query
#[derive(Debug, Clone)]
pub struct QueryEndpoint {
    path: String,
}

impl Default for QueryEndpoint {
    fn default() -> Self {
        Self::new(THERMISTORS_PATH)
    }
}

impl QueryEndpoint {
    /// Endpoint answering on `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }

    /// Path this endpoint answers on
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Answer one request, sampling the pack for GETs on the query path
    ///
    /// The query string is ignored and the request body is never read.
    pub fn handle<B, S, C>(
        &self,
        request: &Request<B>,
        monitor: &mut PackMonitor,
        source: &mut S,
        clock: &C,
    ) -> Response<String>
    where
        S: AnalogSource,
        C: TimeSource,
    {
        let path = request.uri().path();
        if path != self.path {
            debug!("{} {} -> 404", request.method(), path);
            return empty(StatusCode::NOT_FOUND);
        }
        if *request.method() != Method::GET {
            debug!("{} {} -> 405", request.method(), path);
            let mut response = empty(StatusCode::METHOD_NOT_ALLOWED);
            response
                .headers_mut()
                .insert(ALLOW, HeaderValue::from_static("GET"));
            return response;
        }

        let report = monitor.snapshot(source, clock);
        match render_report(&report) {
            Ok(body) => {
                debug!("GET {} -> 200 ({} thermistors)", path, report.count);
                let mut response = Response::new(body);
                response
                    .headers_mut()
                    .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                response
            }
            Err(e) => {
                error!("Failed to render thermistor report: {}", e);
                empty(StatusCode::INTERNAL_SERVER_ERROR)
            }
        }
    }
}

fn empty(status: StatusCode) -> Response<String> {
    let mut response = Response::new(String::new());
    *response.status_mut() = status;
    response
}

/// Render the query document as compact JSON
pub fn render_report(report: &ThermistorReport) -> ConnectorResult<String> {
    Ok(serde_json::to_string(report)?)
}
