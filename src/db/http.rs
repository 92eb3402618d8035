use std::time::Duration;

use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, error};
use ureq::http::Response;
use ureq::{Agent, Body};

use super::Database;
use crate::config::{self, Properties};
use crate::{BenchError, DatabaseResult, Query, Result};

/// Upper bound on in-flight requests per instance. Requests beyond the cap
/// block until a permit frees up.
const MAX_CONNECTIONS: usize = 2;

/// Content type sent with write bodies.
const CONTENT_TYPE: &str = "application/octet-stream";

/// A [`Database`] speaking a REST-like wire protocol to a remote
/// key-value store.
///
/// Each operation maps to one HTTP request against
/// `http://<host>:<port>/<dbName>/<key>`: PUT with the raw payload for
/// insert/update, GET for read, DELETE for delete. Status codes in
/// [200, 300) are success; any other status or any transport fault is
/// `Fail`, with no retry.
///
/// The instance owns one pooled HTTP client for its lifetime. The base URL
/// is derived in [`init`](Database::init) and never mutated elsewhere;
/// per-key URLs are plain concatenations of base URL and key.
pub struct HttpKeyValueDatabase {
    /// Pooled client, exclusively owned; `None` once closed.
    agent: Option<Agent>,
    gate: ConnectionGate,
    conn_str: Option<String>,
}

impl HttpKeyValueDatabase {
    /// Creates an uninitialized instance with a default-configured client.
    pub fn new() -> Self {
        Self {
            agent: Some(build_agent(None)),
            gate: ConnectionGate::new(MAX_CONNECTIONS),
            conn_str: None,
        }
    }

    /// The base URL derived at init time, `None` before a successful init.
    pub fn base_url(&self) -> Option<&str> {
        self.conn_str.as_deref()
    }

    /// Fetches the value stored under the query's key.
    ///
    /// This is the richer companion to [`Database::read`]: it returns the
    /// payload, maps 404 to [`BenchError::KeyNotFound`] and other non-2xx
    /// statuses to [`BenchError::Status`].
    pub fn fetch(&self, query: &Query) -> Result<Vec<u8>> {
        let (agent, url) = self.target("fetch", query).ok_or_else(|| {
            BenchError::StringError("database is not initialized".to_string())
        })?;

        let _permit = self.gate.acquire();
        let mut response = agent.get(&url).call()?;
        let status = response.status().as_u16();
        if !is_success(status) {
            return Err(if status == 404 {
                BenchError::KeyNotFound
            } else {
                BenchError::Status(status)
            });
        }
        Ok(response.body_mut().read_to_vec()?)
    }

    /// Insert and update share one wire operation: an idempotent PUT.
    fn put(&self, op: &'static str, query: &Query) -> DatabaseResult {
        let Some((agent, url)) = self.target(op, query) else {
            return DatabaseResult::Fail;
        };
        let Some(value) = query.value() else {
            error!("{} query for key {} carries no value", op, query.key());
            return DatabaseResult::Fail;
        };

        let _permit = self.gate.acquire();
        classify(op, agent.put(&url).content_type(CONTENT_TYPE).send(value))
    }

    /// Resolves the per-key URL, logging and bailing if the instance is
    /// unusable (not yet initialized, or already closed).
    fn target(&self, op: &'static str, query: &Query) -> Option<(&Agent, String)> {
        match (self.agent.as_ref(), self.conn_str.as_deref()) {
            (Some(agent), Some(conn_str)) => {
                Some((agent, format!("{}{}", conn_str, query.key())))
            }
            _ => {
                error!("{} called before init or after close", op);
                None
            }
        }
    }
}

impl Default for HttpKeyValueDatabase {
    fn default() -> Self {
        Self::new()
    }
}

impl Database for HttpKeyValueDatabase {
    fn init(&mut self, work_plan: &Properties, job: &Properties) -> DatabaseResult {
        let Some(job_name) = job.get(config::JOB_NAME) else {
            error!("Job name is not specified");
            return DatabaseResult::Fail;
        };

        let Some(host) = work_plan.get(config::WORK_HOST) else {
            error!("Hostname is not specified");
            return DatabaseResult::Fail;
        };

        let port = match work_plan.get_u16(config::WORK_PORT) {
            Ok(Some(port)) => port,
            Ok(None) => {
                error!("Host port is not specified");
                return DatabaseResult::Fail;
            }
            Err(e) => {
                error!("Host port is not a number: {}", e);
                return DatabaseResult::Fail;
            }
        };

        let Some(db_name) = job.get(config::HTTP_DB_NAME) else {
            error!("HTTP database name is not specified for job {}", job_name);
            return DatabaseResult::Fail;
        };

        let timeout = match job.get_u64(config::HTTP_TIMEOUT_MS) {
            Ok(value) => value.map(Duration::from_millis),
            Err(e) => {
                error!("Request timeout is not a number: {}", e);
                return DatabaseResult::Fail;
            }
        };

        // All required settings resolved; only now touch instance state.
        if timeout.is_some() || self.agent.is_none() {
            self.agent = Some(build_agent(timeout));
        }
        self.conn_str = Some(format!("http://{}:{}/{}/", host, port, db_name));

        DatabaseResult::Ok
    }

    fn insert(&self, query: &Query) -> DatabaseResult {
        self.put("insert", query)
    }

    fn update(&self, query: &Query) -> DatabaseResult {
        self.put("update", query)
    }

    fn read(&self, query: &Query) -> DatabaseResult {
        let Some((agent, url)) = self.target("read", query) else {
            return DatabaseResult::Fail;
        };
        let _permit = self.gate.acquire();
        classify("read", agent.get(&url).call())
    }

    fn delete(&self, query: &Query) -> DatabaseResult {
        let Some((agent, url)) = self.target("delete", query) else {
            return DatabaseResult::Fail;
        };
        let _permit = self.gate.acquire();
        classify("delete", agent.delete(&url).call())
    }

    fn close(&mut self) -> DatabaseResult {
        // Dropping the agent returns its pooled connections; ureq has no
        // fallible release step to report.
        self.agent = None;
        self.conn_str = None;
        DatabaseResult::Ok
    }
}

/// Builds the pooled client. The idle pool is bounded to the same cap as
/// the permit gate; non-2xx statuses come back as data, not errors.
fn build_agent(timeout: Option<Duration>) -> Agent {
    Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(timeout)
        .max_idle_connections(MAX_CONNECTIONS)
        .build()
        .new_agent()
}

/// Status codes in [200, 300) are success; everything else is failure.
fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

/// Maps a request outcome onto the two-valued result, draining successful
/// response bodies so the pooled connection can be reused.
fn classify(
    op: &'static str,
    outcome: std::result::Result<Response<Body>, ureq::Error>,
) -> DatabaseResult {
    match outcome {
        Ok(mut response) => {
            let status = response.status().as_u16();
            if is_success(status) {
                match response.body_mut().read_to_vec() {
                    Ok(body) => {
                        debug!("{} response: {}", op, String::from_utf8_lossy(&body))
                    }
                    Err(e) => debug!("{} response body not drained: {}", op, e),
                }
                DatabaseResult::Ok
            } else {
                error!("Error executing {}: server returned status {}", op, status);
                DatabaseResult::Fail
            }
        }
        Err(e) => {
            error!("Error executing {}: {}", op, e);
            DatabaseResult::Fail
        }
    }
}

/// Caps in-flight requests. A bounded channel pre-filled with one token
/// per slot: acquiring receives a token, dropping the permit returns it.
struct ConnectionGate {
    tokens: Receiver<()>,
    slots: Sender<()>,
}

impl ConnectionGate {
    fn new(limit: usize) -> Self {
        let (slots, tokens) = bounded(limit);
        for _ in 0..limit {
            slots.send(()).expect("gate channel sized to its limit");
        }
        Self { tokens, slots }
    }

    /// Blocks until a slot is free.
    fn acquire(&self) -> ConnectionPermit<'_> {
        self.tokens
            .recv()
            .expect("gate sender is owned by the gate itself");
        ConnectionPermit { slots: &self.slots }
    }
}

/// Held for the duration of one request; returns the slot on drop.
struct ConnectionPermit<'a> {
    slots: &'a Sender<()>,
}

impl Drop for ConnectionPermit<'_> {
    fn drop(&mut self) {
        let _ = self.slots.send(());
    }
}
