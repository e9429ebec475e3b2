// tests/common/mod.rs
// Scripted upstream shared by the integration tests: replies are queued per
// URL, the last reply repeats, unknown URLs answer 404.
#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use home_trackers::fetch::{FetchResponse, HttpFetch};

#[derive(Clone, Debug)]
pub enum Reply {
    Status(u16, String),
    NetworkError,
}

impl Reply {
    pub fn ok(body: impl Into<String>) -> Self {
        Reply::Status(200, body.into())
    }
    pub fn computing() -> Self {
        Reply::Status(202, String::new())
    }
    pub fn status(code: u16) -> Self {
        Reply::Status(code, String::new())
    }
}

#[derive(Default)]
pub struct ScriptedFetcher {
    routes: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn route(self, url: impl Into<String>, reply: Reply) -> Self {
        self.routes
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, url: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|u| *u == url).count()
    }
}

#[async_trait]
impl HttpFetch for ScriptedFetcher {
    async fn get(&self, url: &str) -> Result<FetchResponse> {
        self.calls.lock().unwrap().push(url.to_string());
        let reply = {
            let mut routes = self.routes.lock().unwrap();
            match routes.get_mut(url) {
                Some(q) if q.len() > 1 => q.pop_front(),
                Some(q) => q.front().cloned(),
                None => None,
            }
        };
        match reply {
            Some(Reply::Status(status, body)) => Ok(FetchResponse { status, body }),
            Some(Reply::NetworkError) => Err(anyhow!("connection reset by peer")),
            None => Ok(FetchResponse {
                status: 404,
                body: "Not Found".to_string(),
            }),
        }
    }
}

pub fn api_url(pkg: &str) -> String {
    format!("https://api.anaconda.org/package/bioconda/{pkg}")
}
pub fn downloads_badge_url(pkg: &str) -> String {
    format!("https://anaconda.org/bioconda/{pkg}/badges/downloads.svg")
}
pub fn version_badge_url(pkg: &str) -> String {
    format!("https://anaconda.org/bioconda/{pkg}/badges/version.svg")
}
pub fn docs_url(pkg: &str) -> String {
    format!("https://bioconda.github.io/recipes/{pkg}/README.html")
}
pub fn activity_url(owner: &str, repo: &str) -> String {
    format!("https://api.github.com/repos/{owner}/{repo}/stats/commit_activity")
}
pub fn repos_url(user: &str, per_page: u32) -> String {
    format!("https://api.github.com/users/{user}/repos?sort=updated&per_page={per_page}")
}

/// `weeks` consecutive weekly buckets with the given totals cycling.
pub fn commit_activity_json(weeks: usize, totals: &[u64]) -> String {
    let start = 1_700_000_000i64;
    let items: Vec<serde_json::Value> = (0..weeks)
        .map(|i| {
            let total = totals[i % totals.len()];
            let mut days = [0u64; 7];
            days[i % 7] = total;
            serde_json::json!({
                "week": start + (i as i64) * 7 * 86_400,
                "total": total,
                "days": days,
            })
        })
        .collect();
    serde_json::Value::Array(items).to_string()
}
