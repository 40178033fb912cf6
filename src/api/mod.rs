pub mod analytics;
pub mod influencers;
pub mod videos;

use std::fs;
use std::path::PathBuf;
use std::time::SystemTime;

use anyhow::{bail, Context, Result};
use directories::ProjectDirs;

pub use analytics::{DashboardStats, InfluencerStats, TopVideo};
pub use videos::{SyncSummary, TranscriptionResult};

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api/v1";

const CACHE_TTL_SECS: u64 = 10 * 60;

/// Thin blocking wrapper over the backend REST API. List endpoints go
/// through a JSON file cache so repeated invocations (and `--offline`)
/// don't refetch the full collections every time.
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    offline: bool,
}

fn cache_path(name: &str) -> Option<PathBuf> {
    ProjectDirs::from("", "", "eldo").map(|d| d.cache_dir().join(format!("{name}.json")))
}

fn cache_is_fresh(path: &PathBuf) -> bool {
    let Ok(meta) = fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = meta.modified() else {
        return false;
    };
    SystemTime::now()
        .duration_since(modified)
        .map(|d| d.as_secs() < CACHE_TTL_SECS)
        .unwrap_or(false)
}

impl ApiClient {
    pub fn new(base_url: &str, offline: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            offline,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub(crate) fn get(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let mut request = ureq::get(self.url(path));
        for (key, value) in query {
            request = request.query(*key, value);
        }
        let body = request.call()?.body_mut().read_to_string()?;
        Ok(body)
    }

    pub(crate) fn post(&self, path: &str, body: &str) -> Result<String> {
        let response = ureq::post(self.url(path))
            .header("content-type", "application/json")
            .send(body)?
            .body_mut()
            .read_to_string()?;
        Ok(response)
    }

    pub(crate) fn put(&self, path: &str, body: &str) -> Result<String> {
        let response = ureq::put(self.url(path))
            .header("content-type", "application/json")
            .send(body)?
            .body_mut()
            .read_to_string()?;
        Ok(response)
    }

    pub(crate) fn delete(&self, path: &str) -> Result<()> {
        ureq::delete(self.url(path)).call()?;
        Ok(())
    }

    /// Fetch a list endpoint through the cache. Fresh cache is served
    /// directly; `--offline` accepts a stale cache and fails when there is
    /// none; a failed fetch falls back to stale cache with a warning so
    /// prior data stays visible instead of clearing.
    pub(crate) fn fetch_list(&self, name: &str, path: &str, limit: u32) -> Result<String> {
        let cache = cache_path(name);

        if let Some(ref p) = cache {
            if self.offline || cache_is_fresh(p) {
                if let Ok(data) = fs::read_to_string(p) {
                    return Ok(data);
                }
                if self.offline {
                    bail!("--offline: no cached {name} data found");
                }
            }
        }

        match self
            .get(path, &[("limit", limit.to_string())])
            .with_context(|| format!("Failed to fetch {name} from {}", self.base_url))
        {
            Ok(data) => {
                if let Some(ref p) = cache {
                    if let Some(parent) = p.parent() {
                        let _ = fs::create_dir_all(parent);
                    }
                    let _ = fs::write(p, &data);
                }
                Ok(data)
            }
            Err(e) => {
                if let Some(ref p) = cache {
                    if let Ok(data) = fs::read_to_string(p) {
                        eprintln!("Warning: fetch failed ({e:#}), using stale cached {name}");
                        return Ok(data);
                    }
                }
                Err(e)
            }
        }
    }

    /// Drop a cached list after a mutation so the next read refetches.
    pub(crate) fn invalidate_cache(&self, name: &str) {
        if let Some(path) = cache_path(name) {
            let _ = fs::remove_file(path);
        }
    }
}
