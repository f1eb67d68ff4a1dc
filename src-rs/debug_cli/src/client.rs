use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;

use crate::models::{SearchRequest, SearchResponse, TaskInfo, TrendingResponse};

pub struct HTTPClient {
    pub base_url: String,
    client: Client,
}

impl HTTPClient {
    pub fn new(base_url: &str) -> Result<Self, String> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|err| err.to_string())?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn submit(&self, artist: &str, title: &str) -> Result<SearchResponse, String> {
        let url = format!("{}/search", self.base_url);
        let req = SearchRequest {
            artist: artist.to_string(),
            title: title.to_string(),
        };
        let resp = self.client.post(url).json(&req).send().map_err(|err| err.to_string())?;
        // Error bodies share the same envelope, so decode them too.
        resp.json::<SearchResponse>().map_err(|err| err.to_string())
    }

    pub fn status(&self, task_id: &str) -> Result<TaskInfo, String> {
        let url = format!("{}/api/status/{}", self.base_url, task_id);
        let resp = self.client.get(url).send().map_err(|err| err.to_string())?;
        let value: serde_json::Value = decode(resp)?;
        let task = value.get("task").cloned().unwrap_or_default();
        serde_json::from_value(task).map_err(|err| err.to_string())
    }

    pub fn list_tasks(&self, limit: usize) -> Result<Vec<TaskInfo>, String> {
        let url = format!("{}/tasks?limit={}", self.base_url, limit);
        let resp = self.client.get(url).send().map_err(|err| err.to_string())?;
        let value: serde_json::Value = decode(resp)?;
        let tasks = value
            .get("tasks")
            .and_then(|v| v.as_array())
            .cloned()
            .unwrap_or_default();
        let mut out = Vec::new();
        for item in tasks {
            if let Ok(task) = serde_json::from_value::<TaskInfo>(item) {
                out.push(task);
            }
        }
        Ok(out)
    }

    pub fn trending(&self) -> Result<TrendingResponse, String> {
        let url = format!("{}/api/trending", self.base_url);
        let resp = self.client.get(url).send().map_err(|err| err.to_string())?;
        decode(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: Response) -> Result<T, String> {
    if resp.status().is_success() {
        resp.json::<T>().map_err(|err| err.to_string())
    } else {
        let status = resp.status();
        let body = resp.text().unwrap_or_default();
        Err(format!("http {}: {}", status.as_u16(), body))
    }
}
