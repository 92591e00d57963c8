//! Scripted resource source for unit tests

use crate::error::LoadError;
use crate::source::ResourceSource;
use domain::Resource;
use futures::future::BoxFuture;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone)]
pub enum Reply {
    Json(Value),
    Fail,
    /// Never answers
    Hang,
}

pub struct ScriptedSource {
    replies: Mutex<HashMap<Resource, Reply>>,
    calls: AtomicUsize,
    fail_first: AtomicUsize,
}

impl ScriptedSource {
    /// Every resource fails until a reply is set
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(0),
        }
    }

    pub fn set(&self, resource: Resource, reply: Reply) {
        self.replies.lock().unwrap().insert(resource, reply);
    }

    /// Fail the next `n` fetches whatever the scripted reply is
    pub fn fail_first(&self, n: usize) {
        self.fail_first.store(n, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ResourceSource for ScriptedSource {
    fn fetch<'a>(&'a self, resource: Resource, _path: &'a str) -> BoxFuture<'a, Result<Value, LoadError>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let forced_failure = self
            .fail_first
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        let reply = if forced_failure {
            Reply::Fail
        } else {
            self.replies
                .lock()
                .unwrap()
                .get(&resource)
                .cloned()
                .unwrap_or(Reply::Fail)
        };

        Box::pin(async move {
            match reply {
                Reply::Json(value) => Ok(value),
                Reply::Fail => Err(LoadError::network(resource, "scripted failure")),
                Reply::Hang => std::future::pending().await,
            }
        })
    }

    fn describe(&self) -> String {
        "scripted".to_string()
    }
}

pub fn live_stats() -> Value {
    json!({
        "name": "LOGNEON",
        "handle": "@LOGNEON",
        "subscriberCount": 201,
        "videoCount": 42,
        "viewCount": 54321,
        "description": "Live channel description",
        "lastUpdated": "2025-09-01T06:00:00Z"
    })
}

pub fn live_videos() -> Value {
    json!({
        "videos": [
            {
                "id": "live-a",
                "title": "Neon Circuit Breakdown",
                "publishedAt": "2025-08-20T12:00:00Z",
                "viewCount": 50,
                "duration": "PT8M10S"
            },
            {
                "id": "live-b",
                "title": "Glitch Session",
                "publishedAt": "2025-08-25T12:00:00Z",
                "viewCount": 3000,
                "duration": "PT12M"
            },
            {
                "id": "live-c",
                "title": "Late Night Synth Build",
                "publishedAt": "2025-08-10T12:00:00Z",
                "viewCount": "100",
                "duration": "PT5M"
            }
        ]
    })
}

pub fn live_shorts() -> Value {
    json!([
        {
            "id": "live-short",
            "title": "Quick Glitch",
            "publishedAt": "2025-08-30T12:00:00Z",
            "viewCount": 900,
            "duration": "PT45S"
        }
    ])
}
