#![allow(dead_code)]

use async_trait::async_trait;
use countries_etl::{BlobSink, EtlError, RawCountryRecord, RecordSource, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// 模擬 topic：記住 consumer group 已提交的 offset
#[derive(Clone, Default)]
pub struct FakeTopic {
    state: Arc<Mutex<TopicState>>,
}

#[derive(Default)]
struct TopicState {
    messages: Vec<Vec<u8>>,
    committed: usize,
    open_sessions: usize,
}

impl FakeTopic {
    pub fn with_records(records: Vec<Value>) -> Self {
        let topic = Self::default();
        for record in records {
            topic.publish_raw(record.to_string().into_bytes());
        }
        topic
    }

    pub fn publish_raw(&self, payload: Vec<u8>) {
        self.state.lock().unwrap().messages.push(payload);
    }

    pub fn session(&self) -> FakeSession {
        let mut state = self.state.lock().unwrap();
        state.open_sessions += 1;
        FakeSession {
            topic: self.clone(),
            position: state.committed,
            closed: false,
        }
    }

    pub fn committed_offset(&self) -> usize {
        self.state.lock().unwrap().committed
    }

    pub fn open_sessions(&self) -> usize {
        self.state.lock().unwrap().open_sessions
    }
}

pub struct FakeSession {
    topic: FakeTopic,
    position: usize,
    closed: bool,
}

#[async_trait]
impl RecordSource for FakeSession {
    async fn next_record(&mut self) -> Result<Option<RawCountryRecord>> {
        let payload = {
            let state = self.topic.state.lock().unwrap();
            state.messages.get(self.position).cloned()
        };

        match payload {
            None => Ok(None),
            Some(bytes) => {
                self.position += 1;
                RawCountryRecord::from_payload(Some(bytes.as_slice())).map(Some)
            }
        }
    }

    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        // auto-commit：已交付的訊息都算已提交
        let mut state = self.topic.state.lock().unwrap();
        state.committed = self.position;
        state.open_sessions -= 1;
    }
}

/// 一個永遠連不上的佇列
pub struct UnreachableSource {
    pub closed: Arc<AtomicUsize>,
}

#[async_trait]
impl RecordSource for UnreachableSource {
    async fn next_record(&mut self) -> Result<Option<RawCountryRecord>> {
        Err(EtlError::SourceConnection {
            message: "Connection refused (localhost:9092)".to_string(),
        })
    }

    async fn close(&mut self) {
        self.closed.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Clone, Default)]
pub struct MemorySink {
    objects: Arc<tokio::sync::Mutex<HashMap<String, Vec<u8>>>>,
}

impl MemorySink {
    pub async fn objects(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().await.clone()
    }

    /// 取得唯一的物件並拆成 JSON 行
    pub async fn single_object_lines(&self) -> (String, Vec<Value>) {
        let objects = self.objects.lock().await;
        assert_eq!(objects.len(), 1, "expected exactly one object");
        let (key, body) = objects.iter().next().unwrap();
        let text = String::from_utf8(body.clone()).unwrap();
        let lines = text
            .split('\n')
            .map(|line| serde_json::from_str(line).unwrap())
            .collect();
        (key.clone(), lines)
    }
}

impl BlobSink for MemorySink {
    async fn put(&self, key: &str, body: Vec<u8>) -> Result<()> {
        self.objects.lock().await.insert(key.to_string(), body);
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct FailingSink {
    pub attempts: Arc<AtomicUsize>,
}

impl BlobSink for FailingSink {
    async fn put(&self, key: &str, _body: Vec<u8>) -> Result<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(EtlError::StorageWrite {
            key: key.to_string(),
            message: "Access Denied (AccessDenied)".to_string(),
        })
    }
}

/// 寫入當下記錄 topic 的 session 與 offset 狀態
#[derive(Clone)]
pub struct ObservingSink {
    topic: FakeTopic,
    pub seen: Arc<Mutex<Option<(usize, usize)>>>,
}

impl ObservingSink {
    pub fn new(topic: &FakeTopic) -> Self {
        Self {
            topic: topic.clone(),
            seen: Arc::new(Mutex::new(None)),
        }
    }

    /// (open_sessions, committed_offset) at write time
    pub fn seen_at_put(&self) -> Option<(usize, usize)> {
        *self.seen.lock().unwrap()
    }
}

impl BlobSink for ObservingSink {
    async fn put(&self, _key: &str, _body: Vec<u8>) -> Result<()> {
        let snapshot = (self.topic.open_sessions(), self.topic.committed_offset());
        *self.seen.lock().unwrap() = Some(snapshot);
        Ok(())
    }
}

pub fn country(i: usize) -> Value {
    json!({
        "name": {"common": format!("Country {}", i), "official": format!("Republic of {}", i)},
        "capital": [format!("Capital {}", i)],
        "population": 1000 * (i + 1),
        "area": 10 * (i + 1),
        "region": "Europe",
        "subregion": "Southern Europe",
        "languages": {"ita": "Italian", "eng": "English"},
        "currencies": {"EUR": {"name": "Euro", "symbol": "€"}},
        "flags": {"png": format!("https://flagcdn.com/w320/c{}.png", i)}
    })
}

pub fn countries(count: usize) -> Vec<Value> {
    (0..count).map(country).collect()
}
