//! Per-session Q&A context.
//!
//! A session owns its question/answer history and the document currently
//! indexed for questions. Nothing is persisted: ending a session drops both,
//! and a session left idle longer than the store's TTL is dropped as well.

mod transcript;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::core::errors::ApiError;
use crate::rag::DocumentIndex;

pub use transcript::{format_transcript, TRANSCRIPT_FILE_NAME};

#[derive(Debug, Clone, Serialize)]
pub struct QaEntry {
    pub question: String,
    pub answer: String,
    pub asked_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DocumentSummary {
    pub file_name: String,
    pub fragments: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub question_count: usize,
    pub document: Option<DocumentSummary>,
}

pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: DateTime<Utc>,
    history: Vec<QaEntry>,
    document: Option<Arc<DocumentIndex>>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_active: now,
            history: Vec::new(),
            document: None,
        }
    }

    fn touch(&mut self) {
        self.last_active = Utc::now();
    }

    fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            created_at: self.created_at,
            question_count: self.history.len(),
            document: self.document.as_ref().map(|index| DocumentSummary {
                file_name: index.file_name().to_string(),
                fragments: index.len(),
            }),
        }
    }
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl SessionStore {
    /// Sessions idle for longer than `ttl` are treated as ended.
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        (now - session.last_active)
            .to_std()
            .map(|idle| idle > self.ttl)
            .unwrap_or(false)
    }

    fn get<'a>(
        &self,
        sessions: &'a HashMap<Uuid, Session>,
        id: Uuid,
    ) -> Result<&'a Session, ApiError> {
        sessions
            .get(&id)
            .filter(|session| !self.is_expired(session, Utc::now()))
            .ok_or_else(|| not_found(id))
    }

    /// Looks up a live session and marks it active.
    fn get_mut<'a>(
        &self,
        sessions: &'a mut HashMap<Uuid, Session>,
        id: Uuid,
    ) -> Result<&'a mut Session, ApiError> {
        let session = sessions
            .get_mut(&id)
            .filter(|session| !self.is_expired(session, Utc::now()))
            .ok_or_else(|| not_found(id))?;
        session.touch();
        Ok(session)
    }

    pub async fn create(&self) -> SessionInfo {
        self.evict_expired().await;
        let session = Session::new();
        let info = session.info();
        self.sessions.write().await.insert(session.id, session);
        tracing::info!("Session {} created", info.id);
        info
    }

    pub async fn info(&self, id: Uuid) -> Result<SessionInfo, ApiError> {
        let sessions = self.sessions.read().await;
        self.get(&sessions, id).map(Session::info)
    }

    /// Ends the session, dropping its history and document.
    pub async fn remove(&self, id: Uuid) -> Result<(), ApiError> {
        match self.sessions.write().await.remove(&id) {
            Some(_) => {
                tracing::info!("Session {} ended", id);
                Ok(())
            }
            None => Err(not_found(id)),
        }
    }

    /// Replaces the document questions are answered from.
    pub async fn set_document(
        &self,
        id: Uuid,
        index: DocumentIndex,
    ) -> Result<SessionInfo, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = self.get_mut(&mut sessions, id)?;
        session.document = Some(Arc::new(index));
        Ok(session.info())
    }

    pub async fn document(&self, id: Uuid) -> Result<Option<Arc<DocumentIndex>>, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = self.get_mut(&mut sessions, id)?;
        Ok(session.document.clone())
    }

    /// Appends a Q&A pair and returns its 1-based position.
    pub async fn append(&self, id: Uuid, question: &str, answer: &str) -> Result<usize, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = self.get_mut(&mut sessions, id)?;
        session.history.push(QaEntry {
            question: question.to_string(),
            answer: answer.to_string(),
            asked_at: Utc::now(),
        });
        Ok(session.history.len())
    }

    pub async fn history(&self, id: Uuid) -> Result<Vec<QaEntry>, ApiError> {
        let sessions = self.sessions.read().await;
        Ok(self.get(&sessions, id)?.history.clone())
    }

    pub async fn clear_history(&self, id: Uuid) -> Result<usize, ApiError> {
        let mut sessions = self.sessions.write().await;
        let session = self.get_mut(&mut sessions, id)?;
        let cleared = session.history.len();
        session.history.clear();
        Ok(cleared)
    }

    pub async fn transcript(&self, id: Uuid) -> Result<String, ApiError> {
        let history = self.history(id).await?;
        Ok(format_transcript(&history))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drops every session idle past the TTL and returns how many went.
    pub async fn evict_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !self.is_expired(session, now));
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::info!("Evicted {} idle sessions", evicted);
        }
        evicted
    }

    /// Sweeps idle sessions every `period` until the runtime shuts down.
    pub fn spawn_sweeper(&self, period: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                ticker.tick().await;
                store.evict_expired().await;
            }
        })
    }
}

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Session not found: {}", id))
}
