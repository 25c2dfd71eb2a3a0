//! Session-scoped document interactions.
//!
//! [`DocumentService`] owns the wiring between uploads, the [`SessionStore`]
//! and the selected [`Assistant`]. Every operation keyed by a session id
//! checks that the session exists before reading or writing anything else.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use crate::assistant::{self, Assistant};
use crate::config::AppConfig;
use crate::error::{AssistantError, Result};
use crate::extract::{self, FileKind};
use crate::models::*;
use crate::store::SessionStore;

#[derive(Clone)]
pub struct DocumentService {
    store: SessionStore,
    assistant: Arc<dyn Assistant>,
    config: Arc<AppConfig>,
}

impl DocumentService {
    pub fn new(store: SessionStore, assistant: Arc<dyn Assistant>, config: AppConfig) -> Self {
        Self {
            store,
            assistant,
            config: Arc::new(config),
        }
    }

    /// Build the service with a fresh store and the assistant `config` selects.
    pub fn from_config(config: AppConfig) -> Self {
        let assistant = assistant::from_config(&config);
        Self::new(SessionStore::new(), assistant, config)
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    // ============================================================
    // Upload
    // ============================================================

    /// Persist an upload, extract its text, summarize it and open a session.
    ///
    /// The session only exists once all of that has succeeded.
    pub async fn upload(&self, filename: &str, bytes: Vec<u8>) -> Result<UploadResponse> {
        let kind = FileKind::from_filename(filename)?;

        let (text, bytes) = tokio::task::spawn_blocking(move || {
            extract::extract_text(&bytes, kind).map(|text| (text, bytes))
        })
        .await
        .map_err(|e| AssistantError::Io(std::io::Error::other(e)))??;

        let file_path = self.persist_upload(filename, &bytes).await?;

        let summary = self
            .assistant
            .summarize(&text, self.config.summary_words)
            .await;

        let session = self.store.create(NewSession {
            filename: filename.to_string(),
            file_path,
            text,
            summary,
        });
        tracing::info!(
            session_id = %session.id,
            filename = %session.filename,
            kind = kind.as_str(),
            chars = session.text.chars().count(),
            "Created session"
        );

        Ok(UploadResponse {
            session_id: session.id,
            summary: session.summary,
        })
    }

    async fn persist_upload(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let basename = Path::new(filename)
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload");
        let path = self
            .config
            .upload_dir
            .join(format!("{}_{}", Uuid::new_v4(), basename));

        tokio::fs::create_dir_all(&self.config.upload_dir).await?;
        tokio::fs::write(&path, bytes).await?;
        Ok(path)
    }

    // ============================================================
    // Session reads
    // ============================================================

    fn session(&self, id: Uuid) -> Result<Session> {
        self.store.get(id).ok_or_else(|| {
            tracing::debug!(session_id = %id, "Unknown session");
            AssistantError::SessionNotFound(id)
        })
    }

    pub fn summary(&self, id: Uuid) -> Result<SummaryResponse> {
        let session = self.session(id)?;
        Ok(SummaryResponse {
            session_id: id,
            summary: session.summary,
        })
    }

    pub fn document(&self, id: Uuid) -> Result<DocumentResponse> {
        let session = self.session(id)?;
        Ok(DocumentResponse {
            session_id: id,
            filename: session.filename,
            text: session.text,
        })
    }

    // ============================================================
    // Questions
    // ============================================================

    pub async fn ask(&self, id: Uuid, question: &str) -> Result<Answer> {
        let session = self.session(id)?;
        Ok(self.assistant.answer(question, &session.text).await)
    }

    /// Grade one answer to an arbitrary question about the document.
    pub async fn grade_answer(&self, id: Uuid, question: &str, answer: &str) -> Result<AnswerGrade> {
        let session = self.session(id)?;
        Ok(self.assistant.grade(question, answer, &session.text).await)
    }

    // ============================================================
    // Challenge
    // ============================================================

    /// Generate a new question set, replacing any previous one.
    pub async fn challenge(&self, id: Uuid) -> Result<ChallengeResponse> {
        let session = self.session(id)?;
        let questions = self
            .assistant
            .challenge(&session.text, self.config.challenge_count)
            .await;

        self.store
            .merge(id, SessionPatch::challenges(questions.clone()))
            .then_some(())
            .ok_or(AssistantError::SessionNotFound(id))?;

        Ok(ChallengeResponse {
            session_id: id,
            questions,
        })
    }

    /// Store answers verbatim, replacing any earlier submission.
    pub fn submit_answers(&self, id: Uuid, answers: AnswerSet) -> Result<AnswerSet> {
        if !self.store.merge(id, SessionPatch::answers(answers.clone())) {
            return Err(AssistantError::SessionNotFound(id));
        }
        Ok(answers)
    }

    /// Evaluate `answers`, or the stored answers when `answers` is empty,
    /// against the session's current question set.
    pub async fn evaluate_challenge(
        &self,
        id: Uuid,
        answers: AnswerSet,
    ) -> Result<ChallengeFeedbackResponse> {
        let session = self.session(id)?;
        let answers = if answers.is_empty() {
            session.answers
        } else {
            answers
        };

        let feedback = self
            .assistant
            .evaluate(&session.text, &session.challenges, &answers)
            .await;

        self.store.merge(id, SessionPatch::feedback(feedback.clone()));

        Ok(ChallengeFeedbackResponse {
            session_id: id,
            feedback,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(dir: &Path) -> DocumentService {
        DocumentService::from_config(AppConfig::for_tests(dir))
    }

    fn answers(pairs: &[(&str, &str)]) -> AnswerSet {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn upload_persists_file_and_creates_session() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let upload = service
            .upload("notes.txt", b"Hello world. This is a test.".to_vec())
            .await
            .unwrap();

        let session = service.store().get(upload.session_id).unwrap();
        assert!(session.file_path.starts_with(dir.path()));
        assert!(session.file_path.to_string_lossy().ends_with("_notes.txt"));
        assert_eq!(
            std::fs::read_to_string(&session.file_path).unwrap(),
            "Hello world. This is a test."
        );
        assert_eq!(upload.summary, "Hello world . This is a test .");
    }

    #[tokio::test]
    async fn rejected_uploads_create_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let err = service.upload("deck.pptx", vec![1, 2, 3]).await.unwrap_err();
        assert!(matches!(err, AssistantError::UnsupportedFileType(_)));

        let err = service.upload("bad.txt", vec![0xff, 0xfe]).await.unwrap_err();
        assert!(matches!(err, AssistantError::InvalidEncoding));

        assert!(service.store().is_empty());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn uploaded_path_cannot_escape_upload_dir() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());

        let upload = service
            .upload("../../etc/evil.txt", b"Text.".to_vec())
            .await
            .unwrap();

        let session = service.store().get(upload.session_id).unwrap();
        assert_eq!(session.file_path.parent(), Some(dir.path()));
    }

    #[tokio::test]
    async fn resubmitting_replaces_stored_answers() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let id = service
            .upload("a.txt", b"Some text.".to_vec())
            .await
            .unwrap()
            .session_id;

        service
            .submit_answers(id, answers(&[("q1", "a"), ("q2", "b"), ("q3", "c")]))
            .unwrap();
        service
            .submit_answers(id, answers(&[("q1", "new")]))
            .unwrap();

        let stored = service.store().get(id).unwrap().answers;
        assert_eq!(stored, answers(&[("q1", "new")]));
    }

    #[tokio::test]
    async fn evaluation_prefers_supplied_answers() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let id = service
            .upload("a.txt", b"Some text.".to_vec())
            .await
            .unwrap()
            .session_id;
        service.challenge(id).await.unwrap();
        service
            .submit_answers(id, answers(&[("q1", "stored")]))
            .unwrap();

        let supplied = service
            .evaluate_challenge(id, answers(&[("q1", "supplied")]))
            .await
            .unwrap();
        assert!(supplied.feedback["q1"].feedback.contains("'supplied'"));

        let stored = service.evaluate_challenge(id, AnswerSet::new()).await.unwrap();
        assert!(stored.feedback["q1"].feedback.contains("'stored'"));
        assert_eq!(service.store().get(id).unwrap().feedback, stored.feedback);
    }

    #[tokio::test]
    async fn unknown_sessions_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(dir.path());
        let id = Uuid::new_v4();

        assert!(matches!(service.summary(id), Err(AssistantError::SessionNotFound(_))));
        assert!(matches!(service.ask(id, "q").await, Err(AssistantError::SessionNotFound(_))));
        assert!(matches!(
            service.submit_answers(id, AnswerSet::new()),
            Err(AssistantError::SessionNotFound(_))
        ));
        assert!(service.store().is_empty());
    }
}
