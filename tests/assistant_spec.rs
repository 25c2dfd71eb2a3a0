use std::sync::Arc;

use async_trait::async_trait;
use doc_assistant::assistant::{
    Assistant, HeuristicAssistant, ModelAssistant, FAILED_SCORE, UNPARSABLE_SCORE,
};
use doc_assistant::llm::{GenerationError, TextGenerator};
use doc_assistant::models::{AnswerSet, QuestionSet, OVERALL_KEY};
use doc_assistant::store::SessionStore;
use doc_assistant::{AppConfig, DocumentService};

const DOC: &str = "Rivers carve valleys over long periods. Floods deposit fertile silt on plains. \
    Farmers settled where the silt made soil rich.";

struct Replies(&'static str);

#[async_trait]
impl TextGenerator for Replies {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Ok(self.0.to_string())
    }
}

struct Unreachable;

#[async_trait]
impl TextGenerator for Unreachable {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        Err(GenerationError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

fn questions() -> QuestionSet {
    [
        ("q1", "Why do farmers follow the silt?"),
        ("q2", "What do floods leave behind?"),
        ("q3", "How are valleys formed?"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn answers() -> AnswerSet {
    [("q1", "Rich soil."), ("q2", ""), ("q3", "Erosion by rivers.")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn expected_keys() -> Vec<&'static str> {
    vec![OVERALL_KEY, "q1", "q2", "q3"]
}

fn model(generator: impl TextGenerator + 'static) -> ModelAssistant {
    ModelAssistant::new(Arc::new(generator))
}

mod evaluation_is_complete {
    use super::*;

    #[test]
    fn without_a_model() {
        let feedback = tokio_test::block_on(HeuristicAssistant.evaluate(DOC, &questions(), &answers()));

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert!(feedback["q1"].feedback.contains("Rich soil."));
        assert_ne!(feedback["q2"].feedback, feedback["q1"].feedback);
    }

    #[tokio::test]
    async fn with_a_well_formed_reply() {
        let assistant = model(Replies(
            r#"Sure, here you go:
            {"q1": {"score": 0.9, "feedback": "Good."},
             "Q2": {"score": 0.0, "justification": "No answer."},
             "q3": {"score": 0.7, "feedback": "Mostly right."},
             "overall": {"score": 0.55, "feedback": "Decent."}}"#,
        ));

        let feedback = assistant.evaluate(DOC, &questions(), &answers()).await;

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert_eq!(feedback["q1"].score, 0.9);
        assert_eq!(feedback["q2"].feedback, "No answer.");
        assert_eq!(feedback[OVERALL_KEY].feedback, "Decent.");
    }

    #[tokio::test]
    async fn with_a_partial_reply() {
        let assistant = model(Replies(r#"{"q1": {"score": 1.5, "feedback": "Great."}, "q3": "Fine."}"#));

        let feedback = assistant.evaluate(DOC, &questions(), &answers()).await;

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert_eq!(feedback["q1"].score, 1.0);
        assert_eq!(feedback["q2"].score, 0.0);
        assert_eq!(feedback["q3"].score, UNPARSABLE_SCORE);
        assert!((feedback[OVERALL_KEY].score - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn with_unrequested_keys_in_the_reply() {
        let assistant = model(Replies(
            r#"{"q1": {"score": 0.9, "feedback": "Good"},
                "q2": {"score": 0.1, "feedback": "Blank"},
                "q3": {"score": 0.8, "feedback": "Right"},
                "overall": {"score": 0.6, "feedback": "Fine"},
                "total_score": 2.7}"#,
        ));

        let feedback = assistant.evaluate(DOC, &questions(), &answers()).await;

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert_eq!(feedback["q1"].score, 0.9);
        assert_eq!(feedback["q1"].feedback, "Good");
        assert_eq!(feedback[OVERALL_KEY].score, 0.6);
    }

    #[tokio::test]
    async fn with_an_unparsable_reply() {
        let assistant = model(Replies("I think the answers are mostly fine."));

        let feedback = assistant.evaluate(DOC, &questions(), &answers()).await;

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert!(feedback.values().all(|f| f.score == UNPARSABLE_SCORE));
        assert!(feedback["q1"].feedback.contains("mostly fine"));
    }

    #[tokio::test]
    async fn when_the_model_is_unreachable() {
        let assistant = model(Unreachable);

        let feedback = assistant.evaluate(DOC, &questions(), &answers()).await;

        assert_eq!(feedback.keys().map(String::as_str).collect::<Vec<_>>(), expected_keys());
        assert!(feedback.values().all(|f| f.score == FAILED_SCORE));
        assert!(feedback["q3"].feedback.contains("Erosion by rivers."));
        assert!(feedback[OVERALL_KEY].feedback.contains("503"));
    }

    #[tokio::test]
    async fn when_every_answer_is_missing() {
        let assistant = model(Replies("not json"));

        let feedback = assistant
            .evaluate(DOC, &questions(), &AnswerSet::new())
            .await;

        assert_eq!(feedback.len(), 4);
    }
}

mod model_backed_sessions {
    use super::*;

    fn service(generator: impl TextGenerator + 'static, dir: &std::path::Path) -> DocumentService {
        DocumentService::new(
            SessionStore::new(),
            Arc::new(model(generator)),
            AppConfig::for_tests(dir),
        )
    }

    #[tokio::test]
    async fn summary_comes_from_the_model() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Replies("  Rivers shape farmland.  "), dir.path());

        let upload = service.upload("rivers.txt", DOC.as_bytes().to_vec()).await.unwrap();

        assert_eq!(upload.summary, "Rivers shape farmland.");
    }

    #[tokio::test]
    async fn unreachable_model_still_completes_a_round() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Unreachable, dir.path());

        let id = service
            .upload("rivers.txt", DOC.as_bytes().to_vec())
            .await
            .unwrap()
            .session_id;
        let challenge = service.challenge(id).await.unwrap();
        service.submit_answers(id, answers()).unwrap();
        let result = service.evaluate_challenge(id, AnswerSet::new()).await.unwrap();

        assert_eq!(challenge.questions.len(), 3);
        assert_eq!(result.feedback.len(), 4);
        assert_eq!(service.store().get(id).unwrap().feedback, result.feedback);
    }
}
