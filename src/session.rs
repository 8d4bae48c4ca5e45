//! The product workflow: Intake → Generation → Review → Publish | Draft → Catalog.
//!
//! A [`Session`] owns the transient working copy (current package and listing
//! editor) and the catalog. Records are only created by [`Session::publish`]
//! and [`Session::save_draft`].

use std::time::Duration;

use serde_json::Value;

use crate::agent::AgentClient;
use crate::catalog::{CatalogStore, ProductRecord};
use crate::editor::ListingEditor;
use crate::errors::{AgentError, SessionError};
use crate::intake::{IntakeForm, PublishRequest};
use crate::package::ProductPackage;
use crate::storage::LocalStorage;
use crate::ui::progress::{DEFAULT_STEP_DELAYS, StepTicker};

/// Where the user is in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Intake,
    Review,
    Catalog,
}

/// Agent identifiers used by a session.
#[derive(Debug, Clone)]
pub struct AgentIds {
    pub manager: String,
    pub publisher: String,
}

pub struct Session<A: AgentClient, S: LocalStorage> {
    agent: A,
    agents: AgentIds,
    catalog: CatalogStore<S>,
    step_delays: Vec<Duration>,
    screen: Screen,
    package: Option<ProductPackage>,
    editor: ListingEditor,
    error: Option<String>,
    generating: bool,
    publishing: bool,
}

impl<A: AgentClient, S: LocalStorage> Session<A, S> {
    pub fn new(agent: A, agents: AgentIds, catalog: CatalogStore<S>) -> Self {
        Self {
            agent,
            agents,
            catalog,
            step_delays: DEFAULT_STEP_DELAYS.to_vec(),
            screen: Screen::Intake,
            package: None,
            editor: ListingEditor::default(),
            error: None,
            generating: false,
            publishing: false,
        }
    }

    pub fn with_step_delays(mut self, delays: Vec<Duration>) -> Self {
        self.step_delays = delays;
        self
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn package(&self) -> Option<&ProductPackage> {
        self.package.as_ref()
    }

    pub fn editor(&self) -> &ListingEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut ListingEditor {
        &mut self.editor
    }

    /// The inline error from the last failed action, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_generating(&self) -> bool {
        self.generating
    }

    pub fn is_publishing(&self) -> bool {
        self.publishing
    }

    pub fn catalog(&self) -> &CatalogStore<S> {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut CatalogStore<S> {
        &mut self.catalog
    }

    pub fn go_to(&mut self, screen: Screen) {
        self.screen = screen;
    }

    /// Drop the working copy and return to the intake form.
    pub fn start_over(&mut self) {
        self.package = None;
        self.editor = ListingEditor::default();
        self.error = None;
        self.screen = Screen::Intake;
    }

    fn fail(&mut self, err: SessionError) -> SessionError {
        self.error = Some(match &err {
            SessionError::Agent(agent_err) => agent_err.user_message(),
            other => other.to_string(),
        });
        err
    }

    /// Send the intake to the manager agent and load the resulting package.
    ///
    /// A validation failure stays on the intake screen without any network
    /// call. An agent failure moves to the review screen with the error shown
    /// and the previous package (if any) left as it was.
    pub async fn generate(
        &mut self,
        form: &IntakeForm,
        progress: Option<indicatif::ProgressBar>,
    ) -> Result<&ProductPackage, SessionError> {
        if self.generating {
            return Err(SessionError::GenerationInFlight);
        }
        let instruction = match form.generation_instruction() {
            Ok(instruction) => instruction,
            Err(e) => return Err(self.fail(e.into())),
        };

        self.error = None;
        self.screen = Screen::Review;
        let outcome = {
            let _in_flight = InFlight::start(&mut self.generating);
            let mut ticker = StepTicker::start(&self.step_delays, progress);
            let outcome = self
                .agent
                .call_agent(&instruction, &self.agents.manager)
                .await
                .and_then(|result| result.into_response());
            ticker.finish();
            outcome
        };

        match outcome {
            Ok(response) => {
                let package = ProductPackage::from_response(&response);
                tracing::info!(product = %package.product_name, "package generated");
                self.editor = ListingEditor::seed(&package.listing_view());
                Ok(&*self.package.insert(package))
            }
            Err(e) => {
                tracing::warn!(error = %e, "generation failed");
                Err(self.fail(e.into()))
            }
        }
    }

    /// Send the edited listing to the publisher agent and record it as live.
    pub async fn publish(&mut self) -> Result<&ProductRecord, SessionError> {
        if self.publishing {
            return Err(SessionError::PublishInFlight);
        }
        let Some(package) = self.package.as_ref() else {
            return Err(self.fail(SessionError::NoPackage));
        };

        let instruction = PublishRequest {
            product_name: &package.product_name,
            product_type: &package.product_type,
            title: &self.editor.title,
            tagline: &self.editor.tagline,
            description: &self.editor.description,
            price: self.editor.price(),
            feature_bullets: self.editor.bullets(),
            category_tags: self.editor.tags(),
        }
        .instruction(&package.content());

        self.error = None;
        let outcome: Result<Value, AgentError> = {
            let _in_flight = InFlight::start(&mut self.publishing);
            self.agent
                .call_agent(&instruction, &self.agents.publisher)
                .await
                .and_then(|result| result.into_response())
        };

        let response = match outcome {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "publish failed");
                return Err(self.fail(e.into()));
            }
        };

        let Some(package) = self.package.as_ref() else {
            return Err(self.fail(SessionError::NoPackage));
        };
        let record = ProductRecord::live(
            package,
            &self.editor,
            response.clone(),
            published_at(&response),
        );
        tracing::info!(id = %record.id, title = %record.title, "product published");
        self.catalog.prepend(record);
        self.screen = Screen::Catalog;
        self.catalog
            .records()
            .first()
            .ok_or(SessionError::NoPackage)
    }

    /// Store the edited listing as a draft. No network call.
    pub fn save_draft(&mut self) -> Result<&ProductRecord, SessionError> {
        let Some(package) = self.package.as_ref() else {
            return Err(self.fail(SessionError::NoPackage));
        };
        let record = ProductRecord::draft(package, &self.editor);
        tracing::info!(id = %record.id, title = %record.title, "draft saved");
        self.error = None;
        self.catalog.prepend(record);
        self.screen = Screen::Catalog;
        self.catalog
            .records()
            .first()
            .ok_or(SessionError::NoPackage)
    }

    pub fn delete(&mut self, id: &str) -> Option<ProductRecord> {
        let removed = self.catalog.remove(id);
        if removed.is_some() {
            tracing::info!(id, "product deleted");
        }
        removed
    }
}

/// Holds an in-flight flag set until dropped, so a cancelled call (timeout,
/// `select!`, Ctrl-C) can't leave it stuck.
struct InFlight<'a> {
    flag: &'a mut bool,
}

impl<'a> InFlight<'a> {
    fn start(flag: &'a mut bool) -> Self {
        *flag = true;
        Self { flag }
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.flag = false;
    }
}

/// `published_at` from the publisher response, at either depth.
fn published_at(response: &Value) -> Option<String> {
    let direct = response.get("published_at");
    let nested = response.get("result").and_then(|r| r.get("published_at"));
    direct
        .or(nested)
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::AgentResult;
    use crate::catalog::ProductStatus;
    use crate::package::NOT_AVAILABLE;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted agent: answers calls in order and records what it was asked.
    #[derive(Clone, Default)]
    struct ScriptedAgent {
        answers: Arc<Mutex<VecDeque<Result<AgentResult, AgentError>>>>,
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl ScriptedAgent {
        fn answering(answers: Vec<Result<AgentResult, AgentError>>) -> Self {
            Self {
                answers: Arc::new(Mutex::new(answers.into())),
                calls: Arc::default(),
            }
        }

        fn calls(&self) -> Vec<(String, String)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl AgentClient for ScriptedAgent {
        async fn call_agent(
            &self,
            message: &str,
            agent_id: &str,
        ) -> Result<AgentResult, AgentError> {
            self.calls
                .lock()
                .unwrap()
                .push((message.to_string(), agent_id.to_string()));
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(AgentResult::failed("no scripted answer")))
        }
    }

    /// Agent whose calls never complete.
    struct HangingAgent;

    #[async_trait]
    impl AgentClient for HangingAgent {
        async fn call_agent(
            &self,
            _message: &str,
            _agent_id: &str,
        ) -> Result<AgentResult, AgentError> {
            std::future::pending().await
        }
    }

    fn ids() -> AgentIds {
        AgentIds {
            manager: "manager-agent".into(),
            publisher: "publisher-agent".into(),
        }
    }

    fn session(agent: &ScriptedAgent) -> Session<ScriptedAgent, MemoryStorage> {
        Session::new(agent.clone(), ids(), CatalogStore::load(MemoryStorage::default()))
            .with_step_delays(Vec::new())
    }

    fn generated() -> AgentResult {
        AgentResult::ok(json!({
            "result": {
                "product_package": {
                    "product_name": "Budget Planner Kit",
                    "product_type": "Template",
                    "market_research": {"market_overview": "Busy market"},
                    "product_content": {"files": ["planner.xlsx", "guide.pdf"]},
                    "listing": {
                        "title": "Budget Planner Kit",
                        "tagline": "Own your money",
                        "description": "Spreadsheets that work",
                        "price": 19,
                        "feature_bullets": ["Monthly view"],
                        "category_tags": "[\"finance\"]"
                    }
                }
            }
        }))
    }

    #[tokio::test]
    async fn empty_idea_is_rejected_without_a_call() {
        let agent = ScriptedAgent::default();
        let mut s = session(&agent);
        let err = s.generate(&IntakeForm::new("  "), None).await.unwrap_err();
        assert!(matches!(err, SessionError::Intake(_)));
        assert_eq!(s.screen(), Screen::Intake);
        assert_eq!(s.error(), Some("Please describe your product idea"));
        assert!(agent.calls().is_empty());
        assert!(s.catalog().is_empty());
    }

    #[tokio::test]
    async fn reported_failure_is_shown_and_retry_works() {
        let agent = ScriptedAgent::answering(vec![
            Ok(AgentResult::failed("rate limited")),
            Ok(generated()),
        ]);
        let mut s = session(&agent);
        let form = IntakeForm::new("budget planner");

        assert!(s.generate(&form, None).await.is_err());
        assert_eq!(s.screen(), Screen::Review);
        assert_eq!(s.error(), Some("rate limited"));
        assert!(s.package().is_none());
        assert!(!s.is_generating());

        s.generate(&form, None).await.unwrap();
        assert!(s.error().is_none());
        assert_eq!(s.package().unwrap().product_name, "Budget Planner Kit");
    }

    #[tokio::test]
    async fn failure_keeps_previous_package() {
        let agent = ScriptedAgent::answering(vec![
            Ok(generated()),
            Err(AgentError::Status { status: 503 }),
        ]);
        let mut s = session(&agent);
        let form = IntakeForm::new("budget planner");
        s.generate(&form, None).await.unwrap();
        s.editor_mut().title = "Edited".into();

        assert!(s.generate(&form, None).await.is_err());
        assert!(s.error().unwrap().contains("503"));
        assert_eq!(s.package().unwrap().product_name, "Budget Planner Kit");
        assert_eq!(s.editor().title, "Edited");
    }

    #[tokio::test]
    async fn generate_sends_intake_to_manager_and_seeds_editor() {
        let agent = ScriptedAgent::answering(vec![Ok(generated())]);
        let mut s = session(&agent);
        let form = IntakeForm {
            idea: "budget planner".into(),
            target_audience: Some("students".into()),
            ..IntakeForm::default()
        };
        s.generate(&form, None).await.unwrap();

        let calls = agent.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, "manager-agent");
        assert!(calls[0].0.contains("Target audience: students"));
        assert_eq!(s.editor().tags(), ["finance"]);
        assert_eq!(s.editor().price(), 19.0);
    }

    #[tokio::test]
    async fn missing_market_research_renders_defaults() {
        let agent = ScriptedAgent::answering(vec![Ok(AgentResult::ok(json!({
            "product_name": "Bare",
            "listing": {"title": "Bare"}
        })))]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("idea"), None).await.unwrap();
        let research = s.package().unwrap().research();
        assert_eq!(research.market_overview, NOT_AVAILABLE);
        assert!(research.competitors.is_empty());
    }

    #[tokio::test]
    async fn publish_prepends_live_record_with_edits() {
        let agent = ScriptedAgent::answering(vec![
            Ok(generated()),
            Ok(AgentResult::ok(json!({
                "result": {"published_at": "2025-02-01T10:00:00Z", "product_url": "https://payhip.com/b/abc"}
            }))),
        ]);
        let mut s = session(&agent);
        s.catalog_mut().prepend(older_draft());
        let existing = s.catalog().records()[0].id.clone();

        s.generate(&IntakeForm::new("budget planner"), None).await.unwrap();
        s.editor_mut().title = "Edited Title".into();
        s.editor_mut().add_bullet("Debt tracker");

        let record = s.publish().await.unwrap().clone();
        assert_eq!(record.status, ProductStatus::Live);
        assert_eq!(record.title, "Edited Title");
        assert_eq!(record.feature_bullets, ["Monthly view", "Debt tracker"]);
        assert_eq!(record.published_at.as_deref(), Some("2025-02-01T10:00:00Z"));
        assert_eq!(
            record.publisher_response.as_ref().unwrap()["result"]["product_url"],
            "https://payhip.com/b/abc"
        );

        assert_eq!(s.catalog().records()[0].id, record.id);
        assert_eq!(s.catalog().records()[1].id, existing);
        assert_eq!(s.screen(), Screen::Catalog);

        let calls = agent.calls();
        assert_eq!(calls[1].1, "publisher-agent");
        assert!(calls[1].0.contains("Title: Edited Title"));
        assert!(calls[1].0.contains("planner.xlsx, guide.pdf"));
    }

    #[tokio::test]
    async fn publish_without_timestamp_uses_now() {
        let agent = ScriptedAgent::answering(vec![Ok(generated()), Ok(AgentResult::ok(json!({})))]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("budget planner"), None).await.unwrap();
        let record = s.publish().await.unwrap();
        assert!(record.published_at.as_deref().is_some_and(|at| !at.is_empty()));
    }

    #[tokio::test]
    async fn publish_failure_persists_nothing_and_keeps_edits() {
        let agent = ScriptedAgent::answering(vec![
            Ok(generated()),
            Ok(AgentResult::failed("store unavailable")),
        ]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("budget planner"), None).await.unwrap();
        s.editor_mut().title = "Keep me".into();

        assert!(s.publish().await.is_err());
        assert_eq!(s.error(), Some("store unavailable"));
        assert!(s.catalog().is_empty());
        assert_eq!(s.editor().title, "Keep me");
        assert!(!s.is_publishing());
        assert_eq!(s.screen(), Screen::Review);
    }

    #[tokio::test]
    async fn publish_and_draft_require_a_package() {
        let agent = ScriptedAgent::default();
        let mut s = session(&agent);
        assert!(matches!(s.publish().await, Err(SessionError::NoPackage)));
        assert!(matches!(s.save_draft(), Err(SessionError::NoPackage)));
        assert!(agent.calls().is_empty());
    }

    #[tokio::test]
    async fn draft_is_saved_without_network() {
        let agent = ScriptedAgent::answering(vec![Ok(generated())]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("budget planner"), None).await.unwrap();
        s.editor_mut().set_price(9.0).unwrap();

        let record = s.save_draft().unwrap().clone();
        assert_eq!(record.status, ProductStatus::Draft);
        assert!(record.published_at.is_none());
        assert_eq!(record.price, 9.0);
        assert_eq!(agent.calls().len(), 1);
        assert_eq!(s.screen(), Screen::Catalog);
        assert_eq!(s.catalog().records().len(), 1);
    }

    #[tokio::test]
    async fn start_over_clears_working_copy_only() {
        let agent = ScriptedAgent::answering(vec![Ok(generated())]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("budget planner"), None).await.unwrap();
        s.save_draft().unwrap();
        s.start_over();
        assert!(s.package().is_none());
        assert!(s.editor().bullets().is_empty());
        assert_eq!(s.screen(), Screen::Intake);
        assert_eq!(s.catalog().records().len(), 1);
    }

    #[tokio::test]
    async fn delete_removes_by_id() {
        let agent = ScriptedAgent::default();
        let mut s = session(&agent);
        s.catalog_mut().prepend(older_draft());
        let id = s.catalog().records()[0].id.clone();
        assert!(s.delete(&id).is_some());
        assert!(s.delete(&id).is_none());
        assert!(s.catalog().is_empty());
    }

    #[test]
    fn published_at_found_at_either_depth() {
        assert_eq!(published_at(&json!({"published_at": "a"})).as_deref(), Some("a"));
        assert_eq!(
            published_at(&json!({"result": {"published_at": "b"}})).as_deref(),
            Some("b")
        );
        assert_eq!(published_at(&json!({"result": "text"})), None);
    }

    fn older_draft() -> ProductRecord {
        let pkg = ProductPackage::from_response(&json!({"product_name": "Older"}));
        ProductRecord::draft(&pkg, &ListingEditor::default())
    }

    #[tokio::test]
    async fn in_flight_flags_reject_overlapping_calls() {
        let agent = ScriptedAgent::answering(vec![Ok(generated())]);
        let mut s = session(&agent);
        let form = IntakeForm::new("budget planner");

        s.generating = true;
        let err = s.generate(&form, None).await.unwrap_err();
        assert!(matches!(err, SessionError::GenerationInFlight));
        s.generating = false;

        s.generate(&form, None).await.unwrap();
        s.publishing = true;
        let err = s.publish().await.unwrap_err();
        assert!(matches!(err, SessionError::PublishInFlight));
        assert_eq!(agent.calls().len(), 1);
        assert!(s.catalog().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_generation_clears_flag_and_allows_retry() {
        let mut s = Session::new(
            HangingAgent,
            ids(),
            CatalogStore::load(MemoryStorage::default()),
        );
        let form = IntakeForm::new("budget planner");

        let timed_out =
            tokio::time::timeout(Duration::from_secs(1), s.generate(&form, None)).await;
        assert!(timed_out.is_err());
        assert!(!s.is_generating());

        let again =
            tokio::time::timeout(Duration::from_secs(1), s.generate(&form, None)).await;
        assert!(again.is_err(), "second attempt should reach the agent and hang");
        assert!(!s.is_generating());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_publish_clears_flag() {
        let agent = ScriptedAgent::answering(vec![Ok(generated())]);
        let mut s = session(&agent);
        s.generate(&IntakeForm::new("budget planner"), None)
            .await
            .unwrap();

        let mut hanging = Session::new(
            HangingAgent,
            ids(),
            CatalogStore::load(MemoryStorage::default()),
        );
        hanging.package = s.package.clone();
        hanging.editor = s.editor.clone();

        let timed_out = tokio::time::timeout(Duration::from_secs(1), hanging.publish()).await;
        assert!(timed_out.is_err());
        assert!(!hanging.is_publishing());
        assert!(hanging.catalog().is_empty());
    }
}
