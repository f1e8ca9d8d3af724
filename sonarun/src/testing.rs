//! In-memory backend used by unit tests.

use sonarqube_api::{
    ComponentMeasures, Plugin, ProjectAnalyses, SonarError, SystemStatus, Task, UserToken,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::backend::Backend;

#[derive(Default)]
struct Script {
    statuses: VecDeque<Result<SystemStatus, SonarError>>,
    tokens: VecDeque<Result<UserToken, SonarError>>,
    revocations: VecDeque<Result<(), SonarError>>,
    tasks: VecDeque<Result<Task, SonarError>>,
    analyses: VecDeque<Result<ProjectAnalyses, SonarError>>,
    plugins: VecDeque<Result<Vec<Plugin>, SonarError>>,
    measures: VecDeque<Result<ComponentMeasures, SonarError>>,
    calls: Vec<String>,
}

/// Backend answering from scripted queues, recording every call
#[derive(Clone, Default)]
pub struct FakeBackend {
    script: Arc<Mutex<Script>>,
}

fn exhausted<T>(what: &str) -> Result<T, SonarError> {
    Err(SonarError::InvalidResponse(format!("no scripted {what} reply")))
}

pub fn status(value: &str) -> SystemStatus {
    serde_json::from_value(serde_json::json!({ "status": value })).unwrap()
}

pub fn token(name: &str, value: &str) -> UserToken {
    serde_json::from_value(serde_json::json!({ "login": "admin", "name": name, "token": value }))
        .unwrap()
}

pub fn task(id: &str, status: &str, error_message: Option<&str>) -> Task {
    serde_json::from_value(serde_json::json!({
        "id": id,
        "status": status,
        "errorMessage": error_message,
    }))
    .unwrap()
}

pub fn analyses(count: usize) -> ProjectAnalyses {
    let analyses: Vec<_> = (0..count)
        .map(|i| serde_json::json!({ "key": format!("A{i}") }))
        .collect();
    serde_json::from_value(serde_json::json!({ "analyses": analyses })).unwrap()
}

pub fn plugins(keys: &[&str]) -> Vec<Plugin> {
    keys.iter()
        .map(|key| serde_json::from_value(serde_json::json!({ "key": key })).unwrap())
        .collect()
}

pub fn measures(pairs: &[(&str, &str)]) -> ComponentMeasures {
    let measures: Vec<_> = pairs
        .iter()
        .map(|(metric, value)| serde_json::json!({ "metric": metric, "value": value }))
        .collect();
    serde_json::from_value(serde_json::json!({ "component": { "measures": measures } })).unwrap()
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_status(&self, reply: Result<SystemStatus, SonarError>) -> &Self {
        self.script.lock().unwrap().statuses.push_back(reply);
        self
    }

    pub fn push_token(&self, reply: Result<UserToken, SonarError>) -> &Self {
        self.script.lock().unwrap().tokens.push_back(reply);
        self
    }

    pub fn push_revocation(&self, reply: Result<(), SonarError>) -> &Self {
        self.script.lock().unwrap().revocations.push_back(reply);
        self
    }

    pub fn push_task(&self, reply: Result<Task, SonarError>) -> &Self {
        self.script.lock().unwrap().tasks.push_back(reply);
        self
    }

    pub fn push_analyses(&self, reply: Result<ProjectAnalyses, SonarError>) -> &Self {
        self.script.lock().unwrap().analyses.push_back(reply);
        self
    }

    pub fn push_plugins(&self, reply: Result<Vec<Plugin>, SonarError>) -> &Self {
        self.script.lock().unwrap().plugins.push_back(reply);
        self
    }

    pub fn push_measures(&self, reply: Result<ComponentMeasures, SonarError>) -> &Self {
        self.script.lock().unwrap().measures.push_back(reply);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.script.lock().unwrap().calls.clone()
    }

    fn record(&self, call: String) {
        self.script.lock().unwrap().calls.push(call);
    }
}

impl Backend for FakeBackend {
    async fn system_status(&self) -> Result<SystemStatus, SonarError> {
        self.record("status".to_string());
        let reply = self.script.lock().unwrap().statuses.pop_front();
        reply.unwrap_or_else(|| exhausted("status"))
    }

    async fn generate_token(&self, name: &str) -> Result<UserToken, SonarError> {
        self.record(format!("generate:{name}"));
        let reply = self.script.lock().unwrap().tokens.pop_front();
        reply.unwrap_or_else(|| exhausted("token"))
    }

    async fn revoke_token(&self, name: &str) -> Result<(), SonarError> {
        self.record(format!("revoke:{name}"));
        let reply = self.script.lock().unwrap().revocations.pop_front();
        reply.unwrap_or(Ok(()))
    }

    async fn task(&self, task_id: &str) -> Result<Task, SonarError> {
        self.record(format!("task:{task_id}"));
        let reply = self.script.lock().unwrap().tasks.pop_front();
        reply.unwrap_or_else(|| exhausted("task"))
    }

    async fn project_analyses(&self, project_key: &str) -> Result<ProjectAnalyses, SonarError> {
        self.record(format!("analyses:{project_key}"));
        let reply = self.script.lock().unwrap().analyses.pop_front();
        reply.unwrap_or_else(|| exhausted("analyses"))
    }

    async fn installed_plugins(&self) -> Result<Vec<Plugin>, SonarError> {
        self.record("plugins".to_string());
        let reply = self.script.lock().unwrap().plugins.pop_front();
        reply.unwrap_or_else(|| exhausted("plugins"))
    }

    async fn measures(
        &self,
        component_key: &str,
        metric_keys: &[String],
    ) -> Result<ComponentMeasures, SonarError> {
        self.record(format!("measures:{component_key}:{}", metric_keys.join(",")));
        let reply = self.script.lock().unwrap().measures.pop_front();
        reply.unwrap_or_else(|| exhausted("measures"))
    }
}
