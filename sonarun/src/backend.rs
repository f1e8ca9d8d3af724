//! The backend operations an analysis run depends on.

use sonarqube_api::{
    ComponentMeasures, Plugin, ProjectAnalyses, SonarClient, SonarError, SystemStatus, Task,
    UserToken,
};
use std::future::Future;

/// Code-quality backend as seen by the run phases.
///
/// Implemented by [`SonarClient`] for real runs and by in-memory fakes in tests.
pub trait Backend {
    fn system_status(&self) -> impl Future<Output = Result<SystemStatus, SonarError>>;

    fn generate_token(&self, name: &str) -> impl Future<Output = Result<UserToken, SonarError>>;

    fn revoke_token(&self, name: &str) -> impl Future<Output = Result<(), SonarError>>;

    fn task(&self, task_id: &str) -> impl Future<Output = Result<Task, SonarError>>;

    fn project_analyses(
        &self,
        project_key: &str,
    ) -> impl Future<Output = Result<ProjectAnalyses, SonarError>>;

    fn installed_plugins(&self) -> impl Future<Output = Result<Vec<Plugin>, SonarError>>;

    fn measures(
        &self,
        component_key: &str,
        metric_keys: &[String],
    ) -> impl Future<Output = Result<ComponentMeasures, SonarError>>;
}

impl Backend for SonarClient {
    async fn system_status(&self) -> Result<SystemStatus, SonarError> {
        self.system_api().status().await
    }

    async fn generate_token(&self, name: &str) -> Result<UserToken, SonarError> {
        self.tokens_api().generate(name).await
    }

    async fn revoke_token(&self, name: &str) -> Result<(), SonarError> {
        self.tokens_api().revoke(name).await
    }

    async fn task(&self, task_id: &str) -> Result<Task, SonarError> {
        self.ce_api().task(task_id).await
    }

    async fn project_analyses(&self, project_key: &str) -> Result<ProjectAnalyses, SonarError> {
        self.projects_api().analyses(project_key).await
    }

    async fn installed_plugins(&self) -> Result<Vec<Plugin>, SonarError> {
        self.plugins_api().installed().await
    }

    async fn measures(
        &self,
        component_key: &str,
        metric_keys: &[String],
    ) -> Result<ComponentMeasures, SonarError> {
        self.measures_api().component(component_key, metric_keys).await
    }
}
