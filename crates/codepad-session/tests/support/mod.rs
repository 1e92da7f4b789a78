//! In-process fakes for the project backend and the execution service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use codepad_client::{ExecutionService, ProjectApi};
use codepad_core::{EditorError, ExecutionRequest, ExecutionResult, Project, ProjectId};
use tokio::sync::Semaphore;

pub fn project(id: &str, code: &str) -> Project {
    Project {
        id: ProjectId::from(id),
        name: format!("{id} demo"),
        code: code.to_string(),
        language: "python".to_string(),
        version: "3.10.0".to_string(),
    }
}

/// Optional gate: when set, every call waits for one permit.
fn gate(permits: Option<usize>) -> Option<Semaphore> {
    permits.map(Semaphore::new)
}

async fn pass(gate: &Option<Semaphore>) {
    if let Some(gate) = gate {
        gate.acquire().await.expect("gate closed").forget();
    }
}

// ---------------------------------------------------------------------------
// Project backend
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeBackend {
    pub projects: Mutex<HashMap<ProjectId, Project>>,
    /// `(token, code)` of every save request received, in arrival order.
    pub saves: Mutex<Vec<(Option<String>, String)>>,
    pub load_error: Mutex<Option<EditorError>>,
    pub save_error: Mutex<Option<EditorError>>,
    save_gate: Option<Semaphore>,
    /// Gated saves still waiting, with the code each one carries.
    waiting: Mutex<Vec<(String, Arc<Semaphore>)>>,
}

impl FakeBackend {
    pub fn with_project(project: Project) -> Self {
        let backend = FakeBackend::default();
        backend
            .projects
            .lock()
            .unwrap()
            .insert(project.id.clone(), project);
        backend
    }

    /// Saves block until released, either in arrival order by
    /// [`release_saves`](Self::release_saves) or one at a time by
    /// [`release_save_of`](Self::release_save_of).
    pub fn gated(mut self) -> Self {
        self.save_gate = gate(Some(0));
        self
    }

    pub fn release_saves(&self, n: usize) {
        if let Some(gate) = &self.save_gate {
            gate.add_permits(n);
        }
    }

    /// Lets the waiting save carrying `code` through.
    pub fn release_save_of(&self, code: &str) {
        let waiting = self.waiting.lock().unwrap();
        let (_, gate) = waiting
            .iter()
            .find(|(c, _)| c == code)
            .expect("no save waiting with that code");
        gate.add_permits(1);
    }

    pub fn waiting_saves(&self) -> usize {
        self.waiting.lock().unwrap().len()
    }

    async fn pass_save(&self, code: &str) {
        let Some(shared) = &self.save_gate else {
            return;
        };
        let own = Arc::new(Semaphore::new(0));
        self.waiting
            .lock()
            .unwrap()
            .push((code.to_string(), Arc::clone(&own)));
        tokio::select! {
            permit = shared.acquire() => permit.expect("gate closed").forget(),
            permit = own.acquire() => permit.expect("gate closed").forget(),
        }
        self.waiting
            .lock()
            .unwrap()
            .retain(|(_, gate)| !Arc::ptr_eq(gate, &own));
    }

    pub fn fail_loads(&self, err: EditorError) {
        *self.load_error.lock().unwrap() = Some(err);
    }

    pub fn reject_saves(&self, err: EditorError) {
        *self.save_error.lock().unwrap() = Some(err);
    }

    pub fn saved_codes(&self) -> Vec<String> {
        self.saves
            .lock()
            .unwrap()
            .iter()
            .map(|(_, code)| code.clone())
            .collect()
    }

    pub fn stored_code(&self, id: &str) -> Option<String> {
        self.projects
            .lock()
            .unwrap()
            .get(&ProjectId::from(id))
            .map(|p| p.code.clone())
    }
}

#[async_trait]
impl ProjectApi for FakeBackend {
    async fn load(&self, _token: Option<&str>, id: &ProjectId) -> Result<Project, EditorError> {
        if let Some(err) = self.load_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.projects
            .lock()
            .unwrap()
            .get(id)
            .cloned()
            .ok_or_else(|| EditorError::NotFound("Project not found".to_string()))
    }

    async fn save(
        &self,
        token: Option<&str>,
        id: &ProjectId,
        code: &str,
    ) -> Result<(), EditorError> {
        self.pass_save(code).await;
        self.saves
            .lock()
            .unwrap()
            .push((token.map(str::to_string), code.to_string()));
        if let Some(err) = self.save_error.lock().unwrap().clone() {
            return Err(err);
        }
        if let Some(project) = self.projects.lock().unwrap().get_mut(id) {
            project.code = code.to_string();
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Execution service
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub enum Reply {
    /// Echo the request content with exit code 0.
    Echo,
    Exit(i64, String),
    Fail(EditorError),
}

pub struct FakeExecutor {
    pub requests: Mutex<Vec<ExecutionRequest>>,
    reply: Mutex<Reply>,
    gate: Option<Semaphore>,
}

impl FakeExecutor {
    pub fn echo() -> Arc<Self> {
        Arc::new(Self::build(Reply::Echo, None))
    }

    pub fn replying(reply: Reply) -> Arc<Self> {
        Arc::new(Self::build(reply, None))
    }

    /// Every execute call waits for a permit; `permits` are available up front.
    pub fn gated(permits: usize) -> Arc<Self> {
        Arc::new(Self::build(Reply::Echo, Some(permits)))
    }

    fn build(reply: Reply, permits: Option<usize>) -> Self {
        FakeExecutor {
            requests: Mutex::new(Vec::new()),
            reply: Mutex::new(reply),
            gate: gate(permits),
        }
    }

    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn set_reply(&self, reply: Reply) {
        *self.reply.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn last_request(&self) -> Option<ExecutionRequest> {
        self.requests.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ExecutionService for FakeExecutor {
    async fn execute(&self, request: &ExecutionRequest) -> Result<ExecutionResult, EditorError> {
        self.requests.lock().unwrap().push(request.clone());
        pass(&self.gate).await;
        match self.reply.lock().unwrap().clone() {
            Reply::Echo => Ok(ExecutionResult::from_exit(0, request.content.clone())),
            Reply::Exit(code, output) => Ok(ExecutionResult::from_exit(code, output)),
            Reply::Fail(err) => Err(err),
        }
    }
}
