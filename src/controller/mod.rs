//! Owns the single run session and drives it through
//! `Idle -> Running -> Succeeded | Failed`, with reset back to `Idle` at any time.

pub mod events;
pub mod state;

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{RwLock, broadcast};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::{
    client::AgentApi,
    decoder::{decode_agent_response, decode_plan_preview},
    error::{Error, RequestFailure, Result},
    models::{AgentResponse, ExecuteRequest, GoalRequest, MaxSteps, PlanPreview},
};

pub use events::RunEvent;
pub use state::{Phase, RunInfo, RunSnapshot, RunState};
use state::Session;

const EVENT_CAPACITY: usize = 64;

/// Single-flight controller for agent runs.
///
/// Cloning shares the session; at most one `execute` call is in flight across all
/// clones.
pub struct RunController<A: AgentApi> {
    api: Arc<A>,
    session: Arc<RwLock<Session>>,
    events: broadcast::Sender<RunEvent>,
}

impl<A: AgentApi> Clone for RunController<A> {
    fn clone(&self) -> Self {
        Self {
            api: self.api.clone(),
            session: self.session.clone(),
            events: self.events.clone(),
        }
    }
}

impl<A: AgentApi + 'static> RunController<A> {
    pub fn new(api: A) -> Self {
        Self::with_shared_api(Arc::new(api))
    }

    pub fn with_shared_api(api: Arc<A>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            api,
            session: Arc::new(RwLock::new(Session::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<RunEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> RunSnapshot {
        RunSnapshot::of(&*self.session.read().await)
    }

    pub async fn phase(&self) -> Phase {
        self.session.read().await.state.phase()
    }

    /// Accepted in every phase, including while a run is in flight.
    pub async fn set_goal(&self, goal: impl Into<String>) {
        self.session.write().await.goal = goal.into();
    }

    /// Clamps into the allowed range and returns what was stored.
    pub async fn set_max_steps(&self, value: i64) -> MaxSteps {
        let max_steps = MaxSteps::new(value);
        self.session.write().await.max_steps = max_steps;
        max_steps
    }

    /// Starts a run with the current goal and step budget and waits for it to end.
    ///
    /// Returns the phase the session is in afterwards. Remote failures are not
    /// errors here; they land the session in [`Phase::Failed`]. Errors are only
    /// [`Error::Busy`] when a run is already in flight and [`Error::Validation`]
    /// for a blank goal, and neither changes the phase.
    pub async fn submit(&self) -> Result<Phase> {
        let (request, run_id, generation) = {
            let mut session = self.session.write().await;

            if let Some(current) = session.in_flight {
                warn!(%current, "submit ignored: run already in flight");
                return Err(Error::Busy);
            }

            let request = match GoalRequest::new(&session.goal, session.max_steps) {
                Ok(request) => request,
                Err(err) => {
                    let reason = err.to_string();
                    debug!(%reason, phase = %session.state.phase(), "submit rejected");
                    session.validation_error = Some(reason.clone());
                    self.emit(RunEvent::Rejected { reason });
                    return Err(err);
                }
            };

            let run_id = Uuid::new_v4();
            session.validation_error = None;
            session.state = RunState::Running;
            session.in_flight = Some(run_id);
            session.run = Some(RunInfo {
                id: run_id,
                started_at: Utc::now(),
                finished_at: None,
            });
            (request, run_id, session.generation)
        };

        info!(
            %run_id,
            goal = %request.goal,
            max_steps = request.max_steps.get(),
            "run started"
        );
        self.emit(RunEvent::Started {
            run_id,
            goal: request.goal.clone(),
            max_steps: request.max_steps.get(),
        });

        // The call and its completion run in tasks owned by the controller, so the
        // session reaches a terminal phase even if this future is dropped.
        let api = self.api.clone();
        let call = tokio::spawn(async move { api.execute(&ExecuteRequest::from(request)).await });
        let controller = self.clone();
        let completion = tokio::spawn(async move {
            let outcome = match call.await {
                Ok(reply) => reply.and_then(|body| decode_agent_response(&body)),
                Err(err) => {
                    error!(%run_id, error = %err, "agent call task ended without an answer");
                    Err(RequestFailure::aborted())
                }
            };
            controller.complete(run_id, generation, outcome).await
        });

        match completion.await {
            Ok(phase) => Ok(phase),
            Err(err) => {
                error!(%run_id, error = %err, "run completion task failed");
                Ok(self.phase().await)
            }
        }
    }

    /// Applies the single terminal transition for `run_id` and frees the slot.
    async fn complete(
        &self,
        run_id: Uuid,
        generation: u64,
        outcome: core::result::Result<AgentResponse, RequestFailure>,
    ) -> Phase {
        let mut session = self.session.write().await;
        if session.in_flight == Some(run_id) {
            session.in_flight = None;
        }

        if session.generation != generation {
            info!(%run_id, "run finished after reset; result discarded");
            self.emit(RunEvent::Discarded { run_id });
            return session.state.phase();
        }

        if let Some(run) = session.run.as_mut() {
            run.finished_at = Some(Utc::now());
        }

        match outcome {
            Ok(response) => {
                let steps = response.intermediate.len();
                info!(%run_id, steps, "run succeeded");
                session.state = RunState::Succeeded(response);
                self.emit(RunEvent::Succeeded { run_id, steps });
            }
            Err(failure) => {
                let message = failure.resolved_message();
                error!(%run_id, cause = ?failure.cause, %message, "run failed");
                session.state = RunState::Failed(message.clone());
                self.emit(RunEvent::Failed { run_id, message });
            }
        }

        session.state.phase()
    }

    /// Back to `Idle` with an empty goal and default step budget. A run still in
    /// flight keeps the single-flight slot until it resolves, then is discarded.
    pub async fn reset(&self) {
        let mut session = self.session.write().await;
        if let Some(run_id) = session.in_flight {
            debug!(%run_id, "reset while run in flight");
        }
        let generation = session.generation + 1;
        let in_flight = session.in_flight;
        *session = Session {
            generation,
            in_flight,
            ..Session::default()
        };
        info!("session reset");
        self.emit(RunEvent::Reset);
    }

    /// Asks the agent for a plan without executing it. Leaves the run session alone.
    pub async fn preview_plan(&self) -> Result<PlanPreview> {
        let request = {
            let session = self.session.read().await;
            GoalRequest::new(&session.goal, session.max_steps)?
        };
        debug!(goal = %request.goal, "requesting plan preview");
        let body = self.api.plan(&ExecuteRequest::from(request)).await?;
        Ok(decode_plan_preview(&body)?)
    }

    fn emit(&self, event: RunEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}
