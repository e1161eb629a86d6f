//! Scripted producer and checker doubles shared across the test modules.
//! Each double pops pre-loaded responses in order; an exhausted script
//! fails the call so a test can also exercise the failure boundary.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::checkers::ConsistencySuite;
use crate::error::{EngineError, EngineResult};
use crate::producers::{
    DesignProducer, ImplementationProducer, ReasoningOracle, ResolutionReport,
};
use crate::session::{
    ChangeRequest, Conflict, DesignSpec, ImplementationBundle, SharedSessionState,
};

#[derive(Default)]
pub(crate) struct ScriptedDesigner {
    produces: Mutex<VecDeque<DesignSpec>>,
    resolutions: Mutex<VecDeque<ResolutionReport<DesignSpec>>>,
}

impl ScriptedDesigner {
    pub(crate) fn producing(specs: Vec<DesignSpec>) -> Self {
        Self {
            produces: Mutex::new(specs.into()),
            resolutions: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn resolving(reports: Vec<ResolutionReport<DesignSpec>>) -> Self {
        Self {
            produces: Mutex::new(VecDeque::new()),
            resolutions: Mutex::new(reports.into()),
        }
    }
}

#[async_trait]
impl DesignProducer for ScriptedDesigner {
    async fn produce(
        &self,
        _state: &SharedSessionState,
        _max_steps: u32,
    ) -> EngineResult<DesignSpec> {
        self.produces
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::Producer {
                role: "designer".into(),
                reason: "script exhausted".into(),
            })
    }

    async fn resolve_conflicts(
        &self,
        _state: &SharedSessionState,
        _request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<DesignSpec>> {
        self.resolutions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::Producer {
                role: "designer".into(),
                reason: "script exhausted".into(),
            })
    }
}

#[derive(Default)]
pub(crate) struct ScriptedImplementer {
    produces: Mutex<VecDeque<ImplementationBundle>>,
    resolutions: Mutex<VecDeque<ResolutionReport<ImplementationBundle>>>,
}

impl ScriptedImplementer {
    pub(crate) fn producing(bundles: Vec<ImplementationBundle>) -> Self {
        Self {
            produces: Mutex::new(bundles.into()),
            resolutions: Mutex::new(VecDeque::new()),
        }
    }

    pub(crate) fn resolving(reports: Vec<ResolutionReport<ImplementationBundle>>) -> Self {
        Self {
            produces: Mutex::new(VecDeque::new()),
            resolutions: Mutex::new(reports.into()),
        }
    }

}

#[async_trait]
impl ImplementationProducer for ScriptedImplementer {
    async fn produce(
        &self,
        _state: &SharedSessionState,
        _max_steps: u32,
    ) -> EngineResult<ImplementationBundle> {
        self.produces
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::Producer {
                role: "implementer".into(),
                reason: "script exhausted".into(),
            })
    }

    async fn resolve_conflicts(
        &self,
        _state: &SharedSessionState,
        _request: &ChangeRequest,
    ) -> EngineResult<ResolutionReport<ImplementationBundle>> {
        self.resolutions
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::Producer {
                role: "implementer".into(),
                reason: "script exhausted".into(),
            })
    }
}

pub(crate) struct ScriptedOracle {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedOracle {
    pub(crate) fn replying(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(String::from).collect()),
        }
    }
}

#[async_trait]
impl ReasoningOracle for ScriptedOracle {
    async fn decide(&self, _prompt: &str) -> EngineResult<String> {
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| EngineError::Oracle("script exhausted".into()))
    }
}

/// Checker suite that replays a scripted conflict trajectory, one entry
/// per run. Exhausted scripts report no conflicts.
pub(crate) struct ScriptedSuite {
    rounds: Mutex<VecDeque<Vec<Conflict>>>,
}

impl ScriptedSuite {
    pub(crate) fn with_rounds(rounds: Vec<Vec<Conflict>>) -> Self {
        Self {
            rounds: Mutex::new(rounds.into()),
        }
    }
}

impl ConsistencySuite for ScriptedSuite {
    fn run(&self, _state: &SharedSessionState) -> Vec<Conflict> {
        self.rounds.lock().unwrap().pop_front().unwrap_or_default()
    }
}
