//! Scripted transport for runner tests.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::time::Duration;

use crate::ollama::{CallError, FragmentStream, GenerateBackend, GenerateRequest, GenerateResponse, StreamChunk};

type Reply = Result<GenerateResponse, CallError>;
type ScriptedStream = Result<Vec<Result<StreamChunk, CallError>>, CallError>;

#[derive(Default)]
pub(crate) struct ScriptedBackend {
    replies: RefCell<VecDeque<Reply>>,
    stream: RefCell<Option<ScriptedStream>>,
    calls: RefCell<Vec<(GenerateRequest, Duration)>>,
}

impl ScriptedBackend {
    pub(crate) fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: RefCell::new(replies.into()),
            ..Default::default()
        }
    }

    pub(crate) fn with_stream(stream: ScriptedStream) -> Self {
        Self {
            stream: RefCell::new(Some(stream)),
            ..Default::default()
        }
    }

    pub(crate) fn calls(&self) -> Vec<(GenerateRequest, Duration)> {
        self.calls.borrow().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl GenerateBackend for ScriptedBackend {
    fn generate(&self, request: &GenerateRequest, timeout: Duration) -> Reply {
        self.calls.borrow_mut().push((request.clone(), timeout));
        self.replies
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(CallError::Connectivity("no scripted reply".into())))
    }

    fn generate_stream(
        &self,
        request: &GenerateRequest,
        timeout: Duration,
    ) -> Result<FragmentStream, CallError> {
        self.calls.borrow_mut().push((request.clone(), timeout));
        let chunks = self
            .stream
            .borrow_mut()
            .take()
            .unwrap_or_else(|| Err(CallError::Connectivity("no scripted stream".into())))?;
        Ok(Box::new(chunks.into_iter()))
    }
}
