//! Single-shot background calls to the backend.
//!
//! Each call runs on its own worker thread and reports back over a channel.
//! The UI drains the channel once per frame, so every state change still
//! happens on the UI thread.

use crate::client::{Backend, SearchRequest, SearchResponse, UploadFile, UploadResponse};
use crate::error::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Arc;

#[derive(Debug)]
pub enum TaskOutcome {
    Upload {
        seq: u64,
        file_name: String,
        file_size: usize,
        result: Result<UploadResponse>,
    },
    Search {
        seq: u64,
        result: Result<SearchResponse>,
    },
}

/// Hands out increasing request numbers and tells whether a response still
/// belongs to the newest request.
#[derive(Clone, Copy, Debug, Default)]
pub struct SequenceGuard {
    latest: u64,
}

impl SequenceGuard {
    pub fn next(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    pub fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dispatch {
    Thread,
    /// Run on the caller's thread. The outcome is still delivered through
    /// the channel so the apply path is the same.
    Inline,
}

pub struct TaskRunner {
    backend: Arc<dyn Backend>,
    sender: Sender<TaskOutcome>,
    receiver: Receiver<TaskOutcome>,
    dispatch: Dispatch,
    repaint: Option<egui::Context>,
}

impl TaskRunner {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self::with_dispatch(backend, Dispatch::Thread)
    }

    pub fn inline(backend: Arc<dyn Backend>) -> Self {
        Self::with_dispatch(backend, Dispatch::Inline)
    }

    fn with_dispatch(backend: Arc<dyn Backend>, dispatch: Dispatch) -> Self {
        let (sender, receiver) = unbounded();
        Self {
            backend,
            sender,
            receiver,
            dispatch,
            repaint: None,
        }
    }

    pub fn set_repaint_context(&mut self, ctx: egui::Context) {
        self.repaint = Some(ctx);
    }

    fn run<F>(&self, job: F)
    where
        F: FnOnce(&dyn Backend) -> TaskOutcome + Send + 'static,
    {
        let backend = Arc::clone(&self.backend);
        let sender = self.sender.clone();
        let repaint = self.repaint.clone();
        let work = move || {
            let outcome = job(backend.as_ref());
            if sender.send(outcome).is_err() {
                log::warn!("task finished after the dashboard went away");
            }
            if let Some(ctx) = repaint {
                ctx.request_repaint();
            }
        };
        match self.dispatch {
            Dispatch::Thread => {
                std::thread::spawn(work);
            }
            Dispatch::Inline => work(),
        }
    }

    pub fn upload(&self, seq: u64, file: UploadFile) {
        self.run(move |backend| TaskOutcome::Upload {
            seq,
            file_name: file.name.clone(),
            file_size: file.size(),
            result: backend.upload(&file),
        });
    }

    pub fn search(&self, seq: u64, request: SearchRequest) {
        self.run(move |backend| TaskOutcome::Search {
            seq,
            result: backend.search(&request),
        });
    }

    /// Everything that finished since the last call.
    pub fn drain(&self) -> Vec<TaskOutcome> {
        self.receiver.try_iter().collect()
    }
}
