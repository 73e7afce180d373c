//! Scriptable in-memory [`ClusterFacade`] for tests.
//!
//! [`MockFacade`] serves queued replies instead of talking to a cluster.
//! Replies are scripted per request family; the last queued reply is
//! sticky and keeps being served once the queue is down to one entry, so
//! periodic pollers see a stable answer after a scripted failure sequence.
//!
//! The mock also records every dispatched request and tracks a
//! [`PayloadCounter`] for every content buffer it hands out —
//! [`MockFacade::outstanding_payloads`] is the leak gauge tests assert
//! against after an operation settles.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use reef_types::ClusterConfig;

use crate::error::FacadeError;
use crate::facade::ClusterFacade;
use crate::message::{
    GetBucketConfigRequest, GetBucketConfigResponse, GetClusterConfigResponse, KeyValueStatus,
    ObserveRequest, ObserveResponse, ObserveStatus, ResponseStatus,
};
use crate::payload::{Payload, PayloadCounter};

// ---------------------------------------------------------------------------
// Scripted replies
// ---------------------------------------------------------------------------

/// One scripted answer to a [`GetBucketConfigRequest`].
#[derive(Debug, Clone)]
pub enum ConfigReply {
    /// Fail the facade call itself; no response is delivered.
    Error(String),
    /// Deliver a response with the given statuses and body.
    Respond {
        /// Coarse outcome.
        status: ResponseStatus,
        /// Key-value protocol status.
        kv_status: KeyValueStatus,
        /// Raw config body.
        body: Bytes,
    },
}

impl ConfigReply {
    /// A transport-level failure.
    pub fn error(message: impl Into<String>) -> Self {
        ConfigReply::Error(message.into())
    }

    /// A successful response carrying the given body.
    pub fn success(body: impl Into<Bytes>) -> Self {
        ConfigReply::Respond {
            status: ResponseStatus::Success,
            kv_status: KeyValueStatus::Success,
            body: body.into(),
        }
    }

    /// A delivered-but-failed response.
    pub fn failure(kv_status: KeyValueStatus, body: impl Into<Bytes>) -> Self {
        ConfigReply::Respond {
            status: ResponseStatus::Failure,
            kv_status,
            body: body.into(),
        }
    }
}

/// One scripted answer to an [`ObserveRequest`].
#[derive(Debug, Clone)]
pub enum ObserveReply {
    /// Fail the facade call itself; no response is delivered.
    Error(String),
    /// Deliver an observe response with the given state and CAS.
    Respond {
        /// Observed document state.
        status: ObserveStatus,
        /// CAS as seen by the probed node.
        cas: u64,
    },
}

impl ObserveReply {
    /// A transport-level failure.
    pub fn error(message: impl Into<String>) -> Self {
        ObserveReply::Error(message.into())
    }

    /// A delivered observe response.
    pub fn status(status: ObserveStatus, cas: u64) -> Self {
        ObserveReply::Respond { status, cas }
    }
}

// ---------------------------------------------------------------------------
// Mock facade
// ---------------------------------------------------------------------------

/// In-memory [`ClusterFacade`] serving scripted replies.
#[derive(Default)]
pub struct MockFacade {
    config_replies: Mutex<VecDeque<ConfigReply>>,
    observe_replies: Mutex<HashMap<(bool, u16), VecDeque<ObserveReply>>>,
    cluster_config: Mutex<Option<ClusterConfig>>,
    issued: Mutex<Vec<PayloadCounter>>,
    config_requests: Mutex<Vec<GetBucketConfigRequest>>,
    observe_requests: Mutex<Vec<ObserveRequest>>,
    cluster_config_requests: AtomicUsize,
}

impl MockFacade {
    /// Create a mock with nothing scripted. Unscripted requests fail with
    /// a transport error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue replies for bucket-config requests, served in order; the
    /// last reply is sticky.
    pub fn queue_config_replies(&self, replies: impl IntoIterator<Item = ConfigReply>) {
        self.config_replies.lock().unwrap().extend(replies);
    }

    /// Queue replies for observe probes against the active copy.
    pub fn script_master(&self, replies: impl IntoIterator<Item = ObserveReply>) {
        self.script_observe(true, 0, replies);
    }

    /// Queue replies for observe probes against replica `index` (1-based).
    pub fn script_replica(&self, index: u16, replies: impl IntoIterator<Item = ObserveReply>) {
        self.script_observe(false, index, replies);
    }

    /// Queue replies for observe probes matching `(master, replica_index)`.
    pub fn script_observe(
        &self,
        master: bool,
        replica_index: u16,
        replies: impl IntoIterator<Item = ObserveReply>,
    ) {
        self.observe_replies
            .lock()
            .unwrap()
            .entry((master, replica_index))
            .or_default()
            .extend(replies);
    }

    /// Install the cluster config snapshot served to
    /// [`ClusterFacade::get_cluster_config`].
    pub fn set_cluster_config(&self, config: ClusterConfig) {
        *self.cluster_config.lock().unwrap() = Some(config);
    }

    /// Every bucket-config request dispatched so far.
    pub fn config_requests(&self) -> Vec<GetBucketConfigRequest> {
        self.config_requests.lock().unwrap().clone()
    }

    /// Every observe request dispatched so far.
    pub fn observe_requests(&self) -> Vec<ObserveRequest> {
        self.observe_requests.lock().unwrap().clone()
    }

    /// Number of cluster-config fetches dispatched so far.
    pub fn cluster_config_requests(&self) -> usize {
        self.cluster_config_requests.load(Ordering::Relaxed)
    }

    /// Counters for every content buffer this mock has handed out.
    pub fn issued_payloads(&self) -> Vec<PayloadCounter> {
        self.issued.lock().unwrap().clone()
    }

    /// Number of handed-out buffers that are still unreleased.
    pub fn outstanding_payloads(&self) -> usize {
        self.issued
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.ref_count() > 0)
            .count()
    }

    fn track(&self, payload: &Payload) {
        self.issued.lock().unwrap().push(payload.counter());
    }
}

/// Pop the next reply; the last queued reply stays and keeps being served.
fn pop_sticky<T: Clone>(queue: &mut VecDeque<T>) -> Option<T> {
    if queue.len() > 1 {
        queue.pop_front()
    } else {
        queue.front().cloned()
    }
}

#[async_trait]
impl ClusterFacade for MockFacade {
    async fn get_bucket_config(
        &self,
        request: GetBucketConfigRequest,
    ) -> Result<GetBucketConfigResponse, FacadeError> {
        self.config_requests.lock().unwrap().push(request.clone());

        let reply = pop_sticky(&mut self.config_replies.lock().unwrap());
        match reply {
            Some(ConfigReply::Error(message)) => Err(FacadeError::Transport(message)),
            Some(ConfigReply::Respond {
                status,
                kv_status,
                body,
            }) => {
                let content = Payload::new(body);
                self.track(&content);
                Ok(GetBucketConfigResponse {
                    status,
                    kv_status,
                    bucket: request.bucket,
                    content,
                    origin: request.hostname,
                })
            }
            None => Err(FacadeError::Transport(format!(
                "no scripted config reply for {}",
                request.hostname
            ))),
        }
    }

    async fn observe(&self, request: ObserveRequest) -> Result<ObserveResponse, FacadeError> {
        self.observe_requests.lock().unwrap().push(request.clone());

        let key = (request.master, request.replica_index);
        let reply = {
            let mut scripts = self.observe_replies.lock().unwrap();
            scripts.get_mut(&key).and_then(pop_sticky)
        };

        match reply {
            Some(ObserveReply::Error(message)) => Err(FacadeError::Transport(message)),
            Some(ObserveReply::Respond { status, cas }) => {
                let content = Payload::new(Bytes::new());
                self.track(&content);
                Ok(ObserveResponse {
                    observe_status: status,
                    cas,
                    master: request.master,
                    content,
                })
            }
            None => Err(FacadeError::Transport(format!(
                "no scripted observe reply for master={} replica={}",
                request.master, request.replica_index
            ))),
        }
    }

    async fn get_cluster_config(&self) -> Result<GetClusterConfigResponse, FacadeError> {
        self.cluster_config_requests.fetch_add(1, Ordering::Relaxed);

        match self.cluster_config.lock().unwrap().clone() {
            Some(config) => Ok(GetClusterConfigResponse { config }),
            None => Err(FacadeError::Transport("no cluster config scripted".into())),
        }
    }
}
