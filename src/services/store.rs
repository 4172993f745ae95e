use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot, watch};

use super::{RequestHandler, Service, ServiceError};
use crate::repositories::state::{Action, State, Transition};

pub enum StoreRequest {
    Dispatch {
        action: Action,
        response: oneshot::Sender<(State, Transition)>,
    },
    Snapshot {
        response: oneshot::Sender<State>,
    },
}

/// Owns the session state. Every applied transition is published to the
/// watch channel.
#[derive(Clone)]
pub struct StoreRequestHandler {
    state: Arc<watch::Sender<State>>,
}

impl StoreRequestHandler {
    pub fn new(initial: State) -> Self {
        let (state, _) = watch::channel(initial);

        StoreRequestHandler {
            state: Arc::new(state),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.state.subscribe()
    }

    fn dispatch(&self, action: Action) -> (State, Transition) {
        let name = action.name();
        let mut next = self.state.borrow().clone();

        let transition = next.apply(action);
        match transition {
            Transition::Applied => {
                log::debug!("Applied {}.", name);
                self.state.send_replace(next.clone());
            }
            Transition::Ignored => {
                log::debug!("{} matched nothing, state unchanged.", name);
            }
        }

        (next, transition)
    }
}

#[async_trait]
impl RequestHandler<StoreRequest> for StoreRequestHandler {
    async fn handle_request(&self, request: StoreRequest) {
        match request {
            StoreRequest::Dispatch { action, response } => {
                let _ = response.send(self.dispatch(action));
            }
            StoreRequest::Snapshot { response } => {
                let _ = response.send(self.state.borrow().clone());
            }
        }
    }
}

pub struct StoreService;

impl StoreService {
    pub fn new() -> Self {
        StoreService {}
    }
}

#[async_trait]
impl Service<StoreRequest, StoreRequestHandler> for StoreService {}

/// Starts a store service over `initial` and returns its client.
pub fn spawn(initial: State) -> StoreHandle {
    let (store_tx, mut store_rx) = mpsc::channel(512);
    let handler = StoreRequestHandler::new(initial);
    let handle = StoreHandle::new(store_tx, handler.subscribe());
    let mut store_service = StoreService::new();

    tokio::spawn(async move {
        store_service.run(handler, &mut store_rx).await;
        log::info!("Store service stopped.");
    });

    handle
}

#[derive(Clone)]
pub struct StoreHandle {
    channel: mpsc::Sender<StoreRequest>,
    snapshots: watch::Receiver<State>,
}

impl StoreHandle {
    pub fn new(channel: mpsc::Sender<StoreRequest>, snapshots: watch::Receiver<State>) -> Self {
        Self { channel, snapshots }
    }

    /// Applies `action` and returns the snapshot it produced.
    pub async fn dispatch(&self, action: Action) -> Result<State, ServiceError> {
        self.apply(action).await.map(|(state, _)| state)
    }

    /// Like `dispatch`, but also reports whether the action changed anything.
    /// Callers use it when a follow-up depends on the transition having
    /// happened, since a snapshot read before dispatch can be stale.
    pub async fn apply(&self, action: Action) -> Result<(State, Transition), ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.channel
            .send(StoreRequest::Dispatch {
                action,
                response: response_tx,
            })
            .await
            .map_err(|e| ServiceError::Communication("Store".to_string(), e.to_string()))?;

        response_rx
            .await
            .map_err(|e| ServiceError::Communication("Store".to_string(), e.to_string()))
    }

    /// Snapshot ordered after every dispatch sent before it.
    pub async fn snapshot(&self) -> Result<State, ServiceError> {
        let (response_tx, response_rx) = oneshot::channel();

        self.channel
            .send(StoreRequest::Snapshot {
                response: response_tx,
            })
            .await
            .map_err(|e| ServiceError::Communication("Store".to_string(), e.to_string()))?;

        response_rx
            .await
            .map_err(|e| ServiceError::Communication("Store".to_string(), e.to_string()))
    }

    pub fn subscribe(&self) -> watch::Receiver<State> {
        self.snapshots.clone()
    }
}
