//! Document-store capability.
//!
//! The shell owns the actual store SDK; the core speaks in operations:
//! live subscriptions (streamed, full-snapshot semantics for collections),
//! one-shot CRUD writes, and unsubscription on teardown.

use crux_core::capability::{Capability, CapabilityContext, Operation};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// One document as pushed by the store: opaque id plus raw fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreDoc {
    pub id: String,
    pub fields: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StoreOperation {
    SubscribeCollection { collection: String },
    SubscribeDocument { path: String },
    Create { collection: String, fields: Value },
    Update { path: String, fields: Value },
    Delete { path: String },
    Unsubscribe { target: String },
}

impl Operation for StoreOperation {
    type Output = StoreResult;
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreOutput {
    /// The complete current collection, not a diff.
    Snapshot { docs: Vec<StoreDoc> },
    /// The subscribed document, or `None` when it does not exist.
    Document { doc: Option<StoreDoc> },
    Written { id: String },
    Done,
}

#[derive(Debug, Clone, Error, PartialEq, Serialize, Deserialize)]
pub enum StoreError {
    #[error("write failed: {message}")]
    Write { message: String },

    #[error("subscription failed: {message}")]
    Stream { message: String },
}

pub type StoreResult = Result<StoreOutput, StoreError>;

pub struct Store<Ev> {
    context: CapabilityContext<StoreOperation, Ev>,
}

impl<Ev> Capability<Ev> for Store<Ev> {
    type Operation = StoreOperation;
    type MappedSelf<MappedEv> = Store<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static,
    {
        Store::new(self.context.map_event(f))
    }
}

impl<Ev> Store<Ev>
where
    Ev: 'static,
{
    #[must_use]
    pub fn new(context: CapabilityContext<StoreOperation, Ev>) -> Self {
        Self { context }
    }

    /// Subscribes to a collection; `make_event` fires once per pushed
    /// snapshot until the shell tears the subscription down.
    pub fn subscribe_collection<F>(&self, collection: impl Into<String>, make_event: F)
    where
        F: Fn(StoreResult) -> Ev + Send + 'static,
    {
        let collection = collection.into();
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let mut stream = context
                    .stream_from_shell(StoreOperation::SubscribeCollection { collection });
                while let Some(result) = stream.next().await {
                    context.update_app(make_event(result));
                }
            }
        });
    }

    pub fn subscribe_document<F>(&self, path: impl Into<String>, make_event: F)
    where
        F: Fn(StoreResult) -> Ev + Send + 'static,
    {
        let path = path.into();
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let mut stream =
                    context.stream_from_shell(StoreOperation::SubscribeDocument { path });
                while let Some(result) = stream.next().await {
                    context.update_app(make_event(result));
                }
            }
        });
    }

    pub fn create<F>(&self, collection: impl Into<String>, fields: Value, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        let operation = StoreOperation::Create {
            collection: collection.into(),
            fields,
        };
        self.request(operation, make_event);
    }

    pub fn update<F>(&self, path: impl Into<String>, fields: Value, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        let operation = StoreOperation::Update {
            path: path.into(),
            fields,
        };
        self.request(operation, make_event);
    }

    pub fn delete<F>(&self, path: impl Into<String>, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        let operation = StoreOperation::Delete { path: path.into() };
        self.request(operation, make_event);
    }

    /// Tells the shell to stop delivering pushes for `target` (a collection
    /// name or document path). Fire-and-forget.
    pub fn unsubscribe(&self, target: impl Into<String>) {
        let target = target.into();
        self.context.spawn({
            let context = self.context.clone();
            async move {
                context
                    .notify_shell(StoreOperation::Unsubscribe { target })
                    .await;
            }
        });
    }

    fn request<F>(&self, operation: StoreOperation, make_event: F)
    where
        F: FnOnce(StoreResult) -> Ev + Send + 'static,
    {
        self.context.spawn({
            let context = self.context.clone();
            async move {
                let result = context.request_from_shell(operation).await;
                context.update_app(make_event(result));
            }
        });
    }
}
