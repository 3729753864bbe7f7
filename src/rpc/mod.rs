//! RPC synchronization of trees across a process boundary.
//!
//! A tree travels as an ordered sequence of [`RpcObjectData`] ops. The protocol
//! is positional: the receiver knows the schema of every kind and reads fields
//! in exactly the order the sender wrote them. Each field is diffed against
//! the value the peer already holds, so an unchanged subtree costs a single
//! `NoChange` op.
//!
//! # Framing
//!
//! An op with state `Add` or `Change` that carries neither a value nor a type
//! reference opens a frame: a composite (node, padding wrapper, container or
//! list) whose fields follow, closed by an `EndOfObject` op. Framing lets the
//! receiver skip over a node of a kind it has no codec for.
//!
//! # Lists
//!
//! A list frame starts with a positions op whose value is, for every element of
//! the new list, the index of the element with the same id in the old list or
//! `-1`. One entry per element follows, each diffed against the old element at
//! its position.
//!
//! # Types
//!
//! Primitive types travel by value. Shared composite types travel by value with
//! a reference number on first use and by reference number alone afterwards.

use futures::stream::{BoxStream, StreamExt};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Deserializer, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::debug;

use crate::config::LstConfig;
use crate::error::{LstError, Result};
use crate::registry;
use crate::tree::{NodeId, TreeRef};

pub mod codec;
pub mod receive_queue;
pub mod receiver;
pub mod send_queue;
pub mod sender;
pub mod wire_log;

pub use codec::JsCodec;
pub use receive_queue::{ReceiveTypeRefs, RpcReceiveQueue};
pub use send_queue::{RpcSendQueue, SendTypeRefs};
pub use wire_log::WireLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RpcState {
    NoChange,
    Add,
    Delete,
    Change,
    EndOfObject,
}

/// One op on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcObjectData {
    pub state: RpcState,
    /// Kind name of a node added in place.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "present_value")]
    pub value: Option<serde_json::Value>,
    #[serde(rename = "ref", default, skip_serializing_if = "Option::is_none")]
    pub ref_id: Option<u32>,
}

/// A present `null` is a value, not an absent one.
fn present_value<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<serde_json::Value>, D::Error> {
    serde_json::Value::deserialize(deserializer).map(Some)
}

impl RpcObjectData {
    fn op(state: RpcState) -> Self {
        RpcObjectData { state, value_type: None, value: None, ref_id: None }
    }

    pub fn no_change() -> Self {
        RpcObjectData::op(RpcState::NoChange)
    }

    pub fn delete() -> Self {
        RpcObjectData::op(RpcState::Delete)
    }

    pub fn end_of_object() -> Self {
        RpcObjectData::op(RpcState::EndOfObject)
    }

    /// Opens the frame of a new composite, optionally naming its kind.
    pub fn add_object(value_type: Option<String>) -> Self {
        RpcObjectData { value_type, ..RpcObjectData::op(RpcState::Add) }
    }

    /// Opens the frame of a changed composite.
    pub fn change_object() -> Self {
        RpcObjectData::op(RpcState::Change)
    }

    pub fn add_value(value: serde_json::Value) -> Self {
        RpcObjectData { value: Some(value), ..RpcObjectData::op(RpcState::Add) }
    }

    pub fn change_value(value: serde_json::Value) -> Self {
        RpcObjectData { value: Some(value), ..RpcObjectData::op(RpcState::Change) }
    }

    pub fn with_ref(mut self, ref_id: u32) -> Self {
        self.ref_id = Some(ref_id);
        self
    }

    pub fn opens_frame(&self) -> bool {
        matches!(self.state, RpcState::Add | RpcState::Change) && self.value.is_none() && self.ref_id.is_none()
    }
}

/// Sends `after` diffed against `before` through the codec registered for its kind.
pub async fn send_tree(after: &TreeRef, before: Option<&TreeRef>, q: &mut RpcSendQueue) -> Result<()> {
    let codec = registry::codec_for(after.kind())
        .ok_or_else(|| LstError::UnregisteredKindName(after.kind().to_string()))?;
    codec.send(after, before, q).await?;
    q.flush().await
}

/// Receives one tree, choosing the codec from the opening op.
pub async fn receive_tree(before: Option<&TreeRef>, q: &mut RpcReceiveQueue) -> Result<TreeRef> {
    let first = q.peek("root").await?;
    let kind = match (&first.value_type, before) {
        (Some(name), _) if first.state == RpcState::Add => {
            registry::resolve_kind(name).ok_or_else(|| LstError::UnregisteredKindName(name.clone()))?
        }
        (_, Some(before)) => before.kind(),
        (_, None) => {
            return Err(LstError::UnexpectedOp { state: first.state, context: "root without a prior revision".into() });
        }
    };
    let codec = registry::codec_for(kind).ok_or_else(|| LstError::UnregisteredKindName(kind.to_string()))?;
    codec.receive(before, q).await
}

/// Encodes `tree` against `before` into a single op list.
pub async fn send(tree: &TreeRef, before: Option<&TreeRef>) -> Result<Vec<RpcObjectData>> {
    let mut q = RpcSendQueue::buffered(LstConfig::default().rpc_batch_size);
    send_tree(tree, before, &mut q).await?;
    Ok(q.finish().await?.0)
}

/// Decodes `ops`, patching `before` when the ops describe a change to it.
pub async fn receive(ops: Vec<RpcObjectData>, before: Option<&TreeRef>) -> Result<TreeRef> {
    let mut q = RpcReceiveQueue::from_ops(ops);
    receive_tree(before, &mut q).await
}

/// Encodes `tree` on a background task, yielding op batches as they fill up.
///
/// The handle resolves once the last batch has been handed to the stream.
pub fn send_stream(
    tree: TreeRef,
    before: Option<TreeRef>,
    config: &LstConfig,
) -> (BoxStream<'static, Vec<RpcObjectData>>, JoinHandle<Result<()>>) {
    let (tx, rx) = mpsc::channel(16);
    let mut q = RpcSendQueue::channel(tx, config.rpc_batch_size).with_wire_log(WireLog::new(config.wire_log));
    let task = tokio::spawn(async move {
        send_tree(&tree, before.as_ref(), &mut q).await?;
        q.finish().await.map(|_| ())
    });
    (ReceiverStream::new(rx).boxed(), task)
}

pub async fn receive_stream(
    batches: BoxStream<'static, Vec<RpcObjectData>>,
    before: Option<&TreeRef>,
    config: &LstConfig,
) -> Result<TreeRef> {
    let mut q = RpcReceiveQueue::from_stream(batches)
        .with_policy(config.unknown_kinds)
        .with_wire_log(WireLog::new(config.wire_log));
    receive_tree(before, &mut q).await
}

/// Sending end of a long-lived synchronization session.
///
/// Remembers the last revision sent for every root id, so later sends of the
/// same root only carry what changed, and keeps type reference numbers stable
/// across exchanges.
pub struct RpcSender {
    config: LstConfig,
    last: FxHashMap<NodeId, TreeRef>,
    refs: SendTypeRefs,
}

impl RpcSender {
    pub fn new(config: LstConfig) -> Self {
        RpcSender { config, last: FxHashMap::default(), refs: SendTypeRefs::default() }
    }

    pub async fn send(&mut self, tree: &TreeRef) -> Result<Vec<RpcObjectData>> {
        let before = self.last.get(&tree.id()).cloned();
        let mut q = RpcSendQueue::buffered(self.config.rpc_batch_size)
            .with_type_refs(self.refs.clone())
            .with_wire_log(WireLog::new(self.config.wire_log));
        // Numbers handed out by a failed send never reach the peer.
        send_tree(tree, before.as_ref(), &mut q).await?;
        let (ops, refs) = q.finish().await?;
        self.refs = refs;
        debug!("Sent {} ops for root {}", ops.len(), tree.id());
        self.last.insert(tree.id(), tree.clone());
        Ok(ops)
    }

    /// Drops the remembered revision, so the next send is a full add.
    pub fn forget(&mut self, id: NodeId) {
        self.last.remove(&id);
    }
}

/// Receiving end of a long-lived synchronization session.
pub struct RpcReceiver {
    config: LstConfig,
    last: FxHashMap<NodeId, TreeRef>,
    refs: ReceiveTypeRefs,
}

impl RpcReceiver {
    pub fn new(config: LstConfig) -> Self {
        RpcReceiver { config, last: FxHashMap::default(), refs: ReceiveTypeRefs::default() }
    }

    /// Receives the next revision of the root `id`.
    pub async fn receive(&mut self, id: NodeId, ops: Vec<RpcObjectData>) -> Result<TreeRef> {
        let before = self.last.get(&id).cloned();
        let mut q = RpcReceiveQueue::from_ops(ops)
            .with_type_refs(self.refs.clone())
            .with_policy(self.config.unknown_kinds)
            .with_wire_log(WireLog::new(self.config.wire_log));
        let tree = receive_tree(before.as_ref(), &mut q).await?;
        self.refs = q.into_type_refs();
        debug!("Received revision of root {}", tree.id());
        self.last.insert(tree.id(), tree.clone());
        Ok(tree)
    }

    pub fn last(&self, id: NodeId) -> Option<&TreeRef> {
        self.last.get(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_shape() {
        let op = RpcObjectData::add_object(Some("org.openrewrite.java.tree.J$Empty".into()));
        let json = serde_json::to_value(&op).unwrap();
        assert_eq!(json, serde_json::json!({"state": "ADD", "valueType": "org.openrewrite.java.tree.J$Empty"}));
        assert!(op.opens_frame());

        let typed = RpcObjectData::add_value(serde_json::json!({"kind": "Unknown"})).with_ref(3);
        let json = serde_json::to_value(&typed).unwrap();
        assert_eq!(json["ref"], 3);
        assert!(!typed.opens_frame());
    }

    #[test]
    fn test_null_value_survives_json() {
        let op = RpcObjectData::change_value(serde_json::Value::Null);
        let text = serde_json::to_string(&op).unwrap();
        let back: RpcObjectData = serde_json::from_str(&text).unwrap();
        assert_eq!(back.value, Some(serde_json::Value::Null));
        assert!(!back.opens_frame());

        let eoo: RpcObjectData = serde_json::from_str(r#"{"state":"END_OF_OBJECT"}"#).unwrap();
        assert_eq!(eoo, RpcObjectData::end_of_object());
    }
}
