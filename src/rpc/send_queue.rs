use rustc_hash::FxHashMap;
use tokio::sync::mpsc;
use tracing::trace;

use crate::error::{LstError, Result};
use crate::tree::{JavaType, TreeRef};

use super::wire_log::{Direction, WireLog};
use super::RpcObjectData;

/// Reference numbers handed out for shared type allocations.
///
/// The `JavaType` is kept alongside its number so the allocation it was keyed
/// by stays alive and its address cannot be reused by an unrelated type.
#[derive(Debug, Default, Clone)]
pub struct SendTypeRefs {
    by_identity: FxHashMap<usize, (u32, JavaType)>,
    next: u32,
}

impl SendTypeRefs {
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    pub(crate) fn lookup(&self, ty: &JavaType) -> Option<u32> {
        let identity = ty.identity()?;
        self.by_identity.get(&identity).map(|(id, _)| *id)
    }

    /// Assigns a number to `ty`; `None` for types without shared identity.
    pub(crate) fn assign(&mut self, ty: &JavaType) -> Option<u32> {
        let identity = ty.identity()?;
        self.next += 1;
        let id = self.next;
        self.by_identity.insert(identity, (id, ty.clone()));
        Some(id)
    }
}

enum Sink {
    Buffer(Vec<RpcObjectData>),
    Channel(mpsc::Sender<Vec<RpcObjectData>>),
}

/// Outgoing op queue for one exchange.
///
/// Ops are collected into batches of `batch_size` and handed to the sink on
/// every full batch and on [`flush`](Self::flush). The queue also carries the
/// stack of "before" nodes the sender diffs against.
pub struct RpcSendQueue {
    batch: Vec<RpcObjectData>,
    batch_size: usize,
    sink: Sink,
    before: Vec<Option<TreeRef>>,
    refs: SendTypeRefs,
    wire_log: WireLog,
}

impl RpcSendQueue {
    pub fn buffered(batch_size: usize) -> Self {
        RpcSendQueue::with_sink(Sink::Buffer(Vec::new()), batch_size)
    }

    pub fn channel(sender: mpsc::Sender<Vec<RpcObjectData>>, batch_size: usize) -> Self {
        RpcSendQueue::with_sink(Sink::Channel(sender), batch_size)
    }

    fn with_sink(sink: Sink, batch_size: usize) -> Self {
        RpcSendQueue {
            batch: Vec::with_capacity(batch_size.min(1024)),
            batch_size: batch_size.max(1),
            sink,
            before: Vec::new(),
            refs: SendTypeRefs::default(),
            wire_log: WireLog::default(),
        }
    }

    pub fn with_type_refs(mut self, refs: SendTypeRefs) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_wire_log(mut self, wire_log: WireLog) -> Self {
        self.wire_log = wire_log;
        self
    }

    pub async fn put(&mut self, op: RpcObjectData) -> Result<()> {
        self.batch.push(op);
        if self.batch.len() >= self.batch_size {
            self.flush().await?;
        }
        Ok(())
    }

    pub async fn flush(&mut self) -> Result<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let batch = std::mem::replace(&mut self.batch, Vec::with_capacity(self.batch_size.min(1024)));
        self.wire_log.log_batch(Direction::Send, &batch);
        trace!("Flushing RPC batch of {} ops", batch.len());
        match &mut self.sink {
            Sink::Buffer(buffer) => buffer.extend(batch),
            Sink::Channel(sender) => sender.send(batch).await.map_err(|_| LstError::ChannelClosed)?,
        }
        Ok(())
    }

    /// The node the peer currently holds for the field being sent.
    pub fn before(&self) -> Option<TreeRef> {
        self.before.last().cloned().flatten()
    }

    pub(crate) fn push_before(&mut self, before: Option<TreeRef>) {
        self.before.push(before);
    }

    pub(crate) fn pop_before(&mut self) {
        self.before.pop();
    }

    pub(crate) fn type_refs(&mut self) -> &mut SendTypeRefs {
        &mut self.refs
    }

    /// Flushes and returns the buffered ops along with the type reference
    /// table, for sessions that keep it across exchanges. Channel-backed
    /// queues return no ops.
    pub async fn finish(mut self) -> Result<(Vec<RpcObjectData>, SendTypeRefs)> {
        self.flush().await?;
        let ops = match self.sink {
            Sink::Buffer(buffer) => buffer,
            Sink::Channel(_) => Vec::new(),
        };
        Ok((ops, self.refs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_sink_receives_full_batches() {
        let (tx, mut rx) = mpsc::channel(4);
        let mut q = RpcSendQueue::channel(tx, 2);
        for _ in 0..3 {
            q.put(RpcObjectData::no_change()).await.unwrap();
        }
        assert_eq!(rx.recv().await.map(|b| b.len()), Some(2));
        q.flush().await.unwrap();
        assert_eq!(rx.recv().await.map(|b| b.len()), Some(1));
    }

    #[tokio::test]
    async fn test_closed_channel_is_an_error() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut q = RpcSendQueue::channel(tx, 1);
        assert!(matches!(q.put(RpcObjectData::no_change()).await, Err(LstError::ChannelClosed)));
    }

    #[test]
    fn test_type_refs_only_for_shared_types() {
        let mut refs = SendTypeRefs::default();
        let class = JavaType::class("Foo");
        assert_eq!(refs.assign(&class), Some(1));
        assert_eq!(refs.lookup(&class.clone()), Some(1));
        assert_eq!(refs.assign(&JavaType::Unknown), None);
        assert_eq!(refs.lookup(&JavaType::class("Foo")), None);
    }
}
