use std::collections::VecDeque;

use futures::stream::{self, BoxStream, StreamExt};
use rustc_hash::FxHashMap;

use crate::config::UnknownKindPolicy;
use crate::error::{LstError, Result};
use crate::tree::JavaType;

use super::wire_log::{Direction, WireLog};
use super::RpcObjectData;

/// Type reference table of the receiving side.
pub type ReceiveTypeRefs = FxHashMap<u32, JavaType>;

/// Incoming op queue for one exchange, pulling batches from a stream on demand.
pub struct RpcReceiveQueue {
    source: BoxStream<'static, Vec<RpcObjectData>>,
    buffered: VecDeque<RpcObjectData>,
    refs: ReceiveTypeRefs,
    policy: UnknownKindPolicy,
    wire_log: WireLog,
}

impl RpcReceiveQueue {
    pub fn from_stream(source: BoxStream<'static, Vec<RpcObjectData>>) -> Self {
        RpcReceiveQueue {
            source,
            buffered: VecDeque::new(),
            refs: ReceiveTypeRefs::default(),
            policy: UnknownKindPolicy::default(),
            wire_log: WireLog::default(),
        }
    }

    pub fn from_ops(ops: Vec<RpcObjectData>) -> Self {
        RpcReceiveQueue::from_stream(stream::iter(vec![ops]).boxed())
    }

    pub fn with_type_refs(mut self, refs: ReceiveTypeRefs) -> Self {
        self.refs = refs;
        self
    }

    pub fn with_policy(mut self, policy: UnknownKindPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_wire_log(mut self, wire_log: WireLog) -> Self {
        self.wire_log = wire_log;
        self
    }

    pub fn policy(&self) -> UnknownKindPolicy {
        self.policy
    }

    async fn fill(&mut self, context: &str) -> Result<()> {
        while self.buffered.is_empty() {
            let Some(batch) = self.source.next().await else {
                return Err(LstError::underrun(context));
            };
            self.wire_log.log_batch(Direction::Receive, &batch);
            self.buffered.extend(batch);
        }
        Ok(())
    }

    /// Next op; `context` names what was being decoded, for the underrun error.
    pub async fn take(&mut self, context: &str) -> Result<RpcObjectData> {
        self.fill(context).await?;
        self.buffered.pop_front().ok_or_else(|| LstError::underrun(context))
    }

    pub async fn peek(&mut self, context: &str) -> Result<&RpcObjectData> {
        self.fill(context).await?;
        self.buffered.front().ok_or_else(|| LstError::underrun(context))
    }

    pub(crate) fn type_refs(&mut self) -> &mut ReceiveTypeRefs {
        &mut self.refs
    }

    pub fn into_type_refs(self) -> ReceiveTypeRefs {
        self.refs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pulls_batches_lazily() {
        let batches = vec![vec![RpcObjectData::no_change()], vec![RpcObjectData::end_of_object()]];
        let mut q = RpcReceiveQueue::from_stream(stream::iter(batches).boxed());
        assert!(q.peek("first").await.is_ok());
        assert_eq!(q.take("first").await.unwrap(), RpcObjectData::no_change());
        assert_eq!(q.take("second").await.unwrap(), RpcObjectData::end_of_object());
        match q.take("third").await {
            Err(LstError::QueueUnderrun { context }) => assert_eq!(context, "third"),
            other => panic!("expected underrun, got {other:?}"),
        }
    }
}
