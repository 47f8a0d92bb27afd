//! Per-node animation queue
//!
//! The head of a queue is the running step. Enqueueing onto an empty queue
//! starts the step at once; dequeueing starts the next head.

use std::collections::VecDeque;

use sr_dom::NodeId;

use crate::Runtime;

/// A queued step. It must eventually call `dequeue` for its node.
pub(crate) type Step = Box<dyn FnOnce(&mut Runtime, NodeId)>;

/// Queue entries; the running head has already been taken
pub(crate) type AnimationQueue = VecDeque<Option<Step>>;

pub(crate) fn enqueue(rt: &mut Runtime, node: NodeId, step: Step) {
    let queue = rt.queues.entry(node).or_default();
    queue.push_back(Some(step));
    if queue.len() == 1 {
        run_head(rt, node);
    }
}

pub(crate) fn dequeue(rt: &mut Runtime, node: NodeId) {
    let Some(queue) = rt.queues.get_mut(&node) else {
        return;
    };
    queue.pop_front();
    if queue.is_empty() {
        rt.queues.remove(&node);
        tracing::debug!("Animation queue on {} drained", node);
        return;
    }
    run_head(rt, node);
}

fn run_head(rt: &mut Runtime, node: NodeId) {
    let step = rt
        .queues
        .get_mut(&node)
        .and_then(|queue| queue.front_mut())
        .and_then(Option::take);
    if let Some(step) = step {
        step(rt, node);
    }
}

/// Number of steps queued on `node`, running head included
pub(crate) fn len(rt: &Runtime, node: NodeId) -> usize {
    rt.queues.get(&node).map_or(0, VecDeque::len)
}

/// Drop every step queued on `node`
pub(crate) fn clear(rt: &mut Runtime, node: NodeId) {
    rt.queues.remove(&node);
}
