//! Dependency graphs of per-block tasks.
use std::sync::Arc;

use util::collections::BitSet;

use crate::{
    executor::{Executor, MultiThreaded, SingleThreaded},
    worker::WorkerPool,
};

pub type TaskId = usize;

/// Passed to every task run.
#[derive(Clone, Copy, Debug)]
pub struct ThreadContext {
    /// 0 for the thread that runs the executor, 1.. for pool workers.
    pub worker: usize,

    /// Number of frames in this block.
    pub buffer_size: usize,
}

pub type Task = Box<dyn FnMut(&ThreadContext) + Send>;

/// Tasks and the order they must run in.
///
/// A task runs after all of its parents. Tasks without a path between them may run in any
/// order, or concurrently.
#[derive(Default)]
pub struct Dag {
    pub(crate) nodes: Vec<DagNode>,
}

pub(crate) struct DagNode {
    pub task: Task,
    pub children: Vec<TaskId>,
    pub num_parents: usize,
}

impl Dag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a task without dependencies.
    pub fn add_task(&mut self, task: impl FnMut(&ThreadContext) + Send + 'static) -> TaskId {
        let id = self.nodes.len();
        self.nodes.push(DagNode {
            task: Box::new(task),
            children: Vec::new(),
            num_parents: 0,
        });
        id
    }

    /// Add a task that runs after `parent`.
    pub fn add_child_task(
        &mut self,
        parent: TaskId,
        task: impl FnMut(&ThreadContext) + Send + 'static,
    ) -> TaskId {
        debug_assert!(parent < self.nodes.len(), "parent task not found");
        let id = self.add_task(task);
        self.add_child(parent, id);
        id
    }

    /// Make `child` run after `parent`.
    pub fn add_child(&mut self, parent: TaskId, child: TaskId) {
        debug_assert!(parent < self.nodes.len(), "parent task not found");
        debug_assert!(child < self.nodes.len(), "child task not found");
        debug_assert!(!self.is_descendant(child, parent), "child is an ancestor of the parent");
        self.nodes[parent].children.push(child);
        self.nodes[child].num_parents += 1;
    }

    /// True if `descendant` can be reached from `task`, including the task itself.
    fn is_descendant(&self, task: TaskId, descendant: TaskId) -> bool {
        let mut stack = vec![task];
        let mut visited = BitSet::with_capacity(self.nodes.len());
        while let Some(task) = stack.pop() {
            if task == descendant {
                return true;
            }
            if visited.get(task) {
                continue;
            }
            visited.set(task);
            stack.extend_from_slice(&self.nodes[task].children);
        }
        false
    }

    /// Compile into an executor that runs every task on the calling thread.
    pub fn make_runnable(self) -> SingleThreaded {
        SingleThreaded::new(self)
    }

    /// Compile into an executor that shares the work with `pool`. An empty pool yields a
    /// [SingleThreaded] executor.
    pub fn make_runnable_with(self, pool: &Arc<WorkerPool>) -> Box<dyn Executor> {
        if pool.is_empty() {
            Box::new(self.make_runnable())
        } else {
            Box::new(MultiThreaded::new(self, pool.clone()))
        }
    }
}
