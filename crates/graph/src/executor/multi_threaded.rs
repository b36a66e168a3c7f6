use std::{
    cell::UnsafeCell,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use crossbeam::{queue::ArrayQueue, utils::Backoff};
use util::collections::Array;

use crate::{
    dag::{Dag, Task, ThreadContext},
    executor::Executor,
    worker::{Job, WorkerPool},
};

/// Runs the tasks on the calling thread and the workers of a [WorkerPool].
///
/// Every participant owns a ready queue. A task is pushed to the queue of whoever completed its
/// last parent; idle participants steal from the others. The calling thread takes part in the
/// work and returns once every task ran and every worker went back to sleep.
pub struct MultiThreaded {
    state: State,
    pool: Arc<WorkerPool>,
}

struct State {
    nodes: Array<Node>,
    roots: Array<usize>,
    queues: Array<ArrayQueue<usize>>,
    remaining: AtomicUsize,
    buffer_size: AtomicUsize,
}

struct Node {
    task: UnsafeCell<Task>,
    children: Array<usize>,
    num_parents: usize,
    parents_to_process: AtomicUsize,
}

// A task is only run by the participant that popped or stole it, once per block.
unsafe impl Sync for State {}

impl MultiThreaded {
    pub(crate) fn new(dag: Dag, pool: Arc<WorkerPool>) -> Self {
        let num_tasks = dag.nodes.len();
        let roots = dag
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.num_parents == 0)
            .map(|(index, _)| index)
            .collect();
        let nodes = dag
            .nodes
            .into_iter()
            .map(|node| Node {
                task: UnsafeCell::new(node.task),
                children: Array::from(node.children),
                num_parents: node.num_parents,
                parents_to_process: AtomicUsize::new(0),
            })
            .collect();
        // Each task is queued once per block, so no queue can overflow.
        let queues = (0..=pool.len())
            .map(|_| ArrayQueue::new(num_tasks.max(1)))
            .collect();
        Self {
            state: State {
                nodes,
                roots,
                queues,
                remaining: AtomicUsize::new(0),
                buffer_size: AtomicUsize::new(0),
            },
            pool,
        }
    }
}

impl Executor for MultiThreaded {
    fn run(&mut self, buffer_size: usize) {
        let state = &self.state;
        if state.nodes.is_empty() {
            return;
        }

        state.buffer_size.store(buffer_size, Ordering::Relaxed);
        for node in state.nodes.iter() {
            node.parents_to_process
                .store(node.num_parents, Ordering::Relaxed);
        }
        state.remaining.store(state.nodes.len(), Ordering::Relaxed);
        for &root in state.roots.iter() {
            state.queues[0].push(root).ok();
        }

        unsafe { self.pool.wake(state) };
        state.work(0);
        self.pool.wait();
    }
}

impl Job for State {
    fn work(&self, worker: usize) {
        let backoff = Backoff::new();
        while self.remaining.load(Ordering::Acquire) > 0 {
            match self.queues[worker].pop().or_else(|| self.steal(worker)) {
                Some(task) => {
                    self.execute(task, worker);
                    backoff.reset();
                }
                None => backoff.snooze(),
            }
        }
    }
}

impl State {
    fn steal(&self, worker: usize) -> Option<usize> {
        let num_queues = self.queues.len();
        (1..num_queues).find_map(|n| self.queues[(worker + n) % num_queues].pop())
    }

    fn execute(&self, task: usize, worker: usize) {
        let node = &self.nodes[task];
        debug_assert_eq!(node.parents_to_process.load(Ordering::Relaxed), 0);

        let context = ThreadContext {
            worker,
            buffer_size: self.buffer_size.load(Ordering::Relaxed),
        };
        unsafe { (*node.task.get())(&context) };

        for &child in node.children.iter() {
            if self.nodes[child]
                .parents_to_process
                .fetch_sub(1, Ordering::AcqRel)
                == 1
            {
                self.queues[worker].push(child).ok();
            }
        }
        self.remaining.fetch_sub(1, Ordering::Release);
    }
}
