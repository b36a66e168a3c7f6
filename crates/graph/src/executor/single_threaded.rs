use util::collections::Array;

use crate::{
    dag::{Dag, Task, ThreadContext},
    executor::Executor,
};

/// Runs the tasks one after another in a fixed topological order.
#[derive(Default)]
pub struct SingleThreaded {
    tasks: Array<Task>,
    order: Array<usize>,
}

impl SingleThreaded {
    pub(crate) fn new(dag: Dag) -> Self {
        let mut pending = dag
            .nodes
            .iter()
            .map(|node| node.num_parents)
            .collect::<Vec<_>>();
        let mut ready = (0..dag.nodes.len())
            .rev()
            .filter(|task| pending[*task] == 0)
            .collect::<Vec<_>>();
        let mut order = Vec::with_capacity(dag.nodes.len());
        while let Some(task) = ready.pop() {
            order.push(task);
            for &child in dag.nodes[task].children.iter().rev() {
                pending[child] -= 1;
                if pending[child] == 0 {
                    ready.push(child);
                }
            }
        }
        debug_assert_eq!(order.len(), dag.nodes.len(), "dag has a cycle");

        Self {
            tasks: dag.nodes.into_iter().map(|node| node.task).collect(),
            order: Array::from(order),
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl Executor for SingleThreaded {
    fn run(&mut self, buffer_size: usize) {
        let context = ThreadContext {
            worker: 0,
            buffer_size,
        };
        for &task in self.order.iter() {
            (self.tasks[task])(&context);
        }
    }
}
