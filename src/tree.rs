//! Assembly of flat task lists into a forest.

use crate::types::{Task, TaskNode};
use std::collections::HashMap;

/// Group a flat list of live tasks into a forest by `parent_task_id`.
///
/// A task becomes a root when it has no parent or when its parent is not part
/// of `tasks` (for example because the parent was deleted or filtered out by
/// owner). Roots and children keep their relative input order.
///
/// Cycles are not detected. Tasks that sit on a parent cycle are unreachable
/// from any root and do not appear in the output.
pub fn build_forest(tasks: Vec<Task>) -> Vec<TaskNode> {
    let count = tasks.len();
    let index: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, task)| (task.id.clone(), i))
        .collect();

    let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
    let mut roots = Vec::new();
    for (i, task) in tasks.iter().enumerate() {
        match task.parent_task_id.as_deref().and_then(|p| index.get(p)) {
            Some(&parent) => children[parent].push(i),
            None => roots.push(i),
        }
    }

    let mut pending: Vec<Option<Task>> = tasks.into_iter().map(Some).collect();
    let mut built: Vec<Option<TaskNode>> = (0..count).map(|_| None).collect();

    // Post-order walk: a node is assembled once all of its children are.
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&r| (r, false)).collect();
    while let Some((i, expanded)) = stack.pop() {
        if expanded {
            let sub_tasks = children[i]
                .iter()
                .filter_map(|&c| built[c].take())
                .collect();
            if let Some(task) = pending[i].take() {
                built[i] = Some(TaskNode { task, sub_tasks });
            }
        } else {
            stack.push((i, true));
            stack.extend(children[i].iter().rev().map(|&c| (c, false)));
        }
    }

    roots.into_iter().filter_map(|r| built[r].take()).collect()
}
