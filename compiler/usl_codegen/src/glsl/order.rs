//! Declaration order. GLSL needs every struct and function declared
//! before its first use; the source language does not.

use usl_ir::visitor::walk_expression;
use usl_ir::{Expression, ExpressionKind, Name, Type, Visitor};

/// Structs and functions a subtree names, in first-use order.
#[derive(Default)]
pub(super) struct References<'a> {
    pub structs: Vec<&'a Name>,
    pub calls: Vec<&'a Name>,
}

impl<'a> Visitor<'a> for References<'a> {
    fn visit_expression(&mut self, expr: &'a Expression) {
        if let ExpressionKind::CallFunction { name, .. } = &expr.kind {
            if !self.calls.contains(&name) {
                self.calls.push(name);
            }
        }
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &'a Type) {
        if let Some(name) = ty.struct_name() {
            if !self.structs.contains(&name) {
                self.structs.push(name);
            }
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Mark {
    New,
    Visiting,
    Done,
}

/// Node indices with dependencies first. Unrelated nodes keep their input
/// order; a cycle is cut where it closes.
pub(super) fn dependency_order(count: usize, deps: impl Fn(usize) -> Vec<usize>) -> Vec<usize> {
    let mut marks = vec![Mark::New; count];
    let mut order = Vec::with_capacity(count);
    for node in 0..count {
        visit(node, &deps, &mut marks, &mut order);
    }
    order
}

fn visit(
    node: usize,
    deps: &impl Fn(usize) -> Vec<usize>,
    marks: &mut [Mark],
    order: &mut Vec<usize>,
) {
    if marks.get(node) != Some(&Mark::New) {
        return;
    }
    marks[node] = Mark::Visiting;
    for dep in deps(node) {
        visit(dep, deps, marks, order);
    }
    marks[node] = Mark::Done;
    order.push(node);
}

#[cfg(test)]
mod tests {
    use super::dependency_order;

    #[test]
    fn dependencies_come_first() {
        // 0 -> 2, 1 -> 0
        let deps = |n: usize| match n {
            0 => vec![2],
            1 => vec![0],
            _ => vec![],
        };
        assert_eq!(dependency_order(3, deps), vec![2, 0, 1]);
    }

    #[test]
    fn independent_nodes_keep_order() {
        assert_eq!(dependency_order(3, |_| Vec::new()), vec![0, 1, 2]);
    }

    #[test]
    fn cycles_terminate() {
        let deps = |n: usize| vec![(n + 1) % 2];
        assert_eq!(dependency_order(2, deps), vec![1, 0]);
    }
}
