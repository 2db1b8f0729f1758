#![allow(dead_code)]

use dagsched::{ScheduleExpr, WorkflowHead};

/// Builder for `WorkflowHead` to simplify test setup.
///
/// Expressions are parsed eagerly; an invalid expression panics, which is
/// what you want in a test fixture.
pub struct HeadBuilder {
    head: WorkflowHead,
}

impl HeadBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            head: WorkflowHead {
                name: name.to_string(),
                ..WorkflowHead::default()
            },
        }
    }

    pub fn start(mut self, expr: &str) -> Self {
        self.head.start.push(parse(expr));
        self
    }

    pub fn stop(mut self, expr: &str) -> Self {
        self.head.stop.push(parse(expr));
        self
    }

    pub fn restart(mut self, expr: &str) -> Self {
        self.head.restart.push(parse(expr));
        self
    }

    pub fn build(self) -> WorkflowHead {
        self.head
    }
}

fn parse(expr: &str) -> ScheduleExpr {
    ScheduleExpr::parse(expr)
        .unwrap_or_else(|e| panic!("invalid schedule expression {expr:?} in test builder: {e}"))
}
