//! Locustfile generation
//!
//! Each top-level [`Scenario`] becomes a `TaskSequence` class, whose tasks run
//! in recording order, followed by the `HttpLocust` class that executes it.
//! Nested scenarios become nested task sets picked according to their weight.

use indexmap::IndexMap;

use locustgen_syntax::{
    Assignment, Class, Decoration, Expression, Function, FunctionCall, Import, OpaqueBlock,
    Program, Statement, SyntaxResult,
};

use crate::plugins::{apply, Plugin};
use crate::scenario::{Child, Scenario};
use crate::task::Task;
use crate::VERSION;

/// Minimal wait between two tasks of a simulated user, in seconds
pub const LOCUST_MIN_WAIT_DELAY: u32 = 0;

/// Maximal wait between two tasks of a simulated user, in seconds
pub const LOCUST_MAX_WAIT_DELAY: u32 = 10;

fn locust_task(task: &Task) -> Statement {
    Function::new(task.name.clone(), ["self"], task.resolved_statements()).into()
}

fn call(name: &str, arg: u32) -> FunctionCall {
    FunctionCall::new(name).arg(Expression::literal(arg))
}

/// `TaskSequence` class running the children of `scenario` in order
#[must_use]
pub fn locust_taskset(scenario: &Scenario) -> Class {
    let fields = (1u32..)
        .zip(&scenario.children)
        .map(|(i, child)| {
            let target = match child {
                Child::Task(task) => locust_task(task),
                Child::Scenario(nested) => Decoration::new(
                    call("task", nested.weight),
                    locust_taskset(nested).into(),
                )
                .into(),
            };
            Decoration::new(call("seq_task", i), target).into()
        })
        .collect();
    Class::new(
        scenario.name.clone(),
        vec![Expression::symbol("TaskSequence")],
        fields,
    )
}

/// Task set and locust classes of every scenario
#[must_use]
pub fn locust_classes(scenarios: &[Scenario]) -> Vec<Class> {
    let mut classes = Vec::with_capacity(scenarios.len() * 2);
    for scenario in scenarios {
        let taskset = locust_taskset(scenario);
        let locust = Class::new(
            format!("LocustFor{}", taskset.name),
            vec![Expression::symbol("HttpLocust")],
            vec![
                Assignment::new("task_set", Expression::symbol(taskset.name.clone())).into(),
                Assignment::new("weight", Expression::literal(scenario.weight)).into(),
                Assignment::new("min_wait", Expression::literal(LOCUST_MIN_WAIT_DELAY)).into(),
                Assignment::new("max_wait", Expression::literal(LOCUST_MAX_WAIT_DELAY)).into(),
            ],
        );
        classes.push(taskset);
        classes.push(locust);
    }
    classes
}

/// Full locustfile for `scenarios`, before program plugins
///
/// # Errors
/// [`SyntaxError::EmptyOpaqueBlock`](locustgen_syntax::SyntaxError) if a
/// global code block has no code
pub fn locust_program(scenarios: &[Scenario]) -> SyntaxResult<Program> {
    let mut program: Program = vec![
        Statement::from(Import::new(["re"], None, None)?)
            .with_comments([format!("File automatically generated by locustgen v{VERSION}.")]),
        Import::new(
            ["HttpLocust", "TaskSequence", "TaskSet", "seq_task", "task"],
            Some("locust"),
            None,
        )?
        .into(),
    ];

    let mut blocks: IndexMap<String, Vec<String>> = IndexMap::new();
    for scenario in scenarios {
        blocks.extend(scenario.global_code_blocks());
    }
    for (name, lines) in blocks {
        program.push(Statement::from(OpaqueBlock::new(lines.join("\n"))?).with_comments([name]));
    }

    program.extend(locust_classes(scenarios).into_iter().map(Statement::from));
    Ok(program)
}

/// Lines of the locustfile, after program plugins
///
/// # Errors
/// See [`locust_program`]
pub fn locustfile_lines(
    scenarios: &[Scenario],
    program_plugins: &[Plugin],
) -> SyntaxResult<Vec<String>> {
    let program = apply(program_plugins, locust_program(scenarios)?);
    Ok(program
        .iter()
        .flat_map(|stmt| stmt.lines(0, true))
        .map(|line| line.to_string())
        .collect())
}

/// Locustfile source for `scenarios`, without plugins
///
/// # Errors
/// See [`locust_program`]
pub fn locustfile(scenarios: &[Scenario]) -> SyntaxResult<String> {
    let mut text = locustfile_lines(scenarios, &[])?.join("\n");
    text.push('\n');
    Ok(text)
}
