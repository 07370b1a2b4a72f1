//! `vcmatrix testgen`, `test`, `cppcheck`, `vera` and `check`

use anyhow::Result;

use super::Session;
use vcmatrix::builder::PhaseResult;
use vcmatrix::core::Workspace;
use vcmatrix::ops::{self, OpContext};
use vcmatrix::util::ProcessRunner;

type Check = fn(&Workspace, &OpContext<'_>) -> vcmatrix::Result<Option<PhaseResult>>;

fn run(session: &mut Session, name: &str, check: Check) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    match check(&ws, &ctx)? {
        Some(result) => session.finished(&result),
        None => session.skipped(name),
    }
    Ok(())
}

pub fn testgen(session: &mut Session) -> Result<()> {
    run(session, "testgen", ops::testgen)
}

pub fn cppcheck(session: &mut Session) -> Result<()> {
    run(session, "cppcheck", ops::cppcheck)
}

pub fn vera(session: &mut Session) -> Result<()> {
    run(session, "vera++", ops::vera)
}

pub fn test(session: &mut Session) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    match ops::test(&ws, &ctx)? {
        Some(results) => results.iter().for_each(|result| session.finished(result)),
        None => session.skipped("test"),
    }
    Ok(())
}

pub fn check(session: &mut Session) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    let results = ops::check(&ws, &ctx)?;
    if results.is_empty() {
        session.skipped("check");
    }
    for result in &results {
        session.finished(result);
    }
    Ok(())
}
