//! `vcmatrix build`, `clean` and `testbuild`

use anyhow::Result;

use super::Session;
use vcmatrix::ops::{self, OpContext};
use vcmatrix::util::ProcessRunner;

pub fn build(session: &mut Session) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    let result = ops::build(&ws, &ctx)?;
    session.finished(&result);
    Ok(())
}

pub fn clean(session: &mut Session) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    let result = ops::clean(&ws, &ctx)?;
    session.finished(&result);
    Ok(())
}

pub fn test_build(session: &mut Session) -> Result<()> {
    let ws = session.workspace()?;
    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    match ops::test_build(&ws, &ctx)? {
        Some(result) => session.finished(&result),
        None => session.skipped("testbuild"),
    }
    Ok(())
}
