//! `vcmatrix sonar` command

use anyhow::Result;

use super::Session;
use crate::cli::SonarArgs;
use vcmatrix::ops::{self, OpContext};
use vcmatrix::util::{ProcessRunner, Status};

pub fn execute(session: &mut Session, args: SonarArgs) -> Result<()> {
    let mut ws = session.workspace()?;
    if let Some(dir) = args.output_dir {
        ws = ws.with_output_dir(vcmatrix::util::fs::absolute_path(&dir));
    }

    let observer = session.observer();
    let runner = ProcessRunner::new();
    let ctx = OpContext::new(&runner).with_observer(observer.as_ref());

    match ops::sonar(&ws, &ctx)? {
        Some(written) => {
            for path in &written {
                session.shell.status(Status::Wrote, path.display());
            }
        }
        None => session.skipped("sonar"),
    }
    Ok(())
}
