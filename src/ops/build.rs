//! MSBuild phases: build, clean and test build.

use crate::builder::{Phase, PhaseResult};
use crate::core::Workspace;
use crate::error::Result;
use crate::ops::{log_skip, OpContext};

/// Build the configured targets for every pair, stopping at the first
/// failure.
pub fn build(ws: &Workspace, ctx: &OpContext<'_>) -> Result<PhaseResult> {
    ws.dump();
    ctx.orchestrator().run_phase(Phase::Build, &ws.phase_request())
}

/// Run the `Clean` target for every pair.
pub fn clean(ws: &Workspace, ctx: &OpContext<'_>) -> Result<PhaseResult> {
    ws.dump();
    ctx.orchestrator().run_phase(Phase::Clean, &ws.phase_request())
}

/// Build the CxxTest targets for every pair. Returns `None` when CxxTest
/// is skipped.
pub fn test_build(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Option<PhaseResult>> {
    ws.dump();
    if ws.manifest().cxxtest.skip {
        log_skip("CxxTest", "cxxtest");
        return Ok(None);
    }
    ctx.orchestrator()
        .run_phase(Phase::TestBuild, &ws.phase_request())
        .map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::ops::testing::workspace;
    use crate::test_support::{MockOutput, MockRunner};

    #[test]
    fn test_build_uses_manifest_targets() {
        let tw = workspace(&[("Release", "Win32")], "");
        let mut runner = MockRunner::new();
        runner.set_default(MockOutput::success("Build succeeded."));

        let result = build(&tw.ws, &OpContext::new(&runner)).unwrap();
        assert!(result.passed());

        let lines = runner.command_lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("All.sln"));
        assert!(lines[0].contains("/p:Configuration=Release"));
        assert!(lines[0].contains("/p:Platform=Win32"));
    }

    #[test]
    fn test_build_failure_is_an_error() {
        let tw = workspace(&[("Release", "Win32")], "");
        let mut runner = MockRunner::new();
        runner.set_default(MockOutput::failure(1, "error MSB1009"));

        let err = build(&tw.ws, &OpContext::new(&runner)).unwrap_err();
        assert!(matches!(err, Error::BuildFailed { exit_code: 1, .. }));
    }

    #[test]
    fn test_clean_runs_clean_target() {
        let tw = workspace(&[("Release", "Win32")], "");
        let mut runner = MockRunner::new();
        runner.set_default(MockOutput::success(""));

        clean(&tw.ws, &OpContext::new(&runner)).unwrap();
        assert!(runner.command_lines()[0].contains("/t:Clean"));
    }

    #[test]
    fn test_test_build_skipped() {
        let tw = workspace(&[("Release", "Win32")], "[cxxtest]\nskip = true\n");
        let runner = MockRunner::new();

        let result = test_build(&tw.ws, &OpContext::new(&runner)).unwrap();
        assert!(result.is_none());
        assert!(runner.calls().is_empty());
    }

    #[test]
    fn test_test_build_uses_test_targets() {
        let tw = workspace(
            &[("Release", "Win32")],
            "[cxxtest]\ntest_targets = [\"CoreTests\"]\n",
        );
        let mut runner = MockRunner::new();
        runner.set_default(MockOutput::success(""));

        let result = test_build(&tw.ws, &OpContext::new(&runner)).unwrap();
        assert!(result.unwrap().passed());
        assert!(runner.command_lines()[0].contains("/t:CoreTests"));
    }
}
