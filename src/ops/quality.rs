//! Quality checks: CxxTest runner generation, cppcheck and vera++.
//!
//! Each check runs over every project of every pair and only then turns the
//! collected outcomes into a verdict, so one failing project never hides
//! another.

use crate::builder::{Phase, PhaseResult};
use crate::core::Workspace;
use crate::error::{Error, Result};
use crate::ops::{log_skip, OpContext};
use crate::tools::QualityTool;

/// Run `tool` over the matrix and fail when any project failed.
pub(crate) fn run_check(ws: &Workspace, ctx: &OpContext<'_>, tool: &dyn QualityTool) -> Result<PhaseResult> {
    ctx.orchestrator()
        .run_phase(Phase::QualityCheck(tool), &ws.phase_request())?
        .into_verdict()
}

/// Generate CxxTest runner sources for the test targets of every pair.
pub fn testgen(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Option<PhaseResult>> {
    ws.dump();
    if ws.manifest().cxxtest.skip {
        log_skip("CxxTest", "cxxtest");
        return Ok(None);
    }
    let generator = ws.cxxtest_generator()?;
    run_check(ws, ctx, &generator).map(Some)
}

/// Run cppcheck over every project of every pair.
pub fn cppcheck(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Option<PhaseResult>> {
    ws.dump();
    if ws.manifest().cppcheck.skip {
        log_skip("CppCheck", "cppcheck");
        return Ok(None);
    }
    let tool = ws.cppcheck()?;
    run_check(ws, ctx, &tool).map(Some)
}

/// Run vera++ over every project of every pair.
pub fn vera(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Option<PhaseResult>> {
    ws.dump();
    if ws.manifest().vera.skip {
        log_skip("Vera++", "vera");
        return Ok(None);
    }
    let tool = ws.vera()?;
    run_check(ws, ctx, &tool).map(Some)
}

/// cppcheck followed by vera++. Both run even when the first finds
/// problems; their failures are reported together.
pub fn check(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Vec<PhaseResult>> {
    ws.dump();
    let manifest = ws.manifest();

    let mut tools: Vec<Box<dyn QualityTool>> = Vec::new();
    if manifest.cppcheck.skip {
        log_skip("CppCheck", "cppcheck");
    } else {
        tools.push(Box::new(ws.cppcheck()?));
    }
    if manifest.vera.skip {
        log_skip("Vera++", "vera");
    } else {
        tools.push(Box::new(ws.vera()?));
    }

    let orchestrator = ctx.orchestrator();
    let request = ws.phase_request();
    let mut results = Vec::with_capacity(tools.len());
    for tool in &tools {
        results.push(orchestrator.run_phase(Phase::QualityCheck(tool.as_ref()), &request)?);
    }

    let failures: Vec<String> = results
        .iter()
        .flat_map(|result| {
            result
                .failures()
                .into_iter()
                .map(move |failure| format!("{}: {}", result.phase, failure))
        })
        .collect();
    if failures.is_empty() {
        Ok(results)
    } else {
        Err(Error::ChecksFailed {
            phase: "check".to_string(),
            failures,
        })
    }
}
