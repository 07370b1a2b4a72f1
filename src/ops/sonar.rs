//! Sonar configuration emission.

use std::path::PathBuf;

use crate::core::Workspace;
use crate::error::Result;
use crate::ops::{log_skip, OpContext};

/// Write one `sonar-configuration-<platform>-<configuration>.properties`
/// per pair into the output directory. Returns the written files, or
/// `None` when Sonar is skipped.
pub fn sonar(ws: &Workspace, ctx: &OpContext<'_>) -> Result<Option<Vec<PathBuf>>> {
    ws.dump();
    if ws.manifest().sonar.skip {
        log_skip("Sonar", "sonar");
        return Ok(None);
    }

    let emitter = ws.sonar_emitter();
    ctx.orchestrator()
        .run_sonar(&ws.phase_request(), &emitter)
        .map(Some)
}
