//! MSBuild command construction.

use std::path::{Path, PathBuf};

use crate::builder::locate::ToolLocator;
use crate::core::platform::BuildPair;
use crate::util::process::Invocation;

/// Environment variable holding the path to MSBuild.exe.
pub const ENV_MSBUILD_PATH: &str = "MSBUILD_PATH";

/// Target used by the clean phase.
pub const CLEAN_TARGET: &str = "Clean";

/// Locator for MSBuild: the configured path, then `MSBUILD_PATH`.
pub fn locator(configured: Option<PathBuf>) -> ToolLocator {
    ToolLocator::new("MSBuild", "[msbuild] path")
        .configured(configured)
        .env_var(ENV_MSBUILD_PATH)
}

/// One MSBuild run of `file` for `pair`, executed in the file's directory.
///
/// ```text
/// MSBuild.exe /maxcpucount /p:Configuration=Debug /p:Platform=x64 [/t:A;B] App.sln
/// ```
pub fn invocation(msbuild: &Path, file: &Path, pair: &BuildPair, targets: &[String]) -> Invocation {
    let mut inv = Invocation::new(msbuild)
        .arg("/maxcpucount")
        .arg(format!("/p:Configuration={}", pair.configuration))
        .arg(format!("/p:Platform={}", pair.platform));

    if !targets.is_empty() {
        inv = inv.arg(format!("/t:{}", targets.join(";")));
    }

    inv = inv.arg(file.display().to_string());
    if let Some(dir) = file.parent() {
        inv = inv.cwd(dir);
    }
    inv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_without_targets() {
        let inv = invocation(
            Path::new("/tools/MSBuild.exe"),
            Path::new("/work/App.sln"),
            &BuildPair::new("x64", "Debug"),
            &[],
        );

        assert_eq!(
            inv.get_args(),
            ["/maxcpucount", "/p:Configuration=Debug", "/p:Platform=x64", "/work/App.sln"]
        );
        assert_eq!(inv.get_cwd(), Some(Path::new("/work")));
    }

    #[test]
    fn test_invocation_with_targets() {
        let inv = invocation(
            Path::new("/tools/MSBuild.exe"),
            Path::new("/work/App.sln"),
            &BuildPair::new("Win32", "Release"),
            &["Core".to_string(), "Tests\\Core_Tests".to_string()],
        );

        assert_eq!(inv.get_args()[3], "/t:Core;Tests\\Core_Tests");
        assert_eq!(inv.get_args()[4], "/work/App.sln");
    }
}
