//! Workspace - central configuration hub.
//!
//! A Workspace joins the checked-in manifest with the layered machine
//! configuration and hands out what each command needs: phase requests,
//! tool adapters and output locations.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::builder::locate::ToolLocator;
use crate::builder::msbuild;
use crate::builder::phase::PhaseRequest;
use crate::core::manifest::Manifest;
use crate::error::ConfigError;
use crate::tools::sonar::system_include_dirs_from_env;
use crate::tools::{cppcheck, CppCheck, CxxTestGenerator, CxxTestRunner, SonarConfigEmitter, Vera};
use crate::util::config::{load_config, project_config_path, Config};
use crate::util::GlobalContext;

/// Default output directory, relative to the manifest.
pub const DEFAULT_OUTPUT_DIR: &str = "target";

/// The loaded manifest plus merged configuration.
#[derive(Debug)]
pub struct Workspace {
    manifest: Manifest,
    manifest_path: PathBuf,
    config: Config,
    output_dir: PathBuf,
}

impl Workspace {
    /// Load the manifest at `manifest_path` and the configuration layered
    /// over it.
    pub fn new(manifest_path: &Path, ctx: &GlobalContext) -> Result<Self> {
        let manifest = Manifest::load(manifest_path)?;
        let global = ctx.config_path();
        let config = load_config(global.as_deref(), &project_config_path(manifest.root()));

        let output_dir = match &config.output.dir {
            Some(dir) => manifest.resolve_path(dir),
            None => manifest.root().join(DEFAULT_OUTPUT_DIR),
        };

        Ok(Workspace {
            manifest,
            manifest_path: manifest_path.to_path_buf(),
            config,
            output_dir,
        })
    }

    /// Override the output directory.
    pub fn with_output_dir(mut self, output_dir: PathBuf) -> Self {
        self.output_dir = output_dir;
        self
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the workspace root directory.
    pub fn root(&self) -> &Path {
        self.manifest.root()
    }

    /// Directory receiving generated files such as Sonar configuration.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Absolute path of the solution or project file.
    pub fn project_file(&self) -> PathBuf {
        self.manifest.project_file()
    }

    /// A manifest path wins over a configured one.
    fn tool_path(&self, from_manifest: Option<&PathBuf>, from_config: Option<&PathBuf>) -> Option<PathBuf> {
        from_manifest
            .map(|p| self.manifest.resolve_path(p))
            .or_else(|| from_config.cloned())
    }

    pub fn msbuild_locator(&self) -> ToolLocator {
        msbuild::locator(self.tool_path(
            self.manifest.msbuild.path.as_ref(),
            self.config.tools.msbuild.as_ref(),
        ))
    }

    pub fn cppcheck_locator(&self) -> ToolLocator {
        cppcheck::locator(self.tool_path(
            self.manifest.cppcheck.path.as_ref(),
            self.config.tools.cppcheck.as_ref(),
        ))
    }

    pub fn vera_home(&self) -> Option<PathBuf> {
        self.tool_path(self.manifest.vera.home.as_ref(), self.config.tools.vera_home.as_ref())
    }

    pub fn cxxtest_home(&self) -> Option<PathBuf> {
        self.tool_path(
            self.manifest.cxxtest.home.as_ref(),
            self.config.tools.cxxtest_home.as_ref(),
        )
    }

    /// The request every phase starts from.
    pub fn phase_request(&self) -> PhaseRequest {
        PhaseRequest::new(self.project_file(), self.msbuild_locator())
            .with_packaging(self.manifest.project.packaging.clone())
            .with_platforms(self.manifest.platforms.clone())
            .with_targets(self.manifest.msbuild.targets.clone())
            .with_test_targets(self.manifest.cxxtest.test_targets.clone())
    }

    pub fn cppcheck(&self) -> Result<CppCheck, ConfigError> {
        CppCheck::new(self.cppcheck_locator(), &self.manifest.cppcheck)
    }

    pub fn vera(&self) -> Result<Vera, ConfigError> {
        Vera::new(self.vera_home(), &self.manifest.vera)
    }

    pub fn cxxtest_generator(&self) -> Result<CxxTestGenerator, ConfigError> {
        CxxTestGenerator::new(self.cxxtest_home(), &self.manifest.cxxtest)
    }

    pub fn cxxtest_runner(&self) -> Result<CxxTestRunner, ConfigError> {
        CxxTestRunner::new(self.cxxtest_home(), &self.manifest.cxxtest)
    }

    /// System include directories for Sonar: the manifest's list, else
    /// `INCLUDE`.
    pub fn system_include_dirs(&self) -> Vec<PathBuf> {
        match &self.manifest.sonar.system_include_dirs {
            Some(dirs) => dirs.iter().map(|d| self.manifest.resolve_path(d)).collect(),
            None => system_include_dirs_from_env(),
        }
    }

    pub fn sonar_emitter(&self) -> SonarConfigEmitter {
        SonarConfigEmitter::new(
            &self.manifest,
            self.output_dir.clone(),
            self.system_include_dirs(),
        )
    }

    /// Log the effective configuration at debug level.
    pub fn dump(&self) {
        let project = &self.manifest.project;
        tracing::debug!("manifest: {}", self.manifest_path.display());
        tracing::debug!(
            "project: {} {} (packaging {}), file {}",
            project.name,
            project.version,
            project.packaging,
            self.project_file().display()
        );
        for platform in &self.manifest.platforms {
            let configurations: Vec<&str> =
                platform.configurations().iter().map(|c| c.name()).collect();
            tracing::debug!("platform {}: [{}]", platform.name(), configurations.join(", "));
        }
        tracing::debug!("msbuild: {:?}", self.msbuild_locator().configured_path());
        tracing::debug!("msbuild targets: {:?}", self.manifest.msbuild.targets);
        tracing::debug!("cxxtest: {:?}", self.manifest.cxxtest);
        tracing::debug!("cppcheck: {:?}", self.manifest.cppcheck);
        tracing::debug!("vera: {:?}", self.manifest.vera);
        tracing::debug!("sonar: {:?}", self.manifest.sonar);
        tracing::debug!("output dir: {}", self.output_dir.display());
    }
}
