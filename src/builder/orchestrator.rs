//! The per-pair double loop.
//!
//! Every phase starts with the same pre-flight validation, in this order:
//! packaging, tool location, project file, matrix resolution and (for
//! solutions) solution parsing plus the matrix cross-check. Nothing is
//! spawned until all of it passes.
//!
//! MSBuild phases stop at the first failing pair. Quality checks run every
//! project of every pair and record each outcome; the caller turns the
//! aggregated [`PhaseResult`] into a verdict.

use std::error::Error as _;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::builder::events::{NoopObserver, PhaseEvent, PhaseObserver};
use crate::builder::msbuild::{self, CLEAN_TARGET};
use crate::builder::phase::{
    has_extension, PairResult, Phase, PhaseRequest, PhaseResult, ProjectResult, ProjectStatus,
};
use crate::core::platform::{matrix_pairs, BuildPair, BuildPlatform};
use crate::core::project::VCProject;
use crate::error::{ConfigError, Error, Result, VALID_PACKAGING};
use crate::parser::{parse_project, parse_solution_file, parse_solution_project, ParseError, Solution};
use crate::resolver::MatrixResolver;
use crate::tools::{CheckOutcome, QualityTool, ReportStream, SonarConfigEmitter};
use crate::util::consumer::{LogConsumer, ReportWriter};
use crate::util::process::{CommandRunner, Invocation, ProcessError};

static NOOP: NoopObserver = NoopObserver;

/// The validated matrix and, for solutions, the parsed solution.
#[derive(Debug, Clone)]
pub struct Plan {
    pub project_file: PathBuf,
    pub matrix: Vec<BuildPlatform>,
    pub solution: Option<Solution>,
}

impl Plan {
    pub fn pairs(&self) -> Vec<BuildPair> {
        matrix_pairs(&self.matrix)
    }
}

/// A project in scope for one pair, parsed or not.
struct ScopedProject {
    name: String,
    parsed: std::result::Result<VCProject, ParseError>,
}

/// Drives phases over the matrix through a [`CommandRunner`].
pub struct BuildOrchestrator<'a> {
    runner: &'a dyn CommandRunner,
    observer: &'a dyn PhaseObserver,
}

impl<'a> BuildOrchestrator<'a> {
    pub fn new(runner: &'a dyn CommandRunner) -> Self {
        BuildOrchestrator {
            runner,
            observer: &NOOP,
        }
    }

    pub fn with_observer(mut self, observer: &'a dyn PhaseObserver) -> Self {
        self.observer = observer;
        self
    }

    /// Validate everything a phase needs. Returns the located tool and the
    /// plan.
    pub fn preflight(&self, phase: Phase<'_>, request: &PhaseRequest) -> Result<(PathBuf, Plan)> {
        check_packaging(&request.packaging)?;

        let tool = match phase {
            Phase::QualityCheck(tool) => tool.locate()?,
            _ => request.msbuild.locate()?,
        };
        tracing::debug!("{} uses {}", phase.name(), tool.display());

        let plan = self.plan(request)?;
        Ok((tool, plan))
    }

    /// Validate the project file and matrix, and parse the solution.
    pub fn plan(&self, request: &PhaseRequest) -> Result<Plan> {
        check_project_file(&request.project_file)?;

        let resolver = MatrixResolver::new(request.defaults.clone());
        let matrix = resolver
            .resolve(&request.platforms)
            .map_err(ConfigError::from)?;

        let solution = if request.is_solution() {
            let solution = parse_solution_file(&request.project_file)?;
            resolver
                .cross_check(&matrix, &solution)
                .map_err(ConfigError::from)?;
            tracing::debug!(
                "solution {} has {} C++ project(s)",
                solution.path.display(),
                solution.projects.len()
            );
            Some(solution)
        } else {
            None
        };

        for platform in &matrix {
            let configurations: Vec<&str> = platform.configurations().iter().map(|c| c.name()).collect();
            tracing::debug!("platform {}: {}", platform.name(), configurations.join(", "));
        }

        Ok(Plan {
            project_file: request.project_file.clone(),
            matrix,
            solution,
        })
    }

    /// Run `phase` over every pair of the matrix.
    pub fn run_phase(&self, phase: Phase<'_>, request: &PhaseRequest) -> Result<PhaseResult> {
        let started = Instant::now();
        let (tool, plan) = self.preflight(phase, request)?;

        match phase {
            Phase::QualityCheck(quality) => Ok(self.run_checks(quality, &tool, &plan, started)),
            _ => self.run_msbuild(phase, &tool, request, &plan, started),
        }
    }

    fn run_msbuild(
        &self,
        phase: Phase<'_>,
        msbuild_path: &Path,
        request: &PhaseRequest,
        plan: &Plan,
        started: Instant,
    ) -> Result<PhaseResult> {
        let targets = match phase {
            Phase::Clean => vec![CLEAN_TARGET.to_string()],
            Phase::TestBuild => request.test_targets.clone(),
            _ => request.targets.clone(),
        };

        let name = phase.name();
        let pairs = plan.pairs();
        let mut result = PhaseResult::new(name);

        for (index, pair) in pairs.iter().enumerate() {
            self.emit(PhaseEvent::pair_started(name, pair, index + 1, pairs.len()));
            tracing::info!("Running MSBuild ({}) for {}", name, pair);

            let invocation = msbuild::invocation(msbuild_path, &plan.project_file, pair, &targets);
            let mut stdout = LogConsumer::info("MSBuild");
            let mut stderr = LogConsumer::warn("MSBuild");

            let exit_code = match self.runner.run(&invocation, &mut stdout, &mut stderr) {
                Ok(code) => code,
                Err(source) => {
                    self.emit(PhaseEvent::pair_finished(name, pair, false, None));
                    self.finish(name, false, 1, started);
                    return Err(Error::Invocation {
                        tool: "MSBuild".to_string(),
                        platform: pair.platform.clone(),
                        configuration: pair.configuration.clone(),
                        source,
                    });
                }
            };

            let success = exit_code == 0;
            self.emit(PhaseEvent::pair_finished(name, pair, success, Some(exit_code)));
            result.pairs.push(PairResult {
                pair: pair.clone(),
                exit_code: Some(exit_code),
                projects: Vec::new(),
            });

            if !success {
                tracing::error!("MSBuild failed for {} (exit code {})", pair, exit_code);
                self.finish(name, false, 1, started);
                return Err(Error::BuildFailed {
                    platform: pair.platform.clone(),
                    configuration: pair.configuration.clone(),
                    exit_code,
                });
            }
        }

        self.finish(name, true, 0, started);
        Ok(result)
    }

    fn run_checks(
        &self,
        tool: &dyn QualityTool,
        located: &Path,
        plan: &Plan,
        started: Instant,
    ) -> PhaseResult {
        let name = tool.name();
        let pairs = plan.pairs();
        let mut result = PhaseResult::new(name);

        for (index, pair) in pairs.iter().enumerate() {
            self.emit(PhaseEvent::pair_started(name, pair, index + 1, pairs.len()));

            let mut projects = Vec::new();
            for scoped in self.projects_for(plan, pair, |project| !tool.excludes(project)) {
                let outcome = match scoped.parsed {
                    Err(e) => {
                        tracing::error!("could not parse project {} for {}: {}", scoped.name, pair, e);
                        ProjectResult {
                            project: scoped.name,
                            report: None,
                            status: ProjectStatus::Error {
                                message: format!("failed to parse project: {}", e),
                            },
                        }
                    }
                    Ok(project) if !tool.applies_to(&project) => {
                        tracing::debug!("{} does not apply to project {}", name, project.name());
                        ProjectResult {
                            project: scoped.name,
                            report: None,
                            status: ProjectStatus::Skipped,
                        }
                    }
                    Ok(project) => self.check_project(tool, located, &project),
                };

                self.emit(PhaseEvent::project_checked(
                    name,
                    &outcome.project,
                    pair,
                    &outcome.status,
                    outcome.report.clone(),
                ));
                projects.push(outcome);
            }

            let pair_result = PairResult {
                pair: pair.clone(),
                exit_code: None,
                projects,
            };
            self.emit(PhaseEvent::pair_finished(name, pair, pair_result.passed(), None));
            result.pairs.push(pair_result);
        }

        let failures = result.failures().len();
        self.finish(name, failures == 0, failures, started);
        result
    }

    /// Run `tool` over one project, streaming its report into place.
    fn check_project(&self, tool: &dyn QualityTool, located: &Path, project: &VCProject) -> ProjectResult {
        let report = tool.report_path_for(project);
        let mut invocation = Invocation::new(tool.executable(located, project))
            .args(tool.build_arguments(project))
            .cwd(tool.working_directory(project));
        if let Some(input) = tool.standard_input(project) {
            invocation = invocation.stdin(input);
        }

        tracing::info!(
            "Running {} for project {}, {}",
            tool.name(),
            project.name(),
            project.pair()
        );

        let mut log_out = LogConsumer::info(tool.name());
        let mut log_err = LogConsumer::warn(tool.name());

        let status = match tool.report_stream() {
            ReportStream::None => match report.parent().map(std::fs::create_dir_all).transpose() {
                Ok(_) => {
                    let run = self.runner.run(&invocation, &mut log_out, &mut log_err);
                    status_of(tool, project, run)
                }
                Err(e) => ProjectStatus::Error {
                    message: format!("failed to create report directory for `{}`: {}", report.display(), e),
                },
            },
            stream => match ReportWriter::create(&report) {
                Ok(mut writer) => {
                    let run = if stream == ReportStream::Stdout {
                        self.runner.run(&invocation, &mut writer, &mut log_err)
                    } else {
                        self.runner.run(&invocation, &mut log_out, &mut writer)
                    };
                    let status = status_of(tool, project, run);

                    match writer.finish() {
                        Ok(()) => status,
                        Err(e) => {
                            tracing::error!("failed to close report {}: {}", report.display(), e);
                            if status.passed() {
                                ProjectStatus::Error {
                                    message: format!("failed to close report `{}`: {}", report.display(), e),
                                }
                            } else {
                                status
                            }
                        }
                    }
                }
                Err(e) => ProjectStatus::Error {
                    message: format!("failed to create report `{}`: {}", report.display(), e),
                },
            },
        };

        ProjectResult {
            project: project.name().to_string(),
            report: Some(report),
            status,
        }
    }

    /// Write one Sonar configuration file per pair. Any error aborts.
    pub fn run_sonar(&self, request: &PhaseRequest, emitter: &SonarConfigEmitter) -> Result<Vec<PathBuf>> {
        let started = Instant::now();
        check_packaging(&request.packaging)?;
        let plan = self.plan(request)?;

        let outcome = self.write_sonar_configs(&plan, emitter);
        self.finish("sonar", outcome.is_ok(), usize::from(outcome.is_err()), started);
        outcome
    }

    fn write_sonar_configs(&self, plan: &Plan, emitter: &SonarConfigEmitter) -> Result<Vec<PathBuf>> {
        let pairs = plan.pairs();
        let mut written = Vec::with_capacity(pairs.len());

        for (index, pair) in pairs.iter().enumerate() {
            self.emit(PhaseEvent::pair_started("sonar", pair, index + 1, pairs.len()));

            let mut projects = Vec::new();
            for scoped in self.projects_for(plan, pair, |_| true) {
                let project = scoped.parsed.map_err(|source| Error::ProjectParse {
                    project: scoped.name,
                    platform: pair.platform.clone(),
                    configuration: pair.configuration.clone(),
                    source,
                })?;
                projects.push(project);
            }

            let path = emitter.config_path_for(pair);
            write_file(&path, &emitter.render(&projects, pair))?;
            tracing::info!("Wrote Sonar configuration {}", path.display());

            self.emit(PhaseEvent::pair_finished("sonar", pair, true, None));
            written.push(path);
        }

        Ok(written)
    }

    /// Parse every project in scope for `pair`, in solution order.
    fn projects_for(
        &self,
        plan: &Plan,
        pair: &BuildPair,
        include: impl Fn(&str) -> bool,
    ) -> Vec<ScopedProject> {
        match &plan.solution {
            Some(solution) => solution
                .projects
                .iter()
                .filter(|member| include(&member.name))
                .map(|member| ScopedProject {
                    name: member.name.clone(),
                    parsed: parse_solution_project(
                        member,
                        &solution.directory,
                        &pair.platform,
                        &pair.configuration,
                    ),
                })
                .collect(),
            None => {
                let name = plan
                    .project_file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                if !include(&name) {
                    return Vec::new();
                }
                let parsed = parse_project(&plan.project_file, &pair.platform, &pair.configuration, None);
                vec![ScopedProject { name, parsed }]
            }
        }
    }

    fn emit(&self, event: PhaseEvent) {
        self.observer.on_event(&event);
    }

    fn finish(&self, phase: &str, success: bool, failures: usize, started: Instant) {
        let duration_ms = started.elapsed().as_millis() as u64;
        self.emit(PhaseEvent::phase_finished(phase, success, duration_ms, failures));
    }
}

fn status_of(
    tool: &dyn QualityTool,
    project: &VCProject,
    run: std::result::Result<i32, ProcessError>,
) -> ProjectStatus {
    match run {
        Ok(exit_code) => match tool.interpret_result(exit_code) {
            CheckOutcome::Passed => ProjectStatus::Passed,
            CheckOutcome::Violations(exit_code) => {
                tracing::warn!("{} found problems in {}", tool.name(), project);
                ProjectStatus::Violations { exit_code }
            }
            CheckOutcome::ToolFailure(exit_code) => {
                tracing::error!("{} failed for {} (exit code {})", tool.name(), project, exit_code);
                ProjectStatus::ToolFailure { exit_code }
            }
        },
        Err(e) => {
            let mut message = e.to_string();
            if let Some(source) = e.source() {
                message.push_str(&format!(": {}", source));
            }
            tracing::error!("{}", message);
            ProjectStatus::Error { message }
        }
    }
}

fn check_packaging(packaging: &str) -> std::result::Result<(), ConfigError> {
    if VALID_PACKAGING.contains(&packaging) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPackaging {
            packaging: packaging.to_string(),
        })
    }
}

fn check_project_file(path: &Path) -> std::result::Result<(), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::InvalidProjectFile {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }
    if !path.is_file() {
        return Err(ConfigError::InvalidProjectFile {
            path: path.to_path_buf(),
            reason: "not a regular file".to_string(),
        });
    }
    if !has_extension(path, "sln") && !has_extension(path, "vcxproj") {
        return Err(ConfigError::UnsupportedProjectFile {
            path: path.to_path_buf(),
        });
    }
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    let report = |source| Error::Report {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = ReportWriter::create(path).map_err(report)?;
    writer.write_str(contents).map_err(report)?;
    writer.finish().map_err(report)
}
