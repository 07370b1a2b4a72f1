//! `.sln` parsing.
//!
//! Solution files are line oriented:
//!
//! ```text
//! Microsoft Visual Studio Solution File, Format Version 12.00
//! Project("{8BC9CEB8-8B4A-11D0-8D11-00A0C91E6BC7}") = "Core", "src\Core\Core.vcxproj", "{...}"
//! EndProject
//! Global
//!     GlobalSection(SolutionConfigurationPlatforms) = preSolution
//!         Debug|Win32 = Debug|Win32
//!     EndGlobalSection
//!     GlobalSection(NestedProjects) = preSolution
//!         {child} = {folder}
//!     EndGlobalSection
//! EndGlobal
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::core::platform::BuildPair;
use crate::parser::errors::ParseError;
use crate::parser::project::read_source;
use crate::util::fs::{absolute_path, host_path, resolve_against};

const SOLUTION_HEADER: &str = "Microsoft Visual Studio Solution File";

/// Project type GUID of solution folders.
const SOLUTION_FOLDER_TYPE: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// A C++ project listed in a solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SolutionProject {
    /// Name the solution gives the project
    pub name: String,
    /// Absolute path of the `.vcxproj`
    pub path: PathBuf,
    /// Project type GUID
    pub type_guid: String,
    /// GUID under which the solution lists the project
    pub solution_guid: String,
    /// MSBuild target addressing this project from the solution
    pub target_name: String,
}

/// A parsed solution.
#[derive(Debug, Clone)]
pub struct Solution {
    pub path: PathBuf,
    pub directory: PathBuf,
    pub projects: Vec<SolutionProject>,
    /// `SolutionConfigurationPlatforms`, in file order
    pub pairs: Vec<BuildPair>,
}

impl Solution {
    /// Whether the solution declares the given pair.
    pub fn declares(&self, pair: &BuildPair) -> bool {
        self.pairs.iter().any(|p| {
            p.platform.eq_ignore_ascii_case(&pair.platform)
                && p.configuration.eq_ignore_ascii_case(&pair.configuration)
        })
    }
}

/// One `Project(...)` entry of any type, before filtering.
struct Entry {
    type_guid: String,
    name: String,
    path: String,
    guid: String,
}

static PROJECT_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^Project\("(\{[^}]+\})"\)\s*=\s*"([^"]*)"\s*,\s*"([^"]*)"\s*,\s*"(\{[^}]+\})""#)
        .unwrap()
});

static ASSIGNMENT_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.+?)\s*=\s*(.+)$").unwrap());

/// Characters MSBuild replaces with `_` when naming solution targets.
fn target_segment(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '.' | '%' | '$' | '@' | ';' | '(' | ')' | '\'' => '_',
            c => c,
        })
        .collect()
}

/// Parse a solution and return its C++ projects in file order.
pub fn parse_solution(solution_file: &Path) -> Result<Vec<SolutionProject>, ParseError> {
    parse_solution_file(solution_file).map(|solution| solution.projects)
}

/// Parse a solution, including its declared pairs.
///
/// Every referenced project file must exist.
pub fn parse_solution_file(solution_file: &Path) -> Result<Solution, ParseError> {
    let path = absolute_path(solution_file);
    let directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let text = read_source(&path)?;

    let malformed = |line: usize, message: &str| ParseError::MalformedSolution {
        path: path.clone(),
        line,
        message: message.to_string(),
    };

    let mut lines = text.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    match lines.by_ref().find(|(_, l)| !l.is_empty()) {
        Some((_, first)) if first.starts_with(SOLUTION_HEADER) => {}
        Some((line, _)) => return Err(malformed(line, "missing solution file header")),
        None => return Err(malformed(1, "empty solution file")),
    }

    let mut entries = Vec::new();
    let mut nesting: HashMap<String, String> = HashMap::new();
    let mut pairs = Vec::new();
    let mut section: Option<String> = None;

    for (number, line) in lines {
        if line.starts_with("Project(") {
            let caps = PROJECT_LINE
                .captures(line)
                .ok_or_else(|| malformed(number, "unrecognised project entry"))?;
            entries.push(Entry {
                type_guid: caps[1].to_ascii_uppercase(),
                name: caps[2].to_string(),
                path: caps[3].to_string(),
                guid: caps[4].to_ascii_uppercase(),
            });
        } else if let Some(rest) = line.strip_prefix("GlobalSection(") {
            let name = rest.split(')').next().unwrap_or_default();
            section = Some(name.to_string());
        } else if line == "EndGlobalSection" {
            section = None;
        } else if let Some(current) = section.as_deref() {
            let Some(caps) = ASSIGNMENT_LINE.captures(line) else {
                continue;
            };
            match current {
                "SolutionConfigurationPlatforms" => {
                    let key = caps[1].trim();
                    let (configuration, platform) = key
                        .split_once('|')
                        .ok_or_else(|| malformed(number, "expected `Configuration|Platform`"))?;
                    pairs.push(BuildPair::new(platform.trim(), configuration.trim()));
                }
                "NestedProjects" => {
                    nesting.insert(caps[1].trim().to_ascii_uppercase(), caps[2].trim().to_ascii_uppercase());
                }
                _ => {}
            }
        }
    }

    let names: HashMap<&str, &str> = entries
        .iter()
        .map(|e| (e.guid.as_str(), e.name.as_str()))
        .collect();

    let mut projects = Vec::new();
    for entry in &entries {
        if entry.type_guid == SOLUTION_FOLDER_TYPE || !is_vcxproj(&entry.path) {
            continue;
        }

        let project_path = resolve_against(&directory, &host_path(&entry.path));
        if !project_path.is_file() {
            return Err(ParseError::MissingProjectFile {
                solution: path.clone(),
                path: project_path,
            });
        }

        let mut segments = vec![target_segment(&entry.name)];
        let mut current = entry.guid.as_str();
        // Depth bound guards against cyclic nesting in hand-edited files.
        for _ in 0..entries.len() {
            let Some(parent) = nesting.get(current) else {
                break;
            };
            let Some(folder) = names.get(parent.as_str()) else {
                break;
            };
            segments.push(target_segment(folder));
            current = parent;
        }
        segments.reverse();

        projects.push(SolutionProject {
            name: entry.name.clone(),
            path: project_path,
            type_guid: entry.type_guid.clone(),
            solution_guid: entry.guid.clone(),
            target_name: segments.join("\\"),
        });
    }

    tracing::debug!(
        "solution {}: {} C++ projects, {} configurations",
        path.display(),
        projects.len(),
        pairs.len()
    );

    Ok(Solution {
        path,
        directory,
        projects,
        pairs,
    })
}

fn is_vcxproj(raw: &str) -> bool {
    raw.to_ascii_lowercase().ends_with(".vcxproj")
}
