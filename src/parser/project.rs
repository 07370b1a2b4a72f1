//! `.vcxproj` parsing.
//!
//! A project is evaluated for exactly one (platform, configuration) pair:
//! property groups, item definition groups and items are visited in
//! document order and kept only when their `Condition` holds for that pair.

use std::path::{Path, PathBuf};

use roxmltree::{Document, Node};

use crate::core::platform::BuildPair;
use crate::core::project::VCProject;
use crate::parser::condition;
use crate::parser::errors::ParseError;
use crate::parser::properties::Properties;
use crate::parser::solution::SolutionProject;
use crate::util::fs::{absolute_path, host_path, resolve_against};

/// Parse a standalone project file for one pair.
///
/// `base_directory` defaults to the project's own directory.
pub fn parse_project(
    project_file: &Path,
    platform: &str,
    configuration: &str,
    base_directory: Option<&Path>,
) -> Result<VCProject, ParseError> {
    let project_file = absolute_path(project_file);
    let name = project_file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let target = ProjectTarget {
        name,
        project_file,
        base_directory: base_directory.map(absolute_path),
        solution_guid: None,
        target_name: None,
    };
    target.parse(&BuildPair::new(platform, configuration))
}

/// Parse one member of a solution for one pair. The solution's directory
/// becomes the project's base directory.
pub fn parse_solution_project(
    member: &SolutionProject,
    solution_directory: &Path,
    platform: &str,
    configuration: &str,
) -> Result<VCProject, ParseError> {
    let target = ProjectTarget {
        name: member.name.clone(),
        project_file: absolute_path(&member.path),
        base_directory: Some(absolute_path(solution_directory)),
        solution_guid: Some(member.solution_guid.clone()),
        target_name: Some(member.target_name.clone()),
    };
    target.parse(&BuildPair::new(platform, configuration))
}

struct ProjectTarget {
    name: String,
    project_file: PathBuf,
    base_directory: Option<PathBuf>,
    solution_guid: Option<String>,
    target_name: Option<String>,
}

/// Values accumulated while walking the document.
#[derive(Default)]
struct Evaluation {
    include_directories: Vec<String>,
    preprocessor_defs: Vec<String>,
    sources: Vec<String>,
    headers: Vec<String>,
}

/// Read a file as text, dropping a UTF-8 byte order mark.
pub(crate) fn read_source(path: &Path) -> Result<String, ParseError> {
    let text = std::fs::read_to_string(path).map_err(|source| ParseError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(match text.strip_prefix('\u{feff}') {
        Some(stripped) => stripped.to_string(),
        None => text,
    })
}

fn with_trailing_separator(path: &Path) -> String {
    let mut text = path.display().to_string();
    if !text.ends_with(std::path::MAIN_SEPARATOR) {
        text.push(std::path::MAIN_SEPARATOR);
    }
    text
}

fn is(node: &Node, tag: &str) -> bool {
    node.is_element() && node.tag_name().name() == tag
}

/// Elements whose condition cannot be evaluated are skipped with a warning.
fn condition_holds(file: &Path, node: &Node, props: &Properties) -> bool {
    condition::holds(node.attribute("Condition"), props).unwrap_or_else(|e| {
        tracing::warn!("{}: skipping <{}>: {}", file.display(), node.tag_name().name(), e);
        false
    })
}

fn element_text(node: &Node) -> String {
    node.text().map(|t| t.trim().to_string()).unwrap_or_default()
}

/// Split an expanded `;` list. `%(Name)` splices in `inherited`; any other
/// metadata reference is dropped.
fn merge_list(value: &str, metadata: &str, inherited: &[String]) -> Vec<String> {
    let own_reference = format!("%({})", metadata);
    let mut items = Vec::new();
    for item in value.split(';').map(str::trim).filter(|s| !s.is_empty()) {
        if item.eq_ignore_ascii_case(&own_reference) {
            items.extend(inherited.iter().cloned());
        } else if !item.starts_with("%(") {
            items.push(item.to_string());
        }
    }
    items
}

impl ProjectTarget {
    fn project_directory(&self) -> PathBuf {
        self.project_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    fn parse(&self, pair: &BuildPair) -> Result<VCProject, ParseError> {
        let text = read_source(&self.project_file)?;
        let doc = Document::parse(&text).map_err(|source| ParseError::Xml {
            path: self.project_file.clone(),
            source,
        })?;

        let root = doc.root_element();
        if root.tag_name().name() != "Project" {
            return Err(ParseError::NotAProject {
                path: self.project_file.clone(),
                root: root.tag_name().name().to_string(),
            });
        }

        if !self.declares_pair(root, pair) {
            return Err(ParseError::ProjectConfigurationNotFound {
                project: self.name.clone(),
                path: self.project_file.clone(),
                platform: pair.platform.clone(),
                configuration: pair.configuration.clone(),
            });
        }

        let project_dir = self.project_directory();
        let base_dir = self
            .base_directory
            .clone()
            .unwrap_or_else(|| project_dir.clone());

        let file = self.project_file.as_path();
        let mut props = self.initial_properties(pair, &project_dir, &base_dir);
        let mut eval = Evaluation::default();

        for node in root.children().filter(|n| n.is_element()) {
            if !condition_holds(file, &node, &props) {
                continue;
            }
            match node.tag_name().name() {
                "PropertyGroup" => self.visit_property_group(node, &mut props),
                "ItemDefinitionGroup" => visit_item_definitions(file, node, &props, &mut eval),
                "ItemGroup" => visit_items(file, node, &props, &mut eval),
                _ => {}
            }
        }

        let resolve = |raw: &String| resolve_against(&project_dir, &host_path(raw));

        let output_directory = match props.get("OutDir").filter(|s| !s.trim().is_empty()) {
            Some(out_dir) => resolve_against(&project_dir, &host_path(out_dir.trim())),
            None => default_output_directory(&base_dir, pair),
        };

        let project = VCProject {
            name: self.name.clone(),
            project_file: self.project_file.clone(),
            guid: props.get("ProjectGuid").filter(|g| !g.is_empty()),
            solution_guid: self.solution_guid.clone(),
            target_name: self.target_name.clone(),
            base_directory: base_dir,
            output_directory,
            include_directories: eval.include_directories.iter().map(resolve).collect(),
            preprocessor_defs: eval.preprocessor_defs,
            sources: eval.sources.iter().map(resolve).collect(),
            headers: eval.headers.iter().map(resolve).collect(),
            pair: pair.clone(),
        };

        tracing::debug!(
            "parsed {}: {} sources, {} headers, {} include dirs, {} defines",
            project,
            project.sources.len(),
            project.headers.len(),
            project.include_directories.len(),
            project.preprocessor_defs.len()
        );

        Ok(project)
    }

    fn declares_pair(&self, root: Node, pair: &BuildPair) -> bool {
        let key = pair.msbuild_key();
        root.children()
            .filter(|n| is(n, "ItemGroup"))
            .flat_map(|group| group.children())
            .filter(|n| is(n, "ProjectConfiguration"))
            .filter_map(|n| n.attribute("Include"))
            .any(|include| include.trim().eq_ignore_ascii_case(&key))
    }

    fn initial_properties(&self, pair: &BuildPair, project_dir: &Path, base_dir: &Path) -> Properties {
        let mut props = Properties::with_environment();
        props.set("Configuration", pair.configuration.as_str());
        props.set("ConfigurationName", pair.configuration.as_str());
        props.set("Platform", pair.platform.as_str());
        props.set("PlatformName", pair.platform.as_str());
        props.set("ProjectName", self.name.as_str());
        props.set("ProjectDir", with_trailing_separator(project_dir));
        props.set("MSBuildProjectDirectory", project_dir.display().to_string());
        props.set("ProjectPath", self.project_file.display().to_string());
        props.set("SolutionDir", with_trailing_separator(base_dir));
        if let Some(file_name) = self.project_file.file_name() {
            props.set("ProjectFileName", file_name.to_string_lossy());
        }
        props
    }

    fn visit_property_group(&self, group: Node, props: &mut Properties) {
        for property in group.children().filter(|n| n.is_element()) {
            if !condition_holds(&self.project_file, &property, props) {
                continue;
            }
            let value = props.expand(&element_text(&property));
            props.set(property.tag_name().name(), value);
        }
    }
}

fn visit_item_definitions(file: &Path, group: Node, props: &Properties, eval: &mut Evaluation) {
    for compile in group.children().filter(|n| is(n, "ClCompile")) {
        if !condition_holds(file, &compile, props) {
            continue;
        }
        for metadata in compile.children().filter(|n| n.is_element()) {
            if !condition_holds(file, &metadata, props) {
                continue;
            }
            let value = props.expand(&element_text(&metadata));
            match metadata.tag_name().name() {
                "AdditionalIncludeDirectories" => {
                    eval.include_directories =
                        merge_list(&value, "AdditionalIncludeDirectories", &eval.include_directories);
                }
                "PreprocessorDefinitions" => {
                    eval.preprocessor_defs =
                        merge_list(&value, "PreprocessorDefinitions", &eval.preprocessor_defs);
                }
                _ => {}
            }
        }
    }
}

fn excluded_from_build(file: &Path, item: &Node, props: &Properties) -> bool {
    item.children()
        .filter(|n| is(n, "ExcludedFromBuild"))
        .filter(|n| condition_holds(file, n, props))
        .any(|n| props.expand(&element_text(&n)).eq_ignore_ascii_case("true"))
}

fn visit_items(file: &Path, group: Node, props: &Properties, eval: &mut Evaluation) {
    for item in group.children().filter(|n| n.is_element()) {
        let list = match item.tag_name().name() {
            "ClCompile" => &mut eval.sources,
            "ClInclude" => &mut eval.headers,
            _ => continue,
        };
        if !condition_holds(file, &item, props) || excluded_from_build(file, &item, props) {
            continue;
        }
        let Some(include) = item.attribute("Include") else {
            continue;
        };
        list.extend(
            props
                .expand(include)
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
    }
}

/// MSBuild's default `OutDir` when a project does not set one.
fn default_output_directory(base_dir: &Path, pair: &BuildPair) -> PathBuf {
    if pair.platform.eq_ignore_ascii_case("Win32") {
        base_dir.join(&pair.configuration)
    } else {
        base_dir.join(&pair.platform).join(&pair.configuration)
    }
}
