//! Test fixtures for common test scenarios.
//!
//! Builders for `.vcxproj` and `.sln` text, plus a helper that lays out a
//! small two-project solution on disk.

use std::path::{Path, PathBuf};

use crate::core::platform::BuildPair;
use crate::core::project::VCProject;

/// Project type GUID of Visual C++ projects.
pub const VCXPROJ_TYPE: &str = "{8BC9CEB8-8B4A-11D0-8D11-00A0C91E6BC7}";

/// Project type GUID of solution folders.
pub const FOLDER_TYPE: &str = "{2150E333-8FDC-42A3-9474-1A3956D46DE8}";

/// Builds `.vcxproj` XML.
#[derive(Debug, Clone, Default)]
pub struct VcxprojBuilder {
    guid: String,
    configurations: Vec<(String, String)>,
    definitions: Vec<(String, String, String, String)>,
    out_dirs: Vec<(String, String, String)>,
    sources: Vec<String>,
    headers: Vec<String>,
}

impl VcxprojBuilder {
    pub fn new(guid: impl Into<String>) -> Self {
        VcxprojBuilder {
            guid: guid.into(),
            ..Default::default()
        }
    }

    /// Declare a `ProjectConfiguration`.
    pub fn configuration(mut self, configuration: &str, platform: &str) -> Self {
        self.configurations
            .push((configuration.to_string(), platform.to_string()));
        self
    }

    /// Add an `ItemDefinitionGroup` for one pair.
    pub fn definitions(
        mut self,
        configuration: &str,
        platform: &str,
        include_dirs: &str,
        defines: &str,
    ) -> Self {
        self.definitions.push((
            configuration.to_string(),
            platform.to_string(),
            include_dirs.to_string(),
            defines.to_string(),
        ));
        self
    }

    /// Set `OutDir` for one pair.
    pub fn out_dir(mut self, configuration: &str, platform: &str, value: &str) -> Self {
        self.out_dirs.push((
            configuration.to_string(),
            platform.to_string(),
            value.to_string(),
        ));
        self
    }

    pub fn source(mut self, path: &str) -> Self {
        self.sources.push(path.to_string());
        self
    }

    pub fn header(mut self, path: &str) -> Self {
        self.headers.push(path.to_string());
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from(
            "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n\
             <Project DefaultTargets=\"Build\" ToolsVersion=\"15.0\" xmlns=\"http://schemas.microsoft.com/developer/msbuild/2003\">\n",
        );

        xml.push_str("  <ItemGroup Label=\"ProjectConfigurations\">\n");
        for (configuration, platform) in &self.configurations {
            xml.push_str(&format!(
                "    <ProjectConfiguration Include=\"{c}|{p}\">\n      <Configuration>{c}</Configuration>\n      <Platform>{p}</Platform>\n    </ProjectConfiguration>\n",
                c = configuration,
                p = platform
            ));
        }
        xml.push_str("  </ItemGroup>\n");

        xml.push_str(&format!(
            "  <PropertyGroup Label=\"Globals\">\n    <ProjectGuid>{}</ProjectGuid>\n  </PropertyGroup>\n",
            self.guid
        ));

        for (configuration, platform, value) in &self.out_dirs {
            xml.push_str(&format!(
                "  <PropertyGroup Condition=\"'$(Configuration)|$(Platform)'=='{}|{}'\">\n    <OutDir>{}</OutDir>\n  </PropertyGroup>\n",
                configuration, platform, value
            ));
        }

        for (configuration, platform, includes, defines) in &self.definitions {
            xml.push_str(&format!(
                "  <ItemDefinitionGroup Condition=\"'$(Configuration)|$(Platform)'=='{}|{}'\">\n    <ClCompile>\n      <AdditionalIncludeDirectories>{}</AdditionalIncludeDirectories>\n      <PreprocessorDefinitions>{}</PreprocessorDefinitions>\n    </ClCompile>\n  </ItemDefinitionGroup>\n",
                configuration, platform, includes, defines
            ));
        }

        xml.push_str("  <ItemGroup>\n");
        for source in &self.sources {
            xml.push_str(&format!("    <ClCompile Include=\"{}\" />\n", source));
        }
        for header in &self.headers {
            xml.push_str(&format!("    <ClInclude Include=\"{}\" />\n", header));
        }
        xml.push_str("  </ItemGroup>\n</Project>\n");

        xml
    }
}

/// Builds `.sln` text.
#[derive(Debug, Clone, Default)]
pub struct SolutionBuilder {
    projects: Vec<(String, String, String, String)>,
    nested: Vec<(String, String)>,
    pairs: Vec<(String, String)>,
}

impl SolutionBuilder {
    pub fn new() -> Self {
        SolutionBuilder::default()
    }

    /// Add a Visual C++ project entry.
    pub fn project(self, name: &str, path: &str, guid: &str) -> Self {
        self.project_of_type(VCXPROJ_TYPE, name, path, guid)
    }

    /// Add a project entry of any type.
    pub fn project_of_type(mut self, type_guid: &str, name: &str, path: &str, guid: &str) -> Self {
        self.projects.push((
            type_guid.to_string(),
            name.to_string(),
            path.to_string(),
            guid.to_string(),
        ));
        self
    }

    /// Add a solution folder.
    pub fn folder(self, name: &str, guid: &str) -> Self {
        self.project_of_type(FOLDER_TYPE, name, name, guid)
    }

    /// Place `child` inside the folder `parent`.
    pub fn nest(mut self, child: &str, parent: &str) -> Self {
        self.nested.push((child.to_string(), parent.to_string()));
        self
    }

    /// Declare a solution configuration.
    pub fn pair(mut self, configuration: &str, platform: &str) -> Self {
        self.pairs
            .push((configuration.to_string(), platform.to_string()));
        self
    }

    pub fn build(&self) -> String {
        let mut sln = String::from(
            "\u{feff}\nMicrosoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
        );
        for (type_guid, name, path, guid) in &self.projects {
            sln.push_str(&format!(
                "Project(\"{}\") = \"{}\", \"{}\", \"{}\"\nEndProject\n",
                type_guid, name, path, guid
            ));
        }
        sln.push_str("Global\n");
        sln.push_str("\tGlobalSection(SolutionConfigurationPlatforms) = preSolution\n");
        for (configuration, platform) in &self.pairs {
            sln.push_str(&format!(
                "\t\t{c}|{p} = {c}|{p}\n",
                c = configuration,
                p = platform
            ));
        }
        sln.push_str("\tEndGlobalSection\n");
        if !self.nested.is_empty() {
            sln.push_str("\tGlobalSection(NestedProjects) = preSolution\n");
            for (child, parent) in &self.nested {
                sln.push_str(&format!("\t\t{} = {}\n", child, parent));
            }
            sln.push_str("\tEndGlobalSection\n");
        }
        sln.push_str("EndGlobal\n");
        sln
    }
}

/// Write `content` to `dir/relative`, creating parent directories.
pub fn write_file(dir: &Path, relative: &str, content: &str) -> PathBuf {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("failed to create fixture dir");
    }
    std::fs::write(&path, content).expect("failed to write fixture");
    path
}

/// Lay out `All.sln` with projects `Core` and `Widgets`, each declaring the
/// given `(configuration, platform)` pairs. Returns the solution path.
pub fn two_project_solution(dir: &Path, pairs: &[(&str, &str)]) -> PathBuf {
    for (name, guid) in [
        ("Core", "{AAAAAAAA-0000-0000-0000-000000000001}"),
        ("Widgets", "{AAAAAAAA-0000-0000-0000-000000000002}"),
    ] {
        let mut project = VcxprojBuilder::new(guid)
            .source(&format!("{}.cpp", name.to_lowercase()))
            .header(&format!("{}.h", name.to_lowercase()))
            .header(&format!("{}Test.h", name));
        for (configuration, platform) in pairs {
            project = project
                .configuration(configuration, platform)
                .definitions(
                    configuration,
                    platform,
                    "include;include;%(AdditionalIncludeDirectories)",
                    &format!("{}_API;WIN32;%(PreprocessorDefinitions)", name.to_uppercase()),
                );
        }
        write_file(dir, &format!("{0}/{0}.vcxproj", name), &project.build());
        write_file(dir, &format!("{}/{}.cpp", name, name.to_lowercase()), "int main() { return 0; }\n");
    }

    let mut sln = SolutionBuilder::new()
        .project("Core", "Core\\Core.vcxproj", "{AAAAAAAA-0000-0000-0000-000000000001}")
        .project("Widgets", "Widgets\\Widgets.vcxproj", "{AAAAAAAA-0000-0000-0000-000000000002}");
    for (configuration, platform) in pairs {
        sln = sln.pair(configuration, platform);
    }
    write_file(dir, "All.sln", &sln.build())
}

/// A minimal `vcmatrix.toml` for the given project file.
pub fn manifest_for(name: &str, file: &str) -> String {
    format!(
        "[project]\nname = \"{}\"\ngroup = \"org.example\"\nversion = \"1.0.0\"\nfile = \"{}\"\n",
        name, file
    )
}

/// An in-memory project for adapter tests: `Core` at `/work/Core` in a
/// solution rooted at `/work`, parsed for x64/Debug.
pub fn sample_project() -> VCProject {
    VCProject {
        name: "Core".into(),
        project_file: PathBuf::from("/work/Core/Core.vcxproj"),
        guid: Some("{11111111-1111-1111-1111-111111111111}".into()),
        solution_guid: Some("{22222222-2222-2222-2222-222222222222}".into()),
        target_name: Some("Core".into()),
        base_directory: PathBuf::from("/work"),
        output_directory: PathBuf::from("/work/x64/Debug"),
        include_directories: vec![
            PathBuf::from("/work/Core/include"),
            PathBuf::from("/work/Core/include"),
        ],
        preprocessor_defs: vec!["CORE_API".into(), "WIN32".into()],
        sources: vec![
            PathBuf::from("/work/Core/core.cpp"),
            PathBuf::from("/work/Core/util.cpp"),
        ],
        headers: vec![
            PathBuf::from("/work/Core/core.h"),
            PathBuf::from("/work/Core/CoreTest.h"),
        ],
        pair: BuildPair::new("x64", "Debug"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcxproj_builder_is_parseable_xml() {
        let xml = VcxprojBuilder::new("{A}")
            .configuration("Debug", "Win32")
            .definitions("Debug", "Win32", "inc", "X")
            .source("a.cpp")
            .build();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        assert_eq!(doc.root_element().tag_name().name(), "Project");
    }

    #[test]
    fn test_solution_builder_output() {
        let sln = SolutionBuilder::new()
            .project("A", "A\\A.vcxproj", "{1}")
            .pair("Debug", "x64")
            .build();

        assert!(sln.contains("Project(\"{8BC9CEB8-8B4A-11D0-8D11-00A0C91E6BC7}\") = \"A\", \"A\\A.vcxproj\", \"{1}\""));
        assert!(sln.contains("Debug|x64 = Debug|x64"));
    }

    #[test]
    fn test_two_project_solution_layout() {
        let tmp = tempfile::TempDir::new().unwrap();
        let sln = two_project_solution(tmp.path(), &[("Debug", "Win32")]);

        assert!(sln.is_file());
        assert!(tmp.path().join("Core/Core.vcxproj").is_file());
        assert!(tmp.path().join("Widgets/widgets.cpp").is_file());
    }
}
