use serde::{Deserialize, Serialize};

/// Kind of artifact a toolchain produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Native executable, run directly from the workspace
    #[default]
    Native,
    /// WebAssembly module, executed by the in-process wasm host
    Wasm,
    /// JVM class file, run via the configured launcher command
    Class,
}

/// One candidate compiler for a toolchain.
///
/// Candidates are probed in order; the first whose probe command succeeds
/// compiles the snippet. Later candidates are never tried once one probes
/// healthy, even if its compile step then fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolchainCandidate {
    /// Availability probe (e.g. `["gcc", "--version"]`)
    pub probe: Vec<String>,

    /// Compile command with placeholders
    /// Placeholders: {source}, {output}, {dir}
    pub compile: Vec<String>,
}

/// A pre-flight check rejecting an installed-but-unsuitable toolchain with a
/// tailored message instead of the generic installation hint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsuitableProbe {
    /// Probe command identifying the unsuitable toolchain
    pub probe: Vec<String>,

    /// Message returned when the probe succeeds
    pub message: String,
}

/// Configuration for one compiled-language toolchain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Toolchain {
    /// Human-readable name (e.g. "C++ (GCC/Clang)")
    pub name: String,

    /// Source file name staged in the workspace (e.g. "main.cpp")
    pub source_name: String,

    /// Expected artifact name (e.g. "main", "main.wasm")
    pub output_name: String,

    /// What the compile step produces
    #[serde(default)]
    pub artifact: ArtifactKind,

    /// Compiler candidates, probed in order
    pub candidates: Vec<ToolchainCandidate>,

    /// Launcher command with placeholders; empty means "run the artifact
    /// directly" (native) or "hand to the wasm host" (wasm)
    #[serde(default)]
    pub run: Vec<String>,

    /// Probe for the runtime needed to launch the artifact (e.g. `java`
    /// alongside `javac`)
    #[serde(default)]
    pub runtime_probe: Option<Vec<String>>,

    /// Rejects an installed-but-wrong toolchain before the candidate scan
    #[serde(default)]
    pub unsuitable: Option<UnsuitableProbe>,

    /// Actionable hint returned when no candidate probes healthy
    pub install_hint: String,

    /// Extra guidance appended to compile-failure diagnostics
    #[serde(default)]
    pub compile_failure_note: Option<String>,

    /// Extra guidance appended when the expected artifact never appears
    #[serde(default)]
    pub artifact_missing_note: Option<String>,
}

impl Toolchain {
    /// Expand placeholders in a command template.
    ///
    /// `{source}` and `{output}`/`{binary}` name workspace files, `{dir}` the
    /// workspace directory, and `{class}` the extracted JVM class name.
    pub fn expand_command(
        command: &[String],
        source: &str,
        output: &str,
        dir: &str,
        class: &str,
    ) -> Vec<String> {
        command
            .iter()
            .map(|arg| {
                arg.replace("{source}", source)
                    .replace("{output}", output)
                    .replace("{binary}", output)
                    .replace("{dir}", dir)
                    .replace("{class}", class)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_kind_defaults_to_native() {
        assert_eq!(ArtifactKind::default(), ArtifactKind::Native);
    }

    #[test]
    fn expand_command_source_and_output() {
        let cmd = vec![
            "gcc".to_owned(),
            "{source}".to_owned(),
            "-o".to_owned(),
            "{output}".to_owned(),
        ];
        let result = Toolchain::expand_command(&cmd, "main.c", "main", "/tmp/ws", "Main");
        assert_eq!(result, vec!["gcc", "main.c", "-o", "main"]);
    }

    #[test]
    fn expand_command_binary_aliases_output() {
        let cmd = vec!["./{binary}".to_owned()];
        let result = Toolchain::expand_command(&cmd, "main.cpp", "main", "/tmp/ws", "Main");
        assert_eq!(result, vec!["./main"]);
    }

    #[test]
    fn expand_command_dir_and_class() {
        let cmd = vec![
            "java".to_owned(),
            "-cp".to_owned(),
            "{dir}".to_owned(),
            "{class}".to_owned(),
        ];
        let result = Toolchain::expand_command(&cmd, "Main.java", "Main.class", "/tmp/ws", "Main");
        assert_eq!(result, vec!["java", "-cp", "/tmp/ws", "Main"]);
    }

    #[test]
    fn expand_command_no_placeholders() {
        let cmd = vec!["tinygo".to_owned(), "version".to_owned()];
        let result = Toolchain::expand_command(&cmd, "s", "o", "d", "c");
        assert_eq!(result, vec!["tinygo", "version"]);
    }
}
