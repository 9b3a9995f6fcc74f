//! External command description with its artifact contract.

use std::path::{Path, PathBuf};

/// A fully-formed external command for one pipeline stage.
///
/// Besides the program and argument list, a command declares the artifacts
/// it consumes and produces. Declared inputs are checked by the coordinator
/// before the process is spawned; declared outputs let test doubles stand in
/// for the real tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageCommand {
    stage: String,
    program: String,
    args: Vec<String>,
    inputs: Vec<PathBuf>,
    outputs: Vec<PathBuf>,
}

impl StageCommand {
    /// Creates a command for a named stage.
    #[must_use]
    pub fn new(stage: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            program: program.into(),
            args: Vec::new(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// Appends one argument.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends a path argument, rendered with its platform display form.
    #[must_use]
    pub fn path_arg(mut self, path: impl AsRef<Path>) -> Self {
        self.args.push(path.as_ref().display().to_string());
        self
    }

    /// Declares an input artifact that must exist before the stage runs.
    #[must_use]
    pub fn input(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    /// Declares an output artifact the stage produces.
    #[must_use]
    pub fn output(mut self, path: impl Into<PathBuf>) -> Self {
        self.outputs.push(path.into());
        self
    }

    /// Returns the stage name.
    #[must_use]
    pub fn stage(&self) -> &str {
        &self.stage
    }

    /// Returns the program to invoke.
    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Returns the argument list.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Returns the declared input artifacts.
    #[must_use]
    pub fn inputs(&self) -> &[PathBuf] {
        &self.inputs
    }

    /// Returns the declared output artifacts.
    #[must_use]
    pub fn outputs(&self) -> &[PathBuf] {
        &self.outputs
    }

    /// Returns declared inputs that do not currently exist on disk.
    #[must_use]
    pub fn missing_inputs(&self) -> Vec<PathBuf> {
        self.inputs
            .iter()
            .filter(|path| !path.exists())
            .cloned()
            .collect()
    }

    /// Renders the full command line for logs and error messages.
    #[must_use]
    pub fn display_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            line.push_str(arg);
        }
        line
    }
}
