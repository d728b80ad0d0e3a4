use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    thread,
    time::{Duration, Instant},
};

use crate::{
    foundation::error::{ViewgridError, ViewgridResult},
    tools::temp::TempPath,
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where external tools live and how they are run.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct ToolSettings {
    /// Root that tool ids such as `kinect/depth_reprojection` resolve against.
    pub tools_dir: PathBuf,
    /// Directory for temporaries; the OS temp dir when `None`.
    pub scratch_dir: Option<PathBuf>,
    /// Kill a tool that runs longer than this. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            tools_dir: PathBuf::from("."),
            scratch_dir: None,
            timeout: None,
        }
    }
}

impl ToolSettings {
    pub fn validate(&self) -> ViewgridResult<()> {
        if self.timeout.is_some_and(|t| t.is_zero()) {
            return Err(ViewgridError::invalid_arguments(
                "tool timeout must be non-zero when set",
            ));
        }
        Ok(())
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.scratch_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Captured output of a finished tool.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToolOutput {
    pub stdout: String,
    pub stderr: String,
}

impl ToolOutput {
    /// stdout followed by stderr, for diagnostics.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (_, true) => self.stdout.clone(),
            (true, false) => self.stderr.clone(),
            (false, false) => format!("{}\n{}", self.stdout.trim_end(), self.stderr),
        }
    }
}

/// Runs external tools with positional arguments and checks their declared outputs.
///
/// Every subprocess of the system goes through here, so failures always surface as
/// [`ViewgridError::ExternalToolFailed`] with the captured output attached.
#[derive(Clone, Debug, Default)]
pub struct Toolbox {
    settings: ToolSettings,
}

impl Toolbox {
    pub fn new(settings: ToolSettings) -> ViewgridResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &ToolSettings {
        &self.settings
    }

    /// Path of the tool binary for a tool id.
    pub fn resolve(&self, tool: &str) -> PathBuf {
        self.settings.tools_dir.join(tool)
    }

    pub fn is_available(&self, tool: &str) -> bool {
        self.resolve(tool).is_file()
    }

    /// Reserves a unique temporary in the scratch directory.
    pub fn temp(&self, extension: &str) -> ViewgridResult<TempPath> {
        TempPath::reserve(self.settings.scratch_dir(), extension)
    }

    /// Runs the tool `tool` from the tools directory.
    ///
    /// Fails when the tool is missing, exits nonzero, times out, or exits zero without
    /// producing `declared_output`.
    pub fn call_tool<I, S>(
        &self,
        tool: &str,
        args: I,
        declared_output: Option<&Path>,
    ) -> ViewgridResult<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let program = self.resolve(tool);
        if !program.is_file() {
            return Err(ViewgridError::tool_failed(
                tool,
                format!("not found at '{}'", program.display()),
                "",
            ));
        }
        self.run(tool, &program, args, declared_output)
    }

    /// Runs an arbitrary program (looked up on `PATH` when given a bare name).
    pub fn run<I, S>(
        &self,
        label: &str,
        program: &Path,
        args: I,
        declared_output: Option<&Path>,
    ) -> ViewgridResult<ToolOutput>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let args = args
            .into_iter()
            .map(|a| a.as_ref().to_os_string())
            .collect::<Vec<OsString>>();
        tracing::debug!(tool = label, ?args, "running external tool");

        let (status, output) = self.execute(label, program, &args)?;
        let Some(status) = status else {
            return Err(ViewgridError::tool_failed(
                label,
                format!(
                    "timed out after {:?}",
                    self.settings.timeout.unwrap_or_default()
                ),
                output.combined(),
            ));
        };
        if !status.success() {
            return Err(ViewgridError::tool_failed(
                label,
                format!("exited with {status}"),
                output.combined(),
            ));
        }
        if let Some(expected) = declared_output
            && !expected.exists()
        {
            return Err(ViewgridError::tool_failed(
                label,
                format!(
                    "exited successfully but did not produce '{}'",
                    expected.display()
                ),
                output.combined(),
            ));
        }
        Ok(output)
    }

    /// Spawns and waits; a `None` status means the timeout fired and the process was killed.
    fn execute(
        &self,
        label: &str,
        program: &Path,
        args: &[OsString],
    ) -> ViewgridResult<(Option<ExitStatus>, ToolOutput)> {
        let mut child = spawn(program, args).map_err(|e| {
            ViewgridError::tool_failed(
                label,
                format!("failed to spawn '{}': {e}", program.display()),
                "",
            )
        })?;

        // Drain both pipes concurrently so a chatty tool cannot block on a full pipe.
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());

        let status = match self.settings.timeout {
            None => Some(child.wait().map_err(|e| {
                ViewgridError::tool_failed(label, format!("failed to wait: {e}"), "")
            })?),
            Some(limit) => wait_with_deadline(&mut child, limit).map_err(|e| {
                ViewgridError::tool_failed(label, format!("failed to wait: {e}"), "")
            })?,
        };

        let output = ToolOutput {
            stdout: stdout.join().unwrap_or_default(),
            stderr: stderr.join().unwrap_or_default(),
        };
        Ok((status, output))
    }
}

fn spawn(program: &Path, args: &[OsString]) -> std::io::Result<Child> {
    let mut attempts = 0;
    loop {
        let res = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn();
        match res {
            // A freshly written tool can still be open for writing in a concurrently forked
            // process.
            Err(e) if e.kind() == std::io::ErrorKind::ExecutableFileBusy && attempts < 5 => {
                attempts += 1;
                thread::sleep(POLL_INTERVAL * attempts);
            }
            other => return other,
        }
    }
}

fn drain<R>(pipe: Option<R>) -> thread::JoinHandle<String>
where
    R: std::io::Read + Send + 'static,
{
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

fn wait_with_deadline(child: &mut Child, limit: Duration) -> std::io::Result<Option<ExitStatus>> {
    let start = Instant::now();
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if start.elapsed() >= limit {
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

pub fn ensure_parent_dir(path: &Path) -> ViewgridResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        use anyhow::Context as _;
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory '{}'", parent.display()))?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tools/invoke.rs"]
mod tests;
