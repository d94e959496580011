use std::path::PathBuf;
use std::process::ExitStatus;

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;

use crate::app::TestEvent;

use super::EventSource;
use super::ndjson::pump_lines;

/// A spawned engine. Dropping it kills the engine and, on unix, every
/// process in the group it leads, so a cancelled run leaves no workers behind.
struct EngineProcess {
    child: Child,
    #[cfg(unix)]
    group: Option<libc::pid_t>,
}

impl EngineProcess {
    fn spawn(cmd: &mut Command, program: &str) -> Result<Self> {
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.as_std_mut().process_group(0);
        }

        let child = cmd
            .spawn()
            .with_context(|| format!("failed to spawn engine `{program}`"))?;

        Ok(Self {
            #[cfg(unix)]
            group: child.id().and_then(|id| libc::pid_t::try_from(id).ok()),
            child,
        })
    }

    async fn wait(&mut self) -> Result<ExitStatus> {
        self.child.wait().await.context("failed to wait for engine")
    }
}

impl Drop for EngineProcess {
    fn drop(&mut self) {
        #[cfg(unix)]
        if let Some(group) = self.group.take() {
            // SAFETY: plain signal delivery to a group this process created.
            unsafe {
                libc::kill(-group, libc::SIGKILL);
            }
        }
        let _ = self.child.start_kill();
    }
}

/// Spawns the execution engine and decodes its NDJSON stdout.
/// Stderr lines are forwarded as raw output.
pub struct CommandSource {
    program: String,
    args: Vec<String>,
    workdir: PathBuf,
}

impl CommandSource {
    pub fn new(argv: Vec<String>, workdir: PathBuf) -> Result<Self> {
        let mut argv = argv.into_iter();
        let Some(program) = argv.next() else {
            bail!("engine command is empty");
        };
        Ok(Self {
            program,
            args: argv.collect(),
            workdir,
        })
    }

    /// Build from a single command line, split with shell quoting rules.
    pub fn parse(command_line: &str, workdir: PathBuf) -> Result<Self> {
        let argv = shell_words::split(command_line)
            .with_context(|| format!("failed to parse engine command `{command_line}`"))?;
        Self::new(argv, workdir)
    }
}

#[async_trait]
impl EventSource for CommandSource {
    async fn stream(&self, tx: mpsc::UnboundedSender<TestEvent>) -> Result<()> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.workdir)
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::piped());

        tracing::debug!(command = ?cmd.as_std(), cwd = ?self.workdir, "spawning engine");
        let mut engine = EngineProcess::spawn(&mut cmd, &self.program)?;

        let stdout = engine.child.stdout.take().context("missing stdout")?;
        let stderr = engine.child.stderr.take().context("missing stderr")?;

        let tx_err = tx.clone();
        let stderr_handle = tokio::spawn(async move {
            let reader = BufReader::new(stderr);
            let mut lines = reader.lines();
            while let Ok(Some(line)) = lines.next_line().await {
                tracing::debug!(target: "engine::stderr", "{}", line);
                let _ = tx_err.send(TestEvent::Output { line });
            }
        });

        let forwarded = pump_lines(BufReader::new(stdout), &tx).await?;
        stderr_handle.await.ok();

        let status = engine.wait().await?;
        tracing::debug!(%status, forwarded, "engine exited");
        if !status.success() {
            let _ = tx.send(TestEvent::Error {
                message: format!("engine exited with code {}", status.code().unwrap_or(-1)),
            });
        }

        Ok(())
    }

    fn name(&self) -> &str {
        &self.program
    }
}
