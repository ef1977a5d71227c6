//! Plugins backed by an external command

use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::time::timeout;

use super::manifest::PluginManifest;
use crate::plugins::Plugin;

/// Bytes of stderr kept for the failure log
const STDERR_LIMIT: u64 = 2048;

/// Runs the manifest's command when a message starts with its trigger.
/// Trimmed stdout is the reply; empty output or a failed exit means no reply.
pub struct ExecPlugin {
    manifest: PluginManifest,
}

impl ExecPlugin {
    pub fn new(manifest: PluginManifest) -> Self {
        Self { manifest }
    }

    fn substitute_args(&self, text: &str, query: &str) -> Vec<String> {
        self.manifest
            .exec
            .args
            .iter()
            .map(|arg| arg.replace("${text}", text).replace("${query}", query))
            .collect()
    }

    async fn run(&self, text: &str, query: &str) -> Option<String> {
        let exec = &self.manifest.exec;
        let args = self.substitute_args(text, query);

        tracing::info!(
            "Executing plugin '{}': {} {:?} (timeout: {}s)",
            self.manifest.name, exec.command, args, exec.timeout_seconds
        );

        let mut cmd = Command::new(&exec.command);
        cmd.args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = exec.working_directory {
            cmd.current_dir(dir);
        }
        for (key, value) in &exec.env {
            cmd.env(key, value);
        }

        // Only one byte past the limit is read; closing the pipe then stops a chatty command
        let limit = exec.max_output_bytes;
        let capture = async {
            let mut child = cmd.spawn()?;
            let (stdout, stderr) = tokio::join!(
                read_limited(child.stdout.take(), limit as u64 + 1),
                read_limited(child.stderr.take(), STDERR_LIMIT),
            );
            let status = child.wait().await?;
            Ok::<_, std::io::Error>((status, stdout?, stderr?))
        };

        match timeout(Duration::from_secs(exec.timeout_seconds), capture).await {
            Ok(Ok((status, stdout, stderr))) => {
                let overflowed = stdout.len() > limit;
                if !status.success() && !overflowed {
                    tracing::warn!(
                        "Plugin '{}' exited with {:?}: {}",
                        self.manifest.name,
                        status.code(),
                        String::from_utf8_lossy(&stderr).trim()
                    );
                    return None;
                }
                let stdout = String::from_utf8_lossy(&stdout);
                let reply = truncate(stdout.trim(), limit);
                (!reply.is_empty()).then_some(reply)
            }
            Ok(Err(e)) => {
                tracing::warn!("Plugin '{}' failed to run: {}", self.manifest.name, e);
                None
            }
            Err(_) => {
                tracing::warn!("Plugin '{}' timed out after {}s", self.manifest.name, exec.timeout_seconds);
                Some(format!("⚠️ {} が {} 秒以内に応答しませんでした。", self.manifest.name, exec.timeout_seconds))
            }
        }
    }
}

async fn read_limited<R: AsyncRead + Unpin>(pipe: Option<R>, limit: u64) -> std::io::Result<Vec<u8>> {
    let mut buf = Vec::new();
    if let Some(pipe) = pipe {
        pipe.take(limit).read_to_end(&mut buf).await?;
    }
    Ok(buf)
}

/// Cut at a char boundary no later than `max_bytes`
fn truncate(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…", &text[..end])
}

#[async_trait]
impl Plugin for ExecPlugin {
    fn name(&self) -> &str {
        &self.manifest.name
    }

    fn description(&self) -> &str {
        self.manifest.description.as_deref().unwrap_or("External command plugin")
    }

    fn usage(&self) -> Option<&str> {
        self.manifest.usage.as_deref()
    }

    async fn on_message(&self, text: &str) -> Option<String> {
        let query = text.strip_prefix(&self.manifest.trigger)?.trim();
        self.run(text, query).await
    }

    fn metadata(&self) -> HashMap<String, String> {
        let mut meta = HashMap::new();
        meta.insert("version".to_string(), self.manifest.version.clone());
        meta.insert("trigger".to_string(), self.manifest.trigger.clone());
        meta.insert("command".to_string(), self.manifest.exec.command.clone());
        meta
    }
}
