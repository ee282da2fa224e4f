use crate::protocol::{InboundEvent, OutboundCommand, decode_event, encode_command};
use anyhow::{Context, Result, bail};
use std::path::Path;
use std::process::Stdio;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub(crate) async fn run_bridge(
    argv: Vec<String>,
    repo_dir: &Path,
    command_rx: UnboundedReceiver<OutboundCommand>,
    event_tx: UnboundedSender<InboundEvent>,
) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        bail!("backend command is empty");
    };

    let mut child = Command::new(program)
        .args(args)
        .current_dir(repo_dir)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("failed to spawn backend {program:?}"))?;
    tracing::info!(program = %program, "backend process started");

    let stdin = child.stdin.take().context("backend stdin unavailable")?;
    let stdout = child.stdout.take().context("backend stdout unavailable")?;
    let stderr = child.stderr.take().context("backend stderr unavailable")?;

    let writer = tokio::spawn(async move {
        let mut stdin = stdin;
        write_commands(&mut stdin, command_rx).await
    });
    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            tracing::debug!(target: "backend", "{line}");
        }
    });

    let dropped = forward_events(BufReader::new(stdout), &event_tx).await?;
    if dropped > 0 {
        tracing::warn!(dropped, "backend sent malformed lines");
    }

    writer.abort();
    stderr_task.abort();
    let status = child.wait().await.context("failed to wait for backend")?;
    tracing::info!(%status, "backend process exited");
    Ok(())
}

/// Returns the number of malformed lines that were dropped.
pub(crate) async fn forward_events<R>(
    reader: R,
    event_tx: &UnboundedSender<InboundEvent>,
) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut dropped = 0;

    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read from backend")?
    {
        if line.trim().is_empty() {
            continue;
        }
        match decode_event(&line) {
            Ok(event) => {
                if event_tx.send(event).is_err() {
                    break;
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, %line, "dropping malformed backend line");
                dropped += 1;
            }
        }
    }

    Ok(dropped)
}

pub(crate) async fn write_commands<W>(
    writer: &mut W,
    mut command_rx: UnboundedReceiver<OutboundCommand>,
) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    while let Some(command) = command_rx.recv().await {
        let mut line = match encode_command(&command) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(command = command.tag(), error = %err, "refusing to send invalid command");
                continue;
            }
        };
        line.push('\n');
        writer
            .write_all(line.as_bytes())
            .await
            .context("failed to write to backend")?;
        writer.flush().await.context("failed to flush backend")?;
    }
    Ok(())
}
