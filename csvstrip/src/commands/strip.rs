//! `strip` command implementation: read, transcode, forward, write.

use anyhow::{bail, Context, Result};
use log::{debug, info, warn};
use serde::Serialize;
use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::sync::Arc;

use csvstrip_core::{
    CliOverrides, FieldSink, ForwardReport, JsonLinesSink, NullSink, PgRecordStore, SinkForwarder, StripConfig,
    TranscodeStats, Transcoded, Transcoder, DEFAULT_QUEUE_CAPACITY,
};

use crate::cli::StripCommand;

/// Everything reported at the end of a run.
#[derive(Debug, Serialize)]
pub struct RunSummary {
    #[serde(flatten)]
    pub stats: TranscodeStats,
    /// Present when a database sink was used.
    pub forwarded: Option<ForwardReport>,
}

impl RunSummary {
    /// Failures anywhere between the scan and the store.
    pub fn sink_failures(&self) -> u64 {
        self.stats.sink_failures + self.forwarded.as_ref().map_or(0, |r| r.failed)
    }
}

/// The main operation runner for `csvstrip strip`.
pub async fn run_strip(cmd: StripCommand, quiet: bool) -> Result<()> {
    info!("Starting strip operation.");
    let config = resolve_config(&cmd)?;

    let input = fs::read(&cmd.input).with_context(|| format!("Failed to read input file: {}", cmd.input.display()))?;
    debug!("Read in {} bytes from {}", input.len(), cmd.input.display());

    if let Some(field) = config.transcode.ignore_field {
        info!("Diverting field {} of every record", field);
    } else if config.dsn.is_some() || cmd.redacted_out.is_some() {
        warn!("A sink is configured but no field is ignored; the sink will not be called.");
    }

    let transcoder = Transcoder::new(config.transcode.clone());
    let (output, summary) = match (&config.dsn, &cmd.redacted_out) {
        (Some(_), Some(_)) => bail!("A database sink and --redacted-out cannot be used together"),
        (Some(dsn), None) => {
            let store = PgRecordStore::connect(dsn, Some(config.update_statement()))
                .await
                .context("Failed to set up the database sink")?;
            transcode_to_store(transcoder, input, store).await?
        }
        (None, Some(path)) => transcode_to_jsonl(transcoder, input, path).await?,
        (None, None) => {
            let transcoded = tokio::task::spawn_blocking(move || transcoder.transcode(&input, &mut NullSink))
                .await
                .context("Transcoding task failed")?;
            finish(transcoded, None)
        }
    };

    fs::write(&cmd.output, &output).with_context(|| format!("Failed to write output file: {}", cmd.output.display()))?;
    info!("Wrote {} bytes to {}", output.len(), cmd.output.display());

    if let Some(path) = &cmd.stats_json {
        write_stats_json(path, &summary)?;
    }
    if !quiet {
        print_summary(&summary, &mut io::stderr())?;
    }

    let failures = summary.sink_failures();
    if failures > 0 {
        warn!("{} sink updates failed", failures);
        if cmd.fail_on_sink_errors {
            bail!("{} sink updates failed", failures);
        }
    }

    info!("Strip operation completed.");
    Ok(())
}

fn resolve_config(cmd: &StripCommand) -> Result<StripConfig> {
    let base = match &cmd.config {
        Some(path) => StripConfig::load_from_file(path)?,
        None => StripConfig::default(),
    };
    let ignore_field = cmd
        .ignore
        .map(usize::try_from)
        .transpose()
        .context("Ignored field index is too large")?;
    let config = base.merge_cli(CliOverrides {
        ignore_field,
        dsn: cmd.dsn.clone(),
        update_statement: cmd.update_statement.clone(),
        sink_trigger: cmd.sink_trigger.map(Into::into),
        line_key_offset: cmd.line_key_offset,
        append_line_number: cmd.append_line_number,
    });
    config.validate()?;
    Ok(config)
}

async fn transcode_to_store(
    transcoder: Transcoder,
    input: Vec<u8>,
    store: PgRecordStore,
) -> Result<(Vec<u8>, RunSummary)> {
    let (sink, rx) = SinkForwarder::channel(DEFAULT_QUEUE_CAPACITY);
    let forwarder = SinkForwarder::new(Arc::new(store)).spawn(rx);

    let transcoded = tokio::task::spawn_blocking(move || {
        let mut sink = sink;
        transcoder.transcode(&input, &mut sink)
    })
    .await
    .context("Transcoding task failed")?;

    let report = forwarder.await.context("Sink forwarder task failed")?;
    Ok(finish(transcoded, Some(report)))
}

async fn transcode_to_jsonl(transcoder: Transcoder, input: Vec<u8>, path: &Path) -> Result<(Vec<u8>, RunSummary)> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create redacted output file: {}", path.display()))?;
    let transcoded = tokio::task::spawn_blocking(move || -> Result<Transcoded> {
        let mut sink = JsonLinesSink::new(BufWriter::new(file));
        let transcoded = transcoder.transcode(&input, &mut sink as &mut dyn FieldSink);
        sink.finish()?;
        Ok(transcoded)
    })
    .await
    .context("Transcoding task failed")??;
    info!("Wrote redacted fields to {}", path.display());
    Ok(finish(transcoded, None))
}

fn finish(transcoded: Transcoded, forwarded: Option<ForwardReport>) -> (Vec<u8>, RunSummary) {
    let summary = RunSummary {
        stats: transcoded.stats,
        forwarded,
    };
    (transcoded.output, summary)
}

fn write_stats_json(path: &Path, summary: &RunSummary) -> Result<()> {
    let file = fs::File::create(path).with_context(|| format!("Failed to create stats file: {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, summary).context("Failed to serialize run statistics")?;
    writer.flush()?;
    Ok(())
}

/// Writes a human-readable summary of the run.
pub fn print_summary<W: Write>(summary: &RunSummary, writer: &mut W) -> Result<()> {
    let stats = &summary.stats;
    writeln!(writer, "--- Strip Summary ---")?;
    writeln!(writer, "bytes read: {}", stats.bytes_read)?;
    writeln!(writer, "bytes written: {}", stats.bytes_written)?;
    writeln!(writer, "escapes added: {}", stats.escapes_added)?;
    writeln!(writer, "records: {}", stats.records)?;
    if stats.sink_calls > 0 {
        writeln!(writer, "redacted bytes: {}", stats.redacted_bytes)?;
        writeln!(writer, "fields forwarded: {}", stats.sink_calls)?;
        writeln!(writer, "sink failures: {}", summary.sink_failures())?;
    }
    if let Some(report) = &summary.forwarded {
        writeln!(writer, "rows updated: {}", report.rows_affected)?;
    }
    Ok(())
}
