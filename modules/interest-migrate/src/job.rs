// Job driver: newline-delimited source records in, normalized records out.

use std::fmt;

use anyhow::{Context, Result};
use interest_transform::encode::encode;
use interest_transform::{DocumentTransformer, EncodeOptions, QuarantineSink, SourceRecord};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};

use crate::config::MigrateConfig;
use crate::sink::DirQuarantineSink;

/// Counters for one migration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobStats {
    pub records_read: u64,
    pub unreadable: u64,
    pub outputs: u64,
    pub empty_records: u64,
}

impl fmt::Display for JobStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} records read, {} unreadable, {} outputs written, {} records produced nothing",
            self.records_read, self.unreadable, self.outputs, self.empty_records
        )
    }
}

type Input = Box<dyn AsyncBufRead + Unpin + Send>;
type Output = Box<dyn AsyncWrite + Unpin + Send>;

/// Run the job described by `config`.
pub async fn run(config: &MigrateConfig) -> Result<JobStats> {
    let (sink, writer) = DirQuarantineSink::open(&config.quarantine_dir).await?;
    let transformer = DocumentTransformer::new(config.transform_config(), sink);

    let input = open_input(&config.input).await?;
    let mut output = open_output(&config.output).await?;
    let stats = migrate(input, &mut output, &transformer, &config.encode_options()).await?;
    output.flush().await.context("flushing output")?;

    // Dropping the transformer closes the quarantine channel.
    drop(transformer);
    let quarantined = writer.finish().await?;
    tracing::info!(
        written = quarantined.written,
        failed = quarantined.failed,
        "Quarantine writer drained"
    );

    Ok(stats)
}

/// Transform every line of `input`, writing one encoded record per line.
pub async fn migrate<R, W, S>(
    input: R,
    output: &mut W,
    transformer: &DocumentTransformer<S>,
    options: &EncodeOptions,
) -> Result<JobStats>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
    S: QuarantineSink,
{
    let mut stats = JobStats::default();
    let mut lines = input.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await.context("reading input")? {
        line_no += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        stats.records_read += 1;

        let record: SourceRecord = match serde_json::from_str(line) {
            Ok(record) => record,
            Err(e) => {
                stats.unreadable += 1;
                tracing::warn!(line = line_no, error = %e, "Skipping unreadable record");
                continue;
            }
        };

        let records = transformer.transform(&record);
        if records.is_empty() {
            stats.empty_records += 1;
            continue;
        }

        for normalized in &records {
            let mut bytes = encode(normalized, options)?;
            bytes.push(b'\n');
            output.write_all(&bytes).await.context("writing output")?;
            stats.outputs += 1;
        }
    }

    Ok(stats)
}

async fn open_input(path: &str) -> Result<Input> {
    if path == "-" {
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("opening input {path}"))?;
    Ok(Box::new(BufReader::new(file)))
}

async fn open_output(path: &str) -> Result<Output> {
    if path == "-" {
        return Ok(Box::new(BufWriter::new(tokio::io::stdout())));
    }
    let file = tokio::fs::File::create(path)
        .await
        .with_context(|| format!("creating output {path}"))?;
    Ok(Box::new(BufWriter::new(file)))
}
