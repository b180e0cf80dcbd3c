//! JSON-lines file connector.
//!
//! The input loads one JSON object per line at setup and hands the documents
//! out in file order, reporting `SourceDisconnected` once drained. Lines that
//! are not valid JSON objects surface as critical errors with the raw line
//! attached, one per `get_next` call.
//!
//! The output appends stored events to `output_path`, custom documents as
//! `<target> <json>` lines to the custom file, and failed events as
//! [`FailedEvent`] JSON records to the failed file.

use std::collections::VecDeque;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use logsift_types::{Event, FailedEvent, InputError, OutputError, Timestamp};

use super::{Input, Output};

/// Configuration for [`JsonlInput`].
#[derive(Debug, Clone, Deserialize)]
pub struct JsonlInputConfig {
    /// File with one JSON document per line.
    pub documents_path: PathBuf,
}

/// Configuration for [`JsonlOutput`].
#[derive(Debug, Clone, Deserialize)]
pub struct JsonlOutputConfig {
    /// File receiving stored events, one JSON object per line.
    pub output_path: PathBuf,
    /// File receiving custom documents as `<target> <json>` lines.
    /// Defaults to `<output_path>.custom`.
    #[serde(default)]
    pub custom_output_path: Option<PathBuf>,
    /// File receiving failed-event records as JSON lines.
    /// Defaults to `<output_path>.failed`.
    #[serde(default)]
    pub failed_output_path: Option<PathBuf>,
}

enum Document {
    Event(Event),
    /// Line that did not parse into a JSON object; raised as a critical
    /// error when handed out.
    Malformed { message: String, raw: Value },
}

/// Input connector reading JSON lines from a file.
pub struct JsonlInput {
    path: PathBuf,
    documents: Option<VecDeque<Document>>,
}

impl JsonlInput {
    #[must_use]
    pub fn new(config: JsonlInputConfig) -> Self {
        Self {
            path: config.documents_path,
            documents: None,
        }
    }

    fn load(path: &Path) -> Result<VecDeque<Document>, InputError> {
        let file = File::open(path).map_err(|err| {
            InputError::Fatal(format!("cannot open {}: {err}", path.display()))
        })?;
        let mut documents = VecDeque::new();
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|err| {
                InputError::Fatal(format!("cannot read {}: {err}", path.display()))
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let document = match serde_json::from_str::<Value>(&line) {
                Ok(value) => match Event::from_value(value) {
                    Ok(event) => Document::Event(event),
                    Err(raw) => Document::Malformed {
                        message: "event is not a JSON object".into(),
                        raw,
                    },
                },
                Err(err) => Document::Malformed {
                    message: format!("invalid JSON line: {err}"),
                    raw: Value::String(line),
                },
            };
            documents.push_back(document);
        }
        Ok(documents)
    }
}

impl Input for JsonlInput {
    fn describe_endpoint(&self) -> String {
        "jsonl".into()
    }

    fn setup(&mut self) -> Result<(), InputError> {
        if self.documents.is_none() {
            self.documents = Some(Self::load(&self.path)?);
        }
        Ok(())
    }

    fn get_next(&mut self, timeout: Duration) -> Result<Event, InputError> {
        let documents = self
            .documents
            .as_mut()
            .ok_or_else(|| InputError::Fatal("input was not set up".into()))?;
        match documents.pop_front() {
            None => {
                // Block for the poll timeout so a drained file does not
                // busy-spin the worker loop.
                std::thread::sleep(timeout);
                Err(InputError::SourceDisconnected)
            }
            Some(Document::Event(event)) => Ok(event),
            Some(Document::Malformed { message, raw }) => Err(InputError::critical(message, raw)),
        }
    }

    fn shut_down(&mut self) {
        self.documents = None;
    }
}

struct Sinks {
    output: BufWriter<File>,
    custom: BufWriter<File>,
    failed: BufWriter<File>,
}

/// Output connector appending JSON lines to files.
pub struct JsonlOutput {
    output_path: PathBuf,
    custom_path: PathBuf,
    failed_path: PathBuf,
    sinks: Option<Sinks>,
}

impl JsonlOutput {
    #[must_use]
    pub fn new(config: JsonlOutputConfig) -> Self {
        let custom_path = config
            .custom_output_path
            .unwrap_or_else(|| with_suffix(&config.output_path, "custom"));
        let failed_path = config
            .failed_output_path
            .unwrap_or_else(|| with_suffix(&config.output_path, "failed"));
        Self {
            output_path: config.output_path,
            custom_path,
            failed_path,
            sinks: None,
        }
    }

    fn open(path: &Path) -> Result<BufWriter<File>, OutputError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| {
                OutputError::Fatal(format!("cannot open {}: {err}", path.display()))
            })?;
        Ok(BufWriter::new(file))
    }

    fn write_line(
        sink: &mut BufWriter<File>,
        path: &Path,
        line: &str,
    ) -> Result<(), OutputError> {
        writeln!(sink, "{line}")
            .and_then(|()| sink.flush())
            .map_err(|err| OutputError::Fatal(format!("cannot write {}: {err}", path.display())))
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

impl Output for JsonlOutput {
    fn describe_endpoint(&self) -> String {
        "jsonl".into()
    }

    fn setup(&mut self) -> Result<(), OutputError> {
        if self.sinks.is_none() {
            self.sinks = Some(Sinks {
                output: Self::open(&self.output_path)?,
                custom: Self::open(&self.custom_path)?,
                failed: Self::open(&self.failed_path)?,
            });
        }
        Ok(())
    }

    fn store(&mut self, event: Event) -> Result<(), OutputError> {
        let Some(sinks) = self.sinks.as_mut() else {
            return Err(OutputError::Fatal("output was not set up".into()));
        };
        Self::write_line(&mut sinks.output, &self.output_path, &event.to_string())
    }

    fn store_custom(&mut self, event: Event, target: &str) -> Result<(), OutputError> {
        let Some(sinks) = self.sinks.as_mut() else {
            return Err(OutputError::Fatal("output was not set up".into()));
        };
        Self::write_line(&mut sinks.custom, &self.custom_path, &format!("{target} {event}"))
    }

    fn store_failed(
        &mut self,
        error_message: &str,
        original: Value,
        processed: Event,
    ) -> Result<(), OutputError> {
        let record = FailedEvent {
            error_message: error_message.to_string(),
            original,
            processed,
            failed_at: Timestamp::new(chrono::Utc::now().to_rfc3339()),
        };
        let line = serde_json::to_string(&record)
            .map_err(|err| OutputError::Warning(format!("cannot serialize failed event: {err}")))?;
        let Some(sinks) = self.sinks.as_mut() else {
            return Err(OutputError::Fatal("output was not set up".into()));
        };
        Self::write_line(&mut sinks.failed, &self.failed_path, &line)
    }

    fn shut_down(&mut self) {
        if let Some(mut sinks) = self.sinks.take() {
            let _ = sinks.output.flush();
            let _ = sinks.custom.flush();
            let _ = sinks.failed.flush();
        }
    }
}
