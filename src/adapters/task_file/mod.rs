// Task file adapter - Maps JSON/YAML/TOML task documents onto typed tasks
//
// Everything loosely typed stops here: sizes and timecodes are parsed,
// global defaults are merged, paths are resolved and each record becomes a
// closed `Task` variant. Any problem is a `ConfigError` before a task runs.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::domain::errors::ConfigError;
use crate::domain::model::{
    BatchGroup, ClipParams, CodecChoice, DownloadParams, OrderedTask, SplitParams, Task,
    TaskDocument, TaskKind,
};
use crate::utils::path::PathUtils;
use crate::utils::size::SizeParser;
use crate::utils::time::TimeParser;

/// Serialization format of a task document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
    Toml,
}

impl DocumentFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match PathUtils::get_extension(path).as_deref() {
            Some("json") => Ok(DocumentFormat::Json),
            Some("yaml") | Some("yml") => Ok(DocumentFormat::Yaml),
            Some("toml") => Ok(DocumentFormat::Toml),
            other => Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            )),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RawDocument {
    #[serde(default)]
    global_settings: GlobalSettings,
    #[serde(default)]
    tasks: Vec<RawOrderedTask>,
    #[serde(default)]
    batch_tasks: Vec<RawGroup>,
}

/// Defaults merged under every task's parameters
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct GlobalSettings {
    output_extension: Option<String>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOrderedTask {
    order: Option<i64>,
    #[serde(rename = "type")]
    kind: TaskKind,
    #[serde(default)]
    parameters: RawParams,
}

#[derive(Debug, Deserialize)]
struct RawGroup {
    #[serde(rename = "type")]
    kind: TaskKind,
    #[serde(default)]
    path: PathBuf,
    #[serde(default)]
    is_parallel: bool,
    #[serde(default)]
    tasks: Vec<RawGroupTask>,
}

#[derive(Debug, Deserialize)]
struct RawGroupTask {
    /// Defaults to the group kind
    #[serde(rename = "type")]
    kind: Option<TaskKind>,
    #[serde(default)]
    parameters: RawParams,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawParams {
    url: Option<String>,
    output_filename: Option<String>,
    source_file: Option<String>,
    output_name: Option<String>,
    output_extension: Option<String>,
    max_size: Option<SizeValue>,
    intervals: Option<Vec<RawInterval>>,
    video_codec: Option<String>,
    audio_codec: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum SizeValue {
    Bytes(u64),
    Text(String),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Seconds(f64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawInterval {
    start: TimeValue,
    end: TimeValue,
}

/// Loads task documents from disk
pub struct TaskFileAdapter;

impl TaskFileAdapter {
    /// Read, parse and validate a task document.
    /// Relative paths resolve against the document's directory.
    pub fn load(path: &Path) -> Result<TaskDocument, ConfigError> {
        let format = DocumentFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Parse(format!("cannot read {}: {}", path.display(), e)))?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let document = Self::parse(&content, format, base_dir)?;
        info!(
            path = %path.display(),
            ordered = document.ordered.len(),
            groups = document.groups.len(),
            "Loaded task document"
        );
        Ok(document)
    }

    /// Parse document text in the given format
    pub fn parse(
        content: &str,
        format: DocumentFormat,
        base_dir: &Path,
    ) -> Result<TaskDocument, ConfigError> {
        let raw: RawDocument = match format {
            DocumentFormat::Json => {
                serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            DocumentFormat::Yaml => {
                serde_yaml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            DocumentFormat::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
        };

        if raw.tasks.is_empty() && raw.batch_tasks.is_empty() {
            return Err(ConfigError::InvalidTask {
                task: "document".to_string(),
                message: "declares no tasks".to_string(),
            });
        }

        let globals = raw.global_settings;
        let mut document = TaskDocument::default();

        for (index, raw_task) in raw.tasks.into_iter().enumerate() {
            let label = format!("#{}", index + 1);
            let task = build_task(&label, raw_task.kind, raw_task.parameters, &globals, base_dir)?;
            document.ordered.push(OrderedTask {
                // An unnumbered task keeps its declaration position
                order: raw_task.order.unwrap_or(index as i64 + 1),
                task,
            });
        }

        for (group_index, raw_group) in raw.batch_tasks.into_iter().enumerate() {
            let position = group_index + 1;
            let group_dir = PathUtils::resolve(base_dir, &raw_group.path);
            let mut tasks = Vec::with_capacity(raw_group.tasks.len());

            for (index, raw_task) in raw_group.tasks.into_iter().enumerate() {
                let label = format!("group {} #{}", position, index + 1);
                let kind = raw_task.kind.unwrap_or(raw_group.kind);
                tasks.push(build_task(&label, kind, raw_task.parameters, &globals, &group_dir)?);
            }

            let group = BatchGroup::new(
                position,
                raw_group.kind,
                group_dir,
                raw_group.is_parallel,
                tasks,
            )?;
            debug!(
                group = position,
                kind = %group.kind(),
                parallel = group.is_parallel(),
                tasks = group.len(),
                "Batch group declared"
            );
            document.groups.push(group);
        }

        Ok(document)
    }
}

fn build_task(
    label: &str,
    kind: TaskKind,
    params: RawParams,
    globals: &GlobalSettings,
    base_dir: &Path,
) -> Result<Task, ConfigError> {
    let invalid = |message: String| ConfigError::InvalidTask {
        task: label.to_string(),
        message,
    };
    let required = |field: &str, value: Option<String>| -> Result<String, ConfigError> {
        value
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| invalid(format!("missing or empty field '{}'", field)))
    };

    match kind {
        TaskKind::Download => {
            let url = required("url", params.url)?;
            if !is_supported_url(&url) {
                return Err(invalid(format!("invalid URL '{}': expected http or https", url)));
            }
            let output = required("output_filename", params.output_filename)?;
            Ok(Task::Download(DownloadParams {
                url,
                output: PathUtils::resolve(base_dir, Path::new(&output)),
            }))
        }
        TaskKind::Split => {
            let source = required("source_file", params.source_file)?;
            let name = required("output_name", params.output_name)?;
            let extension = required(
                "output_extension",
                params.output_extension.or_else(|| globals.output_extension.clone()),
            )?;
            let max_size_bytes = match params.max_size {
                Some(SizeValue::Bytes(bytes)) => bytes,
                Some(SizeValue::Text(text)) => {
                    SizeParser::parse_size(&text).map_err(|e| invalid(e.to_string()))?
                }
                None => return Err(invalid("missing field 'max_size'".to_string())),
            };
            if max_size_bytes == 0 {
                return Err(invalid("'max_size' must be greater than zero".to_string()));
            }

            Ok(Task::Split(SplitParams {
                source: PathUtils::resolve(base_dir, Path::new(&source)),
                output_base: PathUtils::resolve(base_dir, Path::new(&name)),
                output_extension: normalize_extension(&extension),
                max_size_bytes,
            }))
        }
        TaskKind::Clip => {
            let source = required("source_file", params.source_file)?;
            let name = required("output_name", params.output_name)?;
            let extension = required(
                "output_extension",
                params.output_extension.or_else(|| globals.output_extension.clone()),
            )?;

            let raw_intervals = params.intervals.unwrap_or_default();
            if raw_intervals.is_empty() {
                return Err(invalid("'intervals' must list at least one interval".to_string()));
            }
            let mut intervals = Vec::with_capacity(raw_intervals.len());
            for (position, interval) in raw_intervals.iter().enumerate() {
                let start = time_value(&interval.start)
                    .map_err(|e| invalid(format!("interval {}: {}", position + 1, e)))?;
                let end = time_value(&interval.end)
                    .map_err(|e| invalid(format!("interval {}: {}", position + 1, e)))?;
                intervals.push((start, end));
            }

            let video = params.video_codec.or_else(|| globals.video_codec.clone());
            let audio = params.audio_codec.or_else(|| globals.audio_codec.clone());

            Ok(Task::Clip(ClipParams {
                source: PathUtils::resolve(base_dir, Path::new(&source)),
                output_base: PathUtils::resolve(base_dir, Path::new(&name)),
                output_extension: normalize_extension(&extension),
                intervals,
                codecs: CodecChoice::from_names(video.as_deref(), audio.as_deref()),
            }))
        }
    }
}

fn time_value(value: &TimeValue) -> Result<f64, String> {
    match value {
        TimeValue::Seconds(seconds) => Ok(*seconds),
        TimeValue::Text(text) => TimeParser::parse_time(text).map_err(|e| e.to_string()),
    }
}

fn normalize_extension(extension: &str) -> String {
    extension.trim().trim_start_matches('.').to_string()
}

/// http(s) scheme followed by a non-empty host
pub(crate) fn is_supported_url(url: &str) -> bool {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) => rest
            .split(['/', '?', '#'])
            .next()
            .is_some_and(|host| !host.is_empty()),
        None => false,
    }
}
