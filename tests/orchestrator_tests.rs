use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;
use vidtask::adapters::{DocumentFormat, ScriptedEngine, TaskFileAdapter};
use vidtask::domain::errors::{ExecutionError, ProbeError};
use vidtask::domain::model::*;
use vidtask::ports::EngineOutput;
use vidtask::{AppContainer, Settings, TaskOrchestrator};

/// Shared wiring around a scripted engine
mod test_utils {
    use super::*;

    pub fn settings(workers: usize, fail_fast: bool) -> Settings {
        Settings {
            workers,
            fail_fast,
            ..Settings::default()
        }
    }

    pub fn orchestrator(
        engine: &Arc<ScriptedEngine>,
        workers: usize,
        fail_fast: bool,
    ) -> TaskOrchestrator {
        AppContainer::with_engine(engine.clone(), &settings(workers, fail_fast))
            .orchestrator()
            .expect("valid pool size")
    }

    pub fn download(dir: &Path, name: &str) -> Task {
        Task::Download(DownloadParams {
            url: format!("https://media.example.com/{}.m3u8", name),
            output: dir.join(format!("{}.mp4", name)),
        })
    }

    pub fn group(kind: TaskKind, parallel: bool, tasks: Vec<Task>) -> BatchGroup {
        BatchGroup::new(1, kind, PathBuf::new(), parallel, tasks).expect("homogeneous group")
    }

    pub fn failing_exit() -> Result<EngineOutput, ExecutionError> {
        Ok(EngineOutput::exited(1, "Server returned 404 Not Found".to_string()))
    }
}

use test_utils::*;

#[tokio::test]
async fn test_parallel_group_keeps_declaration_order() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    let tasks: Vec<Task> = (0..4).map(|i| download(dir.path(), &format!("d{}", i))).collect();

    // The first task finishes last
    engine.delay_run(dir.path().join("d0.mp4"), Duration::from_millis(150));
    engine.delay_run(dir.path().join("d1.mp4"), Duration::from_millis(50));

    let result = orchestrator(&engine, 4, false)
        .run_group(&group(TaskKind::Download, true, tasks))
        .await
        .unwrap();

    assert!(result.overall_success);
    assert_eq!(result.state, RunState::Completed);
    let slots: Vec<PathBuf> = result
        .per_task
        .iter()
        .map(|r| r.output_files[0].clone())
        .collect();
    let expected: Vec<PathBuf> = (0..4).map(|i| dir.path().join(format!("d{}.mp4", i))).collect();
    assert_eq!(slots, expected);

    let completions = engine.completions();
    assert_eq!(completions.last(), Some(&dir.path().join("d0.mp4")));
}

#[tokio::test]
async fn test_parallel_group_respects_worker_limit() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    let mut tasks = Vec::new();
    for i in 0..6 {
        engine.delay_run(dir.path().join(format!("d{}.mp4", i)), Duration::from_millis(40));
        tasks.push(download(dir.path(), &format!("d{}", i)));
    }

    let result = orchestrator(&engine, 2, false)
        .run_group(&group(TaskKind::Download, true, tasks))
        .await
        .unwrap();

    assert_eq!(result.per_task.len(), 6);
    assert!(result.overall_success);
    assert!(engine.peak_concurrency() <= 2, "peak {}", engine.peak_concurrency());
    assert!(engine.peak_concurrency() >= 1);
}

#[tokio::test]
async fn test_sequential_group_runs_one_at_a_time() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    let tasks: Vec<Task> = (0..3).map(|i| download(dir.path(), &format!("s{}", i))).collect();

    let result = orchestrator(&engine, 4, false)
        .run_group(&group(TaskKind::Download, false, tasks))
        .await
        .unwrap();

    assert!(result.overall_success);
    assert_eq!(engine.peak_concurrency(), 1);
    let completions = engine.completions();
    let expected: Vec<PathBuf> = (0..3).map(|i| dir.path().join(format!("s{}.mp4", i))).collect();
    assert_eq!(completions, expected);
}

#[tokio::test]
async fn test_best_effort_runs_every_task_after_a_failure() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    engine.script_run(dir.path().join("b1.mp4"), failing_exit());
    let tasks: Vec<Task> = (0..3).map(|i| download(dir.path(), &format!("b{}", i))).collect();

    let result = orchestrator(&engine, 1, false)
        .run_group(&group(TaskKind::Download, false, tasks))
        .await
        .unwrap();

    assert!(!result.overall_success);
    assert_eq!(result.state, RunState::Completed);
    assert_eq!(result.failed_count(), 1);
    assert!(result.per_task[0].success);
    assert!(!result.per_task[1].success);
    assert!(result.per_task[1]
        .exit_diagnostics
        .as_deref()
        .unwrap_or_default()
        .contains("404"));
    assert!(result.per_task[2].success);
    assert_eq!(engine.invocations().len(), 3);
}

#[tokio::test]
async fn test_fail_fast_skips_remaining_tasks() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    engine.script_run(dir.path().join("f0.mp4"), failing_exit());
    let tasks: Vec<Task> = (0..3).map(|i| download(dir.path(), &format!("f{}", i))).collect();

    let orchestrator = orchestrator(&engine, 1, true);
    let result = orchestrator
        .run_group(&group(TaskKind::Download, false, tasks))
        .await
        .unwrap();

    assert!(!result.overall_success);
    assert_eq!(result.state, RunState::Aborted);
    assert_eq!(orchestrator.state(), RunState::Aborted);
    assert_eq!(result.per_task.len(), 3);
    for skipped in &result.per_task[1..] {
        assert!(!skipped.success);
        assert!(skipped
            .error_message
            .as_deref()
            .unwrap_or_default()
            .starts_with("Skipped"));
    }
    assert_eq!(engine.invocations().len(), 1);
}

#[tokio::test]
async fn test_fail_fast_in_parallel_group_fills_every_slot() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    engine.script_run(dir.path().join("p0.mp4"), failing_exit());
    for i in 1..5 {
        engine.delay_run(dir.path().join(format!("p{}.mp4", i)), Duration::from_millis(20));
    }
    let tasks: Vec<Task> = (0..5).map(|i| download(dir.path(), &format!("p{}", i))).collect();

    let result = orchestrator(&engine, 1, true)
        .run_group(&group(TaskKind::Download, true, tasks))
        .await
        .unwrap();

    assert_eq!(result.per_task.len(), 5);
    assert_eq!(result.state, RunState::Aborted);
    assert!(!result.per_task[0].success);
    assert!(engine.invocations().len() < 5);
}

#[tokio::test]
async fn test_probe_and_plan_errors_become_failed_slots() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());

    let unreadable = dir.path().join("broken.mp4");
    std::fs::write(&unreadable, b"junk").unwrap();
    engine.script_probe(
        &unreadable,
        Err(ProbeError::UnreadableMedia("moov atom not found".to_string())),
    );

    let valid = dir.path().join("talk.mp4");
    std::fs::write(&valid, b"video").unwrap();
    engine.script_probe(&valid, Ok(MediaInfo::new(60.0, 7_500_000, Some(1_000_000.0))));

    let tasks = vec![
        Task::Split(SplitParams {
            source: unreadable,
            output_base: dir.path().join("broken"),
            output_extension: "mp4".to_string(),
            max_size_bytes: 1_000_000,
        }),
        Task::Clip(ClipParams {
            source: valid.clone(),
            output_base: dir.path().join("bad"),
            output_extension: "mp4".to_string(),
            intervals: vec![(30.0, 10.0)],
            codecs: CodecChoice::default(),
        }),
        Task::Clip(ClipParams {
            source: valid,
            output_base: dir.path().join("good"),
            output_extension: "mp4".to_string(),
            intervals: vec![(0.0, 5.0), (50.0, 90.0)],
            codecs: CodecChoice::default(),
        }),
    ];
    let ordered: Vec<OrderedTask> = tasks
        .into_iter()
        .enumerate()
        .map(|(i, task)| OrderedTask {
            order: i as i64,
            task,
        })
        .collect();

    let result = orchestrator(&engine, 2, false).run_ordered(&ordered).await.unwrap();

    assert_eq!(result.per_task.len(), 3);
    assert!(result.per_task[0]
        .error_message
        .as_deref()
        .unwrap_or_default()
        .contains("moov atom"));
    assert!(!result.per_task[1].success);
    assert!(result.per_task[2].success);
    assert_eq!(
        result.per_task[2].output_files,
        vec![dir.path().join("good_001.mp4"), dir.path().join("good_002.mp4")]
    );
    // Only the valid clip task reached the engine
    assert_eq!(engine.invocations().len(), 2);
}

#[tokio::test]
async fn test_ordered_tasks_run_by_order_then_declaration() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    let ordered = vec![
        OrderedTask { order: 2, task: download(dir.path(), "late") },
        OrderedTask { order: 1, task: download(dir.path(), "first") },
        OrderedTask { order: 2, task: download(dir.path(), "later") },
        OrderedTask { order: -5, task: download(dir.path(), "earliest") },
    ];

    let result = orchestrator(&engine, 3, false).run_ordered(&ordered).await.unwrap();

    let outputs: Vec<PathBuf> = result.output_files().cloned().collect();
    let expected: Vec<PathBuf> = ["earliest", "first", "late", "later"]
        .iter()
        .map(|n| dir.path().join(format!("{}.mp4", n)))
        .collect();
    assert_eq!(outputs, expected);
    assert_eq!(engine.completions(), expected);
}

#[tokio::test]
async fn test_document_runs_ordered_tasks_before_groups() {
    let dir = TempDir::new().unwrap();
    let json = r#"{
        "tasks": [
            { "order": 2, "type": "download",
              "parameters": { "url": "https://cdn.example.com/b.m3u8", "output_filename": "b.mp4" } },
            { "order": 1, "type": "download",
              "parameters": { "url": "https://cdn.example.com/a.m3u8", "output_filename": "a.mp4" } }
        ],
        "batch_tasks": [
            { "type": "download", "path": "batch", "is_parallel": true,
              "tasks": [
                { "parameters": { "url": "https://cdn.example.com/c.m3u8", "output_filename": "c.mp4" } },
                { "parameters": { "url": "https://cdn.example.com/d.m3u8", "output_filename": "d.mp4" } }
              ] }
        ]
    }"#;
    let document = TaskFileAdapter::parse(json, DocumentFormat::Json, dir.path()).unwrap();
    let engine = Arc::new(ScriptedEngine::new());
    engine.delay_run(dir.path().join("batch").join("c.mp4"), Duration::from_millis(60));

    let result = orchestrator(&engine, 2, false).run_document(&document).await.unwrap();

    assert!(result.overall_success);
    let outputs: Vec<PathBuf> = result.output_files().cloned().collect();
    assert_eq!(
        outputs,
        vec![
            dir.path().join("a.mp4"),
            dir.path().join("b.mp4"),
            dir.path().join("batch").join("c.mp4"),
            dir.path().join("batch").join("d.mp4"),
        ]
    );
    assert!(result.finished_at >= result.started_at);
}

#[tokio::test]
async fn test_missing_source_fails_only_its_slot() {
    let dir = TempDir::new().unwrap();
    let engine = Arc::new(ScriptedEngine::new().with_default_media(MediaInfo::new(
        10.0,
        1_250_000,
        None,
    )));
    let tasks = vec![
        Task::Split(SplitParams {
            source: dir.path().join("missing.mp4"),
            output_base: dir.path().join("m"),
            output_extension: "mp4".to_string(),
            max_size_bytes: 500_000,
        }),
        download(dir.path(), "ok"),
    ];
    let ordered: Vec<OrderedTask> = tasks
        .into_iter()
        .map(|task| OrderedTask { order: 0, task })
        .collect();

    let result = orchestrator(&engine, 1, false).run_ordered(&ordered).await.unwrap();

    assert!(!result.per_task[0].success);
    assert!(result.per_task[1].success);
    assert_eq!(result.state, RunState::Completed);
}
