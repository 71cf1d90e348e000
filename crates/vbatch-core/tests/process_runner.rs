//! Real processes through the runner (unix only, uses `sh`).
#![cfg(unix)]

use std::ffi::OsString;
use std::sync::Arc;

use tempfile::tempdir;
use vbatch_core::control::RunControl;
use vbatch_core::runner::{run_batch, BatchError, Job, PostAction, ProcessExecutor, RunOutcome, ScratchFile};

fn sh(label: &str, script: &str, extra: &[OsString]) -> Job {
    let mut args = vec![OsString::from("-c"), OsString::from(script)];
    args.extend(extra.iter().cloned());
    Job::new(label, "sh", args)
}

#[tokio::test]
async fn staged_output_is_promoted_only_on_success() {
    let dir = tempdir().unwrap();
    let good_stage = dir.path().join("good.part.mp4");
    let bad_stage = dir.path().join("bad.part.mp4");
    let jobs = vec![
        sh("good", "printf data > \"$0\"", &[good_stage.clone().into()]).with_post_action(
            PostAction::Promote {
                staging: good_stage.clone(),
                target: dir.path().join("good.mp4"),
            },
        ),
        sh("bad", "printf half > \"$0\"; echo broken >&2; exit 1", &[bad_stage.clone().into()])
            .with_post_action(PostAction::Promote {
                staging: bad_stage.clone(),
                target: dir.path().join("bad.mp4"),
            }),
    ];

    let summary = run_batch(jobs, 2, Arc::new(ProcessExecutor), &RunControl::new())
        .await
        .unwrap();

    assert_eq!(summary.outcome, RunOutcome::Completed);
    assert_eq!((summary.completed, summary.failed), (2, 1));
    assert_eq!(std::fs::read_to_string(dir.path().join("good.mp4")).unwrap(), "data");
    assert!(!good_stage.exists());
    assert!(!bad_stage.exists());
    assert!(!dir.path().join("bad.mp4").exists());
}

#[tokio::test]
async fn scratch_is_visible_to_the_process_and_removed_after() {
    let dir = tempdir().unwrap();
    let list = dir.path().join(".list.txt");
    let copy = dir.path().join("copy.txt");
    let job = sh("copy", "cat \"$0\" > \"$1\"", &[list.clone().into(), copy.clone().into()])
        .with_scratch(ScratchFile {
            path: list.clone(),
            contents: "file 'a.mp4'\n".to_string(),
        });

    let summary = run_batch(vec![job], 1, Arc::new(ProcessExecutor), &RunControl::new())
        .await
        .unwrap();

    assert_eq!(summary.failed, 0);
    assert_eq!(std::fs::read_to_string(&copy).unwrap(), "file 'a.mp4'\n");
    assert!(!list.exists());
}

#[tokio::test]
async fn missing_program_is_fatal() {
    let job = Job::new("ghost", "vbatch-no-such-program", Vec::new());
    let err = run_batch(vec![job], 1, Arc::new(ProcessExecutor), &RunControl::new())
        .await
        .unwrap_err();
    match err {
        BatchError::Spawn { label, .. } => assert_eq!(label, "ghost"),
        other => panic!("expected Spawn, got {other:?}"),
    }
}
