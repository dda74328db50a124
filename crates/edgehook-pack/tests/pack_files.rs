//! End-to-end pack pipeline against a temporary directory.

use std::path::Path;

use edgehook_pack::{ComposeError, HOOKED_GUARD, InputRole, compose, pack_files};

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write input");
    path
}

#[tokio::test]
async fn test_pack_writes_composed_artifact() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hook = write(
        dir.path(),
        "hook.js",
        "globalThis.installs = (globalThis.installs || 0) + 1;",
    );
    let src = write(dir.path(), "worker.js", "addEventListener('fetch', handle);");
    let out = dir.path().join("dist.js");

    let report = pack_files(&hook, &src, &out).await.expect("pack");

    let written = std::fs::read_to_string(&out).expect("read output");
    let expected = compose(
        "globalThis.installs = (globalThis.installs || 0) + 1;",
        "addEventListener('fetch', handle);",
    )
    .expect("compose");
    assert_eq!(written, expected.as_str());
    assert_eq!(report.artifact_bytes, written.len());
    assert_eq!(report.output, out);

    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .expect("read dir")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[tokio::test]
async fn test_repacking_output_keeps_one_guard_per_layer() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hook = write(dir.path(), "hook.js", "install();");
    let src = write(dir.path(), "worker.js", "run();");
    let first = dir.path().join("first.js");
    let second = dir.path().join("second.js");

    pack_files(&hook, &src, &first).await.expect("first pack");
    pack_files(&hook, &first, &second).await.expect("second pack");

    let text = std::fs::read_to_string(&second).expect("read");
    assert_eq!(text.matches(HOOKED_GUARD).count(), 2);
    assert_eq!(text.matches("run();\n}").count(), 1);
}

#[tokio::test]
async fn test_missing_hook_file_is_load_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src = write(dir.path(), "worker.js", "run();");
    let out = dir.path().join("dist.js");

    let err = pack_files(&dir.path().join("absent.js"), &src, &out)
        .await
        .expect_err("missing hook");
    assert!(matches!(
        err,
        ComposeError::Load {
            role: InputRole::Hook,
            ..
        }
    ));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_empty_src_writes_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hook = write(dir.path(), "hook.js", "install();");
    let src = write(dir.path(), "worker.js", "");
    let out = dir.path().join("dist.js");

    let err = pack_files(&hook, &src, &out).await.expect_err("empty src");
    assert!(matches!(
        err,
        ComposeError::MissingInput {
            role: InputRole::Src
        }
    ));
    assert!(!out.exists());
}

#[tokio::test]
async fn test_unwritable_output_is_save_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let hook = write(dir.path(), "hook.js", "install();");
    let src = write(dir.path(), "worker.js", "run();");
    let out = dir.path().join("missing-dir").join("dist.js");

    let err = pack_files(&hook, &src, &out).await.expect_err("no parent");
    assert!(matches!(err, ComposeError::Save { .. }));
    assert!(err.to_string().starts_with("Save Error"));
}
