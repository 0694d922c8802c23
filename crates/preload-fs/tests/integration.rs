use preload_fs::{Error, Workspace, ensure_dir};
use tempfile::tempdir;

#[test]
fn test_workspace_inside_created_directory() {
    let dir = tempdir().unwrap();
    let data = dir.path().join("data");

    assert!(ensure_dir(&data).unwrap());
    let workspace = Workspace::new(&data).unwrap();
    std::fs::write(workspace.path().join("vectors.bin.gz"), b"\x1f\x8b").unwrap();

    assert!(!data.join("vectors.bin.gz").exists());
    workspace.commit().unwrap();
    assert!(data.join("vectors.bin.gz").exists());
}

#[test]
fn test_workspace_over_file_fails() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("data");
    std::fs::write(&file, "oops").unwrap();

    let result = Workspace::new(&file);
    assert!(matches!(result, Err(Error::NotADirectory { .. })));
}

#[test]
fn test_dropped_workspace_leaves_destination_untouched() {
    let dir = tempdir().unwrap();
    {
        let workspace = Workspace::new(dir.path()).unwrap();
        std::fs::write(workspace.path().join("half.tar.gz"), b"\x1f").unwrap();
    }

    let remaining: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
    assert!(remaining.is_empty());
}
