use std::io::Write;

/// Replaces the file at `path` with `contents` in one step.
///
/// The bytes go to a synced temporary file next to the real target, which is
/// then renamed over it. A symlinked `path` is followed, so the link survives
/// and the file it points at receives the new content. An existing target
/// keeps its permissions.
///
/// # Errors
///
/// Returns an error if `path` cannot be resolved, if the temporary file cannot
/// be created or written, or if the rename over the target fails.
pub fn write_atomic(path: impl AsRef<std::path::Path>, contents: &[u8]) -> std::io::Result<()> {
    let target = resolve_target(path.as_ref())?;
    let permissions = match std::fs::metadata(&target) {
        Ok(metadata) => Some(metadata.permissions()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => return Err(e),
    };
    let parent_dir = target
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| std::path::Path::new("."));

    let mut temp_save_file = tempfile::Builder::new()
        .prefix(".save_tmp_")
        .tempfile_in(parent_dir)?;

    temp_save_file.write_all(contents)?;

    if let Some(permissions) = permissions {
        temp_save_file.as_file().set_permissions(permissions)?;
    }

    temp_save_file.as_file().sync_all()?;
    temp_save_file.persist(&target).map_err(|e| e.error)?;

    tracing::debug!(path = %target.display(), bytes = contents.len(), "saved file");

    Ok(())
}

/// The file a save to `path` should land in: the canonical path when the
/// target exists, `path` itself when it is about to be created.
fn resolve_target(path: &std::path::Path) -> std::io::Result<std::path::PathBuf> {
    match std::fs::canonicalize(path) {
        Ok(resolved) => Ok(resolved),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(path.to_path_buf()),
        Err(e) => Err(e),
    }
}
