use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Replace `path` with `data` via a same-directory temp file and rename, so
/// readers only ever see the old or the new content.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write only when the bytes differ. Returns whether the file changed.
pub fn write_if_changed(path: &Path, data: &[u8]) -> io::Result<bool> {
    match fs::read(path) {
        Ok(existing) if existing == data => return Ok(false),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(err) => return Err(err),
    }
    atomic_write(path, data)?;
    Ok(true)
}
