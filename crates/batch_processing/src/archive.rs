use std::fs::{self, File};
use std::io;
use std::path::{Component, Path, PathBuf};

use log::info;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::Result;

/// Name of a file inside the archive: its path under `root` with `/`
/// separators, or just its file name when it lives elsewhere.
pub fn archive_entry_name(root: &Path, file: &Path) -> String {
    let relative: PathBuf = match file.strip_prefix(root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => file.file_name().map(PathBuf::from).unwrap_or_default(),
    };

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Write `files` into a deflated zip at `dest`, keeping their layout under
/// `root`. Returns the number of entries written.
pub fn build_archive(root: &Path, files: &[PathBuf], dest: &Path) -> Result<usize> {
    if let Some(parent) = dest.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut zip = ZipWriter::new(File::create(dest)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0;
    for file in files {
        let name = archive_entry_name(root, file);
        if name.is_empty() {
            continue;
        }

        zip.start_file(name, options)?;
        let mut source = File::open(file)?;
        io::copy(&mut source, &mut zip)?;
        written += 1;
    }

    zip.finish()?;
    info!("Wrote {} file(s) to {}", written, dest.display());

    Ok(written)
}
