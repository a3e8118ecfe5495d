use crate::builder::config::BUNDLE_TMP_FILE;
use crate::builder::error::BuildError;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// OutputTransaction owns the move of a finished working tree to its
/// destination. Nothing reaches the destination before `commit`.
pub struct OutputTransaction {
    version_id: String,
    generated: PathBuf,
    destination: PathBuf,
    overwrite: bool,
}

impl OutputTransaction {
    pub fn new(version_id: &str, generated: &Path, destination: &Path, overwrite: bool) -> Self {
        Self {
            version_id: version_id.to_string(),
            generated: generated.to_path_buf(),
            destination: destination.to_path_buf(),
            overwrite,
        }
    }

    /// Fail with `OutputConflict` if the destination is populated and
    /// overwrite is off. Never modifies anything.
    pub fn check(&self) -> Result<()> {
        if !self.overwrite && is_populated(&self.destination)? {
            return Err(BuildError::OutputConflict {
                path: self.destination.clone(),
            }
            .into());
        }
        Ok(())
    }

    /// Archive the working tree into `<generated>/<version>.zip`.
    /// The archive is built next to the tree first so it doesn't contain itself.
    pub fn bundle(&self, scratch: &Path) -> Result<PathBuf> {
        let tmp_zip = scratch.join(BUNDLE_TMP_FILE);
        let final_zip = self.generated.join(format!("{}.zip", self.version_id));
        remove_path(&tmp_zip)?;
        remove_path(&final_zip)?;

        write_zip(&self.generated, &tmp_zip)?;
        move_file(&tmp_zip, &final_zip)?;
        log::info!("[out:{}] bundled {:?}", self.version_id, final_zip);
        Ok(final_zip)
    }

    /// Move every top-level entry of the working tree into the destination.
    pub fn commit(&self) -> Result<()> {
        self.check()?;
        if self.destination.exists() {
            log::info!(
                "[out:{}] replacing existing output {:?}",
                self.version_id,
                self.destination
            );
            remove_path(&self.destination)?;
        }

        fs::create_dir_all(&self.destination)
            .with_context(|| format!("Create output dir {:?}", self.destination))?;

        let mut entries: Vec<_> = fs::read_dir(&self.generated)
            .with_context(|| format!("Read dir {:?}", self.generated))?
            .collect::<std::io::Result<_>>()?;
        entries.sort_by_key(|e| e.file_name());

        for entry in entries {
            let target = self.destination.join(entry.file_name());
            if entry.file_type()?.is_dir() {
                move_dir(&entry.path(), &target)?;
            } else {
                move_file(&entry.path(), &target)?;
            }
        }

        log::info!("[out:{}] commit {:?}", self.version_id, self.destination);
        Ok(())
    }
}

fn is_populated(path: &Path) -> Result<bool> {
    if !path.exists() {
        return Ok(false);
    }
    if !path.is_dir() {
        return Ok(true);
    }
    let mut entries = fs::read_dir(path).with_context(|| format!("Read dir {:?}", path))?;
    Ok(entries.next().is_some())
}

fn remove_path(path: &Path) -> Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path).with_context(|| format!("Remove dir {:?}", path))?;
    } else if path.exists() {
        fs::remove_file(path).with_context(|| format!("Remove file {:?}", path))?;
    }
    Ok(())
}

fn write_zip(src: &Path, zip_path: &Path) -> Result<()> {
    let file = fs::File::create(zip_path).with_context(|| format!("Create {:?}", zip_path))?;
    let mut zip = ZipWriter::new(file);
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for entry in WalkDir::new(src).sort_by_file_name().min_depth(1) {
        let entry = entry?;
        let relative = entry
            .path()
            .strip_prefix(src)?
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if entry.file_type().is_dir() {
            zip.add_directory(relative, options)?;
        } else {
            zip.start_file(relative, options)?;
            let bytes =
                fs::read(entry.path()).with_context(|| format!("Read {:?}", entry.path()))?;
            zip.write_all(&bytes)?;
        }
    }

    zip.finish()?;
    Ok(())
}

fn move_file(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(_) => Ok(()),
        Err(err) if is_cross_device_link(&err) => {
            fs::copy(src, dest).with_context(|| format!("Copy file {:?} -> {:?}", src, dest))?;
            fs::remove_file(src).with_context(|| format!("Remove source file {:?}", src))?;
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("Move file {:?} -> {:?}", src, dest)),
    }
}

fn move_dir(src: &Path, dest: &Path) -> Result<()> {
    match fs::rename(src, dest) {
        Ok(_) => Ok(()),
        Err(err) if is_cross_device_link(&err) => {
            copy_dir_recursive(src, dest)?;
            fs::remove_dir_all(src).with_context(|| format!("Remove source dir {:?}", src))?;
            Ok(())
        }
        Err(err) => Err(err).with_context(|| format!("Move dir {:?} -> {:?}", src, dest)),
    }
}

fn copy_dir_recursive(src: &Path, dest: &Path) -> Result<()> {
    fs::create_dir_all(dest).with_context(|| format!("Create copy dest {:?}", dest))?;
    for entry in fs::read_dir(src).with_context(|| format!("Read dir {:?}", src))? {
        let entry = entry?;
        let file_type = entry.file_type()?;
        let target_path = dest.join(entry.file_name());
        if file_type.is_dir() {
            copy_dir_recursive(&entry.path(), &target_path)?;
        } else {
            fs::copy(entry.path(), &target_path)
                .with_context(|| format!("Copy file {:?} -> {:?}", entry.path(), target_path))?;
        }
    }
    Ok(())
}

fn is_cross_device_link(err: &std::io::Error) -> bool {
    #[cfg(target_family = "unix")]
    {
        // EXDEV
        err.raw_os_error() == Some(18)
    }

    #[cfg(not(target_family = "unix"))]
    {
        // ERROR_NOT_SAME_DEVICE
        err.raw_os_error() == Some(17)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn working_tree(root: &Path) -> PathBuf {
        let generated = root.join("scratch").join("generated");
        fs::create_dir_all(generated.join("lists/blocks")).unwrap();
        fs::write(generated.join("lists/blocks/stone.json"), "{}").unwrap();
        fs::write(generated.join("1.20.1.json"), "{}").unwrap();
        generated
    }

    #[test]
    fn conflict_leaves_destination_untouched() {
        let tmp = tempfile::tempdir().unwrap();
        let generated = working_tree(tmp.path());
        let dest = tmp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("keep.txt"), "mine").unwrap();

        let txn = OutputTransaction::new("1.20.1", &generated, &dest, false);
        let err = txn.commit().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<BuildError>(),
            Some(BuildError::OutputConflict { .. })
        ));
        assert_eq!(fs::read_to_string(dest.join("keep.txt")).unwrap(), "mine");
        assert!(!dest.join("lists").exists());
        assert!(generated.join("lists").exists());
    }

    #[test]
    fn empty_destination_is_not_a_conflict() {
        let tmp = tempfile::tempdir().unwrap();
        let generated = working_tree(tmp.path());
        let dest = tmp.path().join("out");
        fs::create_dir_all(&dest).unwrap();

        OutputTransaction::new("1.20.1", &generated, &dest, false)
            .commit()
            .unwrap();
        assert!(dest.join("lists/blocks/stone.json").exists());
        assert!(dest.join("1.20.1.json").exists());
    }

    #[test]
    fn overwrite_replaces_destination() {
        let tmp = tempfile::tempdir().unwrap();
        let generated = working_tree(tmp.path());
        let dest = tmp.path().join("out");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("old.txt"), "old").unwrap();

        OutputTransaction::new("1.20.1", &generated, &dest, true)
            .commit()
            .unwrap();
        assert!(!dest.join("old.txt").exists());
        assert!(dest.join("lists/blocks/stone.json").exists());
    }

    #[test]
    fn bundle_lands_inside_the_tree() {
        let tmp = tempfile::tempdir().unwrap();
        let generated = working_tree(tmp.path());
        let scratch = tmp.path().join("scratch");

        let txn = OutputTransaction::new("1.20.1", &generated, &tmp.path().join("out"), false);
        let zip_path = txn.bundle(&scratch).unwrap();
        assert_eq!(zip_path, generated.join("1.20.1.zip"));
        assert!(!scratch.join(BUNDLE_TMP_FILE).exists());

        let mut archive = zip::ZipArchive::new(fs::File::open(&zip_path).unwrap()).unwrap();
        let mut body = String::new();
        archive
            .by_name("lists/blocks/stone.json")
            .unwrap()
            .read_to_string(&mut body)
            .unwrap();
        assert_eq!(body, "{}");
        assert!(archive.by_name("1.20.1.zip").is_err());
    }
}
