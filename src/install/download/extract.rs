//! Unpacking of the Zano AppImage and the miner tarball

use std::fs;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use log::{debug, info};
use tar::Archive;

use crate::install::error::SetupError;

/// Directory `--appimage-extract` unpacks into
const APPIMAGE_ROOT: &str = "squashfs-root";

/// Mark `path` as `rwxr-xr-x`
pub fn make_executable(path: &Path) -> Result<(), SetupError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

/// Extract `binaries` from an AppImage into `work_dir`.
///
/// The image is run with `--appimage-extract` inside a scratch directory under
/// `work_dir`; the scratch directory is removed when this returns, on success
/// or failure.
pub async fn extract_appimage(
    image: &Path,
    work_dir: &Path,
    binaries: &[&str],
) -> Result<Vec<PathBuf>, SetupError> {
    let fail = |reason: String| SetupError::Extract {
        archive: image.to_path_buf(),
        reason,
    };

    make_executable(image)?;

    let scratch = tempfile::Builder::new()
        .prefix(".appimage-extract-")
        .tempdir_in(work_dir)?;

    let image_abs = fs::canonicalize(image)?;
    let output = tokio::process::Command::new(&image_abs)
        .arg("--appimage-extract")
        .current_dir(scratch.path())
        .output()
        .await
        .map_err(|e| fail(e.to_string()))?;

    if !output.status.success() {
        return Err(fail(format!(
            "--appimage-extract exited with {}: {}",
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }

    let bin_dir = scratch.path().join(APPIMAGE_ROOT).join("usr/bin");
    let mut installed = Vec::with_capacity(binaries.len());

    for name in binaries {
        let src = bin_dir.join(name);
        if !src.exists() {
            return Err(fail(format!("{name} not found under {APPIMAGE_ROOT}/usr/bin")));
        }
        let dest = work_dir.join(name);
        move_file(&src, &dest)?;
        make_executable(&dest)?;
        debug!("Installed {}", dest.display());
        installed.push(dest);
    }

    info!(
        "Extracted {} from {}",
        binaries.join(", "),
        image.display()
    );
    Ok(installed)
}

/// Unpack a `.tar.gz` into `dest_dir`, replacing its previous contents.
///
/// Release tarballs usually wrap everything in one top-level directory; that
/// directory is flattened so `dest_dir` holds the files directly.
pub async fn extract_tarball(archive: &Path, dest_dir: &Path) -> Result<(), SetupError> {
    let archive = archive.to_path_buf();
    let dest_dir = dest_dir.to_path_buf();

    tokio::task::spawn_blocking(move || extract_tarball_blocking(&archive, &dest_dir))
        .await
        .map_err(|e| SetupError::System(format!("extraction task failed: {e}")))?
}

fn extract_tarball_blocking(archive: &Path, dest_dir: &Path) -> Result<(), SetupError> {
    let fail = |reason: String| SetupError::Extract {
        archive: archive.to_path_buf(),
        reason,
    };

    let parent = dest_dir
        .parent()
        .ok_or_else(|| fail("destination has no parent directory".to_string()))?;
    fs::create_dir_all(parent)?;
    let scratch = tempfile::Builder::new()
        .prefix(".tarball-extract-")
        .tempdir_in(parent)?;

    let file = fs::File::open(archive)?;
    Archive::new(GzDecoder::new(file))
        .unpack(scratch.path())
        .map_err(|e| fail(e.to_string()))?;

    let entries: Vec<PathBuf> = fs::read_dir(scratch.path())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect();

    let root = match entries.as_slice() {
        [single] if single.is_dir() => single.clone(),
        [] => return Err(fail("archive is empty".to_string())),
        _ => scratch.path().to_path_buf(),
    };

    if dest_dir.exists() {
        fs::remove_dir_all(dest_dir)?;
    }
    fs::create_dir_all(dest_dir)?;

    for entry in fs::read_dir(&root)? {
        let entry = entry?;
        fs::rename(entry.path(), dest_dir.join(entry.file_name()))?;
    }

    Ok(())
}

/// Rename, falling back to copy + remove across filesystems
fn move_file(src: &Path, dest: &Path) -> Result<(), SetupError> {
    if dest.exists() {
        fs::remove_file(dest)?;
    }
    if fs::rename(src, dest).is_err() {
        fs::copy(src, dest)?;
        fs::remove_file(src)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;

    fn write_tarball(path: &Path, files: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
        for (name, data) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder.append_data(&mut header, name, *data).unwrap();
        }
        builder.into_inner().unwrap().finish().unwrap();
    }

    #[tokio::test]
    async fn tarball_single_root_is_flattened() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("miner.tar.gz");
        write_tarball(
            &archive,
            &[
                ("TT-Miner-2023.1.0/TT-Miner", b"#!/bin/sh\n"),
                ("TT-Miner-2023.1.0/README.txt", b"readme"),
            ],
        );

        let dest = dir.path().join("TT-Miner");
        extract_tarball(&archive, &dest).await.unwrap();

        assert!(dest.join("TT-Miner").is_file());
        assert_eq!(fs::read(dest.join("README.txt")).unwrap(), b"readme");
    }

    #[tokio::test]
    async fn tarball_replaces_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("miner.tar.gz");
        write_tarball(&archive, &[("TT-Miner", b"new"), ("LICENSE", b"mit")]);

        let dest = dir.path().join("TT-Miner");
        fs::create_dir_all(&dest).unwrap();
        fs::write(dest.join("stale.bin"), b"old").unwrap();

        extract_tarball(&archive, &dest).await.unwrap();

        assert!(!dest.join("stale.bin").exists());
        assert_eq!(fs::read(dest.join("TT-Miner")).unwrap(), b"new");
    }

    #[tokio::test]
    async fn appimage_binaries_are_moved_and_scratch_removed() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("zano.AppImage");
        fs::write(
            &image,
            "#!/bin/sh\n\
             mkdir -p squashfs-root/usr/bin\n\
             echo daemon > squashfs-root/usr/bin/zanod\n\
             echo wallet > squashfs-root/usr/bin/simplewallet\n",
        )
        .unwrap();

        let installed = extract_appimage(&image, dir.path(), &["zanod", "simplewallet"])
            .await
            .unwrap();

        assert_eq!(installed.len(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("zanod")).unwrap(), "daemon\n");
        assert!(dir.path().join("simplewallet").is_file());

        let leftovers: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(".appimage-extract-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[tokio::test]
    async fn appimage_missing_binary_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("zano.AppImage");
        fs::write(&image, "#!/bin/sh\nmkdir -p squashfs-root/usr/bin\n").unwrap();

        let result = extract_appimage(&image, dir.path(), &["zanod"]).await;
        assert!(matches!(result, Err(SetupError::Extract { .. })));
    }
}
