//! Mirror the build tree into the public tree.

use std::fs;
use std::path::Path;

use jwalk::WalkDir;

use super::PublicError;

/// Replace `public` with a copy of every file under `build`.
///
/// The old public tree is removed first, so obfuscation always starts from
/// fresh build output and files deleted from the build do not linger.
/// Returns the number of files copied.
pub fn public_copy(build: &Path, public: &Path) -> Result<usize, PublicError> {
    if !build.is_dir() {
        return Err(PublicError::Io(
            build.to_path_buf(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "build tree missing"),
        ));
    }

    if public.starts_with(build) || build.starts_with(public) {
        return Err(PublicError::Overlap {
            build: build.to_path_buf(),
            public: public.to_path_buf(),
        });
    }
    if public.exists() {
        fs::remove_dir_all(public).map_err(|e| PublicError::Io(public.to_path_buf(), e))?;
    }

    let files = WalkDir::new(build)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path());

    let mut count = 0;
    for src in files {
        let Ok(rel) = src.strip_prefix(build) else {
            continue;
        };
        let dest = public.join(rel);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| PublicError::Io(parent.to_path_buf(), e))?;
        }
        fs::copy(&src, &dest).map_err(|e| PublicError::Io(dest.clone(), e))?;
        count += 1;
    }
    Ok(count)
}
