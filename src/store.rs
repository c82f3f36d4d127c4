use std::ffi::OsString;
use std::fs;
use std::io::{self, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::NamedTempFile;

use crate::codec;
use crate::content_type::ContentType;
use crate::error::{AssetError, AssetResult};
use crate::naming;
use crate::thumbnail;

const STAGING_PREFIX: &str = ".staging-";
const STAGING_SUFFIX: &str = ".staging";
const MAX_NAME_ATTEMPTS: usize = 8;

/// A rewindable upload stream. The store reads it twice and never closes it.
pub trait Readable: Read + Seek {}

impl<T: Read + Seek + ?Sized> Readable for T {}

pub trait AssetStorage: Send + Sync {
    /// Writes the thumbnail and the untouched original under `filename`.
    fn store(
        &self,
        source: &mut dyn Readable,
        filename: &str,
        content_type: &str,
    ) -> AssetResult<()>;

    /// Removes both artifacts of `filename`, original first.
    fn clean(&self, filename: &str) -> AssetResult<()>;
}

/// Originals and thumbnails kept in two flat directories under the same name.
///
/// Partial writes go to a hidden sibling of each root, so nothing served from
/// a root is ever half written.
#[derive(Clone, Debug)]
pub struct AssetStore {
    uploads_dir: PathBuf,
    thumbnails_dir: PathBuf,
    uploads_staging: PathBuf,
    thumbnails_staging: PathBuf,
}

impl AssetStore {
    pub fn new(uploads_dir: impl Into<PathBuf>, thumbnails_dir: impl Into<PathBuf>) -> Self {
        let uploads_dir = uploads_dir.into();
        let thumbnails_dir = thumbnails_dir.into();
        Self {
            uploads_staging: staging_dir_for(&uploads_dir),
            thumbnails_staging: staging_dir_for(&thumbnails_dir),
            uploads_dir,
            thumbnails_dir,
        }
    }

    pub fn uploads_dir(&self) -> &Path {
        &self.uploads_dir
    }

    pub fn thumbnails_dir(&self) -> &Path {
        &self.thumbnails_dir
    }

    /// Where in-flight files for the uploads root are written before the rename.
    pub fn uploads_staging_dir(&self) -> &Path {
        &self.uploads_staging
    }

    pub fn thumbnails_staging_dir(&self) -> &Path {
        &self.thumbnails_staging
    }

    pub fn original_path(&self, filename: &str) -> PathBuf {
        self.uploads_dir.join(filename)
    }

    pub fn thumbnail_path(&self, filename: &str) -> PathBuf {
        self.thumbnails_dir.join(filename)
    }

    /// True if either root already holds `filename`.
    pub fn exists(&self, filename: &str) -> AssetResult<bool> {
        validate_filename(filename)?;
        for path in [self.original_path(filename), self.thumbnail_path(filename)] {
            let found = path
                .try_exists()
                .map_err(|source| AssetError::filesystem("stat", &path, source))?;
            if found {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Generates a random name for `content_type` that neither root holds yet.
    pub fn allocate_filename(&self, content_type: &str) -> AssetResult<String> {
        self.allocate_with(content_type, naming::generate_filename)
    }

    fn allocate_with(
        &self,
        content_type: &str,
        mut generate: impl FnMut(&str) -> String,
    ) -> AssetResult<String> {
        let content_type = ContentType::parse(content_type)?;
        for _ in 0..MAX_NAME_ATTEMPTS {
            let filename = generate(content_type.mime());
            if !self.exists(&filename)? {
                return Ok(filename);
            }
            tracing::warn!(%filename, "generated filename already taken, retrying");
        }
        Err(AssetError::NamesExhausted {
            attempts: MAX_NAME_ATTEMPTS,
        })
    }

    fn ensure_dirs(&self) -> AssetResult<()> {
        let dirs = [
            &self.uploads_dir,
            &self.thumbnails_dir,
            &self.uploads_staging,
            &self.thumbnails_staging,
        ];
        for dir in dirs {
            fs::create_dir_all(dir).map_err(|source| AssetError::filesystem("mkdir", dir, source))?;
        }
        Ok(())
    }
}

impl AssetStorage for AssetStore {
    fn store(
        &self,
        source: &mut dyn Readable,
        filename: &str,
        content_type: &str,
    ) -> AssetResult<()> {
        let start = Instant::now();
        validate_filename(filename)?;
        let content_type = ContentType::parse(content_type)?;
        self.ensure_dirs()?;

        let image = codec::decode_as(source, content_type)?;
        let thumb = thumbnail::make_thumbnail(&image);

        let thumbnail_path = self.thumbnail_path(filename);
        let mut staged_thumbnail = stage_file(&self.thumbnails_staging)?;
        {
            let mut writer = BufWriter::new(&mut staged_thumbnail);
            codec::encode_as(&mut writer, &thumb, content_type)?;
            writer
                .flush()
                .map_err(|source| AssetError::filesystem("write", &thumbnail_path, source))?;
        }
        sync(&staged_thumbnail, &thumbnail_path)?;

        let original_path = self.original_path(filename);
        source
            .seek(SeekFrom::Start(0))
            .map_err(|source| AssetError::filesystem("rewind", &original_path, source))?;
        let mut staged_original = stage_file(&self.uploads_staging)?;
        let size = io::copy(source, &mut staged_original)
            .map_err(|source| AssetError::filesystem("write", &original_path, source))?;
        sync(&staged_original, &original_path)?;

        // Both artifacts are fully written; from here only renames remain.
        staged_thumbnail
            .persist(&thumbnail_path)
            .map_err(|err| AssetError::filesystem("rename", &thumbnail_path, err.error))?;
        if let Err(err) = staged_original.persist(&original_path) {
            if let Err(remove_err) = fs::remove_file(&thumbnail_path) {
                tracing::warn!(
                    path = %thumbnail_path.display(),
                    error = %remove_err,
                    "failed to roll back thumbnail"
                );
            }
            return Err(AssetError::filesystem("rename", &original_path, err.error));
        }

        tracing::info!(
            %filename,
            %content_type,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "asset stored"
        );
        Ok(())
    }

    fn clean(&self, filename: &str) -> AssetResult<()> {
        validate_filename(filename)?;
        for path in [self.original_path(filename), self.thumbnail_path(filename)] {
            fs::remove_file(&path).map_err(|source| AssetError::filesystem("remove", &path, source))?;
        }
        tracing::info!(%filename, "asset removed");
        Ok(())
    }
}

/// Rejects names that could escape a root or that would be hidden files.
pub fn validate_filename(filename: &str) -> AssetResult<()> {
    let invalid = filename.is_empty()
        || filename.starts_with('.')
        || filename.contains(['/', '\\', '\0']);
    if invalid {
        return Err(AssetError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}

/// Hidden sibling of `root`, e.g. `/srv/uploads` stages into `/srv/.uploads.staging`.
fn staging_dir_for(root: &Path) -> PathBuf {
    match root.file_name() {
        Some(name) => {
            let mut staged = OsString::from(".");
            staged.push(name);
            staged.push(STAGING_SUFFIX);
            root.with_file_name(staged)
        }
        None => root.join(STAGING_SUFFIX),
    }
}

fn stage_file(dir: &Path) -> AssetResult<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(STAGING_PREFIX);
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o644));
    }
    builder
        .tempfile_in(dir)
        .map_err(|source| AssetError::filesystem("create", dir, source))
}

fn sync(file: &NamedTempFile, target: &Path) -> AssetResult<()> {
    file.as_file()
        .sync_all()
        .map_err(|source| AssetError::filesystem("sync", target, source))
}
