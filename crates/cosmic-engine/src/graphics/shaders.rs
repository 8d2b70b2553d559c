use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Source of SPIR-V shader blobs, looked up by stage name ("vert", "frag").
pub trait ShaderSource {
    /// SPIR-V words for `name`, or `None` when unavailable or invalid.
    fn load(&self, name: &str) -> Option<Vec<u32>>;
}

/// Reads `<dir>/<name>.spv`.
#[derive(Debug, Clone)]
pub struct ShaderDir {
    dir: PathBuf,
}

impl ShaderDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.spv"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ShaderSource for ShaderDir {
    fn load(&self, name: &str) -> Option<Vec<u32>> {
        let path = self.path_of(name);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                core_warn!("shader {} unavailable: {err}", path.display());
                return None;
            }
        };

        match ash::util::read_spv(&mut Cursor::new(&bytes[..])) {
            Ok(words) if !words.is_empty() => Some(words),
            Ok(_) => {
                core_warn!("shader {} is empty", path.display());
                None
            }
            Err(err) => {
                core_warn!("shader {} is not valid SPIR-V: {err}", path.display());
                None
            }
        }
    }
}

/// Source with no shaders; the frame is a clear pass only.
impl ShaderSource for () {
    fn load(&self, _name: &str) -> Option<Vec<u32>> {
        None
    }
}
