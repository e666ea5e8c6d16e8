pub mod synthetic_image;

use std::path::PathBuf;

/// A fresh, uniquely named path under the system temp dir. The file is not
/// created; callers remove it when done.
pub fn temp_path(extension: &str) -> PathBuf {
    std::env::temp_dir().join(format!("pngeditor-test-{}.{}", uuid::Uuid::new_v4(), extension))
}
