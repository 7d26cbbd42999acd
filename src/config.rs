//! Template directory resolution (C12): the only environment-derived configuration in the crate.

use std::env;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::Result;

/// The two ordered, named template locations consulted for every lookup: `user` (writable,
/// created on demand) and `bundled` (read-only, absence is non-fatal). Resolved once at process
/// start and threaded explicitly into every library call — never re-read from the environment
/// inside a library function.
#[derive(Clone, Debug)]
pub struct TemplateDirs {
    pub user: PathBuf,
    pub bundled: PathBuf,
}

impl TemplateDirs {
    /// Resolves the pair from `ARGUS_TEMPLATES_DIR`/`ARGUS_BUNDLED_TEMPLATES_DIR`, falling back
    /// to a `templates` directory under the platform data directory and a `templates` directory
    /// next to the running executable, respectively.
    pub fn resolve() -> Result<Self> {
        let user = env::var_os("ARGUS_TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_user_dir);
        let bundled = env::var_os("ARGUS_BUNDLED_TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_bundled_dir);

        debug!("resolved template directories: user={user:?} bundled={bundled:?}");
        Ok(TemplateDirs { user, bundled })
    }

    /// Returns the first location (checked `user` then `bundled`) containing both
    /// `{name}/{name}.yaml` and `{name}/{name}_template.gif`, or `None` if neither does.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        for dir in [&self.user, &self.bundled] {
            if template_files_present(dir, name) {
                return Some(dir.join(name));
            }
        }
        None
    }

    /// Lists every template name present in either location, user-location entries first, with
    /// duplicates (a name present in both) suppressed to the user copy.
    pub fn list(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        let mut names = Vec::new();
        for dir in [&self.user, &self.bundled] {
            let Ok(entries) = std::fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let Ok(file_type) = entry.file_type() else {
                    continue;
                };
                if !file_type.is_dir() {
                    continue;
                }
                let name = entry.file_name().to_string_lossy().into_owned();
                if template_files_present(dir, &name) && seen.insert(name.clone()) {
                    names.push(name);
                }
            }
        }
        names.sort();
        names
    }

    /// The path the "Message Template" resource (§4.4) lives at: a single text file sitting
    /// alongside the per-template subdirectories in the user location.
    pub fn message_template_path(&self) -> PathBuf {
        self.user.join("Message Template.txt")
    }
}

fn template_files_present(dir: &Path, name: &str) -> bool {
    dir.join(name).join(format!("{name}.yaml")).is_file()
        && dir.join(name).join(format!("{name}_template.gif")).is_file()
}

fn default_user_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(env::temp_dir)
        .join("argus-vlf")
        .join("templates")
}

fn default_bundled_dir() -> PathBuf {
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(env::temp_dir)
        .join("templates")
}
