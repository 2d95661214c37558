use crate::error::{Result, SwiftError};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
pub const ENV_LIBRARY: &str = "SWIFT_LIBRARY";
pub const ENV_LIBRARY_PATH: &str = "SWIFT_LIBRARY_PATH";
pub const ENV_MAX_THREADS: &str = "SWIFT_MAX_THREADS";
/// Where to find the native library and which process-wide settings to push
/// into it once loaded.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindingConfig {
    /// File name override; `None` means the platform name for `swift`.
    pub library: Option<String>,
    /// Tried in order before falling back to the loader's own search.
    pub search_dirs: Vec<PathBuf>,
    pub max_threads: Option<i32>,
    pub log_likelihood_names: Option<LogLikelihoodNames>,
}
impl BindingConfig {
    pub fn library_file_name(&self) -> OsString {
        match &self.library {
            Some(name) => OsString::from(name),
            None => libloading::library_filename("swift"),
        }
    }
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        config.library = get(ENV_LIBRARY).filter(|s| !s.trim().is_empty());
        if let Some(paths) = get(ENV_LIBRARY_PATH) {
            config.search_dirs = std::env::split_paths(&paths)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
        }
        if let Some(raw) = get(ENV_MAX_THREADS) {
            match raw.trim().parse::<i32>() {
                Ok(n) => config.max_threads = Some(n),
                Err(_) => log::warn!("ignoring {ENV_MAX_THREADS}={raw:?}: not an integer"),
            }
        }
        config
    }
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SwiftError::FileNotFound(path.to_path_buf()));
        }
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}
/// Parameter names the native log-likelihood objectives look up.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
pub enum LogLikelihoodNames {
    Standard(StandardLikelihoodNames),
    /// Two-component variance ("X") form.
    Extended(ExtendedLikelihoodNames),
    Mixture(ExtendedLikelihoodNames),
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StandardLikelihoodNames {
    pub a: String,
    pub b: String,
    pub m: String,
    pub s: String,
    pub maxobs: String,
    pub ct: String,
    pub censopt: String,
}
impl Default for StandardLikelihoodNames {
    fn default() -> Self {
        Self {
            a: "a".into(),
            b: "b".into(),
            m: "m".into(),
            s: "s".into(),
            maxobs: "maxobs".into(),
            ct: "ct".into(),
            censopt: "censopt".into(),
        }
    }
}
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtendedLikelihoodNames {
    pub a: String,
    pub b: String,
    pub m: String,
    pub s1: String,
    pub s2: String,
    pub w: String,
    pub maxobs: String,
    pub ct: String,
    pub censopt: String,
}
impl Default for ExtendedLikelihoodNames {
    fn default() -> Self {
        Self {
            a: "a".into(),
            b: "b".into(),
            m: "m".into(),
            s1: "s1".into(),
            s2: "s2".into(),
            w: "w".into(),
            maxobs: "maxobs".into(),
            ct: "ct".into(),
            censopt: "censopt".into(),
        }
    }
}
#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }
    #[test]
    fn default_library_name_is_platform_specific_swift() {
        let name = BindingConfig::default().library_file_name();
        assert!(name.to_string_lossy().contains("swift"));
    }
    #[test]
    fn environment_overrides_are_read() {
        let paths = std::env::join_paths(["/opt/swift/lib", "/usr/local/lib"]).unwrap();
        let config = BindingConfig::from_lookup(lookup(&[
            (ENV_LIBRARY, "libswift_custom.so"),
            (ENV_LIBRARY_PATH, paths.to_str().unwrap()),
            (ENV_MAX_THREADS, " 4 "),
        ]));
        assert_eq!(config.library.as_deref(), Some("libswift_custom.so"));
        assert_eq!(
            config.search_dirs,
            vec![PathBuf::from("/opt/swift/lib"), PathBuf::from("/usr/local/lib")]
        );
        assert_eq!(config.max_threads, Some(4));
    }
    #[test]
    fn bad_thread_count_is_ignored() {
        let config = BindingConfig::from_lookup(lookup(&[(ENV_MAX_THREADS, "many")]));
        assert_eq!(config.max_threads, None);
        assert_eq!(config, BindingConfig::default());
    }
    #[test]
    fn json_file_with_partial_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"max_threads": 2, "log_likelihood_names": {{"variant": "mixture", "w": "weight"}}}}"#
        )
        .unwrap();
        let config = BindingConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.max_threads, Some(2));
        assert!(config.search_dirs.is_empty());
        match config.log_likelihood_names {
            Some(LogLikelihoodNames::Mixture(names)) => {
                assert_eq!(names.w, "weight");
                assert_eq!(names.s2, "s2");
            }
            other => panic!("unexpected names: {other:?}"),
        }
    }
    #[test]
    fn missing_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = BindingConfig::from_json_file(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, SwiftError::FileNotFound(_)));
    }
}
