//! Run configuration and the optional target manifest.

use std::collections::HashSet;
use std::fs;
use std::path::{Component, Path, PathBuf};

use preload_fetch::Timeouts;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::target::{AcquisitionTarget, builtin_targets};

/// Environment variable consulted when `--data-dir` is not given.
pub const DATA_DIR_ENV: &str = "PRELOAD_DATA_DIR";

/// Everything a run needs, built once at startup and passed down.
#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    /// TOML file replacing the built-in targets.
    pub manifest: Option<PathBuf>,
    /// Target names left out of this run.
    pub skip: Vec<String>,
    pub timeouts: Timeouts,
    pub retries: u32,
    pub progress: bool,
}

impl Config {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            manifest: None,
            skip: Vec::new(),
            timeouts: Timeouts::default(),
            retries: 0,
            progress: false,
        }
    }

    /// Resolve the targets for this run, honouring the manifest and `skip`.
    pub fn targets(&self) -> Result<Vec<AcquisitionTarget>> {
        let targets = match &self.manifest {
            Some(path) => Manifest::load(path)?.into_targets(&self.data_dir, path)?,
            None => builtin_targets(&self.data_dir),
        };

        for name in &self.skip {
            if !targets.iter().any(|t| &t.name == name) {
                tracing::warn!(target_name = %name, "--skip names an unknown target");
            }
        }

        Ok(targets
            .into_iter()
            .filter(|t| !self.skip.contains(&t.name))
            .collect())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(rename = "target", default)]
    pub targets: Vec<ManifestTarget>,
}

/// A `[[target]]` table. Paths are relative to the data directory.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestTarget {
    pub name: String,
    pub url: String,
    pub archive: PathBuf,
    #[serde(default)]
    pub extracted: Option<PathBuf>,
    #[serde(default)]
    pub sha256: Option<String>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::manifest(path, e))?;
        Self::parse(&text, path)
    }

    pub fn parse(text: &str, path: &Path) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::manifest(path, e))
    }

    /// Validate every entry and resolve its paths under `data_dir`.
    /// `source` is only used in error messages.
    pub fn into_targets(self, data_dir: &Path, source: &Path) -> Result<Vec<AcquisitionTarget>> {
        if self.targets.is_empty() {
            return Err(Error::manifest(source, "no [[target]] entries"));
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for entry in self.targets {
            if entry.name.is_empty() {
                return Err(Error::manifest(source, "target with empty name"));
            }
            if !seen.insert(entry.name.clone()) {
                return Err(Error::manifest(
                    source,
                    format!("duplicate target '{}'", entry.name),
                ));
            }
            if !(entry.url.starts_with("http://") || entry.url.starts_with("https://")) {
                return Err(Error::manifest(
                    source,
                    format!("target '{}': url must be http(s): {}", entry.name, entry.url),
                ));
            }

            check_relative(&entry.archive, &entry.name, source)?;
            if entry.archive.file_name().is_none() {
                return Err(Error::manifest(
                    source,
                    format!("target '{}': archive path has no file name", entry.name),
                ));
            }
            let mut target =
                AcquisitionTarget::new(&entry.name, &entry.url, data_dir.join(&entry.archive));

            if let Some(extracted) = &entry.extracted {
                check_relative(extracted, &entry.name, source)?;
                let extracted = data_dir.join(extracted);
                // Archives unpack into their own directory; anything else
                // could never become present.
                if extracted.parent() != Some(target.base_dir()) {
                    return Err(Error::manifest(
                        source,
                        format!(
                            "target '{}': extracted path must sit next to the archive",
                            entry.name
                        ),
                    ));
                }
                target = target.with_extracted(extracted);
            }

            if let Some(digest) = &entry.sha256 {
                let digest = preload_fetch::parse_sha256(digest).map_err(|e| {
                    Error::manifest(source, format!("target '{}': {e}", entry.name))
                })?;
                target = target.with_sha256(digest);
            }

            targets.push(target);
        }
        Ok(targets)
    }
}

fn check_relative(path: &Path, name: &str, source: &Path) -> Result<()> {
    let escapes = path.as_os_str().is_empty()
        || path.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
    if escapes {
        return Err(Error::manifest(
            source,
            format!(
                "target '{name}': path '{}' must be relative and stay inside the data directory",
                path.display()
            ),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MIRROR: &str = r#"
[[target]]
name = "reviews"
url = "https://mirror.example/aclImdb_v1.tar.gz"
archive = "dl4j_w2vSentiment/aclImdb_v1.tar.gz"
extracted = "dl4j_w2vSentiment/aclImdb"

[[target]]
name = "embeddings"
url = "https://mirror.example/vectors.bin.gz"
archive = "vectors.bin.gz"
sha256 = "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
"#;

    fn resolve(text: &str) -> Result<Vec<AcquisitionTarget>> {
        let source = Path::new("preload.toml");
        Manifest::parse(text, source)?.into_targets(Path::new("/data"), source)
    }

    #[test]
    fn manifest_resolves_under_data_dir() {
        let targets = resolve(MIRROR).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(
            targets[0].local_extracted_path.as_deref(),
            Some(Path::new("/data/dl4j_w2vSentiment/aclImdb"))
        );
        assert_eq!(targets[1].local_archive_path, Path::new("/data/vectors.bin.gz"));
        assert_eq!(targets[1].sha256.map(|d| d[0]), Some(0xb9));
    }

    #[test]
    fn rejects_escaping_paths() {
        let text = r#"
[[target]]
name = "bad"
url = "https://host/x"
archive = "../outside.bin"
"#;
        assert!(matches!(resolve(text), Err(Error::InvalidManifest { .. })));

        let text = r#"
[[target]]
name = "bad"
url = "https://host/x"
archive = "/etc/x.bin"
"#;
        assert!(matches!(resolve(text), Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn rejects_extracted_elsewhere() {
        let text = r#"
[[target]]
name = "bad"
url = "https://host/x.tar.gz"
archive = "a/x.tar.gz"
extracted = "b/x"
"#;
        assert!(matches!(resolve(text), Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn rejects_duplicates_and_unknown_fields() {
        let dup = format!("{MIRROR}\n[[target]]\nname = \"reviews\"\nurl = \"https://h/x\"\narchive = \"x\"\n");
        assert!(matches!(resolve(&dup), Err(Error::InvalidManifest { .. })));

        let unknown = "[[target]]\nname = \"x\"\nurl = \"https://h/x\"\narchive = \"x\"\nmirror = true\n";
        assert!(matches!(resolve(unknown), Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn rejects_bad_digest_and_scheme() {
        let digest = "[[target]]\nname = \"x\"\nurl = \"https://h/x\"\narchive = \"x\"\nsha256 = \"zz\"\n";
        assert!(matches!(resolve(digest), Err(Error::InvalidManifest { .. })));

        let scheme = "[[target]]\nname = \"x\"\nurl = \"ftp://h/x\"\narchive = \"x\"\n";
        assert!(matches!(resolve(scheme), Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn empty_manifest_is_invalid() {
        assert!(matches!(resolve(""), Err(Error::InvalidManifest { .. })));
    }

    #[test]
    fn skip_filters_builtin_targets() {
        let mut config = Config::new("/data");
        config.skip = vec!["cifar".into(), "nonexistent".into()];
        let names: Vec<_> = config.targets().unwrap().into_iter().map(|t| t.name).collect();
        assert_eq!(names, ["embeddings", "reviews"]);
    }

    #[test]
    fn manifest_file_replaces_builtins() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preload.toml");
        fs::write(&path, MIRROR).unwrap();
        let mut config = Config::new(dir.path());
        config.manifest = Some(path);

        let targets = config.targets().unwrap();
        assert_eq!(targets[0].name, "reviews");
        assert!(targets[0].local_archive_path.starts_with(dir.path()));
    }

    #[test]
    fn missing_manifest_file_is_invalid() {
        let mut config = Config::new("/data");
        config.manifest = Some(PathBuf::from("/definitely/not/here.toml"));
        assert!(matches!(config.targets(), Err(Error::InvalidManifest { .. })));
    }
}
