//! 提示词工件解析器 - 基础设施层
//!
//! 持有提示词目录，只暴露"按语言和版本取回三个工件"的能力。
//!
//! 目录结构：
//! ```text
//! prompts/
//! ├── section7/manifest.toml          （可选）
//! ├── section7_master.md              主指令（法语）
//! ├── section7_master.json            规则配置（法语）
//! ├── section7_golden_example.md      参考示例（法语）
//! └── section7_master_en.md ...       英语版本带 `_en` 后缀
//! ```
//!
//! manifest 示例：
//! ```toml
//! default_version = "v1"
//!
//! [versions.v1.fr]
//! master = "section7/v1/section7_master.md"
//! rules = "section7/v1/section7_master.json"
//! golden = "section7/v1/section7_golden_example.md"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PromptError;
use crate::models::{ArtifactKind, Language, PromptBundle};

/// 未使用 manifest 版本时 `version_used` 的取值
pub const NO_VERSION: &str = "none";

const MANIFEST_PATH: &str = "section7/manifest.toml";

/// 提示词工件解析器
pub trait PromptBundleResolver: Send + Sync {
    /// 取回某语言（可选版本）的三个工件，任何一个缺失都是错误
    fn resolve(
        &self,
        language: Language,
        version: Option<&str>,
    ) -> Result<PromptBundle, PromptError>;
}

/// 单个语言版本的三个工件路径（相对提示词目录）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ArtifactPaths {
    pub master: PathBuf,
    pub rules: PathBuf,
    pub golden: PathBuf,
}

impl ArtifactPaths {
    fn defaults(language: Language) -> Self {
        let suffix = language.file_suffix();
        Self {
            master: PathBuf::from(format!("section7_master{}.md", suffix)),
            rules: PathBuf::from(format!("section7_master{}.json", suffix)),
            golden: PathBuf::from(format!("section7_golden_example{}.md", suffix)),
        }
    }

    fn get(&self, kind: ArtifactKind) -> &Path {
        match kind {
            ArtifactKind::Master => &self.master,
            ArtifactKind::Rules => &self.rules,
            ArtifactKind::Golden => &self.golden,
        }
    }
}

/// `section7/manifest.toml`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    pub default_version: Option<String>,
    /// 版本 → 语言代码 → 工件路径
    #[serde(default)]
    pub versions: BTreeMap<String, BTreeMap<String, ArtifactPaths>>,
}

/// 某语言工件的可用状态
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BundleStatus {
    pub language: Language,
    pub version: String,
    pub master_document: bool,
    pub rules_config: bool,
    pub reference_example: bool,
}

impl BundleStatus {
    /// 三个工件都存在才可用
    pub fn is_operational(&self) -> bool {
        self.master_document && self.rules_config && self.reference_example
    }
}

/// 基于文件系统的解析器
#[derive(Debug, Clone)]
pub struct FileBundleResolver {
    root: PathBuf,
}

impl FileBundleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load_manifest(&self) -> Result<Option<Manifest>, PromptError> {
        let path = self.root.join(MANIFEST_PATH);
        if !path.is_file() {
            return Ok(None);
        }
        let raw = std::fs::read_to_string(&path).map_err(|source| PromptError::ArtifactReadFailed {
            path: path.clone(),
            source,
        })?;
        toml::from_str(&raw)
            .map(Some)
            .map_err(|source| PromptError::ManifestInvalid { path, source })
    }

    /// 确定工件路径与实际使用的版本
    fn locate(
        &self,
        language: Language,
        version: Option<&str>,
    ) -> Result<(ArtifactPaths, String), PromptError> {
        let manifest = self.load_manifest()?;
        let requested = version
            .map(str::to_string)
            .or_else(|| manifest.as_ref().and_then(|m| m.default_version.clone()));

        let Some(version) = requested else {
            return Ok((ArtifactPaths::defaults(language), NO_VERSION.to_string()));
        };

        let entry = manifest
            .as_ref()
            .and_then(|m| m.versions.get(&version))
            .ok_or_else(|| PromptError::UnknownVersion {
                version: version.clone(),
            })?;

        let paths = entry
            .get(language.code())
            .cloned()
            .ok_or_else(|| PromptError::ArtifactMissing {
                language,
                kind: ArtifactKind::Master,
                path: self.root.join(MANIFEST_PATH),
            })?;

        Ok((paths, version))
    }

    fn read_artifact(
        &self,
        language: Language,
        kind: ArtifactKind,
        relative: &Path,
    ) -> Result<String, PromptError> {
        let path = self.root.join(relative);
        if !path.is_file() {
            return Err(PromptError::ArtifactMissing {
                language,
                kind,
                path,
            });
        }
        std::fs::read_to_string(&path)
            .map_err(|source| PromptError::ArtifactReadFailed { path, source })
    }

    /// 报告某语言（默认版本）的工件是否齐全
    pub fn status(&self, language: Language) -> Result<BundleStatus, PromptError> {
        let (paths, version) = self.locate(language, None)?;
        let exists = |kind: ArtifactKind| self.root.join(paths.get(kind)).is_file();

        Ok(BundleStatus {
            language,
            version,
            master_document: exists(ArtifactKind::Master),
            rules_config: exists(ArtifactKind::Rules),
            reference_example: exists(ArtifactKind::Golden),
        })
    }
}

impl PromptBundleResolver for FileBundleResolver {
    fn resolve(
        &self,
        language: Language,
        version: Option<&str>,
    ) -> Result<PromptBundle, PromptError> {
        let (paths, version_used) = self.locate(language, version)?;
        debug!(
            "解析提示词工件: 语言 {}, 版本 {}, 目录 {}",
            language,
            version_used,
            self.root.display()
        );

        Ok(PromptBundle {
            master_document: self.read_artifact(language, ArtifactKind::Master, &paths.master)?,
            rules_config: self.read_artifact(language, ArtifactKind::Rules, &paths.rules)?,
            reference_example: self.read_artifact(language, ArtifactKind::Golden, &paths.golden)?,
            version_used,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    fn default_layout(root: &Path) {
        write(root, "section7_master.md", "# Maître FR");
        write(root, "section7_master.json", "{}");
        write(root, "section7_golden_example.md", "Exemple FR");
    }

    #[test]
    fn test_resolves_default_filenames_without_manifest() {
        let dir = TempDir::new().unwrap();
        default_layout(dir.path());

        let bundle = FileBundleResolver::new(dir.path())
            .resolve(Language::French, None)
            .unwrap();
        assert_eq!(bundle.master_document, "# Maître FR");
        assert_eq!(bundle.version_used, NO_VERSION);
    }

    #[test]
    fn test_missing_artifact_is_distinguishable() {
        let dir = TempDir::new().unwrap();
        default_layout(dir.path());

        let err = FileBundleResolver::new(dir.path())
            .resolve(Language::English, None)
            .unwrap_err();
        match err {
            PromptError::ArtifactMissing { kind, language, .. } => {
                assert_eq!(kind, ArtifactKind::Master);
                assert_eq!(language, Language::English);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_manifest_versions() {
        let dir = TempDir::new().unwrap();
        write(
            dir.path(),
            MANIFEST_PATH,
            r#"
default_version = "v2"

[versions.v2.fr]
master = "section7/v2/master.md"
rules = "section7/v2/rules.json"
golden = "section7/v2/golden.md"
"#,
        );
        write(dir.path(), "section7/v2/master.md", "# v2");
        write(dir.path(), "section7/v2/rules.json", "{}");
        write(dir.path(), "section7/v2/golden.md", "golden v2");

        let resolver = FileBundleResolver::new(dir.path());
        let bundle = resolver.resolve(Language::French, None).unwrap();
        assert_eq!(bundle.master_document, "# v2");
        assert_eq!(bundle.version_used, "v2");

        let err = resolver.resolve(Language::French, Some("v9")).unwrap_err();
        assert!(matches!(err, PromptError::UnknownVersion { .. }));
    }

    #[test]
    fn test_malformed_manifest() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), MANIFEST_PATH, "default_version = [");
        let err = FileBundleResolver::new(dir.path())
            .resolve(Language::French, None)
            .unwrap_err();
        assert!(matches!(err, PromptError::ManifestInvalid { .. }));
    }

    #[test]
    fn test_status_reports_each_artifact() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "section7_master_en.md", "# Master EN");

        let status = FileBundleResolver::new(dir.path())
            .status(Language::English)
            .unwrap();
        assert!(status.master_document);
        assert!(!status.rules_config);
        assert!(!status.is_operational());
    }
}
