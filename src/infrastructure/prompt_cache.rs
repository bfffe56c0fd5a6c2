//! 提示词缓存 - 基础设施层
//!
//! 按 (语言, 工件种类) 缓存工件文本。每个键只填充一次、从不淘汰；
//! 并发填充同一个键时写入的是同一份内容，后写覆盖先写无害。

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use tracing::info;

use crate::error::PromptError;
use crate::infrastructure::PromptBundleResolver;
use crate::models::{ArtifactKind, Language, PromptBundle};

#[derive(Debug, Clone)]
struct CachedArtifact {
    content: String,
    version: String,
}

/// 读多写少的提示词缓存
#[derive(Debug, Default)]
pub struct PromptCache {
    entries: RwLock<HashMap<(Language, ArtifactKind), CachedArtifact>>,
}

impl PromptCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取回某语言的工件；缺少任一种类时调用一次解析器填充全部三种
    pub fn get_or_load(
        &self,
        language: Language,
        version: Option<&str>,
        resolver: &dyn PromptBundleResolver,
    ) -> Result<PromptBundle, PromptError> {
        if let Some(bundle) = self.cached(language) {
            return Ok(bundle);
        }

        let bundle = resolver.resolve(language, version)?;
        info!(
            "📄 已加载提示词工件: 语言 {}, 版本 {}",
            language, bundle.version_used
        );

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        for kind in ArtifactKind::ALL {
            entries.insert(
                (language, kind),
                CachedArtifact {
                    content: bundle.artifact(kind).to_string(),
                    version: bundle.version_used.clone(),
                },
            );
        }

        Ok(bundle)
    }

    fn cached(&self, language: Language) -> Option<PromptBundle> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let get = |kind: ArtifactKind| entries.get(&(language, kind));

        let master = get(ArtifactKind::Master)?;
        let rules = get(ArtifactKind::Rules)?;
        let golden = get(ArtifactKind::Golden)?;

        Some(PromptBundle {
            master_document: master.content.clone(),
            rules_config: rules.content.clone(),
            reference_example: golden.content.clone(),
            version_used: master.version.clone(),
        })
    }

    /// 已缓存的条目数
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 清空缓存（测试用）
    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
