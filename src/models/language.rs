/// 报告语言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize, Default)]
pub enum Language {
    /// 法语（主要工作语言）
    #[default]
    #[serde(rename = "fr")]
    French,
    /// 英语
    #[serde(rename = "en")]
    English,
}

impl Language {
    /// 获取语言代码
    pub fn code(self) -> &'static str {
        match self {
            Language::French => "fr",
            Language::English => "en",
        }
    }

    /// 从语言代码解析（不区分大小写）
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "fr" | "fra" | "french" | "français" => Some(Language::French),
            "en" | "eng" | "english" | "anglais" => Some(Language::English),
            _ => None,
        }
    }

    /// 第 7 节的标准标题
    pub fn section_header(self) -> &'static str {
        match self {
            Language::French => "7. Historique de faits et évolution",
            Language::English => "7. History of Facts and Clinical Evolution",
        }
    }

    /// 文件名后缀（法语无后缀）
    pub fn file_suffix(self) -> &'static str {
        match self {
            Language::French => "",
            Language::English => "_en",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_code() {
        assert_eq!(Language::from_code("fr"), Some(Language::French));
        assert_eq!(Language::from_code(" EN "), Some(Language::English));
        assert_eq!(Language::from_code("de"), None);
    }

    #[test]
    fn test_serde_uses_codes() {
        assert_eq!(
            serde_json::to_string(&Language::French).unwrap(),
            "\"fr\""
        );
    }
}
