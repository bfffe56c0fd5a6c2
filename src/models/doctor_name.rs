use serde::Serialize;

/// 去除变音符号用的映射表
static DIACRITIC_FOLD: phf::Map<char, char> = phf::phf_map! {
    'à' => 'a', 'á' => 'a', 'â' => 'a', 'ã' => 'a', 'ä' => 'a', 'å' => 'a',
    'ç' => 'c',
    'è' => 'e', 'é' => 'e', 'ê' => 'e', 'ë' => 'e',
    'ì' => 'i', 'í' => 'i', 'î' => 'i', 'ï' => 'i',
    'ñ' => 'n',
    'ò' => 'o', 'ó' => 'o', 'ô' => 'o', 'õ' => 'o', 'ö' => 'o', 'ø' => 'o',
    'ù' => 'u', 'ú' => 'u', 'û' => 'u', 'ü' => 'u',
    'ý' => 'y', 'ÿ' => 'y',
    '’' => '\'',
};

/// 比较用的规范化：小写并去除变音符号
pub fn normalize_for_comparison(value: &str) -> String {
    value
        .chars()
        .flat_map(char::to_lowercase)
        .map(|c| DIACRITIC_FOLD.get(&c).copied().unwrap_or(c))
        .collect()
}

/// 从文本中识别出的医生姓名
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorName {
    /// 原文中的完整写法（头衔 + 姓名）
    pub full_text: String,
    /// 头衔（小写，如 "docteur"、"dr."）
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub specialty: Option<String>,
    /// 同时具有名和姓
    pub is_complete: bool,
}

impl DoctorName {
    /// 由头衔和头衔之后的姓名片段构建
    ///
    /// 第一个词是名，其余部分拼接为姓；至少两个词才算完整。
    pub fn from_parts(title: &str, name: &str, specialty: Option<&str>) -> Self {
        let tokens: Vec<&str> = name.split_whitespace().collect();
        let first_name = tokens.first().copied().unwrap_or_default().to_string();
        let last_name = tokens.get(1..).map(|t| t.join(" ")).unwrap_or_default();

        Self {
            full_text: format!("{} {}", title, tokens.join(" ")),
            title: title.to_lowercase(),
            first_name,
            last_name,
            specialty: specialty
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            is_complete: tokens.len() >= 2,
        }
    }

    /// 去重用的身份标识（规范化后的名、姓）
    pub fn identity(&self) -> (String, String) {
        (
            normalize_for_comparison(&self.first_name),
            normalize_for_comparison(&self.last_name),
        )
    }

    /// 判断两个记录是否为同一人
    pub fn same_identity(&self, other: &DoctorName) -> bool {
        self.identity() == other.identity()
    }

    /// 不完整姓名中唯一的那个词
    pub fn single_token(&self) -> Option<&str> {
        if self.is_complete || self.first_name.is_empty() {
            None
        } else {
            Some(&self.first_name)
        }
    }

    /// 不完整姓名是否与某个完整姓名共享名或姓
    pub fn is_partial_of(&self, complete: &DoctorName) -> bool {
        match self.single_token() {
            Some(token) => {
                let token = normalize_for_comparison(token);
                token == normalize_for_comparison(&complete.first_name)
                    || token == normalize_for_comparison(&complete.last_name)
            }
            None => false,
        }
    }

    /// 不含头衔的姓名
    pub fn display_name(&self) -> String {
        if self.last_name.is_empty() {
            self.first_name.clone()
        } else {
            format!("{} {}", self.first_name, self.last_name)
        }
    }
}

impl std::fmt::Display for DoctorName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.full_text)
    }
}
