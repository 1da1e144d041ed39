//! Vehicle catalog models

use serde::{Deserialize, Deserializer, Serialize};

use super::user::RecordId;

/// 车队分类，"All" 表示不过滤
pub const CATEGORY_ALL: &str = "All";

/// 车队页面固定的分类列表
pub const CATEGORIES: [&str; 5] = [CATEGORY_ALL, "Luxury Sedan", "SUV", "Limousine", "Van"];

/// 车辆（服务端状态的只读投影）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: RecordId,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    /// 载客量，线上可能是数字或 "4 passengers" 这样的文本
    #[serde(default, deserialize_with = "string_or_number")]
    pub capacity: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl Vehicle {
    /// 分类是否匹配（大小写不敏感，"All" 匹配一切）
    pub fn in_category(&self, category: &str) -> bool {
        category.eq_ignore_ascii_case(CATEGORY_ALL) || self.category.eq_ignore_ascii_case(category)
    }

    /// 名称是否包含查询串（大小写不敏感，空串匹配一切）
    pub fn name_contains(&self, query: &str) -> bool {
        self.name.to_lowercase().contains(&query.to_lowercase())
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    }))
}
