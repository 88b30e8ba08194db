//! Query classifier: routes a free-text query to a [`Category`].
//!
//! Rules form an ordered list. Each rule names a category and a list of
//! regex patterns; the first rule with a pattern found anywhere in the query
//! (case-insensitive) decides the category. Rule order is therefore the
//! priority order: a query about lunch with a friend is `food`, because the
//! food rule comes before the relation rule.
//!
//! Queries that match nothing are [`Category::Default`].

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};
use serde::Deserialize;
use tracing::debug;

use crate::error::ClassifierError;
use crate::models::Category;

/// Surname, optional given-name character, then an honorific (`张哥`, `李丽姐`).
///
/// Group 1 is the name without the honorific.
pub const HONORIFIC_NAME_PATTERN: &str = concat!(
    r"([刘杨张王李黄何廖吕高邱赵陈林郭]",
    r"[峰浩宇洋明杰磊雨泽涛鹏军辉伟丽芳娜婷]?)\s*[哥姐]"
);

/// [`HONORIFIC_NAME_PATTERN`], compiled once.
pub static HONORIFIC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HONORIFIC_NAME_PATTERN).unwrap());

/// One `(category, patterns)` pair of the classifier's ordered rule list.
#[derive(Debug, Clone, Deserialize)]
pub struct ClassifierRule {
    pub category: Category,
    pub patterns: Vec<String>,
}

impl ClassifierRule {
    pub fn new(category: Category, patterns: &[&str]) -> Self {
        Self {
            category,
            patterns: patterns.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Built-in rules in priority order.
    pub fn defaults() -> Vec<ClassifierRule> {
        vec![
            ClassifierRule::new(
                Category::Food,
                &[
                    "吃的|吃了|吃什么|午饭|晚饭|早餐|早饭|中午|晚上|宵夜|点外卖|吃饭",
                    "菜|味道|好吃|难吃",
                    "食谱|菜谱|做法|配料|调味",
                    r"\b(lunch|dinner|breakfast|meal|recipe|eat|ate)\b",
                ],
            ),
            ClassifierRule::new(
                Category::Training,
                &[
                    "训练|运动|健身|爬山|攀岩|跑步|跳绳|力量|练肌肉|器材|场地|消耗|卡路里|体重",
                    "桌球|台球|羽毛球|篮球|足球|游戏",
                    r"\b(workout|training|exercise|gym|running|climbing)\b",
                ],
            ),
            ClassifierRule::new(
                Category::Relation,
                &[
                    "朋友|认识|社交|聚会|关系",
                    "父母|家人|回家|视频",
                    HONORIFIC_NAME_PATTERN,
                    r"\b(friends?|family|parents)\b",
                ],
            ),
            ClassifierRule::new(
                Category::Pet,
                &["悠悠|yoyo|狗|宠物|泰迪|汪汪", r"\b(pets?|dogs?|puppy)\b"],
            ),
            ClassifierRule::new(
                Category::System,
                &[
                    "系统|配置|bug|报错|崩溃|重启|openclaw|gateway|机器人",
                    r"\b(config|crash|restart|error)\b",
                ],
            ),
            ClassifierRule::new(
                Category::Mood,
                &[
                    "心情|开心|难过|生气|焦虑|想骂人|吐槽",
                    r"\b(mood|happy|sad|angry|anxious)\b",
                ],
            ),
            ClassifierRule::new(
                Category::Companion,
                &["莫莫咖|momonga|飞鼠|可爱|夸奖|抱抱|亲亲|干嘛|为什么"],
            ),
            ClassifierRule::new(
                Category::Project,
                &[
                    "项目|工作|开发|代码|git|commit|push|pull|修复",
                    r"\b(project|work|code|deploy)\b",
                ],
            ),
        ]
    }
}

/// Appends an alternation of `names` to the first relation rule so queries
/// naming a known person classify as [`Category::Relation`].
///
/// Names are regex-escaped and tried longest first.
pub fn add_entity_names(rules: &mut [ClassifierRule], names: &[String]) {
    let Some(pattern) = names_pattern(names) else {
        return;
    };
    if let Some(rule) = rules.iter_mut().find(|r| r.category == Category::Relation) {
        rule.patterns.push(pattern);
    }
}

fn names_pattern(names: &[String]) -> Option<String> {
    let mut names: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return None;
    }
    names.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()).then(a.cmp(b)));
    names.dedup();
    let escaped: Vec<String> = names.iter().map(|n| regex::escape(n)).collect();
    Some(format!("({})", escaped.join("|")))
}

#[derive(Debug, Clone)]
pub struct QueryClassifier {
    rules: Vec<(Category, Vec<Regex>)>,
}

impl Default for QueryClassifier {
    fn default() -> Self {
        Self::new(&ClassifierRule::defaults()).expect("built-in classifier patterns compile")
    }
}

impl QueryClassifier {
    /// Compiles `rules` case-insensitively, keeping their order.
    pub fn new(rules: &[ClassifierRule]) -> Result<Self, ClassifierError> {
        let mut compiled = Vec::with_capacity(rules.len());
        for rule in rules {
            let mut regexes = Vec::with_capacity(rule.patterns.len());
            for pattern in &rule.patterns {
                let re = RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| ClassifierError::InvalidPattern {
                        category: rule.category,
                        pattern: pattern.clone(),
                        source,
                    })?;
                regexes.push(re);
            }
            compiled.push((rule.category, regexes));
        }
        Ok(Self { rules: compiled })
    }

    /// Categories in priority order.
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.rules.iter().map(|(c, _)| *c)
    }

    pub fn classify(&self, query: &str) -> Category {
        for (category, patterns) in &self.rules {
            if let Some(re) = patterns.iter().find(|re| re.is_match(query)) {
                debug!(%category, pattern = re.as_str(), "query classified");
                return *category;
            }
        }
        debug!("query matched no rule");
        Category::Default
    }
}
