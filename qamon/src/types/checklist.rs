//! チェックリスト型定義
//!
//! 起動時に一度だけ読み込まれるQAチェックリスト（モジュール・テスト）の型。
//! 結果ファイルも同じ形状で書き出すため、未知のフィールドは保持する。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::fmt;

use crate::common::error::MonitorError;

/// 識別キーの区切り文字
pub const IDENTITY_SEPARATOR: &str = "::";

/// テストの自動化種別
///
/// `Automated` 以外のテストはループで評価されない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AutomationType {
    /// ループで自動実行する
    Automated,
    /// 手動確認（ループはスキップ）
    Manual,
    /// 未知の値（そのまま保持する）
    Other(String),
}

impl From<String> for AutomationType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Automated" => Self::Automated,
            "Manual" => Self::Manual,
            _ => Self::Other(value),
        }
    }
}

impl From<AutomationType> for String {
    fn from(value: AutomationType) -> Self {
        match value {
            AutomationType::Automated => "Automated".to_string(),
            AutomationType::Manual => "Manual".to_string(),
            AutomationType::Other(other) => other,
        }
    }
}

/// レスポンス判定モード
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckType {
    /// 完全一致
    Exact,
    /// 部分一致
    Contains,
    /// 上限チェック
    Range,
    /// 上限チェック + 列挙チェック
    RangeContains,
    /// 未知のモード（常に失敗扱い）
    Unknown(String),
}

impl CheckType {
    /// JSON上の表記
    pub fn as_str(&self) -> &str {
        match self {
            Self::Exact => "exact",
            Self::Contains => "contains",
            Self::Range => "range",
            Self::RangeContains => "range_contains",
            Self::Unknown(other) => other,
        }
    }
}

impl From<String> for CheckType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "exact" => Self::Exact,
            "contains" => Self::Contains,
            "range" => Self::Range,
            "range_contains" => Self::RangeContains,
            _ => Self::Unknown(value),
        }
    }
}

impl From<CheckType> for String {
    fn from(value: CheckType) -> Self {
        match value {
            CheckType::Unknown(other) => other,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// テスト結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PassFail {
    /// 合格
    #[serde(rename = "PASS")]
    Pass,
    /// 不合格
    #[serde(rename = "FAIL")]
    Fail,
}

impl PassFail {
    /// JSON上の表記
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pass => "PASS",
            Self::Fail => "FAIL",
        }
    }

    /// 判定結果から変換
    pub fn from_passed(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail
        }
    }
}

impl fmt::Display for PassFail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_expected_response() -> Value {
    Value::Object(Map::new())
}

/// 単一のQAテスト
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestCase {
    /// テストケース名（モジュール内で一意）
    pub test_case: String,
    /// プレースホルダ付きのAPIパス
    #[serde(default)]
    pub api_endpoint: String,
    /// 自動化種別
    #[serde(default)]
    pub automation_type: Option<AutomationType>,
    /// 期待レスポンス
    #[serde(default = "default_expected_response")]
    pub expected_response: Value,
    /// 判定モード
    #[serde(default)]
    pub check_type: Option<CheckType>,
    /// 直近の結果
    #[serde(default)]
    pub pass_fail: Option<PassFail>,
    /// 診断メッセージ
    #[serde(default)]
    pub notes: String,
    /// その他のフィールド（結果ファイルへそのまま書き戻す）
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TestCase {
    /// ループで評価対象となるか
    pub fn is_automated(&self) -> bool {
        matches!(self.automation_type, Some(AutomationType::Automated))
    }
}

/// テストをまとめるモジュール
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    /// モジュール名
    #[serde(rename = "module")]
    pub name: String,
    /// テスト一覧（定義順）
    #[serde(default)]
    pub tests: Vec<TestCase>,
    /// その他のフィールド
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// チェックリスト全体
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checklist(pub Vec<Module>);

/// テストの識別キーを生成する
pub fn identity_key(module: &str, test_case: &str) -> String {
    format!("{module}{IDENTITY_SEPARATOR}{test_case}")
}

impl Checklist {
    /// JSONからパースし、識別キーの一意性を検証する
    pub fn from_json(content: &str) -> Result<Self, MonitorError> {
        let checklist: Checklist = serde_json::from_str(content)?;
        checklist.validate()?;
        Ok(checklist)
    }

    /// 識別キーが全体で一意であることを確認
    pub fn validate(&self) -> Result<(), MonitorError> {
        let mut seen = HashSet::new();
        for module in &self.0 {
            for test in &module.tests {
                let key = identity_key(&module.name, &test.test_case);
                if !seen.insert(key.clone()) {
                    return Err(MonitorError::DuplicateTest(key));
                }
            }
        }
        Ok(())
    }

    /// モジュール一覧
    pub fn modules(&self) -> &[Module] {
        &self.0
    }

    /// (モジュール名, テスト) を定義順に列挙
    pub fn tests(&self) -> impl Iterator<Item = (&str, &TestCase)> {
        self.0
            .iter()
            .flat_map(|m| m.tests.iter().map(move |t| (m.name.as_str(), t)))
    }

    /// テストの総数
    pub fn test_count(&self) -> usize {
        self.0.iter().map(|m| m.tests.len()).sum()
    }

    /// 指定した結果を持つテスト数（手動テストを含む）
    pub fn count_status(&self, status: PassFail) -> usize {
        self.tests()
            .filter(|(_, t)| t.pass_fail == Some(status))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_json() -> String {
        json!([
            {
                "module": "Users",
                "tests": [
                    {
                        "test_case": "Get user",
                        "api_endpoint": "/users/{user_id}",
                        "automation_type": "Automated",
                        "expected_response": {"id": 123},
                        "check_type": "contains",
                        "owner": "qa-team"
                    },
                    {
                        "test_case": "Visual review",
                        "api_endpoint": "",
                        "automation_type": "Manual",
                        "pass_fail": "PASS",
                        "notes": "checked by hand"
                    }
                ]
            }
        ])
        .to_string()
    }

    #[test]
    fn test_parse_checklist() {
        let checklist = Checklist::from_json(&sample_json()).unwrap();
        assert_eq!(checklist.modules().len(), 1);
        assert_eq!(checklist.test_count(), 2);

        let (module, first) = checklist.tests().next().unwrap();
        assert_eq!(module, "Users");
        assert!(first.is_automated());
        assert_eq!(first.check_type, Some(CheckType::Contains));
        assert_eq!(first.pass_fail, None);
        assert_eq!(first.notes, "");
    }

    #[test]
    fn test_manual_fields_preserved() {
        let checklist = Checklist::from_json(&sample_json()).unwrap();
        let manual = &checklist.modules()[0].tests[1];
        assert!(!manual.is_automated());
        assert_eq!(manual.automation_type, Some(AutomationType::Manual));
        assert_eq!(manual.pass_fail, Some(PassFail::Pass));
        assert_eq!(manual.notes, "checked by hand");
    }

    #[test]
    fn test_extra_fields_round_trip() {
        let checklist = Checklist::from_json(&sample_json()).unwrap();
        let value = serde_json::to_value(&checklist).unwrap();
        assert_eq!(value[0]["module"], "Users");
        assert_eq!(value[0]["tests"][0]["owner"], "qa-team");
        assert_eq!(value[0]["tests"][0]["check_type"], "contains");
        assert_eq!(value[0]["tests"][0]["pass_fail"], Value::Null);
    }

    #[test]
    fn test_unknown_check_type_is_kept() {
        let ct: CheckType = serde_json::from_value(json!("fuzzy")).unwrap();
        assert_eq!(ct, CheckType::Unknown("fuzzy".to_string()));
        assert_eq!(serde_json::to_value(&ct).unwrap(), json!("fuzzy"));
    }

    #[test]
    fn test_duplicate_identity_rejected() {
        let content = json!([
            {"module": "A", "tests": [{"test_case": "x"}]},
            {"module": "A", "tests": [{"test_case": "x"}]}
        ])
        .to_string();
        match Checklist::from_json(&content) {
            Err(MonitorError::DuplicateTest(key)) => assert_eq!(key, "A::x"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_identity_key_format() {
        assert_eq!(identity_key("Auth", "Login"), "Auth::Login");
    }

    #[test]
    fn test_count_status() {
        let checklist = Checklist::from_json(&sample_json()).unwrap();
        assert_eq!(checklist.count_status(PassFail::Pass), 1);
        assert_eq!(checklist.count_status(PassFail::Fail), 0);
    }
}
