//! FOCAS 戻り値（リターンコード）一覧とカテゴリ判定ユーティリティ
//!
//! ドライバの戻り値は符号付き整数で、0 が正常終了です。説明とカテゴリは
//! TOML から読み込み、`ErrorRegistry::from_str(...).register_or_merge()` で
//! グローバルレジストリへ登録します。登録が無い場合でも生の値はそのまま
//! 表示されます。

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::RwLock;

use crate::error::FocasError;

/// 正常終了 (EW_OK)
pub const EW_OK: i16 = 0;

/// Coarse classification of a driver return code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum ErrorCategory {
    Success,
    Communication,
    Library,
    Handle,
    System,
    Busy,
    Request,
    Controller,
    Unknown,
}

#[derive(Debug, Deserialize)]
struct ErrorCodeEntry {
    #[serde(deserialize_with = "parse_signed_code")]
    code: i16,
    name: Option<String>,
    description: Option<String>,
    category: Option<ErrorCategory>,
}

// serde helper: accept a signed integer, a decimal string or a "0x...." string
fn parse_signed_code<'de, D>(deserializer: D) -> Result<i16, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct V;
    impl serde::de::Visitor<'_> for V {
        type Value = i16;
        fn expecting(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "signed integer, or string like \"-8\" / \"0xNNNN\"")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            i16::try_from(v).map_err(|_| E::custom(format!("value out of range: {v}")))
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            i16::try_from(v).map_err(|_| E::custom(format!("value out of range: {v}")))
        }
        fn visit_str<E>(self, s: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            let s = s.trim();
            s.strip_prefix("0x").map_or_else(
                || {
                    s.parse::<i16>()
                        .map_err(|e| E::custom(format!("parse int: {e}")))
                },
                // hex is read as the 16-bit pattern so 0xFFF8 == -8
                |h| {
                    u16::from_str_radix(h, 16)
                        .map(|u| i16::from_le_bytes(u.to_le_bytes()))
                        .map_err(|e| E::custom(format!("parse hex: {e}")))
                },
            )
        }
    }
    deserializer.deserialize_any(V)
}

#[derive(Debug, Deserialize)]
struct ErrorCodesToml {
    #[serde(default)]
    codes: Vec<ErrorCodeEntry>,
}

#[derive(Clone, Debug)]
pub struct ErrorEntryOwned {
    pub code: i16,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<ErrorCategory>,
}

impl From<&ErrorCodeEntry> for ErrorEntryOwned {
    fn from(e: &ErrorCodeEntry) -> Self {
        Self {
            code: e.code,
            name: e.name.clone(),
            description: e.description.clone(),
            category: e.category,
        }
    }
}

/// In-memory handle for a parsed return-code TOML.
pub struct ErrorRegistry {
    codes: Vec<ErrorCodeEntry>,
}

impl ErrorRegistry {
    /// Parse a TOML string into an `ErrorRegistry`
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Result<Self, FocasError> {
        let parsed: ErrorCodesToml = toml::from_str(s).map_err(|e| {
            let s = e.to_string();
            FocasError::Config(format!("error codes parse error: {s}"))
        })?;
        Ok(Self {
            codes: parsed.codes,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, FocasError> {
        let s = fs::read_to_string(path).map_err(|e| {
            FocasError::Config(format!("read error codes {}: {e}", path.display()))
        })?;
        Self::from_str(&s)
    }

    /// The table embedded in the crate.
    pub fn embedded() -> Result<Self, FocasError> {
        Self::from_str(include_str!("error_codes.toml"))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Register parsed codes into the global registry. Fails if already set.
    pub fn register_codes(&self) -> Result<(), FocasError> {
        let map: HashMap<i16, ErrorEntryOwned> = self
            .codes
            .iter()
            .map(|e| (e.code, ErrorEntryOwned::from(e)))
            .collect();
        ERROR_REGISTRY
            .set(RwLock::new(map))
            .map_err(|_existing| FocasError::AlreadyRegistered)
    }

    /// Register parsed codes, merging into the global registry when it is
    /// already set. Later entries win for the same code.
    pub fn register_or_merge(&self) -> Result<(), FocasError> {
        match self.register_codes() {
            Ok(()) => Ok(()),
            Err(FocasError::AlreadyRegistered) => {
                let cell = ERROR_REGISTRY.get().ok_or_else(|| {
                    FocasError::Config("error registry inconsistent state".into())
                })?;
                let mut w = cell
                    .write()
                    .map_err(|_| FocasError::Config("error registry poisoned".into()))?;
                for e in &self.codes {
                    w.insert(e.code, ErrorEntryOwned::from(e));
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Convenience: parse from path and merge
    pub fn merge_from_path(path: &Path) -> Result<(), FocasError> {
        Self::from_path(path)?.register_or_merge()
    }
}

impl std::str::FromStr for ErrorRegistry {
    type Err = FocasError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ErrorRegistry::from_str(s)
    }
}

static ERROR_REGISTRY: OnceCell<RwLock<HashMap<i16, ErrorEntryOwned>>> = OnceCell::new();

fn get_global_registry(
) -> Option<std::sync::RwLockReadGuard<'static, HashMap<i16, ErrorEntryOwned>>> {
    ERROR_REGISTRY.get().and_then(|rw| rw.read().ok())
}

/// コード説明を返す（未登録なら None）
#[must_use]
pub fn code_description(code: i16) -> Option<String> {
    get_global_registry().and_then(|map| map.get(&code).and_then(|e| e.description.clone()))
}

/// Return the registered symbolic name (e.g. "EW_HANDLE") if available
#[must_use]
pub fn code_name(code: i16) -> Option<String> {
    get_global_registry().and_then(|map| map.get(&code).and_then(|e| e.name.clone()))
}

/// カテゴリ判定: 登録があればそれを優先、無ければ符号で大まかに分類
#[must_use]
pub fn code_category(code: i16) -> ErrorCategory {
    get_global_registry()
        .and_then(|map| map.get(&code).and_then(|e| e.category))
        .unwrap_or(match code {
            EW_OK => ErrorCategory::Success,
            _ => ErrorCategory::Unknown,
        })
}

/// Render a raw code for operators: the literal number, then
/// `(NAME: description)` when the code is registered.
#[must_use]
pub fn describe_code(code: i16) -> String {
    let name = code_name(code).unwrap_or_default();
    let desc = code_description(code).unwrap_or_default();
    if !name.is_empty() && !desc.is_empty() {
        format!("{code} ({name}: {desc})")
    } else if !name.is_empty() {
        format!("{code} ({name})")
    } else if !desc.is_empty() {
        format!("{code} ({desc})")
    } else {
        code.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_table_registers() {
        let reg = ErrorRegistry::embedded().expect("parse embedded table");
        assert!(!reg.is_empty());
        reg.register_or_merge().expect("register embedded codes");

        assert_eq!(code_name(-8), Some("EW_HANDLE".into()));
        assert_eq!(code_name(-16), Some("EW_SOCKET".into()));
        assert_eq!(code_category(-16), ErrorCategory::Communication);
        assert_eq!(code_category(0), ErrorCategory::Success);
    }

    #[test]
    fn hex_and_string_codes() {
        let toml = r#"
[[codes]]
code = "0xFFE0"
name = "TEST_HEX"

[[codes]]
code = "-31"
description = "string code"
category = "System"
"#;
        ErrorRegistry::from_str(toml)
            .expect("parse toml")
            .register_or_merge()
            .expect("register codes");
        assert_eq!(code_name(-32), Some("TEST_HEX".into()));
        assert_eq!(code_description(-31), Some("string code".into()));
        assert_eq!(code_category(-31), ErrorCategory::System);
    }

    #[test]
    fn out_of_range_code_rejected() {
        let toml = r#"
[[codes]]
code = 40000
"#;
        assert!(ErrorRegistry::from_str(toml).is_err());
    }

    #[test]
    fn describe_keeps_raw_code() {
        ErrorRegistry::embedded()
            .expect("parse embedded table")
            .register_or_merge()
            .expect("register embedded codes");
        let s = describe_code(-8);
        assert!(s.starts_with("-8 "));
        assert!(s.contains("EW_HANDLE"));
        assert_eq!(describe_code(-29999), "-29999");
    }
}
