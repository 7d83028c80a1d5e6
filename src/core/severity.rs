//! 日志严重级别
//!
//! 定义有序的严重级别枚举：DEBUG < INFO < WARNING < ERROR < CRITICAL。

use crate::error::SplitLogError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::Level;

/// 日志严重级别
///
/// 数值与常见日志库保持一致（10 的倍数），便于从数值配置解析。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Severity {
    Debug,
    Info,
    Warning,
    Error,
    Critical,
}

impl Severity {
    /// 全部级别，按从低到高排列
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// 级别名称（大写）
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        }
    }

    /// 级别数值
    pub fn value(self) -> u8 {
        match self {
            Severity::Debug => 10,
            Severity::Info => 20,
            Severity::Warning => 30,
            Severity::Error => 40,
            Severity::Critical => 50,
        }
    }

    /// 是否携带异常信息（ERROR 及以上）
    pub fn carries_exception(self) -> bool {
        self >= Severity::Error
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = SplitLogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_uppercase().as_str() {
            "DEBUG" | "10" => Ok(Severity::Debug),
            "INFO" | "20" => Ok(Severity::Info),
            "WARNING" | "WARN" | "30" => Ok(Severity::Warning),
            "ERROR" | "40" => Ok(Severity::Error),
            "CRITICAL" | "FATAL" | "50" => Ok(Severity::Critical),
            _ => Err(SplitLogError::invalid_level(trimmed)),
        }
    }
}

impl TryFrom<String> for Severity {
    type Error = SplitLogError;

    fn try_from(value: String) -> Result<Self, SplitLogError> {
        value.parse()
    }
}

impl TryFrom<u8> for Severity {
    type Error = SplitLogError;

    fn try_from(value: u8) -> Result<Self, SplitLogError> {
        Severity::ALL
            .into_iter()
            .find(|s| s.value() == value)
            .ok_or_else(|| SplitLogError::invalid_level(value.to_string()))
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

// TRACE 没有对应级别，并入 DEBUG
impl From<Level> for Severity {
    fn from(level: Level) -> Self {
        match level {
            Level::ERROR => Severity::Error,
            Level::WARN => Severity::Warning,
            Level::INFO => Severity::Info,
            _ => Severity::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering() {
        assert!(Severity::Debug < Severity::Info);
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
        assert!(Severity::Error < Severity::Critical);

        let mut sorted = Severity::ALL;
        sorted.sort();
        assert_eq!(sorted, Severity::ALL);
    }

    #[test]
    fn test_parse_names_and_aliases() {
        assert_eq!("debug".parse::<Severity>().unwrap(), Severity::Debug);
        assert_eq!(" Info ".parse::<Severity>().unwrap(), Severity::Info);
        assert_eq!("WARN".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("warning".parse::<Severity>().unwrap(), Severity::Warning);
        assert_eq!("fatal".parse::<Severity>().unwrap(), Severity::Critical);
        assert_eq!("40".parse::<Severity>().unwrap(), Severity::Error);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        let err = "VERBOSE".parse::<Severity>().unwrap_err();
        assert!(matches!(err, SplitLogError::InvalidLogLevel(ref s) if s == "VERBOSE"));
        assert!("".parse::<Severity>().is_err());
        assert!(Severity::try_from(15u8).is_err());
    }

    #[test]
    fn test_numeric_round_trip() {
        for severity in Severity::ALL {
            assert_eq!(Severity::try_from(severity.value()).unwrap(), severity);
        }
    }

    #[test]
    fn test_from_tracing_level() {
        assert_eq!(Severity::from(Level::TRACE), Severity::Debug);
        assert_eq!(Severity::from(Level::DEBUG), Severity::Debug);
        assert_eq!(Severity::from(Level::INFO), Severity::Info);
        assert_eq!(Severity::from(Level::WARN), Severity::Warning);
        assert_eq!(Severity::from(Level::ERROR), Severity::Error);
    }

    #[test]
    fn test_serde_as_string() {
        let json = serde_json::to_string(&Severity::Warning).unwrap();
        assert_eq!(json, "\"WARNING\"");
        let parsed: Severity = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Severity::Critical);
        assert!(serde_json::from_str::<Severity>("\"loud\"").is_err());
    }

    #[test]
    fn test_carries_exception() {
        assert!(!Severity::Warning.carries_exception());
        assert!(Severity::Error.carries_exception());
        assert!(Severity::Critical.carries_exception());
    }
}
