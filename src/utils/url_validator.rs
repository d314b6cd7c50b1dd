//! URL 规范化与验证模块
//!
//! 短链的去重 key 就是规范化后的 URL，所以这里的输出必须稳定：
//! 同一个输入永远得到同一个字符串。

use url::{Position, Url};

use crate::errors::{LinkpressError, Result};

const SCHEME_DELIMITER: &str = "://";
const DEFAULT_SCHEME: &str = "https";
const WWW_LABEL: &str = "www.";

/// 主机名必须恰好包含的标签数（`www.example.com`）
const REQUIRED_HOST_LABELS: usize = 3;
const MIN_HOST_LEN: usize = 4;

/// 规范化并验证 URL
///
/// 处理顺序：
/// 1. 没有 `://` 时补上 `https://`
/// 2. scheme 之后不是 `www.` 时插入 `www.`
/// 3. 解析；scheme 只允许 http / https
/// 4. 主机名非空、恰好三段、长度不少于 4
///
/// 返回按解析结果重新拼接的字符串：scheme 和主机名转为小写，
/// 根路径不追加结尾的 `/`。
pub fn normalize_url(raw: &str) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(LinkpressError::invalid_url("URL cannot be empty"));
    }

    let mut candidate = if raw.contains(SCHEME_DELIMITER) {
        raw.to_string()
    } else {
        format!("{}{}{}", DEFAULT_SCHEME, SCHEME_DELIMITER, raw)
    };

    if let Some(idx) = candidate.find(SCHEME_DELIMITER) {
        let scheme = &candidate[..idx];
        let rest_start = idx + SCHEME_DELIMITER.len();
        let is_web = scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https");
        let has_www = candidate[rest_start..]
            .get(..WWW_LABEL.len())
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case(WWW_LABEL));
        if is_web && !has_www {
            candidate.insert_str(rest_start, WWW_LABEL);
        }
    }

    let parsed = Url::parse(&candidate)
        .map_err(|e| LinkpressError::invalid_url(format!("{}: {}", raw, e)))?;

    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(LinkpressError::invalid_scheme(format!(
                "Unsupported scheme '{}', only http and https are allowed",
                other
            )));
        }
    }

    let host = parsed.host_str().unwrap_or_default();
    if host.is_empty() {
        return Err(LinkpressError::invalid_url(format!("{}: missing host", raw)));
    }
    if host.split('.').count() != REQUIRED_HOST_LABELS {
        return Err(LinkpressError::invalid_url(format!(
            "{}: host '{}' must have exactly {} labels",
            raw, host, REQUIRED_HOST_LABELS
        )));
    }
    if host.len() < MIN_HOST_LEN {
        return Err(LinkpressError::invalid_url(format!(
            "{}: host '{}' is too short",
            raw, host
        )));
    }

    Ok(serialize(&parsed))
}

/// `Url` 的序列化形式，去掉空路径时 `url` 补上的 `/`
fn serialize(parsed: &Url) -> String {
    let path = parsed.path();
    if path == "/" {
        format!(
            "{}{}",
            &parsed[..Position::BeforePath],
            &parsed[Position::AfterPath..]
        )
    } else {
        parsed.as_str().to_string()
    }
}
