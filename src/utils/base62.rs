//! Base62 短码编码
//!
//! 字母表顺序固定为 `0-9a-zA-Z`，已经持久化的短码依赖这个顺序，不能修改。

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";
const BASE: u64 = 62;

/// u64::MAX 编码后最多 11 位
const MAX_LEN: usize = 11;

/// 将计数器值编码为短码（高位在前，0 编码为 `"0"`）
pub fn encode(mut value: u64) -> String {
    if value == 0 {
        return (ALPHABET[0] as char).to_string();
    }

    let mut buf = [0u8; MAX_LEN];
    let mut pos = MAX_LEN;
    while value > 0 {
        pos -= 1;
        buf[pos] = ALPHABET[(value % BASE) as usize];
        value /= BASE;
    }

    buf[pos..].iter().map(|&b| b as char).collect()
}

/// 将短码解码为计数器值
///
/// 含有字母表之外的字符或溢出 u64 时返回 `None`。
pub fn decode(code: &str) -> Option<u64> {
    if code.is_empty() {
        return None;
    }

    code.bytes().try_fold(0u64, |acc, b| {
        let digit = symbol_value(b)?;
        acc.checked_mul(BASE)?.checked_add(digit)
    })
}

fn symbol_value(b: u8) -> Option<u64> {
    let v = match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'z' => b - b'a' + 10,
        b'A'..=b'Z' => b - b'A' + 36,
        _ => return None,
    };
    Some(v as u64)
}
