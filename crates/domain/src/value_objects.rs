//! 设备返回值的规范化

/// 去掉OID前导的点
pub fn trim_oid(oid: &str) -> &str {
    oid.trim().trim_start_matches('.')
}

/// 若 `oid` 位于 `base` 之下，返回其后缀（不含分隔点）
///
/// 只在点分边界上匹配，`1.3.6.1.2.1.2.2.1.1` 不会匹配 `1.3.6.1.2.1.2.2.1.10.3`。
pub fn oid_suffix<'a>(base: &str, oid: &'a str) -> Option<&'a str> {
    let base = trim_oid(base);
    let oid = trim_oid(oid);
    let rest = oid.strip_prefix(base)?;
    let rest = rest.strip_prefix('.')?;
    if rest.is_empty() {
        None
    } else {
        Some(rest)
    }
}

/// 把OID后缀解析为整数序列
pub fn parse_oid_index(suffix: &str) -> Option<Vec<u32>> {
    suffix
        .split('.')
        .map(|part| part.parse::<u32>().ok())
        .collect()
}

/// 解析SNMP整数值，兼容 `up(1)`、`INTEGER: 5`、`Timeticks: (12345) 0:02:03.45` 等写法
pub fn parse_snmp_int(value: &str) -> Option<i64> {
    let value = strip_type_tag(value);
    if let (Some(open), Some(close)) = (value.find('('), value.find(')')) {
        if open < close {
            if let Ok(n) = value[open + 1..close].trim().parse::<i64>() {
                return Some(n);
            }
        }
    }
    let digits: String = value
        .trim()
        .chars()
        .enumerate()
        .take_while(|(i, c)| c.is_ascii_digit() || (*i == 0 && *c == '-'))
        .map(|(_, c)| c)
        .collect();
    digits.parse::<i64>().ok()
}

/// 去掉 net-snmp 输出中的类型标签和引号
pub fn clean_string(value: &str) -> String {
    let value = strip_type_tag(value).trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn strip_type_tag(value: &str) -> &str {
    const TAGS: [&str; 11] = [
        "STRING:",
        "Hex-STRING:",
        "INTEGER:",
        "Gauge32:",
        "Counter32:",
        "Counter64:",
        "Timeticks:",
        "OID:",
        "IpAddress:",
        "Network Address:",
        "Unsigned32:",
    ];
    let trimmed = value.trim();
    TAGS.iter()
        .find_map(|tag| trimmed.strip_prefix(tag))
        .map(str::trim)
        .unwrap_or(trimmed)
}

/// 把各种MAC写法统一为 `aa:bb:cc:dd:ee:ff`
///
/// 支持 `0:1a:2b:3c:4d:5e`、`00 1A 2B 3C 4D 5E`、`001a.2b3c.4d5e`、
/// `00-1A-2B-3C-4D-5E`、`0x001a2b3c4d5e` 和12位连续十六进制。
pub fn normalize_mac(value: &str) -> Option<String> {
    let value = strip_type_tag(value).trim().trim_matches('"');
    let value = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    let parts: Vec<&str> = value
        .split(|c: char| c == ':' || c == '-' || c == '.' || c.is_whitespace())
        .filter(|p| !p.is_empty())
        .collect();

    let octets: Vec<u8> = match parts.as_slice() {
        [single] if single.len() == 12 => hex_pairs(single)?,
        [a, b, c] if a.len() == 4 && b.len() == 4 && c.len() == 4 => {
            hex_pairs(&format!("{a}{b}{c}"))?
        }
        parts if parts.len() == 6 => parts
            .iter()
            .map(|p| {
                if p.len() > 2 {
                    None
                } else {
                    u8::from_str_radix(p, 16).ok()
                }
            })
            .collect::<Option<Vec<u8>>>()?,
        _ => return None,
    };

    Some(format_mac(&octets))
}

/// 转发表索引中的6个十进制字节转换为MAC
pub fn mac_from_decimal_octets(octets: &[u32]) -> Option<String> {
    if octets.len() != 6 {
        return None;
    }
    let bytes: Option<Vec<u8>> = octets.iter().map(|o| u8::try_from(*o).ok()).collect();
    bytes.map(|b| format_mac(&b))
}

/// 4个十进制字节转换为点分IPv4地址
pub fn ipv4_from_octets(octets: &[u32]) -> Option<String> {
    if octets.len() != 4 || octets.iter().any(|o| *o > 255) {
        return None;
    }
    Some(format!(
        "{}.{}.{}.{}",
        octets[0], octets[1], octets[2], octets[3]
    ))
}

fn hex_pairs(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 || !text.is_ascii() {
        return None;
    }
    (0..text.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
        .collect()
}

fn format_mac(octets: &[u8]) -> String {
    octets
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(":")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oid_suffix_respects_boundaries() {
        assert_eq!(
            oid_suffix("1.3.6.1.2.1.2.2.1.1", ".1.3.6.1.2.1.2.2.1.1.7"),
            Some("7")
        );
        assert_eq!(oid_suffix("1.3.6.1.2.1.2.2.1.1", "1.3.6.1.2.1.2.2.1.10.7"), None);
        assert_eq!(oid_suffix(".1.3.6.1.2.1.1.5", "1.3.6.1.2.1.1.5"), None);
        assert_eq!(
            oid_suffix("1.3.6.1.2.1.4.22.1.2", "1.3.6.1.2.1.4.22.1.2.3.10.0.0.1"),
            Some("3.10.0.0.1")
        );
    }

    #[test]
    fn test_normalize_mac_variants() {
        let expected = Some("00:1a:2b:3c:4d:5e".to_string());
        assert_eq!(normalize_mac("0:1a:2b:3c:4d:5e"), expected);
        assert_eq!(normalize_mac("00 1A 2B 3C 4D 5E"), expected);
        assert_eq!(normalize_mac("Hex-STRING: 00 1A 2B 3C 4D 5E "), expected);
        assert_eq!(normalize_mac("001a.2b3c.4d5e"), expected);
        assert_eq!(normalize_mac("00-1A-2B-3C-4D-5E"), expected);
        assert_eq!(normalize_mac("0x001A2B3C4D5E"), expected);
        assert_eq!(normalize_mac("001a2b3c4d5e"), expected);
        assert_eq!(normalize_mac("\"00:1a:2b:3c:4d:5e\""), expected);
        assert_eq!(normalize_mac(""), None);
        assert_eq!(normalize_mac("00:1a:2b"), None);
        assert_eq!(normalize_mac("zz:1a:2b:3c:4d:5e"), None);
    }

    #[test]
    fn test_decimal_octets() {
        assert_eq!(
            mac_from_decimal_octets(&[0, 26, 43, 60, 77, 94]).as_deref(),
            Some("00:1a:2b:3c:4d:5e")
        );
        assert_eq!(mac_from_decimal_octets(&[0, 26, 43]), None);
        assert_eq!(mac_from_decimal_octets(&[0, 26, 43, 60, 77, 300]), None);
        assert_eq!(ipv4_from_octets(&[10, 0, 0, 1]).as_deref(), Some("10.0.0.1"));
        assert_eq!(ipv4_from_octets(&[10, 0, 0, 256]), None);
    }

    #[test]
    fn test_parse_snmp_int() {
        assert_eq!(parse_snmp_int("1"), Some(1));
        assert_eq!(parse_snmp_int("up(1)"), Some(1));
        assert_eq!(parse_snmp_int("INTEGER: down(2)"), Some(2));
        assert_eq!(parse_snmp_int("Gauge32: 1000000000"), Some(1_000_000_000));
        assert_eq!(parse_snmp_int("Timeticks: (12345) 0:02:03.45"), Some(12345));
        assert_eq!(parse_snmp_int("-5"), Some(-5));
        assert_eq!(parse_snmp_int("eth0"), None);
    }

    #[test]
    fn test_clean_string() {
        assert_eq!(clean_string("STRING: \"GigabitEthernet0/1\""), "GigabitEthernet0/1");
        assert_eq!(clean_string("core-sw1"), "core-sw1");
    }
}
