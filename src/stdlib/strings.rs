//! String helpers. All indices and lengths count Unicode codepoints,
//! consistent with `size` on strings.
use regex::Regex;

use crate::ast::function::{FnError, Function};
use crate::ast::value::Value;
use crate::native::NativeFunction;

pub(crate) fn functions() -> Vec<Function> {
    vec![
        NativeFunction::binary("contains", |s: String, substr: String| {
            Ok(s.contains(substr.as_str()))
        })
        .into_function(),
        NativeFunction::binary("startsWith", |s: String, prefix: String| {
            Ok(s.starts_with(prefix.as_str()))
        })
        .into_function(),
        NativeFunction::binary("endsWith", |s: String, suffix: String| {
            Ok(s.ends_with(suffix.as_str()))
        })
        .into_function(),
        NativeFunction::binary("matches", matches).into_function(),
        NativeFunction::binary("charAt", char_at).into_function(),
        NativeFunction::ternary("indexOf", index_of)
            .with_default(Value::Int(0))
            .into_function(),
        NativeFunction::ternary("lastIndexOf", last_index_of)
            .with_default(Value::Int(-1))
            .into_function(),
        NativeFunction::unary("lowerAscii", lower_ascii).into_function(),
        NativeFunction::quaternary("replace", replace)
            .with_default(Value::Int(-1))
            .into_function(),
        NativeFunction::ternary("split", split)
            .with_default(Value::Int(-1))
            .into_function(),
        NativeFunction::ternary("substring", substring)
            .with_default(Value::Int(-1))
            .into_function(),
        NativeFunction::unary("trim", trim).into_function(),
        NativeFunction::unary("upperAscii", upper_ascii).into_function(),
        NativeFunction::unary("quote", quote).into_function(),
        NativeFunction::binary("join", join)
            .with_default(Value::String(String::new()))
            .into_function(),
        NativeFunction::unary("reverse", reverse).into_function(),
    ]
}

fn matches(s: String, pattern: String) -> Result<bool, FnError> {
    let re = Regex::new(&pattern)
        .map_err(|err| FnError::new(format!("regexp {} compile failed: {}", pattern, err)))?;
    Ok(re.is_match(&s))
}

fn char_at(s: String, index: i64) -> Result<String, FnError> {
    let chars: Vec<char> = s.chars().collect();
    let i = usize::try_from(index)
        .map_err(|_| FnError::new(format!("index out of range: {}", index)))?;
    if i > chars.len() {
        return Err(FnError::new(format!("index out of range: {}", index)));
    }
    if i == chars.len() {
        return Ok(String::new());
    }
    Ok(chars[i].to_string())
}

fn index_of(s: String, substr: String, offset: i64) -> Result<i64, FnError> {
    if substr.is_empty() {
        return Ok(offset);
    }
    if offset < 0 {
        return Err(FnError::new(format!("index out of range: {}", offset)));
    }
    let chars: Vec<char> = s.chars().collect();
    let sub: Vec<char> = substr.chars().collect();
    let offset = offset as usize;
    // An offset past the end is a miss rather than an error.
    if offset >= chars.len() {
        return Ok(-1);
    }
    let mut i = offset;
    while i + sub.len() <= chars.len() {
        if chars[i..i + sub.len()] == sub[..] {
            return Ok(i as i64);
        }
        i += 1;
    }
    Ok(-1)
}

fn last_index_of(s: String, substr: String, offset: i64) -> Result<i64, FnError> {
    let chars: Vec<char> = s.chars().collect();
    if substr.is_empty() {
        if offset < 0 {
            return Ok(chars.len() as i64);
        }
        return Ok(offset);
    }

    let sub: Vec<char> = substr.chars().collect();
    let mut offset = if offset < 0 {
        chars.len() as i64 - 1
    } else {
        offset
    };
    if offset >= chars.len() as i64 {
        return Ok(-1);
    }
    if offset > chars.len() as i64 - sub.len() as i64 {
        offset = chars.len() as i64 - sub.len() as i64;
    }
    let mut i = offset;
    while i >= 0 {
        if chars[i as usize..i as usize + sub.len()] == sub[..] {
            return Ok(i);
        }
        i -= 1;
    }
    Ok(-1)
}

fn lower_ascii(s: String) -> Result<String, FnError> {
    Ok(s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_lowercase() } else { c })
        .collect())
}

fn upper_ascii(s: String) -> Result<String, FnError> {
    Ok(s.chars()
        .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { c })
        .collect())
}

/// Replace up to `n` occurrences; `n < 0` replaces all.
fn replace(s: String, old: String, new: String, n: i64) -> Result<String, FnError> {
    if n < 0 {
        Ok(s.replace(&old, &new))
    } else {
        Ok(s.replacen(&old, &new, n as usize))
    }
}

/// Split into at most `n` pieces; `n < 0` means no limit, `n == 0`
/// yields an empty list. An empty separator splits into codepoints.
fn split(s: String, sep: String, n: i64) -> Result<Vec<String>, FnError> {
    if n == 0 {
        return Ok(Vec::new());
    }
    if sep.is_empty() {
        let chars: Vec<String> = s.chars().map(|c| c.to_string()).collect();
        if n > 0 && (n as usize) < chars.len() {
            let mut pieces: Vec<String> = chars[..n as usize - 1].to_vec();
            pieces.push(s.chars().skip(n as usize - 1).collect());
            return Ok(pieces);
        }
        return Ok(chars);
    }
    if n < 0 {
        Ok(s.split(sep.as_str()).map(str::to_string).collect())
    } else {
        Ok(s.splitn(n as usize, sep.as_str()).map(str::to_string).collect())
    }
}

fn substring(s: String, start: i64, end: i64) -> Result<String, FnError> {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len() as i64;
    let end = if end < 0 { len } else { end };
    if start > end {
        return Err(FnError::new(format!(
            "invalid substring range. start: {}, end: {}",
            start, end
        )));
    }
    if start < 0 || start > len {
        return Err(FnError::new(format!("index out of range: {}", start)));
    }
    if end > len {
        return Err(FnError::new(format!("index out of range: {}", end)));
    }
    Ok(chars[start as usize..end as usize].iter().collect())
}

fn trim(s: String) -> Result<String, FnError> {
    Ok(s.trim().to_string())
}

fn join(items: Vec<String>, separator: String) -> Result<String, FnError> {
    Ok(items.join(&separator))
}

fn reverse(s: String) -> Result<String, FnError> {
    Ok(s.chars().rev().collect())
}

/// Double-quote a string, escaping control characters, backslashes,
/// and quotes so the result prints literally.
fn quote(s: String) -> Result<String, FnError> {
    let mut quoted = String::with_capacity(s.len() + 2);
    quoted.push('"');
    for c in s.chars() {
        match c {
            '\u{0007}' => quoted.push_str("\\a"),
            '\u{0008}' => quoted.push_str("\\b"),
            '\u{000C}' => quoted.push_str("\\f"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            '\u{000B}' => quoted.push_str("\\v"),
            '\\' => quoted.push_str("\\\\"),
            '"' => quoted.push_str("\\\""),
            other => quoted.push(other),
        }
    }
    quoted.push('"');
    Ok(quoted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_char_at_codepoints() {
        assert_eq!(char_at("héllo".to_string(), 1).unwrap(), "é");
        assert_eq!(char_at("abc".to_string(), 3).unwrap(), "");
        assert!(char_at("abc".to_string(), 4).is_err());
        assert!(char_at("abc".to_string(), -1).is_err());
    }

    #[test]
    fn test_index_of() {
        assert_eq!(index_of("hello".to_string(), "l".to_string(), 0).unwrap(), 2);
        assert_eq!(index_of("hello".to_string(), "l".to_string(), 3).unwrap(), 3);
        assert_eq!(index_of("hello".to_string(), "z".to_string(), 0).unwrap(), -1);
        assert_eq!(index_of("hello".to_string(), "".to_string(), 2).unwrap(), 2);
        assert_eq!(index_of("hello".to_string(), "l".to_string(), 99).unwrap(), -1);
        assert!(index_of("hello".to_string(), "l".to_string(), -1).is_err());
    }

    #[test]
    fn test_last_index_of() {
        assert_eq!(
            last_index_of("hello".to_string(), "l".to_string(), -1).unwrap(),
            3
        );
        assert_eq!(
            last_index_of("hello".to_string(), "l".to_string(), 2).unwrap(),
            2
        );
        assert_eq!(
            last_index_of("hello".to_string(), "z".to_string(), -1).unwrap(),
            -1
        );
        assert_eq!(
            last_index_of("hello".to_string(), "".to_string(), -1).unwrap(),
            5
        );
    }

    #[test]
    fn test_substring() {
        assert_eq!(
            substring("tacocat".to_string(), 1, 4).unwrap(),
            "aco"
        );
        assert_eq!(substring("tacocat".to_string(), 4, -1).unwrap(), "cat");
        assert!(substring("tacocat".to_string(), 4, 2).is_err());
        assert!(substring("tacocat".to_string(), 0, 99).is_err());
    }

    #[test]
    fn test_split_empty_separator_explodes_codepoints() {
        assert_eq!(
            split("héllo".to_string(), "".to_string(), -1).unwrap(),
            vec!["h", "é", "l", "l", "o"]
        );
        assert_eq!(
            split("hello".to_string(), "".to_string(), 3).unwrap(),
            vec!["h", "e", "llo"]
        );
        assert_eq!(
            split("a,b,c".to_string(), ",".to_string(), 2).unwrap(),
            vec!["a", "b,c"]
        );
        assert_eq!(
            split("a,b".to_string(), ",".to_string(), 0).unwrap(),
            Vec::<String>::new()
        );
    }

    #[test]
    fn test_replace_limit() {
        assert_eq!(
            replace("aaa".to_string(), "a".to_string(), "b".to_string(), -1).unwrap(),
            "bbb"
        );
        assert_eq!(
            replace("aaa".to_string(), "a".to_string(), "b".to_string(), 2).unwrap(),
            "bba"
        );
        assert_eq!(
            replace("aaa".to_string(), "a".to_string(), "b".to_string(), 0).unwrap(),
            "aaa"
        );
    }

    #[test]
    fn test_ascii_case_leaves_non_ascii_alone() {
        assert_eq!(upper_ascii("héllo".to_string()).unwrap(), "HéLLO");
        assert_eq!(lower_ascii("HÉLLO".to_string()).unwrap(), "hÉllo");
    }

    #[test]
    fn test_quote_escapes() {
        assert_eq!(
            quote("a\n\"b\"\\".to_string()).unwrap(),
            "\"a\\n\\\"b\\\"\\\\\""
        );
    }

    #[test]
    fn test_matches() {
        assert!(matches("hello123".to_string(), r"^[a-z]+\d+$".to_string()).unwrap());
        assert!(!matches("hello".to_string(), r"^\d+$".to_string()).unwrap());
        assert!(matches("x".to_string(), "(".to_string()).is_err());
    }
}
