use regex::{Captures, Regex, RegexBuilder};

use crate::errors::TransformError;

const FLAGS: &str = "gimsuy";

/// `/pattern/flags` 形式的规则
#[derive(Debug, Clone)]
pub struct Pattern {
    pub source: String,
    pub flags: String,
    regex: Regex,
    global: bool,
    sticky: bool,
}

/// 解析 `/pattern/flags`
///
/// 不是正则形式时返回 `Ok(None)`，调用方改用精确匹配。
/// 正则本身无法编译时返回 `MalformedPattern`，不会退回精确匹配。
pub fn parse_pattern(raw: &str) -> Result<Option<Pattern>, TransformError> {
    let Some((source, flags)) = split_pattern(raw) else {
        return Ok(None);
    };

    let malformed = |reason: String| TransformError::MalformedPattern {
        pattern: raw.to_string(),
        reason,
    };

    let mut seen = String::new();
    for flag in flags.chars() {
        if seen.contains(flag) {
            return Err(malformed(format!("duplicate flag `{}`", flag)));
        }
        seen.push(flag);
    }

    // u: Rust 的 regex 默认就是 unicode 模式
    let regex = RegexBuilder::new(&ascii_shorthands(source))
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .dot_matches_new_line(flags.contains('s'))
        .build()
        .map_err(|err| malformed(err.to_string()))?;

    Ok(Some(Pattern {
        source: source.to_string(),
        flags: flags.to_string(),
        regex,
        global: flags.contains('g'),
        sticky: flags.contains('y'),
    }))
}

/// `\d` `\w` `\b` 及其取反只匹配 ASCII，Rust 的 regex 默认按 Unicode 处理
fn ascii_shorthands(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut chars = source.chars();
    let mut in_class = false;

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    output.push(ch);
                    break;
                };
                let replacement = match (in_class, escaped) {
                    (false, 'd') => "[0-9]",
                    (false, 'D') => "[^0-9]",
                    (false, 'w') => "[0-9A-Za-z_]",
                    (false, 'W') => "[^0-9A-Za-z_]",
                    (false, 'b') => "(?-u:\\b)",
                    (false, 'B') => "(?-u:\\B)",
                    (true, 'd') => "[:digit:]",
                    (true, 'D') => "[:^digit:]",
                    (true, 'w') => "[:word:]",
                    (true, 'W') => "[:^word:]",
                    // 字符类中的 \b 表示退格
                    (true, 'b') => "\\x08",
                    _ => {
                        output.push(ch);
                        output.push(escaped);
                        continue;
                    }
                };
                output.push_str(replacement);
            }
            '[' if !in_class => {
                in_class = true;
                output.push(ch);
            }
            ']' if in_class => {
                in_class = false;
                output.push(ch);
            }
            _ => output.push(ch),
        }
    }

    output
}

/// 等价于 `^\/(.*?)\/([gimsuy]*)$`：取第一个之后只剩 flag 字符的 `/` 作为结尾
fn split_pattern(raw: &str) -> Option<(&str, &str)> {
    let body = raw.strip_prefix('/')?;

    for (index, ch) in body.char_indices() {
        match ch {
            '\n' | '\r' | '\u{2028}' | '\u{2029}' => return None,
            '/' => {
                let flags = &body[index + 1..];
                if flags.chars().all(|flag| FLAGS.contains(flag)) {
                    return Some((&body[..index], flags));
                }
            }
            _ => {}
        }
    }

    None
}

impl Pattern {
    /// 按 `String.prototype.replace` 的语义替换，没有任何匹配时返回 `None`
    pub fn replace(&self, haystack: &str, replacement: &str) -> Option<String> {
        let mut output = String::with_capacity(haystack.len());
        let mut last_end = 0;
        let mut position = 0;
        let mut replaced = false;

        while position <= haystack.len() {
            let Some(captures) = self.regex.captures_at(haystack, position) else {
                break;
            };
            let Some(matched) = captures.get(0) else {
                break;
            };
            // y: 每一次匹配都必须从当前位置开始
            if self.sticky && matched.start() != position {
                break;
            }

            output.push_str(&haystack[last_end..matched.start()]);
            self.expand(&captures, haystack, replacement, &mut output);
            last_end = matched.end();
            replaced = true;

            if !self.global {
                break;
            }

            // 空匹配后前进一个字符，紧跟在上一次匹配之后的空匹配依然有效
            position = if matched.is_empty() {
                haystack[matched.end()..]
                    .chars()
                    .next()
                    .map_or(matched.end() + 1, |ch| matched.end() + ch.len_utf8())
            } else {
                matched.end()
            };
        }

        if !replaced {
            return None;
        }

        output.push_str(&haystack[last_end..]);
        Some(output)
    }

    fn has_named_groups(&self) -> bool {
        self.regex.capture_names().any(|name| name.is_some())
    }

    /// 展开 `$$` `$&` `` $` `` `$'` `$n` `$nn` `$<name>`
    fn expand(&self, captures: &Captures<'_>, haystack: &str, replacement: &str, output: &mut String) {
        let Some(matched) = captures.get(0) else {
            return;
        };
        let group_count = captures.len() - 1;
        let bytes = replacement.as_bytes();
        let mut index = 0;

        while let Some(offset) = replacement[index..].find('$') {
            let dollar = index + offset;
            output.push_str(&replacement[index..dollar]);
            index = dollar + 1;

            match bytes.get(index).copied() {
                Some(b'$') => {
                    output.push('$');
                    index += 1;
                }
                Some(b'&') => {
                    output.push_str(matched.as_str());
                    index += 1;
                }
                Some(b'`') => {
                    output.push_str(&haystack[..matched.start()]);
                    index += 1;
                }
                Some(b'\'') => {
                    output.push_str(&haystack[matched.end()..]);
                    index += 1;
                }
                Some(digit @ b'0'..=b'9') => {
                    let first = usize::from(digit - b'0');
                    let two_digits = bytes
                        .get(index + 1)
                        .copied()
                        .filter(|next| next.is_ascii_digit())
                        .map(|next| first * 10 + usize::from(next - b'0'));

                    let (group, width) = match two_digits {
                        Some(group) if (1..=group_count).contains(&group) => (group, 2),
                        _ if (1..=group_count).contains(&first) => (first, 1),
                        _ => {
                            output.push('$');
                            continue;
                        }
                    };

                    if let Some(capture) = captures.get(group) {
                        output.push_str(capture.as_str());
                    }
                    index += width;
                }
                Some(b'<') if self.has_named_groups() => {
                    let Some(close) = replacement[index..].find('>') else {
                        output.push('$');
                        continue;
                    };
                    let name = &replacement[index + 1..index + close];
                    if let Some(capture) = captures.name(name) {
                        output.push_str(capture.as_str());
                    }
                    index += close + 1;
                }
                _ => output.push('$'),
            }
        }

        output.push_str(&replacement[index..]);
    }
}
