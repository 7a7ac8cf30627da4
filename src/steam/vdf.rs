//! Minimal VDF/ACF tokenizer: quoted strings and brace-delimited blocks,
//! tolerant of `//` line comments. No schema versioning is assumed.

use std::collections::HashMap;

#[derive(Debug, Clone)]
pub enum VdfValue {
    Leaf(String),
    Block(HashMap<String, VdfValue>),
}

pub fn parse(input: &str) -> Option<HashMap<String, VdfValue>> {
    let tokens = tokenize(input);
    let mut pos = 0;
    parse_block(&tokens, &mut pos)
}

/// Quoted tokens are emitted with a leading `"` retained (and the closing
/// quote dropped) so callers can tell them apart from `{`/`}` without a
/// separate token-kind enum.
fn tokenize(input: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for raw_line in input.lines() {
        let line = strip_comment(raw_line);
        let mut chars = line.chars().peekable();
        while let Some(&c) = chars.peek() {
            match c {
                '"' => {
                    chars.next();
                    let mut value = String::new();
                    for ch in chars.by_ref() {
                        if ch == '"' {
                            break;
                        }
                        value.push(ch);
                    }
                    tokens.push(format!("\"{value}"));
                }
                '{' | '}' => {
                    chars.next();
                    tokens.push(c.to_string());
                }
                c if c.is_whitespace() => {
                    chars.next();
                }
                _ => {
                    chars.next();
                }
            }
        }
    }
    tokens
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(idx) => &line[..idx],
        None => line,
    }
}

fn parse_block(tokens: &[String], pos: &mut usize) -> Option<HashMap<String, VdfValue>> {
    let mut map = HashMap::new();
    while *pos < tokens.len() {
        let token = &tokens[*pos];
        if token == "}" {
            *pos += 1;
            break;
        }

        let Some(key) = token.strip_prefix('"') else {
            *pos += 1;
            continue;
        };
        let key = key.to_string();
        *pos += 1;

        if *pos >= tokens.len() {
            break;
        }

        if tokens[*pos] == "{" {
            *pos += 1;
            let nested = parse_block(tokens, pos)?;
            map.insert(key, VdfValue::Block(nested));
        } else if let Some(value) = tokens[*pos].strip_prefix('"') {
            map.insert(key, VdfValue::Leaf(value.to_string()));
            *pos += 1;
        } else {
            *pos += 1;
        }
    }
    Some(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nested_modern_shape() {
        let input = r#"
"libraryfolders"
{
    "0"
    {
        "path"		"C:\\Program Files (x86)\\Steam"
        "label"		""
    }
}
"#;
        let root = parse(input).unwrap();
        let VdfValue::Block(folders) = &root["libraryfolders"] else {
            panic!("expected block");
        };
        let VdfValue::Block(zero) = &folders["0"] else {
            panic!("expected block");
        };
        let VdfValue::Leaf(path) = &zero["path"] else {
            panic!("expected leaf");
        };
        assert_eq!(path, "C:\\\\Program Files (x86)\\\\Steam");
    }

    #[test]
    fn tolerates_line_comments() {
        let input = r#"
"AppState"
{
    // a comment line
    "name"		"Portal" // trailing comment
}
"#;
        let root = parse(input).unwrap();
        let VdfValue::Block(state) = &root["AppState"] else {
            panic!("expected block");
        };
        let VdfValue::Leaf(name) = &state["name"] else {
            panic!("expected leaf");
        };
        assert_eq!(name, "Portal");
    }

    #[test]
    fn parses_legacy_direct_leaf_shape() {
        let input = r#"
"LibraryFolders"
{
    "1"		"D:\\SteamLibrary"
}
"#;
        let root = parse(input).unwrap();
        let VdfValue::Block(folders) = &root["LibraryFolders"] else {
            panic!("expected block");
        };
        let VdfValue::Leaf(path) = &folders["1"] else {
            panic!("expected leaf");
        };
        assert_eq!(path, "D:\\\\SteamLibrary");
    }
}
