//! Virtual-host file parsing.
//!
//! Grammar:
//! ```text
//! host "<hostname>" {
//!     proxy_pass http://<host>:<port>;
//!     [proxy_pass http://<host2>:<port2>;]...
//!     dist_policy <policy-name>;   # optional, default round-robin
//! }
//! ```
//! `#` starts a comment running to the end of the line. The order of
//! `proxy_pass` lines is kept; it is the round-robin order.

use thiserror::Error;

use crate::load_balancer::backend::{Endpoint, EndpointError};

const PROXY_PASS_SCHEME: &str = "http://";

/// One `host "..." { ... }` block as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VirtualHostConfig {
    pub host: String,
    /// Raw `proxy_pass` targets, e.g. `http://127.0.0.1:9001`.
    pub proxy_pass: Vec<String>,
    pub dist_policy: Option<String>,
    /// Line of the `host` keyword.
    pub line: usize,
}

/// Error type for the virtual-host grammar.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub message: String,
}

impl SyntaxError {
    fn new(line: usize, message: impl Into<String>) -> Self {
        Self {
            line,
            message: message.into(),
        }
    }
}

/// Error type for a `proxy_pass` target.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProxyPassError {
    #[error("proxy_pass {0:?} must start with http://")]
    MissingScheme(String),
    #[error(transparent)]
    Endpoint(#[from] EndpointError),
}

/// Turn `http://host:port` into an endpoint.
pub fn parse_proxy_pass(raw: &str) -> Result<Endpoint, ProxyPassError> {
    let target = raw
        .strip_prefix(PROXY_PASS_SCHEME)
        .ok_or_else(|| ProxyPassError::MissingScheme(raw.to_string()))?;
    Ok(target.trim_end_matches('/').parse()?)
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Word(String),
    Quoted(String),
    Open,
    Close,
    Semi,
}

fn tokenize(text: &str) -> Result<Vec<(Token, usize)>, SyntaxError> {
    let mut tokens = Vec::new();
    let mut chars = text.chars().peekable();
    let mut line = 1;

    while let Some(c) = chars.next() {
        match c {
            '\n' => line += 1,
            c if c.is_whitespace() => {}
            '#' => {
                while chars.next_if(|&c| c != '\n').is_some() {}
            }
            '{' => tokens.push((Token::Open, line)),
            '}' => tokens.push((Token::Close, line)),
            ';' => tokens.push((Token::Semi, line)),
            '"' => {
                let start = line;
                let mut value = String::new();
                loop {
                    match chars.next() {
                        Some('"') => break,
                        Some('\n') | None => {
                            return Err(SyntaxError::new(start, "unterminated quoted string"));
                        }
                        Some(c) => value.push(c),
                    }
                }
                tokens.push((Token::Quoted(value), start));
            }
            c => {
                let mut word = String::from(c);
                while let Some(c) = chars.next_if(|&c| !c.is_whitespace() && !"{};\"#".contains(c)) {
                    word.push(c);
                }
                tokens.push((Token::Word(word), line));
            }
        }
    }
    Ok(tokens)
}

/// Parse a virtual-host file.
pub fn parse_virtual_hosts(text: &str) -> Result<Vec<VirtualHostConfig>, SyntaxError> {
    let tokens = tokenize(text)?;
    let mut iter = tokens.into_iter().peekable();
    let mut hosts = Vec::new();

    while let Some((token, line)) = iter.next() {
        match token {
            Token::Word(w) if w == "host" => {}
            other => {
                return Err(SyntaxError::new(line, format!("expected `host`, found {}", describe(&other))));
            }
        }

        let host = match iter.next() {
            Some((Token::Quoted(name), _)) => name,
            Some((other, l)) => {
                return Err(SyntaxError::new(l, format!("expected quoted host name, found {}", describe(&other))));
            }
            None => return Err(SyntaxError::new(line, "expected quoted host name")),
        };

        match iter.next() {
            Some((Token::Open, _)) => {}
            Some((other, l)) => {
                return Err(SyntaxError::new(l, format!("expected `{{`, found {}", describe(&other))));
            }
            None => return Err(SyntaxError::new(line, "expected `{`")),
        }

        let mut block = VirtualHostConfig {
            host,
            proxy_pass: Vec::new(),
            dist_policy: None,
            line,
        };

        loop {
            let (directive, dline) = match iter.next() {
                Some((Token::Close, _)) => break,
                Some((Token::Semi, _)) => continue,
                Some((Token::Word(w), l)) => (w, l),
                Some((other, l)) => {
                    return Err(SyntaxError::new(l, format!("expected directive, found {}", describe(&other))));
                }
                None => {
                    return Err(SyntaxError::new(line, format!("block for {:?} is never closed", block.host)));
                }
            };

            let mut args = Vec::new();
            loop {
                match iter.next() {
                    Some((Token::Semi, _)) => break,
                    Some((Token::Word(w), _)) | Some((Token::Quoted(w), _)) => args.push(w),
                    Some((other, l)) => {
                        return Err(SyntaxError::new(l, format!("expected `;` after {directive}, found {}", describe(&other))));
                    }
                    None => return Err(SyntaxError::new(dline, format!("missing `;` after {directive}"))),
                }
            }

            match (directive.as_str(), args.as_slice()) {
                ("proxy_pass", [target]) => block.proxy_pass.push(target.clone()),
                ("dist_policy", [policy]) => {
                    if let Some(previous) = block.dist_policy.replace(policy.clone()) {
                        tracing::warn!(host = %block.host, %previous, %policy, "dist_policy set twice; keeping the later one");
                    }
                }
                ("proxy_pass" | "dist_policy", _) => {
                    return Err(SyntaxError::new(dline, format!("{directive} takes exactly one argument")));
                }
                (other, _) => {
                    tracing::warn!(line = dline, directive = %other, "ignoring unknown directive");
                }
            }
        }

        hosts.push(block);
    }

    Ok(hosts)
}

fn describe(token: &Token) -> String {
    match token {
        Token::Word(w) => format!("`{w}`"),
        Token::Quoted(q) => format!("\"{q}\""),
        Token::Open => "`{`".to_string(),
        Token::Close => "`}`".to_string(),
        Token::Semi => "`;`".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
# front door
host "a.com" {
    proxy_pass http://127.0.0.1:9001;
    proxy_pass http://127.0.0.1:9002;
    dist_policy round-robin;
}

host "b.com" {
    proxy_pass http://10.0.0.5:8000;   # single backend
}

host "c.com" { proxy_pass http://h1:1; proxy_pass http://h2:2; dist_policy weighted; }
"#;

    #[test]
    fn test_parse_sample() {
        let hosts = parse_virtual_hosts(SAMPLE).unwrap();
        assert_eq!(hosts.len(), 3);

        assert_eq!(hosts[0].host, "a.com");
        assert_eq!(hosts[0].line, 3);
        assert_eq!(
            hosts[0].proxy_pass,
            vec!["http://127.0.0.1:9001", "http://127.0.0.1:9002"]
        );
        assert_eq!(hosts[0].dist_policy.as_deref(), Some("round-robin"));

        assert_eq!(hosts[1].proxy_pass, vec!["http://10.0.0.5:8000"]);
        assert_eq!(hosts[1].dist_policy, None);

        assert_eq!(hosts[2].dist_policy.as_deref(), Some("weighted"));
    }

    #[test]
    fn test_empty_block_and_file() {
        assert!(parse_virtual_hosts("").unwrap().is_empty());
        assert!(parse_virtual_hosts("# nothing\n").unwrap().is_empty());

        let hosts = parse_virtual_hosts("host \"empty.com\" {}").unwrap();
        assert!(hosts[0].proxy_pass.is_empty());
    }

    #[test]
    fn test_syntax_errors_carry_lines() {
        let err = parse_virtual_hosts("host \"a.com\" {\n proxy_pass http://x:1\n}").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse_virtual_hosts("\n\nserver \"a\" {}").unwrap_err();
        assert_eq!(err.line, 3);

        let err = parse_virtual_hosts("host \"a.com\" {\n proxy_pass http://x:1;\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("never closed"));

        let err = parse_virtual_hosts("host \"a.com {}").unwrap_err();
        assert!(err.message.contains("unterminated"));
    }

    #[test]
    fn test_proxy_pass_targets() {
        assert_eq!(
            parse_proxy_pass("http://127.0.0.1:9001").unwrap(),
            Endpoint::new("127.0.0.1", 9001)
        );
        assert_eq!(
            parse_proxy_pass("http://backend:80/").unwrap(),
            Endpoint::new("backend", 80)
        );
        assert!(matches!(
            parse_proxy_pass("https://a:1"),
            Err(ProxyPassError::MissingScheme(_))
        ));
        assert!(matches!(
            parse_proxy_pass("http://a"),
            Err(ProxyPassError::Endpoint(EndpointError::MissingPort(_)))
        ));
    }
}
