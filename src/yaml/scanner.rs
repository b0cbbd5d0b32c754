//! Streaming YAML token scanner
//!
//! The scanner works line by line. Each line is cut into raw pieces by a logos lexer,
//! then a second pass decides what the pieces mean in context (an indicator, part of a
//! plain scalar, the start of a comment, ...). State carried across lines covers flow
//! collections, block scalars (`|`, `>`), quoted scalars spanning several lines and
//! plain scalars continued on the next line.
//!
//! Comments produce no token. Token spans are byte ranges within their line; quoted
//! scalars span their inner text only.

use logos::Logos;
use std::ops::Range;

/// Raw pieces of a line
#[derive(Logos, Debug, PartialEq, Eq, Clone, Copy)]
enum Piece {
    #[regex(r"[ \t\r]+")]
    Whitespace,
    #[token("-")]
    Dash,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,
    #[token(",")]
    Comma,
    #[token("[")]
    OpenBracket,
    #[token("]")]
    CloseBracket,
    #[token("{")]
    OpenBrace,
    #[token("}")]
    CloseBrace,
    #[token("#")]
    Hash,
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,
    #[regex(r#""([^"\\]|\\.)*"#)]
    DoubleQuotedOpen,
    #[regex(r"'([^']|'')*'")]
    SingleQuoted,
    #[regex(r"'([^']|'')*")]
    SingleQuotedOpen,
    // anchors, aliases and tags
    #[regex(r"[&*!][^ \t\r,\[\]{}]*")]
    Property,
    #[regex(r"[|>][-+0-9]*")]
    BlockIndicator,
    #[regex(r#"[^ \t\r\n,\[\]{}#:'"&*!|>?\-][^ \t\r\n,\[\]{}:#]*"#)]
    Word,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarStyle {
    Plain,
    SingleQuoted,
    DoubleQuoted,
    /// A line of a multi-line plain or quoted scalar, after its first line
    Continuation,
    /// A content line of a `|` or `>` block scalar
    Block,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    DocumentStart,
    DocumentEnd,
    /// `?` complex key indicator
    Key,
    /// `:` mapping value indicator
    Value,
    /// `-` block sequence entry
    BlockEntry,
    /// `,` inside a flow collection
    FlowEntry,
    FlowSequenceStart,
    FlowSequenceEnd,
    FlowMappingStart,
    FlowMappingEnd,
    /// Anchor, alias or tag
    Property,
    /// `|` or `>` header of a block scalar
    BlockScalarHeader,
    Scalar(ScalarStyle),
}

/// A scanned token with its position
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YamlToken {
    pub kind: TokenKind,
    pub line: usize,
    pub span: Range<usize>,
}

impl YamlToken {
    pub fn is_scalar(&self) -> bool {
        matches!(self.kind, TokenKind::Scalar(_))
    }
}

#[derive(Debug, Clone, Copy)]
enum Mode {
    Normal,
    /// Inside a block scalar whose parent node is indented this much
    Block { parent_indent: usize },
    /// Inside a quoted scalar left open on a previous line
    Quoted { quote: char },
}

struct Scanner {
    tokens: Vec<YamlToken>,
    flow_depth: usize,
    mode: Mode,
}

/// Scan `lines` into tokens
pub fn scan(lines: &[String]) -> Vec<YamlToken> {
    let mut scanner = Scanner {
        tokens: Vec::new(),
        flow_depth: 0,
        mode: Mode::Normal,
    };
    for (lineno, line) in lines.iter().enumerate() {
        scanner.scan_line(lineno, line);
    }
    scanner.tokens
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn content_end(line: &str) -> usize {
    line.trim_end().len()
}

impl Scanner {
    fn push(&mut self, kind: TokenKind, line: usize, span: Range<usize>) {
        self.tokens.push(YamlToken { kind, line, span });
    }

    fn last_kind(&self) -> Option<TokenKind> {
        self.tokens.last().map(|token| token.kind)
    }

    fn follows_quoted(&self) -> bool {
        matches!(
            self.last_kind(),
            Some(TokenKind::Scalar(
                ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted
            ))
        )
    }

    fn scan_line(&mut self, lineno: usize, line: &str) {
        let indent = indentation(line);
        let blank = line.trim().is_empty();

        match self.mode {
            Mode::Block { parent_indent } => {
                if blank {
                    return;
                }
                if indent > parent_indent {
                    self.push(
                        TokenKind::Scalar(ScalarStyle::Block),
                        lineno,
                        indent..content_end(line),
                    );
                    return;
                }
                self.mode = Mode::Normal;
            }
            Mode::Quoted { quote } => {
                let start = line.len() - line.trim_start().len();
                match closing_quote(line, start, quote) {
                    Some(close) => {
                        let kind = TokenKind::Scalar(ScalarStyle::Continuation);
                        self.push(kind, lineno, start..close);
                        self.mode = Mode::Normal;
                        self.scan_pieces(lineno, line, close + 1, indent);
                    }
                    None => {
                        self.push(
                            TokenKind::Scalar(ScalarStyle::Continuation),
                            lineno,
                            start..content_end(line).max(start),
                        );
                    }
                }
                return;
            }
            Mode::Normal => {}
        }

        if blank || line.starts_with('%') {
            return;
        }
        let mut start = 0;
        for (marker, kind) in [("---", TokenKind::DocumentStart), ("...", TokenKind::DocumentEnd)] {
            if let Some(rest) = line.strip_prefix(marker) {
                if rest.is_empty() || rest.starts_with(char::is_whitespace) {
                    self.push(kind, lineno, 0..3);
                    self.flow_depth = 0;
                    start = 3;
                }
            }
        }

        let first = self.tokens.len();
        let continues_plain = start == 0
            && indent > 0
            && self.flow_depth == 0
            && matches!(
                self.last_kind(),
                Some(TokenKind::Scalar(ScalarStyle::Plain | ScalarStyle::Continuation))
            );
        self.scan_pieces(lineno, line, start, indent);

        // a lone plain scalar on an indented line continues the previous plain scalar
        let scanned = &mut self.tokens[first..];
        if continues_plain
            && scanned.len() == 1
            && scanned[0].kind == TokenKind::Scalar(ScalarStyle::Plain)
        {
            scanned[0].kind = TokenKind::Scalar(ScalarStyle::Continuation);
        }
    }

    fn scan_pieces(&mut self, lineno: usize, line: &str, offset: usize, indent: usize) {
        let text = &line[offset..];
        let mut lexer = Piece::lexer(text);
        let mut pieces: Vec<(Option<Piece>, Range<usize>)> = Vec::new();
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            pieces.push((result.ok(), offset + span.start..offset + span.end));
        }

        // pending plain scalar run: start of its first piece, end of its last one
        let mut plain: Option<Range<usize>> = None;
        let is_space = |piece: Option<&(Option<Piece>, Range<usize>)>| {
            matches!(piece, None | Some((Some(Piece::Whitespace), _)))
        };

        for index in 0..pieces.len() {
            let (piece, span) = pieces[index].clone();
            let spaced_before = index == 0 || is_space(pieces.get(index - 1));
            let spaced_after = is_space(pieces.get(index + 1));
            let idle = plain.is_none();
            let in_flow = self.flow_depth > 0;

            let kind = match piece {
                Some(Piece::Whitespace) => continue,
                Some(Piece::Hash) if spaced_before => break,
                Some(Piece::Dash) if idle && spaced_after && !in_flow => {
                    Some(TokenKind::BlockEntry)
                }
                Some(Piece::Question) if idle && spaced_after => Some(TokenKind::Key),
                Some(Piece::Colon)
                    if spaced_after || in_flow && closes_flow(pieces.get(index + 1)) =>
                {
                    Some(TokenKind::Value)
                }
                // JSON style `"key":value`
                Some(Piece::Colon) if idle && self.follows_quoted() => Some(TokenKind::Value),
                Some(Piece::Comma) if in_flow => Some(TokenKind::FlowEntry),
                Some(Piece::OpenBracket) if idle || in_flow => Some(TokenKind::FlowSequenceStart),
                Some(Piece::OpenBrace) if idle || in_flow => Some(TokenKind::FlowMappingStart),
                Some(Piece::CloseBracket) if in_flow => Some(TokenKind::FlowSequenceEnd),
                Some(Piece::CloseBrace) if in_flow => Some(TokenKind::FlowMappingEnd),
                Some(Piece::Property) if idle => Some(TokenKind::Property),
                Some(Piece::BlockIndicator)
                    if idle
                        && !in_flow
                        && matches!(
                            self.last_kind(),
                            Some(TokenKind::Value | TokenKind::BlockEntry | TokenKind::Property)
                        ) =>
                {
                    Some(TokenKind::BlockScalarHeader)
                }
                Some(Piece::DoubleQuoted) if idle => {
                    self.push(
                        TokenKind::Scalar(ScalarStyle::DoubleQuoted),
                        lineno,
                        span.start + 1..span.end - 1,
                    );
                    continue;
                }
                Some(Piece::SingleQuoted) if idle => {
                    self.push(
                        TokenKind::Scalar(ScalarStyle::SingleQuoted),
                        lineno,
                        span.start + 1..span.end - 1,
                    );
                    continue;
                }
                Some(Piece::DoubleQuotedOpen) if idle => {
                    self.push(
                        TokenKind::Scalar(ScalarStyle::DoubleQuoted),
                        lineno,
                        span.start + 1..content_end(line).max(span.start + 1),
                    );
                    self.mode = Mode::Quoted { quote: '"' };
                    return;
                }
                Some(Piece::SingleQuotedOpen) if idle => {
                    self.push(
                        TokenKind::Scalar(ScalarStyle::SingleQuoted),
                        lineno,
                        span.start + 1..content_end(line).max(span.start + 1),
                    );
                    self.mode = Mode::Quoted { quote: '\'' };
                    return;
                }
                _ => None,
            };

            match kind {
                Some(kind) => {
                    if let Some(run) = plain.take() {
                        self.push(TokenKind::Scalar(ScalarStyle::Plain), lineno, run);
                    }
                    match kind {
                        TokenKind::FlowSequenceStart | TokenKind::FlowMappingStart => {
                            self.flow_depth += 1
                        }
                        TokenKind::FlowSequenceEnd | TokenKind::FlowMappingEnd => {
                            self.flow_depth = self.flow_depth.saturating_sub(1)
                        }
                        TokenKind::BlockScalarHeader => {
                            self.mode = Mode::Block {
                                parent_indent: indent,
                            }
                        }
                        _ => {}
                    }
                    self.push(kind, lineno, span);
                }
                None => {
                    plain = Some(match plain {
                        Some(run) => run.start..span.end,
                        None => span,
                    });
                }
            }
        }

        if let Some(run) = plain {
            self.push(TokenKind::Scalar(ScalarStyle::Plain), lineno, run);
        }
    }
}

fn closes_flow(piece: Option<&(Option<Piece>, Range<usize>)>) -> bool {
    matches!(
        piece,
        Some((
            Some(Piece::Comma | Piece::CloseBracket | Piece::CloseBrace),
            _
        ))
    )
}

/// Byte offset of the quote closing a scalar continued from a previous line
fn closing_quote(line: &str, start: usize, quote: char) -> Option<usize> {
    let bytes = line.as_bytes();
    let mut i = start;
    while i < bytes.len() {
        match (bytes[i], quote) {
            (b'\\', '"') => i += 2,
            (b'"', '"') => return Some(i),
            (b'\'', '\'') if bytes.get(i + 1) == Some(&b'\'') => i += 2,
            (b'\'', '\'') => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::split_lines;

    fn kinds(source: &str) -> Vec<TokenKind> {
        scan(&split_lines(source)).into_iter().map(|t| t.kind).collect()
    }

    fn texts(source: &str) -> Vec<String> {
        let lines = split_lines(source);
        scan(&lines)
            .into_iter()
            .filter(|t| t.is_scalar())
            .map(|t| lines[t.line][t.span].to_string())
            .collect()
    }

    const PLAIN: TokenKind = TokenKind::Scalar(ScalarStyle::Plain);

    #[test]
    fn test_block_mapping() {
        assert_eq!(kinds("key: value"), vec![PLAIN, TokenKind::Value, PLAIN]);
        assert_eq!(texts("key: some value # note"), vec!["key", "some value"]);
    }

    #[test]
    fn test_plain_scalars_with_indicator_characters() {
        assert_eq!(texts("url: http://example.com/a#b"), vec!["url", "http://example.com/a#b"]);
        assert_eq!(texts("- -1"), vec!["-1"]);
        assert_eq!(texts("k: don't"), vec!["k", "don't"]);
    }

    #[test]
    fn test_block_sequence() {
        assert_eq!(
            kinds("- a\n- b: c"),
            vec![
                TokenKind::BlockEntry,
                PLAIN,
                TokenKind::BlockEntry,
                PLAIN,
                TokenKind::Value,
                PLAIN
            ]
        );
    }

    #[test]
    fn test_flow_collections() {
        assert_eq!(
            kinds("k: [a, 'b']"),
            vec![
                PLAIN,
                TokenKind::Value,
                TokenKind::FlowSequenceStart,
                PLAIN,
                TokenKind::FlowEntry,
                TokenKind::Scalar(ScalarStyle::SingleQuoted),
                TokenKind::FlowSequenceEnd,
            ]
        );
        assert_eq!(texts("{a: b, c: \"d\"}"), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn test_block_scalar() {
        let source = "text: |\n  first line\n\n  second\nnext: value";
        assert_eq!(
            kinds(source),
            vec![
                PLAIN,
                TokenKind::Value,
                TokenKind::BlockScalarHeader,
                TokenKind::Scalar(ScalarStyle::Block),
                TokenKind::Scalar(ScalarStyle::Block),
                PLAIN,
                TokenKind::Value,
                PLAIN,
            ]
        );
    }

    #[test]
    fn test_multi_line_scalars() {
        let source = "a: \"one\n  two\" \nb: long\n  plain";
        assert_eq!(texts(source), vec!["a", "one", "two", "b", "long", "plain"]);
        let tokens = scan(&split_lines(source));
        assert_eq!(tokens.last().map(|t| t.kind), Some(TokenKind::Scalar(ScalarStyle::Continuation)));
    }

    #[test]
    fn test_document_markers_and_directives() {
        assert_eq!(
            kinds("%YAML 1.2\n---\nk: v\n..."),
            vec![
                TokenKind::DocumentStart,
                PLAIN,
                TokenKind::Value,
                PLAIN,
                TokenKind::DocumentEnd
            ]
        );
    }

    #[test]
    fn test_comment_only_line() {
        assert!(kinds("# just a comment: here").is_empty());
    }
}
