//! Lexical query trees and the parsers for the four lexical modes.
//!
//! - `plain`: every lexeme ANDed
//! - `phrase`: every lexeme chained with the phrase operator
//! - `simple`: web-search syntax (`"quoted phrase"`, `or`, `-exclude`)
//! - `normal`: operator syntax (`&`, `|`, `!`, `<->`, `<N>`, parentheses, `:*`)

use crate::error::SearchError;
use ahash::AHashSet;

use super::index::LexicalIndex;
use super::tokenize::Analyzer;

/// A node of a parsed lexical query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum QueryNode {
    Term { lexeme: String, prefix: bool },
    Not(Box<Self>),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    /// `right` must occur exactly `distance` positions after the end of `left`.
    Phrase {
        left: Box<Self>,
        right: Box<Self>,
        distance: u32,
    },
}

/// A positive (non-negated) query term used for ranking and highlighting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct QueryTerm {
    pub(crate) lexeme: String,
    pub(crate) prefix: bool,
}

impl QueryTerm {
    pub(crate) fn matches_lexeme(&self, lexeme: &str) -> bool {
        if self.prefix {
            lexeme.starts_with(&self.lexeme)
        } else {
            lexeme == self.lexeme
        }
    }

    pub(crate) fn positions(&self, index: &LexicalIndex) -> Vec<u32> {
        if self.prefix {
            index.prefix_positions(&self.lexeme)
        } else {
            index.positions(&self.lexeme).to_vec()
        }
    }
}

/// A parsed lexical query. An empty query (every operand was a stop word) matches nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LexicalQuery {
    root: Option<QueryNode>,
}

impl LexicalQuery {
    #[cfg(test)]
    pub(crate) fn root(&self) -> Option<&QueryNode> {
        self.root.as_ref()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// `plainto_tsquery`-style: all lexemes ANDed.
    pub(crate) fn plain(text: &str, analyzer: &Analyzer) -> Self {
        let root = analyzer
            .lexemes(text)
            .into_iter()
            .map(|(_, lexeme)| term(lexeme, false))
            .reduce(|left, right| QueryNode::And(Box::new(left), Box::new(right)));
        Self { root }
    }

    /// `phraseto_tsquery`-style: all lexemes in order, gaps preserved.
    pub(crate) fn phrase(text: &str, analyzer: &Analyzer) -> Self {
        Self {
            root: phrase_chain(analyzer.lexemes(text), false),
        }
    }

    /// `websearch_to_tsquery`-style. Never fails.
    pub(crate) fn web(text: &str, analyzer: &Analyzer) -> Self {
        let mut clauses: Vec<Option<QueryNode>> = vec![None];
        let mut chars = text.char_indices().peekable();

        while let Some(&(i, c)) = chars.peek() {
            if c == '"' {
                chars.next();
                let quoted = read_quoted(text, i + 1, &mut chars);
                let node = phrase_chain(analyzer.lexemes(quoted), false);
                push_and(clauses.last_mut(), node);
                continue;
            }

            if c.is_whitespace() || (!c.is_alphanumeric() && c != '-') {
                chars.next();
                continue;
            }

            // A bare word, optionally prefixed by `-`
            let negated = c == '-';
            if negated {
                chars.next();
                // `-"quoted phrase"` excludes the whole phrase
                if let Some(&(j, '"')) = chars.peek() {
                    chars.next();
                    let quoted = read_quoted(text, j + 1, &mut chars);
                    let node = phrase_chain(analyzer.lexemes(quoted), false)
                        .map(|n| QueryNode::Not(Box::new(n)));
                    push_and(clauses.last_mut(), node);
                    continue;
                }
            }
            let start = chars.peek().map_or(text.len(), |&(j, _)| j);
            let mut end = text.len();
            while let Some(&(j, c)) = chars.peek() {
                if c.is_whitespace() || c == '"' {
                    end = j;
                    break;
                }
                chars.next();
            }
            let word = &text[start..end];

            if !negated && word.eq_ignore_ascii_case("or") {
                if clauses.last().is_some_and(Option::is_some) {
                    clauses.push(None);
                }
                continue;
            }

            let node = phrase_chain(analyzer.lexemes(word), false);
            let node = if negated {
                node.map(|n| QueryNode::Not(Box::new(n)))
            } else {
                node
            };
            push_and(clauses.last_mut(), node);
        }

        let root = clauses
            .into_iter()
            .flatten()
            .reduce(|left, right| QueryNode::Or(Box::new(left), Box::new(right)));
        Self { root }
    }

    /// `to_tsquery`-style operator syntax. Fails with [`SearchError::InvalidQuery`].
    pub(crate) fn normal(text: &str, analyzer: &Analyzer) -> Result<Self, SearchError> {
        let tokens = lex_operators(text)?;
        let mut parser = OperatorParser {
            tokens: &tokens,
            cursor: 0,
            analyzer,
            end: text.len(),
        };
        let root = parser.parse_or()?;
        if let Some(token) = parser.tokens.get(parser.cursor) {
            return Err(invalid(token.offset, "unexpected token after end of expression"));
        }
        Ok(Self { root })
    }

    /// Whether the index satisfies the query.
    pub(crate) fn matches(&self, index: &LexicalIndex) -> bool {
        self.root.as_ref().is_some_and(|root| node_matches(root, index))
    }

    /// Distinct positive terms, in first-occurrence order.
    pub(crate) fn positive_terms(&self) -> Vec<QueryTerm> {
        let mut seen = AHashSet::new();
        let mut terms = vec![];
        if let Some(root) = &self.root {
            collect_terms(root, &mut seen, &mut terms);
        }
        terms
    }

    /// Whether the root operator is AND or phrase (proximity ranking applies).
    pub(crate) fn is_conjunctive(&self) -> bool {
        matches!(
            self.root,
            Some(QueryNode::And(..) | QueryNode::Phrase { .. })
        )
    }
}

fn term(lexeme: String, prefix: bool) -> QueryNode {
    QueryNode::Term { lexeme, prefix }
}

/// Consumes up to and including the closing quote, returning the text from `start`.
///
/// An unterminated quote runs to the end of the input.
fn read_quoted<'a>(
    text: &'a str,
    start: usize,
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
) -> &'a str {
    let mut end = text.len();
    for (j, c) in chars.by_ref() {
        if c == '"' {
            end = j;
            break;
        }
    }
    &text[start..end]
}

fn push_and(slot: Option<&mut Option<QueryNode>>, node: Option<QueryNode>) {
    let (Some(slot), Some(node)) = (slot, node) else {
        return;
    };
    *slot = Some(match slot.take() {
        Some(existing) => QueryNode::And(Box::new(existing), Box::new(node)),
        None => node,
    });
}

/// Chains lexemes with phrase operators whose distances follow the word positions.
fn phrase_chain(lexemes: Vec<(u32, String)>, prefix_last: bool) -> Option<QueryNode> {
    let count = lexemes.len();
    let mut iter = lexemes.into_iter().enumerate();
    let (_, (mut last_position, first)) = iter.next()?;
    let mut node = term(first, prefix_last && count == 1);

    for (i, (position, lexeme)) in iter {
        node = QueryNode::Phrase {
            left: Box::new(node),
            right: Box::new(term(lexeme, prefix_last && i == count - 1)),
            distance: position - last_position,
        };
        last_position = position;
    }
    Some(node)
}

fn node_matches(node: &QueryNode, index: &LexicalIndex) -> bool {
    match node {
        QueryNode::Term { lexeme, prefix } => {
            if *prefix {
                index.contains_prefix(lexeme)
            } else {
                index.contains(lexeme)
            }
        }
        QueryNode::Not(inner) => !node_matches(inner, index),
        QueryNode::And(left, right) => node_matches(left, index) && node_matches(right, index),
        QueryNode::Or(left, right) => node_matches(left, index) || node_matches(right, index),
        QueryNode::Phrase { .. } => !node_spans(node, index).is_empty(),
    }
}

/// Spans `(start, end)` over which a node is satisfied, for phrase evaluation.
///
/// A multi-lexeme operand spans several positions; phrase distance is measured from the
/// end of `left` to the start of `right`. Negation has no positions, so a phrase
/// containing a negated operand never matches.
fn node_spans(node: &QueryNode, index: &LexicalIndex) -> Vec<(u32, u32)> {
    match node {
        QueryNode::Term { lexeme, prefix } => QueryTerm {
            lexeme: lexeme.clone(),
            prefix: *prefix,
        }
        .positions(index)
        .into_iter()
        .map(|position| (position, position))
        .collect(),
        QueryNode::Not(_) => vec![],
        QueryNode::And(left, right) => {
            let left = node_spans(left, index);
            let right = node_spans(right, index);
            if left.is_empty() || right.is_empty() {
                vec![]
            } else {
                merge_spans(left, right)
            }
        }
        QueryNode::Or(left, right) => {
            merge_spans(node_spans(left, index), node_spans(right, index))
        }
        QueryNode::Phrase {
            left,
            right,
            distance,
        } => {
            let mut left = node_spans(left, index);
            left.sort_unstable_by_key(|&(start, end)| (end, start));
            let mut spans = vec![];
            for (right_start, right_end) in node_spans(right, index) {
                let Some(target) = right_start.checked_sub(*distance) else {
                    continue;
                };
                let from = left.partition_point(|&(_, end)| end < target);
                spans.extend(
                    left[from..]
                        .iter()
                        .take_while(|&&(_, end)| end == target)
                        .map(|&(left_start, _)| (left_start, right_end)),
                );
            }
            spans.sort_unstable();
            spans.dedup();
            spans
        }
    }
}

fn merge_spans(mut left: Vec<(u32, u32)>, right: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    left.extend(right);
    left.sort_unstable();
    left.dedup();
    left
}

fn collect_terms(node: &QueryNode, seen: &mut AHashSet<QueryTerm>, terms: &mut Vec<QueryTerm>) {
    match node {
        QueryNode::Term { lexeme, prefix } => {
            let term = QueryTerm {
                lexeme: lexeme.clone(),
                prefix: *prefix,
            };
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
        QueryNode::Not(_) => {}
        QueryNode::And(left, right)
        | QueryNode::Or(left, right)
        | QueryNode::Phrase { left, right, .. } => {
            collect_terms(left, seen, terms);
            collect_terms(right, seen, terms);
        }
    }
}

fn invalid(offset: usize, reason: &str) -> SearchError {
    SearchError::InvalidQuery {
        offset,
        reason: reason.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Operand { text: String, prefix: bool },
    And,
    Or,
    Not,
    Follows(u32),
    Open,
    Close,
}

#[derive(Debug, Clone)]
struct Token {
    kind: TokenKind,
    offset: usize,
}

fn lex_operators(text: &str) -> Result<Vec<Token>, SearchError> {
    let mut tokens = vec![];
    let mut chars = text.char_indices().peekable();

    while let Some((offset, c)) = chars.next() {
        let kind = match c {
            c if c.is_whitespace() => continue,
            '&' => TokenKind::And,
            '|' => TokenKind::Or,
            '!' => TokenKind::Not,
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            '<' => {
                let mut inner = String::new();
                loop {
                    match chars.next() {
                        Some((_, '>')) => break,
                        Some((_, c)) => inner.push(c),
                        None => return Err(invalid(offset, "unterminated phrase operator")),
                    }
                }
                let distance = if inner == "-" {
                    1
                } else {
                    inner
                        .trim()
                        .parse::<u32>()
                        .map_err(|_| invalid(offset, "phrase distance must be '-' or a number"))?
                };
                TokenKind::Follows(distance)
            }
            '\'' => {
                let mut operand = String::new();
                loop {
                    match chars.next() {
                        Some((_, '\'')) => break,
                        Some((_, c)) => operand.push(c),
                        None => return Err(invalid(offset, "unterminated quoted operand")),
                    }
                }
                let prefix = lex_suffix(&mut chars);
                TokenKind::Operand {
                    text: operand,
                    prefix,
                }
            }
            ':' => return Err(invalid(offset, "weight or prefix marker without an operand")),
            _ => {
                let mut operand = String::from(c);
                while let Some(&(_, c)) = chars.peek() {
                    if c.is_whitespace() || "&|!()<':".contains(c) {
                        break;
                    }
                    operand.push(c);
                    chars.next();
                }
                let prefix = lex_suffix(&mut chars);
                TokenKind::Operand {
                    text: operand,
                    prefix,
                }
            }
        };
        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}

/// Consumes an optional `:*` / `:ABCD` suffix; returns whether it requested prefix matching.
fn lex_suffix(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> bool {
    if chars.peek().is_none_or(|&(_, c)| c != ':') {
        return false;
    }
    chars.next();
    let mut prefix = false;
    while let Some(&(_, c)) = chars.peek() {
        match c {
            '*' => prefix = true,
            'a'..='d' | 'A'..='D' => {}
            _ => break,
        }
        chars.next();
    }
    prefix
}

/// Recursive-descent parser over operator tokens.
///
/// Precedence, loosest first: `|`, `&`, phrase (`<->`, `<N>`), `!`.
/// Stop-word operands evaluate to `None` and are dropped from the tree.
struct OperatorParser<'a> {
    tokens: &'a [Token],
    cursor: usize,
    analyzer: &'a Analyzer,
    end: usize,
}

impl OperatorParser<'_> {
    fn peek(&self) -> Option<&TokenKind> {
        self.tokens.get(self.cursor).map(|t| &t.kind)
    }

    fn offset(&self) -> usize {
        self.tokens.get(self.cursor).map_or(self.end, |t| t.offset)
    }

    fn parse_or(&mut self) -> Result<Option<QueryNode>, SearchError> {
        let mut node = self.parse_and()?;
        while self.peek() == Some(&TokenKind::Or) {
            self.cursor += 1;
            let right = self.parse_and()?;
            node = combine(node, right, |l, r| QueryNode::Or(l, r));
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> Result<Option<QueryNode>, SearchError> {
        let mut node = self.parse_phrase()?;
        while self.peek() == Some(&TokenKind::And) {
            self.cursor += 1;
            let right = self.parse_phrase()?;
            node = combine(node, right, |l, r| QueryNode::And(l, r));
        }
        Ok(node)
    }

    fn parse_phrase(&mut self) -> Result<Option<QueryNode>, SearchError> {
        let mut node = self.parse_unary()?;
        while let Some(&TokenKind::Follows(distance)) = self.peek() {
            self.cursor += 1;
            let right = self.parse_unary()?;
            node = combine(node, right, |left, right| QueryNode::Phrase {
                left,
                right,
                distance,
            });
        }
        Ok(node)
    }

    fn parse_unary(&mut self) -> Result<Option<QueryNode>, SearchError> {
        let offset = self.offset();
        let Some(kind) = self.peek().cloned() else {
            return Err(invalid(offset, "expected an operand"));
        };
        self.cursor += 1;

        match kind {
            TokenKind::Not => Ok(self
                .parse_unary()?
                .map(|inner| QueryNode::Not(Box::new(inner)))),
            TokenKind::Open => {
                let inner = self.parse_or()?;
                if self.peek() != Some(&TokenKind::Close) {
                    return Err(invalid(self.offset(), "missing closing parenthesis"));
                }
                self.cursor += 1;
                Ok(inner)
            }
            TokenKind::Operand { text, prefix } => {
                Ok(phrase_chain(self.analyzer.lexemes(&text), prefix))
            }
            TokenKind::And | TokenKind::Or | TokenKind::Follows(_) | TokenKind::Close => {
                Err(invalid(offset, "expected an operand"))
            }
        }
    }
}

fn combine(
    left: Option<QueryNode>,
    right: Option<QueryNode>,
    join: impl FnOnce(Box<QueryNode>, Box<QueryNode>) -> QueryNode,
) -> Option<QueryNode> {
    match (left, right) {
        (Some(left), Some(right)) => Some(join(Box::new(left), Box::new(right))),
        (left, right) => left.or(right),
    }
}
