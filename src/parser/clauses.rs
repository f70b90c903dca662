//! Clause splitting (spec.md §4.2): locates the top-level SELECT/FROM/
//! WHERE/ORDER BY keywords and partitions the token stream into clause
//! ranges, validating their relative ordering.

use crate::error::SyntaxError;
use crate::lexer::{Keyword, Token, TokenTag};

/// Half-open `[start, end)` index range into the token slice.
pub type Range = std::ops::Range<usize>;

/// The clause boundaries found in one token stream.
#[derive(Debug, Clone)]
pub struct ClauseRanges {
    pub select: Option<Range>,
    pub from: Range,
    pub where_: Option<Range>,
    pub order_by: Option<Range>,
}

fn find_keyword(tokens: &[Token], keyword: Keyword) -> Option<usize> {
    tokens
        .iter()
        .position(|t| t.tag == TokenTag::Keyword && t.keyword == Some(keyword))
}

/// Splits `tokens` into clause ranges, per spec.md §4.2's ordering rules.
pub fn split(tokens: &[Token], source: &str) -> Result<ClauseRanges, SyntaxError> {
    let idx_select = find_keyword(tokens, Keyword::Select);
    let idx_from = find_keyword(tokens, Keyword::From).ok_or_else(|| {
        let span = tokens.first().map_or_else(crate::lexer::Span::default, |t| t.span);
        SyntaxError::new("missing FROM clause", span, source)
    })?;
    let idx_where = find_keyword(tokens, Keyword::Where);
    let idx_order = find_keyword(tokens, Keyword::Order);

    if let Some(idx_select) = idx_select {
        if idx_select >= idx_from {
            return Err(SyntaxError::new(
                "SELECT must precede FROM",
                tokens[idx_select].span,
                source,
            ));
        }
        if idx_select + 1 >= idx_from {
            return Err(SyntaxError::new(
                "SELECT clause must contain at least one item",
                tokens[idx_select].span,
                source,
            ));
        }
    }

    if let Some(idx_where) = idx_where {
        if idx_where <= idx_from {
            return Err(SyntaxError::new("WHERE must follow FROM", tokens[idx_where].span, source));
        }
    }

    if let Some(idx_order) = idx_order {
        if idx_order <= idx_from {
            return Err(SyntaxError::new("ORDER must follow FROM", tokens[idx_order].span, source));
        }
        if let Some(idx_where) = idx_where {
            if idx_order <= idx_where {
                return Err(SyntaxError::new("ORDER BY must follow WHERE", tokens[idx_order].span, source));
            }
        }
        let by_idx = idx_order + 1;
        let has_by = tokens
            .get(by_idx)
            .is_some_and(|t| t.tag == TokenTag::Keyword && t.keyword == Some(Keyword::By));
        if !has_by {
            return Err(SyntaxError::new("ORDER must be immediately followed by BY", tokens[idx_order].span, source));
        }
        if idx_order + 2 >= tokens.len() {
            return Err(SyntaxError::new(
                "ORDER BY clause must contain at least one item",
                tokens[idx_order].span,
                source,
            ));
        }
    }

    let from_end = idx_where.or(idx_order).unwrap_or(tokens.len());
    let where_end = idx_order.unwrap_or(tokens.len());

    Ok(ClauseRanges {
        select: idx_select.map(|s| (s + 1)..idx_from),
        from: (idx_from + 1)..from_end,
        where_: idx_where.map(|w| (w + 1)..where_end),
        order_by: idx_order.map(|o| (o + 2)..tokens.len()),
    })
}
