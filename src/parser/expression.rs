//! The WHERE-clause expression parser (spec.md §4.4): six passes over the
//! clause's token range, ending in a single reduced AST root. Bracket
//! folding runs before unary +/- disambiguation (swapped from spec.md
//! §4.4's listed pass order) so a folded `Braces` group counts as an
//! expression-bearing left neighbour — see `disambiguate_unary`.

use crate::ast::{FromItem, FromItemIdx};
use crate::error::SyntaxError;
use crate::lexer::{Arity, Keyword, OperatorKind, Span, Token, TokenTag};

/// Builds the WHERE AST from its raw token range, applying the passes
/// below in order. Returns the reduced root node (never an `Expression`
/// wrapper — that synthetic node is discarded once reduction leaves it a
/// single child).
pub fn parse_where(range_tokens: &[Token], from_item: &FromItem, source: &str) -> Result<Token, SyntaxError> {
    let mut children: Vec<Token> = range_tokens.to_vec();

    resolve_fields(&mut children, from_item, source)?;
    fold_is_null(&mut children);
    fold_brackets(&mut children, source)?;
    disambiguate_unary(&mut children);
    reject_unsupported_in_lists(&children, source)?;

    let span = children.first().map_or_else(Span::default, |first| {
        first.span.merge(children.last().map_or(first.span, |last| last.span))
    });
    let mut root = Token::compound(span, TokenTag::Expression, children);
    fold_operators(&mut root, source)?;
    elide_braces(&mut root);

    if root.children.len() != 1 {
        return Err(SyntaxError::new("malformed WHERE expression", root.span, source));
    }
    Ok(root.children.remove(0))
}

/// Pass 1: collapses maximal `Ident (. Ident)*` / `Alias (. Ident)*` chains
/// into single `Field` tokens, recursing through embedded properties.
fn resolve_fields(children: &mut Vec<Token>, from_item: &FromItem, source: &str) -> Result<(), SyntaxError> {
    let mut result = Vec::with_capacity(children.len());
    let mut i = 0;
    while i < children.len() {
        let head = &children[i];
        if !matches!(head.tag, TokenTag::Ident | TokenTag::Alias) {
            result.push(children[i].clone());
            i += 1;
            continue;
        }
        let is_alias = head.tag == TokenTag::Alias;
        let head_span = head.span;

        let mut name_indices = Vec::new();
        if !is_alias {
            name_indices.push(i);
        }
        let mut j = i + 1;
        loop {
            if j < children.len() && children[j].tag == TokenTag::Dot {
                if j + 1 < children.len() && children[j + 1].tag == TokenTag::Ident {
                    name_indices.push(j + 1);
                    j += 2;
                    continue;
                }
                return Err(SyntaxError::new("trailing `.` in property path", children[j].span, source));
            }
            break;
        }
        if is_alias && name_indices.is_empty() {
            return Err(SyntaxError::new("expected a property name after alias", head_span, source));
        }

        let mut entity = from_item.entity.clone();
        let mut last_property = None;
        let count = name_indices.len();
        for (k, &name_idx) in name_indices.iter().enumerate() {
            let name_token = &children[name_idx];
            let Some(property) = entity.find_property(&name_token.text) else {
                return Err(SyntaxError::new(
                    format!("unknown property `{}`", name_token.text),
                    name_token.span,
                    source,
                ));
            };
            let is_last = k + 1 == count;
            if !is_last && !property.is_embedded {
                return Err(SyntaxError::new(
                    format!("`{}` is not an embedded property, cannot continue the path", name_token.text),
                    name_token.span,
                    source,
                ));
            }
            if property.is_embedded {
                if let Some(referenced) = &property.referenced_entity {
                    entity = referenced.clone();
                }
            }
            if is_last && property.is_embedded {
                return Err(SyntaxError::new(
                    format!("`{}` is an embedded property, not a column; continue the path", name_token.text),
                    name_token.span,
                    source,
                ));
            }
            last_property = Some(property.clone());
        }

        let end_idx = name_indices.last().copied().unwrap_or(i);
        let field_span = head_span.merge(children[end_idx].span);
        let mut field = Token::new(field_span, TokenTag::Field, String::new());
        field.from_item = Some(FromItemIdx(0));
        field.property = last_property;
        result.push(field);
        i = j;
    }
    *children = result;
    Ok(())
}

/// Pass 2: folds `IS NULL` / `IS NOT NULL` into a single placeholder
/// operator token, scanning right-to-left to handle repeated occurrences
/// without index drift. No nested compound nodes exist yet at this pass,
/// so a single flat scan suffices.
fn fold_is_null(children: &mut Vec<Token>) {
    let mut i = children.len();
    while i > 0 {
        i -= 1;
        if children[i].tag != TokenTag::Operator || children[i].operator != Some(OperatorKind::Is) {
            continue;
        }
        let is_not_null = i + 2 < children.len()
            && children[i + 1].tag == TokenTag::Operator
            && children[i + 1].operator == Some(OperatorKind::Not)
            && children[i + 2].tag == TokenTag::Keyword
            && children[i + 2].keyword == Some(Keyword::Null);
        if is_not_null {
            let null_tok = children.remove(i + 2);
            children.remove(i + 1);
            let is_tok = &mut children[i];
            is_tok.operator = Some(OperatorKind::IsNotNull);
            is_tok.span = is_tok.span.merge(null_tok.span);
            continue;
        }
        let is_null = i + 1 < children.len()
            && children[i + 1].tag == TokenTag::Keyword
            && children[i + 1].keyword == Some(Keyword::Null);
        if is_null {
            let null_tok = children.remove(i + 1);
            let is_tok = &mut children[i];
            is_tok.operator = Some(OperatorKind::IsNull);
            is_tok.span = is_tok.span.merge(null_tok.span);
        }
    }
}

/// Pass 3: retags `+`/`-` operator tokens as unary when their immediate
/// left neighbour is not expression-bearing. Runs after bracket folding (out
/// of spec.md §4.4's listed order) and recurses into `Braces` children
/// first, so a parenthesized group immediately to the left of a `+`/`-`
/// counts as an expression-bearing left neighbour — otherwise `(a + b) - c`
/// would see the closing `)` (not expression-bearing on its own) and
/// misclassify `- c` as unary.
fn disambiguate_unary(children: &mut [Token]) {
    for child in children.iter_mut() {
        if child.tag == TokenTag::Braces {
            disambiguate_unary(&mut child.children);
        }
    }
    for i in 0..children.len() {
        let Some(op) = children[i].operator else { continue };
        if !matches!(op, OperatorKind::Add | OperatorKind::Sub) {
            continue;
        }
        let left_is_expr = i > 0 && children[i - 1].is_expression_bearing();
        if !left_is_expr {
            children[i].operator = Some(if op == OperatorKind::Add {
                OperatorKind::UnaryPlus
            } else {
                OperatorKind::UnaryMinus
            });
        }
    }
}

/// Pass 4 (folded before pass 3 above — see `disambiguate_unary`): repeatedly
/// folds the innermost `(...)` group — the last `(` preceding the first `)`
/// — into a `Braces` node.
fn fold_brackets(children: &mut Vec<Token>, source: &str) -> Result<(), SyntaxError> {
    loop {
        let Some(close_idx) = children.iter().position(|t| t.tag == TokenTag::CloseBracket) else {
            break;
        };
        let Some(open_idx) = children[..close_idx].iter().rposition(|t| t.tag == TokenTag::OpenBracket) else {
            return Err(SyntaxError::new("unmatched `)`", children[close_idx].span, source));
        };
        let inner: Vec<Token> = children.drain(open_idx + 1..close_idx).collect();
        let close_tok = children.remove(open_idx + 1);
        let open_tok = children.remove(open_idx);
        let span = open_tok.span.merge(close_tok.span);
        children.insert(open_idx, Token::compound(span, TokenTag::Braces, inner));
    }
    if let Some(unmatched) = children.iter().find(|t| t.tag == TokenTag::OpenBracket) {
        return Err(SyntaxError::new("unterminated `(`", unmatched.span, source));
    }
    Ok(())
}

/// SPEC_FULL.md §9: `IN (list)` is not emittable, so fail early with a
/// specific message rather than letting the generic "malformed expression"
/// fallback fire deep inside the parenthesized group.
fn reject_unsupported_in_lists(children: &[Token], source: &str) -> Result<(), SyntaxError> {
    for (i, token) in children.iter().enumerate() {
        let is_in = token.tag == TokenTag::Operator && token.operator == Some(OperatorKind::In);
        if !is_in {
            if token.tag == TokenTag::Braces {
                reject_unsupported_in_lists(&token.children, source)?;
            }
            continue;
        }
        if let Some(next) = children.get(i + 1) {
            if next.tag == TokenTag::Braces && next.children.iter().any(|t| t.tag == TokenTag::Comma) {
                return Err(SyntaxError::new(
                    "IN (...) value lists are not supported; use repeated OR comparisons",
                    token.span,
                    source,
                ));
            }
        }
    }
    Ok(())
}

/// Pass 5: recurses into compound children first, then repeatedly reduces
/// the highest-precedence operator (ties broken leftmost) at this level.
fn fold_operators(node: &mut Token, source: &str) -> Result<(), SyntaxError> {
    for child in &mut node.children {
        if matches!(child.tag, TokenTag::Braces | TokenTag::Expression) {
            fold_operators(child, source)?;
        }
    }
    reduce_level(&mut node.children, source)
}

fn pick_highest_precedence(children: &[Token]) -> Option<usize> {
    children
        .iter()
        .enumerate()
        .filter(|(_, t)| t.tag == TokenTag::Operator)
        .max_by_key(|(i, t)| (t.operator.expect("operator-tagged token carries an operator kind").precedence(), std::cmp::Reverse(*i)))
        .map(|(i, _)| i)
}

fn reduce_level(children: &mut Vec<Token>, source: &str) -> Result<(), SyntaxError> {
    while let Some(idx) = pick_highest_precedence(children) {
        let op = children[idx].operator.expect("selected by pick_highest_precedence");
        match op.arity() {
            Arity::UnaryPrefix => {
                if idx + 1 >= children.len() || !children[idx + 1].is_expression_bearing() {
                    return Err(SyntaxError::new(
                        format!("missing operand for {}", op.sql_text()),
                        children[idx].span,
                        source,
                    ));
                }
                let operand = children.remove(idx + 1);
                let mut node = children.remove(idx);
                node.span = node.span.merge(operand.span);
                node.tag = TokenTag::OpExpr;
                node.children = vec![operand];
                children.insert(idx, node);
            }
            Arity::UnaryPostfix => {
                if idx == 0 || !children[idx - 1].is_expression_bearing() {
                    return Err(SyntaxError::new(
                        format!("missing operand for {}", op.sql_text()),
                        children[idx].span,
                        source,
                    ));
                }
                let left = children.remove(idx - 1);
                let mut node = children.remove(idx - 1);
                node.span = left.span.merge(node.span);
                node.tag = TokenTag::OpExpr;
                node.children = vec![left];
                children.insert(idx - 1, node);
            }
            Arity::Between => {
                let well_formed = idx >= 1
                    && idx + 3 < children.len()
                    && children[idx - 1].is_expression_bearing()
                    && children[idx + 1].is_expression_bearing()
                    && children[idx + 2].tag == TokenTag::Operator
                    && children[idx + 2].operator == Some(OperatorKind::And)
                    && children[idx + 3].is_expression_bearing();
                if !well_formed {
                    return Err(SyntaxError::new(
                        "BETWEEN requires `x BETWEEN lo AND hi`",
                        children[idx].span,
                        source,
                    ));
                }
                let hi = children.remove(idx + 3);
                children.remove(idx + 2);
                let lo = children.remove(idx + 1);
                let x = children.remove(idx - 1);
                let mut node = children.remove(idx - 1);
                node.span = x.span.merge(hi.span);
                node.tag = TokenTag::OpExpr;
                node.children = vec![x, lo, hi];
                children.insert(idx - 1, node);
            }
            Arity::Binary => {
                let well_formed = idx >= 1
                    && idx + 1 < children.len()
                    && children[idx - 1].is_expression_bearing()
                    && children[idx + 1].is_expression_bearing();
                if !well_formed {
                    return Err(SyntaxError::new(
                        format!("missing operand for {}", op.sql_text()),
                        children[idx].span,
                        source,
                    ));
                }
                let right = children.remove(idx + 1);
                let left = children.remove(idx - 1);
                let mut node = children.remove(idx - 1);
                node.span = left.span.merge(right.span);
                node.tag = TokenTag::OpExpr;
                node.children = vec![left, right];
                children.insert(idx - 1, node);
            }
        }
    }
    if children.len() != 1 {
        let span = children.get(1).map_or_else(|| children.first().map_or_else(Span::default, |t| t.span), |t| t.span);
        return Err(SyntaxError::new("malformed expression", span, source));
    }
    Ok(())
}

/// Pass 6: a `Braces` node with exactly one child is replaced by that
/// child, so `(EXPR)` and `EXPR` emit identical SQL.
fn elide_braces(node: &mut Token) {
    for child in &mut node.children {
        elide_braces(child);
        if child.tag == TokenTag::Braces && child.children.len() == 1 {
            *child = child.children.remove(0);
        }
    }
}
