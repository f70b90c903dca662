//! From/Select/OrderBy clause interpretation (spec.md §4.3).

use crate::ast::{FromItem, FromItemIdx, OrderByItem, SelectItem};
use crate::error::SyntaxError;
use crate::lexer::{Keyword, Token, TokenTag};
use crate::schema::Schema;

use super::clauses::Range;

/// Parses the FROM clause, resolves the entity, and retags every matching
/// `Ident` occurrence across the *entire* token stream to `Entity`/`Alias`
/// so the expression parser's field-resolution pass can recognize them
/// later (spec.md §4.3).
pub fn parse_from(
    tokens: &mut [Token],
    range: Range,
    schema: &dyn Schema,
    source: &str,
) -> Result<FromItem, SyntaxError> {
    let slice = &tokens[range.clone()];
    if slice.is_empty() {
        let span = tokens.get(range.start).or_else(|| tokens.last()).map_or_else(crate::lexer::Span::default, |t| t.span);
        return Err(SyntaxError::new("FROM clause is empty", span, source));
    }
    let entity_token = &slice[0];
    if entity_token.tag != TokenTag::Ident {
        return Err(SyntaxError::new("expected an entity name in FROM", entity_token.span, source));
    }
    let entity_name = entity_token.text.clone();
    let entity = schema.find_entity(&entity_name).ok_or_else(|| {
        SyntaxError::new(format!("unknown entity `{entity_name}`"), entity_token.span, source)
    })?;

    let user_alias = match slice.len() {
        1 => None,
        2 => {
            if slice[1].tag != TokenTag::Ident {
                return Err(SyntaxError::new("expected an alias after the entity name", slice[1].span, source));
            }
            Some(slice[1].text.clone())
        }
        3 => {
            let as_kw = &slice[1];
            if !(as_kw.tag == TokenTag::Keyword && as_kw.keyword == Some(Keyword::As)) {
                return Err(SyntaxError::new("expected AS before the alias", as_kw.span, source));
            }
            if slice[2].tag != TokenTag::Ident {
                return Err(SyntaxError::new("expected an alias after AS", slice[2].span, source));
            }
            Some(slice[2].text.clone())
        }
        _ => return Err(SyntaxError::new("malformed FROM clause", slice[3].span, source)),
    };

    for token in tokens.iter_mut() {
        if token.tag == TokenTag::Ident && token.text == entity_name {
            token.tag = TokenTag::Entity;
            token.entity = Some(entity.clone());
        }
    }
    if let Some(alias) = &user_alias {
        for token in tokens.iter_mut() {
            if token.tag == TokenTag::Ident && token.text == *alias {
                token.tag = TokenTag::Alias;
            }
        }
    }

    Ok(FromItem { entity_name, entity, user_alias, sql_alias: "_t1".to_string() })
}

fn split_top_level_commas(slice: &[Token]) -> Vec<&[Token]> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, token) in slice.iter().enumerate() {
        match token.tag {
            TokenTag::OpenBracket => depth += 1,
            TokenTag::CloseBracket => depth -= 1,
            TokenTag::Comma if depth == 0 => {
                items.push(&slice[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&slice[start..]);
    items
}

/// Resolves a bare-property or `alias.property` item against the sole
/// `FromItem` this core supports (spec.md §1 Non-goals: no JOIN). Returns
/// `(FromItemIdx, property_name_token)`.
fn resolve_item_head<'a>(
    item: &'a [Token],
    from_item: &FromItem,
    source: &str,
) -> Result<(&'a Token, &'a [Token]), SyntaxError> {
    if item.is_empty() {
        return Err(SyntaxError::new("empty item", crate::lexer::Span::default(), source));
    }
    let head = &item[0];
    if head.tag == TokenTag::Alias {
        if item.len() >= 3 && item[1].tag == TokenTag::Dot {
            return Ok((&item[2], &item[3..]));
        }
        return Err(SyntaxError::new("expected `.` after alias", head.span, source));
    }
    if head.tag == TokenTag::Ident {
        let _ = from_item;
        return Ok((head, &item[1..]));
    }
    Err(SyntaxError::new("expected a property name or alias", head.span, source))
}

/// Parses the SELECT clause. `None` range means no SELECT was written, in
/// which case the default whole-entity projection applies.
pub fn parse_select(
    tokens: &[Token],
    range: Option<Range>,
    from_item: &FromItem,
    source: &str,
) -> Result<Vec<SelectItem>, SyntaxError> {
    let Some(range) = range else {
        return Ok(vec![SelectItem { from_item: FromItemIdx(0), property: None }]);
    };
    let slice = &tokens[range];
    let groups = split_top_level_commas(slice);

    let mut items = Vec::new();
    for group in groups {
        if group.len() == 1 && group[0].tag == TokenTag::Alias {
            items.push(SelectItem { from_item: FromItemIdx(0), property: None });
            continue;
        }
        let (name_tok, rest) = resolve_item_head(group, from_item, source)?;
        if !rest.is_empty() {
            return Err(SyntaxError::new("unexpected tokens after property", rest[0].span, source));
        }
        let property = from_item.entity.find_property(&name_tok.text).ok_or_else(|| {
            SyntaxError::new(format!("unknown property `{}`", name_tok.text), name_tok.span, source)
        })?;
        if property.is_embedded {
            return Err(SyntaxError::new(
                format!("`{}` is an embedded property, not a column", name_tok.text),
                name_tok.span,
                source,
            ));
        }
        items.push(SelectItem { from_item: FromItemIdx(0), property: Some(property.clone()) });
    }

    let whole_entity_count = items.iter().filter(|i| i.property.is_none()).count();
    if whole_entity_count > 0 && items.len() > 1 {
        return Err(SyntaxError::new(
            "cannot mix a whole-entity projection with property items",
            slice[0].span,
            source,
        ));
    }
    Ok(items)
}

/// Parses the ORDER BY clause.
pub fn parse_order_by(
    tokens: &[Token],
    range: Range,
    from_item: &FromItem,
    source: &str,
) -> Result<Vec<OrderByItem>, SyntaxError> {
    let slice = &tokens[range];
    let groups = split_top_level_commas(slice);

    let mut items = Vec::new();
    for group in groups {
        if group.is_empty() {
            return Err(SyntaxError::new("empty ORDER BY item", crate::lexer::Span::default(), source));
        }
        let mut ascending = true;
        let mut body = group;
        if let Some(last) = group.last() {
            if last.tag == TokenTag::Keyword && last.keyword == Some(Keyword::Asc) {
                body = &group[..group.len() - 1];
            } else if last.tag == TokenTag::Keyword && last.keyword == Some(Keyword::Desc) {
                ascending = false;
                body = &group[..group.len() - 1];
            }
        }
        let (name_tok, rest) = resolve_item_head(body, from_item, source)?;
        if !rest.is_empty() {
            return Err(SyntaxError::new("unexpected tokens in ORDER BY item", rest[0].span, source));
        }
        let property = from_item.entity.find_property(&name_tok.text).ok_or_else(|| {
            SyntaxError::new(format!("unknown property `{}`", name_tok.text), name_tok.span, source)
        })?;
        if property.is_embedded {
            return Err(SyntaxError::new(
                format!("`{}` is an embedded property, not a column", name_tok.text),
                name_tok.span,
                source,
            ));
        }
        items.push(OrderByItem { from_item: FromItemIdx(0), property: property.clone(), ascending });
    }
    Ok(items)
}
