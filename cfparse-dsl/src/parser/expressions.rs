//! Expression productions, loosest binding first:
//!
//! ```text
//! ternary    ?:                       right-assoc
//! or, and
//! not                                 prefix
//! comparison == != < > <= >= in       non-assoc, plus `not in`, `is defined`
//! additive   + -
//! multiplicative * / %
//! power      **                       right-assoc
//! unary      -                        numeric literals only
//! postfix    .attr  [key]  [k=v]
//! primary
//! ```

use super::ast::*;
use super::parser::Parser;
use super::statements::{is_var_ref, var_path};
use crate::lexer::TokenKind;
use crate::strings::interpolation::{
    convert_to_references, has_placeholders, locate_fstring_fields, locate_placeholders,
};
use crate::strings::{decode_escapes, multiline_body, Decoded};
use cfparse_core::{LocatableString, ParseError, ParseResult, WarningKind};

const STRING_ESCAPE: &str = "Invalid escape sequence in string.";
const MULTILINE_ESCAPE: &str = "Invalid escape sequence in multi-line string.";
const FSTRING_ESCAPE: &str = "Invalid escape sequence in f-string.";

type Keywords = Vec<(LocatableString, Expression)>;

impl Parser<'_> {
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        self.nested(|p| p.parse_ternary())
    }

    pub(crate) fn binary(
        &self,
        op: BinaryOperator,
        left: Expression,
        right: Expression,
    ) -> Expression {
        let location = left.location.merge(&right.location);
        let lexpos = left.lexpos;
        self.expression(
            ExpressionKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            location,
            lexpos,
        )
    }

    fn node(&self, kind: ExpressionKind, start: usize) -> Expression {
        self.expression(kind, self.range_from(start), self.lexpos(start))
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn parse_ternary(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        let condition = self.parse_or()?;
        if !self.check(&TokenKind::Question) {
            return Ok(condition);
        }
        self.advance();
        let if_true = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let if_false = self.parse_expression()?;
        Ok(self.node(
            ExpressionKind::Conditional {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            },
            start,
        ))
    }

    fn parse_or(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_and()?;
        while self.check(&TokenKind::Or) {
            self.advance();
            let right = self.parse_and()?;
            left = self.binary(BinaryOperator::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_not()?;
        while self.check(&TokenKind::And) {
            self.advance();
            let right = self.parse_not()?;
            left = self.binary(BinaryOperator::And, left, right);
        }
        Ok(left)
    }

    fn parse_not(&mut self) -> ParseResult<Expression> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.pos;
        self.advance();
        let inner = self.nested(|p| p.parse_not())?;
        Ok(self.node(ExpressionKind::Not(Box::new(inner)), start))
    }

    fn parse_comparison(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        let left = self.parse_additive()?;
        let op = match self.current().kind {
            TokenKind::Eq => BinaryOperator::Equals,
            TokenKind::Ne => BinaryOperator::NotEqual,
            TokenKind::Lt => BinaryOperator::LessThan,
            TokenKind::Gt => BinaryOperator::GreaterThan,
            TokenKind::Le => BinaryOperator::LessThanOrEqual,
            TokenKind::Ge => BinaryOperator::GreaterThanOrEqual,
            TokenKind::In => BinaryOperator::In,
            TokenKind::Not if matches!(self.peek(1).kind, TokenKind::In) => {
                self.advance();
                self.advance();
                let right = self.parse_additive()?;
                let membership = self.binary(BinaryOperator::In, left, right);
                return Ok(self.node(ExpressionKind::Not(Box::new(membership)), start));
            }
            TokenKind::Is => return self.parse_is_defined(left),
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_additive()?;
        Ok(self.binary(op, left, right))
    }

    /// `x is defined`, `a.b is defined`, or `m[k] is defined` which expands to
    /// `k in m and m[k] != null and m[k] != []`.
    fn parse_is_defined(&mut self, subject: Expression) -> ParseResult<Expression> {
        let is_idx = self.pos;
        self.advance();
        self.expect(TokenKind::Defined)?;
        let location = subject.location.merge(&self.token_range(self.pos - 1));
        let lexpos = subject.lexpos;

        let kind = match subject.kind {
            ExpressionKind::AttributeReference {
                instance,
                attribute,
            } => ExpressionKind::IsDefined {
                instance: Some(instance),
                attribute,
            },
            ExpressionKind::Reference(name) if !name.value.contains("::") => {
                ExpressionKind::IsDefined {
                    instance: None,
                    attribute: name,
                }
            }
            ExpressionKind::MapLookup { themap, key } => {
                let lookup = self.expression(
                    ExpressionKind::MapLookup {
                        themap: themap.clone(),
                        key: key.clone(),
                    },
                    subject.location.clone(),
                    lexpos,
                );
                let null =
                    self.expression(ExpressionKind::Literal(Value::Null), location.clone(), lexpos);
                let empty = self.expression(
                    ExpressionKind::CreateList(Vec::new()),
                    location.clone(),
                    lexpos,
                );
                let present = self.binary(BinaryOperator::In, *key, *themap);
                let not_null = self.binary(BinaryOperator::NotEqual, lookup.clone(), null);
                let not_empty = self.binary(BinaryOperator::NotEqual, lookup, empty);
                let both = self.binary(BinaryOperator::And, present, not_null);
                return Ok(self.binary(BinaryOperator::And, both, not_empty));
            }
            _ => return Err(self.unexpected_at(is_idx)),
        };
        Ok(self.expression(kind, location, lexpos))
    }

    fn parse_additive(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_multiplicative()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Plus => BinaryOperator::Add,
                TokenKind::Minus => BinaryOperator::Subtract,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_multiplicative()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_multiplicative(&mut self) -> ParseResult<Expression> {
        let mut left = self.parse_power()?;
        loop {
            let op = match self.current().kind {
                TokenKind::Star => BinaryOperator::Multiply,
                TokenKind::Slash => BinaryOperator::Divide,
                TokenKind::Percent => BinaryOperator::Modulo,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_power()?;
            left = self.binary(op, left, right);
        }
    }

    fn parse_power(&mut self) -> ParseResult<Expression> {
        let base = self.parse_unary()?;
        if !self.check(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        self.advance();
        let exponent = self.nested(|p| p.parse_power())?;
        Ok(self.binary(BinaryOperator::Power, base, exponent))
    }

    fn parse_unary(&mut self) -> ParseResult<Expression> {
        if self.check(&TokenKind::Minus)
            && matches!(self.peek(1).kind, TokenKind::Integer(_) | TokenKind::Float(_))
        {
            return self.parse_negative_number();
        }
        self.parse_postfix()
    }

    // ========================================================================
    // Postfix
    // ========================================================================

    fn parse_postfix(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        let mut expr = self.parse_primary()?;
        loop {
            match self.current().kind {
                TokenKind::Dot => match &self.peek(1).kind {
                    TokenKind::Id(name) => {
                        let attribute = self.locatable(name.clone(), self.pos + 1);
                        self.advance();
                        self.advance();
                        expr = self.node(
                            ExpressionKind::AttributeReference {
                                instance: Box::new(expr),
                                attribute,
                            },
                            start,
                        );
                    }
                    TokenKind::ClassId(class) if is_var_ref(&expr) => {
                        let name = format!("{}.{}", var_path(&expr), class);
                        let location = expr.location.merge(&self.token_range(self.pos + 1));
                        return Err(ParseError::invalid_namespace_access(location, name));
                    }
                    _ => return Err(self.unexpected_at(self.pos + 1)),
                },
                TokenKind::LParen => {
                    if matches!(expr.kind, ExpressionKind::AttributeReference { .. }) {
                        return Err(ParseError::invalid_namespace_access(
                            expr.location.clone(),
                            var_path(&expr),
                        ));
                    }
                    return Err(self.unexpected());
                }
                TokenKind::LBracket => expr = self.parse_subscript(expr, start)?,
                _ => return Ok(expr),
            }
        }
    }

    /// Whether the cursor is at `name =` or `**`, the start of a keyword list.
    fn at_keyword_argument(&self) -> bool {
        matches!(
            (&self.current().kind, &self.peek(1).kind),
            (TokenKind::Id(_), TokenKind::Assign) | (TokenKind::DoubleStar, _)
        )
    }

    fn parse_subscript(&mut self, base: Expression, start: usize) -> ParseResult<Expression> {
        let bracket = self.pos;
        self.expect(TokenKind::LBracket)?;

        if self.at_keyword_argument() {
            let (query, wrapped_kwargs) = self.parse_param_list(&TokenKind::RBracket)?;
            self.expect(TokenKind::RBracket)?;
            return match base.kind {
                ExpressionKind::AttributeReference {
                    instance,
                    attribute,
                } => Ok(self.node(
                    ExpressionKind::ShortIndexLookup {
                        rootobject: instance,
                        relation: attribute,
                        query,
                        wrapped_kwargs,
                    },
                    start,
                )),
                _ => Err(self.unexpected_at(bracket)),
            };
        }

        let key = self.parse_expression()?;
        self.expect(TokenKind::RBracket)?;
        Ok(self.node(
            ExpressionKind::MapLookup {
                themap: Box::new(base),
                key: Box::new(key),
            },
            start,
        ))
    }

    /// `name = expr` and `**expr` items up to (not including) `close`.
    fn parse_param_list(&mut self, close: &TokenKind) -> ParseResult<(Keywords, Vec<Expression>)> {
        let mut keywords = Vec::new();
        let mut wrapped = Vec::new();
        while !self.check(close) {
            if self.check(&TokenKind::DoubleStar) {
                self.advance();
                wrapped.push(self.parse_expression()?);
            } else {
                let key = self.expect_definition_name()?;
                self.expect(TokenKind::Assign)?;
                keywords.push((key, self.parse_expression()?));
            }
            if !self.optional_comma() {
                break;
            }
        }
        Ok((keywords, wrapped))
    }

    /// `expr (',' expr)*`
    pub(crate) fn parse_operand_list(&mut self) -> ParseResult<Vec<Expression>> {
        let mut operands = vec![self.parse_expression()?];
        while self.optional_comma() {
            operands.push(self.parse_expression()?);
        }
        Ok(operands)
    }

    // ========================================================================
    // Primary
    // ========================================================================

    fn parse_primary(&mut self) -> ParseResult<Expression> {
        match self.current().kind {
            TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::String(_)
            | TokenKind::RawString(_)
            | TokenKind::FString(_)
            | TokenKind::MultiLineString { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => self.parse_literal(),
            TokenKind::Regex { .. } => self.parse_regex_literal(),
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::LBracket => self.parse_list(),
            TokenKind::LBrace => self.parse_dict_literal(),
            TokenKind::Id(_) | TokenKind::ClassId(_) => self.parse_name_expression(),
            _ => Err(self.unexpected()),
        }
    }

    /// Variable reference, function call, constructor or index lookup.
    fn parse_name_expression(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        let mut path = String::new();
        let mut is_class = false;
        loop {
            match &self.current().kind {
                TokenKind::Id(name) => {
                    path.push_str(name);
                    self.advance();
                    if self.check(&TokenKind::DoubleColon)
                        && matches!(self.peek(1).kind, TokenKind::Id(_) | TokenKind::ClassId(_))
                    {
                        path.push_str("::");
                        self.advance();
                        continue;
                    }
                    break;
                }
                TokenKind::ClassId(name) => {
                    path.push_str(name);
                    self.advance();
                    is_class = true;
                    break;
                }
                _ => return Err(self.unexpected()),
            }
        }
        let name = LocatableString::new(
            path,
            self.range_from(start),
            self.lexpos(start),
            self.namespace.clone(),
        );

        if is_class {
            let (close, is_constructor) = match self.current().kind {
                TokenKind::LParen => (TokenKind::RParen, true),
                TokenKind::LBracket => (TokenKind::RBracket, false),
                _ => return Err(self.unexpected()),
            };
            self.advance();
            let (keywords, wrapped_kwargs) = self.parse_param_list(&close)?;
            self.expect(close)?;
            let kind = if is_constructor {
                ExpressionKind::Constructor {
                    class_type: name,
                    attributes: keywords,
                    wrapped_kwargs,
                }
            } else {
                ExpressionKind::IndexLookup {
                    index_type: name,
                    query: keywords,
                    wrapped_kwargs,
                }
            };
            return Ok(self.node(kind, start));
        }

        if self.check(&TokenKind::LParen) {
            return self.parse_function_call(name, start);
        }
        let (location, lexpos) = (name.location.clone(), name.lexpos);
        Ok(self.expression(ExpressionKind::Reference(name), location, lexpos))
    }

    /// Positional, keyword and `**` arguments in any order.
    fn parse_function_call(
        &mut self,
        name: LocatableString,
        start: usize,
    ) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen)?;
        let mut arguments = Vec::new();
        let mut kwargs = Vec::new();
        let mut wrapped_kwargs = Vec::new();
        while !self.check(&TokenKind::RParen) {
            if self.check(&TokenKind::DoubleStar) {
                self.advance();
                wrapped_kwargs.push(self.parse_expression()?);
            } else if self.at_keyword_argument() {
                let key = self.expect_definition_name()?;
                self.expect(TokenKind::Assign)?;
                kwargs.push((key, self.parse_expression()?));
            } else {
                arguments.push(self.parse_expression()?);
            }
            if !self.optional_comma() {
                break;
            }
        }
        self.expect(TokenKind::RParen)?;
        Ok(self.node(
            ExpressionKind::FunctionCall {
                name,
                arguments,
                kwargs,
                wrapped_kwargs,
            },
            start,
        ))
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Constant items are spliced into a single literal list.
    fn fold_list(&self, items: Vec<Expression>, start: usize) -> Expression {
        let constants: Option<Vec<Value>> = items.iter().map(Expression::try_constant).collect();
        match constants {
            Some(values) => {
                let mut folded = Vec::new();
                for value in values {
                    match value {
                        Value::List(inner) => folded.extend(inner),
                        other => folded.push(other),
                    }
                }
                self.node(ExpressionKind::Literal(Value::List(folded)), start)
            }
            None => self.node(ExpressionKind::CreateList(items), start),
        }
    }

    fn parse_list(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        self.expect(TokenKind::LBracket)?;
        if self.check(&TokenKind::RBracket) {
            self.advance();
            return Ok(self.node(ExpressionKind::Literal(Value::List(Vec::new())), start));
        }

        let first = self.parse_expression()?;
        if self.check(&TokenKind::For) {
            return self.parse_list_comprehension(first, start);
        }

        let mut items = vec![first];
        while self.optional_comma() {
            if self.check(&TokenKind::RBracket) {
                break;
            }
            items.push(self.parse_expression()?);
        }
        self.expect(TokenKind::RBracket)?;
        Ok(self.fold_list(items, start))
    }

    /// `[value for x in xs for y in ys if guard if guard]`
    ///
    /// The first `for` clause is the outermost loop; guards apply to the
    /// innermost one.
    fn parse_list_comprehension(
        &mut self,
        value: Expression,
        start: usize,
    ) -> ParseResult<Expression> {
        let mut clauses = Vec::new();
        while self.check(&TokenKind::For) {
            self.advance();
            let variable = self.expect_definition_name()?;
            self.expect(TokenKind::In)?;
            let iterable = self.parse_expression()?;
            clauses.push((variable, iterable));
        }

        let mut guard: Option<Expression> = None;
        while self.check(&TokenKind::If) {
            self.advance();
            let condition = self.parse_expression()?;
            guard = Some(match guard {
                Some(previous) => self.binary(BinaryOperator::And, previous, condition),
                None => condition,
            });
        }
        self.expect(TokenKind::RBracket)?;

        let mut clauses = clauses.into_iter().rev();
        let Some((variable, iterable)) = clauses.next() else {
            return Err(self.unexpected());
        };
        let mut comprehension = self.node(
            ExpressionKind::ListComprehension {
                value_expression: Box::new(value),
                variable,
                iterable: Box::new(iterable),
                guard: guard.map(Box::new),
            },
            start,
        );
        for (variable, iterable) in clauses {
            comprehension = self.node(
                ExpressionKind::ListComprehension {
                    value_expression: Box::new(comprehension),
                    variable,
                    iterable: Box::new(iterable),
                    guard: None,
                },
                start,
            );
        }
        Ok(comprehension)
    }

    /// `{"key": expr, ...}`; constant dictionaries fold into one literal,
    /// later duplicate keys replacing earlier values.
    pub(crate) fn parse_dict_literal(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        self.expect(TokenKind::LBrace)?;
        let mut pairs = Vec::new();
        while !self.check(&TokenKind::RBrace) {
            let key = self.parse_dict_key()?;
            self.expect(TokenKind::Colon)?;
            pairs.push((key, self.parse_expression()?));
            if !self.optional_comma() {
                break;
            }
        }
        self.expect(TokenKind::RBrace)?;

        let constants: Option<Vec<(String, Value)>> = pairs
            .iter()
            .map(|(key, value)| value.try_constant().map(|c| (key.clone(), c)))
            .collect();
        let kind = match constants {
            Some(entries) => {
                let mut dict = Vec::new();
                for (key, value) in entries {
                    Value::dict_insert(&mut dict, key, value);
                }
                ExpressionKind::Literal(Value::Dict(dict))
            }
            None => ExpressionKind::CreateDict(pairs),
        };
        Ok(self.node(kind, start))
    }

    fn parse_dict_key(&mut self) -> ParseResult<String> {
        let idx = self.pos;
        match &self.current().kind {
            TokenKind::String(raw) => {
                let raw = raw.clone();
                self.advance();
                let key = self.decode(&raw, idx, STRING_ESCAPE);
                if has_placeholders(&key) {
                    return Err(self.error(
                        self.token_range(idx),
                        &key,
                        "String interpolation is not supported in dictionary keys. \
                         Use raw string to use a key containing double curly brackets",
                    ));
                }
                Ok(key)
            }
            TokenKind::RawString(raw) => {
                let key = raw.clone();
                self.advance();
                Ok(key)
            }
            _ => Err(self.unexpected()),
        }
    }

    // ========================================================================
    // Constants
    // ========================================================================

    /// Attribute default: a literal, a negative number or a regex.
    pub(crate) fn parse_constant(&mut self) -> ParseResult<Expression> {
        match self.current().kind {
            TokenKind::Minus => self.parse_negative_number(),
            TokenKind::Integer(_)
            | TokenKind::Float(_)
            | TokenKind::String(_)
            | TokenKind::RawString(_)
            | TokenKind::FString(_)
            | TokenKind::MultiLineString { .. }
            | TokenKind::True
            | TokenKind::False
            | TokenKind::Null => self.parse_literal(),
            TokenKind::Regex { .. } => self.parse_regex_literal(),
            _ => Err(self.unexpected()),
        }
    }

    /// `matching /pattern/` as a value, tested against the anonymous `self`.
    pub(crate) fn parse_regex_literal(&mut self) -> ParseResult<Expression> {
        let idx = self.pos;
        let (pattern, slash_offset) = match &self.current().kind {
            TokenKind::Regex {
                pattern,
                slash_offset,
            } => (pattern.clone(), *slash_offset),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        self.build_regex(idx, &pattern, slash_offset)
    }

    /// `[constant, ...]` attribute default.
    pub(crate) fn parse_constant_list(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        self.expect(TokenKind::LBracket)?;
        let mut items = Vec::new();
        while !self.check(&TokenKind::RBracket) {
            items.push(self.parse_constant()?);
            if !self.optional_comma() {
                break;
            }
        }
        self.expect(TokenKind::RBracket)?;
        Ok(self.fold_list(items, start))
    }

    fn parse_int(&self, text: &str, idx: usize) -> ParseResult<i64> {
        text.parse::<i64>().map_err(|_| {
            self.error(
                self.token_range(idx),
                text,
                format!("Integer literal {} is out of range", text),
            )
        })
    }

    fn parse_float(&self, text: &str, idx: usize) -> ParseResult<f64> {
        text.parse::<f64>().map_err(|_| {
            self.error(
                self.token_range(idx),
                text,
                format!("Invalid float literal {}", text),
            )
        })
    }

    fn parse_negative_number(&mut self) -> ParseResult<Expression> {
        let start = self.pos;
        self.expect(TokenKind::Minus)?;
        let idx = self.pos;
        let value = match &self.current().kind {
            TokenKind::Integer(text) => Value::Int(self.parse_int(&format!("-{}", text), idx)?),
            TokenKind::Float(text) => Value::Float(-self.parse_float(text, idx)?),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(self.node(ExpressionKind::Literal(value), start))
    }

    /// Decode escapes in a quoted body, warning once if any were invalid.
    pub(crate) fn decode(&self, raw: &str, idx: usize, message: &str) -> String {
        let Decoded { value, invalid } = decode_escapes(raw);
        if invalid {
            self.warn(
                WarningKind::InvalidEscape,
                self.token_range(idx),
                Some(value.clone()),
                message,
            );
        }
        value
    }

    pub(crate) fn parse_literal(&mut self) -> ParseResult<Expression> {
        let idx = self.pos;
        let kind = self.current().kind.clone();
        self.advance();

        let value = match kind {
            TokenKind::Integer(text) => Value::Int(self.parse_int(&text, idx)?),
            TokenKind::Float(text) => Value::Float(self.parse_float(&text, idx)?),
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Null => Value::Null,
            TokenKind::RawString(text) => Value::String(text),
            TokenKind::String(raw) => {
                let text = self.decode(&raw, idx, STRING_ESCAPE);
                return Ok(self.interpolated(text, idx, 1));
            }
            TokenKind::MultiLineString { quotes, raw } => {
                let text = self.decode(multiline_body(&raw, quotes), idx, MULTILINE_ESCAPE);
                return Ok(self.interpolated(text, idx, quotes));
            }
            TokenKind::FString(raw) => return self.fstring(&raw, idx),
            _ => return Err(self.unexpected_at(idx)),
        };
        Ok(self.expression(ExpressionKind::Literal(value), self.token_range(idx), self.lexpos(idx)))
    }

    /// Plain literal, or `StringFormat` when `{{ }}` placeholders are present.
    fn interpolated(&self, text: String, idx: usize, quote_len: usize) -> Expression {
        let origin = self.locatable(text, idx);
        let located = locate_placeholders(&origin.value, &origin, quote_len);
        let (location, lexpos) = (origin.location.clone(), origin.lexpos);
        let kind = if located.is_empty() {
            ExpressionKind::Literal(Value::String(origin.value))
        } else {
            ExpressionKind::StringFormat(FormatString {
                format_string: origin.value.clone(),
                variables: convert_to_references(located, &self.namespace),
            })
        };
        self.expression(kind, location, lexpos)
    }

    /// f-strings always become `StringFormatV2`, even without fields.
    fn fstring(&self, raw: &str, idx: usize) -> ParseResult<Expression> {
        let text = self.decode(raw, idx, FSTRING_ESCAPE);
        let origin = self.locatable(text, idx);
        let located = locate_fstring_fields(&origin.value, &origin).map_err(|reason| {
            self.error(
                origin.location.clone(),
                &self.tokens[idx].text,
                format!("Invalid f-string: {}", reason),
            )
        })?;
        Ok(self.expression(
            ExpressionKind::StringFormatV2(FormatString {
                format_string: origin.value.clone(),
                variables: convert_to_references(located, &self.namespace),
            }),
            origin.location.clone(),
            origin.lexpos,
        ))
    }
}
