//! Statement productions: definitions, assignments and control flow.

use super::ast::*;
use super::parser::Parser;
use crate::lexer::TokenKind;
use crate::strings::multiline_body;
use cfparse_core::{LocatableString, ParseError, ParseResult, Range, WarningKind};
use std::sync::Arc;

const ENTITY_CAPITAL: &str = "Invalid identifier: Entity names must start with a capital";
const ATTRIBUTE_LOWERCASE: &str =
    "Invalid identifier: attribute names must start with a lower case character";

/// How a top-level statement that starts with a class reference continues.
enum RelationShape {
    /// `A.x [1] -- B.y [0:]`
    Modern,
    /// `A x [1] -- [0:] B y`
    Legacy,
}

impl Parser<'_> {
    // ========================================================================
    // Top level
    // ========================================================================

    pub(crate) fn parse_top_statement(&mut self) -> ParseResult<Statement> {
        match self.current().kind {
            TokenKind::Entity => self.parse_entity(),
            TokenKind::Implement => self.parse_implement(),
            TokenKind::Implementation => self.parse_implementation(),
            TokenKind::Typedef => self.parse_typedef(),
            TokenKind::Index => self.parse_index(),
            TokenKind::Import => self.parse_import(),
            _ => match self.relation_shape() {
                Some(RelationShape::Modern) => self.parse_relation(),
                Some(RelationShape::Legacy) => self.parse_legacy_relation(),
                None => self.parse_statement(),
            },
        }
    }

    /// Number of tokens in the `(ID ::)* CID` class reference at `from`.
    fn class_ref_len(&self, from: usize) -> Option<usize> {
        let mut idx = from;
        loop {
            match &self.tokens.get(idx)?.kind {
                TokenKind::ClassId(_) => return Some(idx + 1 - from),
                TokenKind::Id(_)
                    if matches!(self.tokens.get(idx + 1)?.kind, TokenKind::DoubleColon) =>
                {
                    idx += 2
                }
                _ => return None,
            }
        }
    }

    fn relation_shape(&self) -> Option<RelationShape> {
        let after = self.pos + self.class_ref_len(self.pos)?;
        match (&self.tokens.get(after)?.kind, &self.tokens.get(after + 1)?.kind) {
            (TokenKind::Dot, _) => Some(RelationShape::Modern),
            (TokenKind::Id(_), TokenKind::LBracket) => Some(RelationShape::Legacy),
            _ => None,
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// `ID ('::' ID)*`
    pub(crate) fn parse_ns_ref(&mut self) -> ParseResult<LocatableString> {
        let start = self.pos;
        let mut path = self.expect_identifier()?.value;
        while self.check(&TokenKind::DoubleColon) && matches!(self.peek(1).kind, TokenKind::Id(_)) {
            self.advance();
            path.push_str("::");
            path.push_str(&self.expect_identifier()?.value);
        }
        Ok(LocatableString::new(
            path,
            self.range_from(start),
            self.lexpos(start),
            self.namespace.clone(),
        ))
    }

    /// `(ID '::')* CID`
    pub(crate) fn parse_class_ref(&mut self) -> ParseResult<LocatableString> {
        self.parse_class_ref_with(None)
    }

    fn parse_class_ref_with(
        &mut self,
        lowercase_message: Option<&str>,
    ) -> ParseResult<LocatableString> {
        let start = self.pos;
        let mut path = String::new();
        loop {
            match &self.current().kind {
                TokenKind::ClassId(name) => {
                    path.push_str(name);
                    self.advance();
                    return Ok(LocatableString::new(
                        path,
                        self.range_from(start),
                        self.lexpos(start),
                        self.namespace.clone(),
                    ));
                }
                TokenKind::Id(name) => {
                    path.push_str(name);
                    match (&self.peek(1).kind, &self.peek(2).kind) {
                        (TokenKind::DoubleColon, _) => {
                            path.push_str("::");
                            self.advance();
                            self.advance();
                        }
                        (TokenKind::Dot, TokenKind::ClassId(class)) => {
                            let name = format!("{}.{}", path, class);
                            let location =
                                self.token_range(start).merge(&self.token_range(self.pos + 2));
                            return Err(ParseError::invalid_namespace_access(location, name));
                        }
                        _ => {
                            return Err(match lowercase_message {
                                Some(message) => {
                                    let location =
                                        self.token_range(start).merge(&self.token_range(self.pos));
                                    self.error(location, &path, message)
                                }
                                None => self.unexpected(),
                            });
                        }
                    }
                }
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// Multi-line string used as documentation.
    pub(crate) fn parse_comment(&mut self) -> ParseResult<LocatableString> {
        let idx = self.pos;
        let body = match &self.current().kind {
            TokenKind::MultiLineString { quotes, raw } => multiline_body(raw, *quotes).to_string(),
            _ => return Err(self.unexpected()),
        };
        self.advance();
        let text = self.decode(&body, idx, "Invalid escape sequence in multi-line string.");
        Ok(self.locatable(text, idx))
    }

    pub(crate) fn parse_optional_comment(&mut self) -> ParseResult<Option<LocatableString>> {
        match self.current().kind {
            TokenKind::MultiLineString { .. } => self.parse_comment().map(Some),
            _ => Ok(None),
        }
    }

    // ========================================================================
    // Entities
    // ========================================================================

    fn parse_entity(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Entity)?;

        let name = match &self.current().kind {
            TokenKind::ClassId(name) => self.locatable(name.clone(), self.pos),
            TokenKind::Id(name) => {
                return Err(self.error(self.token_range(self.pos), name, ENTITY_CAPITAL))
            }
            _ => return Err(self.unexpected()),
        };
        self.advance();
        self.check_hyphen(&name)?;

        let mut parents = Vec::new();
        if self.check(&TokenKind::Extends) {
            self.advance();
            loop {
                parents.push(self.parse_class_ref_with(Some(ENTITY_CAPITAL))?);
                if !self.optional_comma() {
                    break;
                }
            }
        }
        let is_root_entity = name.value == "Entity" && self.namespace.get_full_name() == "std";
        if parents.is_empty() && !is_root_entity {
            parents.push(LocatableString::new(
                "std::Entity",
                Range::internal(),
                name.lexpos,
                self.namespace.clone(),
            ));
        }

        self.expect(TokenKind::Colon)?;
        let comment = self.parse_optional_comment()?;

        let mut attributes = Vec::new();
        while !self.check(&TokenKind::End) && !self.is_at_end() {
            attributes.push(self.parse_attribute()?);
        }
        self.expect(TokenKind::End)?;

        Ok(self.statement(
            StatementKind::DefineEntity(DefineEntity {
                name,
                comment,
                parents,
                attributes,
            }),
            start,
        ))
    }

    fn parse_attribute_name(&mut self) -> ParseResult<LocatableString> {
        if let TokenKind::ClassId(name) = &self.current().kind {
            return Err(self.error(self.token_range(self.pos), name, ATTRIBUTE_LOWERCASE));
        }
        self.expect_definition_name()
    }

    /// `type[[]][?] name [= constant | constant_list | undef]`
    fn parse_attribute(&mut self) -> ParseResult<DefineAttribute> {
        if self.check(&TokenKind::Dict) {
            return self.parse_dict_attribute();
        }

        let basetype = self.parse_ns_ref()?;
        let mut multi = false;
        if self.check(&TokenKind::LBracket) {
            self.advance();
            self.expect(TokenKind::RBracket)?;
            multi = true;
        }
        let nullable = self.check(&TokenKind::Question);
        if nullable {
            self.advance();
        }
        let name = self.parse_attribute_name()?;

        let mut default = None;
        let mut remove_default = false;
        if self.check(&TokenKind::Assign) {
            self.advance();
            match self.current().kind {
                TokenKind::Undef => {
                    self.advance();
                    remove_default = true;
                }
                TokenKind::LBracket => default = Some(self.parse_constant_list()?),
                _ => default = Some(self.parse_constant()?),
            }
        }

        Ok(DefineAttribute {
            attr_type: TypeDeclaration {
                basetype,
                multi,
                nullable,
            },
            name,
            default,
            remove_default,
        })
    }

    /// `dict[?] name [= {..} | = null]`
    fn parse_dict_attribute(&mut self) -> ParseResult<DefineAttribute> {
        let dict_idx = self.pos;
        self.expect(TokenKind::Dict)?;
        let basetype = self.locatable("dict", dict_idx);
        let nullable = self.check(&TokenKind::Question);
        if nullable {
            self.advance();
        }
        let name = self.parse_attribute_name()?;

        let mut default = None;
        if self.check(&TokenKind::Assign) {
            self.advance();
            match self.current().kind {
                TokenKind::Null if !nullable => {
                    return Err(self.error(
                        self.token_range(self.pos),
                        "null",
                        format!(
                            "null can not be assigned to dict, did you mean \"dict? {} = null\"",
                            name.value
                        ),
                    ));
                }
                TokenKind::Null => default = Some(self.parse_literal()?),
                TokenKind::LBrace => default = Some(self.parse_dict_literal()?),
                _ => return Err(self.unexpected()),
            }
        }

        Ok(DefineAttribute {
            attr_type: TypeDeclaration {
                basetype,
                multi: false,
                nullable,
            },
            name,
            default,
            remove_default: false,
        })
    }

    // ========================================================================
    // Implementations
    // ========================================================================

    fn parse_implementation(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Implementation)?;
        let name = self.expect_definition_name()?;
        self.expect(TokenKind::For)?;
        let entity = self.parse_class_ref()?;
        self.expect(TokenKind::Colon)?;
        let comment = self.parse_optional_comment()?;
        let block = self.parse_block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;

        Ok(self.statement(
            StatementKind::DefineImplementation(DefineImplementation {
                name,
                entity,
                block,
                comment,
            }),
            start,
        ))
    }

    /// `implement Class using impl, parents [when condition]`
    fn parse_implement(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Implement)?;
        let entity = self.parse_class_ref()?;
        self.expect(TokenKind::Using)?;

        let mut implementations = Vec::new();
        let mut inherit = false;
        loop {
            if self.check(&TokenKind::Parents) {
                self.advance();
                inherit = true;
            } else {
                implementations.push(self.parse_ns_ref()?);
            }
            if !self.optional_comma() {
                break;
            }
        }

        let select = if self.check(&TokenKind::When) {
            self.advance();
            let condition = self.parse_expression()?;
            if inherit {
                return Err(ParseError::syntax(
                    self.range_from(start),
                    "Conditional implementation with parents not allowed",
                ));
            }
            condition
        } else {
            self.expression(
                ExpressionKind::Literal(Value::Bool(true)),
                self.range_from(start),
                self.lexpos(start),
            )
        };
        let comment = self.parse_optional_comment()?;

        Ok(self.statement(
            StatementKind::DefineImplement(DefineImplement {
                entity,
                implementations,
                select,
                inherit,
                comment,
            }),
            start,
        ))
    }

    // ========================================================================
    // Relations
    // ========================================================================

    fn is_relation_arrow(&self) -> bool {
        matches!(
            self.current().kind,
            TokenKind::RelBoth | TokenKind::RelRight | TokenKind::RelLeft
        )
    }

    /// `[n]`, `[n:]`, `[n:m]` or `[:m]`
    fn parse_multi(&mut self) -> ParseResult<Multiplicity> {
        self.expect(TokenKind::LBracket)?;
        let multi = if self.check(&TokenKind::Colon) {
            self.advance();
            Multiplicity {
                lower: 0,
                upper: Some(self.parse_bound()?),
            }
        } else {
            let lower = self.parse_bound()?;
            if self.check(&TokenKind::Colon) {
                self.advance();
                let upper = match self.current().kind {
                    TokenKind::Integer(_) => Some(self.parse_bound()?),
                    _ => None,
                };
                Multiplicity { lower, upper }
            } else {
                Multiplicity {
                    lower,
                    upper: Some(lower),
                }
            }
        };
        self.expect(TokenKind::RBracket)?;
        Ok(multi)
    }

    fn parse_bound(&mut self) -> ParseResult<u64> {
        let bound = match &self.current().kind {
            TokenKind::Integer(text) => text.parse::<u64>().map_err(|_| {
                self.error(
                    self.token_range(self.pos),
                    text,
                    format!("Integer literal {} is out of range", text),
                )
            })?,
            _ => return Err(self.unexpected()),
        };
        self.advance();
        Ok(bound)
    }

    /// Both ends of a relation; one shared object when it is its own inverse.
    fn relation_ends(
        &self,
        start: usize,
        left: RelationAttribute,
        right: RelationAttribute,
    ) -> ParseResult<(Arc<RelationAttribute>, Arc<RelationAttribute>)> {
        let same_end = left.entity.value == right.entity.value
            && left.attribute.is_some()
            && left.attribute.as_ref().map(|a| &a.value)
                == right.attribute.as_ref().map(|a| &a.value);
        if !same_end {
            return Ok((Arc::new(left), Arc::new(right)));
        }
        if left.multiplicity != right.multiplicity {
            let name = format!(
                "{}.{}",
                left.entity.value,
                left.attribute.as_ref().map_or("", |a| a.value.as_str())
            );
            return Err(self.error(
                self.range_from(start),
                &name,
                format!(
                    "Invalid self-inverse relation: both ends of {} must declare the same multiplicity",
                    name
                ),
            ));
        }
        let shared = Arc::new(right);
        Ok((shared.clone(), shared))
    }

    fn parse_relation(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        let left_class = self.parse_class_ref()?;
        self.expect(TokenKind::Dot)?;
        let left_attr = self.expect_definition_name()?;
        let left_multi = self.parse_multi()?;

        let annotations = if self.is_relation_arrow() {
            self.advance();
            Vec::new()
        } else {
            self.parse_operand_list()?
        };

        let right_class = self.parse_class_ref()?;
        let right_end = if self.check(&TokenKind::Dot) {
            self.advance();
            let attr = self.expect_definition_name()?;
            let multi = self.parse_multi()?;
            Some((attr, multi))
        } else {
            None
        };
        let comment = self.parse_optional_comment()?;

        let (left, right) = match right_end {
            Some((right_attr, right_multi)) => self.relation_ends(
                start,
                RelationAttribute {
                    entity: left_class,
                    attribute: Some(right_attr),
                    multiplicity: Some(right_multi),
                },
                RelationAttribute {
                    entity: right_class,
                    attribute: Some(left_attr),
                    multiplicity: Some(left_multi),
                },
            )?,
            None => (
                Arc::new(RelationAttribute {
                    entity: left_class,
                    attribute: None,
                    multiplicity: None,
                }),
                Arc::new(RelationAttribute {
                    entity: right_class,
                    attribute: Some(left_attr),
                    multiplicity: Some(left_multi),
                }),
            ),
        };

        Ok(self.statement(
            StatementKind::DefineRelation(DefineRelation {
                left,
                right,
                annotations,
                comment,
            }),
            start,
        ))
    }

    /// `A aa [1] -- [0:] B bb`, still accepted with a deprecation warning.
    fn parse_legacy_relation(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        let left_class = self.parse_class_ref()?;
        let left_attr = self.expect_definition_name()?;
        let left_multi = self.parse_multi()?;
        if !self.is_relation_arrow() {
            return Err(self.unexpected());
        }
        self.advance();
        let right_multi = self.parse_multi()?;
        let right_class = self.parse_class_ref()?;
        let right_attr = self.expect_definition_name()?;

        let modern = format!(
            "{}.{} {} -- {}.{} {}",
            left_class.value,
            right_attr.value,
            right_multi,
            right_class.value,
            left_attr.value,
            left_multi
        );
        self.warn(
            WarningKind::SyntaxDeprecation,
            self.range_from(start),
            Some(modern.clone()),
            &format!("Deprecated relation syntax, use `{}` instead", modern),
        );

        let (left, right) = self.relation_ends(
            start,
            RelationAttribute {
                entity: left_class,
                attribute: Some(left_attr),
                multiplicity: Some(left_multi),
            },
            RelationAttribute {
                entity: right_class,
                attribute: Some(right_attr),
                multiplicity: Some(right_multi),
            },
        )?;

        Ok(self.statement(
            StatementKind::DefineRelation(DefineRelation {
                left,
                right,
                annotations: Vec::new(),
                comment: None,
            }),
            start,
        ))
    }

    // ========================================================================
    // Typedef, index, import
    // ========================================================================

    fn parse_typedef(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Typedef)?;
        if let TokenKind::ClassId(name) = &self.current().kind {
            return Err(self.error(
                self.range_from(start).merge(&self.token_range(self.pos)),
                name,
                "The use of default constructors is no longer supported",
            ));
        }
        let name = self.expect_definition_name()?;
        self.expect(TokenKind::As)?;
        let basetype = self.parse_ns_ref()?;

        let expression = match self.current().kind {
            TokenKind::Regex { .. } => self.parse_regex_literal()?,
            _ => {
                self.expect(TokenKind::Matching)?;
                let mut expression = self.parse_expression()?;
                if expression.is_function_call() {
                    let truth = self.expression(
                        ExpressionKind::Literal(Value::Bool(true)),
                        expression.location.clone(),
                        expression.lexpos,
                    );
                    expression = self.binary(BinaryOperator::Equals, expression, truth);
                }
                let requires = expression.requires();
                if !requires.contains("self") && !requires.contains(name.as_str()) {
                    return Err(self.error(
                        expression.location.clone(),
                        &name.value,
                        "typedef expressions should reference the self variable",
                    ));
                }
                expression
            }
        };
        let comment = self.parse_optional_comment()?;

        Ok(self.statement(
            StatementKind::DefineTypeConstraint(DefineTypeConstraint {
                name,
                basetype,
                expression,
                comment,
            }),
            start,
        ))
    }

    /// `self matching /pattern/`, compiled now so bad patterns fail the parse.
    pub(crate) fn build_regex(
        &self,
        idx: usize,
        pattern: &str,
        slash_offset: usize,
    ) -> ParseResult<Expression> {
        let token = &self.tokens[idx];
        let (mut line, mut column) = (token.span.line, token.span.column);
        for c in token.text[..slash_offset].chars() {
            if c == '\n' {
                line += 1;
                column = 1;
            } else {
                column += 1;
            }
        }
        let slash_range = Range::new(
            self.file.clone(),
            line,
            column,
            token.span.end_line,
            token.span.end_column,
        );

        let compiled = regex::Regex::new(pattern).map_err(|e| {
            self.error(
                slash_range.clone(),
                &format!("/{}/", pattern),
                format!("Regex error in /{}/: '{}'", pattern, e),
            )
        })?;

        let range = self.token_range(idx);
        let lexpos = self.lexpos(idx);
        let subject = self.expression(
            ExpressionKind::Reference(self.locatable("self", idx)),
            range.clone(),
            lexpos,
        );
        Ok(self.expression(
            ExpressionKind::Regex {
                value: Box::new(subject),
                pattern: CompiledRegex(compiled),
            },
            range,
            lexpos,
        ))
    }

    fn parse_index(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Index)?;
        let entity = self.parse_class_ref()?;
        self.expect(TokenKind::LParen)?;
        let mut attributes = vec![self.expect_identifier()?];
        while self.optional_comma() {
            attributes.push(self.expect_identifier()?);
        }
        self.expect(TokenKind::RParen)?;

        Ok(self.statement(
            StatementKind::DefineIndex(DefineIndex { entity, attributes }),
            start,
        ))
    }

    fn parse_import(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::Import)?;
        let name = self.parse_ns_ref()?;
        if name.value.contains('-') {
            return Err(self.error(
                name.location.clone(),
                &name.value,
                format!(
                    "{} is not a valid module name: hyphens are not allowed, please use underscores instead.",
                    name.value
                ),
            ));
        }
        let toname = if self.check(&TokenKind::As) {
            self.advance();
            self.expect_definition_name()?
        } else {
            name.clone()
        };

        Ok(self.statement(
            StatementKind::DefineImport(DefineImport { name, toname }),
            start,
        ))
    }

    // ========================================================================
    // Statements
    // ========================================================================

    pub(crate) fn parse_statement(&mut self) -> ParseResult<Statement> {
        match self.current().kind {
            TokenKind::For => self.parse_for(),
            TokenKind::If => self.parse_if(),
            _ => self.parse_assignment_or_expression(),
        }
    }

    /// Statements until one of `terminators` (not consumed) or end of file.
    fn parse_block(&mut self, terminators: &[TokenKind]) -> ParseResult<BasicBlock> {
        self.nested(|p| {
            let mut block = Vec::new();
            while !p.is_at_end() && !terminators.iter().any(|t| p.check(t)) {
                block.push(p.parse_statement()?);
            }
            Ok(block)
        })
    }

    fn parse_assignment_or_expression(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        let target = self.parse_expression()?;
        let list_only = match self.current().kind {
            TokenKind::Assign => false,
            TokenKind::PlusAssign => true,
            _ => return Ok(self.statement(StatementKind::Expression(target), start)),
        };
        let operator = self.pos;
        if !is_var_ref(&target) {
            return Err(self.unexpected_at(operator));
        }
        self.advance();

        match target.kind {
            ExpressionKind::Reference(name) => {
                if list_only {
                    return Err(self.error(
                        name.location.clone(),
                        &name.value,
                        format!(
                            "Can not perform += on variable {}, can only be used on relations",
                            name.value
                        ),
                    ));
                }
                if name.value.contains("::") {
                    return Err(self.unexpected_at(operator));
                }
                self.check_hyphen(&name)?;
                let value = self.parse_expression()?;
                Ok(self.statement(StatementKind::Assign { name, value }, start))
            }
            ExpressionKind::AttributeReference {
                instance,
                attribute,
            } => {
                let value = self.parse_expression()?;
                Ok(self.statement(
                    StatementKind::SetAttribute {
                        instance: *instance,
                        attribute,
                        value,
                        list_only,
                    },
                    start,
                ))
            }
            _ => Err(self.unexpected_at(operator)),
        }
    }

    fn parse_for(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::For)?;
        let variable = self.expect_definition_name()?;
        self.expect(TokenKind::In)?;
        let iterable = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let body = self.parse_block(&[TokenKind::End])?;
        self.expect(TokenKind::End)?;

        Ok(self.statement(
            StatementKind::For {
                variable,
                iterable,
                body,
            },
            start,
        ))
    }

    fn parse_if(&mut self) -> ParseResult<Statement> {
        let start = self.pos;
        self.expect(TokenKind::If)?;
        self.parse_if_tail(start)
    }

    /// Condition, branches and the closing `end`; `elif` nests another `If`
    /// in the else branch that shares the same `end`.
    fn parse_if_tail(&mut self, start: usize) -> ParseResult<Statement> {
        let condition = self.parse_expression()?;
        self.expect(TokenKind::Colon)?;
        let if_branch =
            self.parse_block(&[TokenKind::Elif, TokenKind::Else, TokenKind::End])?;

        let else_branch = match self.current().kind {
            TokenKind::Elif => {
                let elif_start = self.pos;
                self.advance();
                vec![self.nested(|p| p.parse_if_tail(elif_start))?]
            }
            TokenKind::Else => {
                self.advance();
                self.expect(TokenKind::Colon)?;
                let block = self.parse_block(&[TokenKind::End])?;
                self.expect(TokenKind::End)?;
                block
            }
            _ => {
                self.expect(TokenKind::End)?;
                Vec::new()
            }
        };

        Ok(self.statement(
            StatementKind::If {
                condition,
                if_branch,
                else_branch,
            },
            start,
        ))
    }
}

/// `x`, `x.y`, `x.y.z`: the only valid assignment targets.
pub(crate) fn is_var_ref(expr: &Expression) -> bool {
    match &expr.kind {
        ExpressionKind::Reference(_) => true,
        ExpressionKind::AttributeReference { instance, .. } => is_var_ref(instance),
        _ => false,
    }
}

/// Dotted source text of a variable reference chain.
pub(crate) fn var_path(expr: &Expression) -> String {
    match &expr.kind {
        ExpressionKind::Reference(name) => name.value.clone(),
        ExpressionKind::AttributeReference {
            instance,
            attribute,
        } => format!("{}.{}", var_path(instance), attribute.value),
        _ => String::new(),
    }
}
