//! Abstract Syntax Tree types

use cfparse_core::{LocatableString, Namespace, Range};
use serde::{Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

// ============================================================================
// CONSTANT VALUES
// ============================================================================

/// A folded constant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    /// Insertion-ordered; a repeated key replaces the earlier value in place.
    Dict(Vec<(String, Value)>),
}

impl Value {
    /// Insert into a dict value, keeping first-insertion order.
    pub fn dict_insert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
        match entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => entries.push((key, value)),
        }
    }

    pub fn dict_get<'a>(entries: &'a [(String, Value)], key: &str) -> Option<&'a Value> {
        entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{:?}", x),
            Value::String(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Dict(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{:?}: {}", k, v)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// A regex compiled when its `matching` expression is parsed.
#[derive(Debug, Clone)]
pub struct CompiledRegex(pub regex::Regex);

impl CompiledRegex {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, haystack: &str) -> bool {
        self.0.is_match(haystack)
    }
}

impl PartialEq for CompiledRegex {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for CompiledRegex {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinaryOperator {
    And,
    Or,
    Equals,
    NotEqual,
    LessThan,
    GreaterThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    In,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl BinaryOperator {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
            BinaryOperator::Equals => "==",
            BinaryOperator::NotEqual => "!=",
            BinaryOperator::LessThan => "<",
            BinaryOperator::GreaterThan => ">",
            BinaryOperator::LessThanOrEqual => "<=",
            BinaryOperator::GreaterThanOrEqual => ">=",
            BinaryOperator::In => "in",
            BinaryOperator::Add => "+",
            BinaryOperator::Subtract => "-",
            BinaryOperator::Multiply => "*",
            BinaryOperator::Divide => "/",
            BinaryOperator::Modulo => "%",
            BinaryOperator::Power => "**",
        }
    }
}

/// Interpolated string: the text as written plus one entry per placeholder.
///
/// For `{{ }}` strings the key is the full matched placeholder, for
/// f-strings it is the field name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormatString {
    pub format_string: String,
    pub variables: Vec<(Expression, String)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum ExpressionKind {
    Literal(Value),
    Reference(LocatableString),
    AttributeReference {
        instance: Box<Expression>,
        attribute: LocatableString,
    },
    CreateList(Vec<Expression>),
    CreateDict(Vec<(String, Expression)>),
    MapLookup {
        themap: Box<Expression>,
        key: Box<Expression>,
    },
    IndexLookup {
        index_type: LocatableString,
        query: Vec<(LocatableString, Expression)>,
        wrapped_kwargs: Vec<Expression>,
    },
    /// `a.rel[k=v]`: lookup on the type reached through `rel`, resolved later.
    ShortIndexLookup {
        rootobject: Box<Expression>,
        relation: LocatableString,
        query: Vec<(LocatableString, Expression)>,
        wrapped_kwargs: Vec<Expression>,
    },
    Constructor {
        class_type: LocatableString,
        attributes: Vec<(LocatableString, Expression)>,
        wrapped_kwargs: Vec<Expression>,
    },
    FunctionCall {
        name: LocatableString,
        arguments: Vec<Expression>,
        kwargs: Vec<(LocatableString, Expression)>,
        wrapped_kwargs: Vec<Expression>,
    },
    Conditional {
        condition: Box<Expression>,
        if_true: Box<Expression>,
        if_false: Box<Expression>,
    },
    StringFormat(FormatString),
    StringFormatV2(FormatString),
    Binary {
        op: BinaryOperator,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    Not(Box<Expression>),
    IsDefined {
        instance: Option<Box<Expression>>,
        attribute: LocatableString,
    },
    ListComprehension {
        value_expression: Box<Expression>,
        variable: LocatableString,
        iterable: Box<Expression>,
        guard: Option<Box<Expression>>,
    },
    Regex {
        value: Box<Expression>,
        pattern: CompiledRegex,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Expression {
    pub kind: ExpressionKind,
    pub location: Range,
    pub namespace: Arc<Namespace>,
    pub lexpos: usize,
}

impl Expression {
    pub fn new(
        kind: ExpressionKind,
        location: Range,
        namespace: Arc<Namespace>,
        lexpos: usize,
    ) -> Self {
        Self {
            kind,
            location,
            namespace,
            lexpos,
        }
    }

    /// The constant value of this node, if it has one.
    pub fn try_constant(&self) -> Option<Value> {
        match &self.kind {
            ExpressionKind::Literal(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_function_call(&self) -> bool {
        matches!(self.kind, ExpressionKind::FunctionCall { .. })
    }

    /// Root variable names this expression reads.
    pub fn requires(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_requires(&mut names);
        names
    }

    fn collect_requires(&self, names: &mut BTreeSet<String>) {
        match &self.kind {
            ExpressionKind::Literal(_) | ExpressionKind::IndexLookup { .. } => {}
            ExpressionKind::Reference(name) => {
                names.insert(name.value.clone());
            }
            ExpressionKind::AttributeReference { instance, .. } => {
                instance.collect_requires(names)
            }
            ExpressionKind::CreateList(items) => {
                items.iter().for_each(|e| e.collect_requires(names))
            }
            ExpressionKind::CreateDict(items) => {
                items.iter().for_each(|(_, e)| e.collect_requires(names))
            }
            ExpressionKind::MapLookup { themap, key } => {
                themap.collect_requires(names);
                key.collect_requires(names);
            }
            ExpressionKind::ShortIndexLookup {
                rootobject,
                query,
                wrapped_kwargs,
                ..
            } => {
                rootobject.collect_requires(names);
                query.iter().for_each(|(_, e)| e.collect_requires(names));
                wrapped_kwargs.iter().for_each(|e| e.collect_requires(names));
            }
            ExpressionKind::Constructor {
                attributes,
                wrapped_kwargs,
                ..
            } => {
                attributes.iter().for_each(|(_, e)| e.collect_requires(names));
                wrapped_kwargs.iter().for_each(|e| e.collect_requires(names));
            }
            ExpressionKind::FunctionCall {
                arguments,
                kwargs,
                wrapped_kwargs,
                ..
            } => {
                arguments.iter().for_each(|e| e.collect_requires(names));
                kwargs.iter().for_each(|(_, e)| e.collect_requires(names));
                wrapped_kwargs.iter().for_each(|e| e.collect_requires(names));
            }
            ExpressionKind::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                condition.collect_requires(names);
                if_true.collect_requires(names);
                if_false.collect_requires(names);
            }
            ExpressionKind::StringFormat(format) | ExpressionKind::StringFormatV2(format) => {
                format
                    .variables
                    .iter()
                    .for_each(|(e, _)| e.collect_requires(names));
            }
            ExpressionKind::Binary { left, right, .. } => {
                left.collect_requires(names);
                right.collect_requires(names);
            }
            ExpressionKind::Not(inner) => inner.collect_requires(names),
            ExpressionKind::IsDefined {
                instance,
                attribute,
            } => match instance {
                Some(instance) => instance.collect_requires(names),
                None => {
                    names.insert(attribute.value.clone());
                }
            },
            ExpressionKind::ListComprehension {
                value_expression,
                variable,
                iterable,
                guard,
            } => {
                let mut inner = value_expression.requires();
                if let Some(guard) = guard {
                    inner.extend(guard.requires());
                }
                inner.remove(&variable.value);
                names.extend(inner);
                iterable.collect_requires(names);
            }
            ExpressionKind::Regex { value, .. } => value.collect_requires(names),
        }
    }
}

// ============================================================================
// STATEMENTS
// ============================================================================

pub type BasicBlock = Vec<Statement>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeDeclaration {
    pub basetype: LocatableString,
    pub multi: bool,
    pub nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineAttribute {
    pub attr_type: TypeDeclaration,
    pub name: LocatableString,
    pub default: Option<Expression>,
    /// `= undef`: drop a default inherited from a parent entity.
    pub remove_default: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineEntity {
    pub name: LocatableString,
    pub comment: Option<LocatableString>,
    pub parents: Vec<LocatableString>,
    pub attributes: Vec<DefineAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineImplementation {
    pub name: LocatableString,
    pub entity: LocatableString,
    pub block: BasicBlock,
    pub comment: Option<LocatableString>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineImplement {
    pub entity: LocatableString,
    pub implementations: Vec<LocatableString>,
    pub select: Expression,
    pub inherit: bool,
    pub comment: Option<LocatableString>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineTypeConstraint {
    pub name: LocatableString,
    pub basetype: LocatableString,
    pub expression: Expression,
    pub comment: Option<LocatableString>,
}

/// Bounds of one relation end. `[n]` is `n..=n`, `[n:]` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Multiplicity {
    pub lower: u64,
    pub upper: Option<u64>,
}

impl fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) if upper == self.lower => write!(f, "[{}]", upper),
            Some(upper) => write!(f, "[{}:{}]", self.lower, upper),
            None => write!(f, "[{}:]", self.lower),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RelationAttribute {
    pub entity: LocatableString,
    pub attribute: Option<LocatableString>,
    pub multiplicity: Option<Multiplicity>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineRelation {
    pub left: Arc<RelationAttribute>,
    pub right: Arc<RelationAttribute>,
    pub annotations: Vec<Expression>,
    pub comment: Option<LocatableString>,
}

impl DefineRelation {
    /// Both ends are the same object, e.g. `Node.peers [0:] -- Node.peers [0:]`.
    pub fn is_self_inverse(&self) -> bool {
        Arc::ptr_eq(&self.left, &self.right)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineIndex {
    pub entity: LocatableString,
    pub attributes: Vec<LocatableString>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefineImport {
    pub name: LocatableString,
    pub toname: LocatableString,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementKind {
    /// Leading module docstring.
    Docstring(LocatableString),
    DefineEntity(DefineEntity),
    DefineImplementation(DefineImplementation),
    DefineImplement(DefineImplement),
    DefineTypeConstraint(DefineTypeConstraint),
    DefineRelation(DefineRelation),
    DefineIndex(DefineIndex),
    DefineImport(DefineImport),
    Assign {
        name: LocatableString,
        value: Expression,
    },
    SetAttribute {
        instance: Expression,
        attribute: LocatableString,
        value: Expression,
        /// `+=`: extend a relation instead of assigning it.
        list_only: bool,
    },
    For {
        variable: LocatableString,
        iterable: Expression,
        body: BasicBlock,
    },
    If {
        condition: Expression,
        if_branch: BasicBlock,
        else_branch: BasicBlock,
    },
    Expression(Expression),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    pub kind: StatementKind,
    pub location: Range,
    pub namespace: Arc<Namespace>,
    pub lexpos: usize,
}

impl Statement {
    pub fn new(
        kind: StatementKind,
        location: Range,
        namespace: Arc<Namespace>,
        lexpos: usize,
    ) -> Self {
        Self {
            kind,
            location,
            namespace,
            lexpos,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            StatementKind::Docstring(_) => "Docstring",
            StatementKind::DefineEntity(_) => "DefineEntity",
            StatementKind::DefineImplementation(_) => "DefineImplementation",
            StatementKind::DefineImplement(_) => "DefineImplement",
            StatementKind::DefineTypeConstraint(_) => "DefineTypeConstraint",
            StatementKind::DefineRelation(_) => "DefineRelation",
            StatementKind::DefineIndex(_) => "DefineIndex",
            StatementKind::DefineImport(_) => "DefineImport",
            StatementKind::Assign { .. } => "Assign",
            StatementKind::SetAttribute { .. } => "SetAttribute",
            StatementKind::For { .. } => "For",
            StatementKind::If { .. } => "If",
            StatementKind::Expression(_) => "Expression",
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ls(value: &str) -> LocatableString {
        LocatableString::new(
            value,
            Range::new("t.cf", 1, 1, 1, 1 + value.len()),
            0,
            Namespace::root(),
        )
    }

    fn reference(name: &str) -> Expression {
        Expression::new(
            ExpressionKind::Reference(ls(name)),
            Range::new("t.cf", 1, 1, 1, 2),
            Namespace::root(),
            0,
        )
    }

    #[test]
    fn test_multiplicity_display() {
        let one = Multiplicity { lower: 1, upper: Some(1) };
        let open = Multiplicity { lower: 0, upper: None };
        let bounded = Multiplicity { lower: 2, upper: Some(5) };
        assert_eq!(one.to_string(), "[1]");
        assert_eq!(open.to_string(), "[0:]");
        assert_eq!(bounded.to_string(), "[2:5]");
    }

    #[test]
    fn test_dict_insert_replaces_in_place() {
        let mut entries = Vec::new();
        Value::dict_insert(&mut entries, "a".to_string(), Value::Int(1));
        Value::dict_insert(&mut entries, "b".to_string(), Value::Int(2));
        Value::dict_insert(&mut entries, "a".to_string(), Value::Int(3));
        assert_eq!(
            entries,
            vec![("a".to_string(), Value::Int(3)), ("b".to_string(), Value::Int(2))]
        );
        assert_eq!(Value::dict_get(&entries, "b"), Some(&Value::Int(2)));
    }

    #[test]
    fn test_requires_follows_attribute_roots() {
        let attr = Expression::new(
            ExpressionKind::AttributeReference {
                instance: Box::new(reference("self")),
                attribute: ls("value"),
            },
            Range::new("t.cf", 1, 1, 1, 10),
            Namespace::root(),
            0,
        );
        let expr = Expression::new(
            ExpressionKind::Binary {
                op: BinaryOperator::GreaterThan,
                left: Box::new(attr),
                right: Box::new(reference("limit")),
            },
            Range::new("t.cf", 1, 1, 1, 20),
            Namespace::root(),
            0,
        );
        let names: Vec<String> = expr.requires().into_iter().collect();
        assert_eq!(names, vec!["limit".to_string(), "self".to_string()]);
    }

    #[test]
    fn test_compiled_regex_equality_by_pattern() {
        let a = CompiledRegex(regex::Regex::new("^a+$").unwrap());
        let b = CompiledRegex(regex::Regex::new("^a+$").unwrap());
        assert_eq!(a, b);
        assert!(a.is_match("aaa"));
    }

    #[test]
    fn test_value_display() {
        let value = Value::List(vec![Value::Int(1), Value::Float(2.5), Value::Null]);
        assert_eq!(value.to_string(), "[1, 2.5, null]");
    }
}
