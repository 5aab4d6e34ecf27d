//! Integration tests for the statement and expression grammar
//!
//! Tests verify:
//! - Every definition form builds the expected node
//! - Desugarings (elif, `is defined` on maps, comprehensions, function typedefs)
//! - Located, translated error messages for invalid input
//! - Warnings for invalid escapes

use cfparse_core::{ParseError, ParserConfig, WarningKind};
use cfparse_dsl::parser::ast::*;
use cfparse_dsl::{parse_source_with, CollectingWarnings};
use cfparse_test_utils::assertions::*;
use cfparse_test_utils::fixtures::*;
use cfparse_test_utils::{parse_collecting, parse_err, parse_ok, parse_single, test_namespace};

// ============================================================================
// HELPERS
// ============================================================================

fn value_of(source: &str) -> Expression {
    match parse_single(source).kind {
        StatementKind::Assign { value, .. } => value,
        other => panic!("Expected Assign, got {:?}", other),
    }
}

fn reference_name(expr: &Expression) -> &str {
    match &expr.kind {
        ExpressionKind::Reference(name) => name.as_str(),
        other => panic!("Expected Reference, got {:?}", other),
    }
}

fn binary(expr: &Expression) -> (BinaryOperator, &Expression, &Expression) {
    match &expr.kind {
        ExpressionKind::Binary { op, left, right } => (*op, left, right),
        other => panic!("Expected Binary, got {:?}", other),
    }
}

// ============================================================================
// MODULE LEVEL
// ============================================================================

#[test]
fn test_docstring_is_first_statement() {
    let statements = parse_ok("\"\"\"\nModule docs\n\"\"\"\nx = 1\n");
    assert_eq!(statements.len(), 2);
    match &statements[0].kind {
        StatementKind::Docstring(doc) => assert_eq!(doc.value, "\nModule docs\n"),
        other => panic!("Expected Docstring, got {:?}", other),
    }
}

#[test]
fn test_import_with_alias() {
    match parse_single("import std::net as net").kind {
        StatementKind::DefineImport(import) => {
            assert_eq!(import.name.value, "std::net");
            assert_eq!(import.toname.value, "net");
        }
        other => panic!("Expected DefineImport, got {:?}", other),
    }
}

#[test]
fn test_import_rejects_hyphen() {
    let err = parse_err("import my-mod");
    assert_eq!(
        err.message(),
        "my-mod is not a valid module name: hyphens are not allowed, please use underscores instead."
    );
}

#[test]
fn test_import_path_range_spans_all_segments() {
    match parse_single("import a::b::c").kind {
        StatementKind::DefineImport(import) => {
            assert_eq!(import.name.value, "a::b::c");
            assert_range(&import.name.location, 1, 8, 1, 15);
            assert_range(&import.toname.location, 1, 8, 1, 15);
        }
        other => panic!("Expected DefineImport, got {:?}", other),
    }
    let reference = value_of("x = a::b::c");
    assert_eq!(reference_name(&reference), "a::b::c");
    assert_range(&reference.location, 1, 5, 1, 12);
}

#[test]
fn test_assignment_rejects_hyphen() {
    let err = parse_err("a-b = 1");
    assert_eq!(
        err.message(),
        "The use of '-' in identifiers is not allowed. please rename a-b."
    );
    assert_eq!(err.value().as_deref(), Some("a-b"));
}

#[test]
fn test_fixture_models_parse() {
    assert_eq!(parse_ok(ENTITY_MODEL).len(), 3);
    assert_eq!(parse_ok(RELATION_MODEL).len(), 5);
    assert_eq!(parse_ok(CONTROL_FLOW_MODEL).len(), 1);
}

// ============================================================================
// ENTITIES
// ============================================================================

#[test]
fn test_entity_attributes_and_defaults() {
    let source = r#"entity Host extends Base, std::Other:
    """ doc """
    string name = "a"
    int[] ports = [1, 2]
    string? alias = undef
    number ratio = -1.5
    dict? labels = null
    dict meta = {"k": 1}
end
"#;
    match parse_single(source).kind {
        StatementKind::DefineEntity(entity) => {
            let parents: Vec<&str> = entity.parents.iter().map(|p| p.as_str()).collect();
            assert_eq!(parents, vec!["Base", "std::Other"]);
            assert_eq!(entity.comment.as_ref().map(|c| c.as_str()), Some(" doc "));
            assert_eq!(entity.attributes.len(), 6);

            let ports = &entity.attributes[1];
            assert!(ports.attr_type.multi);
            assert_eq!(
                ports.default.as_ref().and_then(Expression::try_constant),
                Some(Value::List(vec![Value::Int(1), Value::Int(2)]))
            );

            let alias = &entity.attributes[2];
            assert!(alias.attr_type.nullable);
            assert!(alias.remove_default);
            assert!(alias.default.is_none());

            assert_eq!(
                entity.attributes[3].default.as_ref().and_then(Expression::try_constant),
                Some(Value::Float(-1.5))
            );

            let labels = &entity.attributes[4];
            assert_eq!(labels.attr_type.basetype.value, "dict");
            assert!(labels.attr_type.nullable);
            assert_eq!(
                labels.default.as_ref().and_then(Expression::try_constant),
                Some(Value::Null)
            );

            assert_eq!(
                entity.attributes[5].default.as_ref().and_then(Expression::try_constant),
                Some(Value::Dict(vec![("k".to_string(), Value::Int(1))]))
            );
        }
        other => panic!("Expected DefineEntity, got {:?}", other),
    }
}

#[test]
fn test_uppercase_attribute_rejected() {
    let err = parse_err("entity E:\n    string Name\nend\n");
    assert_eq!(
        err.message(),
        "Invalid identifier: attribute names must start with a lower case character"
    );
}

#[test]
fn test_lowercase_parent_rejected() {
    let err = parse_err("entity E extends base:\nend\n");
    assert_eq!(
        err.message(),
        "Invalid identifier: Entity names must start with a capital"
    );
}

#[test]
fn test_unterminated_entity_reports_eof() {
    let err = parse_err("entity A:");
    assert_eq!(err.message(), "Unexpected end of file");
    assert_range(err.location(), 1, 9, 1, 10);
}

// ============================================================================
// IMPLEMENTATIONS
// ============================================================================

#[test]
fn test_implement_defaults_to_true_condition() {
    match parse_single("implement Host using parents, base").kind {
        StatementKind::DefineImplement(implement) => {
            assert!(implement.inherit);
            assert_eq!(implement.implementations.len(), 1);
            assert_eq!(implement.select.try_constant(), Some(Value::Bool(true)));
        }
        other => panic!("Expected DefineImplement, got {:?}", other),
    }
}

#[test]
fn test_implement_with_condition() {
    match parse_single("implement Host using web when self.port == 80").kind {
        StatementKind::DefineImplement(implement) => {
            assert!(!implement.inherit);
            let (op, _, _) = binary(&implement.select);
            assert_eq!(op, BinaryOperator::Equals);
        }
        other => panic!("Expected DefineImplement, got {:?}", other),
    }
}

#[test]
fn test_conditional_parents_rejected() {
    let err = parse_err("implement Host using parents when self.port == 80");
    assert_eq!(err.message(), "Conditional implementation with parents not allowed");
}

#[test]
fn test_implementation_block() {
    let source = "implementation web for Host:\n    self.port = 80\n    self.files += f\nend\n";
    match parse_single(source).kind {
        StatementKind::DefineImplementation(implementation) => {
            assert_eq!(implementation.name.value, "web");
            assert_eq!(implementation.entity.value, "Host");
            assert_eq!(implementation.block.len(), 2);
            match &implementation.block[1].kind {
                StatementKind::SetAttribute { attribute, list_only, .. } => {
                    assert_eq!(attribute.value, "files");
                    assert!(*list_only);
                }
                other => panic!("Expected SetAttribute, got {:?}", other),
            }
        }
        other => panic!("Expected DefineImplementation, got {:?}", other),
    }
}

#[test]
fn test_plus_assign_on_variable_rejected() {
    let err = parse_err("x += 1");
    assert_eq!(
        err.message(),
        "Can not perform += on variable x, can only be used on relations"
    );
}

// ============================================================================
// RELATIONS, TYPEDEFS, INDEXES
// ============================================================================

#[test]
fn test_bidirectional_relation_ends() {
    match parse_single("A.b [0:] -- B.a [1]").kind {
        StatementKind::DefineRelation(relation) => {
            assert_eq!(relation.left.entity.value, "A");
            assert_eq!(relation.left.attribute.as_ref().unwrap().value, "a");
            assert_eq!(relation.left.multiplicity, Some(Multiplicity { lower: 1, upper: Some(1) }));
            assert_eq!(relation.right.entity.value, "B");
            assert_eq!(relation.right.attribute.as_ref().unwrap().value, "b");
            assert_eq!(relation.right.multiplicity, Some(Multiplicity { lower: 0, upper: None }));
            assert!(!relation.is_self_inverse());
        }
        other => panic!("Expected DefineRelation, got {:?}", other),
    }
}

#[test]
fn test_unidirectional_relation() {
    match parse_single("File.owner [1:3] -- Host").kind {
        StatementKind::DefineRelation(relation) => {
            assert!(relation.left.attribute.is_none());
            assert!(relation.left.multiplicity.is_none());
            assert_eq!(relation.right.attribute.as_ref().unwrap().value, "owner");
            assert_eq!(
                relation.right.multiplicity,
                Some(Multiplicity { lower: 1, upper: Some(3) })
            );
        }
        other => panic!("Expected DefineRelation, got {:?}", other),
    }
}

#[test]
fn test_annotated_relation() {
    match parse_single("A.b [:2] annotation, other A.a [0:]").kind {
        StatementKind::DefineRelation(relation) => {
            assert_eq!(relation.annotations.len(), 2);
            assert_eq!(
                relation.right.multiplicity,
                Some(Multiplicity { lower: 0, upper: Some(2) })
            );
        }
        other => panic!("Expected DefineRelation, got {:?}", other),
    }
}

#[test]
fn test_self_inverse_multiplicity_mismatch() {
    let err = parse_err("A.x [1] -- A.x [0:]");
    assert_eq!(
        err.message(),
        "Invalid self-inverse relation: both ends of A.x must declare the same multiplicity"
    );
}

#[test]
fn test_typedef_with_expression() {
    match parse_single("typedef port as int matching self > 0 and self < 65536").kind {
        StatementKind::DefineTypeConstraint(typedef) => {
            assert_eq!(typedef.name.value, "port");
            assert_eq!(typedef.basetype.value, "int");
            assert_eq!(binary(&typedef.expression).0, BinaryOperator::And);
        }
        other => panic!("Expected DefineTypeConstraint, got {:?}", other),
    }
}

#[test]
fn test_typedef_regex() {
    match parse_single("typedef hostname as string matching /^[a-z]+$/").kind {
        StatementKind::DefineTypeConstraint(typedef) => match &typedef.expression.kind {
            ExpressionKind::Regex { value, pattern } => {
                assert_eq!(reference_name(value), "self");
                assert_eq!(pattern.as_str(), "^[a-z]+$");
                assert!(pattern.is_match("web"));
                assert!(!pattern.is_match("Web"));
            }
            other => panic!("Expected Regex, got {:?}", other),
        },
        other => panic!("Expected DefineTypeConstraint, got {:?}", other),
    }
}

#[test]
fn test_typedef_invalid_regex() {
    let err = parse_err("typedef t as string matching /(/");
    assert!(err.message().starts_with("Regex error in /(/: '"), "{}", err);
    assert_eq!(err.value().as_deref(), Some("/(/"));
    assert_eq!(err.location().start_char, 30);
}

fn regex_parts(expr: &Expression) -> (&Expression, &CompiledRegex) {
    match &expr.kind {
        ExpressionKind::Regex { value, pattern } => (value, pattern),
        other => panic!("Expected Regex, got {:?}", other),
    }
}

#[test]
fn test_regex_as_assigned_value() {
    let expr = value_of("x = matching /a+/");
    let (value, pattern) = regex_parts(&expr);
    assert_eq!(reference_name(value), "self");
    assert_eq!(pattern.as_str(), "a+");
    assert_range(&expr.location, 1, 5, 1, 18);
}

#[test]
fn test_regex_as_attribute_default() {
    let source = "entity Host:\n    string x = matching /a+/\nend\n";
    match parse_single(source).kind {
        StatementKind::DefineEntity(entity) => {
            let default = entity.attributes[0].default.as_ref().expect("default");
            assert_eq!(regex_parts(default).1.as_str(), "a+");
            assert_eq!(default.try_constant(), None);
        }
        other => panic!("Expected DefineEntity, got {:?}", other),
    }
}

#[test]
fn test_regex_as_call_argument() {
    match value_of("x = f(matching /a+/)").kind {
        ExpressionKind::FunctionCall { arguments, .. } => {
            assert_eq!(arguments.len(), 1);
            let (value, pattern) = regex_parts(&arguments[0]);
            assert_eq!(reference_name(value), "self");
            assert!(pattern.is_match("baa"));
        }
        other => panic!("Expected FunctionCall, got {:?}", other),
    }
}

#[test]
fn test_invalid_regex_in_value_position() {
    let err = parse_err("x = matching /(/");
    assert!(err.message().starts_with("Regex error in /(/: '"), "{}", err);
    assert_eq!(err.value().as_deref(), Some("/(/"));
    assert_eq!(err.location().start_char, 14);
}

#[test]
fn test_typedef_function_is_compared_to_true() {
    match parse_single("typedef t as string matching std::validate(self)").kind {
        StatementKind::DefineTypeConstraint(typedef) => {
            let (op, left, right) = binary(&typedef.expression);
            assert_eq!(op, BinaryOperator::Equals);
            assert!(left.is_function_call());
            assert_eq!(right.try_constant(), Some(Value::Bool(true)));
        }
        other => panic!("Expected DefineTypeConstraint, got {:?}", other),
    }
}

#[test]
fn test_typedef_must_reference_self() {
    let err = parse_err("typedef t as string matching x > 1");
    assert_eq!(err.message(), "typedef expressions should reference the self variable");
}

#[test]
fn test_typedef_default_constructor_rejected() {
    let err = parse_err("typedef Web as Host(port=80)");
    assert_eq!(err.message(), "The use of default constructors is no longer supported");
}

#[test]
fn test_index() {
    match parse_single("index Host(name, port)").kind {
        StatementKind::DefineIndex(index) => {
            assert_eq!(index.entity.value, "Host");
            let attributes: Vec<&str> = index.attributes.iter().map(|a| a.as_str()).collect();
            assert_eq!(attributes, vec!["name", "port"]);
        }
        other => panic!("Expected DefineIndex, got {:?}", other),
    }
}

// ============================================================================
// CONTROL FLOW
// ============================================================================

#[test]
fn test_elif_nests_into_else_branch() {
    let source = "if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\nend\n";
    match parse_single(source).kind {
        StatementKind::If { if_branch, else_branch, .. } => {
            assert_eq!(if_branch.len(), 1);
            assert_eq!(else_branch.len(), 1);
            match &else_branch[0].kind {
                StatementKind::If { condition, else_branch, .. } => {
                    assert_eq!(reference_name(condition), "b");
                    assert_eq!(else_branch.len(), 1);
                }
                other => panic!("Expected nested If, got {:?}", other),
            }
        }
        other => panic!("Expected If, got {:?}", other),
    }
}

#[test]
fn test_for_loop() {
    match parse_single("for h in hosts:\n    h.port = 1\nend\n").kind {
        StatementKind::For { variable, iterable, body } => {
            assert_eq!(variable.value, "h");
            assert_eq!(reference_name(&iterable), "hosts");
            assert_eq!(body.len(), 1);
        }
        other => panic!("Expected For, got {:?}", other),
    }
}

#[test]
fn test_keyword_as_variable_rejected() {
    let err = parse_err("end = 1");
    assert_eq!(err.message(), "invalid identifier, end is a reserved keyword");
    assert_range(err.location(), 1, 1, 1, 4);
}

#[test]
fn test_nesting_limit() {
    let source = format!("x = {}1{}", "(".repeat(150), ")".repeat(150));
    let err = parse_err(&source);
    assert_eq!(err.message(), "Maximum nesting depth of 100 exceeded");

    let shallow = format!("x = {}1{}", "(".repeat(20), ")".repeat(20));
    assert_eq!(value_of(&shallow).try_constant(), Some(Value::Int(1)));
}

#[test]
fn test_custom_nesting_limit() {
    let config = ParserConfig {
        max_nesting_depth: 3,
        ..ParserConfig::default()
    };
    let sink = CollectingWarnings::new();
    let err = parse_source_with(&config, &test_namespace(), "t.cf", "x = (((1)))", &sink)
        .unwrap_err();
    assert!(err.message().contains("Maximum nesting depth of 3"));
}

// ============================================================================
// EXPRESSIONS
// ============================================================================

#[test]
fn test_operator_precedence() {
    let expr = value_of("x = 1 + 2 * 3");
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(left.try_constant(), Some(Value::Int(1)));
    assert_eq!(binary(right).0, BinaryOperator::Multiply);
}

#[test]
fn test_power_is_right_associative() {
    let expr = value_of("x = 2 ** 3 ** 2");
    let (op, left, right) = binary(&expr);
    assert_eq!(op, BinaryOperator::Power);
    assert_eq!(left.try_constant(), Some(Value::Int(2)));
    assert_eq!(binary(right).0, BinaryOperator::Power);
}

#[test]
fn test_subtraction_and_negative_literal() {
    assert_eq!(value_of("x = -5").try_constant(), Some(Value::Int(-5)));
    let binding = value_of("x = a - -5");
    let (op, _, right) = binary(&binding);
    assert_eq!(op, BinaryOperator::Subtract);
    assert_eq!(right.try_constant(), Some(Value::Int(-5)));
}

#[test]
fn test_ternary() {
    match value_of("x = a > 1 ? \"big\" : \"small\"").kind {
        ExpressionKind::Conditional { condition, if_true, if_false } => {
            assert_eq!(binary(&condition).0, BinaryOperator::GreaterThan);
            assert_eq!(if_true.try_constant(), Some(Value::String("big".to_string())));
            assert_eq!(if_false.try_constant(), Some(Value::String("small".to_string())));
        }
        other => panic!("Expected Conditional, got {:?}", other),
    }
}

#[test]
fn test_not_in() {
    match value_of("x = a not in b").kind {
        ExpressionKind::Not(inner) => assert_eq!(binary(&inner).0, BinaryOperator::In),
        other => panic!("Expected Not, got {:?}", other),
    }
}

#[test]
fn test_is_defined_forms() {
    match value_of("x = a is defined").kind {
        ExpressionKind::IsDefined { instance, attribute } => {
            assert!(instance.is_none());
            assert_eq!(attribute.value, "a");
        }
        other => panic!("Expected IsDefined, got {:?}", other),
    }

    match value_of("x = a.b is defined").kind {
        ExpressionKind::IsDefined { instance, attribute } => {
            assert_eq!(reference_name(instance.as_deref().unwrap()), "a");
            assert_eq!(attribute.value, "b");
        }
        other => panic!("Expected IsDefined, got {:?}", other),
    }
}

#[test]
fn test_is_defined_on_map_lookup_expands() {
    let expr = value_of("x = m[\"k\"] is defined");
    let (op, both, not_empty) = binary(&expr);
    assert_eq!(op, BinaryOperator::And);
    assert_eq!(binary(not_empty).0, BinaryOperator::NotEqual);

    let (op, present, not_null) = binary(both);
    assert_eq!(op, BinaryOperator::And);
    assert_eq!(binary(not_null).0, BinaryOperator::NotEqual);

    let (op, key, map) = binary(present);
    assert_eq!(op, BinaryOperator::In);
    assert_eq!(key.try_constant(), Some(Value::String("k".to_string())));
    assert_eq!(reference_name(map), "m");
}

#[test]
fn test_function_call_arguments() {
    match value_of("x = std::len(a, 1, key=2, **extra,)").kind {
        ExpressionKind::FunctionCall { name, arguments, kwargs, wrapped_kwargs } => {
            assert_eq!(name.value, "std::len");
            assert_eq!(arguments.len(), 2);
            assert_eq!(kwargs.len(), 1);
            assert_eq!(kwargs[0].0.value, "key");
            assert_eq!(wrapped_kwargs.len(), 1);
        }
        other => panic!("Expected FunctionCall, got {:?}", other),
    }
}

#[test]
fn test_constructor_and_index_lookup() {
    match value_of("x = std::File(path=\"/a\", **opts)").kind {
        ExpressionKind::Constructor { class_type, attributes, wrapped_kwargs } => {
            assert_eq!(class_type.value, "std::File");
            assert_eq!(attributes.len(), 1);
            assert_eq!(wrapped_kwargs.len(), 1);
        }
        other => panic!("Expected Constructor, got {:?}", other),
    }

    match value_of("x = File[path=\"/a\"]").kind {
        ExpressionKind::IndexLookup { index_type, query, .. } => {
            assert_eq!(index_type.value, "File");
            assert_eq!(query[0].0.value, "path");
        }
        other => panic!("Expected IndexLookup, got {:?}", other),
    }
}

#[test]
fn test_short_index_lookup_and_map_lookup() {
    match value_of("x = h.files[path=\"/a\"]").kind {
        ExpressionKind::ShortIndexLookup { rootobject, relation, query, .. } => {
            assert_eq!(reference_name(&rootobject), "h");
            assert_eq!(relation.value, "files");
            assert_eq!(query.len(), 1);
        }
        other => panic!("Expected ShortIndexLookup, got {:?}", other),
    }

    match value_of("x = m[\"key\"]").kind {
        ExpressionKind::MapLookup { themap, key } => {
            assert_eq!(reference_name(&themap), "m");
            assert_eq!(key.try_constant(), Some(Value::String("key".to_string())));
        }
        other => panic!("Expected MapLookup, got {:?}", other),
    }
}

#[test]
fn test_namespace_dot_access_rejected() {
    let err = parse_err("x = std.Entity");
    match &err {
        ParseError::InvalidNamespaceAccess { name, suggestion, .. } => {
            assert_eq!(name, "std.Entity");
            assert_eq!(suggestion, "std::Entity");
        }
        other => panic!("Expected InvalidNamespaceAccess, got {:?}", other),
    }

    let err = parse_err("x = a.b(1)");
    assert_eq!(err.value().as_deref(), Some("a.b"));
}

#[test]
fn test_list_comprehension_nesting() {
    match value_of("x = [a + b for a in xs for b in ys if a > b]").kind {
        ExpressionKind::ListComprehension { value_expression, variable, guard, .. } => {
            assert_eq!(variable.value, "a");
            assert!(guard.is_none());
            match &value_expression.kind {
                ExpressionKind::ListComprehension { variable, guard, .. } => {
                    assert_eq!(variable.value, "b");
                    assert!(guard.is_some());
                }
                other => panic!("Expected inner ListComprehension, got {:?}", other),
            }
        }
        other => panic!("Expected ListComprehension, got {:?}", other),
    }
}

#[test]
fn test_dict_literal_folding() {
    assert_eq!(
        value_of("x = {\"a\": 1, \"b\": [2], \"a\": 3}").try_constant(),
        Some(Value::Dict(vec![
            ("a".to_string(), Value::Int(3)),
            ("b".to_string(), Value::List(vec![Value::Int(2)])),
        ]))
    );
    match value_of("x = {\"a\": y}").kind {
        ExpressionKind::CreateDict(pairs) => assert_eq!(pairs[0].0, "a"),
        other => panic!("Expected CreateDict, got {:?}", other),
    }
    assert_eq!(value_of("x = {}").try_constant(), Some(Value::Dict(Vec::new())));
}

#[test]
fn test_dict_key_interpolation_rejected() {
    let err = parse_err("x = {\"{{a}}\": 1}");
    assert!(err.message().starts_with("String interpolation is not supported in dictionary keys"));

    let raw = value_of("x = {r\"{{a}}\": 1}");
    assert_eq!(
        raw.try_constant(),
        Some(Value::Dict(vec![("{{a}}".to_string(), Value::Int(1))]))
    );
}

#[test]
fn test_integer_out_of_range() {
    let err = parse_err("x = 99999999999999999999");
    assert_eq!(err.message(), "Integer literal 99999999999999999999 is out of range");
}

// ============================================================================
// STRINGS
// ============================================================================

#[test]
fn test_fstring_fields() {
    match value_of("x = f\"{a.b} and {c:>{width}}\"").kind {
        ExpressionKind::StringFormatV2(format) => {
            let keys: Vec<&str> = format.variables.iter().map(|(_, key)| key.as_str()).collect();
            assert_eq!(keys, vec!["a.b", "c", "width"]);
            assert!(matches!(
                format.variables[0].0.kind,
                ExpressionKind::AttributeReference { .. }
            ));
        }
        other => panic!("Expected StringFormatV2, got {:?}", other),
    }
}

#[test]
fn test_fstring_without_fields_is_still_formatted() {
    assert!(matches!(
        value_of("x = f\"plain\"").kind,
        ExpressionKind::StringFormatV2(_)
    ));
}

#[test]
fn test_invalid_fstring() {
    let err = parse_err("x = f\"{\"");
    assert_eq!(err.message(), "Invalid f-string: expected '}' before end of string");
}

#[test]
fn test_raw_string_keeps_backslashes() {
    assert_eq!(
        value_of("x = r\"a\\d{{b}}\"").try_constant(),
        Some(Value::String("a\\d{{b}}".to_string()))
    );
}

#[test]
fn test_invalid_escape_warns() {
    let (result, warnings) = parse_collecting("x = \"\\q\"");
    assert_ok(&result);
    let warning = assert_single_warning(&warnings, WarningKind::InvalidEscape);
    assert_eq!(warning.message, "Invalid escape sequence in string.");
    assert_eq!(warning.value.as_deref(), Some("\\q"));
}

#[test]
fn test_raw_string_never_warns() {
    let (result, warnings) = parse_collecting("x = r\"\\q\"");
    assert_ok(&result);
    assert!(warnings.is_empty(), "{:?}", warnings);
}

#[test]
fn test_invalid_escape_in_multiline_string_warns() {
    let (result, warnings) = parse_collecting("x = \"\"\"a\\q\"\"\"");
    assert_ok(&result);
    let warning = assert_single_warning(&warnings, WarningKind::InvalidEscape);
    assert_eq!(warning.message, "Invalid escape sequence in multi-line string.");
    assert_range(&warning.location, 1, 5, 1, 14);
}

#[test]
fn test_multiline_string_interpolation() {
    match value_of("x = \"\"\"\nhello {{ name }}\n\"\"\"").kind {
        ExpressionKind::StringFormat(format) => {
            let (reference, _) = &format.variables[0];
            assert_eq!(reference_name(reference), "name");
            assert_eq!(reference.location.lnr, 2);
        }
        other => panic!("Expected StringFormat, got {:?}", other),
    }
}

#[test]
fn test_unterminated_string_is_illegal_quote() {
    let err = parse_err("x = \"abc");
    assert!(matches!(err, ParseError::IllegalCharacter { character: '"', .. }), "{:?}", err);
}
