//! Constant folding (§4.H) must resolve referenced names through the
//! caller-supplied lookup and propagate a referenced constant's type
//! through further arithmetic, not just fold literal operands.

use turbine::ast::{BinaryOp, ExprNode, QualifiedName, UnaryOp};
use turbine::const_eval::eval_const;
use turbine::diagnostic::Diagnostics;
use turbine::sym::ClassSymbol;
use turbine::types::const_value::Const;

fn owner() -> ClassSymbol {
    ClassSymbol::new("a/Constants")
}

/// `static final int BASE = 10;` referenced from `BASE * 2`.
#[test]
fn referenced_constant_participates_in_further_folding() {
    let resolve = |name: &QualifiedName| {
        (name.simple_name() == "BASE").then_some(Const::Int(10))
    };
    let expr = ExprNode::Binary(
        Box::new(ExprNode::Name(QualifiedName::new(vec!["BASE".into()]))),
        BinaryOp::Multiply,
        Box::new(ExprNode::Literal(Const::Int(2))),
    );
    let mut diagnostics = Diagnostics::new();
    let value = eval_const(&expr, &resolve, &owner(), &mut diagnostics);
    assert_eq!(value, Some(Const::Int(20)));
    assert!(!diagnostics.has_errors());
}

/// A deeply nested expression tree folds to a single value in one pass:
/// `-(1 + 2) * 3 == -9`.
#[test]
fn nested_unary_and_binary_expressions_fold_together() {
    let no_names = |_: &QualifiedName| None;
    let expr = ExprNode::Binary(
        Box::new(ExprNode::Unary(
            UnaryOp::Minus,
            Box::new(ExprNode::Paren(Box::new(ExprNode::Binary(
                Box::new(ExprNode::Literal(Const::Int(1))),
                BinaryOp::Add,
                Box::new(ExprNode::Literal(Const::Int(2))),
            )))),
        )),
        BinaryOp::Multiply,
        Box::new(ExprNode::Literal(Const::Int(3))),
    );
    let mut diagnostics = Diagnostics::new();
    let value = eval_const(&expr, &no_names, &owner(), &mut diagnostics);
    assert_eq!(value, Some(Const::Int(-9)));
}

/// A cast narrows a folded value the way javac does: `(byte) 300 == 44`.
#[test]
fn cast_narrows_a_folded_int_to_byte() {
    let no_names = |_: &QualifiedName| None;
    let expr = ExprNode::Cast(
        turbine::ast::TypeNode::Primitive(turbine::types::primitive::PrimitiveType::Byte),
        Box::new(ExprNode::Literal(Const::Int(300))),
    );
    let mut diagnostics = Diagnostics::new();
    let value = eval_const(&expr, &no_names, &owner(), &mut diagnostics);
    assert_eq!(value, Some(Const::Byte(44)));
}

/// A name the resolver does not recognize is reported once, attributed to
/// the owning class, and yields no value.
#[test]
fn name_the_resolver_rejects_is_reported_against_the_owner() {
    let no_names = |_: &QualifiedName| None;
    let expr = ExprNode::Name(QualifiedName::new(vec!["MISSING".into()]));
    let mut diagnostics = Diagnostics::new();
    let value = eval_const(&expr, &no_names, &owner(), &mut diagnostics);
    assert_eq!(value, None);
    assert!(diagnostics.has_errors());
}
