//! Dependency extraction ahead of evaluation, and the matching
//! materialization of the same parameter graphs.

use std::collections::BTreeSet;

use ruledeck_eval::{
    AutoResolve, Condition, Constant, Context, DataType, Datum, Element, Engine, EvalError,
    FunctionDef, FunctionError, ParamNode, ParamRecord, Rule, Symbol, Variable,
};

/// A caller-defined parameter type that opts into automatic resolution.
struct Applicant {
    name: Element,
    scores: Vec<Element>,
}

impl AutoResolve for Applicant {
    fn to_param_record(&self) -> ParamRecord {
        ParamRecord::new("Applicant")
            .typed_field("name", DataType::Text, self.name.clone())
            .open_field(
                "history",
                ParamNode::mapping([(
                    "scores",
                    ParamNode::sequence(self.scores.iter().cloned()),
                )]),
            )
    }
}

/// Sums `history.scores` of an `Applicant` record.
fn total_score() -> FunctionDef {
    FunctionDef::new(
        "total_score",
        DataType::StructuredObject,
        DataType::Number,
        |p| {
            let Datum::Record(record) = p else {
                return Err(FunctionError::InvalidArgument("record expected".into()));
            };
            let Some(Datum::Map(history)) = record.get("history") else {
                return Err(FunctionError::InvalidArgument("missing history".into()));
            };
            let Some(Datum::List(scores)) = history.get("scores") else {
                return Err(FunctionError::InvalidArgument("missing scores".into()));
            };
            let total = scores
                .iter()
                .filter_map(Datum::as_number)
                .sum::<rust_decimal::Decimal>();
            Ok(Datum::Number(total))
        },
    )
}

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.register_function(total_score()).unwrap();
    engine
}

#[test]
fn nested_element_is_the_only_dependency() {
    let engine = engine();
    let e1 = Element::number("e1").unwrap();
    let param = ParamRecord::new("Wrapper").open_field(
        "inner",
        ParamNode::mapping([("items", ParamNode::sequence([e1.clone()]))]),
    );
    let v = Variable::new(
        engine.registry(),
        "get_property",
        ParamNode::mapping([
            ("object", ParamNode::from(param)),
            ("field", ParamNode::from(Constant::text("inner"))),
        ]),
    )
    .unwrap();
    assert_eq!(v.collect_references(), BTreeSet::from([e1]));
}

#[test]
fn engine_dependencies_cover_condition_and_action() {
    let mut engine = engine();
    let applicant = Applicant {
        name: Element::text("name").unwrap(),
        scores: vec![Element::number("s1").unwrap(), Element::number("s2").unwrap()],
    };
    let total = Variable::new(engine.registry(), "total_score", ParamNode::record(&applicant))
        .unwrap();
    engine
        .add_rule(Rule::new(
            "admit",
            Condition::new(total, Symbol::Gt, Element::number("cutoff").unwrap()),
            Element::text("name").unwrap(),
            1,
        ))
        .unwrap();

    let deps: Vec<String> = engine
        .dependencies("admit")
        .unwrap()
        .into_iter()
        .map(|e| e.code().to_string())
        .collect();
    assert_eq!(deps, vec!["cutoff", "name", "s1", "s2"]);
}

#[test]
fn dependencies_predict_what_evaluation_needs() {
    let mut engine = engine();
    let applicant = Applicant {
        name: Element::text("name").unwrap(),
        scores: vec![Element::number("s1").unwrap(), Element::number("s2").unwrap()],
    };
    let total = Variable::new(engine.registry(), "total_score", ParamNode::record(&applicant))
        .unwrap();
    engine
        .add_rule(Rule::new(
            "admit",
            Condition::new(total, Symbol::Ge, Constant::number(100)),
            Constant::boolean(true),
            1,
        ))
        .unwrap();

    let partial: Context = [("name", Datum::from("Ada")), ("s1", Datum::from(60))]
        .into_iter()
        .collect();
    let missing = engine.missing_references("admit", &partial).unwrap();
    assert_eq!(missing, vec![Element::number("s2").unwrap()]);
    assert_eq!(
        engine.execute("admit", &partial).unwrap_err(),
        EvalError::MissingReference { code: "s2".into() }
    );

    let mut full = partial.clone();
    full.put("s2", 45);
    assert!(engine.missing_references("admit", &full).unwrap().is_empty());
    assert_eq!(
        engine.execute("admit", &full).unwrap().into_value(),
        Some(Datum::Bool(true))
    );
}

#[test]
fn typed_slot_checked_when_materialized() {
    let engine = engine();
    let applicant = Applicant {
        name: Element::object("name").unwrap(),
        scores: Vec::new(),
    };
    // An open element fits any slot statically but must resolve to Text.
    let total = Variable::new(engine.registry(), "total_score", ParamNode::record(&applicant))
        .unwrap();
    let ctx: Context = [("name", 7)].into_iter().collect();
    assert_eq!(
        total.evaluate(&ctx).unwrap_err(),
        EvalError::FieldMismatch {
            record: "Applicant".into(),
            field: "name".into(),
            expected: DataType::Text,
            got: DataType::Number,
        }
    );
}

#[test]
fn mismatched_typed_slot_rejected_at_construction() {
    let engine = engine();
    let param = ParamRecord::new("Applicant").typed_field(
        "name",
        DataType::Text,
        Element::number("age").unwrap(),
    );
    let err = Variable::new(engine.registry(), "total_score", param).unwrap_err();
    assert!(err.is_configuration());
    assert!(matches!(err, EvalError::FieldType { .. }));
}

#[test]
fn constants_reject_mismatched_literals() {
    assert_eq!(
        Constant::new(DataType::Number, "18").unwrap_err(),
        EvalError::ConstantType {
            expected: DataType::Number,
            got: DataType::Text,
        }
    );
    assert!(Constant::new(DataType::GenericObject, "18").is_ok());
}

#[test]
fn element_identity_is_code_and_type() {
    let a = Element::number("age").unwrap();
    assert_eq!(a, Element::number("age").unwrap());
    assert_ne!(a, Element::text("age").unwrap());
    let set = BTreeSet::from([a.clone(), Element::number("age").unwrap()]);
    assert_eq!(set.len(), 1);
    assert!(Element::number("  ").is_err());
}
