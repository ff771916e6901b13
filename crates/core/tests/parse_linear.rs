//! Integration tests for reading the arrow-based linear form.

use cgx_core::{CgError, Notation, ParseErrorKind, Session};
use cgx_model::{ConceptId, Designator, GraphId, Literal, Model, Number, RelationId};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn parse(src: &str) -> (Model, GraphId) {
    let mut model = Model::new();
    let graph = Session::new()
        .parse_graph(&mut model, src, Notation::Linear)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", src, e));
    (model, graph)
}

fn parse_err(src: &str) -> CgError {
    let mut model = Model::new();
    match Session::new().parse_graph(&mut model, src, Notation::Linear) {
        Ok(_) => panic!("expected {:?} to be rejected", src),
        Err(e) => e,
    }
}

fn type_of(model: &Model, concept: ConceptId) -> String {
    let ty = model.concept(concept).ty.expect("concept has a type");
    model
        .hierarchy
        .concepts
        .label(ty)
        .unwrap_or_default()
        .to_owned()
}

/// `"On(Cat, Mat)"` for each relation of `graph`, in graph order.
fn relations(model: &Model, graph: GraphId) -> Vec<String> {
    model
        .graph(graph)
        .relations
        .iter()
        .map(|&r| describe(model, r))
        .collect()
}

fn describe(model: &Model, relation: RelationId) -> String {
    let data = model.relation(relation);
    let label = model
        .hierarchy
        .relations
        .label(data.ty.expect("typed"))
        .unwrap_or_default();
    let args: Vec<String> = data.args.iter().map(|&c| type_of(model, c)).collect();
    format!("{}({})", label, args.join(", "))
}

// ──────────────────────────────────────────────
// Chains
// ──────────────────────────────────────────────

#[test]
fn test_right_arrow_chain() {
    let (model, g) = parse("[Cat] -> (On) -> [Mat].");
    assert_eq!(relations(&model, g), vec!["On(Cat, Mat)"]);
    assert_eq!(model.graph(g).concepts.len(), 2);
}

#[test]
fn test_left_arrow_chain_reverses_arguments() {
    let (model, g) = parse("[Mat] <- (On) <- [Cat].");
    assert_eq!(relations(&model, g), vec!["On(Cat, Mat)"]);
}

#[test]
fn test_chain_continues_from_last_target() {
    let (model, g) = parse("[Person] -> (Agnt) -> [Drive] -> (Obj) -> [Car].");
    assert_eq!(
        relations(&model, g),
        vec!["Agnt(Person, Drive)", "Obj(Drive, Car)"]
    );
    assert_eq!(model.graph(g).concepts.len(), 3);
}

#[test]
fn test_monadic_relations() {
    let (model, g) = parse("[Cat] -> (Happy). (Past) -> [Situation].");
    assert_eq!(relations(&model, g), vec!["Happy(Cat)", "Past(Situation)"]);
}

#[test]
fn test_question_mark_ends_a_statement() {
    let (model, g) = parse("[Cat] -> (On) -> [Mat]?");
    assert_eq!(relations(&model, g), vec!["On(Cat, Mat)"]);
}

#[test]
fn test_missing_terminator_between_statements() {
    let err = parse_err("[Cat] [Dog].");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::Syntax));
}

// ──────────────────────────────────────────────
// Fan-out
// ──────────────────────────────────────────────

#[test]
fn test_fan_out_shares_head() {
    let src = "[Go]-\n    (Agnt) -> [Person: 'John']\n    (Dest) -> [City: 'Boston'].";
    let (model, g) = parse(src);
    assert_eq!(
        relations(&model, g),
        vec!["Agnt(Go, Person)", "Dest(Go, City)"]
    );
    let rels = &model.graph(g).relations;
    assert_eq!(model.relation(rels[0]).args[0], model.relation(rels[1]).args[0]);
}

#[test]
fn test_nested_fan_out_closed_by_comma() {
    let src = "[A]-\n    (R) -> [B]-\n        (S) -> [C]\n        (U) -> [E],\n    (T) -> [D].";
    let (model, g) = parse(src);
    assert_eq!(
        relations(&model, g),
        vec!["R(A, B)", "S(B, C)", "U(B, E)", "T(A, D)"]
    );
}

#[test]
fn test_fan_out_mixes_directions_per_branch() {
    let (model, g) = parse("[Drive]- (Agnt) -> [Person] (Inst) <- [Car].");
    assert_eq!(
        relations(&model, g),
        vec!["Agnt(Drive, Person)", "Inst(Car, Drive)"]
    );
}

#[test]
fn test_empty_fan_out_rejected() {
    let err = parse_err("[Go]- .");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::Syntax));
}

// ──────────────────────────────────────────────
// Labels, descriptors and negation
// ──────────────────────────────────────────────

#[test]
fn test_bound_label_starts_a_chain() {
    let (model, g) = parse("[Cat: *x]. [Mat] <- (On) <- ?x.");
    let cat = model.graph(g).concepts[0];
    let on = model.relation(model.graph(g).relations[0]);
    assert_eq!(on.args[0], cat);
    assert_eq!(model.graph(g).concepts.len(), 2);
}

#[test]
fn test_descriptor_holds_linear_statements() {
    let (model, g) = parse("[Proposition: [Cat] -> (On) -> [Mat]].");
    let prop = model.graph(g).concepts[0];
    let inner = model
        .concept(prop)
        .referent
        .as_ref()
        .and_then(|r| r.descriptor)
        .expect("descriptor");
    assert_eq!(relations(&model, inner), vec!["On(Cat, Mat)"]);
}

#[test]
fn test_negation_statement() {
    let (model, g) = parse("~[[Cat] -> (On) -> [Mat]].");
    let neg = model.relation(model.graph(g).relations[0]);
    let wrapper = model.concept(neg.args[0]);
    assert!(wrapper.hidden);
    let body = wrapper.referent.as_ref().and_then(|r| r.descriptor).expect("body");
    assert_eq!(relations(&model, body), vec!["On(Cat, Mat)"]);
}

#[test]
fn test_keywords_are_ordinary_types_in_linear_form() {
    let (model, g) = parse("[If] -> (Attr) -> [Else].");
    assert_eq!(relations(&model, g), vec!["Attr(If, Else)"]);
}

#[test]
fn test_negative_numbers_in_referents() {
    let (model, g) = parse("[Number: -5] -> (Succ) -> [Number: -4.5].");
    let numbers: Vec<Option<Designator>> = model
        .graph(g)
        .concepts
        .iter()
        .map(|&c| model.concept(c).referent.as_ref().and_then(|r| r.designator.clone()))
        .collect();
    assert_eq!(
        numbers,
        vec![
            Some(Designator::Literal(Literal::Number {
                value: Number::Int(-5)
            })),
            Some(Designator::Literal(Literal::Number {
                value: Number::Float(-4.5)
            })),
        ]
    );
    assert_eq!(relations(&model, g), vec!["Succ(Number, Number)"]);
}

// ──────────────────────────────────────────────
// Unsupported forms
// ──────────────────────────────────────────────

#[test]
fn test_scope_and_type_macro_markers_rejected() {
    for src in ["[Scope [Cat]].", "[A] -> (R) -> [typeMacro]."] {
        let err = parse_err(src);
        assert_eq!(err.parse_kind(), Some(ParseErrorKind::ReservedContext), "{}", src);
    }
}

#[test]
fn test_numbered_arc_rejected() {
    let err = parse_err("[A] -1-> (R) -> [B].");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnsupportedArc));
}

#[test]
fn test_numbered_fan_out_rejected() {
    let err = parse_err("[A] -> (Betw)-\n    -1-> [B]\n    -2-> [C].");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnsupportedArc));
}

#[test]
fn test_mixed_arrow_directions_rejected() {
    let err = parse_err("[A] -> (R) <- [B].");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnsupportedArc));
}
