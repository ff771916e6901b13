//! Integration tests for reading the bracket form into a model.

use cgx_core::{CgError, Notation, ParseErrorKind, ParseOptions, Session};
use cgx_model::{
    ConceptId, Designator, GraphId, Literal, Model, Number, Quantifier, RelationKind,
};

// ──────────────────────────────────────────────
// Helpers
// ──────────────────────────────────────────────

fn parse(src: &str) -> (Model, GraphId) {
    let mut model = Model::new();
    let graph = Session::new()
        .parse_graph(&mut model, src, Notation::Cgif)
        .unwrap_or_else(|e| panic!("failed to parse {:?}: {}", src, e));
    (model, graph)
}

fn parse_err(src: &str) -> CgError {
    let mut model = Model::new();
    match Session::new().parse_graph(&mut model, src, Notation::Cgif) {
        Ok(_) => panic!("expected {:?} to be rejected", src),
        Err(e) => e,
    }
}

fn type_of(model: &Model, concept: ConceptId) -> &str {
    let ty = model.concept(concept).ty.expect("concept has a type");
    model.hierarchy.concepts.label(ty).unwrap_or("<anonymous>")
}

fn designator(model: &Model, concept: ConceptId) -> Option<&Designator> {
    model.concept(concept).referent.as_ref()?.designator.as_ref()
}

// ──────────────────────────────────────────────
// Concepts and relations
// ──────────────────────────────────────────────

#[test]
fn test_defined_labels_connect_relation_arcs() {
    let (model, g) = parse("[Cat: *x] [Mat: *y] (On ?x ?y)");
    let graph = model.graph(g);
    assert_eq!(graph.concepts.len(), 2);
    assert_eq!(graph.relations.len(), 1);

    let on = model.relation(graph.relations[0]);
    assert_eq!(on.args, graph.concepts);
    assert_eq!(
        model.hierarchy.relations.label(on.ty.expect("typed")),
        Some("On")
    );
    assert_eq!(type_of(&model, on.args[0]), "Cat");
    assert_eq!(type_of(&model, on.args[1]), "Mat");
}

#[test]
fn test_inline_arcs_keep_argument_order() {
    let (model, g) = parse("(Betw [Rock] [Place] [Person])");
    let graph = model.graph(g);
    let betw = model.relation(graph.relations[0]);
    let types: Vec<&str> = betw.args.iter().map(|&c| type_of(&model, c)).collect();
    assert_eq!(types, vec!["Rock", "Place", "Person"]);
    assert_eq!(graph.concepts, betw.args);
}

#[test]
fn test_types_created_on_demand_under_top() {
    let (model, g) = parse("[Unicorn]");
    let lattice = &model.hierarchy.concepts;
    let ty = model.concept(model.graph(g).concepts[0]).ty.expect("typed");
    assert_eq!(lattice.label(ty), Some("Unicorn"));
    assert_eq!(lattice.node(ty).parents, vec![lattice.top()]);
}

#[test]
fn test_on_demand_creation_disabled_rejects_unknown_type() {
    let mut model = Model::new();
    let options = ParseOptions {
        create_types_on_demand: false,
        ..ParseOptions::default()
    };
    let err = Session::with_options(options)
        .parse_graph(&mut model, "[Unicorn]", Notation::Cgif)
        .unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnknownType));
}

#[test]
fn test_known_types_accepted_with_on_demand_disabled() {
    let mut model = Model::new();
    model
        .hierarchy
        .concepts
        .create_on_demand("Cat")
        .expect("fresh label");
    model
        .hierarchy
        .declare_relation("On", 2, &[])
        .expect("fresh label");
    let options = ParseOptions {
        create_types_on_demand: false,
        ..ParseOptions::default()
    };
    let g = Session::with_options(options)
        .parse_graph(&mut model, "(On [Cat] [Cat])", Notation::Cgif)
        .unwrap_or_else(|e| panic!("{}", e));
    assert_eq!(model.graph(g).relations.len(), 1);
}

#[test]
fn test_declared_valence_is_enforced() {
    let mut model = Model::new();
    model
        .hierarchy
        .declare_relation("Owns", 2, &[])
        .expect("fresh label");
    let err = Session::new()
        .parse_graph(&mut model, "(Owns [Person])", Notation::Cgif)
        .unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::ValenceMismatch));

    Session::new()
        .parse_graph(&mut model, "(Owns [Person] [Car])", Notation::Cgif)
        .unwrap_or_else(|e| panic!("{}", e));
}

#[test]
fn test_undeclared_valence_accepts_any_arity() {
    let (model, g) = parse("(Past [Situation]) (Past [Situation] [Time])");
    assert_eq!(model.graph(g).relations.len(), 2);
}

// ──────────────────────────────────────────────
// Referents
// ──────────────────────────────────────────────

#[test]
fn test_literal_and_name_designators() {
    let (model, g) =
        parse(r#"[Person: 'John'] [Number: 42] [Number: 2.5] [String: "hi there"] [Image: %base64 "aGk="]"#);
    let c = &model.graph(g).concepts;
    assert_eq!(
        designator(&model, c[0]),
        Some(&Designator::Name("John".into()))
    );
    assert_eq!(
        designator(&model, c[1]),
        Some(&Designator::Literal(Literal::Number {
            value: Number::Int(42)
        }))
    );
    assert_eq!(
        designator(&model, c[2]),
        Some(&Designator::Literal(Literal::Number {
            value: Number::Float(2.5)
        }))
    );
    assert_eq!(
        designator(&model, c[3]),
        Some(&Designator::Literal(Literal::String {
            value: "hi there".into()
        }))
    );
    assert_eq!(
        designator(&model, c[4]),
        Some(&Designator::Literal(Literal::Encoded {
            encoding: "base64".into(),
            payload: "aGk=".into()
        }))
    );
}

#[test]
fn test_quantifiers() {
    let (model, g) = parse("[Cat: @every] [Dog: @3] [Bird: @some]");
    let quantifiers: Vec<Option<Quantifier>> = model
        .graph(g)
        .concepts
        .iter()
        .map(|&c| model.concept(c).referent.as_ref().and_then(|r| r.quantifier.clone()))
        .collect();
    assert_eq!(
        quantifiers,
        vec![
            Some(Quantifier::Every),
            Some(Quantifier::Count(3)),
            Some(Quantifier::Some)
        ]
    );
}

#[test]
fn test_markers_share_identity_by_foreign_id() {
    let mut model = Model::new();
    let mut session = Session::new();
    let g = session
        .parse_graph(&mut model, "[Cat: #12] [Cat: #12] [Cat: #] [Cat: #]", Notation::Cgif)
        .unwrap_or_else(|e| panic!("{}", e));
    let markers: Vec<Designator> = model
        .graph(g)
        .concepts
        .iter()
        .map(|&c| designator(&model, c).cloned().expect("marker"))
        .collect();
    assert_eq!(markers[0], markers[1]);
    assert_ne!(markers[2], markers[3]);
    assert_ne!(markers[0], markers[2]);
    assert_eq!(model.marker_count(), 3);
    assert!(session.markers().marker_by_foreign_id("12").is_some());
}

#[test]
fn test_bound_label_after_defining_label_is_a_designator() {
    let (model, g) = parse("[Cat: *x 'Yojo'] [Animal: *y ?x]");
    let c = &model.graph(g).concepts;
    assert_eq!(designator(&model, c[1]), Some(&Designator::Defined(c[0])));
    assert!(model.concept(c[1]).coref_sets.is_empty());
}

#[test]
fn test_bound_label_as_concept_label_joins_coreference_set() {
    let (model, g) = parse("[Cat: *x 'Yojo'] [Animal: ?x]");
    let c = &model.graph(g).concepts;
    assert_eq!(model.concept(c[1]).coref_sets.len(), 1);
    let set = model.coref_set(model.concept(c[1]).coref_sets[0]);
    assert_eq!(set.defining, c[0]);
    assert_eq!(set.members, vec![c[0], c[1]]);
}

#[test]
fn test_descriptor_graph_is_owned_by_its_concept() {
    let (model, g) = parse("[Proposition: [Cat] (On [Cat] [Mat])]");
    let prop = model.graph(g).concepts[0];
    let inner = model
        .concept(prop)
        .referent
        .as_ref()
        .and_then(|r| r.descriptor)
        .expect("descriptor");
    assert_eq!(model.graph(inner).owner, Some(prop));
    assert_eq!(model.graph(inner).concepts.len(), 3);
    assert_eq!(model.graph(inner).relations.len(), 1);
    assert!(model.is_nested_in(inner, g));
}

// ──────────────────────────────────────────────
// Contexts, negation and actors
// ──────────────────────────────────────────────

#[test]
fn test_special_context_keeps_its_label() {
    let (model, g) = parse("[If: [Cat: *x] [Then: (On ?x [Mat])]]");
    let outer = model.graph(g).concepts[0];
    assert_eq!(model.concept(outer).special.as_deref(), Some("If"));
    let body = model
        .concept(outer)
        .referent
        .as_ref()
        .and_then(|r| r.descriptor)
        .expect("body");
    let then = model.graph(body).concepts[1];
    assert_eq!(model.concept(then).special.as_deref(), Some("Then"));
}

#[test]
fn test_special_context_keyword_is_case_insensitive() {
    let (model, g) = parse("[either [or [Cat]] [or [Dog]]]");
    let outer = model.graph(g).concepts[0];
    assert_eq!(model.concept(outer).special.as_deref(), Some("Either"));
}

#[test]
fn test_else_context_is_reserved() {
    let err = parse_err("[If [Cat]] [Else [Dog]]");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::ReservedContext));
}

#[test]
fn test_negation_wraps_hidden_concept() {
    let (model, g) = parse("~[(On [Cat] [Mat])]");
    let graph = model.graph(g);
    assert_eq!(graph.relations.len(), 1);
    let neg = model.relation(graph.relations[0]);
    assert_eq!(
        model.hierarchy.relations.label(neg.ty.expect("typed")),
        Some(cgx_core::NEGATION_RELATION)
    );
    assert_eq!(neg.args.len(), 1);
    let wrapper = model.concept(neg.args[0]);
    assert!(wrapper.hidden);
    let body = wrapper.referent.as_ref().and_then(|r| r.descriptor).expect("body");
    assert_eq!(model.graph(body).concepts.len(), 2);
    assert_eq!(model.graph(body).relations.len(), 1);
}

#[test]
fn test_actor_splits_inputs_and_outputs() {
    let (model, g) = parse("[Number: *a 1] [Number: *b 2] [Number: *c] <Plus ?a ?b | ?c ;adds>");
    let graph = model.graph(g);
    let plus = model.relation(graph.relations[0]);
    assert!(plus.is_actor());
    assert_eq!(plus.kind, RelationKind::Actor { outputs_from: 2 });
    assert_eq!(plus.inputs(), &graph.concepts[..2]);
    assert_eq!(plus.outputs(), &graph.concepts[2..]);
    assert_eq!(plus.comment.as_deref(), Some("adds"));
}

#[test]
fn test_comments_attach_to_graph_concept_and_relation() {
    let (model, g) = parse("/** header */ [Cat ;a cat] (On [Cat] [Mat] ;resting)");
    let graph = model.graph(g);
    assert_eq!(graph.comments, vec!["header".to_owned()]);
    assert_eq!(model.concept(graph.concepts[0]).comment.as_deref(), Some("a cat"));
    assert_eq!(
        model.relation(graph.relations[0]).comment.as_deref(),
        Some("resting")
    );
}

// ──────────────────────────────────────────────
// Lambda types
// ──────────────────────────────────────────────

#[test]
fn test_concept_lambda_defines_anonymous_type() {
    let (model, g) = parse("[(lambda (Cat *x) [Cat: *x] (On ?x [Mat]))]");
    let c = model.graph(g).concepts[0];
    let ty = model.concept(c).ty.expect("typed");
    let node = model.hierarchy.concepts.node(ty);
    assert_eq!(node.label, None);
    let def = node.definition.as_ref().expect("definition");
    assert_eq!(def.parameters.len(), 1);
    assert_eq!(def.parameters[0].label, "x");
    let body = def.body.expect("body");
    assert_eq!(def.parameters[0].concept, Some(model.graph(body).concepts[0]));
}

#[test]
fn test_relation_lambda_sets_valence() {
    let (model, g) =
        parse("[Cat: *a] [Mat: *b] ((lambda (Cat *x, Mat *y) [Cat: *x] [Mat: *y] (On ?x ?y)) ?a ?b)");
    let rel = model.relation(model.graph(g).relations[0]);
    let ty = rel.ty.expect("typed");
    assert_eq!(model.hierarchy.relations.valence(ty), Some(2));
    assert_eq!(rel.args, model.graph(g).concepts);
}

#[test]
fn test_lambda_parameter_type_mismatch() {
    let err = parse_err("[(lambda (Cat *x) [Dog: *x])]");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::TypeMismatch));
}

#[test]
fn test_lambda_parameter_missing_from_body() {
    let err = parse_err("[(lambda (Cat *x) [Cat: *y])]");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::LambdaParameter));
}

#[test]
fn test_concept_lambda_needs_one_parameter() {
    let err = parse_err("[(lambda (Cat *x, Mat *y) [Cat: *x] [Mat: *y])]");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::Syntax));
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[test]
fn test_duplicate_defining_label() {
    let err = parse_err("[Cat: *x] [Dog: *x]");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::DuplicateLabel));
}

#[test]
fn test_unbound_label() {
    let err = parse_err("(On ?z [Mat])");
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::UnboundLabel));
}

#[test]
fn test_unclosed_concept_reports_position() {
    let err = parse_err("[Cat: *x]\n  (On ?x [Mat]");
    match err {
        CgError::Parse { kind, span, .. } => {
            assert_eq!(kind, ParseErrorKind::Syntax);
            assert_eq!(span.line, 2);
        }
        other => panic!("expected parse error, got {:?}", other),
    }
}

#[test]
fn test_lexical_error_reports_line_and_column() {
    let err = parse_err("[Cat]\n[Dog $]");
    match err {
        CgError::Lex {
            line,
            column,
            found,
            ..
        } => {
            assert_eq!((line, column), (2, 6));
            assert_eq!(found, Some('$'));
        }
        other => panic!("expected lexical error, got {:?}", other),
    }
}

#[test]
fn test_nesting_limit() {
    let mut model = Model::new();
    let options = ParseOptions {
        max_depth: 3,
        ..ParseOptions::default()
    };
    let mut session = Session::with_options(options);
    session
        .parse_graph(&mut model, "[A: [B: [C]]]", Notation::Cgif)
        .unwrap_or_else(|e| panic!("{}", e));
    let err = session
        .parse_graph(&mut model, "[A: [B: [C: [D]]]]", Notation::Cgif)
        .unwrap_err();
    assert_eq!(err.parse_kind(), Some(ParseErrorKind::NestingTooDeep));
}

#[test]
fn test_error_serializes_kind_and_span() {
    let err = parse_err("[Cat: *x] [Dog: *x]");
    let json = err.to_json_value();
    assert_eq!(json["kind"], "parse");
    assert_eq!(json["parse_kind"], "duplicate_label");
    assert_eq!(json["span"]["line"], 1);
}
