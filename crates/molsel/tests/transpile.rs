//! End-to-end tests for the RasMol dialect

use molsel::{
    transpile, AtomGroups, BooleanExpression, CompareOp, Dialect, DialectKind, IdentifierScheme,
    ParseErrorKind, Predicate, Property, QueryExpression, SecondaryStructureFlags, SemanticLevel,
    TranspileOptions, Value,
};

fn rasmol(text: &str) -> QueryExpression {
    match transpile(Dialect::get(DialectKind::RasMol), text) {
        Ok(q) => q,
        Err(e) => panic!("{:?} failed: {}", text, e),
    }
}

fn rasmol_err(text: &str) -> molsel::ParseError {
    match transpile(Dialect::get(DialectKind::RasMol), text) {
        Ok(q) => panic!("{:?} unexpectedly parsed as {}", text, q),
        Err(e) => e,
    }
}

fn generator(q: &QueryExpression) -> &AtomGroups {
    q.as_generator()
        .unwrap_or_else(|| panic!("not a generator: {}", q))
}

#[test]
fn test_deterministic() {
    for text in ["ALA:A.CA", "resno 1-5,10 or not water", "name like \"C.*\""] {
        assert_eq!(rasmol(text), rasmol(text));
    }
}

#[test]
fn test_concurrent_calls_share_a_dialect() {
    let dialect = Dialect::get(DialectKind::RasMol);
    let expected = rasmol("protein and :A");
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| transpile(dialect, "protein and :A")))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap().unwrap(), expected);
        }
    });
}

#[test]
fn test_chain_and_atom_macro() {
    let q = rasmol(":A.CA");
    let groups = generator(&q);
    assert!(groups.chain_test.is_some());
    assert!(groups.atom_test.is_some());
    assert!(groups.residue_test.is_none());
}

#[test]
fn test_full_macro_fills_every_level() {
    let q = rasmol("ALA:A.CA");
    assert_eq!(
        q.to_string(),
        "(atom-groups :atom-test (= auth_atom_id \"CA\") \
         :residue-test (= auth_comp_id \"ALA\") \
         :chain-test (= auth_asym_id \"A\"))"
    );
}

#[test]
fn test_macro_separators() {
    let atom_only = generator(&rasmol("::CA")).clone();
    assert_eq!(atom_only.levels().collect::<Vec<_>>(), vec![SemanticLevel::Atom]);

    let residue_only = generator(&rasmol("ALA::")).clone();
    assert_eq!(
        residue_only.levels().collect::<Vec<_>>(),
        vec![SemanticLevel::Residue]
    );

    assert_eq!(rasmol("*"), QueryExpression::all());
    assert_eq!(rasmol("*.CA"), rasmol("::CA"));
}

#[test]
fn test_operand_order_is_normalized() {
    assert_eq!(rasmol("resno >= 10"), rasmol("10 <= resno"));
    assert_eq!(rasmol("resno < 10"), rasmol("10 > resno"));
    assert_eq!(rasmol("resno == 10"), rasmol("resno = 10"));
}

#[test]
fn test_range_list_clause() {
    let q = rasmol("resno 1-5,10");
    assert_eq!(
        generator(&q).residue_test,
        BooleanExpression::any([
            BooleanExpression::from(Predicate::InRange {
                property: Property::AuthSeqId,
                low: Value::from(1),
                high: Value::from(5),
            }),
            BooleanExpression::from(Predicate::in_set(
                Property::AuthSeqId,
                vec![Value::from(10)]
            )),
        ])
    );

    let q = rasmol("resno 7");
    assert_eq!(
        generator(&q).residue_test,
        Some(BooleanExpression::Leaf(Predicate::in_set(
            Property::AuthSeqId,
            vec![Value::from(7)]
        )))
    );
}

#[test]
fn test_clause_with_pattern() {
    let q = rasmol("name CA, \"C.*\"");
    assert_eq!(
        q.to_string(),
        "(atom-groups :atom-test (or (in-set auth_atom_id \"CA\") (match /^C.*$/i auth_atom_id)))"
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    let implicit = rasmol(":A or :B and :C");
    let grouped = rasmol("(:A or :B) and :C");
    assert_ne!(implicit, grouped);
    assert_eq!(
        implicit,
        QueryExpression::union([
            rasmol(":A"),
            QueryExpression::intersect([rasmol(":B"), rasmol(":C")]),
        ])
    );
    assert_eq!(rasmol(":A | :B & :C"), implicit);
}

#[test]
fn test_parentheses_change_grouping() {
    let nested = rasmol("chain A and (resi 1 or resi 2)");
    let flat = rasmol("(chain A and resi 1) or resi 2");
    assert_ne!(nested, flat);
    assert_eq!(
        nested,
        QueryExpression::intersect([
            rasmol("chain A"),
            QueryExpression::union([rasmol("resi 1"), rasmol("resi 2")]),
        ])
    );
    assert_eq!(
        flat,
        QueryExpression::union([
            QueryExpression::intersect([rasmol("chain A"), rasmol("resi 1")]),
            rasmol("resi 2"),
        ])
    );
}

#[test]
fn test_parenthesized_value_operand() {
    assert_eq!(rasmol("(resno) >= 10"), rasmol("resno >= 10"));
    assert_eq!(rasmol("10 <= (resno)"), rasmol("resno >= 10"));
}

#[test]
fn test_not() {
    assert_eq!(rasmol("not water"), rasmol("water").complement());
    assert_eq!(rasmol("!water"), rasmol("not water"));
}

#[test]
fn test_unknown_property_is_rejected_eagerly() {
    let err = rasmol_err(":A.CA and foo X");
    assert_eq!(err.kind, ParseErrorKind::UnsupportedProperty("foo".to_string()));
    assert_eq!(err.position, 10);
}

#[test]
fn test_coordinate_letters_are_plain_values() {
    assert_eq!(
        rasmol("chain X").to_string(),
        "(atom-groups :chain-test (in-set auth_asym_id \"X\"))"
    );
    assert_eq!(
        rasmol("chain Y,z").to_string(),
        "(atom-groups :chain-test (in-set auth_asym_id \"Y\" \"z\"))"
    );
    assert_eq!(
        rasmol("name = Z").to_string(),
        "(atom-groups :atom-test (= auth_atom_id \"Z\"))"
    );
    // The left property is the subject
    let err = rasmol_err("x = name");
    assert!(matches!(err.kind, ParseErrorKind::TypeMismatch { .. }));

    let err = rasmol_err(":A and foo Y");
    assert_eq!(err.kind, ParseErrorKind::UnsupportedProperty("foo".to_string()));
    assert_eq!(err.position, 7);
}

#[test]
fn test_trailing_input() {
    let err = rasmol_err("resi 5 garbage");
    assert_eq!(err.kind, ParseErrorKind::TrailingInput);
}

#[test]
fn test_like_equals_quoted_pattern() {
    assert_eq!(rasmol("name like \"C.*\""), rasmol("name = \"C.*\""));
    assert_eq!(rasmol("name like 'C.*'"), rasmol("name = \"C.*\""));
    assert_eq!(rasmol("'C.*' LIKE name"), rasmol("name like 'C.*'"));
}

#[test]
fn test_case_sensitive_like() {
    let options = TranspileOptions::default().with_case_sensitive_like(true);
    let dialect = Dialect::new(DialectKind::RasMol, options);
    let q = dialect.transpile("name like 'C.*'").unwrap();
    assert_eq!(
        q.to_string(),
        "(atom-groups :atom-test (match /^C.*$/ auth_atom_id))"
    );
}

#[test]
fn test_label_scheme() {
    let options = TranspileOptions::default().with_identifier_scheme(IdentifierScheme::Label);
    let dialect = Dialect::new(DialectKind::RasMol, options);
    let q = transpile(&dialect, "ALA:A.CA").unwrap();
    assert_eq!(
        q.to_string(),
        "(atom-groups :atom-test (= label_atom_id \"CA\") \
         :residue-test (= label_comp_id \"ALA\") \
         :chain-test (= label_asym_id \"A\"))"
    );
}

#[test]
fn test_keywords() {
    assert_eq!(rasmol("all"), QueryExpression::all());
    assert_eq!(rasmol("none"), QueryExpression::none());
    assert_eq!(rasmol("helix"), rasmol("structure = helix"));
    assert_eq!(rasmol("sheet"), rasmol("structure beta"));
    assert_eq!(rasmol("Amino"), rasmol("protein"));
}

#[test]
fn test_structure_list_is_one_flag_test() {
    let q = rasmol("structure helix,sheet");
    assert_eq!(
        generator(&q).residue_test,
        Some(BooleanExpression::Leaf(Predicate::HasAnyFlag {
            property: Property::SecondaryStructureFlags,
            flags: SecondaryStructureFlags::HELIX | SecondaryStructureFlags::BETA,
        }))
    );

    let err = rasmol_err("structure > helix");
    assert_eq!(err.kind, ParseErrorKind::UnsupportedOperator(">".to_string()));
}

#[test]
fn test_atom_expression() {
    let q = rasmol("100^B:A.CA%B");
    assert_eq!(
        q.to_string(),
        "(atom-groups \
         :atom-test (and (= auth_atom_id \"CA\") (= label_alt_id \"B\")) \
         :residue-test (and (= auth_seq_id 100) (= pdbx_PDB_ins_code \"B\")) \
         :chain-test (= auth_asym_id \"A\"))"
    );

    let q = rasmol("10-20");
    assert_eq!(
        generator(&q).residue_test,
        Some(BooleanExpression::Leaf(Predicate::InRange {
            property: Property::AuthSeqId,
            low: Value::from(10),
            high: Value::from(20),
        }))
    );
}

#[test]
fn test_unsupported_operator() {
    let err = rasmol_err("resno => 5");
    assert_eq!(err.kind, ParseErrorKind::UnsupportedOperator("=>".to_string()));
    assert_eq!(err.position, 6);

    let err = rasmol_err("resno <> 5");
    assert_eq!(err.kind, ParseErrorKind::UnsupportedOperator("<>".to_string()));
}

#[test]
fn test_type_mismatch() {
    let err = rasmol_err("resno = ALA");
    assert!(matches!(err.kind, ParseErrorKind::TypeMismatch { .. }));

    let err = rasmol_err("1 < resno < 5");
    assert!(matches!(err.kind, ParseErrorKind::TypeMismatch { .. }));
}

#[test]
fn test_syntax_error_reports_furthest_position() {
    let err = rasmol_err(":A and (water or");
    assert_eq!(err.kind, ParseErrorKind::Syntax);
    assert_eq!(err.position, 16);
    assert!(!err.expected.is_empty());
}

#[test]
fn test_comparison_forms_a_single_generator() {
    let q = rasmol("temperature > 30.5");
    assert_eq!(
        q,
        QueryExpression::Generator(AtomGroups::from_predicates([Predicate::compare(
            CompareOp::Gt,
            Property::BIsoOrEquiv,
            30.5
        )]))
    );
}

#[test]
fn test_dialect_by_name() {
    let kind: DialectKind = "rasmol".parse().unwrap();
    assert_eq!(kind, DialectKind::RasMol);
    assert!("chimera".parse::<DialectKind>().is_err());
}
