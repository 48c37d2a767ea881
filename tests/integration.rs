// Integration tests for Mimizuku components
// These tests drive the knowledge base end to end across all crates


#[cfg(test)]
mod scenarios {
    use anyhow::Result;
    use mimizuku::prelude::*;
    use std::collections::BTreeSet;

    const EX: &str = "http://example.org/";

    fn n(local: &str) -> Name {
        Name::new(format!("{EX}{local}"))
    }

    fn c(local: &str) -> ClassExpression {
        ClassExpression::named(n(local))
    }

    fn knowledge_base(axioms: Vec<Axiom>) -> KnowledgeBase {
        init_tracing();
        let mut kb = KnowledgeBase::new(ReasonerConfig::default());
        kb.add_axioms(axioms);
        kb
    }

    #[test]
    fn test_subclass_classify_and_realize() -> Result<()> {
        let mut kb = knowledge_base(vec![
            Axiom::SubClassOf(c("A"), c("B")),
            Axiom::ClassAssertion(c("A"), n("i")),
        ]);

        assert!(kb.is_satisfiable(&c("A"))?);
        let taxonomy = kb.classify()?;
        assert!(taxonomy.supers(&n("A"), true).contains(&n("B")));
        assert_eq!(taxonomy.is_subsumed_by(&n("A"), &n("B")), Some(true));

        let instances = kb.realize()?;
        let types = instances.types(&n("i")).cloned().unwrap_or_default();
        assert!(types.contains(&n("B")));
        assert_eq!(instances.most_specific(&n("i")), Some(&BTreeSet::from([n("A")])));
        Ok(())
    }

    #[test]
    fn test_self_contradictory_class() -> Result<()> {
        let mut kb = knowledge_base(vec![Axiom::SubClassOf(c("A"), ClassExpression::not(c("A")))]);
        assert!(!kb.is_satisfiable(&c("A"))?);
        assert!(kb.is_consistent()?);
        assert!(kb.classify()?.is_equivalent(&n("A"), &Name::nothing()).unwrap_or(false));
        Ok(())
    }

    #[test]
    fn test_disjoint_classes_with_shared_member() -> Result<()> {
        let mut kb = knowledge_base(vec![
            Axiom::DisjointClasses(vec![c("C"), c("D")]),
            Axiom::ClassAssertion(c("C"), n("x")),
            Axiom::ClassAssertion(c("D"), n("x")),
        ]);
        assert!(!kb.is_consistent()?);
        Ok(())
    }

    #[test]
    fn test_min_cardinality_synthesizes_successor() -> Result<()> {
        let r = PropertyExpression::object(n("r"));
        let mut kb = knowledge_base(vec![
            Axiom::SubClassOf(c("E"), ClassExpression::min(1, r.clone(), None)),
            Axiom::ClassAssertion(c("E"), n("e")),
        ]);
        assert!(kb.is_consistent()?);
        assert!(kb.statistics().tableau.nodes_created > 0);
        assert!(kb.is_instance_of(&n("e"), &ClassExpression::some(r, ClassExpression::Thing))?);
        Ok(())
    }

    #[test]
    fn test_reclassification_matches_fresh_classification() -> Result<()> {
        let r = PropertyExpression::object(n("r"));
        let initial = vec![
            Axiom::SubClassOf(c("A"), c("B")),
            Axiom::SubClassOf(c("C"), c("B")),
            Axiom::EquivalentClasses(vec![c("D"), ClassExpression::some(r.clone(), c("A"))]),
            Axiom::SubClassOf(c("F"), ClassExpression::some(r, c("C"))),
        ];
        let mut kb = knowledge_base(initial.clone());
        kb.classify()?;

        let edge = Axiom::SubClassOf(c("C"), c("A"));
        kb.add_axiom(edge.clone());
        let incremental = kb.classify()?.flatten();

        let mut fresh = knowledge_base(initial);
        fresh.add_axiom(edge);
        assert_eq!(incremental, fresh.classify()?.flatten());
        assert!(fresh.is_subclass_of(&c("F"), &c("D"))?);
        Ok(())
    }

    #[test]
    fn test_complex_left_hand_sides_reach_the_taxonomy() -> Result<()> {
        let mut kb = knowledge_base(vec![
            Axiom::SubClassOf(ClassExpression::UnionOf(vec![c("C"), c("A")]), c("A")),
            Axiom::SubClassOf(
                ClassExpression::IntersectionOf(vec![c("D"), ClassExpression::not(c("B"))]),
                ClassExpression::IntersectionOf(vec![c("E"), ClassExpression::not(c("D"))]),
            ),
        ]);
        let taxonomy = kb.classify()?;
        assert_eq!(taxonomy.is_subsumed_by(&n("C"), &n("A")), Some(true));
        assert_eq!(taxonomy.is_subsumed_by(&n("D"), &n("B")), Some(true));
        assert_eq!(taxonomy.is_subsumed_by(&n("D"), &n("E")), Some(false));
        Ok(())
    }

    #[test]
    fn test_role_hierarchy_and_transitivity() -> Result<()> {
        let part_of = PropertyExpression::object(n("partOf"));
        let component_of = PropertyExpression::object(n("componentOf"));
        let mut kb = knowledge_base(vec![
            Axiom::SubPropertyOf(component_of.clone(), part_of.clone()),
            Axiom::TransitiveProperty(part_of.clone()),
            Axiom::EquivalentClasses(vec![
                c("CarPart"),
                ClassExpression::some(part_of.clone(), c("Car")),
            ]),
            Axiom::SubClassOf(c("Wheel"), ClassExpression::some(component_of, c("Axle"))),
            Axiom::SubClassOf(c("Axle"), ClassExpression::some(part_of, c("Car"))),
        ]);
        assert!(kb.is_subclass_of(&c("Wheel"), &c("CarPart"))?);
        assert!(kb.classify()?.supers(&n("Wheel"), false).contains(&n("CarPart")));
        Ok(())
    }

    #[test]
    fn test_nominals_and_functional_roles() -> Result<()> {
        let has_mother = PropertyExpression::object(n("hasMother"));
        let mut kb = knowledge_base(vec![
            Axiom::FunctionalProperty(has_mother.clone()),
            Axiom::ObjectPropertyAssertion(has_mother.clone(), n("ann"), n("mary")),
            Axiom::ObjectPropertyAssertion(has_mother, n("ann"), n("maria")),
            Axiom::ClassAssertion(c("Teacher"), n("mary")),
        ]);
        assert!(kb.is_consistent()?);
        assert!(kb.is_instance_of(&n("maria"), &c("Teacher"))?);

        kb.add_axiom(Axiom::DifferentIndividuals(vec![n("mary"), n("maria")]));
        assert!(!kb.is_consistent()?);
        Ok(())
    }

    #[test]
    fn test_disjunction_requires_backtracking() -> Result<()> {
        let mut kb = knowledge_base(vec![
            Axiom::SubClassOf(c("Pet"), ClassExpression::UnionOf(vec![c("Cat"), c("Dog")])),
            Axiom::DisjointClasses(vec![c("Cat"), c("Dog")]),
            Axiom::ClassAssertion(c("Pet"), n("pochi")),
            Axiom::ClassAssertion(ClassExpression::not(c("Cat")), n("pochi")),
        ]);
        assert!(kb.is_consistent()?);
        assert!(kb.is_instance_of(&n("pochi"), &c("Dog"))?);

        kb.add_axiom(Axiom::ClassAssertion(ClassExpression::not(c("Dog")), n("pochi")));
        assert!(!kb.is_consistent()?);
        Ok(())
    }

    #[test]
    fn test_invalid_literal_policy() -> Result<()> {
        let age = n("age");
        let axioms = vec![Axiom::DataPropertyAssertion(
            age,
            n("bob"),
            Literal::typed("forty", Name::new("http://www.w3.org/2001/XMLSchema#integer")),
        )];

        let mut strict = knowledge_base(axioms.clone());
        assert!(!strict.is_consistent()?);

        let config = ReasonerConfig {
            invalid_literal_policy: InvalidLiteralPolicy::Ignore,
            ..ReasonerConfig::default()
        };
        let mut lenient = KnowledgeBase::new(config);
        lenient.add_axioms(axioms);
        assert!(lenient.is_consistent()?);
        Ok(())
    }

    #[test]
    fn test_data_restrictions_in_queries_only() -> Result<()> {
        let xsd = |local: &str| Name::new(format!("http://www.w3.org/2001/XMLSchema#{local}"));
        let some_integer = ClassExpression::DataSomeValuesFrom {
            property: n("age"),
            range: mimizuku::DataRange::Datatype(xsd("integer")),
        };
        let only_strings = ClassExpression::DataAllValuesFrom {
            property: n("age"),
            range: mimizuku::DataRange::Datatype(xsd("string")),
        };
        let mut kb = knowledge_base(vec![Axiom::SubClassOf(c("A"), c("B"))]);
        assert!(!kb.is_satisfiable(&ClassExpression::IntersectionOf(vec![some_integer.clone(), only_strings]))?);
        assert!(kb.is_satisfiable(&some_integer)?);
        Ok(())
    }

    #[test]
    fn test_timeout_is_reported_as_error() -> Result<()> {
        let config = ReasonerConfig::default().with_timeout(std::time::Duration::ZERO);
        let mut kb = KnowledgeBase::new(config);
        kb.add_axiom(Axiom::ClassAssertion(c("A"), n("i")));
        let err = kb.is_consistent().unwrap_err();
        assert!(matches!(err, ReasonerError::Timeout { .. }));
        Ok(())
    }

    #[test]
    fn test_config_file_round_trip() -> Result<()> {
        let path = std::env::temp_dir().join(format!("mimizuku-integration-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"use_el_classifier": false, "blocking": "pairwise"}"#)?;
        let config = ReasonerConfig::from_file(&path)?;
        std::fs::remove_file(&path)?;

        assert_eq!(config.blocking, BlockingPolicy::Pairwise);
        let mut kb = KnowledgeBase::new(config);
        kb.add_axiom(Axiom::SubClassOf(c("A"), c("B")));
        kb.classify()?;
        assert!(kb.statistics().el_classification.is_none());
        Ok(())
    }
}
