//! Property tests for placeholder allocation.

use std::collections::HashSet;

use n1ql_compiler::mapping::{EntityMapping, PropertyMapping, ScalarKind};
use n1ql_compiler::query::CompileContext;
use n1ql_compiler::query::derived::{IgnoreCase, Part, PartTree, PartTreeCompiler};
use n1ql_compiler::query::derived::PartType;
use n1ql_compiler::query::params::{BoundValues, PlaceholderStyle};
use n1ql_compiler::query::value::Argument;
use proptest::prelude::*;
use regex::Regex;

fn person() -> EntityMapping {
    EntityMapping::new(
        "Person",
        vec![
            PropertyMapping::new("firstname", ScalarKind::String),
            PropertyMapping::new("age", ScalarKind::Number),
            PropertyMapping::new("active", ScalarKind::Boolean),
            PropertyMapping::new("address", ScalarKind::Object)
                .with_properties(vec![PropertyMapping::new("city", ScalarKind::String)]),
        ],
    )
}

/// A part together with the arguments it consumes.
fn part() -> impl Strategy<Value = (Part, Vec<Argument>)> {
    let text = "[a-zA-Z]{0,8}";
    prop_oneof![
        text.prop_map(|s| (Part::new(PartType::SimpleProperty, "firstname"), vec![s.into()])),
        any::<i32>().prop_map(|n| (Part::new(PartType::NegatingSimpleProperty, "age"), vec![n.into()])),
        any::<i32>().prop_map(|n| (Part::new(PartType::LessThan, "age"), vec![n.into()])),
        any::<i32>().prop_map(|n| (Part::new(PartType::GreaterThanEqual, "age"), vec![n.into()])),
        (any::<i32>(), any::<i32>())
            .prop_map(|(lo, hi)| (Part::new(PartType::Between, "age"), vec![lo.into(), hi.into()])),
        text.prop_map(|s| (
            Part::new(PartType::StartingWith, "address.city").with_ignore_case(IgnoreCase::Always),
            vec![s.into()]
        )),
        text.prop_map(|s| (Part::new(PartType::Containing, "firstname"), vec![s.into()])),
        prop::collection::vec(text, 0..5)
            .prop_map(|items| (Part::new(PartType::In, "firstname"), vec![Argument::collection(items)])),
        prop::collection::vec(any::<i32>(), 1..5)
            .prop_map(|items| (Part::new(PartType::NotIn, "age"), vec![Argument::collection(items)])),
        text.prop_map(|s| (Part::new(PartType::Regex, "firstname"), vec![s.into()])),
        Just((Part::new(PartType::True, "active"), Vec::new())),
        Just((Part::new(PartType::IsNull, "address.city"), Vec::new())),
        Just((Part::new(PartType::Exists, "firstname"), Vec::new())),
    ]
}

fn style() -> impl Strategy<Value = PlaceholderStyle> {
    prop_oneof![Just(PlaceholderStyle::Positional), Just(PlaceholderStyle::Named)]
}

fn build(groups: Vec<Vec<(Part, Vec<Argument>)>>) -> (PartTree, Vec<Argument>) {
    let mut tree = PartTree::default();
    let mut args = Vec::new();
    for group in groups {
        let mut parts = Vec::new();
        for (part, part_args) in group {
            parts.push(part);
            args.extend(part_args);
        }
        tree = tree.or(parts);
    }
    (tree, args)
}

proptest! {
    #[test]
    fn placeholder_count_matches_bound_values(
        groups in prop::collection::vec(prop::collection::vec(part(), 1..4), 1..4),
        style in style(),
    ) {
        let person = person();
        let (tree, args) = build(groups);
        let expected_args = args.len();
        prop_assert_eq!(tree.argument_count(), expected_args);

        let ctx = CompileContext::new("b", &person, &person).with_style(style);
        let compiled = PartTreeCompiler::new(&person, &person)
            .compile(&tree, args)
            .and_then(|query| query.compile(&ctx))
            .unwrap();

        prop_assert_eq!(compiled.param_count(), expected_args);
        match &compiled.params {
            BoundValues::Positional(values) => {
                let token = Regex::new(r"\$(\d+)").unwrap();
                let indices: Vec<usize> = token
                    .captures_iter(&compiled.statement)
                    .map(|c| c[1].parse().unwrap())
                    .collect();
                let max = indices.iter().copied().max().unwrap_or(0);
                prop_assert_eq!(max, values.len());
                prop_assert_eq!(indices.len(), values.len());
                prop_assert!(indices.iter().enumerate().all(|(i, n)| *n == i + 1));
            }
            BoundValues::Named(values) => {
                let token = Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").unwrap();
                let names: HashSet<String> = token
                    .captures_iter(&compiled.statement)
                    .map(|c| c[1].to_string())
                    .collect();
                prop_assert_eq!(names.len(), values.len());
                prop_assert!(names.iter().all(|name| values.contains_key(name)));
            }
        }
    }

    #[test]
    fn independent_compiles_are_identical(
        groups in prop::collection::vec(prop::collection::vec(part(), 1..3), 1..3),
    ) {
        let person = person();
        let (tree, args) = build(groups);
        let ctx = CompileContext::new("b", &person, &person);
        let compiler = PartTreeCompiler::new(&person, &person);

        let first = compiler.compile(&tree, args.clone()).and_then(|q| q.compile(&ctx)).unwrap();
        let second = compiler.compile(&tree, args).and_then(|q| q.compile(&ctx)).unwrap();
        prop_assert_eq!(first, second);
    }
}
