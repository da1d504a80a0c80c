//! Method-name decoding: `findDistinctTop3ByLastnameAndAgeBetweenOrderByAgeDesc`.

use regex::Regex;
use std::sync::LazyLock;
use tracing::trace;

use super::{IgnoreCase, Part, PartTree, PartType};
use crate::error::CompileError;
use crate::query::statement::{Direction, Order, Projection};

const PREFIXES: &str = "find|read|get|query|search|stream|count|exists|delete|remove";

/// Prefix, optional subject, then `By`.
static PREFIX_TEMPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({})(\p{{Lu}}.*?)??By", PREFIXES)).unwrap());

/// Prefix and subject without any criteria: `findAll`, `count`.
static SUBJECT_ONLY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^({})(\p{{Lu}}\w*)?$", PREFIXES)).unwrap());

/// `First`/`Top` with an optional count, leading the subject.
static LIMITING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:Distinct)?(?:First|Top)(\d*)(?:\p{Lu}|$)").unwrap());

static DISTINCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(?:First|Top)\d*)?Distinct(?:\p{Lu}|$)").unwrap());

static ALL_IGNORE_CASE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"AllIgnor(?:e|ing)Case").unwrap());

const ORDER_BY: &str = "OrderBy";
const IGNORE_CASE: [&str; 2] = ["IgnoreCase", "IgnoringCase"];

impl PartTree {
    /// Decode a repository method name.
    pub fn parse(method: &str) -> Result<PartTree, CompileError> {
        let (prefix, subject, predicate) = if let Some(caps) = PREFIX_TEMPLATE.captures(method) {
            let end = caps.get(0).map_or(0, |m| m.end());
            (
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
                &method[end..],
            )
        } else if let Some(caps) = SUBJECT_ONLY.captures(method) {
            (
                caps.get(1).map_or("", |m| m.as_str()),
                caps.get(2).map_or("", |m| m.as_str()),
                "",
            )
        } else {
            return Err(CompileError::illegal(format!(
                "method name '{}' does not start with a supported prefix",
                method
            )));
        };

        let mut tree = PartTree {
            projection: match prefix {
                "count" => Projection::Count,
                "exists" => Projection::Exists,
                "delete" | "remove" => Projection::Delete,
                _ => Projection::Entity,
            },
            distinct: DISTINCT.is_match(subject),
            max_results: parse_limit(subject)?,
            ..PartTree::default()
        };

        let all_ignore_case = ALL_IGNORE_CASE.is_match(predicate);
        let predicate = ALL_IGNORE_CASE.replace(predicate, "");
        let predicate: &str = &predicate;

        let (criteria, order) = match predicate.find(ORDER_BY) {
            Some(idx) => (&predicate[..idx], Some(&predicate[idx + ORDER_BY.len()..])),
            None => (predicate, None),
        };

        if criteria.is_empty() && order.is_none() && method.len() > prefix.len() + subject.len() {
            return Err(CompileError::illegal(format!(
                "method name '{}' has no criteria after 'By'",
                method
            )));
        }

        if !criteria.is_empty() {
            for group in split_keyword(criteria, "Or") {
                let parts = split_keyword(group, "And")
                    .into_iter()
                    .map(|part| parse_part(part, all_ignore_case))
                    .collect::<Result<Vec<_>, _>>()?;
                tree.or_groups.push(parts);
            }
        }

        if let Some(order) = order {
            tree.sort = parse_orders(order)?;
        }

        trace!(method, parts = tree.parts().count(), "parsed method name");
        Ok(tree)
    }
}

fn parse_limit(subject: &str) -> Result<Option<u64>, CompileError> {
    match LIMITING.captures(subject) {
        Some(caps) => match caps.get(1).map_or("", |m| m.as_str()) {
            "" => Ok(Some(1)),
            digits => digits
                .parse::<u64>()
                .map(Some)
                .map_err(|e| CompileError::illegal(format!("invalid result limit: {}", e))),
        },
        None => Ok(None),
    }
}

/// Split on `keyword` where it is followed by an upper-case letter.
fn split_keyword<'s>(source: &'s str, keyword: &str) -> Vec<&'s str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in source.match_indices(keyword) {
        if idx <= start {
            continue;
        }
        let followed_by_upper = source[idx + keyword.len()..]
            .chars()
            .next()
            .is_some_and(char::is_uppercase);
        if followed_by_upper {
            pieces.push(&source[start..idx]);
            start = idx + keyword.len();
        }
    }
    pieces.push(&source[start..]);
    pieces
}

fn parse_part(source: &str, all_ignore_case: bool) -> Result<Part, CompileError> {
    let (source, ignore_case) = match IGNORE_CASE
        .iter()
        .find_map(|suffix| source.strip_suffix(suffix))
    {
        Some(stripped) => (stripped, IgnoreCase::Always),
        None if all_ignore_case => (source, IgnoreCase::WhenPossible),
        None => (source, IgnoreCase::Never),
    };

    let (kind, property) = detect_type(source);
    Ok(Part {
        kind,
        property: property_path(property)?,
        ignore_case,
    })
}

fn detect_type(source: &str) -> (PartType, &str) {
    for kind in PartType::ALL {
        for keyword in kind.keywords() {
            if let Some(property) = source.strip_suffix(keyword) {
                if !property.is_empty() {
                    return (kind, property);
                }
            }
        }
    }
    (PartType::SimpleProperty, source)
}

/// `Address_ZipCode` -> `address.zipCode`
fn property_path(source: &str) -> Result<String, CompileError> {
    let segments = source
        .split('_')
        .map(|segment| {
            if segment.is_empty() {
                Err(CompileError::illegal(format!(
                    "invalid property reference '{}'",
                    source
                )))
            } else {
                Ok(decapitalize(segment))
            }
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(segments.join("."))
}

/// Lower-case the first letter unless the name starts with an acronym.
fn decapitalize(name: &str) -> String {
    let mut chars = name.chars();
    match (chars.next(), chars.next()) {
        (Some(first), Some(second)) if first.is_uppercase() && second.is_uppercase() => {
            name.to_string()
        }
        (Some(first), _) => first.to_lowercase().chain(name.chars().skip(1)).collect(),
        (None, _) => String::new(),
    }
}

/// `AgeDescLastnameAsc` -> `[age DESC, lastname ASC]`; direction defaults to ascending.
fn parse_orders(source: &str) -> Result<Vec<Order>, CompileError> {
    let mut orders = Vec::new();
    let mut start = 0;
    let mut idx = 0;

    while idx < source.len() {
        let rest = &source[idx..];
        let matched = [("Asc", Direction::Asc), ("Desc", Direction::Desc)]
            .into_iter()
            .find(|(keyword, _)| {
                rest.starts_with(keyword)
                    && rest[keyword.len()..]
                        .chars()
                        .next()
                        .is_none_or(char::is_uppercase)
            });

        match matched {
            Some((keyword, direction)) if idx > start => {
                orders.push(Order {
                    property: property_path(&source[start..idx])?,
                    direction,
                    ignore_case: false,
                });
                idx += keyword.len();
                start = idx;
            }
            _ => idx += rest.chars().next().map_or(1, char::len_utf8),
        }
    }

    if start < source.len() {
        orders.push(Order {
            property: property_path(&source[start..])?,
            direction: Direction::Asc,
            ignore_case: false,
        });
    }

    if orders.is_empty() {
        return Err(CompileError::illegal("'OrderBy' must name at least one property"));
    }
    Ok(orders)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn parts(method: &str) -> Vec<Vec<Part>> {
        PartTree::parse(method).unwrap().or_groups
    }

    #[test]
    fn test_simple_and() {
        assert_eq!(
            parts("findByFirstnameAndLastname"),
            vec![vec![
                Part::new(PartType::SimpleProperty, "firstname"),
                Part::new(PartType::SimpleProperty, "lastname"),
            ]]
        );
    }

    #[test]
    fn test_or_groups() {
        assert_eq!(
            parts("findByFirstnameOrAgeLessThanAndActiveIsTrue"),
            vec![
                vec![Part::new(PartType::SimpleProperty, "firstname")],
                vec![
                    Part::new(PartType::LessThan, "age"),
                    Part::new(PartType::True, "active"),
                ],
            ]
        );
    }

    #[rstest]
    #[case("findByAgeIs", PartType::SimpleProperty, "age")]
    #[case("findByAgeEquals", PartType::SimpleProperty, "age")]
    #[case("findByAgeIsNot", PartType::NegatingSimpleProperty, "age")]
    #[case("findByAgeNot", PartType::NegatingSimpleProperty, "age")]
    #[case("findByAgeLessThan", PartType::LessThan, "age")]
    #[case("findByAgeIsLessThanEqual", PartType::LessThanEqual, "age")]
    #[case("findByAgeGreaterThan", PartType::GreaterThan, "age")]
    #[case("findByAgeGreaterThanEqual", PartType::GreaterThanEqual, "age")]
    #[case("findByBirthdayBefore", PartType::Before, "birthday")]
    #[case("findByBirthdayIsAfter", PartType::After, "birthday")]
    #[case("findByAgeBetween", PartType::Between, "age")]
    #[case("findByNameIsNull", PartType::IsNull, "name")]
    #[case("findByNameNotNull", PartType::IsNotNull, "name")]
    #[case("findByNameLike", PartType::Like, "name")]
    #[case("findByNameIsNotLike", PartType::NotLike, "name")]
    #[case("findByNameStartsWith", PartType::StartingWith, "name")]
    #[case("findByNameEndingWith", PartType::EndingWith, "name")]
    #[case("findByNameContains", PartType::Containing, "name")]
    #[case("findByNameNotContaining", PartType::NotContaining, "name")]
    #[case("findByNameIn", PartType::In, "name")]
    #[case("findByNameIsNotIn", PartType::NotIn, "name")]
    #[case("findByActiveTrue", PartType::True, "active")]
    #[case("findByActiveIsFalse", PartType::False, "active")]
    #[case("findByNameMatchesRegex", PartType::Regex, "name")]
    #[case("findByNameExists", PartType::Exists, "name")]
    #[case("findByLocationNear", PartType::Near, "location")]
    #[case("findByTagsIsEmpty", PartType::IsEmpty, "tags")]
    #[case("findByTagsNotEmpty", PartType::IsNotEmpty, "tags")]
    fn test_keywords(#[case] method: &str, #[case] kind: PartType, #[case] property: &str) {
        assert_eq!(parts(method), vec![vec![Part::new(kind, property)]]);
    }

    #[test]
    fn test_ignore_case_per_part_and_all() {
        let groups = parts("findByFirstnameIgnoreCaseAndAge");
        assert_eq!(groups[0][0].ignore_case, IgnoreCase::Always);
        assert_eq!(groups[0][1].ignore_case, IgnoreCase::Never);

        let groups = parts("findByFirstnameAndAgeAllIgnoreCase");
        assert!(groups[0].iter().all(|p| p.ignore_case == IgnoreCase::WhenPossible));
    }

    #[rstest]
    #[case("findByFirstnameAllIgnoreCaseOrderByAgeDesc")]
    #[case("findByFirstnameAllIgnoringCaseOrderByAgeDesc")]
    fn test_all_ignore_case_before_order_by(#[case] method: &str) {
        let tree = PartTree::parse(method).unwrap();
        assert_eq!(
            tree.or_groups,
            vec![vec![
                Part::new(PartType::SimpleProperty, "firstname")
                    .with_ignore_case(IgnoreCase::WhenPossible)
            ]]
        );
        assert_eq!(tree.sort, vec![Order::desc("age")]);
    }

    #[test]
    fn test_nested_property() {
        assert_eq!(
            parts("findByAddress_ZipCodeStartingWith"),
            vec![vec![Part::new(PartType::StartingWith, "address.zipCode")]]
        );
    }

    #[test]
    fn test_acronym_property_keeps_case() {
        assert_eq!(parts("findByURL")[0][0].property, "URL");
    }

    #[test]
    fn test_subject_and_sort() {
        let tree =
            PartTree::parse("findDistinctTop3ByLastnameAndAgeBetweenOrderByAgeDescFirstname")
                .unwrap();
        assert!(tree.distinct);
        assert_eq!(tree.max_results, Some(3));
        assert_eq!(tree.projection, Projection::Entity);
        assert_eq!(tree.argument_count(), 3);
        assert_eq!(tree.sort, vec![Order::desc("age"), Order::asc("firstname")]);
    }

    #[rstest]
    #[case("findFirstByName", Some(1))]
    #[case("findTop10ByName", Some(10))]
    #[case("findByName", None)]
    fn test_limits(#[case] method: &str, #[case] expected: Option<u64>) {
        assert_eq!(PartTree::parse(method).unwrap().max_results, expected);
    }

    #[rstest]
    #[case("findFirstnameByAge")]
    #[case("findTopicsByAge")]
    #[case("findPeopleWithFirstByAge")]
    #[case("findDistinctiveByAge")]
    fn test_subject_words_are_not_modifiers(#[case] method: &str) {
        let tree = PartTree::parse(method).unwrap();
        assert_eq!(tree.max_results, None);
        assert!(!tree.distinct);
    }

    #[rstest]
    #[case("findTop3DistinctByName", true, Some(3))]
    #[case("findDistinctFirstByName", true, Some(1))]
    #[case("findDistinctPeopleByName", true, None)]
    fn test_subject_modifiers(
        #[case] method: &str,
        #[case] distinct: bool,
        #[case] limit: Option<u64>,
    ) {
        let tree = PartTree::parse(method).unwrap();
        assert_eq!(tree.distinct, distinct);
        assert_eq!(tree.max_results, limit);
    }

    #[rstest]
    #[case("countByName", Projection::Count)]
    #[case("existsByName", Projection::Exists)]
    #[case("deleteByName", Projection::Delete)]
    #[case("removeByName", Projection::Delete)]
    #[case("streamByName", Projection::Entity)]
    fn test_projection_prefixes(#[case] method: &str, #[case] expected: Projection) {
        assert_eq!(PartTree::parse(method).unwrap().projection, expected);
    }

    #[test]
    fn test_subject_only() {
        let tree = PartTree::parse("findAll").unwrap();
        assert!(tree.or_groups.is_empty());
        let tree = PartTree::parse("count").unwrap();
        assert_eq!(tree.projection, Projection::Count);
    }

    #[test]
    fn test_sort_only() {
        let tree = PartTree::parse("findAllByOrderByLastnameAsc").unwrap();
        assert!(tree.or_groups.is_empty());
        assert_eq!(tree.sort, vec![Order::asc("lastname")]);
    }

    #[test]
    fn test_keyword_inside_property_is_not_split() {
        assert_eq!(
            parts("findByOrderNumberAndBrandName"),
            vec![vec![
                Part::new(PartType::SimpleProperty, "orderNumber"),
                Part::new(PartType::SimpleProperty, "brandName"),
            ]]
        );
    }

    #[rstest]
    #[case("fetchByName")]
    #[case("findBy")]
    #[case("findByOrderBy")]
    #[case("findByName_")]
    fn test_malformed(#[case] method: &str) {
        assert!(matches!(
            PartTree::parse(method),
            Err(CompileError::IllegalArgument { .. })
        ));
    }
}
