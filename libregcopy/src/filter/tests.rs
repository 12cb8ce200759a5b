use super::*;

fn catalog() -> Vec<String> {
    ["alpine", "team/api", "team/web", "Team/legacy", "tools/teamcity"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

#[test]
fn test_default_matches_everything() {
    let filter = IncludeFilter::default();
    assert_eq!(filter.filter(&catalog()), catalog());
    assert_eq!(filter.pattern(), MATCH_ALL);
}

#[test]
fn test_empty_pattern_matches_everything() {
    let filter = IncludeFilter::new("").unwrap();
    assert_eq!(filter.filter(&catalog()), catalog());
}

#[test]
fn test_match_is_unanchored() {
    let filter = IncludeFilter::new("team").unwrap();
    assert_eq!(
        filter.filter(&catalog()),
        vec!["team/api", "team/web", "tools/teamcity"]
    );
}

#[test]
fn test_match_is_case_sensitive() {
    let filter = IncludeFilter::new("^Team/").unwrap();
    assert_eq!(filter.filter(&catalog()), vec!["Team/legacy"]);
}

#[test]
fn test_anchored_pattern() {
    let filter = IncludeFilter::new("^team/(api|web)$").unwrap();
    assert_eq!(filter.filter(&catalog()), vec!["team/api", "team/web"]);
}

#[test]
fn test_filter_preserves_order_and_duplicates() {
    let names: Vec<String> = ["b", "a", "b"].iter().map(|s| s.to_string()).collect();
    let filter = IncludeFilter::new("a|b").unwrap();
    assert_eq!(filter.filter(&names), vec!["b", "a", "b"]);
}

#[test]
fn test_no_match_yields_empty() {
    let filter = IncludeFilter::new("^nothing$").unwrap();
    assert!(filter.filter(&catalog()).is_empty());
}

#[test]
fn test_invalid_pattern_is_validation_error() {
    let err = IncludeFilter::new("team/(api").unwrap_err();
    assert!(matches!(err, RegcopyError::Validation { .. }));
    assert!(err.to_string().contains("team/(api"));
}
