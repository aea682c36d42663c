use std::collections::BTreeSet;

use ap_core::{
  ancestors, build_search_index, depth, list_container_paths, path_of, prefixes, ExpansionState,
  JsonViewer, MatchNavigator, OpenContext, PathStep, SearchIndex, TreeCommand,
};
use serde_json::{json, Value};

fn sample() -> Value {
  json!({"user": {"name": "Ana", "age": 3}, "tags": ["x", "y"]})
}

fn set(items: &[&str]) -> BTreeSet<String> {
  items.iter().map(|s| s.to_string()).collect()
}

fn ctx<'a>(index: &'a SearchIndex, query_active: bool, active: Option<&'a str>) -> OpenContext<'a> {
  OpenContext {
    query_active,
    index,
    active_path: active,
    default_open_depth: 2,
  }
}

#[test]
fn path_of_joins_keys_and_indices() {
  let p = path_of(&[
    PathStep::Key("user".into()),
    PathStep::Index(0),
    PathStep::Key("name".into()),
  ]);
  assert_eq!(p, "root.user.[0].name");
  assert_eq!(path_of(&[]), "root");
  assert_eq!(depth("root"), 0);
  assert_eq!(depth("root.user.[0]"), 2);
  assert_eq!(prefixes("root.a.b"), vec!["root", "root.a", "root.a.b"]);
  assert_eq!(ancestors("root.a.b"), vec!["root", "root.a"]);
}

#[test]
fn container_paths_are_depth_first_in_entry_order() {
  let doc = json!({"b": {"c": [1, {"d": 2}]}, "a": [], "s": "x"});
  assert_eq!(
    list_container_paths(&doc),
    vec!["root", "root.b", "root.b.c", "root.b.c.[1]", "root.a"]
  );
  assert!(list_container_paths(&json!(42)).is_empty());
}

#[test]
fn value_substring_match_reveals_ancestors() {
  let idx = build_search_index(&sample(), "an");
  assert_eq!(idx.match_paths, vec!["root.user.name"]);
  assert_eq!(idx.match_set, set(&["root.user.name"]));
  assert_eq!(idx.auto_open_set, set(&["root", "root.user"]));
}

#[test]
fn key_prefix_match_on_container() {
  let idx = build_search_index(&sample(), "tag");
  assert_eq!(idx.match_paths, vec!["root.tags"]);
  assert_eq!(idx.auto_open_set, set(&["root"]));
}

#[test]
fn key_rule_is_starts_with_not_contains() {
  let doc = json!({"banana": 1, "Anatomy": 2});
  let idx = build_search_index(&doc, "ana");
  assert_eq!(idx.match_paths, vec!["root.Anatomy"]);
}

#[test]
fn blank_query_is_inactive() {
  assert_eq!(build_search_index(&sample(), "   "), SearchIndex::default());
  assert_eq!(build_search_index(&sample(), ""), SearchIndex::default());
}

#[test]
fn query_is_trimmed_and_case_folded() {
  let idx = build_search_index(&sample(), "  ANA ");
  assert_eq!(idx.match_paths, vec!["root.user.name"]);
}

#[test]
fn scalars_match_by_text_form() {
  let doc = json!({"flag": true, "n": null, "v": 12.5, "list": [false, 3]});
  assert_eq!(build_search_index(&doc, "true").match_paths, vec!["root.flag"]);
  assert_eq!(build_search_index(&doc, "nul").match_paths, vec!["root.n"]);
  assert_eq!(build_search_index(&doc, "2.5").match_paths, vec!["root.v"]);
  assert_eq!(build_search_index(&doc, "3").match_paths, vec!["root.list.[1]"]);
  assert_eq!(build_search_index(&json!("Hello"), "ell").match_paths, vec!["root"]);
}

#[test]
fn key_and_value_match_on_same_path_is_recorded_once() {
  let doc = json!({"id": "identity", "items": [{"id": 7}]});
  let idx = build_search_index(&doc, "id");
  assert_eq!(idx.match_paths, vec!["root.id", "root.items.[0].id"]);
  assert_eq!(idx.auto_open_set, set(&["root", "root.items", "root.items.[0]"]));
}

#[test]
fn match_paths_are_unique_deterministic_and_revealed() {
  let doc = json!({
    "alpha": {"alpine": "al", "beta": ["alright", {"al": "x"}]},
    "gamma": "metal"
  });
  let first = build_search_index(&doc, "al");
  for _ in 0..5 {
    assert_eq!(build_search_index(&doc, "al"), first);
  }
  let unique: BTreeSet<_> = first.match_paths.iter().cloned().collect();
  assert_eq!(unique.len(), first.match_paths.len());
  for p in &first.match_paths {
    assert!(first.match_set.contains(p));
    for a in ancestors(p) {
      assert!(first.auto_open_set.contains(&a), "{a} not revealed for {p}");
    }
  }
  assert_eq!(
    first.match_paths,
    vec![
      "root.alpha",
      "root.alpha.alpine",
      "root.alpha.beta.[0]",
      "root.alpha.beta.[1].al",
      "root.gamma",
    ]
  );
}

#[test]
fn default_depth_rule_without_query() {
  let idx = SearchIndex::default();
  let st = ExpansionState::new();
  let c = ctx(&idx, false, None);
  assert!(st.is_open("root", &c));
  assert!(st.is_open("root.user", &c));
  assert!(!st.is_open("root.user.address", &c));
}

#[test]
fn query_reveals_only_auto_open_and_active_prefixes() {
  let doc = json!({"a": {"b": {"c": "hit"}}, "z": {"y": 1}});
  let idx = build_search_index(&doc, "hit");
  let st = ExpansionState::new();
  let c = ctx(&idx, true, Some("root.a.b.c"));
  assert!(st.is_open("root", &c));
  assert!(st.is_open("root.a.b", &c));
  assert!(!st.is_open("root.z", &c));
}

#[test]
fn active_container_match_is_opened() {
  let doc = json!({"tags": ["x"]});
  let idx = build_search_index(&doc, "tag");
  let st = ExpansionState::new();
  assert!(!st.is_open("root.tags", &ctx(&idx, true, None)));
  assert!(st.is_open("root.tags", &ctx(&idx, true, Some("root.tags"))));
}

#[test]
fn toggle_twice_restores_state_and_keeps_sets_disjoint() {
  let idx = SearchIndex::default();
  let c = ctx(&idx, false, None);
  let mut st = ExpansionState::new();
  for path in ["root.user", "root.user.deep.er"] {
    let before = st.is_open(path, &c);
    assert_eq!(st.toggle(path, &c), !before);
    assert_eq!(st.is_open(path, &c), !before);
    st.toggle(path, &c);
    assert_eq!(st.is_open(path, &c), before);
    assert!(!(st.forced_open().contains(path) && st.forced_closed().contains(path)));
  }
}

#[test]
fn forced_open_wins_over_everything() {
  let idx = SearchIndex::default();
  let mut st = ExpansionState::new();
  let c = ctx(&idx, false, None);
  st.toggle("root.a.b.c", &c);
  assert!(st.is_open("root.a.b.c", &ctx(&idx, true, None)));
}

#[test]
fn expand_and_collapse_all() {
  let doc = json!({"a": {"b": {"c": [1, {"d": {}}]}}, "e": []});
  let containers = list_container_paths(&doc);
  let idx = SearchIndex::default();
  let c = ctx(&idx, false, None);
  let mut st = ExpansionState::new();

  st.apply(TreeCommand::CollapseAll, &containers);
  assert!(st.is_open("root", &c));
  for p in containers.iter().filter(|p| p.as_str() != "root") {
    assert!(!st.is_open(p, &c), "{p} should be closed");
  }

  st.apply(TreeCommand::ExpandAll, &containers);
  for p in &containers {
    assert!(st.is_open(p, &c), "{p} should be open");
  }
  assert!(st.forced_closed().is_empty());
}

#[test]
fn repeated_command_applies_again() {
  let doc = json!({"a": {"b": {}}});
  let containers = list_container_paths(&doc);
  let idx = SearchIndex::default();
  let c = ctx(&idx, false, None);
  let mut st = ExpansionState::new();

  st.apply(TreeCommand::ExpandAll, &containers);
  st.toggle("root.a", &c);
  assert!(!st.is_open("root.a", &c));
  let rev = st.revision();
  st.apply(TreeCommand::ExpandAll, &containers);
  assert!(st.revision() > rev);
  assert!(st.is_open("root.a", &c));
}

#[test]
fn snapshots_are_not_changed_by_later_mutation() {
  let idx = SearchIndex::default();
  let c = ctx(&idx, false, None);
  let mut st = ExpansionState::new();
  st.toggle("root", &c);
  let snap = st.forced_closed();
  st.toggle("root", &c);
  assert!(snap.contains("root"));
  assert!(!st.forced_closed().contains("root"));
}

#[test]
fn non_empty_query_clears_forced_closed_only() {
  let idx = SearchIndex::default();
  let c = ctx(&idx, false, None);
  let mut st = ExpansionState::new();
  st.toggle("root", &c); // open -> forced closed
  st.toggle("root.a.b.c", &c); // closed -> forced open
  st.on_query_changed(false);
  assert!(st.forced_closed().contains("root"));
  st.on_query_changed(true);
  assert!(st.forced_closed().is_empty());
  assert!(st.forced_open().contains("root.a.b.c"));
}

#[test]
fn navigator_wraps_both_ways() {
  let mut nav = MatchNavigator::new(vec!["a".into(), "b".into(), "c".into()]);
  nav.next();
  nav.next();
  assert_eq!(nav.active_index(), 2);
  nav.next();
  assert_eq!(nav.active_index(), 0);
  nav.prev();
  assert_eq!(nav.active_index(), 2);
  assert_eq!(nav.active_path(), Some("c"));
}

#[test]
fn navigator_clamps_when_list_shrinks() {
  let mut nav = MatchNavigator::new(vec!["a".into(), "b".into(), "c".into()]);
  nav.prev();
  nav.set_matches(vec!["a".into(), "b".into()]);
  assert_eq!(nav.active_index(), 1);
  nav.set_matches(vec![]);
  assert_eq!(nav.active_index(), 0);
  assert_eq!(nav.active_path(), None);
  nav.next();
  nav.prev();
  assert_eq!(nav.position().total, 0);
}

#[test]
fn viewer_renders_visible_nodes_with_match_flags() {
  let mut v = JsonViewer::new(2);
  v.set_document(Some(sample()));

  let paths: Vec<String> = v.render().into_iter().map(|n| n.path).collect();
  assert_eq!(
    paths,
    vec![
      "root",
      "root.user",
      "root.user.name",
      "root.user.age",
      "root.tags",
      "root.tags.[0]",
      "root.tags.[1]",
    ]
  );

  v.set_query("an");
  let nodes = v.render();
  let name = nodes.iter().find(|n| n.path == "root.user.name").unwrap();
  assert!(name.matched && name.active);
  assert_eq!(name.preview, "\"Ana\"");
  assert!(nodes.iter().all(|n| n.path != "root.tags.[0]"));
  let tags = nodes.iter().find(|n| n.path == "root.tags").unwrap();
  assert!(!tags.open && !tags.matched);
  assert_eq!(tags.preview, "[ 2 items ]");
  assert_eq!(tags.label, "tags");
}

#[test]
fn viewer_query_change_resets_cursor() {
  let doc = json!({"a": "x1", "b": "x2", "c": "x3"});
  let mut v = JsonViewer::new(2);
  v.set_document(Some(doc));
  v.set_query("x");
  assert_eq!(v.next_match(), Some("root.b"));
  assert_eq!(v.position().active_index, 1);
  v.set_query("x3");
  assert_eq!(v.position().active_index, 0);
  assert_eq!(v.position().total, 1);
  v.set_query("");
  assert_eq!(v.active_path(), None);
  assert_eq!(v.position().total, 0);
}

#[test]
fn viewer_without_document_renders_nothing() {
  let mut v = JsonViewer::new(2);
  v.set_query("anything");
  assert!(v.render().is_empty());
  assert_eq!(v.position().total, 0);
  v.apply(TreeCommand::ExpandAll);
  assert!(v.render().is_empty());
}

#[test]
fn new_document_drops_overrides_and_reruns_query() {
  let mut v = JsonViewer::new(2);
  v.set_document(Some(json!({"a": {"b": {"c": 1}}})));
  v.apply(TreeCommand::ExpandAll);
  assert!(v.is_open("root.a.b"));
  v.set_query("zzz");
  v.set_document(Some(json!({"zzz": 1})));
  assert!(v.expansion().forced_open().is_empty());
  assert_eq!(v.index().match_paths, vec!["root.zzz"]);
}
