mod common;

use common::{DOCS, HOME, home_store, join};
use fileexp_core::selection::Step;
use fileexp_core::{Modifiers, SortBy, SortOrder};
use pretty_assertions::assert_eq;

fn file(name: &str) -> String {
    join(HOME, name)
}

fn sorted_selection(tabs: &fileexp_core::TabStore) -> Vec<String> {
    let mut paths = tabs.current_state().unwrap().selected_paths;
    paths.sort();
    paths
}

#[tokio::test]
async fn shift_click_selects_interval_toward_anchor() {
    let (_, tabs) = home_store().await;

    tabs.handle_select(&file("c.txt"), Modifiers::NONE);
    tabs.handle_select(&file("a.txt"), Modifiers::SHIFT);

    assert_eq!(sorted_selection(&tabs), vec![file("a.txt"), file("b.txt"), file("c.txt")]);
    let state = tabs.current_state().unwrap();
    assert_eq!(state.last_selected_path, Some(file("c.txt")));
}

#[tokio::test]
async fn shift_range_follows_displayed_order() {
    let (_, tabs) = home_store().await;
    tabs.set_sort(SortBy::Name, SortOrder::Desc);

    tabs.handle_select(&file("d.txt"), Modifiers::NONE);
    tabs.handle_select(&file("b.txt"), Modifiers::SHIFT);
    assert_eq!(sorted_selection(&tabs), vec![file("b.txt"), file("c.txt"), file("d.txt")]);

    // Docs stays first even in descending order.
    tabs.handle_select(DOCS, Modifiers::SHIFT);
    assert_eq!(sorted_selection(&tabs), vec![DOCS.to_string(), file("d.txt"), file("e.txt")]);
}

#[tokio::test]
async fn ctrl_click_toggles() {
    let (_, tabs) = home_store().await;
    tabs.handle_select(&file("a.txt"), Modifiers::NONE);
    tabs.handle_select(&file("c.txt"), Modifiers::CTRL);
    assert_eq!(sorted_selection(&tabs), vec![file("a.txt"), file("c.txt")]);

    tabs.handle_select(&file("c.txt"), Modifiers::CTRL);
    assert_eq!(sorted_selection(&tabs), vec![file("a.txt")]);
    assert_eq!(tabs.current_state().unwrap().last_selected_path, Some(file("a.txt")));

    tabs.handle_select(&file("a.txt"), Modifiers::CTRL);
    let state = tabs.current_state().unwrap();
    assert!(state.selected_paths.is_empty());
    assert_eq!(state.last_selected_path, None);
}

#[tokio::test]
async fn reload_clears_selection() {
    let (_, tabs) = home_store().await;
    tabs.handle_select_all();
    assert_eq!(tabs.current_state().unwrap().selected_paths.len(), 6);

    tabs.refresh().await;
    let state = tabs.current_state().unwrap();
    assert!(state.selected_paths.is_empty());
    assert_eq!(state.last_selected_path, None);
}

#[tokio::test]
async fn select_all_anchors_on_last_displayed_entry() {
    let (_, tabs) = home_store().await;
    tabs.handle_select_all();
    let state = tabs.current_state().unwrap();
    assert_eq!(state.last_selected_path, Some(file("e.txt")));
    assert_eq!(state.selected_paths.first().map(String::as_str), Some(DOCS));
}

#[tokio::test]
async fn sorting_keeps_selection() {
    let (backend, tabs) = home_store().await;
    tabs.handle_select(&file("b.txt"), Modifiers::NONE);
    let reads = backend.calls_starting_with("read").len();

    assert_eq!(tabs.toggle_sort(SortBy::Name), Some((SortBy::Name, SortOrder::Desc)));
    assert_eq!(tabs.toggle_sort(SortBy::Size), Some((SortBy::Size, SortOrder::Asc)));

    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![file("b.txt")]);
    assert_eq!(backend.calls_starting_with("read").len(), reads);
}

#[tokio::test]
async fn keyboard_steps_through_display_order() {
    let (_, tabs) = home_store().await;

    tabs.step_selection(Step::Down, false);
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![DOCS.to_string()]);

    tabs.step_selection(Step::Down, true);
    tabs.step_selection(Step::Down, true);
    assert_eq!(
        tabs.current_state().unwrap().selected_paths,
        vec![DOCS.to_string(), file("a.txt"), file("b.txt")]
    );

    tabs.select_last();
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![file("e.txt")]);
    tabs.step_selection(Step::Down, false);
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![DOCS.to_string()]);

    tabs.select_first();
    tabs.step_selection(Step::Up, false);
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![file("e.txt")]);
}

#[tokio::test]
async fn prefix_selects_first_match() {
    let (_, tabs) = home_store().await;
    assert!(tabs.select_prefix("C"));
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![file("c.txt")]);
    assert!(tabs.select_prefix("do"));
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![DOCS.to_string()]);
    assert!(!tabs.select_prefix("zz"));
    assert_eq!(tabs.current_state().unwrap().selected_paths, vec![DOCS.to_string()]);
}

#[tokio::test]
async fn selected_entries_follow_selection_order() {
    let (_, tabs) = home_store().await;
    tabs.handle_select(&file("d.txt"), Modifiers::NONE);
    tabs.handle_select(&file("a.txt"), Modifiers::CTRL);

    let names: Vec<String> = tabs.selected_entries().into_iter().map(|entry| entry.name).collect();
    assert_eq!(names, vec!["d.txt", "a.txt"]);
}
