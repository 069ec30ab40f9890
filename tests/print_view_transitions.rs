use page_enhancer::{print_view, Capabilities, Page};

const TWO_CLOSED_DETAILS: &str = "
<main>
  <input id='field' value='x'>
  <details id='d1'><summary id='s1'>Scheme details</summary><p>First body</p></details>
  <details id='d2'><summary id='s2'>Charges</summary><p>Second body</p></details>
</main>
";

fn enhanced_page(html: &str) -> page_enhancer::Result<Page> {
    let mut page = Page::from_html(html)?;
    print_view::attach(&mut page)?;
    Ok(page)
}

#[test]
fn enter_opens_everything_and_leave_closes_it_again() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.begin_print()?;
    assert!(page.attr("#d1", "open")?.is_some());
    assert!(page.attr("#d2", "open")?.is_some());
    assert!(page.has_class("#d1", "print-open")?);
    assert!(page.has_class("#s1", "print-heading")?);
    assert!(page.has_class("#s2", "print-heading")?);

    page.end_print()?;
    assert_eq!(page.attr("#d1", "open")?, None);
    assert_eq!(page.attr("#d2", "open")?, None);
    assert!(!page.has_class("#d1", "print-open")?);
    assert!(!page.has_class("#s1", "print-heading")?);
    assert!(!page.has_class("#s2", "print-heading")?);
    Ok(())
}

#[test]
fn elements_open_before_print_are_never_toggled() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(
        "<details id='user' open><summary id='us'>Kept open</summary></details>\
         <details id='closed'><summary>Expanded for print</summary></details>",
    )?;

    page.begin_print()?;
    assert!(page.attr("#user", "open")?.is_some());
    // Only the coordinator-opened element carries the marker.
    assert!(!page.has_class("#user", "print-open")?);
    assert!(!page.has_class("#us", "print-heading")?);
    assert!(page.has_class("#closed", "print-open")?);

    page.end_print()?;
    assert!(page.attr("#user", "open")?.is_some());
    assert_eq!(page.attr("#closed", "open")?, None);
    Ok(())
}

#[test]
fn duplicate_enter_signals_do_not_double_toggle() -> page_enhancer::Result<()> {
    // The default capability profile already delivers each transition twice
    // (media query plus legacy window callback).
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.begin_print()?;
    page.begin_print()?;
    assert!(page.attr("#d1", "open")?.is_some());
    assert!(page.attr("#d2", "open")?.is_some());

    page.end_print()?;
    assert_eq!(page.attr("#d1", "open")?, None);
    assert_eq!(page.attr("#d2", "open")?, None);
    Ok(())
}

#[test]
fn leave_twice_is_a_no_op_after_the_first() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.begin_print()?;
    page.end_print()?;
    page.end_print()?;
    assert_eq!(page.attr("#d1", "open")?, None);
    assert_eq!(page.attr("#d2", "open")?, None);
    assert!(!page.has_class("#d1", "print-open")?);
    Ok(())
}

#[test]
fn focus_survives_both_transitions() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.focus("#field")?;
    page.begin_print()?;
    assert_eq!(page.active_element_id().as_deref(), Some("field"));

    // Focus moved between the transitions; leave restores its own snapshot.
    page.focus("#s1")?;
    page.end_print()?;
    assert_eq!(page.active_element_id().as_deref(), Some("s1"));
    Ok(())
}

#[test]
fn toggling_leaves_no_focus_behind_when_nothing_was_focused() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.begin_print()?;
    assert_eq!(page.active_element_id(), None);
    page.end_print()?;
    assert_eq!(page.active_element_id(), None);
    Ok(())
}

#[test]
fn scroll_position_is_restored_even_without_disclosures() -> page_enhancer::Result<()> {
    let mut page = enhanced_page("<main><p>No details here</p></main>")?;

    page.scroll_to(640);
    page.begin_print()?;
    assert_eq!(page.scroll_y(), 640);
    page.end_print()?;
    assert_eq!(page.scroll_y(), 640);
    Ok(())
}

#[test]
fn scroll_position_is_restored_across_toggles() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;

    page.scroll_to(1200);
    page.print()?;
    assert_eq!(page.scroll_y(), 1200);
    Ok(())
}

#[test]
fn fallback_layout_forces_attributes_instead_of_toggling() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(
        "<div class='no-details'>\
           <details id='d'><summary id='s'>More</summary><p>Body</p></details>\
         </div>",
    )?;

    page.begin_print()?;
    assert_eq!(page.attr("#d", "open")?.as_deref(), Some("open"));
    assert!(page.has_class("#d", "print-open")?);
    assert!(page.has_class("#s", "print-heading")?);
    // Forced attributes never go through the toggle control, so nothing
    // gains focus.
    assert_eq!(page.active_element_id(), None);

    page.end_print()?;
    assert_eq!(page.attr("#d", "open")?, None);
    assert!(!page.has_class("#d", "print-open")?);
    assert!(!page.has_class("#s", "print-heading")?);
    Ok(())
}

#[test]
fn legacy_engines_get_identical_behavior_from_window_callbacks() -> page_enhancer::Result<()> {
    let mut page = enhanced_page(TWO_CLOSED_DETAILS)?;
    page.set_capabilities(Capabilities::legacy());

    page.focus("#field")?;
    page.scroll_to(300);
    page.begin_print()?;
    assert!(page.attr("#d1", "open")?.is_some());
    assert_eq!(page.active_element_id().as_deref(), Some("field"));
    assert_eq!(page.scroll_y(), 300);

    page.end_print()?;
    assert_eq!(page.attr("#d1", "open")?, None);
    Ok(())
}

#[test]
fn summary_without_details_body_is_skipped_quietly() -> page_enhancer::Result<()> {
    // A details element with no summary child has no toggle control.
    let mut page = enhanced_page("<details id='bare'><p>Body only</p></details>")?;

    page.begin_print()?;
    assert_eq!(page.attr("#bare", "open")?, None);
    assert!(!page.has_class("#bare", "print-open")?);
    page.end_print()?;
    Ok(())
}
