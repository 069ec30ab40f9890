use page_enhancer::{
    back_link, numeric_input, resubmit, Capabilities, NavigationKind, Page,
};

#[test]
fn back_link_goes_back_instead_of_navigating() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(
        "<a id='fwd' href='/second'>Continue</a>\
         <a id='back' class='govuk-back-link' href='#'>Back</a>",
    )?;
    page.click("#fwd")?;
    let start_url = page.url().to_string();
    back_link::attach(&mut page)?;

    page.click("#back")?;

    assert_eq!(page.navigations().len(), 2);
    let back = &page.navigations()[1];
    assert_eq!(back.kind, NavigationKind::Back);
    assert_eq!(back.from, start_url);
    assert_ne!(page.url(), start_url);
    Ok(())
}

#[test]
fn back_link_click_stops_propagating() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(
        "<div id='wrap'><a class='govuk-back-link' href='/ignored'>Back</a></div>",
    )?;
    back_link::attach(&mut page)?;
    page.enable_trace(true);
    page.set_trace_stderr(false);

    page.click(".govuk-back-link")?;

    let logs = page.take_trace_logs();
    assert!(logs
        .iter()
        .any(|line| line.contains("done click") && line.contains("outcome=propagation_stopped")));
    // The href default never ran.
    assert!(page
        .navigations()
        .iter()
        .all(|navigation| navigation.kind != NavigationKind::Assign));
    Ok(())
}

#[test]
fn pages_without_a_back_link_attach_cleanly() -> page_enhancer::Result<()> {
    let mut page = Page::from_html("<p>No link</p>")?;
    back_link::attach(&mut page)?;
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn resubmit_guard_replaces_the_current_entry_once() -> page_enhancer::Result<()> {
    let mut page = Page::from_html_with_url("https://forms.example.gov.uk/step-2", "<p>Form</p>")?;
    resubmit::attach(&mut page)?;

    assert_eq!(page.history_len(), 1);
    assert_eq!(page.url(), "https://forms.example.gov.uk/step-2");
    assert_eq!(page.navigations().len(), 1);
    let replace = &page.navigations()[0];
    assert_eq!(replace.kind, NavigationKind::Replace);
    assert_eq!(replace.from, replace.to);
    Ok(())
}

#[test]
fn resubmit_guard_is_a_no_op_without_the_capability() -> page_enhancer::Result<()> {
    let mut page = Page::from_html("<p>Form</p>")?;
    page.set_capabilities(Capabilities::legacy());
    resubmit::attach(&mut page)?;
    assert!(page.navigations().is_empty());
    Ok(())
}

const NUMERIC_FORM: &str = "
<form>
  <input id='amount' data-type='currency' value='1.50'>
  <input id='rate' data-type='percentage' value='10'>
  <input id='count' data-type='numeric' value='3'>
  <input id='free' value='note'>
  <input id='raw' type='number' value='2'>
</form>
";

#[test]
fn touch_devices_get_a_numeric_input_mode() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(NUMERIC_FORM)?;
    page.set_capabilities(Capabilities::touch_device());
    numeric_input::attach(&mut page)?;

    for selector in ["#amount", "#rate", "#count"] {
        assert_eq!(page.attr(selector, "type")?.as_deref(), Some("number"));
        assert_eq!(page.attr(selector, "step")?.as_deref(), Some("any"));
        assert_eq!(page.attr(selector, "min")?.as_deref(), Some("0"));
    }
    assert_eq!(page.attr("#free", "type")?, None);
    Ok(())
}

#[test]
fn desktop_and_trailing_zero_engines_keep_the_text_mode() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(NUMERIC_FORM)?;
    numeric_input::attach(&mut page)?;
    assert_eq!(page.attr("#amount", "type")?, None);

    let mut page = Page::from_html(NUMERIC_FORM)?;
    page.set_capabilities(Capabilities {
        strips_trailing_zeros: true,
        ..Capabilities::touch_device()
    });
    numeric_input::attach(&mut page)?;
    assert_eq!(page.attr("#amount", "type")?, None);
    Ok(())
}

#[test]
fn wheel_cannot_spin_a_focused_numeric_input() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(NUMERIC_FORM)?;
    page.set_capabilities(Capabilities::touch_device());
    numeric_input::attach(&mut page)?;

    page.focus("#amount")?;
    page.wheel("#amount", -120)?;
    page.assert_value("#amount", "1.50")?;
    assert_eq!(page.scroll_y(), 0);

    // Unfocused, the wheel keeps scrolling the page.
    page.blur("#amount")?;
    page.wheel("#amount", 80)?;
    page.assert_value("#amount", "1.50")?;
    assert_eq!(page.scroll_y(), 80);

    // The unenhanced control still spins.
    page.focus("#raw")?;
    page.wheel("#raw", -120)?;
    page.assert_value("#raw", "3")?;
    Ok(())
}

#[test]
fn arrow_keys_and_comma_are_suppressed_on_numeric_inputs() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(NUMERIC_FORM)?;
    page.set_capabilities(Capabilities::touch_device());
    numeric_input::attach(&mut page)?;

    page.press_key("#amount", "ArrowUp")?;
    page.press_key("#amount", "ArrowDown")?;
    page.press_key("#amount", ",")?;
    page.assert_value("#amount", "1.50")?;

    // Digits still type normally.
    page.press_key("#amount", "9")?;
    page.assert_value("#amount", "1.509")?;

    // The unenhanced control keeps the browser defaults.
    page.press_key("#raw", "ArrowUp")?;
    page.assert_value("#raw", "3")?;
    Ok(())
}

#[test]
fn suppression_applies_independently_of_device_type() -> page_enhancer::Result<()> {
    let mut page = Page::from_html(NUMERIC_FORM)?;
    numeric_input::attach(&mut page)?;

    page.press_key("#rate", ",")?;
    page.press_key("#rate", "ArrowUp")?;
    page.assert_value("#rate", "10")?;
    Ok(())
}
