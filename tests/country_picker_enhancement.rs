use page_enhancer::{country_picker, Page};

const COUNTRY_FORM: &str = "
<form id='f' action='/registered-country'>
  <select id='country' name='country'>
    <option value=''>Select a country</option>
    <option value='FR'>France</option>
    <option value='FI'>Finland</option>
    <option value='CI'>Côte d’Ivoire</option>
    <option value='DE' selected>Germany</option>
  </select>
  <button id='send' type='submit'>Continue</button>
</form>
";

fn enhanced_page() -> page_enhancer::Result<Page> {
    let mut page = Page::from_html(COUNTRY_FORM)?;
    country_picker::attach(&mut page)?;
    Ok(page)
}

#[test]
fn select_is_replaced_by_an_empty_combobox() -> page_enhancer::Result<()> {
    let page = enhanced_page()?;

    page.assert_exists("input#country[role=combobox]")?;
    page.assert_exists("ul#country__listbox[role=listbox]")?;
    page.assert_value("#country", "")?;

    // The backing select is hidden but keeps its pre-selected value until
    // the user starts searching.
    assert_eq!(
        page.attr("#country-select", "aria-hidden")?.as_deref(),
        Some("true")
    );
    page.assert_value("#country-select", "DE")?;
    Ok(())
}

#[test]
fn typing_filters_suggestions() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "f")?;
    assert_eq!(page.attr("#country", "aria-expanded")?.as_deref(), Some("true"));
    page.assert_text("#country__option--0", "France")?;
    page.assert_text("#country__option--1", "Finland")?;

    page.type_text("#country", "fra")?;
    page.assert_text("#country__option--0", "France")?;
    assert!(page.assert_exists("#country__option--1").is_err());
    Ok(())
}

#[test]
fn any_key_other_than_enter_or_tab_clears_the_backing_select() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "Fra")?;
    page.assert_value("#country-select", "DE")?;

    page.press_key("#country", "n")?;
    page.assert_value("#country", "Fran")?;
    page.assert_value("#country-select", "")?;
    Ok(())
}

#[test]
fn enter_confirms_the_single_match_without_submitting() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "fra")?;
    page.press_key("#country", "Enter")?;

    page.assert_value("#country", "France")?;
    page.assert_value("#country-select", "FR")?;
    assert_eq!(page.attr("#country", "aria-expanded")?.as_deref(), Some("false"));
    assert!(page.navigations().is_empty());
    Ok(())
}

#[test]
fn tab_confirms_like_enter() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "fin")?;
    page.press_key("#country", "Tab")?;

    page.assert_value("#country", "Finland")?;
    page.assert_value("#country-select", "FI")?;
    Ok(())
}

#[test]
fn arrow_keys_walk_the_suggestions_and_enter_takes_the_highlight() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "f")?;
    page.press_key("#country", "ArrowDown")?;
    assert!(page.has_class("#country__option--0", "autocomplete__option--focused")?);
    assert_eq!(
        page.attr("#country", "aria-activedescendant")?.as_deref(),
        Some("country__option--0")
    );

    page.press_key("#country", "ArrowDown")?;
    assert!(page.has_class("#country__option--1", "autocomplete__option--focused")?);
    assert!(!page.has_class("#country__option--0", "autocomplete__option--focused")?);

    page.press_key("#country", "Enter")?;
    page.assert_value("#country", "Finland")?;
    page.assert_value("#country-select", "FI")?;
    Ok(())
}

#[test]
fn matching_ignores_case_and_accents() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "cote d")?;
    page.press_key("#country", "Enter")?;

    page.assert_value("#country", "Côte d’Ivoire")?;
    page.assert_value("#country-select", "CI")?;
    Ok(())
}

#[test]
fn clicking_a_suggestion_confirms_it() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "f")?;
    page.click("#country__option--1")?;

    page.assert_value("#country", "Finland")?;
    page.assert_value("#country-select", "FI")?;
    assert_eq!(page.attr("#country", "aria-expanded")?.as_deref(), Some("false"));
    Ok(())
}

#[test]
fn escape_closes_the_menu_without_confirming() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "f")?;
    page.press_key("#country", "Escape")?;

    assert_eq!(page.attr("#country", "aria-expanded")?.as_deref(), Some("false"));
    assert!(page.assert_exists("#country__option--0").is_err());
    page.assert_value("#country-select", "")?;
    Ok(())
}

#[test]
fn abandoned_search_then_submit_sends_no_country() -> page_enhancer::Result<()> {
    let mut page = enhanced_page()?;

    page.type_text("#country", "Fra")?;
    page.press_key("#country", "n")?;
    page.click("#send")?;

    page.assert_value("#country-select", "")?;
    assert_eq!(page.url(), "/registered-country");
    Ok(())
}

#[test]
fn pages_without_the_selector_are_left_alone() -> page_enhancer::Result<()> {
    let mut page = Page::from_html("<p id='nothing'>No selector here</p>")?;
    country_picker::attach(&mut page)?;
    assert!(page.assert_exists("input[role=combobox]").is_err());

    let mut page = Page::from_html("<div id='country'>Not a select</div>")?;
    country_picker::attach(&mut page)?;
    page.assert_text("#country", "Not a select")?;
    Ok(())
}
