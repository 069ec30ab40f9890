use page_enhancer::{country_picker, enhance, numeric_input, Capabilities, Page};
use proptest::collection::vec;
use proptest::prelude::*;

fn search_key_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        "[a-zA-Z]",
        Just("ArrowDown".to_string()),
        Just("ArrowUp".to_string()),
        Just("Escape".to_string()),
        Just("Backspace".to_string()),
        Just(" ".to_string()),
    ]
    .boxed()
}

fn suppressed_key_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("ArrowUp".to_string()),
        Just("ArrowDown".to_string()),
        Just(",".to_string()),
    ]
    .boxed()
}

proptest! {
    // An abandoned search must never leave a stale selection behind,
    // whatever the user typed.
    #[test]
    fn non_confirming_keys_always_clear_the_backing_select(
        keys in vec(search_key_strategy(), 1..12),
    ) {
        let mut page = Page::from_html(
            "<select id='country'>\
               <option value=''>Select a country</option>\
               <option value='FR' selected>France</option>\
               <option value='FI'>Finland</option>\
             </select>",
        ).expect("fixture parses");
        country_picker::attach(&mut page).expect("attach succeeds");

        for key in &keys {
            page.press_key("#country", key).expect("key press succeeds");
        }
        prop_assert_eq!(page.value("#country-select").expect("select exists"), "");
    }

    // A full print cycle is an identity on open state and scroll position,
    // for every mix of already-open and closed disclosures.
    #[test]
    fn print_cycle_preserves_disclosure_state_and_scroll(
        open_flags in vec(any::<bool>(), 0..6),
        scroll in 0i64..5_000,
    ) {
        let mut html = String::new();
        for (idx, open) in open_flags.iter().enumerate() {
            let open_attr = if *open { " open" } else { "" };
            html.push_str(&format!(
                "<details id='d{idx}'{open_attr}><summary>Block {idx}</summary><p>Body</p></details>"
            ));
        }
        let mut page = Page::from_html(&html).expect("fixture parses");
        enhance::attach_all(&mut page).expect("attach succeeds");
        page.scroll_to(scroll);

        page.begin_print().expect("enter succeeds");
        for idx in 0..open_flags.len() {
            let selector = format!("#d{idx}");
            prop_assert!(page.attr(&selector, "open").expect("details exists").is_some());
        }
        prop_assert_eq!(page.scroll_y(), scroll);

        page.end_print().expect("leave succeeds");
        for (idx, open) in open_flags.iter().enumerate() {
            let selector = format!("#d{idx}");
            let is_open = page.attr(&selector, "open").expect("details exists").is_some();
            prop_assert_eq!(is_open, *open, "disclosure {}", idx);
            prop_assert!(!page.has_class(&selector, "print-open").expect("details exists"));
        }
        prop_assert_eq!(page.scroll_y(), scroll);
    }

    // Suppressed keys never change an enhanced numeric input's value.
    #[test]
    fn suppressed_keys_never_touch_numeric_values(
        keys in vec(suppressed_key_strategy(), 1..10),
        touch in any::<bool>(),
    ) {
        let mut page = Page::from_html("<input id='n' data-type='numeric' value='4.20'>")
            .expect("fixture parses");
        if touch {
            page.set_capabilities(Capabilities::touch_device());
        }
        numeric_input::attach(&mut page).expect("attach succeeds");

        for key in &keys {
            page.press_key("#n", key).expect("key press succeeds");
        }
        prop_assert_eq!(page.value("#n").expect("input exists"), "4.20");
    }
}
