use std::cell::RefCell;
use std::rc::Rc;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::dom::NodeId;
use crate::page::Page;
use crate::Result;

const COUNTRY_ID: &str = "country";
const HIDDEN_SELECT_ID: &str = "country-select";
const LISTBOX_ID: &str = "country__listbox";
const WRAPPER_CLASS: &str = "autocomplete__wrapper";
const INPUT_CLASS: &str = "autocomplete__input";
const MENU_CLASS: &str = "autocomplete__menu";
const OPTION_CLASS: &str = "autocomplete__option";
const OPTION_FOCUSED_CLASS: &str = "autocomplete__option--focused";

#[derive(Clone)]
struct CountryOption {
    value: String,
    label: String,
}

struct ComboboxState {
    options: Vec<CountryOption>,
    // Indices into options, in menu order.
    matches: Vec<usize>,
    highlighted: Option<usize>,
}

pub fn attach(page: &mut Page) -> Result<()> {
    let Some(select) = page.dom().by_id(COUNTRY_ID) else {
        return Ok(());
    };
    if !page.dom().is_tag(select, "select") {
        return Ok(());
    }
    let Some(select_parent) = page.dom().parent(select) else {
        return Ok(());
    };

    let options = collect_options(page, select)?;

    // The select keeps its name for form submission but leaves the
    // accessibility tree; the combobox input takes over its id.
    page.dom_mut().set_attr(select, "id", HIDDEN_SELECT_ID)?;
    page.dom_mut().set_attr(select, "aria-hidden", "true")?;
    page.dom_mut().set_attr(select, "tabindex", "-1")?;
    page.dom_mut().set_attr(select, "style", "display:none")?;

    let wrapper = page.dom_mut().create_detached_element("div");
    page.dom_mut().set_attr(wrapper, "class", WRAPPER_CLASS)?;
    page.dom_mut().insert_before(select_parent, wrapper, select)?;

    let input = page.dom_mut().create_detached_element("input");
    page.dom_mut().set_attr(input, "id", COUNTRY_ID)?;
    page.dom_mut().set_attr(input, "class", INPUT_CLASS)?;
    page.dom_mut().set_attr(input, "type", "text")?;
    page.dom_mut().set_attr(input, "role", "combobox")?;
    page.dom_mut().set_attr(input, "aria-autocomplete", "list")?;
    page.dom_mut().set_attr(input, "aria-expanded", "false")?;
    page.dom_mut().set_attr(input, "aria-owns", LISTBOX_ID)?;
    page.dom_mut().set_attr(input, "autocomplete", "off")?;
    page.dom_mut().append_child(wrapper, input)?;
    // Default value is empty even when the select arrived pre-selected.
    page.dom_mut().set_value(input, "")?;

    let menu = page.dom_mut().create_detached_element("ul");
    page.dom_mut().set_attr(menu, "id", LISTBOX_ID)?;
    page.dom_mut().set_attr(menu, "class", MENU_CLASS)?;
    page.dom_mut().set_attr(menu, "role", "listbox")?;
    page.dom_mut().append_child(wrapper, menu)?;

    let state = Rc::new(RefCell::new(ComboboxState {
        options,
        matches: Vec::new(),
        highlighted: None,
    }));

    let filter_state = Rc::clone(&state);
    page.add_listener(input, "input", false, move |page, _event| {
        refresh_menu(page, &filter_state, input, menu)
    });

    let widget_state = Rc::clone(&state);
    page.add_listener(input, "keydown", false, move |page, event| {
        let key = event.key.clone().unwrap_or_default();
        match key.as_str() {
            "ArrowDown" => {
                event.prevent_default();
                move_highlight(page, &widget_state, input, menu, 1)
            }
            "ArrowUp" => {
                event.prevent_default();
                move_highlight(page, &widget_state, input, menu, -1)
            }
            "Enter" => {
                event.prevent_default();
                try_confirm(page, &widget_state, select, input, menu)
            }
            "Tab" => try_confirm(page, &widget_state, select, input, menu),
            "Escape" => close_menu(page, &widget_state, input, menu),
            _ => Ok(()),
        }
    });

    let click_state = Rc::clone(&state);
    page.add_listener(menu, "click", false, move |page, event| {
        let mut cursor = Some(event.target);
        let mut option = None;
        while let Some(node) = cursor {
            if node == menu {
                break;
            }
            if page.dom().matches_selector(node, "li[role=option]")? {
                option = Some(node);
                break;
            }
            cursor = page.dom().parent(node);
        }
        let Some(option) = option else {
            return Ok(());
        };
        let Some(pos) = page
            .dom()
            .children(menu)
            .iter()
            .position(|child| *child == option)
        else {
            return Ok(());
        };
        confirm(page, &click_state, select, input, menu, pos)
    });

    // An abandoned partial search must never submit a stale prior selection:
    // every key other than Enter and Tab clears the backing select.
    page.add_listener(input, "keydown", false, move |page, event| {
        let key = event.key.as_deref().unwrap_or("");
        if key != "Enter" && key != "Tab" {
            page.dom_mut().set_select_value(select, "")?;
        }
        Ok(())
    });

    Ok(())
}

fn collect_options(page: &Page, select: NodeId) -> Result<Vec<CountryOption>> {
    let mut nodes = Vec::new();
    page.dom().collect_select_options(select, &mut nodes);

    let mut options = Vec::with_capacity(nodes.len());
    for node in nodes {
        let value = page.dom().option_effective_value(node)?;
        if value.is_empty() {
            // Placeholder entry, not a suggestion.
            continue;
        }
        let label = page.dom().text_content(node).trim().to_string();
        options.push(CountryOption { value, label });
    }
    Ok(options)
}

fn refresh_menu(
    page: &mut Page,
    state: &Rc<RefCell<ComboboxState>>,
    input: NodeId,
    menu: NodeId,
) -> Result<()> {
    let query = page.dom().value(input)?;
    let normalized = normalize(query.trim());

    let labels = {
        let mut st = state.borrow_mut();
        st.matches.clear();
        st.highlighted = None;
        if !normalized.is_empty() {
            let matched = st
                .options
                .iter()
                .enumerate()
                .filter(|(_, option)| normalize(&option.label).contains(&normalized))
                .map(|(idx, _)| idx)
                .collect::<Vec<_>>();
            st.matches = matched;
        }
        st.matches
            .iter()
            .map(|idx| st.options[*idx].label.clone())
            .collect::<Vec<_>>()
    };

    page.dom_mut().remove_children(menu);
    for (pos, label) in labels.iter().enumerate() {
        let item = page.dom_mut().create_detached_element("li");
        page.dom_mut().set_attr(item, "role", "option")?;
        page.dom_mut().set_attr(item, "class", OPTION_CLASS)?;
        page.dom_mut().set_attr(item, "id", &option_id(pos))?;
        page.dom_mut().create_text(item, label.clone());
        page.dom_mut().append_child(menu, item)?;
    }

    let expanded = if labels.is_empty() { "false" } else { "true" };
    page.dom_mut().set_attr(input, "aria-expanded", expanded)?;
    page.dom_mut().remove_attr(input, "aria-activedescendant")?;
    Ok(())
}

fn move_highlight(
    page: &mut Page,
    state: &Rc<RefCell<ComboboxState>>,
    input: NodeId,
    menu: NodeId,
    delta: i64,
) -> Result<()> {
    let next = {
        let mut st = state.borrow_mut();
        if st.matches.is_empty() {
            return Ok(());
        }
        let len = st.matches.len() as i64;
        let next = match st.highlighted {
            None if delta > 0 => 0,
            None => st.matches.len() - 1,
            Some(current) => (current as i64 + delta).rem_euclid(len) as usize,
        };
        st.highlighted = Some(next);
        next
    };

    let items = page.dom().children(menu).to_vec();
    for (pos, item) in items.iter().enumerate() {
        if pos == next {
            page.dom_mut().class_add(*item, OPTION_FOCUSED_CLASS)?;
        } else {
            page.dom_mut().class_remove(*item, OPTION_FOCUSED_CLASS)?;
        }
    }
    page.dom_mut()
        .set_attr(input, "aria-activedescendant", &option_id(next))?;
    Ok(())
}

fn try_confirm(
    page: &mut Page,
    state: &Rc<RefCell<ComboboxState>>,
    select: NodeId,
    input: NodeId,
    menu: NodeId,
) -> Result<()> {
    let query = page.dom().value(input)?;
    let target = {
        let st = state.borrow();
        confirm_target(&st, &query)
    };
    match target {
        Some(pos) => confirm(page, state, select, input, menu, pos),
        None => Ok(()),
    }
}

fn confirm_target(state: &ComboboxState, query: &str) -> Option<usize> {
    if let Some(highlighted) = state.highlighted {
        return Some(highlighted);
    }
    if state.matches.len() == 1 {
        return Some(0);
    }
    let normalized = normalize(query.trim());
    state
        .matches
        .iter()
        .position(|idx| normalize(&state.options[*idx].label) == normalized)
}

fn confirm(
    page: &mut Page,
    state: &Rc<RefCell<ComboboxState>>,
    select: NodeId,
    input: NodeId,
    menu: NodeId,
    pos: usize,
) -> Result<()> {
    let chosen = {
        let st = state.borrow();
        st.matches.get(pos).map(|idx| st.options[*idx].clone())
    };
    let Some(chosen) = chosen else {
        return Ok(());
    };

    page.dom_mut().set_value(input, &chosen.label)?;
    page.dom_mut().set_select_value(select, &chosen.value)?;
    close_menu(page, state, input, menu)
}

fn close_menu(
    page: &mut Page,
    state: &Rc<RefCell<ComboboxState>>,
    input: NodeId,
    menu: NodeId,
) -> Result<()> {
    {
        let mut st = state.borrow_mut();
        st.matches.clear();
        st.highlighted = None;
    }
    page.dom_mut().remove_children(menu);
    page.dom_mut().set_attr(input, "aria-expanded", "false")?;
    page.dom_mut().remove_attr(input, "aria-activedescendant")?;
    Ok(())
}

fn option_id(pos: usize) -> String {
    format!("{COUNTRY_ID}__option--{pos}")
}

fn normalize(text: &str) -> String {
    text.nfkd()
        .filter(|ch| !is_combining_mark(*ch))
        .flat_map(char::to_lowercase)
        .collect()
}
