use crate::page::Page;
use crate::Result;

const NUMERIC_INPUT_SELECTOR: &str =
    "input[data-type=numeric], input[data-type=currency], input[data-type=percentage]";

pub fn attach(page: &mut Page) -> Result<()> {
    let capabilities = page.capabilities();
    let targets = page.dom().query_selector_all(NUMERIC_INPUT_SELECTOR)?;

    for target in targets {
        if capabilities.touch && !capabilities.strips_trailing_zeros {
            page.dom_mut().set_attr(target, "type", "number")?;
            page.dom_mut().set_attr(target, "step", "any")?;
            page.dom_mut().set_attr(target, "min", "0")?;
        }

        page.add_listener(target, "wheel", false, move |page, event| {
            // Only while focused; unfocused wheel should keep scrolling the page.
            if page.active_node() == Some(target) {
                event.prevent_default();
            }
            Ok(())
        });

        page.add_listener(target, "keydown", false, |_page, event| {
            if let Some("ArrowUp" | "ArrowDown" | ",") = event.key.as_deref() {
                event.prevent_default();
            }
            Ok(())
        });
    }
    Ok(())
}
