use crate::dom::NodeId;
use crate::page::{Page, PrintTransition};
use crate::Result;

const NO_DETAILS_CLASS: &str = "no-details";
const PRINT_OPEN_CLASS: &str = "print-open";
const PRINT_HEADING_CLASS: &str = "print-heading";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LayoutMode {
    Interactive,
    NoDetailsFallback,
}

// Focus and scroll are captured at the start of one transition and restored
// at the end of that same transition; never reused across transitions.
#[derive(Debug, Clone, Copy)]
struct PageSnapshot {
    focus: Option<NodeId>,
    scroll_y: i64,
}

impl PageSnapshot {
    fn capture(page: &Page) -> Self {
        Self {
            focus: page.active_node(),
            scroll_y: page.scroll_y(),
        }
    }

    fn restore(self, page: &mut Page) -> Result<()> {
        page.blur_active()?;
        if let Some(node) = self.focus {
            // No-op when the node is gone, detached, or unfocusable.
            page.focus_node(node)?;
        }
        page.scroll_to(self.scroll_y);
        Ok(())
    }
}

pub fn attach(page: &mut Page) -> Result<()> {
    page.on_print_transition(|page, transition| match transition {
        PrintTransition::Enter => enter(page),
        PrintTransition::Leave => leave(page),
    });
    Ok(())
}

fn enter(page: &mut Page) -> Result<()> {
    let disclosures = page.dom().query_selector_all("details")?;

    match layout_mode(page)? {
        LayoutMode::NoDetailsFallback => {
            for node in disclosures {
                page.dom_mut().set_attr(node, "open", "open")?;
                page.dom_mut().class_add(node, PRINT_OPEN_CLASS)?;
            }
        }
        LayoutMode::Interactive => {
            let snapshot = PageSnapshot::capture(page);
            for node in disclosures {
                if page.dom().has_attr(node, "open")? {
                    continue;
                }
                let Some(summary) = page.dom().first_child_by_tag(node, "summary") else {
                    continue;
                };
                page.click_node(summary)?;
                page.dom_mut().class_add(node, PRINT_OPEN_CLASS)?;
            }
            snapshot.restore(page)?;
        }
    }

    for node in marked_disclosures(page)? {
        if let Some(summary) = page.dom().first_child_by_tag(node, "summary") {
            page.dom_mut().class_add(summary, PRINT_HEADING_CLASS)?;
        }
    }
    Ok(())
}

fn leave(page: &mut Page) -> Result<()> {
    let marked = marked_disclosures(page)?;

    for node in &marked {
        if let Some(summary) = page.dom().first_child_by_tag(*node, "summary") {
            page.dom_mut().class_remove(summary, PRINT_HEADING_CLASS)?;
        }
    }

    match layout_mode(page)? {
        LayoutMode::NoDetailsFallback => {
            for node in marked {
                page.dom_mut().remove_attr(node, "open")?;
                page.dom_mut().class_remove(node, PRINT_OPEN_CLASS)?;
            }
        }
        LayoutMode::Interactive => {
            let snapshot = PageSnapshot::capture(page);
            for node in marked {
                if let Some(summary) = page.dom().first_child_by_tag(node, "summary") {
                    // The element is open here, so the toggle closes it.
                    page.click_node(summary)?;
                }
                page.dom_mut().class_remove(node, PRINT_OPEN_CLASS)?;
            }
            snapshot.restore(page)?;
        }
    }
    Ok(())
}

fn layout_mode(page: &Page) -> Result<LayoutMode> {
    let fallback = page
        .dom()
        .query_selector(&format!(".{NO_DETAILS_CLASS}"))?
        .is_some();
    Ok(if fallback {
        LayoutMode::NoDetailsFallback
    } else {
        LayoutMode::Interactive
    })
}

fn marked_disclosures(page: &Page) -> Result<Vec<NodeId>> {
    page.dom()
        .query_selector_all(&format!("details.{PRINT_OPEN_CLASS}"))
}
