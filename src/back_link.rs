use crate::page::Page;
use crate::Result;

const BACK_LINK_SELECTOR: &str = ".govuk-back-link";

pub fn attach(page: &mut Page) -> Result<()> {
    let Some(link) = page.dom().query_selector(BACK_LINK_SELECTOR)? else {
        return Ok(());
    };

    page.add_listener(link, "click", false, |page, event| {
        event.prevent_default();
        event.stop_propagation();
        page.history_back()
    });
    Ok(())
}
