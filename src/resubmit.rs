use crate::page::Page;
use crate::Result;

// Replacing the current history entry with itself stops the browser from
// offering a form-resubmission warning when the page is revisited.
pub fn attach(page: &mut Page) -> Result<()> {
    if !page.capabilities().history_replace_state {
        return Ok(());
    }
    let url = page.url().to_string();
    page.replace_state(&url);
    Ok(())
}
