use crate::page::Page;
use crate::Result;
use crate::{back_link, country_picker, numeric_input, print_view, resubmit};

// Document-ready bootstrap. Each enhancement is a silent no-op when its
// target element or host capability is absent.
pub fn attach_all(page: &mut Page) -> Result<()> {
    resubmit::attach(page)?;
    back_link::attach(page)?;
    country_picker::attach(page)?;
    numeric_input::attach(page)?;
    print_view::attach(page)?;
    Ok(())
}
