use web_sys as web;

/// Update the status readout with the current mode and photo count.
///
/// The core only exposes these as observable state; presentation lives in
/// the host page's `#status-overlay` element.
pub fn update_status(document: &web::Document, mode_label: &str, photo_count: u32) {
    if let Some(el) = document.get_element_by_id("status-overlay") {
        let photos = match photo_count {
            1 => "1 photo".to_string(),
            n => format!("{} photos", n),
        };
        el.set_inner_html(&format!(
            "<div style='color: #f3e6c4; font: 13px system-ui; background: rgba(12, 10, 6, 0.8); padding: 8px 12px; border-radius: 6px; border: 1px solid rgba(150, 120, 60, 0.35);'>{} &bull; {}</div>",
            mode_label, photos
        ));
    }
}

#[inline]
pub fn show_help(document: &web::Document) {
    if let Some(el) = document.get_element_by_id("help-overlay") {
        _ = el.class_list().remove_1("hidden");
        // fallback for environments without CSS classes
        _ = el.set_attribute("style", "");
    }
}

#[inline]
pub fn hide_help(document: &web::Document) {
    if let Some(el) = document.get_element_by_id("help-overlay") {
        _ = el.class_list().add_1("hidden");
        // fallback
        _ = el.set_attribute("style", "display:none");
    }
}

#[inline]
pub fn help_hidden(document: &web::Document) -> bool {
    if let Some(el) = document.get_element_by_id("help-overlay") {
        if el.class_list().contains("hidden") {
            return true;
        }
        return el
            .get_attribute("style")
            .map(|s| s.contains("display:none"))
            .unwrap_or(false);
    }
    false
}

#[inline]
pub fn toggle_help(document: &web::Document) {
    if help_hidden(document) {
        show_help(document);
    } else {
        hide_help(document);
    }
}
