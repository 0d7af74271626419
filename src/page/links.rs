/// Anchor lookup for link captures

use crate::operations::{LinkCandidate, resolve_link_title};
use wasm_bindgen::JsCast;
use web_sys::{HtmlAnchorElement, HtmlImageElement};

/// Label of the first anchor in the document whose href is `url`
pub fn find_link_title(url: &str) -> Option<String> {
    let document = web_sys::window()?.document()?;
    let anchors = document.query_selector_all("a").ok()?;

    let candidates: Vec<LinkCandidate> = (0..anchors.length())
        .filter_map(|i| anchors.item(i))
        .filter_map(|node| node.dyn_into::<HtmlAnchorElement>().ok())
        .filter(|anchor| anchor.href() == url)
        .map(|anchor| LinkCandidate {
            href: anchor.href(),
            text: anchor.text_content().unwrap_or_default(),
            title: anchor.title(),
            image_alt: anchor
                .query_selector("img")
                .ok()
                .flatten()
                .and_then(|img| img.dyn_into::<HtmlImageElement>().ok())
                .map(|img| img.alt()),
        })
        .collect();

    resolve_link_title(&candidates, url)
}
