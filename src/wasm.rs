use wasm_bindgen::prelude::*;

use crate::customize::StylePreferences;
use crate::font::FontBook;
use crate::model::ResumeDocument;
use crate::template::TemplateId;

fn parse_template(template: &str) -> Result<TemplateId, JsValue> {
    template.parse().map_err(|e| JsValue::from_str(&format!("{e}")))
}

#[wasm_bindgen]
pub fn export_resume_pdf(json: &str, template: &str) -> Result<js_sys::Uint8Array, JsValue> {
    let template = parse_template(template)?;
    let bytes = crate::render_json(json, template).map_err(|e| JsValue::from_str(&e.to_string()))?;
    Ok(js_sys::Uint8Array::from(bytes.as_slice()))
}

/// The preview page for a resume object, as a plain JS object.
#[wasm_bindgen]
pub fn preview_layout(document: JsValue, template: &str) -> Result<JsValue, JsValue> {
    let template = parse_template(template)?;
    let mut document: ResumeDocument = serde_wasm_bindgen::from_value(document)?;
    document.backfill_empty_sections();
    let page = crate::preview(&document, template, &StylePreferences::default(), &FontBook::new());
    Ok(serde_wasm_bindgen::to_value(&page)?)
}

#[wasm_bindgen]
pub fn resume_filename(full_name: &str) -> String {
    crate::export::export_filename(full_name)
}
