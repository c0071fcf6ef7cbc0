use crate::services::host::HostDocument;

/// Id of the `<style>` element; its presence marks the document as styled.
pub const STYLE_ELEMENT_ID: &str = "booking-widget-styles";

pub const STYLESHEET: &str = r#"
.booking-container {
    font-family: Arial, sans-serif;
    max-width: 500px;
    margin: 0 auto;
    padding: 20px;
    border: 1px solid #ccc;
    border-radius: 5px;
    box-shadow: 0 2px 5px rgba(0,0,0,0.1);
}
.booking-header { text-align: center; margin-bottom: 20px; }
.booking-form-group { margin-bottom: 15px; }
.booking-label { display: block; margin-bottom: 5px; font-weight: bold; }
.booking-input {
    width: 100%;
    padding: 8px;
    border: 1px solid #ddd;
    border-radius: 4px;
    box-sizing: border-box;
}
.booking-slots { display: flex; flex-wrap: wrap; gap: 10px; margin-top: 10px; }
.booking-slot {
    padding: 8px 12px;
    background-color: #e9f5ff;
    border: 1px solid #b8dcff;
    border-radius: 4px;
    cursor: pointer;
}
.booking-slot.selected { background-color: #007bff; color: white; border-color: #0056b3; }
.booking-slot.disabled {
    background-color: #f5f5f5;
    color: #aaa;
    cursor: not-allowed;
    border-color: #ddd;
}
.booking-btn {
    display: block;
    width: 100%;
    padding: 10px;
    margin-top: 20px;
    background-color: #007bff;
    color: white;
    border: none;
    border-radius: 4px;
    cursor: pointer;
    font-size: 16px;
}
.booking-btn:hover { background-color: #0056b3; }
.booking-btn:disabled { background-color: #cccccc; cursor: not-allowed; }
.booking-message { margin-top: 20px; padding: 10px; border-radius: 4px; text-align: center; }
.booking-success { background-color: #d4edda; color: #155724; border: 1px solid #c3e6cb; }
.booking-error { background-color: #f8d7da; color: #721c24; border: 1px solid #f5c6cb; }
"#;

/// Adds the widget stylesheet to the document head unless an earlier
/// `init` already did. Returns whether anything was injected.
pub fn inject(document: &mut HostDocument) -> bool {
    if document.has_style(STYLE_ELEMENT_ID) {
        return false;
    }
    document.append_style(STYLE_ELEMENT_ID, STYLESHEET);
    true
}
