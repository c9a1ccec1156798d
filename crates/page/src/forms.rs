//! Form extraction: `forms: list of { action, method, enctype, fields }`. Not part of
//! the paint pipeline proper -- the painter only cares about the *submit* control for
//! its hit-test region (`paint::region::FormSubmitRegion`); this module walks the DOM
//! once per render to describe every `<form>`'s full field set for the shell's
//! form-state tracking.

use html::{Document, NodeData, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub struct FormField {
    pub name: String,
    pub value: String,
    pub field_type: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormInfo {
    pub action: String,
    pub method: String,
    pub enctype: String,
    pub fields: Vec<FormField>,
}

fn attr<'doc>(doc: &'doc Document, node: NodeId, name: &str) -> Option<&'doc str> {
    doc.data(node).attribute(name)
}

fn field_for(doc: &Document, node: NodeId, tag: &str) -> Option<FormField> {
    let name = attr(doc, node, "name")?.to_owned();
    match tag {
        "select" => {
            let selected = doc
                .children(node)
                .into_iter()
                .find(|&option| doc.tag_name_of(option) == Some("option") && attr(doc, option, "selected").is_some())
                .or_else(|| doc.children(node).into_iter().find(|&option| doc.tag_name_of(option) == Some("option")));
            let value = selected.and_then(|option| attr(doc, option, "value").map(str::to_owned)).unwrap_or_default();
            Some(FormField { name, value, field_type: "select".to_owned(), checked: false })
        }
        "textarea" => {
            let value = doc.children(node).into_iter().find_map(|child| doc.data(child).text_data().map(str::to_owned)).unwrap_or_default();
            Some(FormField { name, value, field_type: "textarea".to_owned(), checked: false })
        }
        "input" => {
            let field_type = attr(doc, node, "type").unwrap_or("text").to_owned();
            let value = attr(doc, node, "value").unwrap_or_default().to_owned();
            let checked = attr(doc, node, "checked").is_some();
            Some(FormField { name, value, field_type, checked })
        }
        _ => None,
    }
}

fn collect_fields(doc: &Document, node: NodeId, out: &mut Vec<FormField>) {
    for child in doc.children(node) {
        let NodeData::Element { tag_name, .. } = doc.data(child) else {
            collect_fields(doc, child, out);
            continue;
        };
        // A nested <form> would be malformed HTML; stop descending into it so its
        // fields aren't double-counted against the outer form.
        if tag_name == "form" {
            continue;
        }
        if let Some(field) = field_for(doc, child, tag_name) {
            out.push(field);
        }
        collect_fields(doc, child, out);
    }
}

/// Walk the whole document collecting one `FormInfo` per `<form>` element, in
/// document order, each with its `name`d descendant controls in document order.
pub fn extract_forms(doc: &Document) -> Vec<FormInfo> {
    let mut forms = Vec::new();
    for node in doc.descendants(doc.root) {
        if doc.tag_name_of(node) != Some("form") {
            continue;
        }
        let action = attr(doc, node, "action").unwrap_or_default().to_owned();
        let method = attr(doc, node, "method").unwrap_or("get").to_ascii_lowercase();
        let enctype = attr(doc, node, "enctype").unwrap_or("application/x-www-form-urlencoded").to_owned();
        let mut fields = Vec::new();
        collect_fields(doc, node, &mut fields);
        forms.push(FormInfo { action, method, enctype, fields });
    }
    forms
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::tree_builder::parse_document;

    #[test]
    fn text_input_field_is_extracted_with_its_value() {
        let doc = parse_document(r#"<form action="/go" method="post"><input type="text" name="q" value="hi"></form>"#);
        let forms = extract_forms(&doc);
        assert_eq!(forms.len(), 1);
        assert_eq!(forms[0].action, "/go");
        assert_eq!(forms[0].method, "post");
        assert_eq!(forms[0].fields[0], FormField { name: "q".to_owned(), value: "hi".to_owned(), field_type: "text".to_owned(), checked: false });
    }

    #[test]
    fn checkbox_reports_checked_state() {
        let doc = parse_document(r#"<form><input type="checkbox" name="agree" checked></form>"#);
        let forms = extract_forms(&doc);
        assert!(forms[0].fields[0].checked);
    }

    #[test]
    fn select_reports_the_selected_options_value() {
        let doc = parse_document(
            r#"<form><select name="color"><option value="r">Red</option><option value="g" selected>Green</option></select></form>"#,
        );
        let forms = extract_forms(&doc);
        assert_eq!(forms[0].fields[0].value, "g");
    }

    #[test]
    fn method_defaults_to_get_when_unspecified() {
        let doc = parse_document("<form><input name=\"x\"></form>");
        assert_eq!(extract_forms(&doc)[0].method, "get");
    }

    #[test]
    fn unnamed_fields_are_skipped() {
        let doc = parse_document(r#"<form><input type="text"><input type="text" name="kept"></form>"#);
        let forms = extract_forms(&doc);
        assert_eq!(forms[0].fields.len(), 1);
        assert_eq!(forms[0].fields[0].name, "kept");
    }
}
