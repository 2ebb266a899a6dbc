//! Server-side HTML rendering.
//!
//! Pages are plain strings assembled with `format!`. Every value that came
//! from the database or the request goes through [`escape`] first.

use crate::{
    core::{
        amount::format_amount,
        cashflow::CashflowRow,
        reference::ReferenceData,
        validation::{EntryForm, parse_id},
    },
    errors::Result,
    web::{
        notice::Notice,
        reference::{ReferenceForm, ReferenceKind},
    },
};
use axum::{http::StatusCode, response::Html};
use std::collections::HashMap;

const STYLE: &str = "body{font-family:sans-serif;margin:2rem;max-width:70rem}\
table{border-collapse:collapse;width:100%}td,th{border:1px solid #ccc;padding:.3rem .5rem}\
td.amount{text-align:right;white-space:nowrap}.notice{background:#e6f4e6;padding:.5rem}\
.errors{background:#fbe9e9;padding:.5rem}form.inline{display:inline}\
fieldset{margin-bottom:1rem}label{margin-right:.75rem}";

/// Script narrowing the category and subcategory selects to the chosen type
/// and category, driven by the JSON island rendered with the entry form.
const DEPENDENT_SELECTS_JS: &str = r"
(function () {
  var data = JSON.parse(document.getElementById('choices').textContent);
  function refill(select, options) {
    var current = select.value;
    select.innerHTML = '<option value=\'\'>-</option>';
    (options || []).forEach(function (o) {
      var el = document.createElement('option');
      el.value = o.id; el.textContent = o.name;
      if (String(o.id) === current) { el.selected = true; }
      select.appendChild(el);
    });
  }
  var type = document.getElementById('type_id');
  var category = document.getElementById('category_id');
  var subcategory = document.getElementById('subcategory_id');
  type.addEventListener('change', function () {
    refill(category, data.categories_by_type[type.value]);
    refill(subcategory, data.subcategories_by_category[category.value]);
  });
  category.addEventListener('change', function () {
    refill(subcategory, data.subcategories_by_category[category.value]);
  });
})();
";

/// Escapes text for use in HTML content and double-quoted attributes.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps `body` in the shared page chrome with navigation, the optional
/// success notice and any error messages.
#[must_use]
pub fn layout(title: &str, notice: Option<Notice>, errors: &[String], body: &str) -> Html<String> {
    let mut page = String::new();
    page.push_str(&format!(
        "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><title>{title} - Cashbook</title>\
         <style>{STYLE}</style></head><body>\
         <nav><a href=\"/\">Ledger</a> | <a href=\"/entries/new\">New entry</a> | \
         <a href=\"/reference\">Reference data</a></nav><h1>{title}</h1>",
        title = escape(title),
    ));
    if let Some(notice) = notice {
        page.push_str(&format!("<p class=\"notice\">{}</p>", escape(notice.message())));
    }
    if !errors.is_empty() {
        page.push_str("<ul class=\"errors\">");
        for message in errors {
            page.push_str(&format!("<li>{}</li>", escape(message)));
        }
        page.push_str("</ul>");
    }
    page.push_str(body);
    page.push_str("</body></html>");
    Html(page)
}

fn options<'a>(
    items: impl IntoIterator<Item = (i64, &'a str)>,
    selected: Option<i64>,
    placeholder: &str,
) -> String {
    let mut html = format!("<option value=\"\">{}</option>", escape(placeholder));
    for (id, name) in items {
        let marker = if selected == Some(id) { " selected" } else { "" };
        html.push_str(&format!("<option value=\"{id}\"{marker}>{}</option>", escape(name)));
    }
    html
}

fn select(name: &str, label: &str, options_html: &str) -> String {
    format!(
        "<label>{label} <select id=\"{name}\" name=\"{name}\">{options_html}</select></label>"
    )
}

/// The ledger: filter form plus the matching entries.
#[must_use]
pub fn ledger_page(
    rows: &[CashflowRow],
    refs: &ReferenceData,
    params: &HashMap<String, String>,
    notice: Option<Notice>,
) -> Html<String> {
    let value = |key: &str| params.get(key).map_or("", String::as_str);
    let selected = |key: &str| parse_id(value(key));

    let mut body = String::new();
    body.push_str(&format!(
        "<form method=\"get\" action=\"/\"><fieldset><legend>Filter</legend>\
         <label>From <input type=\"date\" name=\"date_from\" value=\"{}\"></label>\
         <label>To <input type=\"date\" name=\"date_to\" value=\"{}\"></label>{}{}{}{}\
         <button type=\"submit\">Apply</button> <a href=\"/\">Reset</a></fieldset></form>",
        escape(value("date_from")),
        escape(value("date_to")),
        select(
            "status_id",
            "Status",
            &options(
                refs.statuses.iter().map(|s| (s.id, s.name.as_str())),
                selected("status_id"),
                "All",
            ),
        ),
        select(
            "type_id",
            "Type",
            &options(
                refs.types.iter().map(|t| (t.id, t.name.as_str())),
                selected("type_id"),
                "All",
            ),
        ),
        select(
            "category_id",
            "Category",
            &options(
                refs.categories.iter().map(|c| (c.id, c.name.as_str())),
                selected("category_id"),
                "All",
            ),
        ),
        select(
            "subcategory_id",
            "Subcategory",
            &options(
                refs.subcategories.iter().map(|s| (s.id, s.name.as_str())),
                selected("subcategory_id"),
                "All",
            ),
        ),
    ));

    if rows.is_empty() {
        body.push_str("<p>No entries found.</p>");
    } else {
        body.push_str(&format!("<p>{} entries</p>", rows.len()));
        body.push_str(
            "<table><thead><tr><th>Date</th><th>Status</th><th>Type</th><th>Category</th>\
             <th>Subcategory</th><th>Amount</th><th>Comment</th><th></th></tr></thead><tbody>",
        );
        for row in rows {
            body.push_str(&format!(
                "<tr><td>{date}</td><td>{status}</td><td>{flow_type}</td><td>{category}</td>\
                 <td>{subcategory}</td><td class=\"amount\">{amount}</td><td>{comment}</td>\
                 <td><a href=\"/entries/{id}/edit\">Edit</a> \
                 <form class=\"inline\" method=\"post\" action=\"/entries/{id}/delete\">\
                 <button type=\"submit\">Delete</button></form></td></tr>",
                date = row.recorded_on.format("%Y-%m-%d"),
                status = escape(&row.status_name),
                flow_type = escape(&row.type_name),
                category = escape(&row.category_name),
                subcategory = escape(&row.subcategory_name),
                amount = format_amount(row.amount_cents),
                comment = escape(row.comment.as_deref().unwrap_or("")),
                id = row.id,
            ));
        }
        body.push_str("</tbody></table>");
    }

    layout("Ledger", notice, &[], &body)
}

/// Serializes the dependent-select maps, made safe for a `<script>` element.
pub fn choices_json(refs: &ReferenceData) -> Result<String> {
    let json = serde_json::to_string(&serde_json::json!({
        "categories_by_type": refs.categories_by_type(),
        "subcategories_by_category": refs.subcategories_by_category(),
    }))?;
    Ok(json.replace("</", "<\\/"))
}

/// The create/edit form for a single entry.
///
/// The category and subcategory selects start out narrowed to the currently
/// selected type and category; the embedded script keeps them in sync.
pub fn entry_form_page(
    title: &str,
    action: &str,
    form: &EntryForm,
    refs: &ReferenceData,
    errors: &[String],
) -> Result<Html<String>> {
    let type_id = parse_id(&form.type_id);
    let category_id = parse_id(&form.category_id);

    let categories: Vec<_> = match type_id {
        Some(type_id) => refs
            .categories_of(type_id)
            .map(|c| (c.id, c.name.as_str()))
            .collect(),
        None => Vec::new(),
    };
    let subcategories: Vec<_> = match category_id {
        Some(category_id) => refs
            .subcategories_of(category_id)
            .map(|s| (s.id, s.name.as_str()))
            .collect(),
        None => Vec::new(),
    };

    let mut body = String::new();
    body.push_str(&format!(
        "<form method=\"post\" action=\"{action}\"><fieldset>\
         <p><label>Date <input type=\"date\" name=\"recorded_on\" value=\"{date}\"></label></p>\
         <p>{status}</p><p>{flow_type}</p><p>{category}</p><p>{subcategory}</p>\
         <p><label>Amount <input name=\"amount\" inputmode=\"decimal\" value=\"{amount}\"></label></p>\
         <p><label>Comment <input name=\"comment\" value=\"{comment}\"></label></p>\
         <button type=\"submit\">Save</button> <a href=\"/\">Cancel</a></fieldset></form>\
         <script id=\"choices\" type=\"application/json\">{choices}</script>\
         <script>{script}</script>",
        action = escape(action),
        date = escape(&form.recorded_on),
        status = select(
            "status_id",
            "Status",
            &options(
                refs.statuses.iter().map(|s| (s.id, s.name.as_str())),
                parse_id(&form.status_id),
                "-",
            ),
        ),
        flow_type = select(
            "type_id",
            "Type",
            &options(
                refs.types.iter().map(|t| (t.id, t.name.as_str())),
                type_id,
                "-",
            ),
        ),
        category = select("category_id", "Category", &options(categories, category_id, "-")),
        subcategory = select(
            "subcategory_id",
            "Subcategory",
            &options(subcategories, parse_id(&form.subcategory_id), "-"),
        ),
        amount = escape(&form.amount),
        comment = escape(&form.comment),
        choices = choices_json(refs)?,
        script = DEPENDENT_SELECTS_JS,
    ));

    Ok(layout(title, None, errors, &body))
}

fn delete_button(kind: ReferenceKind, id: i64) -> String {
    format!(
        "<form class=\"inline\" method=\"post\" action=\"/reference/{path}/{id}/delete\">\
         <button type=\"submit\">Delete</button></form>",
        path = kind.path(),
    )
}

fn edit_link(kind: ReferenceKind, id: i64) -> String {
    format!("<a href=\"/reference/{}/{id}/edit\">Edit</a>", kind.path())
}

fn type_options(refs: &ReferenceData, selected: Option<i64>) -> String {
    options(refs.types.iter().map(|t| (t.id, t.name.as_str())), selected, "-")
}

fn category_options(refs: &ReferenceData, selected: Option<i64>) -> String {
    let labels: Vec<_> = refs
        .categories
        .iter()
        .map(|c| (c.id, format!("{} ({})", c.name, c.type_name)))
        .collect();
    options(
        labels.iter().map(|(id, label)| (*id, label.as_str())),
        selected,
        "-",
    )
}

/// All four reference tables with their add forms.
#[must_use]
pub fn reference_page(
    refs: &ReferenceData,
    notice: Option<Notice>,
    errors: &[String],
) -> Html<String> {
    let mut body = String::new();

    for kind in ReferenceKind::ALL {
        body.push_str(&format!("<h2>{}</h2>", kind.title()));

        let (header, rows): (&str, Vec<(i64, String, Option<String>)>) = match kind {
            ReferenceKind::Statuses => (
                "",
                refs.statuses
                    .iter()
                    .map(|s| (s.id, s.name.clone(), None))
                    .collect(),
            ),
            ReferenceKind::Types => (
                "",
                refs.types
                    .iter()
                    .map(|t| (t.id, t.name.clone(), None))
                    .collect(),
            ),
            ReferenceKind::Categories => (
                "Type",
                refs.categories
                    .iter()
                    .map(|c| (c.id, c.name.clone(), Some(c.type_name.clone())))
                    .collect(),
            ),
            ReferenceKind::Subcategories => (
                "Category",
                refs.subcategories
                    .iter()
                    .map(|s| (s.id, s.name.clone(), Some(s.category_name.clone())))
                    .collect(),
            ),
        };

        if rows.is_empty() {
            body.push_str("<p>None yet.</p>");
        } else {
            body.push_str("<table><thead><tr><th>Name</th>");
            if !header.is_empty() {
                body.push_str(&format!("<th>{header}</th>"));
            }
            body.push_str("<th></th></tr></thead><tbody>");
            for (id, name, parent) in &rows {
                body.push_str(&format!("<tr><td>{}</td>", escape(name)));
                if let Some(parent) = parent {
                    body.push_str(&format!("<td>{}</td>", escape(parent)));
                }
                body.push_str(&format!(
                    "<td>{} {}</td></tr>",
                    edit_link(kind, *id),
                    delete_button(kind, *id)
                ));
            }
            body.push_str("</tbody></table>");
        }

        let parent_select = match kind {
            ReferenceKind::Statuses | ReferenceKind::Types => String::new(),
            ReferenceKind::Categories => select("type_id", "Type", &type_options(refs, None)),
            ReferenceKind::Subcategories => {
                select("category_id", "Category", &category_options(refs, None))
            }
        };
        body.push_str(&format!(
            "<form method=\"post\" action=\"/reference/{path}\">\
             <label>Name <input name=\"name\"></label>{parent_select}\
             <button type=\"submit\">Add {label}</button></form>",
            path = kind.path(),
            label = kind.label().to_lowercase(),
        ));
    }

    layout("Reference data", notice, errors, &body)
}

/// The rename/re-parent form for one reference row.
#[must_use]
pub fn reference_edit_page(
    kind: ReferenceKind,
    id: i64,
    form: &ReferenceForm,
    refs: &ReferenceData,
    errors: &[String],
) -> Html<String> {
    let parent_select = match kind {
        ReferenceKind::Statuses | ReferenceKind::Types => String::new(),
        ReferenceKind::Categories => format!(
            "<p>{}</p>",
            select("type_id", "Type", &type_options(refs, parse_id(&form.type_id)))
        ),
        ReferenceKind::Subcategories => format!(
            "<p>{}</p>",
            select(
                "category_id",
                "Category",
                &category_options(refs, parse_id(&form.category_id)),
            )
        ),
    };

    let body = format!(
        "<form method=\"post\" action=\"/reference/{path}/{id}/edit\"><fieldset>\
         <p><label>Name <input name=\"name\" value=\"{name}\"></label></p>{parent_select}\
         <button type=\"submit\">Save</button> <a href=\"/reference\">Cancel</a>\
         </fieldset></form>",
        path = kind.path(),
        name = escape(&form.name),
    );

    layout(&format!("Edit {}", kind.label().to_lowercase()), None, errors, &body)
}

/// A bare page reporting a failed request.
#[must_use]
pub fn error_page(status: StatusCode, messages: &[String]) -> Html<String> {
    let title = status.canonical_reason().unwrap_or("Error");
    layout(title, None, messages, "<p><a href=\"/\">Back to the ledger</a></p>")
}
