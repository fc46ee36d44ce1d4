//! # HTML Views
//!
//! Server-rendered pages as plain strings.
//!
//! ## Page Anatomy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  layout(title, nav, body)                                               │
//! │  ┌───────────────────────────────────────────────────────────────────┐ │
//! │  │ nav: Dashboard | Add Sale | Sales | Expenses | Items   [theme]    │ │
//! │  ├───────────────────────────────────────────────────────────────────┤ │
//! │  │ <main> page body (tables, forms, inline error banner) </main>     │ │
//! │  └───────────────────────────────────────────────────────────────────┘ │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every user-supplied string goes through [`escape`] before it reaches
//! markup; values placed in URL path segments go through `urlencoding`.

use axum::http::StatusCode;
use tally_core::{Dashboard, Expense, Item, Money, SaleWithLines};

use crate::forms::{ExpenseForm, ItemForm, SaleForm};

/// Blank rows appended to the sale form for new lines.
const BLANK_SALE_ROWS: usize = 3;

const STYLE: &str = r#"
:root { --bg: #111827; --panel: #1f2937; --text: #f9fafb; --muted: #9ca3af; --accent: #10b981; --danger: #ef4444; --border: #374151; }
[data-theme="light"] { --bg: #f9fafb; --panel: #ffffff; --text: #111827; --muted: #6b7280; --border: #e5e7eb; }
body { margin: 0; font-family: system-ui, sans-serif; background: var(--bg); color: var(--text); }
nav { display: flex; gap: 1rem; align-items: center; padding: 0.75rem 1.5rem; background: var(--panel); border-bottom: 1px solid var(--border); }
nav a { color: var(--muted); text-decoration: none; }
nav a.active { color: var(--accent); font-weight: 600; }
nav .brand { color: var(--text); font-weight: 700; margin-right: 1rem; }
nav button { margin-left: auto; }
main { max-width: 960px; margin: 0 auto; padding: 1.5rem; }
.cards { display: grid; grid-template-columns: repeat(4, 1fr); gap: 1rem; }
.card { background: var(--panel); border: 1px solid var(--border); border-radius: 8px; padding: 1rem; }
.card .label { color: var(--muted); font-size: 0.85rem; }
.card .value { font-size: 1.4rem; font-weight: 700; }
.negative { color: var(--danger); }
table { width: 100%; border-collapse: collapse; margin: 0.5rem 0 1.5rem; }
th, td { text-align: left; padding: 0.4rem 0.5rem; border-bottom: 1px solid var(--border); }
td.num, th.num { text-align: right; }
form.inline { display: inline; }
.error { background: var(--danger); color: #fff; padding: 0.6rem 1rem; border-radius: 6px; margin-bottom: 1rem; }
.muted { color: var(--muted); }
label { display: block; margin: 0.5rem 0 0.2rem; }
input, select, textarea, button { font: inherit; padding: 0.3rem 0.5rem; }
"#;

const THEME_SCRIPT: &str = r#"
function toggleTheme() {
    const html = document.documentElement;
    const next = html.getAttribute('data-theme') === 'light' ? 'dark' : 'light';
    html.setAttribute('data-theme', next);
    localStorage.setItem('theme', next);
}
document.documentElement.setAttribute('data-theme', localStorage.getItem('theme') || 'dark');
"#;

const ADD_ROW_SCRIPT: &str = r#"
function addSaleRow() {
    const rows = document.getElementById('sale-lines');
    const last = rows.lastElementChild;
    const copy = last.cloneNode(true);
    copy.querySelectorAll('select').forEach(s => s.selectedIndex = 0);
    copy.querySelectorAll('input').forEach(i => i.value = '');
    rows.appendChild(copy);
}
"#;

const STATS_SCRIPT: &str = r#"
fetch('/api/stats').then(r => r.json()).then(rows => {
    const list = document.getElementById('monthly-revenue');
    if (!rows.length) { list.innerHTML = '<li class="muted">No sales yet</li>'; return; }
    list.innerHTML = rows.map(r => `<li>${r.month}: ₱${r.revenue.toFixed(2)}</li>`).join('');
});
"#;

// =============================================================================
// Helpers
// =============================================================================

/// Escapes text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// Formats money for display (`₱240.00`).
pub fn money(amount: Money) -> String {
    format!("₱{}", amount)
}

fn error_banner(error: Option<&str>) -> String {
    error
        .map(|e| format!(r#"<div class="error">{}</div>"#, escape(e)))
        .unwrap_or_default()
}

fn post_button(action: &str, label: &str, confirm: Option<&str>) -> String {
    let onsubmit = confirm
        .map(|msg| format!(r#" onsubmit="return confirm('{}')""#, escape(msg)))
        .unwrap_or_default();
    format!(
        r#"<form class="inline" method="post" action="{}"{}><button type="submit">{}</button></form>"#,
        escape(action),
        onsubmit,
        escape(label)
    )
}

/// Wraps a page body in the shared layout.
pub fn layout(title: &str, active: &str, body: &str) -> String {
    let links = [
        ("/", "Dashboard"),
        ("/add-sale", "Add Sale"),
        ("/sales", "Sales"),
        ("/expenses", "Expenses"),
        ("/items", "Items"),
    ];

    let nav: String = links
        .iter()
        .map(|(href, label)| {
            let class = if *href == active { r#" class="active""# } else { "" };
            format!(r#"<a href="{href}"{class}>{label}</a>"#)
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en" data-theme="dark">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>{title} - Tally</title>
<style>{STYLE}</style>
<script>{THEME_SCRIPT}</script>
</head>
<body>
<nav><span class="brand">Tally</span>{nav}<button type="button" onclick="toggleTheme()">Theme</button></nav>
<main>
<h1>{title}</h1>
{body}
</main>
</body>
</html>"#,
        title = escape(title),
    )
}

/// Error page for non-404 failures.
pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        r#"<div class="error">{}</div><p class="muted">{}</p><p><a href="/">Back to dashboard</a></p>"#,
        escape(message),
        status
    );
    layout("Something went wrong", "", &body)
}

// =============================================================================
// Dashboard
// =============================================================================

pub fn dashboard(data: &Dashboard) -> String {
    let profit_class = if data.net_profit.is_negative() { " negative" } else { "" };

    let cards = format!(
        r#"<div class="cards">
<div class="card"><div class="label">Revenue</div><div class="value">{}</div></div>
<div class="card"><div class="label">Transactions</div><div class="value">{}</div></div>
<div class="card"><div class="label">Expenses</div><div class="value">{}</div></div>
<div class="card"><div class="label">Net Profit</div><div class="value{}">{}</div></div>
</div>"#,
        money(data.revenue),
        data.transactions,
        money(data.expenses),
        profit_class,
        money(data.net_profit),
    );

    let recent_sales: String = if data.recent_sales.is_empty() {
        r#"<tr><td colspan="3" class="muted">No sales yet</td></tr>"#.to_string()
    } else {
        data.recent_sales
            .iter()
            .map(|sale| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td class="num">{}</td></tr>"#,
                    sale.date,
                    escape(&sale.customer_name),
                    money(sale.total)
                )
            })
            .collect()
    };

    let recent_expenses: String = if data.recent_expenses.is_empty() {
        r#"<tr><td colspan="4" class="muted">No expenses yet</td></tr>"#.to_string()
    } else {
        data.recent_expenses
            .iter()
            .map(|expense| {
                format!(
                    r#"<tr><td>{}</td><td>{}</td><td>{}</td><td class="num">{}</td></tr>"#,
                    expense.date,
                    escape(&expense.description),
                    escape(&expense.category),
                    money(expense.amount)
                )
            })
            .collect()
    };

    let top_items: String = data
        .top_items
        .iter()
        .map(|item| {
            let action = format!(
                "/sales/delete-item/{}",
                urlencoding::encode(&item.item_name)
            );
            let status = match item.item_id {
                Some(_) => String::new(),
                None => r#" <span class="muted">(not in catalog)</span>"#.to_string(),
            };
            format!(
                r#"<tr><td>{}{}</td><td class="num">{}</td><td class="num">{}</td><td>{}</td></tr>"#,
                escape(&item.item_name),
                status,
                item.quantity,
                money(item.sales),
                post_button(
                    &action,
                    "Remove from all sales",
                    Some("Remove this item from every sale?")
                )
            )
        })
        .collect();

    let breakdown: String = data
        .expense_breakdown
        .iter()
        .map(|category| {
            let action = format!(
                "/expenses/delete-category/{}",
                urlencoding::encode(&category.category)
            );
            format!(
                r#"<tr><td>{}</td><td class="num">{}</td><td class="num">{}</td><td>{}</td></tr>"#,
                escape(&category.category),
                category.expense_ids.len(),
                money(category.total),
                post_button(
                    &action,
                    "Delete category",
                    Some("Delete every expense in this category?")
                )
            )
        })
        .collect();

    let body = format!(
        r#"{cards}
<h2>Recent Sales</h2>
<table><tr><th>Date</th><th>Customer</th><th class="num">Total</th></tr>{recent_sales}</table>
<h2>Recent Expenses</h2>
<table><tr><th>Date</th><th>Description</th><th>Category</th><th class="num">Amount</th></tr>{recent_expenses}</table>
<h2>Top Items</h2>
<table><tr><th>Item</th><th class="num">Qty</th><th class="num">Sales</th><th></th></tr>{top_items}</table>
<h2>Expenses by Category</h2>
<table><tr><th>Category</th><th class="num">Entries</th><th class="num">Total</th><th></th></tr>{breakdown}</table>
<h2>Monthly Revenue</h2>
<ul id="monthly-revenue"></ul>
<script>{STATS_SCRIPT}</script>"#
    );

    layout("Dashboard", "/", &body)
}

// =============================================================================
// Sales
// =============================================================================

/// Everything the add/edit sale form needs.
pub struct SaleFormView<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub submit_label: &'a str,
    /// Active items for the pickers.
    pub items: &'a [Item],
    pub form: &'a SaleForm,
    pub error: Option<&'a str>,
}

pub fn sale_form(view: &SaleFormView<'_>) -> String {
    let blank = crate::forms::RawLine::default();
    let rows: String = view
        .form
        .lines
        .iter()
        .chain(std::iter::repeat(&blank).take(BLANK_SALE_ROWS))
        .map(|line| sale_row(view.items, &line.item_id, &line.quantity))
        .collect();

    let form = view.form;
    let body = format!(
        r#"{error}
<form method="post" action="{action}">
<label for="customer_name">Customer</label>
<input id="customer_name" name="customer_name" required value="{customer}">
<label for="date">Date</label>
<input id="date" name="date" type="date" value="{date}">
<label for="notes">Notes</label>
<textarea id="notes" name="notes">{notes}</textarea>
<h2>Items</h2>
<table><thead><tr><th>Item</th><th>Quantity</th></tr></thead><tbody id="sale-lines">{rows}</tbody></table>
<button type="button" onclick="addSaleRow()">Add row</button>
<button type="submit">{submit}</button>
</form>
<script>{ADD_ROW_SCRIPT}</script>"#,
        error = error_banner(view.error),
        action = escape(view.action),
        customer = escape(&form.customer_name),
        date = escape(&form.date),
        notes = escape(&form.notes),
        submit = escape(view.submit_label),
    );

    layout(view.title, "/add-sale", &body)
}

fn sale_row(items: &[Item], selected: &str, quantity: &str) -> String {
    let options: String = items
        .iter()
        .map(|item| {
            let id = item.id.to_string();
            let sel = if id == selected.trim() { " selected" } else { "" };
            format!(
                r#"<option value="{id}" data-price="{price}"{sel}>{name} ({price_label})</option>"#,
                price = item.price,
                name = escape(&item.name),
                price_label = money(item.price),
            )
        })
        .collect();

    format!(
        r#"<tr><td><select name="item_id"><option value="">-- select --</option>{options}</select></td><td><input name="quantity" type="number" min="0" value="{}"></td></tr>"#,
        escape(quantity)
    )
}

pub fn sales_list(sales: &[SaleWithLines], search: &str) -> String {
    let rows: String = if sales.is_empty() {
        r#"<tr><td colspan="6" class="muted">No sales found</td></tr>"#.to_string()
    } else {
        sales
            .iter()
            .map(|entry| {
                let sale = &entry.sale;
                let lines: String = entry
                    .lines
                    .iter()
                    .map(|line| {
                        format!(
                            "<li>{} &times; {} @ {} = {}</li>",
                            escape(&line.item_name),
                            line.quantity,
                            money(line.price),
                            money(line.subtotal)
                        )
                    })
                    .collect();
                format!(
                    r#"<tr><td>{date}</td><td>{customer}</td><td><ul>{lines}</ul></td><td class="num">{total}</td><td>{notes}</td><td><a href="/sales/edit/{id}">Edit</a> {delete}</td></tr>"#,
                    date = sale.date,
                    customer = escape(&sale.customer_name),
                    total = money(sale.total),
                    notes = escape(sale.notes.as_deref().unwrap_or("")),
                    id = sale.id,
                    delete = post_button(
                        &format!("/sales/delete/{}", sale.id),
                        "Delete",
                        Some("Delete this sale?")
                    ),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<form method="get" action="/sales"><input name="search" placeholder="Customer name" value="{search}"> <button type="submit">Search</button></form>
<table><tr><th>Date</th><th>Customer</th><th>Items</th><th class="num">Total</th><th>Notes</th><th></th></tr>{rows}</table>"#,
        search = escape(search),
    );

    layout("Sales", "/sales", &body)
}

// =============================================================================
// Items
// =============================================================================

pub fn items_page(items: &[Item], add_form: &ItemForm, error: Option<&str>) -> String {
    let rows: String = items
        .iter()
        .map(|item| {
            let status = if item.active { "Active" } else { "Inactive" };
            let toggle_label = if item.active { "Deactivate" } else { "Activate" };
            format!(
                r#"<tr><td><form class="inline" method="post" action="/items/edit/{id}"><input name="name" value="{name}" required> <input name="price" value="{price}" size="8" required> <button type="submit">Save</button></form></td><td>{status}</td><td>{toggle} {delete}</td></tr>"#,
                id = item.id,
                name = escape(&item.name),
                price = item.price,
                toggle = post_button(&format!("/items/toggle/{}", item.id), toggle_label, None),
                delete = post_button(
                    &format!("/items/delete/{}", item.id),
                    "Delete",
                    Some("Delete this item? Items used in sales are deactivated instead.")
                ),
            )
        })
        .collect();

    let body = format!(
        r#"{error}
<h2>Add Item</h2>
<form method="post" action="/items/add">
<input name="name" placeholder="Name" required value="{name}">
<input name="price" placeholder="Price" required value="{price}">
<button type="submit">Add</button>
</form>
<h2>Catalog</h2>
<table><tr><th>Item</th><th>Status</th><th></th></tr>{rows}</table>"#,
        error = error_banner(error),
        name = escape(&add_form.name),
        price = escape(&add_form.price),
    );

    layout("Items", "/items", &body)
}

// =============================================================================
// Expenses
// =============================================================================

/// Everything the add/edit expense form needs.
pub struct ExpenseFormView<'a> {
    pub title: &'a str,
    pub action: &'a str,
    pub submit_label: &'a str,
    pub form: &'a ExpenseForm,
    pub error: Option<&'a str>,
}

pub fn expense_form(view: &ExpenseFormView<'_>) -> String {
    let form = view.form;
    let body = format!(
        r#"{error}
<form method="post" action="{action}">
<label for="description">Description</label>
<input id="description" name="description" required value="{description}">
<label for="amount">Amount</label>
<input id="amount" name="amount" required value="{amount}">
<label for="category">Category</label>
<input id="category" name="category" required value="{category}">
<label for="date">Date</label>
<input id="date" name="date" type="date" value="{date}">
<label for="notes">Notes</label>
<textarea id="notes" name="notes">{notes}</textarea>
<p><button type="submit">{submit}</button></p>
</form>"#,
        error = error_banner(view.error),
        action = escape(view.action),
        description = escape(&form.description),
        amount = escape(&form.amount),
        category = escape(&form.category),
        date = escape(&form.date),
        notes = escape(&form.notes),
        submit = escape(view.submit_label),
    );

    layout(view.title, "/expenses", &body)
}

pub fn expenses_list(expenses: &[Expense], total: Money, search: &str) -> String {
    let rows: String = if expenses.is_empty() {
        r#"<tr><td colspan="6" class="muted">No expenses found</td></tr>"#.to_string()
    } else {
        expenses
            .iter()
            .map(|expense| {
                format!(
                    r#"<tr><td>{date}</td><td>{description}</td><td>{category}</td><td class="num">{amount}</td><td>{notes}</td><td><a href="/expenses/edit/{id}">Edit</a> {delete}</td></tr>"#,
                    date = expense.date,
                    description = escape(&expense.description),
                    category = escape(&expense.category),
                    amount = money(expense.amount),
                    notes = escape(expense.notes.as_deref().unwrap_or("")),
                    id = expense.id,
                    delete = post_button(
                        &format!("/expenses/delete/{}", expense.id),
                        "Delete",
                        Some("Delete this expense?")
                    ),
                )
            })
            .collect()
    };

    let body = format!(
        r#"<p><a href="/expenses/add">Add expense</a></p>
<form method="get" action="/expenses"><input name="search" placeholder="Description or category" value="{search}"> <button type="submit">Search</button></form>
<p>Total expenses: <strong>{total}</strong></p>
<table><tr><th>Date</th><th>Description</th><th>Category</th><th class="num">Amount</th><th>Notes</th><th></th></tr>{rows}</table>"#,
        search = escape(search),
        total = money(total),
    );

    layout("Expenses", "/expenses", &body)
}

// =============================================================================
// Unit Tests
// =============================================================================
