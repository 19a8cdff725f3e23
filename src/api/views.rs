use crate::models::ProcessedInvoice;
use crate::service::Snapshot;
use serde::Serialize;
use tera::{Context, Tera};

const INDEX_TEMPLATE: &str = include_str!("../../templates/index.html");

/// 页面渲染器
pub struct PageRenderer {
    tera: Tera,
}

impl PageRenderer {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_template("index.html", INDEX_TEMPLATE)?;
        tera.autoescape_on(vec![".html"]);
        Ok(Self { tera })
    }

    pub fn render_page(&self, snapshot: &Snapshot) -> Result<String, tera::Error> {
        let context = Context::from_serialize(PageView::from_snapshot(snapshot))?;
        self.tera.render("index.html", &context)
    }
}

#[derive(Debug, Serialize)]
struct PageView {
    entries: Vec<EntryView>,
    detail: Option<DetailView>,
    processing: bool,
    error: Option<String>,
    can_export: bool,
}

/// 侧栏列表项
#[derive(Debug, Serialize)]
struct EntryView {
    index: usize,
    client_name: String,
    invoice_number: String,
    total: String,
    selected: bool,
}

#[derive(Debug, Serialize)]
struct DetailView {
    client_name: String,
    tax_id: String,
    invoice_number: String,
    issue_date: String,
    payment_terms: String,
    total: String,
    subtotal: String,
    taxes: String,
    items: Vec<ItemView>,
}

#[derive(Debug, Serialize)]
struct ItemView {
    description: String,
    quantity: String,
    unit_price: String,
    line_subtotal: String,
}

impl PageView {
    fn from_snapshot(snapshot: &Snapshot) -> Self {
        let entries = snapshot
            .invoices
            .iter()
            .enumerate()
            .map(|(index, processed)| EntryView {
                index,
                client_name: processed.invoice.client.name.clone(),
                invoice_number: processed.invoice.invoice_number.clone(),
                total: format_money(processed.invoice.totals.grand_total),
                selected: snapshot.selected == Some(index),
            })
            .collect();

        Self {
            entries,
            detail: snapshot.selected_invoice().map(DetailView::from),
            processing: snapshot.processing,
            error: snapshot.error.clone(),
            can_export: !snapshot.invoices.is_empty(),
        }
    }
}

impl From<&ProcessedInvoice> for DetailView {
    fn from(processed: &ProcessedInvoice) -> Self {
        let invoice = &processed.invoice;
        Self {
            client_name: invoice.client.name.clone(),
            tax_id: invoice.client.tax_id.clone(),
            invoice_number: invoice.invoice_number.clone(),
            issue_date: invoice.issue_date.clone(),
            payment_terms: invoice.payment_terms.clone(),
            total: format_money(invoice.totals.grand_total),
            subtotal: format_money(invoice.totals.subtotal),
            taxes: format_money(invoice.totals.taxes),
            items: invoice
                .items
                .iter()
                .map(|item| ItemView {
                    description: item.description.clone(),
                    quantity: item.quantity.to_string(),
                    unit_price: format_money(item.unit_price),
                    line_subtotal: format_money(item.line_subtotal),
                })
                .collect(),
        }
    }
}

/// 金额显示: "$" + 千分位, 最多三位小数 (1234.5 -> "$1,234.5")
pub fn format_money(value: f64) -> String {
    format!("${}", format_amount(value))
}

pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }

    // 与 toLocaleString 一致: 恰好一半时远离零取整
    let rounded = format!("{:.3}", (value.abs() * 1000.0).round() / 1000.0);
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), ""));
    let frac_part = frac_part.trim_end_matches('0');

    let mut out = String::new();
    if value < 0.0 && (int_part != "0" || !frac_part.is_empty()) {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Invoice, LineItem, Totals};

    fn acme() -> ProcessedInvoice {
        ProcessedInvoice::new(
            "acme.txt",
            Invoice {
                invoice_number: "A-1".to_string(),
                issue_date: "2024-02-29".to_string(),
                payment_terms: "Contado".to_string(),
                client: Client {
                    name: "Acme <Ltda>".to_string(),
                    tax_id: "123".to_string(),
                    address: String::new(),
                },
                items: vec![LineItem {
                    description: "Widget".to_string(),
                    quantity: 2.0,
                    unit_price: 5.0,
                    line_subtotal: 10.0,
                }],
                totals: Totals {
                    subtotal: 10.0,
                    taxes: 1.0,
                    grand_total: 11.0,
                },
            },
        )
    }

    fn snapshot(selected: Option<usize>, processing: bool, error: Option<&str>) -> Snapshot {
        Snapshot {
            invoices: vec![acme()],
            selected,
            processing,
            error: error.map(str::to_string),
        }
    }

    #[test]
    fn money_formatting_matches_en_us_locale() {
        assert_eq!(format_money(11.0), "$11");
        assert_eq!(format_money(1234.5), "$1,234.5");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.891");
        assert_eq!(format_money(0.1 + 0.2), "$0.3");
        assert_eq!(format_money(2.0004), "$2");
        assert_eq!(format_money(-950.25), "$-950.25");
        assert_eq!(format_money(100.0), "$100");
    }

    #[test]
    fn money_ties_round_away_from_zero() {
        assert_eq!(format_money(2.0625), "$2.063");
        assert_eq!(format_money(-2.0625), "$-2.063");
        assert_eq!(format_money(0.0005), "$0.001");
    }

    #[test]
    fn page_lists_invoice_and_escapes_text() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer.render_page(&snapshot(None, false, None)).unwrap();

        assert!(html.contains("Acme &lt;Ltda&gt;"));
        assert!(html.contains("A-1"));
        assert!(html.contains("$11"));
        assert!(html.contains("/export.csv"));
        assert!(html.contains("Selecciona una factura"));
        assert!(!html.contains("Procesando..."));
    }

    #[test]
    fn selected_invoice_renders_detail() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer.render_page(&snapshot(Some(0), false, None)).unwrap();

        assert!(html.contains("Widget"));
        assert!(html.contains("2024-02-29"));
        assert!(html.contains("$10"));
        assert!(html.contains("IVA"));
        assert!(!html.contains("Selecciona una factura"));
    }

    #[test]
    fn processing_and_error_banner() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render_page(&snapshot(None, true, Some("Error en roto.txt: timeout")))
            .unwrap();

        assert!(html.contains("Procesando..."));
        assert!(html.contains("Error en roto.txt: timeout"));
    }

    #[test]
    fn empty_state_has_no_export_action() {
        let renderer = PageRenderer::new().unwrap();
        let html = renderer
            .render_page(&Snapshot {
                invoices: vec![],
                selected: None,
                processing: false,
                error: None,
            })
            .unwrap();

        assert!(!html.contains("/export.csv"));
        assert!(html.contains("Procesadas (0)"));
    }
}
