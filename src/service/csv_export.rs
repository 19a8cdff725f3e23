use crate::models::ProcessedInvoice;
use csv::{QuoteStyle, WriterBuilder};

/// 导出文件名
pub const REPORT_FILE_NAME: &str = "reporte_facturas_ia.csv";

pub const REPORT_HEADERS: [&str; 10] = [
    "Archivo",
    "Nro_Factura",
    "Fecha",
    "Cliente",
    "NIT",
    "Item_Desc",
    "Cantidad",
    "Precio_Unit",
    "Subtotal_Item",
    "Total_Factura",
];

/// 每个明细行一行, 最后一列为所属发票的总金额
/// 表头不加引号; 数据行中文本字段加引号, 数字原样输出
pub fn export_csv(invoices: &[ProcessedInvoice]) -> Result<Vec<u8>, csv::Error> {
    let mut header = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .from_writer(Vec::new());
    header.write_record(REPORT_HEADERS)?;
    let buf = header
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;

    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .from_writer(buf);

    for processed in invoices {
        let invoice = &processed.invoice;
        let grand_total = invoice.totals.grand_total.to_string();

        for item in &invoice.items {
            let quantity = item.quantity.to_string();
            let unit_price = item.unit_price.to_string();
            let line_subtotal = item.line_subtotal.to_string();

            writer.write_record([
                processed.source_file_name.as_str(),
                invoice.invoice_number.as_str(),
                invoice.issue_date.as_str(),
                invoice.client.name.as_str(),
                invoice.client.tax_id.as_str(),
                item.description.as_str(),
                quantity.as_str(),
                unit_price.as_str(),
                line_subtotal.as_str(),
                grand_total.as_str(),
            ])?;
        }
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Client, Invoice, LineItem, Totals};

    fn item(description: &str, quantity: f64, unit_price: f64) -> LineItem {
        LineItem {
            description: description.to_string(),
            quantity,
            unit_price,
            line_subtotal: quantity * unit_price,
        }
    }

    fn processed(file: &str, number: &str, client: &str, items: Vec<LineItem>, total: f64) -> ProcessedInvoice {
        ProcessedInvoice::new(
            file,
            Invoice {
                invoice_number: number.to_string(),
                issue_date: "2024-01-15".to_string(),
                payment_terms: String::new(),
                client: Client {
                    name: client.to_string(),
                    tax_id: "123".to_string(),
                    address: String::new(),
                },
                items,
                totals: Totals {
                    subtotal: total,
                    taxes: 0.0,
                    grand_total: total,
                },
            },
        )
    }

    #[test]
    fn single_item_invoice_row() {
        let invoices = vec![processed("a.txt", "A-1", "Acme", vec![item("Widget", 2.0, 5.0)], 11.0)];

        let output = String::from_utf8(export_csv(&invoices).unwrap()).unwrap();
        let lines: Vec<&str> = output.lines().collect();

        assert_eq!(
            lines[0],
            "Archivo,Nro_Factura,Fecha,Cliente,NIT,Item_Desc,Cantidad,Precio_Unit,Subtotal_Item,Total_Factura"
        );
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[1],
            r#""a.txt","A-1","2024-01-15","Acme",123,"Widget",2,5,10,11"#
        );
    }

    #[test]
    fn one_row_per_item_with_invoice_total_last() {
        let invoices = vec![
            processed(
                "uno.txt",
                "F-1",
                "Ferretería \"El Tornillo\", S.A.S.",
                vec![item("Martillo", 3.0, 25000.0), item("Clavos, caja", 10.0, 1.5)],
                89265.0,
            ),
            processed("dos.txt", "F-2", "Beta", vec![item("Consultoría", 1.0, 500.0)], 595.0),
            processed("tres.txt", "F-3", "Gama", vec![], 0.0),
        ];

        let output = export_csv(&invoices).unwrap();
        let mut reader = csv::Reader::from_reader(output.as_slice());
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();

        let expected_rows: usize = invoices.iter().map(|p| p.item_count()).sum();
        assert_eq!(rows.len(), expected_rows);

        assert_eq!(&rows[0][3], "Ferretería \"El Tornillo\", S.A.S.");
        assert_eq!(&rows[1][5], "Clavos, caja");
        assert_eq!(&rows[1][7], "1.5");
        assert_eq!(&rows[0][9], "89265");
        assert_eq!(&rows[1][9], "89265");
        assert_eq!(&rows[2][9], "595");
    }

    #[test]
    fn empty_list_yields_header_only() {
        let output = String::from_utf8(export_csv(&[]).unwrap()).unwrap();
        assert_eq!(output.lines().count(), 1);
    }
}
