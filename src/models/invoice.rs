use serde::{Deserialize, Deserializer, Serialize};

/// 抽取服务返回的发票
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    #[serde(rename = "numero_factura", alias = "invoiceNumber")]
    pub invoice_number: String,
    #[serde(rename = "fecha_emision", alias = "issueDate", default, deserialize_with = "null_as_empty")]
    pub issue_date: String,
    #[serde(rename = "forma_pago", alias = "paymentTerms", default, deserialize_with = "null_as_empty")]
    pub payment_terms: String,
    #[serde(rename = "cliente", alias = "client")]
    pub client: Client,
    pub items: Vec<LineItem>,
    #[serde(rename = "montos", alias = "totals")]
    pub totals: Totals,
}

/// 客户信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "nombre", alias = "name")]
    pub name: String,
    #[serde(rename = "identificacion", alias = "taxId")]
    pub tax_id: String,
    #[serde(rename = "direccion", alias = "address", default, deserialize_with = "null_as_empty")]
    pub address: String,
}

/// 发票明细行
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItem {
    #[serde(rename = "descripcion", alias = "description")]
    pub description: String,
    #[serde(rename = "cantidad", alias = "quantity")]
    pub quantity: f64,
    #[serde(rename = "precio_unitario", alias = "unitPrice")]
    pub unit_price: f64,
    #[serde(rename = "subtotal_item", alias = "lineSubtotal")]
    pub line_subtotal: f64,
}

/// 发票金额汇总
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Totals {
    pub subtotal: f64,
    #[serde(rename = "iva", alias = "taxes")]
    pub taxes: f64,
    #[serde(rename = "total_general", alias = "grandTotal")]
    pub grand_total: f64,
}

/// 服务对缺失字段可能返回 null
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// 已处理的发票: 抽取结果 + 来源文件名
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessedInvoice {
    pub source_file_name: String,
    #[serde(flatten)]
    pub invoice: Invoice,
}

impl ProcessedInvoice {
    pub fn new(source_file_name: impl Into<String>, invoice: Invoice) -> Self {
        Self {
            source_file_name: source_file_name.into(),
            invoice,
        }
    }

    pub fn item_count(&self) -> usize {
        self.invoice.items.len()
    }
}
