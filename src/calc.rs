//! Display Arithmetic
//!
//! Pure helpers behind every number shown on screen: stock badges, the cost
//! calculator, sale line totals, summaries and pt-BR formatting.

use chrono::{DateTime, FixedOffset, Local, NaiveDate};

use crate::models::{Material, MaterialPurchase, MaterialWithdrawal, Sale};

/// Products below this stock get a low-stock badge
pub const PRODUCT_LOW_STOCK: i64 = 10;

// ========================
// Input parsing
// ========================

/// Lenient decimal parse of a form field: the longest numeric prefix, 0 if none
pub fn parse_decimal(input: &str) -> f64 {
    let input = input.trim();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (i, c) in input.char_indices() {
        match c {
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
        end = i + c.len_utf8();
    }
    if !seen_digit {
        return 0.0;
    }
    input[..end].trim_end_matches('.').parse().unwrap_or(0.0)
}

/// Lenient integer parse of a form field: leading digits only, 0 if none
pub fn parse_integer(input: &str) -> i64 {
    let input = input.trim();
    let digits_from = usize::from(input.starts_with(['-', '+']));
    let digits = input[digits_from..]
        .find(|c: char| !c.is_ascii_digit())
        .map_or(input.len(), |i| i + digits_from);
    input[..digits].parse().unwrap_or(0)
}

/// Normalize a money field: first `,` becomes `.`, anything but digits and
/// dots is dropped, and only the first dot is kept
pub fn sanitize_decimal(input: &str) -> String {
    let replaced = input.replacen(',', ".", 1);
    let cleaned: String = replaced
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    match cleaned.split_once('.') {
        Some((whole, rest)) => format!("{}.{}", whole, rest.replace('.', "")),
        None => cleaned,
    }
}

// ========================
// Stock
// ========================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Empty,
    Low,
    Ok,
}

impl StockStatus {
    pub fn label(&self) -> &'static str {
        match self {
            StockStatus::Empty => "Sem Estoque",
            StockStatus::Low => "Estoque Baixo",
            StockStatus::Ok => "Em Estoque",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            StockStatus::Empty => "stock-empty",
            StockStatus::Low => "stock-low",
            StockStatus::Ok => "stock-ok",
        }
    }
}

pub fn stock_status(quantity: f64, minimum: f64) -> StockStatus {
    if quantity == 0.0 {
        StockStatus::Empty
    } else if minimum > 0.0 && quantity > 0.0 && quantity <= minimum {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

pub fn material_stock_status(material: &Material) -> StockStatus {
    stock_status(material.quantity_in_stock, material.minimum_stock)
}

pub fn material_stock_value(material: &Material) -> f64 {
    material.cost_per_unit * material.quantity_in_stock
}

pub fn product_stock_is_low(stock: i64) -> bool {
    stock < PRODUCT_LOW_STOCK
}

// ========================
// Cost calculator
// ========================

/// `total ÷ quantity` with two decimals, only when both are positive
pub fn unit_cost(total: f64, quantity: f64) -> Option<String> {
    (total > 0.0 && quantity > 0.0).then(|| format!("{:.2}", total / quantity))
}

// ========================
// Sale lines
// ========================

pub fn line_subtotal(price: f64, quantity: i64) -> f64 {
    price * quantity as f64
}

/// Cost of one material used in a sale line
pub fn material_usage_cost(cost_per_unit: f64, material_quantity: f64, line_quantity: i64) -> f64 {
    cost_per_unit * material_quantity * line_quantity as f64
}

// ========================
// Summaries
// ========================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SalesSummary {
    pub revenue: f64,
    pub profit: f64,
    pub pending_count: usize,
    pub pending_amount: f64,
}

/// Revenue and profit count paid sales only; pending sales are tallied apart
pub fn sales_summary(sales: &[Sale]) -> SalesSummary {
    sales.iter().fold(SalesSummary::default(), |mut acc, sale| {
        if sale.is_paid() {
            acc.revenue += sale.total_amount;
            acc.profit += sale.net_profit;
        } else if sale.is_pending() {
            acc.pending_count += 1;
            acc.pending_amount += sale.total_amount;
        }
        acc
    })
}

pub fn purchases_total(purchases: &[MaterialPurchase]) -> f64 {
    purchases.iter().map(|p| p.total_cost).sum()
}

/// Sum of withdrawal costs, restricted to one production batch when given
pub fn withdrawals_total(withdrawals: &[MaterialWithdrawal], batch: Option<&str>) -> f64 {
    withdrawals
        .iter()
        .filter(|w| match batch {
            Some(batch) => w.production_batch.as_deref() == Some(batch),
            None => true,
        })
        .map(MaterialWithdrawal::cost)
        .sum()
}

/// `part / whole` as a percentage with one decimal
pub fn margin(part: f64, whole: f64) -> Option<String> {
    (whole > 0.0).then(|| format!("{:.1}", part / whole * 100.0))
}

pub fn average_ticket(amount: f64, count: u64) -> Option<f64> {
    (count > 0).then(|| amount / count as f64)
}

// ========================
// Formatting
// ========================

/// pt-BR currency: `R$ 1.234,56`
pub fn format_currency(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}R$ {},{:02}", sign, grouped, cents % 100)
}

/// Quantity without a trailing `.0` for whole numbers
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value).trim_end_matches('0').to_string()
    }
}

/// API timestamp or date as `dd/mm/yyyy` in the browser's timezone
pub fn format_date(value: &str) -> String {
    format_date_in(value, *Local::now().offset())
}

pub fn format_date_in(value: &str, offset: FixedOffset) -> String {
    let value = value.trim();
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return timestamp.with_timezone(&offset).format("%d/%m/%Y").to_string();
    }
    match NaiveDate::parse_from_str(value.get(..10).unwrap_or(value), "%Y-%m-%d") {
        Ok(date) => date.format("%d/%m/%Y").to_string(),
        Err(_) => "-".to_string(),
    }
}

/// Optional API date, `-` when absent
pub fn format_opt_date(value: Option<&str>) -> String {
    value.map(format_date).unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PaymentStatus, Ref};

    #[test]
    fn test_stock_status() {
        assert_eq!(stock_status(0.0, 5.0), StockStatus::Empty);
        assert_eq!(stock_status(0.0, 0.0), StockStatus::Empty);
        assert_eq!(stock_status(3.0, 5.0), StockStatus::Low);
        assert_eq!(stock_status(5.0, 5.0), StockStatus::Low);
        assert_eq!(stock_status(6.0, 5.0), StockStatus::Ok);
        assert_eq!(stock_status(2.0, 0.0), StockStatus::Ok);
    }

    #[test]
    fn test_unit_cost() {
        assert_eq!(unit_cost(46.95, 40.0).as_deref(), Some("1.17"));
        assert_eq!(unit_cost(10.0, 4.0).as_deref(), Some("2.50"));
        assert_eq!(unit_cost(0.0, 40.0), None);
        assert_eq!(unit_cost(46.95, 0.0), None);
    }

    #[test]
    fn test_sanitize_decimal() {
        assert_eq!(sanitize_decimal("46,95"), "46.95");
        assert_eq!(sanitize_decimal("R$ 46.95"), "46.95");
        assert_eq!(sanitize_decimal("1.2.3"), "1.23");
        assert_eq!(sanitize_decimal("1,2,3"), "1.23");
        assert_eq!(sanitize_decimal("abc"), "");
    }

    #[test]
    fn test_lenient_number_parsing() {
        assert_eq!(parse_decimal("46.95"), 46.95);
        assert_eq!(parse_decimal(" 12abc"), 12.0);
        assert_eq!(parse_decimal("3."), 3.0);
        assert_eq!(parse_decimal(""), 0.0);
        assert_eq!(parse_decimal("."), 0.0);
        assert_eq!(parse_integer("3"), 3);
        assert_eq!(parse_integer("2.7"), 2);
        assert_eq!(parse_integer("-4"), -4);
        assert_eq!(parse_integer("x"), 0);
    }

    #[test]
    fn test_line_arithmetic() {
        assert!((line_subtotal(10.50, 3) - 31.50).abs() < 1e-9);
        assert!((material_usage_cost(0.5, 2.0, 3) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_sales_summary_splits_paid_and_pending() {
        let sale = |amount: f64, profit: f64, status: PaymentStatus| Sale {
            total_amount: amount,
            net_profit: profit,
            payment_status: status,
            ..Default::default()
        };
        let summary = sales_summary(&[
            sale(100.0, 40.0, PaymentStatus::Pago),
            sale(50.0, 20.0, PaymentStatus::Pendente),
            sale(30.0, 10.0, PaymentStatus::Pago),
        ]);
        assert_eq!(summary.revenue, 130.0);
        assert_eq!(summary.profit, 50.0);
        assert_eq!(summary.pending_count, 1);
        assert_eq!(summary.pending_amount, 50.0);
    }

    #[test]
    fn test_withdrawals_total_by_batch() {
        let material = Material { cost_per_unit: 2.0, ..Default::default() };
        let withdrawal = |qty: f64, batch: Option<&str>| MaterialWithdrawal {
            material: Some(Ref::Populated(material.clone())),
            quantity: qty,
            production_batch: batch.map(String::from),
            ..Default::default()
        };
        let all = [
            withdrawal(1.0, Some("Produção 01/10/2026")),
            withdrawal(2.0, Some("Produção 02/10/2026")),
            withdrawal(3.0, None),
        ];
        assert_eq!(withdrawals_total(&all, None), 12.0);
        assert_eq!(withdrawals_total(&all, Some("Produção 02/10/2026")), 4.0);
    }

    #[test]
    fn test_margin_and_ticket() {
        assert_eq!(margin(25.0, 200.0).as_deref(), Some("12.5"));
        assert_eq!(margin(25.0, 0.0), None);
        assert_eq!(average_ticket(90.0, 3), Some(30.0));
        assert_eq!(average_ticket(90.0, 0), None);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.56), "R$ 1.234,56");
        assert_eq!(format_currency(0.0), "R$ 0,00");
        assert_eq!(format_currency(31.5), "R$ 31,50");
        assert_eq!(format_currency(1_000_000.0), "R$ 1.000.000,00");
        assert_eq!(format_currency(-12.3), "-R$ 12,30");
    }

    #[test]
    fn test_format_date_in_offset() {
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        assert_eq!(format_date_in("2026-10-15T02:00:00.000Z", brt), "14/10/2026");
        assert_eq!(format_date_in("2026-10-15", brt), "15/10/2026");
        assert_eq!(format_date_in("garbage", brt), "-");
        assert_eq!(format_quantity(2.0), "2");
        assert_eq!(format_quantity(0.25), "0.25");
    }
}
