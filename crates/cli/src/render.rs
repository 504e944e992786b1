use quotedesk_core::cpq::ProductCatalog;
use quotedesk_core::domain::product::{Product, ProductId};
use quotedesk_core::domain::quote::ConfirmedQuote;
use quotedesk_core::QuoteSession;

pub fn product_line(product: &Product) -> String {
    let mut line = format!("ID {}: {} (price {})", product.id, product.name, product.price);
    if product.has_colors {
        line.push_str(&format!(" | colors: {}", product.colors.join(", ")));
    }
    if product.is_kit {
        let components =
            product.kit_components.iter().map(ToString::to_string).collect::<Vec<_>>();
        line.push_str(&format!(" | kit of: {}", components.join(", ")));
    }
    line
}

pub fn catalog(catalog: &ProductCatalog) -> String {
    if catalog.is_empty() {
        return "no products available".to_string();
    }
    catalog.products().iter().map(product_line).collect::<Vec<_>>().join("\n")
}

fn product_name(catalog: &ProductCatalog, id: ProductId) -> String {
    catalog.find_by_id(id).map_or_else(|| format!("#{id}"), |product| product.name.clone())
}

/// One row per draft line that still resolves against the catalog.
pub fn draft(session: &QuoteSession) -> String {
    let mut lines = vec![format!("customer: {}", display_customer(&session.customer))];

    for resolved in session.draft.resolved_lines(&session.catalog) {
        let mut line =
            format!("[{}] {} x{}", resolved.index, resolved.product.name, resolved.item.quantity);
        if let Some(color) = &resolved.item.color {
            line.push_str(&format!(" color={color}"));
        }
        if let Some(kit_order) = &resolved.item.kit_order {
            let names = kit_order
                .iter()
                .map(|id| product_name(&session.catalog, *id))
                .collect::<Vec<_>>();
            line.push_str(&format!(" kit order: {}", names.join(" -> ")));
        }
        lines.push(line);
    }

    if session.draft.is_empty() {
        lines.push("(draft is empty)".to_string());
    }
    if let Some(error) = &session.submission_error {
        lines.push(format!("last submission failed: {error}"));
    }
    lines.join("\n")
}

pub fn confirmed(quote: &ConfirmedQuote) -> String {
    let id = quote.id.map_or_else(|| "?".to_string(), |id| id.to_string());
    let mut lines = vec![format!("quote #{id} for {} total {}", quote.customer, quote.total)];
    for item in &quote.items {
        let mut line = format!("  {} x{}", item.product_name, item.quantity);
        if let Some(color) = &item.color {
            line.push_str(&format!(" ({color})"));
        }
        if item.is_kit_component {
            match item.order {
                Some(order) => line.push_str(&format!(" [kit component, order {order}]")),
                None => line.push_str(" [kit component]"),
            }
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn display_customer(customer: &str) -> &str {
    if customer.trim().is_empty() {
        "<unset>"
    } else {
        customer
    }
}
