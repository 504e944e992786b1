use clap::Args;
use quotedesk_client::{load_session_catalog, submit_session, HttpQuoteApi, QuoteApi};
use quotedesk_core::config::ConfigOverrides;
use quotedesk_core::cpq::CatalogLoad;
use quotedesk_core::domain::product::ProductId;
use quotedesk_core::QuoteSession;

use crate::commands::{prepare, CommandResult};
use crate::render;

#[derive(Debug, Clone, Default, Args)]
pub struct QuoteArgs {
    #[arg(long, help = "Customer name recorded on the quote")]
    pub customer: String,
    #[arg(long = "add", value_name = "PRODUCT_ID", help = "Add a product line (repeatable)")]
    pub add: Vec<i64>,
    #[arg(
        long = "color",
        value_name = "INDEX=COLOR",
        help = "Set the color of the line at INDEX (repeatable)"
    )]
    pub color: Vec<String>,
    #[arg(
        long = "reverse-kit",
        value_name = "INDEX",
        help = "Reverse the kit order of the line at INDEX (repeatable)"
    )]
    pub reverse_kit: Vec<usize>,
}

pub fn run(args: QuoteArgs, overrides: ConfigOverrides) -> CommandResult {
    let (config, runtime) = match prepare("quote", overrides) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let api = match HttpQuoteApi::from_config(&config.api) {
        Ok(api) => api,
        Err(error) => {
            return CommandResult::failure("quote", "client_build", error.to_string(), 3);
        }
    };

    runtime.block_on(build_and_submit(&api, &args))
}

pub(crate) async fn build_and_submit(api: &dyn QuoteApi, args: &QuoteArgs) -> CommandResult {
    let mut session = QuoteSession::new();
    session.set_customer(args.customer.clone());
    if let CatalogLoad::Unavailable { reason } = load_session_catalog(api, &mut session).await {
        return CommandResult::failure(
            "quote",
            "catalog_unavailable",
            format!("could not load products: {reason}"),
            4,
        );
    }

    if let Err(message) = apply_edits(&mut session, args) {
        return CommandResult::failure("quote", "draft_edit", message, 7);
    }

    match submit_session(api, &mut session).await {
        Ok(()) => match &session.confirmed {
            Some(quote) => CommandResult::success("quote", render::confirmed(quote)),
            None => CommandResult::failure("quote", "submission", "no quote was confirmed", 6),
        },
        Err(error) => CommandResult::failure("quote", "submission", error.to_string(), 6),
    }
}

/// Applies adds first, then colors, then kit reversals, so indices refer to
/// the lines in the order they were added.
fn apply_edits(session: &mut QuoteSession, args: &QuoteArgs) -> Result<(), String> {
    for product_id in &args.add {
        session.add_product(ProductId(*product_id)).map_err(|error| error.to_string())?;
    }
    for spec in &args.color {
        let (index, color) = parse_color_spec(spec)?;
        session.set_color(index, color).map_err(|error| error.to_string())?;
    }
    for index in &args.reverse_kit {
        session.reverse_kit_order(*index).map_err(|error| error.to_string())?;
    }
    Ok(())
}

fn parse_color_spec(spec: &str) -> Result<(usize, &str), String> {
    let (index, color) =
        spec.split_once('=').ok_or_else(|| format!("expected INDEX=COLOR, got `{spec}`"))?;
    let index =
        index.trim().parse::<usize>().map_err(|_| format!("invalid line index in `{spec}`"))?;
    let color = color.trim();
    if color.is_empty() {
        return Err(format!("missing color in `{spec}`"));
    }
    Ok((index, color))
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use serde_json::Value;

    use quotedesk_client::{ApiError, QuoteApi};
    use quotedesk_core::domain::product::{Product, ProductId};
    use quotedesk_core::domain::quote::{
        ConfirmedQuote, CreateQuoteRequest, CreatedQuote, QuoteId,
    };

    use super::{build_and_submit, parse_color_spec, QuoteArgs};

    #[derive(Default)]
    struct RecordingApi {
        requests: Mutex<Vec<CreateQuoteRequest>>,
        catalog_down: bool,
    }

    #[async_trait]
    impl QuoteApi for RecordingApi {
        async fn list_products(&self) -> Result<Vec<Product>, ApiError> {
            if self.catalog_down {
                return Err(ApiError::NetworkFailure {
                    url: "http://backend/products".to_string(),
                    message: "connection refused".to_string(),
                });
            }
            Ok(vec![
                Product {
                    id: ProductId(2),
                    name: "Pro".to_string(),
                    price: Decimal::from(180),
                    has_colors: true,
                    colors: vec!["white".to_string(), "black".to_string()],
                    is_kit: false,
                    kit_components: Vec::new(),
                },
                Product {
                    id: ProductId(5),
                    name: "Kit".to_string(),
                    price: Decimal::ZERO,
                    has_colors: false,
                    colors: Vec::new(),
                    is_kit: true,
                    kit_components: vec![ProductId(2), ProductId(3)],
                },
            ])
        }

        async fn create_quote(
            &self,
            request: &CreateQuoteRequest,
        ) -> Result<CreatedQuote, ApiError> {
            self.requests.lock().expect("lock").push(request.clone());
            Ok(CreatedQuote { id: Some(QuoteId(1)), total: None })
        }

        async fn fetch_quote(&self, id: QuoteId) -> Result<ConfirmedQuote, ApiError> {
            Ok(ConfirmedQuote {
                id: Some(id),
                customer: "Jane".to_string(),
                total: Decimal::from(180),
                items: Vec::new(),
            })
        }
    }

    #[test]
    fn color_spec_requires_index_and_color() {
        assert_eq!(parse_color_spec("1=black"), Ok((1, "black")));
        assert!(parse_color_spec("black").is_err());
        assert!(parse_color_spec("x=black").is_err());
        assert!(parse_color_spec("0=").is_err());
    }

    #[tokio::test]
    async fn flags_become_the_submitted_payload() {
        let api = RecordingApi::default();
        let args = QuoteArgs {
            customer: "Jane".to_string(),
            add: vec![2, 5],
            color: vec!["0=black".to_string()],
            reverse_kit: vec![1],
        };

        let result = build_and_submit(&api, &args).await;

        assert_eq!(result.exit_code, 0, "{}", result.output);
        let requests = api.requests.lock().expect("lock");
        assert_eq!(requests[0].customer, "Jane");
        assert_eq!(requests[0].items[0].color.as_deref(), Some("black"));
        assert_eq!(requests[0].items[1].kit_order, Some(vec![ProductId(3), ProductId(2)]));
    }

    #[tokio::test]
    async fn unknown_product_fails_before_submitting() {
        let api = RecordingApi::default();
        let args =
            QuoteArgs { customer: "Jane".to_string(), add: vec![42], ..QuoteArgs::default() };

        let result = build_and_submit(&api, &args).await;

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 7);
        assert_eq!(payload["error_class"], "draft_edit");
        assert!(api.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn unavailable_catalog_is_reported_instead_of_draft_edit() {
        let api = RecordingApi { catalog_down: true, ..RecordingApi::default() };
        let args =
            QuoteArgs { customer: "Jane".to_string(), add: vec![2], ..QuoteArgs::default() };

        let result = build_and_submit(&api, &args).await;

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 4);
        assert_eq!(payload["error_class"], "catalog_unavailable");
        assert!(payload["message"].as_str().unwrap_or_default().contains("connection refused"));
        assert!(api.requests.lock().expect("lock").is_empty());
    }

    #[tokio::test]
    async fn out_of_range_color_index_is_reported() {
        let api = RecordingApi::default();
        let args = QuoteArgs {
            customer: "Jane".to_string(),
            add: vec![2],
            color: vec!["3=white".to_string()],
            ..QuoteArgs::default()
        };

        let result = build_and_submit(&api, &args).await;

        let payload: Value = serde_json::from_str(&result.output).expect("json");
        assert_eq!(result.exit_code, 7);
        assert!(payload["message"].as_str().unwrap_or_default().contains("out of range"));
    }
}
