//! Interactive quoting session: one command per line on stdin, replies on
//! stdout. The session state lives for the duration of the loop.

use anyhow::Result;
use quotedesk_client::{load_session_catalog, submit_session, HttpQuoteApi, QuoteApi};
use quotedesk_core::config::ConfigOverrides;
use quotedesk_core::cpq::CatalogLoad;
use quotedesk_core::domain::product::ProductId;
use quotedesk_core::QuoteSession;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::commands::{prepare, CommandResult};
use crate::render;

const HELP: &str = "commands: products | add ID | color INDEX COLOR | reverse INDEX | \
customer NAME | show | submit | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Products,
    Add(ProductId),
    Color { index: usize, color: String },
    Reverse(usize),
    Customer(String),
    Show,
    Submit,
    Help,
    Quit,
}

pub fn parse_line(line: &str) -> Result<SessionCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();

    match verb {
        "products" => Ok(SessionCommand::Products),
        "add" => parse_index(rest, "product id").map(|id| SessionCommand::Add(ProductId(id))),
        "color" => {
            let (index, color) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "usage: color INDEX COLOR".to_string())?;
            Ok(SessionCommand::Color {
                index: parse_index(index, "line index")?,
                color: color.trim().to_string(),
            })
        }
        "reverse" => parse_index(rest, "line index").map(SessionCommand::Reverse),
        "customer" if !rest.is_empty() => Ok(SessionCommand::Customer(rest.to_string())),
        "customer" => Err("usage: customer NAME".to_string()),
        "show" => Ok(SessionCommand::Show),
        "submit" => Ok(SessionCommand::Submit),
        "help" | "?" => Ok(SessionCommand::Help),
        "quit" | "exit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command `{other}`; {HELP}")),
    }
}

fn parse_index<T: std::str::FromStr>(raw: &str, what: &str) -> Result<T, String> {
    raw.trim().parse::<T>().map_err(|_| format!("invalid {what} `{}`", raw.trim()))
}

pub struct SessionDriver<'a> {
    api: &'a dyn QuoteApi,
    pub session: QuoteSession,
}

impl<'a> SessionDriver<'a> {
    pub fn new(api: &'a dyn QuoteApi) -> Self {
        Self { api, session: QuoteSession::new() }
    }

    pub async fn load_catalog(&mut self) -> String {
        match load_session_catalog(self.api, &mut self.session).await {
            CatalogLoad::Loaded { products } => format!("loaded {products} products"),
            CatalogLoad::Unavailable { reason } => {
                format!("products unavailable ({reason}); continuing with an empty catalog")
            }
        }
    }

    /// Runs one command and returns the reply to print.
    pub async fn execute(&mut self, command: SessionCommand) -> String {
        match command {
            SessionCommand::Products => render::catalog(&self.session.catalog),
            SessionCommand::Add(product_id) => match self.session.add_product(product_id) {
                Ok(index) => format!("added line {index}"),
                Err(error) => error.to_string(),
            },
            SessionCommand::Color { index, color } => {
                match self.session.set_color(index, color) {
                    Ok(()) => render::draft(&self.session),
                    Err(error) => error.to_string(),
                }
            }
            SessionCommand::Reverse(index) => match self.session.reverse_kit_order(index) {
                Ok(()) => render::draft(&self.session),
                Err(error) => error.to_string(),
            },
            SessionCommand::Customer(name) => {
                self.session.set_customer(name);
                format!("customer set to {}", self.session.customer)
            }
            SessionCommand::Show => render::draft(&self.session),
            SessionCommand::Submit => match submit_session(self.api, &mut self.session).await {
                Ok(()) => self
                    .session
                    .confirmed
                    .as_ref()
                    .map_or_else(|| "no quote was confirmed".to_string(), render::confirmed),
                Err(error) => format!("submission failed: {error}"),
            },
            SessionCommand::Help => HELP.to_string(),
            SessionCommand::Quit => "bye".to_string(),
        }
    }
}

/// Drives a session over any line source until `quit` or end of input.
pub async fn run_loop<R, W>(
    api: &dyn QuoteApi,
    input: R,
    output: &mut W,
) -> Result<QuoteSession>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut driver = SessionDriver::new(api);
    let greeting = driver.load_catalog().await;
    output.write_all(format!("{greeting}\n{HELP}\n").as_bytes()).await?;

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let reply = match parse_line(&line) {
            Ok(SessionCommand::Quit) => break,
            Ok(command) => driver.execute(command).await,
            Err(message) => message,
        };
        output.write_all(format!("{reply}\n").as_bytes()).await?;
        output.flush().await?;
    }

    Ok(driver.session)
}

pub fn run(overrides: ConfigOverrides) -> CommandResult {
    let (config, runtime) = match prepare("session", overrides) {
        Ok(prepared) => prepared,
        Err(failure) => return failure,
    };

    let api = match HttpQuoteApi::from_config(&config.api) {
        Ok(api) => api,
        Err(error) => {
            return CommandResult::failure("session", "client_build", error.to_string(), 3);
        }
    };

    let result = runtime.block_on(async {
        let stdin = tokio::io::BufReader::new(tokio::io::stdin());
        let mut stdout = tokio::io::stdout();
        run_loop(&api, stdin, &mut stdout).await
    });

    match result {
        Ok(session) => {
            let summary = match session.confirmed {
                Some(quote) => match quote.id {
                    Some(id) => format!("session ended; last confirmed quote #{id}"),
                    None => "session ended; last confirmed quote has no id".to_string(),
                },
                None => format!("session ended with {} unsubmitted lines", session.draft.len()),
            };
            CommandResult::success("session", summary)
        }
        Err(error) => CommandResult::failure("session", "io", error.to_string(), 8),
    }
}
