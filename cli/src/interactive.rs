//! Line-oriented session that remembers the last query.

use anyhow::{bail, Context};
use ratewatch_common::CurrencyPair;
use ratewatch_fx::{PairQuery, RateEngine};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

use crate::report::{render, OutputFormat};

/// What a line of input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Run(PairQuery),
    /// Blank line with no previous query.
    Nothing,
    Quit,
}

/// Interpret one input line.
///
/// Accepts `BASE QUOTE` or `BASE/QUOTE`. A blank line repeats `last`.
pub fn parse_line(line: &str, last: Option<&PairQuery>, window_days: u32) -> anyhow::Result<Input> {
    let line = line.trim();
    if matches!(line, "quit" | "exit" | "q") {
        return Ok(Input::Quit);
    }

    let submitted = if line.is_empty() {
        None
    } else {
        let codes: Vec<&str> = line
            .split(|c: char| c == '/' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if codes.len() != 2 {
            bail!("expected two currency codes, got {:?}", line);
        }
        let pair = CurrencyPair::parse(codes[0], codes[1])
            .with_context(|| format!("invalid pair {:?}", line))?;
        Some(PairQuery::new(pair, window_days))
    };

    Ok(match PairQuery::resolve(submitted, last) {
        Some(query) => Input::Run(query),
        None => Input::Nothing,
    })
}

/// Read pairs from stdin until EOF or `quit`.
pub async fn run(engine: &RateEngine, window_days: u32, format: OutputFormat) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut last: Option<PairQuery> = None;

    loop {
        stdout.write_all(b"pair> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let query = match parse_line(&line, last.as_ref(), window_days) {
            Ok(Input::Run(query)) => query,
            Ok(Input::Nothing) => continue,
            Ok(Input::Quit) => break,
            Err(e) => {
                stdout.write_all(format!("{:#}\n", e).as_bytes()).await?;
                continue;
            }
        };

        match engine.analyze(&query).await {
            Ok(analysis) => {
                let text = render(&analysis, format)?;
                stdout.write_all(text.as_bytes()).await?;
            }
            Err(e) => {
                warn!(pair = %query.pair, error = %e, "Analysis failed");
                stdout.write_all(format!("{}\n", e).as_bytes()).await?;
            }
        }
        last = Some(query);
    }

    Ok(())
}
