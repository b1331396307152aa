//! Ask command handler

use crate::config::Config;
use crate::state::SharedState;

pub async fn cmd_ask(config: Config, message: &str) -> anyhow::Result<()> {
    let state = SharedState::new(config).await?;
    let answer = state.search_service.answer(message, None).await?;

    println!("{}", answer.answer);

    if let Some(ticker) = &answer.ticker {
        println!();
        println!("Ticker: {ticker}");
    }

    if let Some(quote) = &answer.stock_quote {
        println!(
            "Price:  {} ({} / {})",
            quote.price, quote.change, quote.change_percent
        );
    }

    Ok(())
}
